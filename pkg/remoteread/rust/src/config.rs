// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use anyhow::{Context, Result};
use log::warn;
use std::env;
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;
use yaml_rust2::{Yaml, YamlLoader};

const DEFAULT_LISTEN_ADDRESS: &str = "127.0.0.1:9201";

/// Loads the YAML config file if one was given and exists
pub fn load_config(config_path: Option<PathBuf>) -> Result<Option<Yaml>> {
    let Some(path) = config_path else {
        return Ok(None);
    };

    if path.exists() {
        let mut file = File::open(&path).context("Failed to open config file")?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .context("Failed to read config file")?;

        let docs = YamlLoader::load_from_str(&contents).context("Failed to parse YAML config")?;
        Ok(docs.into_iter().next())
    } else {
        warn!(
            "Config file not found at {}. Checking environment variables only.",
            path.display()
        );
        Ok(None)
    }
}

/// Get string value from YAML, returning None for missing keys and non-strings
fn get_yaml_string_option(doc: &Yaml, key: &str) -> Option<String> {
    let value = &doc[key];
    if value.is_badvalue() {
        return None;
    }
    value.as_str().map(|s| s.to_string())
}

fn get_setting(env_var: &str, yaml_key: &str, config: &Option<Yaml>) -> Option<String> {
    if let Ok(value) = env::var(env_var)
        && !value.is_empty()
    {
        return Some(value);
    }

    config
        .as_ref()
        .and_then(|doc| get_yaml_string_option(doc, yaml_key))
}

/// Address the server binds to.
/// Priority: DD_REMOTE_READ_LISTEN_ADDRESS > YAML `listen_address` > default
pub fn get_listen_address(config: &Option<Yaml>) -> String {
    get_setting("DD_REMOTE_READ_LISTEN_ADDRESS", "listen_address", config)
        .unwrap_or_else(|| DEFAULT_LISTEN_ADDRESS.to_string())
}

/// Dataset file to serve.
/// Priority: DD_REMOTE_READ_FIXTURE_PATH > YAML `fixture_path`
pub fn get_fixture_path(config: &Option<Yaml>) -> Option<PathBuf> {
    get_setting("DD_REMOTE_READ_FIXTURE_PATH", "fixture_path", config).map(PathBuf::from)
}

/// Parse a log level string into a log::Level
/// Unknown levels silently default to Info
fn parse_log_level(level: &str) -> log::Level {
    match level.to_lowercase().as_str() {
        "trace" => log::Level::Trace,
        "debug" => log::Level::Debug,
        "info" => log::Level::Info,
        "warn" | "warning" => log::Level::Warn,
        "error" | "critical" | "off" => log::Level::Error,
        _ => log::Level::Info,
    }
}

/// Gets the log level from configuration.
/// Priority: DD_LOG_LEVEL > LOG_LEVEL > YAML config > default Info
pub fn get_log_level(config: &Result<Option<Yaml>>) -> log::Level {
    if let Ok(level) = env::var("DD_LOG_LEVEL") {
        return parse_log_level(&level);
    }

    if let Ok(level) = env::var("LOG_LEVEL") {
        return parse_log_level(&level);
    }

    config
        .as_ref()
        .ok()
        .and_then(|c| c.as_ref())
        .and_then(|doc| get_yaml_string_option(doc, "log_level"))
        .map(|level| parse_log_level(&level))
        .unwrap_or(log::Level::Info)
}
