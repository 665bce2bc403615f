// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Dataset files for running the double outside of a Rust test.
//!
//! ```yaml
//! series:
//!   - labels: { __name__: up, job: node }
//!     samples: [[100, 1], [200, 1]]
//! ```
//!
//! Samples are `[timestamp_ms, value]` pairs and are served in file order.
//! Files ending in `.yaml` or `.yml` are read as YAML, anything else as JSON.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::prompb::{Label, Sample, TimeSeries};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureFormat {
    Yaml,
    Json,
}

impl FixtureFormat {
    pub fn from_path(path: &Path) -> Self {
        if path
            .extension()
            .is_some_and(|ext| ext == "yaml" || ext == "yml")
        {
            FixtureFormat::Yaml
        } else {
            FixtureFormat::Json
        }
    }
}

#[derive(Debug, Deserialize)]
struct FixtureFile {
    #[serde(default)]
    series: Vec<FixtureSeries>,
}

#[derive(Debug, Deserialize)]
struct FixtureSeries {
    #[serde(default)]
    labels: BTreeMap<String, String>,
    #[serde(default)]
    samples: Vec<(i64, f64)>,
}

impl From<FixtureSeries> for TimeSeries {
    fn from(series: FixtureSeries) -> Self {
        TimeSeries {
            labels: series
                .labels
                .into_iter()
                .map(|(name, value)| Label { name, value })
                .collect(),
            samples: series
                .samples
                .into_iter()
                .map(|(timestamp, value)| Sample { value, timestamp })
                .collect(),
        }
    }
}

pub fn parse_fixture(contents: &str, format: FixtureFormat) -> Result<Vec<TimeSeries>> {
    let file: FixtureFile = match format {
        FixtureFormat::Yaml => {
            serde_yaml::from_str(contents).context("Failed to parse YAML fixture")?
        }
        FixtureFormat::Json => {
            serde_json::from_str(contents).context("Failed to parse JSON fixture")?
        }
    };
    Ok(file.series.into_iter().map(TimeSeries::from).collect())
}

pub fn load_fixture(path: &Path) -> Result<Vec<TimeSeries>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read fixture file {}", path.display()))?;
    parse_fixture(&contents, FixtureFormat::from_path(path))
        .with_context(|| format!("Invalid fixture file {}", path.display()))
}
