// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

// Correctness
#![deny(clippy::indexing_slicing)]
#![deny(clippy::string_slice)]
#![deny(clippy::cast_possible_wrap)]
#![deny(clippy::undocumented_unsafe_blocks)]
// Panicking code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::unimplemented)]
#![deny(clippy::todo)]
// Debug code that shouldn't be in production
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use remote_read_double::RemoteReadServer;
use remote_read_double::fixture::load_fixture;
use tokio::signal::unix::{SignalKind, signal};

mod cli;
mod config;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = config::load_config(args.config);
    let log_level = config::get_log_level(&config);
    simple_logger::init_with_level(log_level)?;
    info!("Log level set to: {:?}", log_level);
    let config = config?;

    let listen = args
        .listen
        .unwrap_or_else(|| config::get_listen_address(&config));
    let addr: SocketAddr = listen
        .parse()
        .with_context(|| format!("Invalid listen address: {listen}"))?;

    let fixture_path = args
        .fixture
        .or_else(|| config::get_fixture_path(&config))
        .context("No dataset configured, pass --fixture or set fixture_path")?;
    let series = load_fixture(&fixture_path)?;
    info!(
        "Loaded {} series from {}",
        series.len(),
        fixture_path.display()
    );

    let server = RemoteReadServer::bind(addr, series)
        .await
        .context("Failed to start remote read server")?;
    info!(
        "Serving {} series ({} samples) at {}",
        server.series_count(),
        server.sample_count(),
        server.url()
    );

    let mut sigterm = signal(SignalKind::terminate()).context("Failed to setup SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("Failed to setup SIGINT handler")?;

    tokio::select! {
        _ = sigterm.recv() => info!("Received SIGTERM, shutting down"),
        _ = sigint.recv() => info!("Received SIGINT, shutting down"),
    }

    server
        .close()
        .await
        .context("A remote read exchange violated the protocol")
}
