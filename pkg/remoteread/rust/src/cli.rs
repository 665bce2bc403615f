// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Default, Parser)]
#[command(
    name = "remote-read-double",
    version,
    about = "Serve a fixed dataset over the Prometheus remote read protocol"
)]
pub struct Args {
    /// YAML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Dataset to serve (YAML or JSON)
    #[arg(short, long)]
    pub fixture: Option<PathBuf>,

    /// Address to listen on, e.g. 127.0.0.1:9201
    #[arg(short, long)]
    pub listen: Option<String>,
}
