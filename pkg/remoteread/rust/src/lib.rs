// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! A Prometheus remote read test double.
//!
//! [`RemoteReadServer`] serves a fixed, immutable set of series on `POST /read`
//! and answers snappy-compressed protobuf `ReadRequest`s the way a remote
//! storage backend would. Any deviation from the protocol contract aborts the
//! exchange and is reported back through [`RemoteReadServer::close`].

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

pub mod codec;
mod errors;
pub mod fixture;
pub mod handler;
pub mod headers;
pub mod matcher;
pub mod prompb;
pub mod range;
mod server;

#[cfg(test)]
pub(crate) mod test_utils;

// Re-export the public API
pub use errors::{Error, Result};
pub use handler::QueryHandler;
pub use matcher::Matchers;
pub use range::filter_by_time;
pub use server::RemoteReadServer;
