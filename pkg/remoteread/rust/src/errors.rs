// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use thiserror::Error;

/// Every way a remote read exchange can violate the protocol contract.
///
/// None of these are recovered from. The handler stops at the first one and
/// the server aborts the exchange.
#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP method {method} instead of POST")]
    MethodNotAllowed { method: String },

    #[error("non-snappy compressed data got: {encoding:?}")]
    UnsupportedEncoding { encoding: String },

    #[error("non-protobuf data got content type: {content_type:?}")]
    UnsupportedContentType { content_type: String },

    #[error("missing X-Prometheus-Remote-Read-Version header")]
    MissingReadVersion,

    #[error("unexpected Remote-Read-Version {version}, expected 0.1.X")]
    UnsupportedReadVersion { version: String },

    #[error("failed to read request body: {0}")]
    BodyRead(String),

    #[error("snappy decode error: {0}")]
    Decompress(#[source] snap::Error),

    #[error("snappy encode error: {0}")]
    Compress(#[source] snap::Error),

    #[error("proto unmarshal error: {0}")]
    Decode(#[from] prost::DecodeError),

    #[error("proto marshal error: {0}")]
    Encode(#[from] prost::EncodeError),

    #[error("read request carries no queries")]
    NoQueries,

    #[error("unsupported label matcher {kind} on label {name:?}, only regex matchers are supported")]
    UnsupportedMatcher { name: String, kind: String },

    #[error("invalid regex {pattern:?} for label {name:?}: {source}")]
    InvalidRegex {
        name: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("failed to build response: {0}")]
    Response(#[from] hyper::http::Error),

    #[error("could not bind remote read listener on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("remote read exchange aborted: {0}")]
    Aborted(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
