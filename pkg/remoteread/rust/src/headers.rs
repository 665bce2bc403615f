// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Transport contract checks for inbound remote read requests.
//!
//! Mirrors the headers Prometheus' remote read client sets: the request must
//! be a POST of snappy-compressed protobuf carrying a 0.1.x protocol version.

use hyper::Method;
use hyper::header::{AsHeaderName, CONTENT_ENCODING, CONTENT_TYPE, HeaderMap};

use crate::codec::{
    PROTOBUF_CONTENT_TYPE, READ_VERSION_HEADER, READ_VERSION_PREFIX, SNAPPY_ENCODING,
};
use crate::errors::{Error, Result};

/// Returns the raw first value of `name`, empty when the header is absent.
///
/// Values are compared as bytes: clients may send obs-text that is not
/// visible ASCII.
fn header_bytes<K: AsHeaderName>(headers: &HeaderMap, name: K) -> &[u8] {
    headers.get(name).map(|value| value.as_bytes()).unwrap_or_default()
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}

fn lossy(value: &[u8]) -> String {
    String::from_utf8_lossy(value).into_owned()
}

/// Validates method and headers of a remote read request.
///
/// Checks run in a fixed order and the first violation is returned.
pub fn validate_read_headers(method: &Method, headers: &HeaderMap) -> Result<()> {
    if method != Method::POST {
        return Err(Error::MethodNotAllowed {
            method: method.to_string(),
        });
    }

    let encoding = header_bytes(headers, CONTENT_ENCODING);
    if !contains(encoding, SNAPPY_ENCODING.as_bytes()) {
        return Err(Error::UnsupportedEncoding {
            encoding: lossy(encoding),
        });
    }

    let content_type = header_bytes(headers, CONTENT_TYPE);
    if content_type != PROTOBUF_CONTENT_TYPE.as_bytes() {
        return Err(Error::UnsupportedContentType {
            content_type: lossy(content_type),
        });
    }

    let version = header_bytes(headers, READ_VERSION_HEADER);
    if version.is_empty() {
        return Err(Error::MissingReadVersion);
    }
    if !version.starts_with(READ_VERSION_PREFIX.as_bytes()) {
        return Err(Error::UnsupportedReadVersion {
            version: lossy(version),
        });
    }

    Ok(())
}
