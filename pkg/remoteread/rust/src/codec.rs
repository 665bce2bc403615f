// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Snappy + protobuf framing of remote read payloads.
//!
//! Both directions are the same two steps: protobuf on the inside, a snappy
//! block (not the framed stream format) on the outside.

use prost::Message;

use crate::errors::{Error, Result};
use crate::prompb::{ReadRequest, ReadResponse};

/// Content-Encoding token for snappy block compression.
pub const SNAPPY_ENCODING: &str = "snappy";

/// Content-Type of remote read requests and sampled responses.
pub const PROTOBUF_CONTENT_TYPE: &str = "application/x-protobuf";

/// Header carrying the remote read protocol version.
pub const READ_VERSION_HEADER: &str = "X-Prometheus-Remote-Read-Version";

/// Accepted protocol version prefix.
pub const READ_VERSION_PREFIX: &str = "0.1.";

/// Version sent when acting as a client.
pub const READ_VERSION: &str = "0.1.0";

/// Serializes `message` and snappy-compresses the result.
pub fn encode<M: Message>(message: &M) -> Result<Vec<u8>> {
    let mut raw = Vec::with_capacity(message.encoded_len());
    message.encode(&mut raw)?;

    snap::raw::Encoder::new()
        .compress_vec(&raw)
        .map_err(Error::Compress)
}

/// Snappy-decompresses `compressed` and deserializes it as `M`.
pub fn decode<M: Message + Default>(compressed: &[u8]) -> Result<M> {
    let raw = snap::raw::Decoder::new()
        .decompress_vec(compressed)
        .map_err(Error::Decompress)?;

    Ok(M::decode(raw.as_slice())?)
}

pub fn decode_request(compressed: &[u8]) -> Result<ReadRequest> {
    decode(compressed)
}

pub fn encode_response(response: &ReadResponse) -> Result<Vec<u8>> {
    encode(response)
}

/// Client side of the exchange, used to drive the double.
pub fn encode_request(request: &ReadRequest) -> Result<Vec<u8>> {
    encode(request)
}

/// Client side of the exchange, used to drive the double.
pub fn decode_response(compressed: &[u8]) -> Result<ReadResponse> {
    decode(compressed)
}
