// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! The remote read exchange: validate, decode, select, encode.

use std::fmt::Display;
use std::sync::Arc;

use http_body_util::{BodyExt, Full};
use hyper::body::{Body, Bytes};
use hyper::header::{CONTENT_ENCODING, CONTENT_TYPE};
use hyper::{Request, Response, StatusCode};
use log::{debug, warn};

use crate::codec::{self, PROTOBUF_CONTENT_TYPE, SNAPPY_ENCODING};
use crate::errors::{Error, Result};
use crate::headers::validate_read_headers;
use crate::matcher::Matchers;
use crate::prompb::{QueryResult, ReadRequest, ReadResponse, ResponseType, TimeSeries};
use crate::range::filter_by_time;

/// Answers remote read requests from a fixed set of series.
///
/// The series are shared read-only between all connections; nothing about a
/// request outlives it.
#[derive(Debug, Clone)]
pub struct QueryHandler {
    series: Arc<[TimeSeries]>,
}

impl QueryHandler {
    pub fn new(series: impl Into<Arc<[TimeSeries]>>) -> Self {
        Self {
            series: series.into(),
        }
    }

    /// Runs one HTTP exchange. The body is only read once the headers passed
    /// validation.
    pub async fn handle<B>(&self, req: Request<B>) -> Result<Response<Full<Bytes>>>
    where
        B: Body,
        B::Error: Display,
    {
        validate_read_headers(req.method(), req.headers())?;

        let compressed = req
            .into_body()
            .collect()
            .await
            .map_err(|e| Error::BodyRead(e.to_string()))?
            .to_bytes();

        let request = codec::decode_request(&compressed)?;
        let response = self.read(&request)?;
        let body = codec::encode_response(&response)?;

        Ok(Response::builder()
            .status(StatusCode::OK)
            .header(CONTENT_TYPE, PROTOBUF_CONTENT_TYPE)
            .header(CONTENT_ENCODING, SNAPPY_ENCODING)
            .body(Full::new(Bytes::from(body)))?)
    }

    /// Evaluates the first query of `request` against the stored series.
    ///
    /// The response has one result per request query, but only the first one
    /// is filled in. Its series line up index for index with the stored
    /// series: a series that is not selected, or has no samples in the
    /// window, is sent as an empty placeholder.
    pub fn read(&self, request: &ReadRequest) -> Result<ReadResponse> {
        let query = request.queries.first().ok_or(Error::NoQueries)?;

        if request.queries.len() > 1 {
            warn!(
                "Read request carries {} queries, only the first one is evaluated",
                request.queries.len()
            );
        }
        if request
            .accepted_response_types
            .iter()
            .any(|&t| t != ResponseType::Samples as i32)
        {
            debug!("Client accepts streamed responses, answering with samples");
        }

        let matchers = Matchers::compile(&query.matchers)?;
        let (start, end) = (query.start_timestamp_ms, query.end_timestamp_ms);

        let timeseries: Vec<TimeSeries> = self
            .series
            .iter()
            .map(|series| {
                if !matchers.matches(&series.labels) {
                    return TimeSeries::default();
                }
                let samples = filter_by_time(&series.samples, start, end);
                if samples.is_empty() {
                    return TimeSeries::default();
                }
                TimeSeries {
                    labels: series.labels.clone(),
                    samples,
                }
            })
            .collect();

        debug!(
            "Query [{start}, {end}) with {} matcher(s) selected {} of {} series",
            matchers.len(),
            timeseries.iter().filter(|s| !s.samples.is_empty()).count(),
            timeseries.len()
        );

        let mut results = vec![QueryResult::default(); request.queries.len()];
        if let Some(first) = results.first_mut() {
            first.timeseries = timeseries;
        }
        Ok(ReadResponse { results })
    }
}
