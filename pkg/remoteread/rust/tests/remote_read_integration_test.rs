// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::io::Write;

use remote_read_double::codec::{
    self, PROTOBUF_CONTENT_TYPE, READ_VERSION, READ_VERSION_HEADER, SNAPPY_ENCODING,
};
use remote_read_double::fixture::load_fixture;
use remote_read_double::prompb::{
    Label, LabelMatcher, MatcherType, Query, ReadRequest, ReadResponse, Sample, TimeSeries,
};
use remote_read_double::{Error, RemoteReadServer};

fn series(labels: &[(&str, &str)], samples: &[(i64, f64)]) -> TimeSeries {
    TimeSeries {
        labels: labels
            .iter()
            .map(|(name, value)| Label {
                name: name.to_string(),
                value: value.to_string(),
            })
            .collect(),
        samples: samples
            .iter()
            .map(|&(timestamp, value)| Sample { value, timestamp })
            .collect(),
    }
}

fn dataset() -> Vec<TimeSeries> {
    vec![
        series(
            &[("__name__", "up"), ("job", "node"), ("instance", "a:9100")],
            &[(1_000, 1.0), (2_000, 1.0), (3_000, 0.0)],
        ),
        series(
            &[("__name__", "up"), ("job", "api"), ("instance", "b:8080")],
            &[(1_500, 1.0), (2_500, 1.0)],
        ),
        series(
            &[("__name__", "http_requests_total"), ("job", "api")],
            &[(1_000, 10.0), (2_000, 25.0), (3_000, 31.0), (4_000, 47.0)],
        ),
    ]
}

fn read_request(start: i64, end: i64, matchers: Vec<LabelMatcher>) -> ReadRequest {
    ReadRequest {
        queries: vec![Query {
            start_timestamp_ms: start,
            end_timestamp_ms: end,
            matchers,
            hints: None,
        }],
        accepted_response_types: vec![],
    }
}

/// Builds a POST to the read endpoint with the content headers a Prometheus
/// client sends and the given protocol version, if any.
fn post_body(
    server: &RemoteReadServer,
    body: impl Into<reqwest::Body>,
    version: Option<&str>,
) -> reqwest::RequestBuilder {
    let builder = reqwest::Client::new()
        .post(server.url())
        .header("Content-Encoding", SNAPPY_ENCODING)
        .header("Content-Type", PROTOBUF_CONTENT_TYPE)
        .body(body);
    match version {
        Some(version) => builder.header(READ_VERSION_HEADER, version),
        None => builder,
    }
}

fn post(server: &RemoteReadServer, request: &ReadRequest) -> reqwest::RequestBuilder {
    post_body(
        server,
        codec::encode_request(request).unwrap(),
        Some(READ_VERSION),
    )
}

async fn read(server: &RemoteReadServer, request: &ReadRequest) -> ReadResponse {
    let response = post(server, request).send().await.expect("read failed");
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(
        response.headers().get("Content-Type").unwrap(),
        PROTOBUF_CONTENT_TYPE
    );
    assert_eq!(
        response.headers().get("Content-Encoding").unwrap(),
        SNAPPY_ENCODING
    );
    let body = response.bytes().await.unwrap();
    codec::decode_response(&body).unwrap()
}

fn first_result(response: &ReadResponse) -> &[TimeSeries] {
    &response.results.first().expect("no results").timeseries
}

#[tokio::test]
async fn test_window_excludes_end_boundary() {
    let server = RemoteReadServer::start(vec![series(
        &[("__name__", "up")],
        &[(100, 1.0), (200, 1.0), (300, 1.0)],
    )])
    .await
    .unwrap();

    let response = read(
        &server,
        &read_request(100, 300, vec![LabelMatcher::regex("__name__", "up")]),
    )
    .await;

    let series = first_result(&response);
    assert_eq!(series.len(), 1);
    let timestamps: Vec<i64> = series[0].samples.iter().map(|s| s.timestamp).collect();
    assert_eq!(timestamps, vec![100, 200]);

    server.close().await.unwrap();
}

#[tokio::test]
async fn test_full_match_returns_every_sample() {
    let data = dataset();
    let server = RemoteReadServer::start(data.clone()).await.unwrap();

    let response = read(
        &server,
        &read_request(
            0,
            i64::MAX,
            vec![
                LabelMatcher::regex("__name__", ".+"),
                LabelMatcher::regex("job", ".+"),
                LabelMatcher::regex("instance", ".+"),
            ],
        ),
    )
    .await;

    let series = first_result(&response);
    assert_eq!(series.len(), server.series_count());
    let returned: usize = series.iter().map(|s| s.samples.len()).sum();
    assert_eq!(returned, server.sample_count());
    assert_eq!(series, data.as_slice());

    server.close().await.unwrap();
}

#[tokio::test]
async fn test_excluded_series_keep_their_slot() {
    let server = RemoteReadServer::start(dataset()).await.unwrap();

    let response = read(
        &server,
        &read_request(0, 10_000, vec![LabelMatcher::regex("job", "^api$")]),
    )
    .await;

    let series = first_result(&response);
    assert_eq!(series.len(), 3);
    assert_eq!(series[0], TimeSeries::default());
    assert_eq!(series[1], dataset()[1]);
    assert_eq!(series[2], dataset()[2]);

    server.close().await.unwrap();
}

#[tokio::test]
async fn test_matcher_on_unknown_label_is_ignored() {
    let server = RemoteReadServer::start(dataset()).await.unwrap();

    let response = read(
        &server,
        &read_request(
            0,
            10_000,
            vec![
                LabelMatcher::regex("__name__", "^up$"),
                LabelMatcher::regex("cluster", "^does-not-exist$"),
            ],
        ),
    )
    .await;

    let series = first_result(&response);
    assert_eq!(series[0], dataset()[0]);
    assert_eq!(series[1], dataset()[1]);
    assert_eq!(series[2], TimeSeries::default());

    server.close().await.unwrap();
}

#[tokio::test]
async fn test_extra_queries_get_empty_results() {
    let server = RemoteReadServer::start(dataset()).await.unwrap();
    let mut request = read_request(0, 10_000, vec![LabelMatcher::regex("__name__", "up")]);
    request.queries.push(Query {
        start_timestamp_ms: 0,
        end_timestamp_ms: 10_000,
        matchers: vec![LabelMatcher::regex("__name__", "http_.*")],
        hints: None,
    });

    let response = read(&server, &request).await;
    assert_eq!(response.results.len(), 2);
    assert_eq!(response.results[0].timeseries.len(), 3);
    assert!(response.results[1].timeseries.is_empty());

    server.close().await.unwrap();
}

#[tokio::test]
async fn test_concurrent_reads() {
    let server = RemoteReadServer::start(dataset()).await.unwrap();
    let request = read_request(0, 10_000, vec![LabelMatcher::regex("__name__", ".*")]);

    let responses = read_concurrently(&server, &request, 8).await;
    for response in responses {
        assert_eq!(first_result(&response), dataset().as_slice());
    }

    server.close().await.unwrap();
}

async fn read_concurrently(
    server: &RemoteReadServer,
    request: &ReadRequest,
    n: usize,
) -> Vec<ReadResponse> {
    let mut tasks = tokio::task::JoinSet::new();
    for _ in 0..n {
        let send = post(server, request).send();
        tasks.spawn(async move {
            let response = send.await.expect("read failed");
            codec::decode_response(&response.bytes().await.unwrap()).unwrap()
        });
    }
    tasks.join_all().await
}

#[tokio::test]
async fn test_missing_version_header_aborts_exchange() {
    let server = RemoteReadServer::start(dataset()).await.unwrap();
    let request = read_request(0, 10_000, vec![LabelMatcher::regex("__name__", "up")]);

    let result = post_body(&server, codec::encode_request(&request).unwrap(), None)
        .send()
        .await;
    assert!(result.is_err(), "aborted exchange must not produce a response");

    assert!(matches!(server.fatal_error(), Some(Error::MissingReadVersion)));
    assert!(matches!(server.close().await, Err(Error::MissingReadVersion)));
}

#[tokio::test]
async fn test_wrong_version_aborts_exchange() {
    let server = RemoteReadServer::start(dataset()).await.unwrap();
    let request = read_request(0, 10_000, vec![]);

    let result = post_body(
        &server,
        codec::encode_request(&request).unwrap(),
        Some("0.2.0"),
    )
    .send()
    .await;
    assert!(result.is_err());

    let err = server.close().await.unwrap_err();
    assert!(matches!(err, Error::UnsupportedReadVersion { ref version } if version == "0.2.0"));
}

#[tokio::test]
async fn test_get_request_aborts_exchange() {
    let server = RemoteReadServer::start(dataset()).await.unwrap();

    let result = reqwest::Client::new().get(server.url()).send().await;
    assert!(result.is_err());

    let err = server.close().await.unwrap_err();
    assert!(matches!(err, Error::MethodNotAllowed { ref method } if method == "GET"));
}

#[tokio::test]
async fn test_zero_queries_aborts_exchange() {
    let server = RemoteReadServer::start(dataset()).await.unwrap();
    let request = ReadRequest {
        queries: vec![],
        accepted_response_types: vec![],
    };

    assert!(post(&server, &request).send().await.is_err());
    assert!(matches!(server.close().await, Err(Error::NoQueries)));
}

#[tokio::test]
async fn test_unsupported_matcher_aborts_exchange() {
    let server = RemoteReadServer::start(dataset()).await.unwrap();
    let request = read_request(
        0,
        10_000,
        vec![LabelMatcher {
            r#type: MatcherType::Neq as i32,
            name: "job".to_string(),
            value: "api".to_string(),
        }],
    );

    assert!(post(&server, &request).send().await.is_err());
    assert!(matches!(
        server.close().await,
        Err(Error::UnsupportedMatcher { ref name, .. }) if name == "job"
    ));
}

#[tokio::test]
async fn test_uncompressed_body_aborts_exchange() {
    let server = RemoteReadServer::start(dataset()).await.unwrap();

    let result = post_body(&server, "plain text is not snappy", Some(READ_VERSION))
        .send()
        .await;
    assert!(result.is_err());
    assert!(matches!(server.close().await, Err(Error::Decompress(_))));
}

#[tokio::test]
async fn test_first_failure_is_reported() {
    let server = RemoteReadServer::start(dataset()).await.unwrap();

    let no_queries = ReadRequest {
        queries: vec![],
        accepted_response_types: vec![],
    };
    assert!(post(&server, &no_queries).send().await.is_err());
    assert!(reqwest::Client::new().get(server.url()).send().await.is_err());

    assert!(matches!(server.close().await, Err(Error::NoQueries)));
}

#[tokio::test]
async fn test_any_path_is_served_as_read() {
    let server = RemoteReadServer::start(dataset()).await.unwrap();
    let request = read_request(0, 10_000, vec![LabelMatcher::regex("job", "^node$")]);
    let url = format!("http://{}/", server.local_addr());

    let response = reqwest::Client::new()
        .post(url)
        .header("Content-Encoding", SNAPPY_ENCODING)
        .header("Content-Type", PROTOBUF_CONTENT_TYPE)
        .header(READ_VERSION_HEADER, READ_VERSION)
        .body(codec::encode_request(&request).unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let response = codec::decode_response(&response.bytes().await.unwrap()).unwrap();
    assert_eq!(first_result(&response)[0], dataset()[0]);

    server.close().await.unwrap();
}

#[tokio::test]
async fn test_bad_request_on_other_path_aborts_exchange() {
    let server = RemoteReadServer::start(dataset()).await.unwrap();
    let url = format!("http://{}/api/v1/read", server.local_addr());

    assert!(reqwest::Client::new().post(url).send().await.is_err());
    assert!(matches!(
        server.close().await,
        Err(Error::UnsupportedEncoding { ref encoding }) if encoding.is_empty()
    ));
}

#[tokio::test]
#[should_panic(expected = "HTTP method GET instead of POST")]
async fn test_dropping_server_with_failure_panics() {
    let server = RemoteReadServer::start(dataset()).await.unwrap();

    assert!(reqwest::Client::new().get(server.url()).send().await.is_err());
    assert!(server.fatal_error().is_some());
    drop(server);
}

#[tokio::test]
async fn test_serves_dataset_from_fixture_file() {
    let mut file = tempfile::Builder::new()
        .suffix(".json")
        .tempfile()
        .unwrap();
    file.write_all(
        br#"{"series": [
            {"labels": {"__name__": "up", "job": "node"}, "samples": [[100, 1], [200, 1]]},
            {"labels": {"__name__": "up", "job": "api"}, "samples": []}
        ]}"#,
    )
    .unwrap();
    file.flush().unwrap();

    let server = RemoteReadServer::start(load_fixture(file.path()).unwrap())
        .await
        .unwrap();
    assert_eq!(server.series_count(), 2);
    assert_eq!(server.sample_count(), 2);

    let response = read(
        &server,
        &read_request(0, 150, vec![LabelMatcher::regex("job", "node")]),
    )
    .await;
    let series = first_result(&response);
    assert_eq!(series.len(), 2);
    assert_eq!(series[0].samples.len(), 1);
    assert_eq!(series[1], TimeSeries::default());

    server.close().await.unwrap();
}
