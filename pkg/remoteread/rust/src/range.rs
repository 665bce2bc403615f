// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use crate::prompb::Sample;

/// Returns the samples with `start <= timestamp < end`, in input order.
///
/// The end bound is exclusive, like Prometheus' own range selection.
pub fn filter_by_time(samples: &[Sample], start: i64, end: i64) -> Vec<Sample> {
    samples
        .iter()
        .filter(|s| s.timestamp >= start && s.timestamp < end)
        .copied()
        .collect()
}
