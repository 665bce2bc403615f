// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Label matcher evaluation.
//!
//! Only regex matchers (`=~`) are supported. Patterns are unanchored: a match
//! anywhere in the label value is enough, so `up` matches `startup`.
//!
//! A series is selected when each of its labels satisfies every matcher that
//! names it. Matchers naming a label the series does not carry are ignored,
//! so `{job=~"node"}` selects a series without a `job` label.

use regex::Regex;

use crate::errors::{Error, Result};
use crate::prompb::{Label, LabelMatcher, MatcherType, TimeSeries};

fn kind_name(value: i32) -> String {
    match MatcherType::try_from(value) {
        Ok(kind) => kind.operator().to_string(),
        Err(_) => format!("unknown({value})"),
    }
}

#[derive(Debug)]
struct CompiledMatcher {
    name: String,
    regex: Regex,
}

/// Matchers of one query, validated and compiled once per request.
#[derive(Debug, Default)]
pub struct Matchers {
    matchers: Vec<CompiledMatcher>,
}

impl Matchers {
    /// Compiles `matchers`, failing on the first one that is not a regex
    /// matcher or whose pattern does not compile.
    pub fn compile(matchers: &[LabelMatcher]) -> Result<Self> {
        let matchers = matchers
            .iter()
            .map(|m| {
                if m.r#type != MatcherType::Re as i32 {
                    return Err(Error::UnsupportedMatcher {
                        name: m.name.clone(),
                        kind: kind_name(m.r#type),
                    });
                }
                let regex = Regex::new(&m.value).map_err(|source| Error::InvalidRegex {
                    name: m.name.clone(),
                    pattern: m.value.clone(),
                    source,
                })?;
                Ok(CompiledMatcher {
                    name: m.name.clone(),
                    regex,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { matchers })
    }

    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }

    pub fn matches(&self, labels: &[Label]) -> bool {
        labels.iter().all(|label| {
            self.matchers
                .iter()
                .filter(|m| m.name == label.name)
                .all(|m| m.regex.is_match(&label.value))
        })
    }
}

/// One-shot evaluation of `matchers` against `series`.
pub fn matches(series: &TimeSeries, matchers: &[LabelMatcher]) -> Result<bool> {
    Ok(Matchers::compile(matchers)?.matches(&series.labels))
}
