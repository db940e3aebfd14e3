// Copyright 2022 Jeff Kim <hiking90@gmail.com>
// SPDX-License-Identifier: Apache-2.0

//! Input and output records.
//!
//! Input records are JSON objects of the form `{"action": "jump", "time": 100}`.
//! Unknown fields are ignored, a missing or `null` field takes its zero value,
//! and when a key appears more than once the last occurrence wins.
//!
//! Output records are `{"action": "jump", "avg": 100}` and are serialized as a
//! JSON array.

use serde::{de::Error as _, Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// A single timed occurrence of an action, as supplied by a caller.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Event {
    /// The action name, as given. Not yet normalized.
    pub action: String,
    /// The duration of this occurrence.
    pub time: i64,
}

const FIELD_NAMES: [&str; 2] = ["action", "time"];

#[derive(Deserialize)]
struct RawEvent {
    #[serde(default)]
    action: Option<String>,
    #[serde(default)]
    time: Option<i64>,
}

impl Event {
    /// Creates an event without validating it.
    pub fn new(action: impl Into<String>, time: i64) -> Self {
        Self {
            action: action.into(),
            time,
        }
    }

    /// Decodes one JSON record.
    ///
    /// The input is first parsed into a JSON object, which collapses duplicate
    /// keys to their last value, and then mapped onto the event fields.
    /// `"Action"` or `"TIME"` are accepted when the lowercase key is absent.
    /// Fractional, exponent-form or out-of-range `time` values fail here.
    pub fn decode(raw: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(raw).map_err(|source| Error::Decode { source })?;

        let Value::Object(mut fields) = value else {
            return Err(Error::Decode {
                source: serde_json::Error::custom("expected a JSON object"),
            });
        };

        // Field names match case-insensitively; an exact-case key takes precedence.
        for name in FIELD_NAMES {
            if fields.contains_key(name) {
                continue;
            }
            let folded = fields.keys().find(|key| key.eq_ignore_ascii_case(name)).cloned();
            if let Some(key) = folded {
                if let Some(value) = fields.remove(&key) {
                    fields.insert(name.to_owned(), value);
                }
            }
        }

        let decoded: RawEvent = serde_json::from_value(Value::Object(fields))
            .map_err(|source| Error::Decode { source })?;

        Ok(Self {
            action: decoded.action.unwrap_or_default(),
            time: decoded.time.unwrap_or_default(),
        })
    }
}

/// Average duration of one action at snapshot time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionAverage {
    /// The normalized action name.
    pub action: String,
    /// Sum of durations divided by the number of events, truncated.
    pub avg: u64,
}

/// A set of per-action averages, sorted by action name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct Report(Vec<ActionAverage>);

impl Report {
    pub(crate) fn new(mut entries: Vec<ActionAverage>) -> Self {
        entries.sort_unstable_by(|a, b| a.action.cmp(&b.action));
        Self(entries)
    }

    /// Returns the entries in action order.
    pub fn entries(&self) -> &[ActionAverage] {
        &self.0
    }

    /// Looks up the average for an already normalized action name.
    pub fn average(&self, action: &str) -> Option<u64> {
        self.0
            .binary_search_by(|entry| entry.action.as_str().cmp(action))
            .ok()
            .map(|index| self.0[index].avg)
    }

    /// Number of actions in the report.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the store held no actions at snapshot time.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Serializes the report as a JSON array.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|source| Error::Encode { source })
    }
}

impl IntoIterator for Report {
    type Item = ActionAverage;
    type IntoIter = std::vec::IntoIter<ActionAverage>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
