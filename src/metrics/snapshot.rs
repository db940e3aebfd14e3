// Copyright 2022 Jeff Kim <hiking90@gmail.com>
// SPDX-License-Identifier: Apache-2.0

use std::time::{Duration, SystemTime};

/// Immutable copy of a service's ingestion counters.
///
/// # Consistency Note
///
/// Each field is exact on its own, but fields are loaded one at a time, so the
/// snapshot as a whole may straddle concurrent `record_event` calls.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct MetricsSnapshot {
    /// Events that passed validation and were applied to the store.
    pub accepted_count: u64,

    /// Inputs rejected because they did not decode.
    pub decode_error_count: u64,

    /// Inputs rejected for an empty name or a negative duration.
    pub validation_error_count: u64,

    /// Reports rendered by this service.
    pub report_count: u64,

    /// Time elapsed since the service was created.
    pub uptime: Duration,

    /// Timestamp of the last accepted event, or `None` if there was none.
    pub last_activity: Option<SystemTime>,
}

impl MetricsSnapshot {
    /// Total of decode and validation rejections.
    pub fn rejected_count(&self) -> u64 {
        self.decode_error_count + self.validation_error_count
    }
}

impl Default for MetricsSnapshot {
    fn default() -> Self {
        Self {
            accepted_count: 0,
            decode_error_count: 0,
            validation_error_count: 0,
            report_count: 0,
            uptime: Duration::ZERO,
            last_activity: None,
        }
    }
}
