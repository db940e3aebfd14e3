// Copyright 2022 Jeff Kim <hiking90@gmail.com>
// SPDX-License-Identifier: Apache-2.0

//! Rejected Event Logging
//!
//! Every event refused by [`ActionService`](crate::ActionService) is logged once
//! here, at warning level, before the error is returned to the caller.
//!
//! # Observability
//!
//! With the `tracing` feature, rejections are structured events:
//!
//! ```text
//! WARN action_stats::rejection: Rejected action event
//!   reject.reason="negative duration"
//!   reject.detail="Invalid time value: -100"
//!   input.len=33
//! ```
//!
//! Without it, the same information is written as a single `log::warn!` line.
//!
//! Rejections are off the hot path, so [`record`] is marked `#[cold]`.

use std::fmt;

/// Reason why an event was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum RejectReason {
    /// The record did not decode into the expected shape.
    Malformed,

    /// The action name was missing or empty.
    EmptyName,

    /// The duration was below zero.
    NegativeDuration,
}

impl RejectReason {
    /// Returns `true` for reasons raised after a successful decode.
    pub fn is_validation(self) -> bool {
        matches!(self, RejectReason::EmptyName | RejectReason::NegativeDuration)
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::Malformed => write!(f, "malformed record"),
            RejectReason::EmptyName => write!(f, "empty name"),
            RejectReason::NegativeDuration => write!(f, "negative duration"),
        }
    }
}

/// Logs a rejected event.
///
/// # Arguments
///
/// * `reason` - Why the event was refused
/// * `detail` - The error returned to the caller
/// * `input_len` - Size of the raw input in bytes, or 0 for typed events
#[cold]
pub(crate) fn record(reason: RejectReason, detail: &dyn fmt::Display, input_len: usize) {
    #[cfg(feature = "tracing")]
    tracing::warn!(
        reject.reason = %reason,
        reject.detail = %detail,
        input.len = input_len,
        "Rejected action event"
    );

    #[cfg(not(feature = "tracing"))]
    log::warn!(
        "Rejected action event ({}): {} [input.len={}]",
        reason,
        detail,
        input_len
    );
}
