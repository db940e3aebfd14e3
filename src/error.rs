// Copyright 2022 Jeff Kim <hiking90@gmail.com>
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

use crate::rejection::RejectReason;

/// Represents errors that can occur while recording events or rendering a report.
///
/// Decode failures and validation failures are separate variants so callers can
/// react differently: a [`Error::Decode`] usually means the producer is broken,
/// while [`Error::EmptyName`] and [`Error::NegativeDuration`] are well-formed
/// records carrying bad values.
#[derive(Debug, Error)]
pub enum Error {
    /// The raw input is not a JSON object of the expected shape, or `time`
    /// is not a whole number within the `i64` range.
    #[error("Failed to decode action record: {source}")]
    Decode {
        /// The underlying JSON error
        source: serde_json::Error,
    },
    /// The action name is missing or empty.
    #[error("Invalid action: name is empty")]
    EmptyName,
    /// The duration is below zero.
    #[error("Invalid time value: {duration}")]
    NegativeDuration {
        /// The rejected duration
        duration: i64,
    },
    /// The report could not be serialized.
    ///
    /// Report entries are plain strings and integers, so this indicates a bug
    /// rather than a condition callers are expected to handle.
    #[error("Failed to encode report: {source}")]
    Encode {
        /// The underlying JSON error
        source: serde_json::Error,
    },
}

impl Error {
    /// Returns `true` if the input could not be decoded at all.
    pub fn is_decode(&self) -> bool {
        matches!(self, Error::Decode { .. })
    }

    /// Returns `true` if the input decoded but carried an invalid value.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::EmptyName | Error::NegativeDuration { .. })
    }

    /// Maps a rejected input to the reason logged for it.
    ///
    /// Returns `None` for [`Error::Encode`], which is not an input rejection.
    pub(crate) fn reject_reason(&self) -> Option<RejectReason> {
        match self {
            Error::Decode { .. } => Some(RejectReason::Malformed),
            Error::EmptyName => Some(RejectReason::EmptyName),
            Error::NegativeDuration { .. } => Some(RejectReason::NegativeDuration),
            Error::Encode { .. } => None,
        }
    }
}

/// A Result type specialized for action-stats operations.
///
/// # Examples
///
/// ```rust
/// use action_stats::Result;
///
/// fn ingest() -> Result<()> {
///     Ok(())
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;
