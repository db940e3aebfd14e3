// Copyright 2022 Jeff Kim <hiking90@gmail.com>
// SPDX-License-Identifier: Apache-2.0

//! # action-stats: Concurrent Per-Action Averages
//!
//! `action-stats` ingests timed "action" events (for example `{"action":"jump","time":100}`)
//! and keeps a running average duration per action name. Events can be recorded and
//! reports requested from any number of threads or async tasks at once.
//!
//! ## Core Concepts
//!
//! - **[`ActionStats`]**: The two-operation contract: `record_event` and `report`.
//! - **[`ActionService`]**: The production implementation. It decodes, validates and
//!   normalizes input, then updates its store.
//! - **[`AggregateStore`]**: The only shared mutable state, a map from lowercase action
//!   name to a running sum and count behind a reader-writer lock.
//! - **[`Report`]**: Per-action averages, sorted by action, serialized as
//!   `[{"action":"jump","avg":200}, ...]`.
//!
//! ## Rules
//!
//! - Action names are case-insensitive: `"Jump"` and `"jump"` share one entry.
//! - An empty or missing name fails with [`Error::EmptyName`].
//! - A negative `time` fails with [`Error::NegativeDuration`]; zero is accepted.
//! - Non-object input, or a `time` that is fractional or outside `i64`, fails with
//!   [`Error::Decode`].
//! - A failed call never modifies the store.
//! - Averages use integer division and truncate: durations 1..=100 average to 50.
//!
//! ## Cargo Features
//!
//! - `tracing`: log rejected events as structured `tracing` events instead of `log` lines.
//! - `metrics`: per-service ingestion counters, exposed as `ActionService::metrics()`.
//!
//! ## Getting Started
//!
//! ```rust
//! use action_stats::{ActionService, ActionStats, Error};
//!
//! let service = ActionService::new();
//!
//! service.record_event(r#"{"action":"jump", "time":100}"#).unwrap();
//! service.record_event(r#"{"action":"run", "time":75}"#).unwrap();
//! service.record_event(r#"{"action":"jump", "time":200}"#).unwrap();
//! service.record_event(r#"{"action":"jump", "time":300}"#).unwrap();
//!
//! assert!(matches!(
//!     service.record_event(r#"{"action":"jump", "time":-1}"#),
//!     Err(Error::NegativeDuration { duration: -1 })
//! ));
//!
//! assert_eq!(
//!     service.report().unwrap(),
//!     r#"[{"action":"jump","avg":200},{"action":"run","avg":75}]"#
//! );
//! ```

use std::sync::Arc;

mod error;
mod event;
#[cfg(feature = "metrics")]
mod metrics;
mod rejection;
mod service;
mod store;

pub use error::{Error, Result};
pub use event::{ActionAverage, Event, Report};
#[cfg(feature = "metrics")]
pub use metrics::MetricsSnapshot;
pub use rejection::RejectReason;
pub use service::ActionService;
pub use store::{Aggregate, AggregateEntry, AggregateStore};

/// Records action events and reports per-action averages.
///
/// [`ActionService`] is the production implementation. Code that only needs these
/// two operations should depend on this trait so a test double can stand in.
pub trait ActionStats: Send + Sync {
    /// Decodes one JSON record and adds it to the running averages.
    ///
    /// Decode errors are returned before any validation runs. On any error the
    /// aggregate state is left untouched.
    fn record_event(&self, raw: &str) -> Result<()>;

    /// Serializes the current per-action averages as a JSON array.
    ///
    /// An empty aggregate yields `"[]"`.
    fn report(&self) -> Result<String>;
}

impl<T: ActionStats + ?Sized> ActionStats for Arc<T> {
    fn record_event(&self, raw: &str) -> Result<()> {
        (**self).record_event(raw)
    }

    fn report(&self) -> Result<String> {
        (**self).report()
    }
}

impl<T: ActionStats + ?Sized> ActionStats for &T {
    fn record_event(&self, raw: &str) -> Result<()> {
        (**self).record_event(raw)
    }

    fn report(&self) -> Result<String> {
        (**self).report()
    }
}
