// Copyright 2022 Jeff Kim <hiking90@gmail.com>
// SPDX-License-Identifier: Apache-2.0

//! Service Metrics
//!
//! Per-service ingestion counters, compiled in only with the `metrics` feature.
//!
//! # Features
//!
//! - **Accepted events**: Events that reached the aggregate store
//! - **Rejections**: Decode failures and validation failures, counted separately
//! - **Reports**: Number of reports rendered
//! - **Uptime**: Time elapsed since the service was created
//! - **Last activity**: Timestamp of the most recent accepted event
//!
//! All counters are `AtomicU64` and independent of the aggregate store lock.
//!
//! # Example
//!
//! ```rust,ignore
//! use action_stats::{ActionService, ActionStats};
//!
//! let service = ActionService::new();
//! service.record_event(r#"{"action":"jump","time":100}"#)?;
//!
//! let metrics = service.metrics();
//! println!("Accepted {} events", metrics.accepted_count);
//! ```

mod collector;
mod snapshot;

pub(crate) use collector::MetricsCollector;
pub use snapshot::MetricsSnapshot;
