// Copyright 2022 Jeff Kim <hiking90@gmail.com>
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use log::debug;

use crate::error::{Error, Result};
use crate::event::{ActionAverage, Event, Report};
use crate::rejection;
use crate::store::AggregateStore;
use crate::ActionStats;

#[cfg(feature = "metrics")]
use crate::metrics::{MetricsCollector, MetricsSnapshot};

/// Records action events into an [`AggregateStore`] and renders average reports.
///
/// `ActionService` is a cheap handle: cloning it shares the same store, so one
/// instance can be handed to any number of threads or tasks without extra
/// synchronization.
///
/// ```rust
/// use action_stats::{ActionService, ActionStats};
///
/// let service = ActionService::new();
/// service.record_event(r#"{"action":"Jump", "time":100}"#).unwrap();
/// service.record_event(r#"{"action":"jump", "time":200}"#).unwrap();
///
/// assert_eq!(service.report().unwrap(), r#"[{"action":"jump","avg":150}]"#);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ActionService {
    store: Arc<AggregateStore>,
    #[cfg(feature = "metrics")]
    metrics: Arc<MetricsCollector>,
}

impl ActionService {
    /// Creates a service backed by a fresh, empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a service over an existing store.
    ///
    /// Several services may share one store; each keeps its own metrics.
    pub fn with_store(store: Arc<AggregateStore>) -> Self {
        Self {
            store,
            #[cfg(feature = "metrics")]
            metrics: Arc::default(),
        }
    }

    /// Returns the backing store, e.g. to [`reset`](AggregateStore::reset) it between tests.
    pub fn store(&self) -> &Arc<AggregateStore> {
        &self.store
    }

    /// Validates and applies an already decoded event.
    ///
    /// The name is lowercased before it is used as a key. Nothing is written
    /// when an error is returned.
    pub fn record(&self, event: Event) -> Result<()> {
        self.apply(event, 0)
    }

    /// Computes the per-action averages as a typed report.
    pub fn averages(&self) -> Report {
        let entries = self
            .store
            .snapshot()
            .into_iter()
            .map(|entry| ActionAverage {
                avg: entry.aggregate.average(),
                action: entry.key,
            })
            .collect();

        #[cfg(feature = "metrics")]
        self.metrics.record_report();

        Report::new(entries)
    }

    fn apply(&self, event: Event, input_len: usize) -> Result<()> {
        let duration = validate(&event).map_err(|e| self.reject(e, input_len))?;
        let key = event.action.to_lowercase();

        self.store.update(&key, duration);

        #[cfg(feature = "metrics")]
        self.metrics.record_accepted();

        debug!("Recorded action '{}' with duration {}", key, duration);
        Ok(())
    }

    fn reject(&self, error: Error, input_len: usize) -> Error {
        if let Some(reason) = error.reject_reason() {
            rejection::record(reason, &error, input_len);

            #[cfg(feature = "metrics")]
            self.metrics.record_rejected(reason);
        }
        error
    }
}

#[cfg(feature = "metrics")]
impl ActionService {
    /// Returns a snapshot of this service's ingestion counters.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Number of events applied to the store through this service.
    pub fn accepted_count(&self) -> u64 {
        self.metrics.accepted_count()
    }

    /// Number of inputs this service refused.
    pub fn rejected_count(&self) -> u64 {
        self.metrics.rejected_count()
    }
}

impl ActionStats for ActionService {
    fn record_event(&self, raw: &str) -> Result<()> {
        let event = Event::decode(raw).map_err(|e| self.reject(e, raw.len()))?;
        self.apply(event, raw.len())
    }

    fn report(&self) -> Result<String> {
        self.averages().to_json()
    }
}

/// Checks the name, then the duration, and returns the duration as stored.
fn validate(event: &Event) -> Result<u64> {
    if event.action.is_empty() {
        return Err(Error::EmptyName);
    }
    u64::try_from(event.time).map_err(|_| Error::NegativeDuration {
        duration: event.time,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_order() {
        // Empty name wins over negative duration.
        assert!(matches!(
            validate(&Event::new("", -1)),
            Err(Error::EmptyName)
        ));
        assert!(matches!(
            validate(&Event::new("jump", -1)),
            Err(Error::NegativeDuration { duration: -1 })
        ));
        assert_eq!(validate(&Event::new("jump", 0)).unwrap(), 0);
        assert_eq!(validate(&Event::new("jump", i64::MAX)).unwrap(), i64::MAX as u64);
    }

    #[test]
    fn test_record_typed_event_normalizes() {
        let service = ActionService::new();
        service.record(Event::new("JUMP", 10)).unwrap();
        service.record(Event::new("Jump", 20)).unwrap();

        let aggregate = service.store().get("jump").unwrap();
        assert_eq!(aggregate.count, 2);
        assert_eq!(aggregate.total_duration, 30);
        assert!(service.store().get("JUMP").is_none());
    }

    #[test]
    fn test_record_typed_event_rejects_without_writing() {
        let service = ActionService::new();

        assert!(service.record(Event::new("", 10)).is_err());
        assert!(service.record(Event::new("jump", -10)).is_err());
        assert!(service.store().is_empty());
    }

    #[test]
    fn test_clones_share_store() {
        let service = ActionService::new();
        let clone = service.clone();
        clone.record(Event::new("run", 75)).unwrap();

        assert_eq!(service.averages().average("run"), Some(75));
    }

    #[test]
    fn test_with_store_shares_state() {
        let store = Arc::new(AggregateStore::new());
        let a = ActionService::with_store(Arc::clone(&store));
        let b = ActionService::with_store(Arc::clone(&store));

        a.record(Event::new("jump", 100)).unwrap();
        b.record(Event::new("jump", 300)).unwrap();

        assert_eq!(store.get("jump").unwrap().average(), 200);
    }

    #[cfg(feature = "metrics")]
    #[test]
    fn test_metrics_follow_outcomes() {
        let service = ActionService::new();

        service.record_event(r#"{"action":"jump","time":1}"#).unwrap();
        let _ = service.record_event("{");
        let _ = service.record_event(r#"{"action":"","time":1}"#);
        let _ = service.record_event(r#"{"action":"jump","time":-1}"#);
        service.report().unwrap();

        let metrics = service.metrics();
        assert_eq!(metrics.accepted_count, 1);
        assert_eq!(metrics.decode_error_count, 1);
        assert_eq!(metrics.validation_error_count, 2);
        assert_eq!(metrics.report_count, 1);
        assert!(metrics.last_activity.is_some());
        assert_eq!(service.accepted_count(), 1);
        assert_eq!(service.rejected_count(), 3);
    }
}
