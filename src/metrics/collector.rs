// Copyright 2022 Jeff Kim <hiking90@gmail.com>
// SPDX-License-Identifier: Apache-2.0

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant, SystemTime};

use super::MetricsSnapshot;
use crate::rejection::RejectReason;

/// Per-service ingestion counters using lock-free atomic operations.
///
/// All operations use `Ordering::Relaxed`. Each counter is exact, but counters
/// read together may reflect slightly different moments.
#[derive(Debug)]
pub(crate) struct MetricsCollector {
    /// Events applied to the store
    accepted_count: AtomicU64,
    /// Inputs that failed to decode
    decode_error_count: AtomicU64,
    /// Inputs that decoded but failed validation
    validation_error_count: AtomicU64,
    /// Reports rendered
    report_count: AtomicU64,
    /// Last accepted event as milliseconds since UNIX_EPOCH
    last_activity_millis: AtomicU64,
    /// When the service was created
    start_instant: Instant,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            accepted_count: AtomicU64::new(0),
            decode_error_count: AtomicU64::new(0),
            validation_error_count: AtomicU64::new(0),
            report_count: AtomicU64::new(0),
            last_activity_millis: AtomicU64::new(0),
            start_instant: Instant::now(),
        }
    }

    #[inline]
    pub fn record_accepted(&self) {
        self.accepted_count.fetch_add(1, Ordering::Relaxed);
        self.update_last_activity();
    }

    #[inline]
    pub fn record_rejected(&self, reason: RejectReason) {
        if reason.is_validation() {
            self.validation_error_count.fetch_add(1, Ordering::Relaxed);
        } else {
            self.decode_error_count.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[inline]
    pub fn record_report(&self) {
        self.report_count.fetch_add(1, Ordering::Relaxed);
    }

    fn update_last_activity(&self) {
        let millis = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_millis()
            .min(u64::MAX as u128) as u64;
        self.last_activity_millis.store(millis, Ordering::Relaxed);
    }

    fn last_activity(&self) -> Option<SystemTime> {
        let millis = self.last_activity_millis.load(Ordering::Relaxed);
        if millis == 0 {
            None
        } else {
            SystemTime::UNIX_EPOCH.checked_add(Duration::from_millis(millis))
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            accepted_count: self.accepted_count.load(Ordering::Relaxed),
            decode_error_count: self.decode_error_count.load(Ordering::Relaxed),
            validation_error_count: self.validation_error_count.load(Ordering::Relaxed),
            report_count: self.report_count.load(Ordering::Relaxed),
            uptime: self.start_instant.elapsed(),
            last_activity: self.last_activity(),
        }
    }

    #[inline]
    pub fn accepted_count(&self) -> u64 {
        self.accepted_count.load(Ordering::Relaxed)
    }

    /// Decode and validation rejections combined.
    #[inline]
    pub fn rejected_count(&self) -> u64 {
        self.decode_error_count.load(Ordering::Relaxed)
            + self.validation_error_count.load(Ordering::Relaxed)
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}
