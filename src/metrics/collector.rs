use crate::metrics::snapshot::MetricsSnapshot;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use std::time::{Duration, Instant};

/// Live counters for progress display. Summary counts are never read from here.
#[derive(Clone)]
pub struct MetricsCollector {
    items_queued: Arc<AtomicU64>,
    items_started: Arc<AtomicU64>,
    items_completed: Arc<AtomicU64>,
    items_succeeded: Arc<AtomicU64>,
    items_failed: Arc<AtomicU64>,
    items_timed_out: Arc<AtomicU64>,
    active_workers: Arc<AtomicU64>,
    peak_active_workers: Arc<AtomicU64>,
    total_response_time_ms: Arc<AtomicU64>,
    start_time: Arc<Instant>,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self {
            items_queued: Arc::new(AtomicU64::new(0)),
            items_started: Arc::new(AtomicU64::new(0)),
            items_completed: Arc::new(AtomicU64::new(0)),
            items_succeeded: Arc::new(AtomicU64::new(0)),
            items_failed: Arc::new(AtomicU64::new(0)),
            items_timed_out: Arc::new(AtomicU64::new(0)),
            active_workers: Arc::new(AtomicU64::new(0)),
            peak_active_workers: Arc::new(AtomicU64::new(0)),
            total_response_time_ms: Arc::new(AtomicU64::new(0)),
            start_time: Arc::new(Instant::now()),
        }
    }
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_items_queued(&self) {
        self.items_queued.fetch_add(1, Ordering::SeqCst);
    }

    pub fn increment_active_workers(&self) {
        self.items_started.fetch_add(1, Ordering::SeqCst);
        let now = self.active_workers.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_active_workers.fetch_max(now, Ordering::SeqCst);
    }

    pub fn decrement_active_workers(&self) {
        self.active_workers.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn record_success(&self, duration: Duration) {
        self.items_completed.fetch_add(1, Ordering::SeqCst);
        self.items_succeeded.fetch_add(1, Ordering::SeqCst);
        self.total_response_time_ms
            .fetch_add(duration.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn record_failure(&self, duration: Duration) {
        self.items_completed.fetch_add(1, Ordering::SeqCst);
        self.items_failed.fetch_add(1, Ordering::SeqCst);
        self.total_response_time_ms
            .fetch_add(duration.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn record_timeout(&self, duration: Duration) {
        self.items_timed_out.fetch_add(1, Ordering::SeqCst);
        self.record_failure(duration);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let completed = self.items_completed.load(Ordering::SeqCst);
        let succeeded = self.items_succeeded.load(Ordering::SeqCst);
        let total_time = self.total_response_time_ms.load(Ordering::SeqCst);

        let success_rate = if completed > 0 {
            (succeeded as f64 / completed as f64) * 100.0
        } else {
            0.0
        };

        let avg_response_time_ms = if completed > 0 {
            total_time / completed
        } else {
            0
        };

        let elapsed = self.start_time.elapsed().as_secs_f64();

        MetricsSnapshot {
            items_queued: self.items_queued.load(Ordering::SeqCst),
            items_started: self.items_started.load(Ordering::SeqCst),
            items_completed: completed,
            items_succeeded: succeeded,
            items_failed: self.items_failed.load(Ordering::SeqCst),
            items_timed_out: self.items_timed_out.load(Ordering::SeqCst),
            active_workers: self.active_workers.load(Ordering::SeqCst),
            peak_active_workers: self.peak_active_workers.load(Ordering::SeqCst),
            success_rate,
            avg_response_time_ms,
            items_per_second: if elapsed > 0.0 {
                completed as f64 / elapsed
            } else {
                0.0
            },
            elapsed_seconds: elapsed,
        }
    }
}
