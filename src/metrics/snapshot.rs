use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub items_queued: u64,
    pub items_started: u64,
    pub items_completed: u64,
    pub items_succeeded: u64,
    pub items_failed: u64,
    pub items_timed_out: u64,
    pub active_workers: u64,
    pub peak_active_workers: u64,
    pub success_rate: f64,
    pub avg_response_time_ms: u64,
    pub items_per_second: f64,
    pub elapsed_seconds: f64,
}
