pub mod aggregator;
pub mod batch;
pub mod capability;
pub mod config;
pub mod error;
pub mod guard;
pub mod input;
pub mod item;
pub mod metrics;
pub mod outcome;
pub mod output;
pub mod pool;

pub use aggregator::ResultAggregator;
pub use batch::{BatchController, BatchState, execute};
pub use capability::{Capability, FetchResponse, HttpCapability};
pub use config::Configuration;
pub use error::{Error, ItemError, Result};
pub use guard::TimeoutGuard;
pub use item::{WorkItem, WorkQueue};
pub use metrics::collector::MetricsCollector;
pub use metrics::snapshot::MetricsSnapshot;
pub use outcome::{BatchStatus, BatchSummary, FetchOutcome};
pub use pool::WorkerPool;
