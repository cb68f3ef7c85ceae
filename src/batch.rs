use crate::capability::Capability;
use crate::config::settings::Configuration;
use crate::error::Result;
use crate::guard::TimeoutGuard;
use crate::item::WorkQueue;
use crate::metrics::collector::MetricsCollector;
use crate::metrics::snapshot::MetricsSnapshot;
use crate::outcome::BatchSummary;
use crate::pool::WorkerPool;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Idle,
    Running,
    Finished,
}

/// Runs one batch: builds the queue, drives the pool and summarizes the outcomes.
pub struct BatchController {
    config: Configuration,
    metrics: Arc<MetricsCollector>,
    state_watcher: watch::Sender<BatchState>,
}

impl BatchController {
    /// Rejects an invalid configuration before anything can be submitted.
    pub fn new(config: Configuration, metrics: Option<Arc<MetricsCollector>>) -> Result<Self> {
        config.check()?;
        let (state_tx, _) = watch::channel(BatchState::Idle);

        Ok(Self {
            config,
            metrics: metrics.unwrap_or_else(|| Arc::new(MetricsCollector::new())),
            state_watcher: state_tx,
        })
    }

    pub async fn execute<I, S>(&self, identifiers: I, capability: Arc<dyn Capability>) -> BatchSummary
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let queue = WorkQueue::from_identifiers(identifiers);
        if queue.is_empty() {
            log::info!("No items submitted; nothing to fetch.");
            return BatchSummary::empty();
        }

        self.set_state(BatchState::Running);
        log::info!(
            "Fetching {} items with {} workers ({:?} timeout each)",
            queue.len(),
            self.config.max_concurrency,
            self.config.per_item_timeout
        );

        let pool = WorkerPool::new(
            self.config.max_concurrency,
            TimeoutGuard::new(self.config.per_item_timeout),
            Some(self.metrics.clone()),
        );
        let outcomes = pool.run(queue, capability).await;
        let summary = BatchSummary::from_outcomes(outcomes);

        log::info!(
            "Batch finished: {} succeeded, {} failed",
            summary.succeeded,
            summary.failed
        );
        self.set_state(BatchState::Finished);
        summary
    }

    pub fn get_metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn watch_metrics(&self) -> watch::Receiver<MetricsSnapshot> {
        let (tx, rx) = watch::channel(self.metrics.snapshot());
        let metrics = self.metrics.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_millis(500));
            loop {
                interval.tick().await;
                if tx.send(metrics.snapshot()).is_err() {
                    break;
                }
            }
        });
        rx
    }

    pub fn watch_state(&self) -> watch::Receiver<BatchState> {
        self.state_watcher.subscribe()
    }

    fn set_state(&self, state: BatchState) {
        self.state_watcher.send_replace(state);
    }
}

/// One-shot entry point: validates `config`, runs the batch and returns its summary.
pub async fn execute<I, S>(
    identifiers: I,
    capability: Arc<dyn Capability>,
    config: Configuration,
) -> Result<BatchSummary>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let controller = BatchController::new(config, None)?;
    Ok(controller.execute(identifiers, capability).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::FetchResponse;
    use async_trait::async_trait;

    struct Echo;

    #[async_trait]
    impl Capability for Echo {
        async fn fetch(&self, identifier: &str) -> Result<FetchResponse> {
            Ok(FetchResponse::success(200, identifier))
        }
    }

    #[tokio::test]
    async fn state_moves_to_finished() {
        let controller = BatchController::new(Configuration::default(), None).unwrap();
        let state = controller.watch_state();
        assert_eq!(*state.borrow(), BatchState::Idle);

        let summary = controller.execute(["a", "b"], Arc::new(Echo)).await;
        assert_eq!(summary.total, 2);
        assert_eq!(*state.borrow(), BatchState::Finished);
        assert_eq!(controller.get_metrics().items_completed, 2);
    }

    #[tokio::test]
    async fn empty_batch_stays_idle() {
        let controller = BatchController::new(Configuration::default(), None).unwrap();
        let summary = controller.execute(Vec::<String>::new(), Arc::new(Echo)).await;
        assert_eq!(summary, BatchSummary::empty());
        assert_eq!(*controller.watch_state().borrow(), BatchState::Idle);
        assert_eq!(controller.get_metrics().items_started, 0);
    }
}
