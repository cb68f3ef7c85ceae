use crate::aggregator::ResultAggregator;
use crate::capability::Capability;
use crate::guard::TimeoutGuard;
use crate::item::WorkQueue;
use crate::metrics::collector::MetricsCollector;
use crate::outcome::FetchOutcome;
use futures::stream::StreamExt;
use std::sync::Arc;

/// Drains a work queue with at most `concurrency` capability calls in flight.
pub struct WorkerPool {
    concurrency: usize,
    guard: TimeoutGuard,
    metrics: Arc<MetricsCollector>,
}

impl WorkerPool {
    pub fn new(concurrency: usize, guard: TimeoutGuard, metrics: Option<Arc<MetricsCollector>>) -> Self {
        Self {
            concurrency: concurrency.max(1),
            guard,
            metrics: metrics.unwrap_or_else(|| Arc::new(MetricsCollector::new())),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Invokes `capability` once per item and returns the outcomes in submission order.
    pub async fn run(&self, queue: WorkQueue, capability: Arc<dyn Capability>) -> Vec<FetchOutcome> {
        if queue.is_empty() {
            return Vec::new();
        }

        let aggregator = Arc::new(ResultAggregator::new(queue.items()));
        let metrics_seed = self.metrics.clone();
        let items = queue.into_stream(self.concurrency * 2, move |_| {
            metrics_seed.increment_items_queued();
        });

        items
            .for_each_concurrent(self.concurrency, |item| {
                let capability = capability.clone();
                let aggregator = aggregator.clone();
                let metrics = self.metrics.clone();
                let guard = self.guard;

                async move {
                    metrics.increment_active_workers();
                    log::debug!("Starting #{}: {}", item.sequence_index, item.identifier);

                    let outcome = guard.invoke(capability, item).await;

                    if outcome.succeeded {
                        metrics.record_success(outcome.elapsed);
                    } else if outcome.is_timeout() {
                        metrics.record_timeout(outcome.elapsed);
                    } else {
                        metrics.record_failure(outcome.elapsed);
                        log::warn!(
                            "Failed: {} - {}",
                            outcome.identifier(),
                            outcome.error.as_deref().unwrap_or("Unknown error")
                        );
                    }

                    aggregator.record(outcome).await;
                    metrics.decrement_active_workers();
                }
            })
            .await;

        aggregator.finish().await
    }
}
