use crate::error::ItemError;
use crate::item::WorkItem;
use crate::outcome::FetchOutcome;
use std::time::Duration;
use tokio::sync::Mutex;

/// Collects exactly one outcome per submitted item.
///
/// Every item owns a write-once slot keyed by its `sequence_index`, so
/// workers may record in any order and the result always comes back in
/// submission order.
pub struct ResultAggregator {
    items: Vec<WorkItem>,
    slots: Mutex<Vec<Option<FetchOutcome>>>,
}

impl ResultAggregator {
    pub fn new(items: &[WorkItem]) -> Self {
        Self {
            items: items.to_vec(),
            slots: Mutex::new(vec![None; items.len()]),
        }
    }

    pub async fn record(&self, outcome: FetchOutcome) {
        let index = outcome.item.sequence_index;
        let mut slots = self.slots.lock().await;
        match slots.get_mut(index) {
            Some(slot @ None) => *slot = Some(outcome),
            Some(Some(_)) => {
                log::warn!(
                    "Ignoring duplicate outcome for item #{} ({})",
                    index,
                    outcome.item.identifier
                );
            }
            None => {
                log::warn!(
                    "Ignoring outcome for unknown item #{} ({})",
                    index,
                    outcome.item.identifier
                );
            }
        }
    }

    /// Outcomes recorded so far, in submission order. Partial until every worker is done.
    pub async fn snapshot(&self) -> Vec<FetchOutcome> {
        self.slots.lock().await.iter().flatten().cloned().collect()
    }

    /// Takes every outcome once all workers have finished. Items without a
    /// recorded outcome are reported as failures so the count always matches.
    pub async fn finish(&self) -> Vec<FetchOutcome> {
        let slots = std::mem::take(&mut *self.slots.lock().await);
        self.items
            .iter()
            .cloned()
            .zip(slots.into_iter().chain(std::iter::repeat(None)))
            .map(|(item, slot)| {
                slot.unwrap_or_else(|| {
                    log::error!(
                        "No outcome recorded for item #{} ({})",
                        item.sequence_index,
                        item.identifier
                    );
                    FetchOutcome::failed(item, ItemError::Missing, Duration::ZERO)
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::FetchResponse;
    use crate::item::WorkQueue;
    use std::sync::Arc;

    fn ok(item: &WorkItem) -> FetchOutcome {
        FetchOutcome::from_response(item.clone(), FetchResponse::success(200, "x"), Duration::ZERO)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_records_are_not_lost() {
        let queue = WorkQueue::from_identifiers((0..200).map(|i| format!("u{i}")));
        let aggregator = Arc::new(ResultAggregator::new(queue.items()));

        let handles: Vec<_> = queue
            .items()
            .iter()
            .cloned()
            .map(|item| {
                let aggregator = aggregator.clone();
                tokio::spawn(async move { aggregator.record(ok(&item)).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(aggregator.snapshot().await.len(), 200);
        let outcomes = aggregator.finish().await;
        assert_eq!(outcomes.len(), 200);
        assert!(outcomes.iter().enumerate().all(|(i, o)| o.sequence_index() == i));
    }

    #[tokio::test]
    async fn slots_are_write_once() {
        let queue = WorkQueue::from_identifiers(["a"]);
        let aggregator = ResultAggregator::new(queue.items());
        let item = &queue.items()[0];

        aggregator.record(ok(item)).await;
        aggregator
            .record(FetchOutcome::failed(item.clone(), ItemError::Timeout, Duration::ZERO))
            .await;

        let outcomes = aggregator.finish().await;
        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].succeeded);
    }

    #[tokio::test]
    async fn missing_slots_become_failures() {
        let queue = WorkQueue::from_identifiers(["a", "b"]);
        let aggregator = ResultAggregator::new(queue.items());
        aggregator.record(ok(&queue.items()[1])).await;

        assert_eq!(aggregator.snapshot().await.len(), 1);
        let outcomes = aggregator.finish().await;
        assert_eq!(outcomes.len(), 2);
        assert!(!outcomes[0].succeeded);
        assert_eq!(outcomes[0].error.as_deref(), Some("no outcome recorded"));
        assert!(outcomes[1].succeeded);
    }
}
