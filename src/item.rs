use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

/// One unit of fetch work: the identifier and its position in the submitted list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkItem {
    pub identifier: String,
    pub sequence_index: usize,
}

impl WorkItem {
    pub fn new(identifier: impl Into<String>, sequence_index: usize) -> Self {
        Self {
            identifier: identifier.into(),
            sequence_index,
        }
    }
}

/// The ordered, immutable list of items submitted at batch start.
#[derive(Debug, Clone, Default)]
pub struct WorkQueue {
    items: Vec<WorkItem>,
}

impl WorkQueue {
    /// Builds one item per identifier, keeping input order. Duplicates stay separate items.
    pub fn from_identifiers<I, S>(identifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let items = identifiers
            .into_iter()
            .enumerate()
            .map(|(index, identifier)| WorkItem::new(identifier, index))
            .collect();
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[WorkItem] {
        &self.items
    }

    /// Feeds the items into a bounded channel from a seeding task and returns
    /// the receiving end as a stream. `on_enqueue` runs once per item sent.
    pub fn into_stream<F>(self, buffer: usize, on_enqueue: F) -> ReceiverStream<WorkItem>
    where
        F: Fn(&WorkItem) + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        tokio::spawn(async move {
            for item in self.items {
                on_enqueue(&item);
                if tx.send(item).await.is_err() {
                    log::debug!("Work queue receiver dropped; stopping seed task");
                    break;
                }
            }
        });
        ReceiverStream::new(rx)
    }
}
