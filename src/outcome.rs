use crate::capability::FetchResponse;
use crate::error::ItemError;
use crate::item::WorkItem;
use std::borrow::Cow;
use std::time::Duration;

/// The single recorded result for one work item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    pub item: WorkItem,
    pub succeeded: bool,
    pub status_code: Option<u16>,
    pub payload: Option<Vec<u8>>,
    pub error: Option<String>,
    /// Where the capability ended up after redirects, when it reports it.
    pub final_url: Option<String>,
    pub elapsed: Duration,
}

impl FetchOutcome {
    pub fn from_response(item: WorkItem, response: FetchResponse, elapsed: Duration) -> Self {
        Self {
            item,
            succeeded: response.succeeded,
            status_code: response.status_code,
            payload: response.payload,
            error: response.error,
            final_url: response.final_url,
            elapsed,
        }
    }

    pub fn failed(item: WorkItem, error: ItemError, elapsed: Duration) -> Self {
        Self {
            item,
            succeeded: false,
            status_code: None,
            payload: None,
            error: Some(error.to_string()),
            final_url: None,
            elapsed,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.item.identifier
    }

    pub fn sequence_index(&self) -> usize {
        self.item.sequence_index
    }

    pub fn is_timeout(&self) -> bool {
        self.error.as_deref() == Some("timeout")
    }

    /// The URL to label saved content with: the final URL if known, else the submitted one.
    pub fn display_url(&self) -> &str {
        self.final_url.as_deref().unwrap_or(&self.item.identifier)
    }

    pub fn payload_text(&self) -> Cow<'_, str> {
        match &self.payload {
            Some(bytes) => String::from_utf8_lossy(bytes),
            None => Cow::Borrowed(""),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    Success,
    Failure,
}

/// Aggregate counts plus every outcome, in submission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub outcomes: Vec<FetchOutcome>,
}

impl BatchSummary {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_outcomes(mut outcomes: Vec<FetchOutcome>) -> Self {
        outcomes.sort_by_key(|o| o.item.sequence_index);
        let total = outcomes.len();
        let succeeded = outcomes.iter().filter(|o| o.succeeded).count();
        Self {
            total,
            succeeded,
            failed: total - succeeded,
            outcomes,
        }
    }

    pub fn status(&self) -> BatchStatus {
        if self.failed > 0 {
            BatchStatus::Failure
        } else {
            BatchStatus::Success
        }
    }

    pub fn is_success(&self) -> bool {
        self.status() == BatchStatus::Success
    }

    /// Process exit code for a CLI built on the batch.
    pub fn exit_code(&self) -> i32 {
        match self.status() {
            BatchStatus::Success => 0,
            BatchStatus::Failure => 1,
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &FetchOutcome> {
        self.outcomes.iter().filter(|o| !o.succeeded)
    }
}
