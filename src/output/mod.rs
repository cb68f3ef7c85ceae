use crate::error::Result;
use crate::outcome::{BatchSummary, FetchOutcome};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use self::console::ConsoleOutput;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub mod console;
pub mod csv;
pub mod json;
pub mod markdown;
pub mod sqlite;

/// Receives outcomes after a batch has finished. Persistence lives here, never in the engine.
#[async_trait]
pub trait OutputHandler: Send + Sync {
    async fn write(&mut self, outcome: &FetchOutcome) -> Result<()>;
    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Flat, payload-free view of an outcome used by the report formats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    pub sequence_index: usize,
    pub identifier: String,
    pub succeeded: bool,
    pub status_code: Option<u16>,
    pub error: Option<String>,
    pub final_url: Option<String>,
    pub elapsed_ms: u64,
    pub bytes: usize,
    pub recorded_at: DateTime<Utc>,
}

impl OutcomeRecord {
    pub fn new(outcome: &FetchOutcome) -> Self {
        Self {
            sequence_index: outcome.item.sequence_index,
            identifier: outcome.item.identifier.clone(),
            succeeded: outcome.succeeded,
            status_code: outcome.status_code,
            error: outcome.error.clone(),
            final_url: outcome.final_url.clone(),
            elapsed_ms: outcome.elapsed.as_millis() as u64,
            bytes: outcome.payload.as_ref().map_or(0, Vec::len),
            recorded_at: Utc::now(),
        }
    }
}

/// What happened while handing a batch's outcomes to the output handlers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteReport {
    /// Successful fetches that at least one handler failed to persist.
    pub unsaved: BTreeSet<usize>,
    pub write_errors: usize,
    pub close_errors: usize,
}

impl WriteReport {
    /// Final `(succeeded, failed)` counts: an unsaved fetch counts as failed.
    pub fn counts(&self, summary: &BatchSummary) -> (usize, usize) {
        let unsaved = self.unsaved.len();
        (summary.succeeded - unsaved, summary.failed + unsaved)
    }

    pub fn is_success(&self, summary: &BatchSummary) -> bool {
        self.counts(summary).1 == 0 && self.close_errors == 0
    }
}

/// Writes every outcome to every handler, then closes them all.
///
/// A failed write is printed as `✗ Error: <url> - <cause>` and counted; it
/// never stops the remaining outcomes or handlers.
pub async fn write_all(
    summary: &BatchSummary,
    handlers: &mut [Box<dyn OutputHandler>],
    console: &ConsoleOutput,
) -> WriteReport {
    let mut report = WriteReport::default();

    for outcome in &summary.outcomes {
        for handler in handlers.iter_mut() {
            if let Err(e) = handler.write(outcome).await {
                report.write_errors += 1;
                if outcome.succeeded {
                    report.unsaved.insert(outcome.sequence_index());
                }
                log::error!("Failed to write {}: {}", outcome.identifier(), e);
                let line = format!("  ✗ Error: {} - {}", outcome.identifier(), e);
                if let Err(e) = console.line(&line) {
                    log::error!("Failed to print error line: {}", e);
                }
            }
        }
    }

    for handler in handlers.iter_mut() {
        if let Err(e) = handler.close().await {
            report.close_errors += 1;
            log::error!("Failed to close output: {}", e);
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::FetchResponse;
    use crate::error::ItemError;
    use crate::item::WorkItem;
    use crate::output::json::JsonOutput;
    use crate::output::markdown::MarkdownOutput;
    use std::time::Duration;
    use tempfile::TempDir;

    #[tokio::test]
    async fn one_unsavable_page_does_not_stop_the_rest() {
        let dir = TempDir::new().unwrap();
        let report_path = dir.path().join("report.json");
        let long_url = format!("https://example.com/{}", "a".repeat(300));

        let summary = BatchSummary::from_outcomes(vec![
            FetchOutcome::from_response(
                WorkItem::new(long_url.clone(), 0),
                FetchResponse::success(200, "too long to name"),
                Duration::ZERO,
            ),
            FetchOutcome::from_response(
                WorkItem::new("https://example.com/ok", 1),
                FetchResponse::success(200, "saved"),
                Duration::ZERO,
            ),
            FetchOutcome::failed(
                WorkItem::new("https://example.com/slow", 2),
                ItemError::Timeout,
                Duration::ZERO,
            ),
        ]);

        let mut handlers: Vec<Box<dyn OutputHandler>> = vec![
            Box::new(MarkdownOutput::new(dir.path().join("materials"), ConsoleOutput::default()).unwrap()),
            Box::new(JsonOutput::new(report_path.clone()).unwrap()),
        ];
        let report = write_all(&summary, &mut handlers, &ConsoleOutput::default()).await;

        assert_eq!(report.unsaved, BTreeSet::from([0]));
        assert_eq!(report.write_errors, 1);
        assert_eq!(report.close_errors, 0);
        assert_eq!(report.counts(&summary), (1, 2));
        assert!(!report.is_success(&summary));

        let saved = std::fs::read_to_string(dir.path().join("materials/example_com_ok.md")).unwrap();
        assert_eq!(saved, "# https://example.com/ok\n\nsaved");

        let records: Vec<OutcomeRecord> =
            serde_json::from_str(&std::fs::read_to_string(report_path).unwrap()).unwrap();
        assert_eq!(records.len(), 3);
    }

    #[tokio::test]
    async fn clean_run_keeps_batch_counts() {
        let dir = TempDir::new().unwrap();
        let summary = BatchSummary::from_outcomes(vec![FetchOutcome::from_response(
            WorkItem::new("https://example.com/a", 0),
            FetchResponse::success(200, "a"),
            Duration::ZERO,
        )]);
        let mut handlers: Vec<Box<dyn OutputHandler>> = vec![Box::new(
            MarkdownOutput::new(dir.path().to_path_buf(), ConsoleOutput::default()).unwrap(),
        )];

        let report = write_all(&summary, &mut handlers, &ConsoleOutput::default()).await;
        assert_eq!(report, WriteReport::default());
        assert_eq!(report.counts(&summary), (1, 0));
        assert!(report.is_success(&summary));
    }
}
