use super::OutputHandler;
use crate::error::Result;
use crate::outcome::FetchOutcome;
use async_trait::async_trait;
use indicatif::MultiProgress;
use std::sync::Arc;

/// Prints one line per failed item. Successful items are reported by whichever
/// handler saves them.
#[derive(Clone)]
pub struct ConsoleOutput {
    multi: Option<Arc<MultiProgress>>,
}

impl ConsoleOutput {
    pub fn new(multi: Option<Arc<MultiProgress>>) -> Self {
        Self { multi }
    }

    pub fn line(&self, line: &str) -> Result<()> {
        if let Some(multi) = &self.multi {
            multi
                .println(line)
                .map_err(|e| crate::error::Error::Internal(e.to_string()))?;
        } else {
            println!("{}", line);
        }
        Ok(())
    }
}

impl Default for ConsoleOutput {
    fn default() -> Self {
        Self::new(None)
    }
}

pub fn failure_line(outcome: &FetchOutcome) -> String {
    format!(
        "  ✗ Failed: {} - {}",
        outcome.identifier(),
        outcome.error.as_deref().unwrap_or("Unknown error")
    )
}

#[async_trait]
impl OutputHandler for ConsoleOutput {
    async fn write(&mut self, outcome: &FetchOutcome) -> Result<()> {
        if !outcome.succeeded {
            self.line(&failure_line(outcome))?;
        }
        Ok(())
    }
}
