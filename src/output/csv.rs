use super::{OutcomeRecord, OutputHandler};
use crate::error::Result;
use crate::outcome::FetchOutcome;
use async_trait::async_trait;
use std::path::PathBuf;

/// One CSV row per outcome; the header comes from `OutcomeRecord`'s field names.
pub struct CsvOutput {
    writer: csv::Writer<std::fs::File>,
}

impl CsvOutput {
    pub fn new(path: PathBuf) -> Result<Self> {
        let writer = csv::Writer::from_path(path)?;
        Ok(Self { writer })
    }
}

#[async_trait]
impl OutputHandler for CsvOutput {
    async fn write(&mut self, outcome: &FetchOutcome) -> Result<()> {
        self.writer.serialize(OutcomeRecord::new(outcome))?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
