use super::OutputHandler;
use super::console::ConsoleOutput;
use crate::error::Result;
use crate::input::sanitize_filename;
use crate::outcome::FetchOutcome;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Saves each successful payload as `<dir>/<sanitized url>.md` under a
/// `# <url>` heading. Failed outcomes are skipped.
pub struct MarkdownOutput {
    dir: PathBuf,
    console: ConsoleOutput,
    saved: Vec<PathBuf>,
}

impl MarkdownOutput {
    pub fn new(dir: PathBuf, console: ConsoleOutput) -> Result<Self> {
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            console,
            saved: Vec::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn saved(&self) -> &[PathBuf] {
        &self.saved
    }
}

#[async_trait]
impl OutputHandler for MarkdownOutput {
    async fn write(&mut self, outcome: &FetchOutcome) -> Result<()> {
        if !outcome.succeeded {
            return Ok(());
        }

        let url = outcome.display_url();
        let path = self.dir.join(format!("{}.md", sanitize_filename(url)));
        let content = format!("# {}\n\n{}", url, outcome.payload_text());
        tokio::fs::write(&path, content).await?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.console.line(&format!("  ✓ Saved: {}", name))?;
        self.saved.push(path);
        Ok(())
    }
}
