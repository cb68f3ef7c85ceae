use crate::capability::DEFAULT_USER_AGENT;
use crate::config::settings::{Configuration, DEFAULT_MAX_CONCURRENCY, DEFAULT_TIMEOUT_SECS};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

/// One configuration file as written. Unset fields stay `None` so that
/// inheritance can tell "not given" apart from "given the default value".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub concurrency: Option<usize>,

    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Directory that successful payloads are saved into
    #[serde(default)]
    pub output_dir: Option<String>,

    #[serde(default)]
    pub user_agent: Option<String>,

    /// Optional machine-readable report of every outcome
    #[serde(default)]
    pub report: Option<OutputConfig>,

    /// Optional path to a parent configuration file to inherit from
    #[serde(default)]
    pub extends: Option<String>,
}

impl ConfigFile {
    /// Every field set in `self` wins over `parent`.
    pub fn over(self, parent: ConfigFile) -> ConfigFile {
        ConfigFile {
            concurrency: self.concurrency.or(parent.concurrency),
            timeout_secs: self.timeout_secs.or(parent.timeout_secs),
            output_dir: self.output_dir.or(parent.output_dir),
            user_agent: self.user_agent.or(parent.user_agent),
            report: self.report.or(parent.report),
            extends: None,
        }
    }

    pub fn resolve(self) -> FetchConfig {
        FetchConfig {
            concurrency: self.concurrency.unwrap_or_else(default_concurrency),
            timeout_secs: self.timeout_secs.unwrap_or_else(default_timeout_secs),
            output_dir: self.output_dir.unwrap_or_else(default_output_dir),
            user_agent: self.user_agent.unwrap_or_else(default_user_agent),
            report: self.report,
        }
    }
}

/// Fully resolved settings for a run.
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct FetchConfig {
    pub concurrency: usize,

    pub timeout_secs: u64,

    #[validate(length(min = 1))]
    pub output_dir: String,

    #[validate(length(min = 1))]
    pub user_agent: String,

    pub report: Option<OutputConfig>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        ConfigFile::default().resolve()
    }
}

impl FetchConfig {
    pub fn engine(&self) -> Result<Configuration> {
        Configuration::new(self.concurrency, Duration::from_secs(self.timeout_secs))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutputConfig {
    Json {
        path: String,
    },
    Csv {
        path: String,
    },
    Sqlite {
        path: String,
        #[serde(default = "default_table_name")]
        table: String,
    },
}

fn default_concurrency() -> usize {
    DEFAULT_MAX_CONCURRENCY
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_output_dir() -> String {
    "materials".to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_table_name() -> String {
    "fetch_outcomes".to_string()
}
