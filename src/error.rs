use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Input error: {0}")]
    Input(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("{0}")]
    Capability(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True for errors raised while setting up a batch, before any item is submitted.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Config(_) | Error::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Why a single item failed. Never escapes the batch; it is rendered into
/// the item's outcome.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ItemError {
    #[error("timeout")]
    Timeout,

    #[error("{0}")]
    Capability(String),

    #[error("capability panicked: {0}")]
    Panicked(String),

    #[error("no outcome recorded")]
    Missing,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_renders_as_plain_word() {
        assert_eq!(ItemError::Timeout.to_string(), "timeout");
    }

    #[test]
    fn config_errors_are_flagged() {
        assert!(Error::Config("bad".into()).is_configuration());
        assert!(Error::Validation(validator::ValidationErrors::new()).is_configuration());
        assert!(!Error::Capability("boom".into()).is_configuration());
    }
}
