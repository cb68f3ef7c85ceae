use crate::error::{Error, Result};
use std::borrow::Cow;
use std::time::Duration;
use validator::{Validate, ValidationError, ValidationErrors};

pub const DEFAULT_MAX_CONCURRENCY: usize = 5;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Engine settings, fixed for the lifetime of one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Configuration {
    pub max_concurrency: usize,
    pub per_item_timeout: Duration,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            per_item_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Configuration {
    pub fn new(max_concurrency: usize, per_item_timeout: Duration) -> Result<Self> {
        let config = Self {
            max_concurrency,
            per_item_timeout,
        };
        config.check()?;
        Ok(config)
    }

    /// Validates and converts the failure into the crate error.
    pub fn check(&self) -> Result<()> {
        self.validate().map_err(Error::Validation)
    }
}

impl Validate for Configuration {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.max_concurrency < 1 {
            errors.add(
                "max_concurrency",
                invalid("range", "max_concurrency must be at least 1"),
            );
        }
        if self.per_item_timeout.is_zero() {
            errors.add(
                "per_item_timeout",
                invalid("range", "per_item_timeout must be greater than zero"),
            );
        }

        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}
