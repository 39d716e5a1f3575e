//! Retry configuration types.

use serde::{Deserialize, Serialize};

/// Default number of attempts per request.
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Configuration for the retry middleware.
///
/// Deserializes from the `max_retries` key; missing keys fall back to the
/// defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of attempts per request, the first one included.
    pub max_retries: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl RetryConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> RetryConfigBuilder {
        RetryConfigBuilder::default()
    }
}

/// Builder for [`RetryConfig`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RetryConfigBuilder {
    max_retries: Option<u32>,
}

impl RetryConfigBuilder {
    /// Set the maximum number of attempts.
    #[must_use]
    pub const fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> RetryConfig {
        let defaults = RetryConfig::default();
        RetryConfig {
            max_retries: self.max_retries.unwrap_or(defaults.max_retries),
        }
    }
}
