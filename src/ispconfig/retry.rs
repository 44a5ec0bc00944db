use crate::config::RetryConfig;
use crate::ispconfig::transport::TransportError;
use std::time::Duration;
use thiserror::Error;

/// Bounded retry with a fixed pause between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::new(config.max_attempts, Duration::from_secs(config.delay_seconds))
    }
}

/// The last transport failure once every attempt has been used.
#[derive(Debug, Error)]
#[error("{source} (gave up after {attempts} attempt(s) in {elapsed:.1?})")]
pub struct RetryError {
    pub attempts: u32,
    pub elapsed: Duration,
    pub source: TransportError,
}
