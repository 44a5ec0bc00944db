use crate::ispconfig::retry::RetryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("ISPConfig API error: {context}: {source}")]
    Api {
        context: String,
        #[source]
        source: RetryError,
    },

    #[error("Unknown key: {0}")]
    UnknownKey(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Invalid LLD data: {0}")]
    Validation(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MonitorError {
    pub(crate) fn api(context: impl Into<String>, source: RetryError) -> Self {
        Self::Api {
            context: context.into(),
            source,
        }
    }

    /// Authentication failures are a flavour of remote API failure.
    pub fn is_api_error(&self) -> bool {
        matches!(self, Self::Api { .. } | Self::Auth(_))
    }
}

pub type Result<T> = std::result::Result<T, MonitorError>;
