//! Transport seam between the session client and the wire protocol.

use crate::ispconfig::types::RemoteCall;
use serde_json::Value;
use std::future::Future;
use thiserror::Error;

/// Anything able to execute a [`RemoteCall`] against the panel.
///
/// [`SoapTransport`](crate::ispconfig::soap::SoapTransport) is the production
/// implementation; tests substitute a scripted one.
pub trait Transport {
    fn invoke(&self, call: &RemoteCall) -> impl Future<Output = Result<Value, TransportError>>;
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("SOAP fault {code}: {message}")]
    Fault { code: String, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed SOAP envelope: {0}")]
    Xml(String),

    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl TransportError {
    /// The panel reports expired or unknown sessions only through the fault
    /// text ("The session ID is invalid", "The Session is expired ...").
    pub fn is_session_error(&self) -> bool {
        self.to_string().to_lowercase().contains("session")
    }
}
