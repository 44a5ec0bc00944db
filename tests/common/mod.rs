//! Shared test fixtures: a scripted transport and configuration builders.

#![allow(dead_code)]

use ispconfig_zabbix::config::{Config, IspConfigSettings, ModulesConfig, RetryConfig};
use ispconfig_zabbix::ispconfig::{IspConfigClient, RemoteCall, Transport, TransportError};
use secrecy::SecretString;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Replays queued results in order and records every call it receives.
///
/// Clones share state, so a test can keep a handle after moving one into a
/// client. Running out of scripted results is a protocol error, which keeps
/// an unexpected extra call visible in the test failure.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    responses: Arc<Mutex<VecDeque<Result<Value, TransportError>>>>,
    calls: Arc<Mutex<Vec<RemoteCall>>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ok(self, value: Value) -> Self {
        self.responses.lock().unwrap().push_back(Ok(value));
        self
    }

    pub fn fault(self, message: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(TransportError::Fault {
                code: "Server".to_string(),
                message: message.to_string(),
            }));
        self
    }

    pub fn calls(&self) -> Vec<RemoteCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn methods(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.method).collect()
    }
}

impl Transport for ScriptedTransport {
    async fn invoke(&self, call: &RemoteCall) -> Result<Value, TransportError> {
        self.calls.lock().unwrap().push(call.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(TransportError::Protocol(format!(
                    "unscripted call to {}",
                    call.method
                )))
            })
    }
}

pub fn settings() -> IspConfigSettings {
    IspConfigSettings {
        soap_uri: "https://panel.example.com:8080/remote/".to_string(),
        soap_location: "https://panel.example.com:8080/remote/index.php".to_string(),
        username: "zabbix".to_string(),
        password: Some(SecretString::new("secret".into())),
        verify_ssl: true,
        timeout_seconds: 30,
    }
}

pub fn config() -> Config {
    Config {
        ispconfig: settings(),
        modules: ModulesConfig {
            websites: true,
            email: true,
            ..ModulesConfig::default()
        },
        retry: RetryConfig::default(),
    }
}

/// Configuration whose retries do not sleep.
pub fn fast_config() -> Config {
    Config {
        retry: RetryConfig {
            max_attempts: 3,
            delay_seconds: 0,
        },
        ..config()
    }
}

pub fn client(transport: ScriptedTransport) -> IspConfigClient<ScriptedTransport> {
    IspConfigClient::with_transport(&fast_config(), transport).expect("valid test config")
}

pub fn record(value: Value) -> serde_json::Map<String, Value> {
    value.as_object().cloned().expect("record must be a JSON object")
}
