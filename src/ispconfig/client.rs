//! ISPConfig API session client
//!
//! Owns the authenticated session for one process run and wraps every remote
//! call (except `logout`) in bounded retry.
//!
//! # Session lifecycle
//!
//! - [`IspConfigClient::login`] is idempotent: a cached session id is returned
//!   without a remote call.
//! - A failure whose message mentions "session" drops the cached id. The next
//!   attempt of the same retry loop logs in again before re-issuing the call,
//!   so a session that expires mid-run costs one attempt, not the whole run.
//! - The session is released with [`IspConfigClient::logout`], which callers
//!   invoke on every exit path. Dropping a client that still holds a session
//!   only logs a warning; logout is never performed implicitly.
//!
//! # Example
//!
//! ```no_run
//! use ispconfig_zabbix::config::Config;
//! use ispconfig_zabbix::ispconfig::{EntityKind, IspConfigClient};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::discover(None)?;
//! let mut client = IspConfigClient::new(&config)?;
//! let sites = client.get_entities(EntityKind::Websites, None).await;
//! client.logout().await;
//! println!("{} websites", sites?.len());
//! # Ok(())
//! # }
//! ```

use crate::config::{Config, IspConfigSettings};
use crate::error::{MonitorError, Result};
use crate::ispconfig::retry::{RetryError, RetryPolicy};
use crate::ispconfig::soap::SoapTransport;
use crate::ispconfig::transport::{Transport, TransportError};
use crate::ispconfig::types::{active_filter, EntityKind, Filter, Record, RemoteCall};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Client for the ISPConfig remote API.
pub struct IspConfigClient<T: Transport = SoapTransport> {
    transport: T,
    username: String,
    password: SecretString,
    session_id: Option<String>,
    retry: RetryPolicy,
}

impl IspConfigClient<SoapTransport> {
    /// Validate the configuration and build a SOAP-backed client.
    ///
    /// Fails with [`MonitorError::Config`] before any network I/O.
    pub fn new(config: &Config) -> Result<Self> {
        let password = validate_settings(&config.ispconfig)?;
        let transport = SoapTransport::new(&config.ispconfig).map_err(|e| {
            MonitorError::Config(format!("Failed to initialize SOAP client: {}", e))
        })?;
        Ok(Self::assemble(config, transport, password))
    }
}

impl<T: Transport> IspConfigClient<T> {
    /// Build a client over an arbitrary transport.
    pub fn with_transport(config: &Config, transport: T) -> Result<Self> {
        let password = validate_settings(&config.ispconfig)?;
        Ok(Self::assemble(config, transport, password))
    }

    fn assemble(config: &Config, transport: T, password: SecretString) -> Self {
        Self {
            transport,
            username: config.ispconfig.username.clone(),
            password,
            session_id: None,
            retry: RetryPolicy::from(&config.retry),
        }
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Log in and return the session id, reusing a cached one.
    pub async fn login(&mut self) -> Result<String> {
        if let Some(session_id) = &self.session_id {
            return Ok(session_id.clone());
        }

        let call = self.login_call();
        let result = self
            .invoke_with_retry(&call, false)
            .await
            .map_err(|e| MonitorError::api("Login failed", e))?;

        let session_id = session_id_from(result)
            .ok_or_else(|| MonitorError::Auth("Empty session ID returned".to_string()))?;

        info!("Logged in to ISPConfig as {}", self.username);
        self.session_id = Some(session_id.clone());
        Ok(session_id)
    }

    /// Release the session. Never fails: a remote error is logged and the
    /// local session is dropped regardless.
    pub async fn logout(&mut self) -> bool {
        let Some(session_id) = self.session_id.take() else {
            return true;
        };

        let call = RemoteCall::new("logout").arg(session_id);
        match self.transport.invoke(&call).await {
            Ok(_) => {
                info!("Logged out of ISPConfig");
                true
            }
            Err(e) => {
                warn!("Logout failed: {}", e);
                false
            }
        }
    }

    /// List records of one kind. `None` applies the `{active: 'y'}` filter.
    ///
    /// A result that is not a list yields an empty vector.
    pub async fn get_entities(
        &mut self,
        kind: EntityKind,
        filter: Option<Filter>,
    ) -> Result<Vec<Record>> {
        self.login().await?;

        let call = RemoteCall::new(kind.get_method()).arg(filter.unwrap_or_else(active_filter));
        let result = self
            .invoke_with_retry(&call, true)
            .await
            .map_err(|e| MonitorError::api(format!("Failed to get {} records", kind), e))?;

        Ok(into_records(result))
    }

    /// Fetch a single record by primary key, filtering server-side.
    pub async fn get_entity_by_id(&mut self, kind: EntityKind, id: u64) -> Result<Option<Record>> {
        self.login().await?;

        let mut filter = Filter::new();
        filter.insert(kind.id_field().to_string(), Value::from(id));

        let call = RemoteCall::new(kind.get_method()).arg(filter);
        let result = self
            .invoke_with_retry(&call, true)
            .await
            .map_err(|e| MonitorError::api(format!("Failed to get {} {}", kind, id), e))?;

        Ok(into_records(result).into_iter().next())
    }

    /// Statistics for one record via `{entity}_get_stats`.
    pub async fn get_entity_stats(&mut self, kind: EntityKind, id: u64) -> Result<Record> {
        self.login().await?;

        let call = RemoteCall::new(kind.stats_method()).arg(id);
        let result = self
            .invoke_with_retry(&call, true)
            .await
            .map_err(|e| MonitorError::api(format!("Failed to get {} stats for {}", kind, id), e))?;

        match result {
            Value::Object(stats) => Ok(stats),
            _ => Ok(Record::new()),
        }
    }

    /// Invoke an arbitrary remote method; the session id is prepended to `params`.
    pub async fn call(&mut self, method: &str, params: Vec<Value>) -> Result<Value> {
        self.login().await?;

        let call = RemoteCall::new(method).args(params);
        self.invoke_with_retry(&call, true)
            .await
            .map_err(|e| MonitorError::api(format!("Failed to call {}", method), e))
    }

    fn login_call(&self) -> RemoteCall {
        RemoteCall::new("login")
            .arg(self.username.as_str())
            .arg(self.password.expose_secret())
    }

    /// Run `call` up to `max_attempts` times, sleeping `delay` between attempts.
    async fn invoke_with_retry(
        &mut self,
        call: &RemoteCall,
        with_session: bool,
    ) -> std::result::Result<Value, RetryError> {
        let started = Instant::now();
        let mut attempt = 0;

        loop {
            attempt += 1;

            let error = match self.attempt(call, with_session).await {
                Ok(value) => return Ok(value),
                Err(e) => e,
            };

            if error.is_session_error() && self.session_id.take().is_some() {
                warn!("Session rejected by ISPConfig, will log in again");
            }

            if attempt >= self.retry.max_attempts {
                return Err(RetryError {
                    attempts: attempt,
                    elapsed: started.elapsed(),
                    source: error,
                });
            }

            warn!(
                "Attempt {} of {} for {} failed, retrying in {:?}: {}",
                attempt, self.retry.max_attempts, call.method, self.retry.delay, error
            );
            tokio::time::sleep(self.retry.delay).await;
        }
    }

    async fn attempt(
        &mut self,
        call: &RemoteCall,
        with_session: bool,
    ) -> std::result::Result<Value, TransportError> {
        if !with_session {
            return self.transport.invoke(call).await;
        }

        let session_id = match &self.session_id {
            Some(id) => id.clone(),
            None => self.relogin().await?,
        };
        self.transport.invoke(&call.with_session(&session_id)).await
    }

    /// Single login attempt used inside a retry loop after a session loss.
    async fn relogin(&mut self) -> std::result::Result<String, TransportError> {
        debug!("Re-authenticating before retry");
        let result = self.transport.invoke(&self.login_call()).await?;
        let session_id = session_id_from(result).ok_or_else(|| {
            TransportError::Protocol("Empty session ID returned on re-login".to_string())
        })?;
        self.session_id = Some(session_id.clone());
        Ok(session_id)
    }
}

impl<T: Transport> Drop for IspConfigClient<T> {
    fn drop(&mut self) {
        if self.session_id.is_some() {
            warn!("ISPConfig client dropped with an open session; logout() was not called");
        }
    }
}

/// Check required settings and return the password.
fn validate_settings(settings: &IspConfigSettings) -> Result<SecretString> {
    let required = [
        ("soap_uri", settings.soap_uri.as_str()),
        ("soap_location", settings.soap_location.as_str()),
        ("username", settings.username.as_str()),
    ];
    for (key, value) in required {
        if value.trim().is_empty() {
            return Err(missing(key));
        }
    }

    let password = match &settings.password {
        Some(password) if !password.expose_secret().is_empty() => password.clone(),
        _ => return Err(missing("password")),
    };

    match url::Url::parse(&settings.soap_uri) {
        Ok(uri) if uri.has_host() => Ok(password),
        _ => Err(MonitorError::Config(format!(
            "Invalid SOAP URI: {}",
            settings.soap_uri
        ))),
    }
}

fn missing(key: &str) -> MonitorError {
    MonitorError::Config(format!("Missing required configuration: {}", key))
}

/// A usable session id: a non-empty string other than "0", or a number.
fn session_id_from(result: Value) -> Option<String> {
    match result {
        Value::String(s) if !s.is_empty() && s != "0" => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn into_records(result: Value) -> Vec<Record> {
    match result {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(record) => Some(record),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}
