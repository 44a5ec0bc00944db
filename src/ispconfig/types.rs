//! ISPConfig remote API types
//!
//! Panel records are loosely typed (`"y"`/`"n"` flags, numbers sent as
//! strings, human sizes such as `"1.5G"`), so they are kept as ordered JSON
//! maps and interpreted by the formatters rather than deserialized into
//! fixed structs.

use serde_json::{Map, Value};
use std::fmt;

/// A single record returned by a `*_get` call.
pub type Record = Map<String, Value>;

/// Server-side filter passed to a `*_get` call.
pub type Filter = Map<String, Value>;

/// Entity families exposed to Zabbix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum EntityKind {
    Websites,
    Emails,
    MailDomains,
}

impl EntityKind {
    /// Remote listing method.
    pub fn get_method(self) -> &'static str {
        match self {
            EntityKind::Websites => "sites_web_domain_get",
            EntityKind::Emails => "mail_user_get",
            EntityKind::MailDomains => "mail_domain_get",
        }
    }

    /// Remote statistics method, `{entity}_get_stats`.
    pub fn stats_method(self) -> String {
        format!("{}_stats", self.get_method())
    }

    /// Primary key field used for by-id lookups.
    pub fn id_field(self) -> &'static str {
        match self {
            EntityKind::Websites => "domain_id",
            EntityKind::Emails => "mailuser_id",
            EntityKind::MailDomains => "mail_domain_id",
        }
    }

    /// Configuration toggle under `[modules]` that gates this entity.
    pub fn module(self) -> &'static str {
        match self {
            EntityKind::Websites => "websites",
            EntityKind::Emails | EntityKind::MailDomains => "email",
        }
    }

    /// Singular noun for log and error messages.
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Websites => "website",
            EntityKind::Emails => "email",
            EntityKind::MailDomains => "mail domain",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The listing filter applied when the caller does not supply one.
pub fn active_filter() -> Filter {
    let mut filter = Filter::new();
    filter.insert("active".to_string(), Value::String("y".to_string()));
    filter
}

/// A remote method invocation: method name plus ordered positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteCall {
    pub method: String,
    pub params: Vec<Value>,
}

impl RemoteCall {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            params: Vec::new(),
        }
    }

    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.params.push(value.into());
        self
    }

    pub fn args(mut self, values: impl IntoIterator<Item = Value>) -> Self {
        self.params.extend(values);
        self
    }

    /// Copy of this call with the session id prepended to the parameters.
    pub fn with_session(&self, session_id: &str) -> Self {
        let mut params = Vec::with_capacity(self.params.len() + 1);
        params.push(Value::String(session_id.to_string()));
        params.extend(self.params.iter().cloned());
        Self {
            method: self.method.clone(),
            params,
        }
    }
}
