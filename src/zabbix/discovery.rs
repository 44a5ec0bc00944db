//! Zabbix Low-Level Discovery documents
//!
//! A discovery document is `{"data": [{"{#MACRO}": "value", ...}, ...]}`.
//! Records are mapped through a [`MacroMap`]: an ordered list of
//! `(source field, macro name)` pairs. Every pair yields an entry for every
//! record; missing fields become `""` rather than disappearing.

use crate::error::Result;
use crate::ispconfig::types::Record;
use crate::zabbix::value::sanitize_value;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::LazyLock;

/// Ordered `(source field, macro name)` pairs. Source fields may use
/// `parent.child` notation to reach into nested maps.
pub type MacroMap = [(&'static str, &'static str)];

pub const WEBSITE_MACROS: &MacroMap = &[
    ("domain_id", "{#WEBSITE_ID}"),
    ("domain", "{#DOMAIN}"),
    ("server_id", "{#SERVER_ID}"),
    ("document_root", "{#DOCUMENT_ROOT}"),
    ("php", "{#PHP_VERSION}"),
    ("active", "{#ACTIVE}"),
    ("ssl", "{#SSL_ENABLED}"),
];

pub const EMAIL_MACROS: &MacroMap = &[
    ("mailuser_id", "{#MAIL_USER_ID}"),
    ("email", "{#EMAIL}"),
    ("mail_domain_id", "{#MAIL_DOMAIN_ID}"),
    ("quota", "{#QUOTA}"),
    ("used", "{#USED}"),
    ("active", "{#ACTIVE}"),
    ("domain", "{#DOMAIN}"),
];

pub const MAIL_DOMAIN_MACROS: &MacroMap = &[
    ("mail_domain_id", "{#MAIL_DOMAIN_ID}"),
    ("domain", "{#DOMAIN}"),
    ("server_id", "{#SERVER_ID}"),
    ("active", "{#ACTIVE}"),
    ("mail_catchall", "{#CATCH_ALL}"),
];

static MACRO_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\{#[A-Z0-9_]+\}$").expect("valid macro regex"));

/// One discovered entity: macro name → value, in macro map order.
pub type DiscoveryItem = Map<String, Value>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryDocument {
    pub data: Vec<DiscoveryItem>,
}

impl DiscoveryDocument {
    /// `{"data":[]}`, the fail-soft answer for the poller.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Same check as [`validate_lld`] on the typed document.
    pub fn is_valid(&self) -> bool {
        self.data
            .iter()
            .all(|item| item.keys().all(|key| is_macro_name(key)))
    }

    /// Serialize for standard output; slashes and non-ASCII text stay unescaped.
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}

pub fn is_macro_name(name: &str) -> bool {
    MACRO_NAME.is_match(name)
}

/// Map records through `macros` into a discovery document.
///
/// Every record produces one entry per macro, so a record is only dropped
/// when `macros` itself is empty.
pub fn format_discovery(items: &[Record], macros: &MacroMap) -> DiscoveryDocument {
    let data = items
        .iter()
        .map(|item| {
            macros
                .iter()
                .map(|(field, macro_name)| {
                    let value = sanitize_value(&lookup_path(item, field));
                    (macro_name.to_string(), Value::String(value))
                })
                .collect::<DiscoveryItem>()
        })
        .filter(|entry| !entry.is_empty())
        .collect();

    DiscoveryDocument { data }
}

pub fn format_websites_discovery(websites: &[Record]) -> DiscoveryDocument {
    format_discovery(websites, WEBSITE_MACROS)
}

pub fn format_emails_discovery(emails: &[Record]) -> DiscoveryDocument {
    format_discovery(emails, EMAIL_MACROS)
}

pub fn format_mail_domains_discovery(domains: &[Record]) -> DiscoveryDocument {
    format_discovery(domains, MAIL_DOMAIN_MACROS)
}

/// Structural check of an LLD document: `data` is a list of maps whose keys
/// are all `{#NAME}` macros. An empty list is valid.
pub fn validate_lld(document: &Value) -> bool {
    let Some(Value::Array(items)) = document.get("data") else {
        return false;
    };

    items.iter().all(|item| match item {
        Value::Object(map) => map.keys().all(|key| is_macro_name(key)),
        _ => false,
    })
}

/// Resolve `path` in `record`. An exact key wins; otherwise the path is split
/// on `.` and followed through nested maps. Missing paths resolve to `""`.
fn lookup_path(record: &Record, path: &str) -> Value {
    if let Some(value) = record.get(path) {
        return value.clone();
    }

    let mut segments = path.split('.');
    let Some(first) = segments.next() else {
        return Value::String(String::new());
    };

    let mut current = record.get(first);
    for segment in segments {
        current = current.and_then(|value| value.as_object()).and_then(|map| map.get(segment));
    }

    current
        .cloned()
        .unwrap_or_else(|| Value::String(String::new()))
}
