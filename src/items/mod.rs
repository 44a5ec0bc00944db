//! Item Readers
//!
//! Per-entity metric keys for Zabbix key-value mode. Each reader turns one
//! panel record into the bare string for one item key.
//!
//! # Architecture
//!
//! Readers follow a consistent pattern:
//! - A key enum with a `KEYS` table of `(key, name, description)` rows
//! - `FromStr` on the key enum, failing with [`MonitorError::UnknownKey`]
//! - A `read` method that looks up the field (falling back to a default
//!   when absent or null) and formats it with [`format_item_value`]
//!
//! Keys are parsed before any network I/O so that an unsupported key fails
//! immediately.

use crate::error::{MonitorError, Result};
use crate::ispconfig::{EntityKind, IspConfigClient, Record, Transport};
use crate::zabbix::value::{format_item_value, ValueKind};
use serde_json::Value;

pub mod emails;
pub mod mail_domains;
pub mod websites;

pub use emails::EmailKey;
pub use mail_domains::{MailDomainKey, MailDomainStats};
pub use websites::WebsiteKey;

/// A parsed item key for one entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKey {
    Website(WebsiteKey),
    Email(EmailKey),
    MailDomain(MailDomainKey),
}

impl ItemKey {
    pub fn parse(kind: EntityKind, name: &str) -> Result<Self> {
        Ok(match kind {
            EntityKind::Websites => Self::Website(name.parse()?),
            EntityKind::Emails => Self::Email(name.parse()?),
            EntityKind::MailDomains => Self::MailDomain(name.parse()?),
        })
    }

    /// `(name, description)` for every key of `kind`, in display order.
    pub fn catalog(kind: EntityKind) -> Vec<(&'static str, &'static str)> {
        match kind {
            EntityKind::Websites => websites::KEYS.iter().map(|(_, n, d)| (*n, *d)).collect(),
            EntityKind::Emails => emails::KEYS.iter().map(|(_, n, d)| (*n, *d)).collect(),
            EntityKind::MailDomains => {
                mail_domains::KEYS.iter().map(|(_, n, d)| (*n, *d)).collect()
            }
        }
    }

    /// Read the value for `record`. Only mail domain aggregates touch the API.
    pub async fn read<T: Transport>(
        self,
        client: &mut IspConfigClient<T>,
        record: &Record,
        id: u64,
    ) -> String {
        match self {
            Self::Website(key) => key.read(record),
            Self::Email(key) => key.read(record),
            Self::MailDomain(key) => key.read(client, record, id).await,
        }
    }
}

/// Look up a key in a `(key, name, description)` table.
pub(crate) fn parse_key<K: Copy>(
    table: &[(K, &'static str, &'static str)],
    name: &str,
) -> Result<K> {
    table
        .iter()
        .find(|(_, key_name, _)| *key_name == name)
        .map(|(key, _, _)| *key)
        .ok_or_else(|| MonitorError::UnknownKey(name.to_string()))
}

/// Field value, or `default` when the field is absent or null.
pub(crate) fn field_or(record: &Record, field: &str, default: Value) -> Value {
    match record.get(field) {
        Some(Value::Null) | None => default,
        Some(value) => value.clone(),
    }
}

pub(crate) fn read_field(record: &Record, field: &str, default: Value, kind: ValueKind) -> String {
    format_item_value(&field_or(record, field, default), kind)
}
