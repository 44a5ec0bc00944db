//! Mail domain item keys
//!
//! Plain keys read the `mail_domain_get` record. The aggregate keys
//! (`account_count`, `total_quota`, `total_used`) list the domain's
//! mailboxes with `mail_user_get` and sum them; a failed or malformed
//! listing reports zeros instead of failing the item.

use super::{parse_key, read_field};
use crate::error::MonitorError;
use crate::ispconfig::{EntityKind, Filter, IspConfigClient, Record, Transport};
use crate::zabbix::value::{format_item_value, to_int, ValueKind};
use serde_json::Value;
use std::str::FromStr;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailDomainKey {
    Active,
    Domain,
    ServerId,
    MailCatchall,
    AccountCount,
    TotalQuota,
    TotalUsed,
}

pub(crate) const KEYS: &[(MailDomainKey, &str, &str)] = &[
    (MailDomainKey::Active, "active", "Mail domain active status (0/1)"),
    (MailDomainKey::Domain, "domain", "Domain name"),
    (MailDomainKey::ServerId, "server_id", "Server ID"),
    (MailDomainKey::MailCatchall, "mail_catchall", "Catch-all email address"),
    (MailDomainKey::AccountCount, "account_count", "Number of email accounts in domain"),
    (MailDomainKey::TotalQuota, "total_quota", "Total quota for all accounts (bytes)"),
    (MailDomainKey::TotalUsed, "total_used", "Total used space for all accounts (bytes)"),
];

impl FromStr for MailDomainKey {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_key(KEYS, s)
    }
}

/// Mailbox totals for one mail domain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MailDomainStats {
    pub account_count: u64,
    pub total_quota: i64,
    pub total_used: i64,
}

impl MailDomainStats {
    /// Sum a `mail_user_get` result. Anything but a list counts as no accounts.
    /// Totals saturate at the `i64` bounds.
    pub fn from_accounts(accounts: &Value) -> Self {
        let Value::Array(accounts) = accounts else {
            return Self::default();
        };

        accounts.iter().fold(
            Self {
                account_count: accounts.len() as u64,
                ..Self::default()
            },
            |mut stats, account| {
                let quota = account.get("quota").map(to_int).unwrap_or(0);
                let used = account.get("used").map(to_int).unwrap_or(0);
                stats.total_quota = stats.total_quota.saturating_add(quota);
                stats.total_used = stats.total_used.saturating_add(used);
                stats
            },
        )
    }

    /// Query and sum the mailboxes of `domain_id`; errors degrade to zeros.
    pub async fn fetch<T: Transport>(client: &mut IspConfigClient<T>, domain_id: u64) -> Self {
        let mut filter = Filter::new();
        filter.insert(
            EntityKind::MailDomains.id_field().to_string(),
            Value::from(domain_id),
        );

        let params = vec![Value::Object(filter)];
        match client.call(EntityKind::Emails.get_method(), params).await {
            Ok(accounts) => Self::from_accounts(&accounts),
            Err(e) => {
                warn!("Failed to get mail domain stats for {}: {}", domain_id, e);
                Self::default()
            }
        }
    }
}

impl MailDomainKey {
    /// Value of a plain (non-aggregate) key; `None` for aggregates.
    pub fn read_record(self, domain: &Record) -> Option<String> {
        let value = match self {
            Self::Active => read_field(domain, "active", "n".into(), ValueKind::Boolean),
            Self::Domain => read_field(domain, "domain", "".into(), ValueKind::String),
            Self::ServerId => read_field(domain, "server_id", 0.into(), ValueKind::Numeric),
            Self::MailCatchall => read_field(domain, "mail_catchall", "".into(), ValueKind::String),
            Self::AccountCount | Self::TotalQuota | Self::TotalUsed => return None,
        };
        Some(value)
    }

    /// Value of an aggregate key from precomputed stats; `None` for plain keys.
    pub fn read_stats(self, stats: &MailDomainStats) -> Option<String> {
        let value = match self {
            Self::AccountCount => {
                format_item_value(&Value::from(stats.account_count), ValueKind::Numeric)
            }
            Self::TotalQuota => {
                format_item_value(&Value::from(stats.total_quota), ValueKind::Bytes)
            }
            Self::TotalUsed => format_item_value(&Value::from(stats.total_used), ValueKind::Bytes),
            _ => return None,
        };
        Some(value)
    }

    pub async fn read<T: Transport>(
        self,
        client: &mut IspConfigClient<T>,
        domain: &Record,
        domain_id: u64,
    ) -> String {
        if let Some(value) = self.read_record(domain) {
            return value;
        }

        let stats = MailDomainStats::fetch(client, domain_id).await;
        self.read_stats(&stats).unwrap_or_default()
    }
}
