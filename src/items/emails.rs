//! Mailbox item keys

use super::{field_or, parse_key, read_field};
use crate::error::MonitorError;
use crate::ispconfig::Record;
use crate::zabbix::value::{calculate_email_usage_percent, format_item_value, to_int, ValueKind};
use serde_json::Value;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailKey {
    Active,
    Email,
    Domain,
    Quota,
    Used,
    UsagePercent,
    SpamfilterEnabled,
    AntivirusEnabled,
    MailDomainId,
    ServerId,
    Homedir,
}

pub(crate) const KEYS: &[(EmailKey, &str, &str)] = &[
    (EmailKey::Active, "active", "Email active status (0/1)"),
    (EmailKey::Email, "email", "Full email address"),
    (EmailKey::Domain, "domain", "Domain name"),
    (EmailKey::Quota, "quota", "Mailbox quota in bytes"),
    (EmailKey::Used, "used", "Currently used space in bytes"),
    (EmailKey::UsagePercent, "usage_percent", "Usage percentage (0-100)"),
    (EmailKey::SpamfilterEnabled, "spamfilter_enabled", "Spamfilter status (0/1)"),
    (EmailKey::AntivirusEnabled, "antivirus_enabled", "Antivirus status (0/1)"),
    (EmailKey::MailDomainId, "mail_domain_id", "Mail domain ID"),
    (EmailKey::ServerId, "server_id", "Server ID"),
    (EmailKey::Homedir, "homedir", "Home directory path"),
];

impl FromStr for EmailKey {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_key(KEYS, s)
    }
}

impl EmailKey {
    pub fn read(self, email: &Record) -> String {
        let empty = || Value::String(String::new());

        match self {
            Self::Active => read_field(email, "active", "n".into(), ValueKind::Boolean),
            Self::Email => read_field(email, "email", empty(), ValueKind::String),
            Self::Domain => read_field(email, "domain", empty(), ValueKind::String),
            Self::Quota => read_field(email, "quota", 0.into(), ValueKind::Bytes),
            Self::Used => read_field(email, "used", 0.into(), ValueKind::Bytes),
            Self::UsagePercent => {
                let quota = to_int(&field_or(email, "quota", 0.into()));
                let used = to_int(&field_or(email, "used", 0.into()));
                let percent = calculate_email_usage_percent(used as f64, quota as f64);
                format_item_value(&Value::from(percent), ValueKind::Numeric)
            }
            Self::SpamfilterEnabled => {
                read_field(email, "spamfilter_enabled", "n".into(), ValueKind::Boolean)
            }
            Self::AntivirusEnabled => {
                read_field(email, "antivirus_enabled", "n".into(), ValueKind::Boolean)
            }
            Self::MailDomainId => read_field(email, "mail_domain_id", 0.into(), ValueKind::Numeric),
            Self::ServerId => read_field(email, "server_id", 0.into(), ValueKind::Numeric),
            Self::Homedir => read_field(email, "homedir", empty(), ValueKind::String),
        }
    }
}
