//! Website item keys
//!
//! Reads one field of a `sites_web_domain_get` record per key. Flags arrive
//! as `"y"`/`"n"` and are reported as `1`/`0`; sizes may carry a unit suffix
//! and are reported in bytes.

use super::{parse_key, read_field};
use crate::error::MonitorError;
use crate::ispconfig::Record;
use crate::zabbix::value::ValueKind;
use serde_json::Value;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebsiteKey {
    Active,
    Domain,
    ServerId,
    DocumentRoot,
    PhpVersion,
    SslEnabled,
    Traffic,
    DiskUsage,
    HdQuota,
    BackupInterval,
    BackupCopies,
    Type,
    Ipv4,
    Ipv6,
}

pub(crate) const KEYS: &[(WebsiteKey, &str, &str)] = &[
    (WebsiteKey::Active, "active", "Website active status (0/1)"),
    (WebsiteKey::Domain, "domain", "Domain name"),
    (WebsiteKey::ServerId, "server_id", "Server ID"),
    (WebsiteKey::DocumentRoot, "document_root", "Document root path"),
    (WebsiteKey::PhpVersion, "php_version", "PHP mode"),
    (WebsiteKey::SslEnabled, "ssl_enabled", "SSL status (0/1)"),
    (WebsiteKey::Traffic, "traffic", "Traffic quota"),
    (WebsiteKey::DiskUsage, "disk_usage", "Disk space usage in bytes"),
    (WebsiteKey::HdQuota, "hd_quota", "Hard disk quota in bytes"),
    (WebsiteKey::BackupInterval, "backup_interval", "Backup interval"),
    (WebsiteKey::BackupCopies, "backup_copies", "Number of backup copies kept"),
    (WebsiteKey::Type, "type", "Website type (vhost, alias, ...)"),
    (WebsiteKey::Ipv4, "ipv4", "IPv4 address"),
    (WebsiteKey::Ipv6, "ipv6", "IPv6 address"),
];

impl FromStr for WebsiteKey {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_key(KEYS, s)
    }
}

impl WebsiteKey {
    pub fn read(self, website: &Record) -> String {
        let empty = || Value::String(String::new());

        match self {
            Self::Active => read_field(website, "active", "n".into(), ValueKind::Boolean),
            Self::Domain => read_field(website, "domain", empty(), ValueKind::String),
            Self::ServerId => read_field(website, "server_id", 0.into(), ValueKind::Numeric),
            Self::DocumentRoot => read_field(website, "document_root", empty(), ValueKind::String),
            Self::PhpVersion => read_field(website, "php", "default".into(), ValueKind::String),
            Self::SslEnabled => read_field(website, "ssl", "n".into(), ValueKind::Boolean),
            Self::Traffic => read_field(website, "traffic_quota", 0.into(), ValueKind::Numeric),
            Self::DiskUsage => read_field(website, "hd_usage", 0.into(), ValueKind::Bytes),
            Self::HdQuota => read_field(website, "hd_quota", 0.into(), ValueKind::Bytes),
            Self::BackupInterval => {
                read_field(website, "backup_interval", empty(), ValueKind::String)
            }
            Self::BackupCopies => {
                read_field(website, "backup_copies", 1.into(), ValueKind::Numeric)
            }
            Self::Type => read_field(website, "type", "vhost".into(), ValueKind::String),
            Self::Ipv4 => read_field(website, "ip_address", empty(), ValueKind::String),
            Self::Ipv6 => read_field(website, "ipv6_address", empty(), ValueKind::String),
        }
    }
}
