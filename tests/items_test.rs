//! Item key reader tests

mod common;

use common::{client, record, ScriptedTransport};
use ispconfig_zabbix::error::MonitorError;
use ispconfig_zabbix::ispconfig::EntityKind;
use ispconfig_zabbix::items::{EmailKey, ItemKey, MailDomainKey, MailDomainStats, WebsiteKey};
use serde_json::json;

#[test]
fn test_catalogs_list_every_key() {
    let names = |kind| -> Vec<&'static str> {
        ItemKey::catalog(kind).into_iter().map(|(n, _)| n).collect()
    };

    assert_eq!(
        names(EntityKind::Websites),
        vec![
            "active", "domain", "server_id", "document_root", "php_version", "ssl_enabled",
            "traffic", "disk_usage", "hd_quota", "backup_interval", "backup_copies", "type",
            "ipv4", "ipv6"
        ]
    );
    assert_eq!(
        names(EntityKind::Emails),
        vec![
            "active", "email", "domain", "quota", "used", "usage_percent", "spamfilter_enabled",
            "antivirus_enabled", "mail_domain_id", "server_id", "homedir"
        ]
    );
    assert_eq!(
        names(EntityKind::MailDomains),
        vec![
            "active", "domain", "server_id", "mail_catchall", "account_count", "total_quota",
            "total_used"
        ]
    );
}

#[test]
fn test_every_catalog_key_parses() {
    for kind in [EntityKind::Websites, EntityKind::Emails, EntityKind::MailDomains] {
        for (name, _) in ItemKey::catalog(kind) {
            assert!(ItemKey::parse(kind, name).is_ok(), "{} {}", kind, name);
        }
    }
}

#[test]
fn test_unknown_key_is_rejected() {
    let err = ItemKey::parse(EntityKind::Websites, "uptime").unwrap_err();

    assert!(matches!(err, MonitorError::UnknownKey(ref k) if k == "uptime"));
    assert!("quota".parse::<WebsiteKey>().is_err());
    assert!("account_count".parse::<EmailKey>().is_err());
}

#[test]
fn test_website_keys_read_and_coerce() {
    // Given: A website record with panel-style values
    let site = record(json!({
        "domain": "example.com",
        "active": "y",
        "ssl": "n",
        "php": "php-fpm",
        "hd_quota": "1.5G",
        "hd_usage": "524288",
        "traffic_quota": "-1",
        "ip_address": "*"
    }));

    // Then: Each key formats its field
    assert_eq!(WebsiteKey::Active.read(&site), "1");
    assert_eq!(WebsiteKey::SslEnabled.read(&site), "0");
    assert_eq!(WebsiteKey::Domain.read(&site), "example.com");
    assert_eq!(WebsiteKey::PhpVersion.read(&site), "php-fpm");
    assert_eq!(WebsiteKey::HdQuota.read(&site), "1610612736");
    assert_eq!(WebsiteKey::DiskUsage.read(&site), "524288");
    assert_eq!(WebsiteKey::Traffic.read(&site), "-1");
    assert_eq!(WebsiteKey::Ipv4.read(&site), "*");
}

#[test]
fn test_website_keys_fall_back_to_defaults() {
    let site = record(json!({"domain": "example.com", "backup_copies": null}));

    assert_eq!(WebsiteKey::Active.read(&site), "0");
    assert_eq!(WebsiteKey::BackupCopies.read(&site), "1");
    assert_eq!(WebsiteKey::Type.read(&site), "vhost");
    assert_eq!(WebsiteKey::PhpVersion.read(&site), "default");
    assert_eq!(WebsiteKey::ServerId.read(&site), "0");
    assert_eq!(WebsiteKey::Ipv6.read(&site), "");
}

#[test]
fn test_email_usage_percent() {
    let mailbox = record(json!({"email": "info@example.com", "quota": "1000", "used": "250"}));
    let unlimited = record(json!({"quota": "0", "used": "250"}));
    let over = record(json!({"quota": 100, "used": 300}));

    assert_eq!(EmailKey::UsagePercent.read(&mailbox), "25");
    assert_eq!(EmailKey::UsagePercent.read(&unlimited), "0");
    assert_eq!(EmailKey::UsagePercent.read(&over), "100");
    assert_eq!(EmailKey::Email.read(&mailbox), "info@example.com");
    assert_eq!(EmailKey::Quota.read(&mailbox), "1000");
    assert_eq!(EmailKey::SpamfilterEnabled.read(&mailbox), "0");
}

#[test]
fn test_mail_domain_stats_sum_accounts() {
    let accounts = json!([
        {"quota": "1000", "used": "100"},
        {"quota": 2000, "used": "50"},
        {"quota": null}
    ]);

    let stats = MailDomainStats::from_accounts(&accounts);

    assert_eq!(
        stats,
        MailDomainStats {
            account_count: 3,
            total_quota: 3000,
            total_used: 150
        }
    );
    assert_eq!(MailDomainStats::from_accounts(&json!(false)), MailDomainStats::default());
}

#[test]
fn test_mail_domain_totals_saturate_instead_of_overflowing() {
    // Given: A mailbox whose quota saturates the integer range
    let accounts = json!([
        {"quota": "1e19", "used": "-1e19"},
        {"quota": "1", "used": "-1"}
    ]);

    // When: Summing the accounts
    let stats = MailDomainStats::from_accounts(&accounts);

    // Then: Totals stay at the bounds rather than wrapping
    assert_eq!(stats.account_count, 2);
    assert_eq!(stats.total_quota, i64::MAX);
    assert_eq!(stats.total_used, i64::MIN);
    assert_eq!(
        MailDomainKey::TotalQuota.read_stats(&stats).as_deref(),
        Some(i64::MAX.to_string().as_str())
    );
}

#[test]
fn test_plain_mail_domain_keys_do_not_query() {
    let domain = record(json!({"domain": "example.net", "active": "y"}));

    assert_eq!(MailDomainKey::Domain.read_record(&domain).as_deref(), Some("example.net"));
    assert_eq!(MailDomainKey::MailCatchall.read_record(&domain).as_deref(), Some(""));
    assert_eq!(MailDomainKey::AccountCount.read_record(&domain), None);
    assert_eq!(MailDomainKey::Domain.read_stats(&MailDomainStats::default()), None);
}

#[tokio::test]
async fn test_aggregate_key_lists_domain_mailboxes() {
    // Given: A domain with two mailboxes
    let transport = ScriptedTransport::new()
        .ok(json!("sess-1"))
        .ok(json!([{"quota": "1024", "used": "512"}, {"quota": "1024", "used": "0"}]))
        .ok(json!(true));
    let mut client = client(transport.clone());
    let domain = record(json!({"mail_domain_id": "4", "domain": "example.net"}));

    // When: Reading the aggregate keys
    let count = ItemKey::MailDomain(MailDomainKey::AccountCount)
        .read(&mut client, &domain, 4)
        .await;
    client.logout().await;

    // Then: The mailbox listing was filtered on the domain id
    assert_eq!(count, "2");
    let listing = &transport.calls()[1];
    assert_eq!(listing.method, "mail_user_get");
    assert_eq!(listing.params, vec![json!("sess-1"), json!({"mail_domain_id": 4})]);
}

#[tokio::test]
async fn test_aggregate_key_failure_reports_zero() {
    let transport = ScriptedTransport::new()
        .ok(json!("sess-1"))
        .fault("boom")
        .fault("boom")
        .fault("boom");
    let mut client = client(transport.clone());
    let domain = record(json!({"domain": "example.net"}));

    let total = MailDomainKey::TotalQuota.read(&mut client, &domain, 4).await;

    assert_eq!(total, "0");
    assert_eq!(transport.calls().len(), 4);
}
