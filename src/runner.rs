//! Discovery and Item Runs
//!
//! One run is one process invocation by the Zabbix agent: build a client,
//! fetch, format, release the session, report.
//!
//! # Modes
//!
//! - **Discovery**: prints an LLD document. Every failure still prints
//!   `{"data":[]}` so the poller never sees empty output. A disabled module
//!   is not a failure and exits 0.
//! - **Item**: prints one bare value. Failures print nothing and exit 1.
//!
//! # Session release
//!
//! Both modes call `logout()` after the work completes, whether it succeeded
//! or not, before the outcome is turned into output.

use crate::config::Config;
use crate::error::{MonitorError, Result};
use crate::ispconfig::{EntityKind, IspConfigClient, SoapTransport, Transport};
use crate::items::ItemKey;
use crate::zabbix::discovery::{
    format_emails_discovery, format_mail_domains_discovery, format_websites_discovery,
    DiscoveryDocument,
};
use tracing::{error, info};

/// What the process writes to stdout and how it exits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub output: Option<String>,
    pub exit_code: i32,
}

impl Outcome {
    pub fn success(output: String) -> Self {
        Self {
            output: Some(output),
            exit_code: 0,
        }
    }

    /// Failure with no output (item mode).
    pub fn failure() -> Self {
        Self {
            output: None,
            exit_code: 1,
        }
    }

    /// Failure that still prints an empty, valid discovery document.
    pub fn fail_soft(pretty: bool) -> Self {
        Self {
            output: Some(empty_document(pretty)),
            exit_code: 1,
        }
    }
}

fn empty_document(pretty: bool) -> String {
    DiscoveryDocument::empty()
        .to_json(pretty)
        .unwrap_or_else(|_| r#"{"data":[]}"#.to_string())
}

fn log_failure(context: &str, e: &MonitorError) {
    if e.is_api_error() {
        error!("{}", e);
    } else {
        error!("{}: {}", context, e);
    }
}

/// Fetch and format the discovery document for `kind`.
pub async fn discover<T: Transport>(
    client: &mut IspConfigClient<T>,
    kind: EntityKind,
) -> Result<DiscoveryDocument> {
    let records = client.get_entities(kind, None).await?;

    let document = match kind {
        EntityKind::Websites => format_websites_discovery(&records),
        EntityKind::Emails => format_emails_discovery(&records),
        EntityKind::MailDomains => format_mail_domains_discovery(&records),
    };

    if !document.is_valid() {
        return Err(MonitorError::Validation(format!(
            "{} discovery produced a non-macro key",
            kind
        )));
    }

    info!("Discovered {} {} record(s)", document.len(), kind);
    Ok(document)
}

/// Fetch one record and read `key` from it.
pub async fn read_item<T: Transport>(
    client: &mut IspConfigClient<T>,
    kind: EntityKind,
    id: u64,
    key: ItemKey,
) -> Result<String> {
    let record = client
        .get_entity_by_id(kind, id)
        .await?
        .ok_or_else(|| MonitorError::NotFound(format!("{} {}", kind, id)))?;

    Ok(key.read(client, &record, id).await)
}

/// Discovery mode against the configured SOAP endpoint.
pub async fn run_discovery(config: &Config, kind: EntityKind, pretty: bool) -> Outcome {
    run_discovery_with(config, kind, pretty, IspConfigClient::<SoapTransport>::new).await
}

/// Discovery mode with a caller-supplied client constructor.
pub async fn run_discovery_with<T, F>(
    config: &Config,
    kind: EntityKind,
    pretty: bool,
    connect: F,
) -> Outcome
where
    T: Transport,
    F: FnOnce(&Config) -> Result<IspConfigClient<T>>,
{
    if !config.modules.is_enabled(kind.module()) {
        info!("The {} module is disabled in configuration", kind.module());
        return Outcome::success(empty_document(pretty));
    }

    let mut client = match connect(config) {
        Ok(client) => client,
        Err(e) => {
            log_failure("Autodiscovery error", &e);
            return Outcome::fail_soft(pretty);
        }
    };

    let result = discover(&mut client, kind).await;
    client.logout().await;

    match result.and_then(|document| document.to_json(pretty)) {
        Ok(json) => Outcome::success(json),
        Err(e) => {
            log_failure("Autodiscovery error", &e);
            Outcome::fail_soft(pretty)
        }
    }
}

/// Item mode against the configured SOAP endpoint.
pub async fn run_item(config: &Config, kind: EntityKind, id: &str, key: &str) -> Outcome {
    run_item_with(config, kind, id, key, IspConfigClient::<SoapTransport>::new).await
}

/// Item mode with a caller-supplied client constructor.
///
/// The key and id are checked before the client is built, so an unknown key
/// never reaches the network.
pub async fn run_item_with<T, F>(
    config: &Config,
    kind: EntityKind,
    id: &str,
    key: &str,
    connect: F,
) -> Outcome
where
    T: Transport,
    F: FnOnce(&Config) -> Result<IspConfigClient<T>>,
{
    let key = match ItemKey::parse(kind, key) {
        Ok(key) => key,
        Err(e) => {
            log_failure("Key reader error", &e);
            return Outcome::failure();
        }
    };

    let Some(id) = parse_id(id) else {
        error!("Invalid {} ID: {}", kind, id);
        return Outcome::failure();
    };

    if !config.modules.is_enabled(kind.module()) {
        error!("The {} module is disabled in configuration", kind.module());
        return Outcome::failure();
    }

    let mut client = match connect(config) {
        Ok(client) => client,
        Err(e) => {
            log_failure("Key reader error", &e);
            return Outcome::failure();
        }
    };

    let result = read_item(&mut client, kind, id, key).await;
    client.logout().await;

    match result {
        Ok(value) => Outcome::success(value),
        Err(e) => {
            log_failure("Key reader error", &e);
            Outcome::failure()
        }
    }
}

/// Positive integer ids only.
fn parse_id(raw: &str) -> Option<u64> {
    raw.trim().parse::<u64>().ok().filter(|id| *id > 0)
}
