//! ISPConfig → Zabbix Monitoring Bridge
//!
//! Command-line bridge between the ISPConfig hosting panel and a Zabbix agent.
//!
//! # Overview
//!
//! Each invocation logs in to the ISPConfig SOAP remote API, fetches websites,
//! mailboxes or mail domains, reformats them for Zabbix and exits. Two output
//! shapes are produced: Low-Level Discovery documents and single item values.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     SOAP/HTTPS      ┌───────────────────────┐
//! │  ISPConfig  │ ◄─────────────────► │   ispconfig-zabbix    │
//! │   remote    │   RPC/encoded       │                       │
//! └─────────────┘                     │  ┌────────┐           │     stdout      ┌──────────────┐
//!                                     │  │ Client │──┐        │ ──────────────► │ Zabbix agent │
//!                                     │  └────────┘  ▼        │  JSON / value   └──────────────┘
//!                                     │      ┌───────────┐    │
//!                                     │      │ Formatter │    │
//!                                     │      └───────────┘    │
//!                                     └───────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`ispconfig`] - Session client, retry, SOAP transport and API types
//! - [`zabbix`] - Value coercion and LLD document formatting
//! - [`items`] - Per-entity item keys for key-value mode
//! - [`runner`] - Discovery and item runs, exit codes
//! - [`config`] - Configuration management
//! - [`error`] - Error types
//!
//! # Quick Start
//!
//! ```no_run
//! use ispconfig_zabbix::{config::Config, ispconfig::EntityKind, runner};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/Default.toml")?;
//!     let outcome = runner::run_discovery(&config, EntityKind::Websites, false).await;
//!     println!("{}", outcome.output.unwrap_or_default());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod items;
pub mod ispconfig;
pub mod runner;
pub mod zabbix;
