use clap::{Parser, Subcommand};
use ispconfig_zabbix::config::Config;
use ispconfig_zabbix::ispconfig::EntityKind;
use ispconfig_zabbix::items::ItemKey;
use ispconfig_zabbix::runner::{self, Outcome};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (default: search the standard locations)
    #[arg(short, long, env = "ISPCONFIG_ZABBIX_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset; logs go to stderr
    #[arg(long, env = "ISPCONFIG_ZABBIX_LOG_LEVEL", default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a Zabbix low-level discovery document
    Discover {
        kind: EntityKind,

        /// Pretty-print the JSON (for debugging)
        #[arg(long)]
        pretty: bool,
    },

    /// Print the value of one item key for one record
    Get {
        kind: EntityKind,
        id: String,
        key: String,
    },

    /// List the item keys available for an entity kind
    Keys { kind: EntityKind },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();

    // stdout carries the Zabbix payload, so logs go to stderr
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let outcome = match args.command {
        Command::Discover { kind, pretty } => match Config::discover(args.config.as_deref()) {
            Ok(config) => runner::run_discovery(&config, kind, pretty).await,
            Err(e) => {
                error!("{:#}", e);
                Outcome::fail_soft(pretty)
            }
        },
        Command::Get { kind, id, key } => match Config::discover(args.config.as_deref()) {
            Ok(config) => runner::run_item(&config, kind, &id, &key).await,
            Err(e) => {
                error!("{:#}", e);
                Outcome::failure()
            }
        },
        Command::Keys { kind } => {
            let listing = ItemKey::catalog(kind)
                .into_iter()
                .map(|(name, description)| format!("  {:<20} - {}", name, description))
                .collect::<Vec<_>>()
                .join("\n");
            Outcome::success(format!("Available keys:\n{}", listing))
        }
    };

    if let Some(output) = outcome.output {
        println!("{}", output);
    }

    std::process::exit(outcome.exit_code);
}
