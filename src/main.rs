//! ledgerpage main entry point

use anyhow::Context;
use clap::Parser;
use ledgerpage_api::{start_server, AppState, TransactionStore};
use ledgerpage_config::{Config, ConfigError};
use ledgerpage_core::{DefaultErrorLogger, MemoryStore, Transaction};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "ledgerpage")]
#[command(version = "0.1.0")]
#[command(about = "Keyset-paginated transaction listing for a household budget ledger", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Print the default configuration and exit
    #[arg(long)]
    print_default_config: bool,
}

/// Error report for a config file that exists but cannot be used
fn config_error_report(path: &Path, error: &ConfigError) -> String {
    format!("failed to load {}\n{}", path.display(), error.to_details())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_default_config {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    let (config, config_found) = match Config::load(&args.config) {
        Ok(config) => (config, true),
        Err(ConfigError::FileNotFound { .. }) => (Config::default(), false),
        Err(e) => anyhow::bail!(config_error_report(&args.config, &e)),
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.logging.level.as_str())).init();

    if config_found {
        log::info!("Config loaded from {}", args.config.display());
    } else {
        log::warn!("Config file {} not found, using defaults", args.config.display());
    }

    let rt = Runtime::new()?;
    rt.block_on(async {
        let store = match &config.data.seed_file {
            Some(path) => {
                let store = MemoryStore::<Transaction>::load_json(path)
                    .await
                    .with_context(|| format!("loading seed file {}", path.display()))?;
                log::info!("Loaded {} transactions from {}", store.len().await, path.display());
                store
            }
            None => {
                log::warn!("No data.seed_file configured, starting with an empty store");
                MemoryStore::default()
            }
        };

        let store: Arc<TransactionStore> = Arc::new(store);
        let state = AppState::new(store, Arc::new(DefaultErrorLogger), config);
        start_server(state).await
    })
}
