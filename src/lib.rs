pub mod cli;
pub mod core;
pub mod providers;

use crate::core::config::AppConfig;
use crate::core::provider::OutputSize;
use crate::core::rate_limit::IntervalLimiter;
use crate::core::search::CancellationFlag;
use crate::providers::alpha_vantage::AlphaVantageProvider;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    Overlap {
        fund_a: String,
        fund_b: String,
        limit: usize,
    },
    Holders {
        symbol: String,
        category: Option<String>,
        /// Overrides `search.top` from the config
        top: Option<usize>,
        all: bool,
        skip: usize,
        no_prices: bool,
    },
    Profile {
        symbol: String,
    },
    Price {
        symbol: String,
        range: OutputSize,
    },
    Universe,
}

/// Loads the configuration, falling back to defaults when no file exists at
/// the default location. An explicit path must exist.
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    match config_path {
        Some(path) => AppConfig::load_from_path(path),
        None => AppConfig::load(),
    }
}

fn build_provider(config: &AppConfig) -> Result<AlphaVantageProvider> {
    let av = config.alpha_vantage();
    AlphaVantageProvider::new(
        &av.base_url,
        &config.api_key()?,
        Duration::from_secs(av.timeout_secs),
        av.retries,
        Arc::new(IntervalLimiter::new(Duration::from_secs(av.request_delay_secs))),
    )
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("etfscope starting...");

    let config = load_config(config_path)?;
    debug!("Loaded config: {config:#?}");

    match command {
        AppCommand::Universe => {
            cli::universe::run(&config.universe());
            Ok(())
        }
        AppCommand::Overlap {
            fund_a,
            fund_b,
            limit,
        } => {
            let provider = build_provider(&config)?;
            cli::overlap::run(&provider, &fund_a, &fund_b, limit).await
        }
        AppCommand::Holders {
            symbol,
            category,
            top,
            all,
            skip,
            no_prices,
        } => {
            let provider = build_provider(&config)?;
            let args = cli::holders::HoldersArgs {
                symbol,
                category,
                top: top.unwrap_or(config.search.top),
                all,
                skip,
                fetch_prices: config.search.fetch_prices && !no_prices,
                request_delay: Duration::from_secs(config.alpha_vantage().request_delay_secs),
            };

            let cancel = CancellationFlag::new();
            let on_interrupt = cancel.clone();
            let watcher = tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupt received, stopping after the current request");
                    on_interrupt.cancel();
                }
            });

            let result =
                cli::holders::run(&provider, &config.universe(), &args, &cancel).await;
            watcher.abort();
            result
        }
        AppCommand::Profile { symbol } => {
            let provider = build_provider(&config)?;
            cli::profile::run(&provider, &symbol).await
        }
        AppCommand::Price { symbol, range } => {
            let provider = build_provider(&config)?;
            cli::price::run(&provider, &symbol, range).await
        }
    }
}
