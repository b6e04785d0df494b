//! Fleet search: find every fund in a universe that holds a given security

use super::error::DataError;
use super::holdings::{fetch_profile, normalize_symbol};
use super::provider::{FundDataProvider, OutputSize};
use super::universe::dedup_funds;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

/// A fund found to hold the target security.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FleetSearchMatch {
    pub etf_symbol: String,
    pub etf_name: Option<String>,
    pub net_assets: f64,
    pub expense_ratio: f64,
    pub dividend_yield: f64,
    pub description: Option<String>,
    /// Raw provider ratio, e.g. `0.07` for 7%
    pub holding_weight: f64,
    pub holding_shares: f64,
    pub latest_close: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchProgress {
    pub scanned: usize,
    pub total: usize,
    pub current_fund: Option<String>,
    pub matches: usize,
}

#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Look up the latest close for every match once the scan is done
    pub fetch_prices: bool,
    /// Number of leading funds to skip, to resume an interrupted scan
    pub skip: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            fetch_prices: true,
            skip: 0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchOutcome {
    pub target: String,
    /// Matches in scan order
    pub matches: Vec<FleetSearchMatch>,
    /// Offset into the deduplicated universe where the scan stopped
    pub scanned: usize,
    /// Size of the deduplicated universe
    pub total: usize,
    /// Funds skipped because their profile could not be fetched
    pub failures: Vec<(String, DataError)>,
    /// Cancelled before every fund was scanned
    pub cancelled: bool,
    /// Cancelled during price enrichment; the scan itself is complete
    pub prices_cancelled: bool,
}

/// Cooperative cancellation, checked between provider calls.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Scans `universe` in order for funds holding `target`.
///
/// Funds are fetched one at a time. A fund whose profile cannot be fetched is
/// recorded in `failures` and skipped. Each fund yields at most one match.
/// When cancelled, the matches gathered so far are returned and price
/// enrichment is skipped.
pub async fn search_holders_of<S: AsRef<str>>(
    provider: &dyn FundDataProvider,
    target: &str,
    universe: &[S],
    options: &SearchOptions,
    cancel: &CancellationFlag,
    progress: &mut dyn FnMut(&SearchProgress),
) -> SearchOutcome {
    let target = normalize_symbol(target);
    let funds = dedup_funds(universe.iter().map(|f| f.as_ref()));
    let total = funds.len();

    let mut outcome = SearchOutcome {
        target: target.clone(),
        scanned: options.skip.min(total),
        total,
        ..Default::default()
    };
    if target.is_empty() {
        warn!("Empty target security, nothing to search for");
        return outcome;
    }

    info!(
        "Searching for {} in {} funds (starting at {})",
        target, total, outcome.scanned
    );

    for fund in funds.iter().skip(outcome.scanned) {
        if cancel.is_cancelled() {
            info!("Search cancelled after {} of {} funds", outcome.scanned, total);
            outcome.cancelled = true;
            break;
        }

        progress(&SearchProgress {
            scanned: outcome.scanned,
            total,
            current_fund: Some(fund.clone()),
            matches: outcome.matches.len(),
        });

        match fetch_profile(provider, fund).await {
            Ok(profile) => {
                let holding = profile
                    .holdings
                    .iter()
                    .flatten()
                    .find(|h| normalize_symbol(&h.ticker) == target);

                if let Some(holding) = holding {
                    outcome.matches.push(FleetSearchMatch {
                        etf_symbol: fund.clone(),
                        etf_name: profile.name.clone(),
                        net_assets: profile.net_assets,
                        expense_ratio: profile.expense_ratio,
                        dividend_yield: profile.dividend_yield,
                        description: profile.description.clone(),
                        holding_weight: holding.weight,
                        holding_shares: holding.shares,
                        latest_close: None,
                    });
                    debug!(
                        "Found {} in {} ({} funds so far)",
                        target,
                        fund,
                        outcome.matches.len()
                    );
                }
            }
            Err(e) => {
                warn!("Skipping {}: {}", fund, e);
                outcome.failures.push((fund.clone(), e));
            }
        }
        outcome.scanned += 1;
    }

    progress(&SearchProgress {
        scanned: outcome.scanned,
        total,
        current_fund: None,
        matches: outcome.matches.len(),
    });

    if options.fetch_prices && !outcome.cancelled {
        outcome.prices_cancelled =
            !enrich_with_prices(provider, &mut outcome.matches, cancel).await;
    }

    info!(
        "Search finished: {} found in {} funds ({} skipped)",
        target,
        outcome.matches.len(),
        outcome.failures.len()
    );
    outcome
}

/// Fills `latest_close` for each match. A failed lookup leaves `None`.
/// Returns false if cancelled part way.
async fn enrich_with_prices(
    provider: &dyn FundDataProvider,
    matches: &mut [FleetSearchMatch],
    cancel: &CancellationFlag,
) -> bool {
    for m in matches.iter_mut() {
        if cancel.is_cancelled() {
            return false;
        }
        m.latest_close = match provider
            .fetch_daily_series(&m.etf_symbol, OutputSize::Compact)
            .await
        {
            Ok(series) => series.latest_close(),
            Err(e) => {
                warn!("No price for {}: {}", m.etf_symbol, e);
                None
            }
        };
    }
    true
}
