//! Fetching and normalizing fund holdings

use super::error::DataError;
use super::provider::{FundDataProvider, FundProfile, HoldingEntry};
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Uppercase ticker mapped to its weight in percentage points.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HoldingsMap {
    weights: HashMap<String, f64>,
}

impl HoldingsMap {
    /// Builds a map from raw provider entries. Tickers are uppercased and
    /// weights rescaled from ratios to percentages; a later duplicate ticker
    /// overwrites an earlier one.
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a HoldingEntry>) -> Self {
        let weights = entries
            .into_iter()
            .map(|entry| (normalize_symbol(&entry.ticker), entry.weight * 100.0))
            .collect();
        Self { weights }
    }

    pub fn get(&self, ticker: &str) -> Option<f64> {
        self.weights.get(&normalize_symbol(ticker)).copied()
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Sum of every entry's weight, including cash or derivative lines the
    /// provider reports.
    pub fn total_weight(&self) -> f64 {
        self.weights.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.weights.iter().map(|(ticker, weight)| (ticker.as_str(), *weight))
    }
}

impl FromIterator<(String, f64)> for HoldingsMap {
    fn from_iter<T: IntoIterator<Item = (String, f64)>>(iter: T) -> Self {
        Self {
            weights: iter
                .into_iter()
                .map(|(ticker, weight)| (normalize_symbol(&ticker), weight))
                .collect(),
        }
    }
}

pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

/// Fetches the full profile document for a fund.
#[instrument(name = "FundProfileFetch", skip(provider))]
pub async fn fetch_profile(
    provider: &dyn FundDataProvider,
    fund: &str,
) -> Result<FundProfile, DataError> {
    let symbol = normalize_symbol(fund);
    if symbol.is_empty() {
        return Err(DataError::InvalidSymbol(fund.to_string()));
    }
    provider.fetch_profile(&symbol).await
}

/// Fetches a fund's holdings as a normalized [`HoldingsMap`].
///
/// Returns [`DataError::NoHoldingsData`] when the provider response has no
/// holdings field. An empty holdings list is returned as an empty map.
pub async fn fetch_holdings(
    provider: &dyn FundDataProvider,
    fund: &str,
) -> Result<HoldingsMap, DataError> {
    let profile = fetch_profile(provider, fund).await?;
    let holdings = profile
        .holdings
        .as_ref()
        .ok_or_else(|| DataError::NoHoldingsData(profile.symbol.clone()))?;

    let map = HoldingsMap::from_entries(holdings);
    debug!(
        fund = %profile.symbol,
        holdings = map.len(),
        total_weight = map.total_weight(),
        "Normalized holdings"
    );
    Ok(map)
}
