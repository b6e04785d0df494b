//! Pairwise holdings overlap between two funds

use super::error::DataError;
use super::holdings::{HoldingsMap, fetch_holdings, normalize_symbol};
use super::provider::FundDataProvider;
use serde::Serialize;
use std::cmp::Ordering;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommonHolding {
    pub ticker: String,
    pub weight_in_a: f64,
    pub weight_in_b: f64,
    /// `min(weight_in_a, weight_in_b)`
    pub overlap: f64,
}

/// Overlap metrics for a pair of funds. All weights are percentage points.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlapResult {
    pub overlap_weight: f64,
    /// Share of fund A's total weight that is also held by fund B
    pub overlap_a_in_b: f64,
    /// Share of fund B's total weight that is also held by fund A
    pub overlap_b_in_a: f64,
    pub overlap_average: f64,
    /// Sorted by overlap descending, then ticker ascending
    pub common_holdings: Vec<CommonHolding>,
    pub total_holdings_a: usize,
    pub total_holdings_b: usize,
    pub common_count: usize,
}

fn share_of(part: f64, total: f64) -> f64 {
    if total > 0.0 { part / total * 100.0 } else { 0.0 }
}

/// Computes overlap metrics for two normalized holdings maps.
pub fn overlap(a: &HoldingsMap, b: &HoldingsMap) -> OverlapResult {
    let mut common_holdings: Vec<CommonHolding> = a
        .iter()
        .filter_map(|(ticker, weight_in_a)| {
            b.get(ticker).map(|weight_in_b| CommonHolding {
                ticker: ticker.to_string(),
                weight_in_a,
                weight_in_b,
                overlap: weight_in_a.min(weight_in_b),
            })
        })
        .collect();

    common_holdings.sort_by(|x, y| match y.overlap.total_cmp(&x.overlap) {
        Ordering::Equal => x.ticker.cmp(&y.ticker),
        ord => ord,
    });

    let overlap_weight: f64 = common_holdings.iter().map(|h| h.overlap).sum();
    let overlap_a_in_b = share_of(overlap_weight, a.total_weight());
    let overlap_b_in_a = share_of(overlap_weight, b.total_weight());

    OverlapResult {
        overlap_weight,
        overlap_a_in_b,
        overlap_b_in_a,
        overlap_average: (overlap_a_in_b + overlap_b_in_a) / 2.0,
        common_count: common_holdings.len(),
        common_holdings,
        total_holdings_a: a.len(),
        total_holdings_b: b.len(),
    }
}

async fn holdings_for_comparison(
    provider: &dyn FundDataProvider,
    fund: &str,
    fund_a: &str,
    fund_b: &str,
) -> Result<HoldingsMap, DataError> {
    fetch_holdings(provider, fund).await.map_err(|e| match e {
        DataError::NoHoldingsData(missing) => DataError::InsufficientData {
            fund_a: fund_a.to_string(),
            fund_b: fund_b.to_string(),
            missing,
        },
        other => other,
    })
}

/// Fetches both funds, one after the other, and computes their overlap.
///
/// Any fetch failure aborts the comparison. A fund without holdings data is
/// reported as [`DataError::InsufficientData`].
pub async fn compare_funds(
    provider: &dyn FundDataProvider,
    fund_a: &str,
    fund_b: &str,
) -> Result<OverlapResult, DataError> {
    let (fund_a, fund_b) = (normalize_symbol(fund_a), normalize_symbol(fund_b));
    info!("Comparing holdings of {} and {}", fund_a, fund_b);

    let holdings_a = holdings_for_comparison(provider, &fund_a, &fund_a, &fund_b).await?;
    let holdings_b = holdings_for_comparison(provider, &fund_b, &fund_a, &fund_b).await?;

    let result = overlap(&holdings_a, &holdings_b);
    debug!(
        overlap_weight = result.overlap_weight,
        overlap_average = result.overlap_average,
        common = result.common_count,
        "Computed overlap"
    );
    Ok(result)
}
