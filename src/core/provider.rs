//! Fund data abstractions and core types

use super::error::DataError;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

/// One constituent security of a fund, as reported by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingEntry {
    pub ticker: String,
    /// Fraction of fund assets in `[0, 1]`
    pub weight: f64,
    pub shares: f64,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorWeight {
    pub sector: String,
    pub weight: f64,
}

/// A fund profile document.
///
/// `holdings` is `None` when the provider response had no holdings field at
/// all, which is distinct from an empty holdings list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundProfile {
    pub symbol: String,
    pub name: Option<String>,
    pub net_assets: f64,
    pub expense_ratio: f64,
    pub dividend_yield: f64,
    pub description: Option<String>,
    pub inception_date: Option<String>,
    pub sectors: Vec<SectorWeight>,
    pub holdings: Option<Vec<HoldingEntry>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Daily OHLCV bars keyed by trading date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailySeries {
    pub bars: BTreeMap<NaiveDate, DailyBar>,
}

/// Headline figures of a daily series, as of its most recent bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSummary {
    pub date: NaiveDate,
    pub close: f64,
    /// Change against the previous close; `None` with a single bar
    pub change: Option<f64>,
    pub change_pct: Option<f64>,
    /// Extremes over the last 252 trading days
    pub high_52w: f64,
    pub low_52w: f64,
    /// Mean volume over the last 20 trading days
    pub avg_volume_20d: f64,
}

const TRADING_DAYS_PER_YEAR: usize = 252;
const VOLUME_WINDOW: usize = 20;

impl DailySeries {
    /// Close of the most recent trading date in the series.
    pub fn latest_close(&self) -> Option<f64> {
        self.bars.values().next_back().map(|bar| bar.close)
    }

    pub fn summary(&self) -> Option<PriceSummary> {
        let mut recent = self.bars.iter().rev();
        let (date, last) = recent.next()?;
        let change = recent.next().map(|(_, prev)| last.close - prev.close);
        let change_pct = change.and_then(|c| {
            let prev = last.close - c;
            (prev != 0.0).then(|| c / prev * 100.0)
        });

        let year: Vec<&DailyBar> = self
            .bars
            .values()
            .rev()
            .take(TRADING_DAYS_PER_YEAR)
            .collect();
        let high_52w = year.iter().map(|b| b.high).fold(f64::MIN, f64::max);
        let low_52w = year.iter().map(|b| b.low).fold(f64::MAX, f64::min);
        let window = year.len().min(VOLUME_WINDOW);
        let avg_volume_20d =
            year.iter().take(window).map(|b| b.volume).sum::<f64>() / window as f64;

        Some(PriceSummary {
            date: *date,
            close: last.close,
            change,
            change_pct,
            high_52w,
            low_52w,
            avg_volume_20d,
        })
    }
}

/// Range selector for daily series lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputSize {
    /// Latest 100 data points
    #[default]
    Compact,
    /// Full history
    Full,
}

impl Display for OutputSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                OutputSize::Compact => "compact",
                OutputSize::Full => "full",
            }
        )
    }
}

impl FromStr for OutputSize {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "compact" => Ok(OutputSize::Compact),
            "full" => Ok(OutputSize::Full),
            _ => Err(anyhow::anyhow!("Invalid output size: {}", s)),
        }
    }
}

#[async_trait]
pub trait FundDataProvider: Send + Sync {
    async fn fetch_profile(&self, symbol: &str) -> Result<FundProfile, DataError>;

    async fn fetch_daily_series(
        &self,
        symbol: &str,
        size: OutputSize,
    ) -> Result<DailySeries, DataError>;
}
