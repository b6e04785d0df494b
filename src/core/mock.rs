//! In-memory provider used by unit tests

use super::error::DataError;
use super::provider::{DailyBar, DailySeries, FundDataProvider, FundProfile, HoldingEntry, OutputSize};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Mutex;

pub fn entry(ticker: &str, weight: f64) -> HoldingEntry {
    HoldingEntry {
        ticker: ticker.to_string(),
        weight,
        shares: 1000.0,
        description: None,
    }
}

pub fn profile(symbol: &str, holdings: Option<Vec<HoldingEntry>>) -> FundProfile {
    FundProfile {
        symbol: symbol.to_string(),
        name: Some(format!("{symbol} Fund")),
        net_assets: 1.0e9,
        expense_ratio: 0.0009,
        dividend_yield: 0.013,
        description: None,
        inception_date: None,
        sectors: Vec::new(),
        holdings,
    }
}

#[derive(Default)]
pub struct MockProvider {
    profiles: HashMap<String, Result<FundProfile, DataError>>,
    closes: HashMap<String, f64>,
    profile_calls: Mutex<Vec<String>>,
    series_calls: Mutex<Vec<String>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(mut self, profile: FundProfile) -> Self {
        self.profiles.insert(profile.symbol.clone(), Ok(profile));
        self
    }

    pub fn with_failure(mut self, symbol: &str, error: DataError) -> Self {
        self.profiles.insert(symbol.to_string(), Err(error));
        self
    }

    pub fn with_close(mut self, symbol: &str, close: f64) -> Self {
        self.closes.insert(symbol.to_string(), close);
        self
    }

    pub fn profile_calls(&self) -> Vec<String> {
        self.profile_calls.lock().unwrap().clone()
    }

    pub fn series_calls(&self) -> Vec<String> {
        self.series_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl FundDataProvider for MockProvider {
    async fn fetch_profile(&self, symbol: &str) -> Result<FundProfile, DataError> {
        self.profile_calls.lock().unwrap().push(symbol.to_string());
        self.profiles
            .get(symbol)
            .cloned()
            .unwrap_or_else(|| {
                Err(DataError::Transport {
                    symbol: symbol.to_string(),
                    message: "connection refused".to_string(),
                })
            })
    }

    async fn fetch_daily_series(
        &self,
        symbol: &str,
        _size: OutputSize,
    ) -> Result<DailySeries, DataError> {
        self.series_calls.lock().unwrap().push(symbol.to_string());
        let close = self.closes.get(symbol).ok_or_else(|| DataError::Provider {
            symbol: symbol.to_string(),
            message: "Invalid API call".to_string(),
        })?;

        let mut series = DailySeries::default();
        series.bars.insert(
            NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            DailyBar {
                open: *close,
                high: *close,
                low: *close,
                close: *close,
                volume: 1.0,
            },
        );
        Ok(series)
    }
}
