use super::util::with_retry;
use crate::core::error::DataError;
use crate::core::provider::{
    DailyBar, DailySeries, FundDataProvider, FundProfile, HoldingEntry, OutputSize, SectorWeight,
};
use crate::core::rate_limit::RateLimiter;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

const RETRY_DELAY_MS: u64 = 500;

/// Reads a number the provider may send as a JSON number, a numeric string,
/// or a placeholder such as `"None"`. Anything unparseable becomes 0.
fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .unwrap_or(0.0),
        _ => 0.0,
    })
}

#[derive(Debug, Deserialize)]
struct ProfileResponse {
    #[serde(default)]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    net_assets: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    net_expense_ratio: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    dividend_yield: f64,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    inception_date: Option<String>,
    #[serde(default)]
    sectors: Option<Vec<SectorItem>>,
    #[serde(default)]
    holdings: Option<Vec<HoldingItem>>,
}

#[derive(Debug, Deserialize)]
struct SectorItem {
    #[serde(default)]
    sector: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    weight: f64,
}

#[derive(Debug, Deserialize)]
struct HoldingItem {
    #[serde(default)]
    symbol: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    weight: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    shares: f64,
}

#[derive(Debug, Deserialize)]
struct DailyResponse {
    #[serde(rename = "Time Series (Daily)")]
    series: Option<BTreeMap<String, DailyItem>>,
}

#[derive(Debug, Deserialize)]
struct DailyItem {
    #[serde(rename = "1. open", default, deserialize_with = "lenient_f64")]
    open: f64,
    #[serde(rename = "2. high", default, deserialize_with = "lenient_f64")]
    high: f64,
    #[serde(rename = "3. low", default, deserialize_with = "lenient_f64")]
    low: f64,
    #[serde(rename = "4. close", default, deserialize_with = "lenient_f64")]
    close: f64,
    #[serde(rename = "5. volume", default, deserialize_with = "lenient_f64")]
    volume: f64,
}

fn message_of(value: &Value) -> String {
    value
        .as_str()
        .map(str::to_string)
        .unwrap_or_else(|| value.to_string())
}

/// Alpha Vantage answers errors and throttling with HTTP 200 and a message
/// field in place of the data.
fn check_provider_error(symbol: &str, body: &Value) -> Result<(), DataError> {
    if let Some(message) = body.get("Error Message") {
        return Err(DataError::Provider {
            symbol: symbol.to_string(),
            message: message_of(message),
        });
    }
    if let Some(message) = body.get("Note") {
        return Err(DataError::RateLimited {
            symbol: symbol.to_string(),
            message: message_of(message),
        });
    }
    // `Information` also carries premium-endpoint and demo-key notices
    if let Some(message) = body.get("Information") {
        let message = message_of(message);
        return Err(if is_rate_limit_notice(&message) {
            DataError::RateLimited {
                symbol: symbol.to_string(),
                message,
            }
        } else {
            DataError::Provider {
                symbol: symbol.to_string(),
                message,
            }
        });
    }
    Ok(())
}

fn is_rate_limit_notice(message: &str) -> bool {
    let message = message.to_lowercase();
    message.contains("rate limit") || message.contains("requests per")
}

fn transport_error(symbol: &str, err: reqwest::Error) -> DataError {
    let message = if err.is_timeout() {
        "request timed out".to_string()
    } else {
        format!("request failed: {err}")
    };
    DataError::Transport {
        symbol: symbol.to_string(),
        message,
    }
}

pub struct AlphaVantageProvider {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
    retries: usize,
    limiter: Arc<dyn RateLimiter>,
}

impl AlphaVantageProvider {
    pub fn new(
        base_url: &str,
        api_key: &str,
        timeout: Duration,
        retries: usize,
        limiter: Arc<dyn RateLimiter>,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("etfscope/1.0")
            .timeout(timeout)
            .build()?;
        Ok(AlphaVantageProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
            retries,
            limiter,
        })
    }

    /// Issues one paced `GET /query` call and returns the decoded body after
    /// checking it for embedded error messages.
    async fn query(
        &self,
        function: &str,
        symbol: &str,
        extra: &[(&str, &str)],
    ) -> Result<Value, DataError> {
        let mut params = vec![
            ("function", function),
            ("symbol", symbol),
            ("apikey", self.api_key.as_str()),
        ];
        params.extend_from_slice(extra);

        let url = reqwest::Url::parse_with_params(&format!("{}/query", self.base_url), &params)
            .map_err(|e| DataError::Transport {
                symbol: symbol.to_string(),
                message: format!("invalid provider URL: {e}"),
            })?;
        debug!("Requesting {} for {} from {}", function, symbol, self.base_url);

        let client = &self.client;
        let limiter = &self.limiter;
        let url = &url;
        let response = with_retry(
            || async move {
                limiter.acquire().await;
                client.get(url.clone()).send().await
            },
            self.retries,
            RETRY_DELAY_MS,
        )
        .await
        .map_err(|e| transport_error(symbol, e))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(DataError::RateLimited {
                symbol: symbol.to_string(),
                message: format!("HTTP error: {status}"),
            });
        }
        if !status.is_success() {
            return Err(DataError::Transport {
                symbol: symbol.to_string(),
                message: format!("HTTP error: {status}"),
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| transport_error(symbol, e))?;
        let body: Value = serde_json::from_str(&text).map_err(|e| DataError::Malformed {
            symbol: symbol.to_string(),
            message: format!("failed to parse JSON response: {e}"),
        })?;

        check_provider_error(symbol, &body)?;
        Ok(body)
    }
}

fn into_profile(symbol: &str, raw: ProfileResponse) -> FundProfile {
    FundProfile {
        symbol: symbol.to_string(),
        name: raw.name,
        net_assets: raw.net_assets,
        expense_ratio: raw.net_expense_ratio,
        dividend_yield: raw.dividend_yield,
        description: raw.description,
        inception_date: raw.inception_date,
        sectors: raw
            .sectors
            .into_iter()
            .flatten()
            .map(|s| SectorWeight {
                sector: s.sector.unwrap_or_default(),
                weight: s.weight,
            })
            .collect(),
        holdings: raw.holdings.map(|items| {
            items
                .into_iter()
                .map(|h| HoldingEntry {
                    ticker: h.symbol.unwrap_or_default(),
                    weight: h.weight,
                    shares: h.shares,
                    description: h.description,
                })
                .collect()
        }),
    }
}

#[async_trait]
impl FundDataProvider for AlphaVantageProvider {
    #[instrument(name = "EtfProfileFetch", skip(self), fields(symbol = %symbol))]
    async fn fetch_profile(&self, symbol: &str) -> Result<FundProfile, DataError> {
        let body = self.query("ETF_PROFILE", symbol, &[]).await?;
        let raw: ProfileResponse =
            serde_json::from_value(body).map_err(|e| DataError::Malformed {
                symbol: symbol.to_string(),
                message: format!("unexpected ETF profile shape: {e}"),
            })?;

        let profile = into_profile(symbol, raw);
        debug!(
            holdings = profile.holdings.as_ref().map(Vec::len),
            "Received ETF profile"
        );
        Ok(profile)
    }

    #[instrument(name = "DailySeriesFetch", skip(self), fields(symbol = %symbol))]
    async fn fetch_daily_series(
        &self,
        symbol: &str,
        size: OutputSize,
    ) -> Result<DailySeries, DataError> {
        let size = size.to_string();
        let body = self
            .query("TIME_SERIES_DAILY", symbol, &[("outputsize", size.as_str())])
            .await?;
        let raw: DailyResponse = serde_json::from_value(body).map_err(|e| DataError::Malformed {
            symbol: symbol.to_string(),
            message: format!("unexpected daily series shape: {e}"),
        })?;
        let items = raw.series.ok_or_else(|| DataError::Malformed {
            symbol: symbol.to_string(),
            message: "no daily time series in response".to_string(),
        })?;

        let mut series = DailySeries::default();
        for (date, item) in items {
            match NaiveDate::parse_from_str(&date, "%Y-%m-%d") {
                Ok(date) => {
                    series.bars.insert(
                        date,
                        DailyBar {
                            open: item.open,
                            high: item.high,
                            low: item.low,
                            close: item.close,
                            volume: item.volume,
                        },
                    );
                }
                Err(e) => debug!("Skipping bar with unparseable date '{}': {}", date, e),
            }
        }
        Ok(series)
    }
}
