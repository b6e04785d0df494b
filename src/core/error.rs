//! Error types for provider calls and fund comparisons

use thiserror::Error;

/// Failures raised while fetching or comparing fund data.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    /// Connection failure, timeout or non-success HTTP status
    #[error("transport failure for {symbol}: {message}")]
    Transport { symbol: String, message: String },

    /// The provider answered with an explicit error message
    #[error("provider error for {symbol}: {message}")]
    Provider { symbol: String, message: String },

    /// The provider answered with a rate-limit notice instead of data
    #[error("rate limit reached while fetching {symbol}, retry later: {message}")]
    RateLimited { symbol: String, message: String },

    /// The response body could not be decoded
    #[error("malformed response for {symbol}: {message}")]
    Malformed { symbol: String, message: String },

    #[error("invalid fund or security identifier: '{0}'")]
    InvalidSymbol(String),

    /// The fund profile carried no holdings field
    #[error("no holdings data for {0}")]
    NoHoldingsData(String),

    /// A comparison could not proceed because a fund has no holdings data
    #[error("insufficient data to compare {fund_a} and {fund_b}: no holdings data for {missing}")]
    InsufficientData {
        fund_a: String,
        fund_b: String,
        missing: String,
    },
}

impl DataError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, DataError::RateLimited { .. })
    }

    /// True when the failure means "this fund has no data", as opposed to a
    /// transport or provider failure.
    pub fn is_no_data(&self) -> bool {
        matches!(
            self,
            DataError::NoHoldingsData(_) | DataError::InsufficientData { .. }
        )
    }
}
