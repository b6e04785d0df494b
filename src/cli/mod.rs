pub mod holders;
pub mod overlap;
pub mod price;
pub mod profile;
pub mod setup;
pub mod ui;
pub mod universe;

use crate::core::error::DataError;

/// User-facing message for a failed lookup.
///
/// Missing data, rate limiting and transport failures read differently so
/// the user knows whether retrying makes sense.
pub fn describe_error(err: &DataError) -> String {
    if err.is_no_data() {
        return match err {
            DataError::InsufficientData { missing, .. } => {
                format!("No holdings data available for {missing}, cannot compare")
            }
            other => format!("No holdings data available: {other}"),
        };
    }
    if err.is_rate_limited() {
        return format!(
            "Rate limit reached, retry later. The free tier allows 5 requests per minute ({err})"
        );
    }
    match err {
        DataError::Transport { symbol, message } => {
            format!("Could not reach the data provider for {symbol}: {message}")
        }
        DataError::Provider { symbol, message } => {
            format!("The data provider rejected the request for {symbol}: {message}")
        }
        DataError::Malformed { symbol, message } => {
            format!("Unexpected response from the data provider for {symbol}: {message}")
        }
        DataError::InvalidSymbol(symbol) => format!("'{symbol}' is not a valid symbol"),
        other => other.to_string(),
    }
}
