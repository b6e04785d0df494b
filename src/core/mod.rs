//! Core business logic abstractions

pub mod config;
pub mod error;
pub mod holdings;
pub mod log;
pub mod overlap;
pub mod provider;
pub mod rate_limit;
pub mod search;
pub mod universe;

#[cfg(test)]
pub(crate) mod mock;

// Re-export main types for cleaner imports
pub use error::DataError;
pub use holdings::{HoldingsMap, fetch_holdings, fetch_profile};
pub use overlap::{OverlapResult, compare_funds, overlap};
pub use provider::{
    DailySeries, FundDataProvider, FundProfile, HoldingEntry, OutputSize, PriceSummary,
};
pub use rate_limit::{IntervalLimiter, RateLimiter, Unlimited};
pub use search::{
    CancellationFlag, FleetSearchMatch, SearchOptions, SearchOutcome, SearchProgress,
    search_holders_of,
};
pub use universe::Universe;
