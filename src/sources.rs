//! Consumed source contracts
//!
//! The engine depends on two external collaborators, both injected at
//! construction time rather than reached through globals:
//!
//! - **HoldingsSource**: the persistent store that owns the portfolio table
//! - **PriceHistorySource**: the market-data fetcher that owns network
//!   access, retries, and rate limits
//!
//! The engine only consumes these contracts; how they are implemented
//! (SQLite, HTTP, in-memory fixtures) is the caller's business.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{DataProviderError, StoreUnavailable};

/// A single portfolio position as read from the holdings store.
///
/// `market_value` may be stale relative to `current_price`; the weight
/// builder resolves which value basis to trust.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    /// Instrument symbol (normalized to trimmed uppercase by the reader)
    pub ticker: String,

    /// Number of shares held
    pub shares: f64,

    /// Average acquisition price per share
    pub avg_price: f64,

    /// Last known price per share
    pub current_price: f64,

    /// Last recorded position value in USD
    pub market_value: f64,
}

/// One dated observation in a symbol's price history.
///
/// Either price field may be missing; the alignment layer selects one
/// canonical field per symbol via [`PriceField`](crate::PriceField).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Observation date
    pub date: NaiveDate,

    /// Adjusted closing price, if the provider supplies one
    pub adj_close: Option<f64>,

    /// Raw closing price, if the provider supplies one
    pub close: Option<f64>,
}

/// Ordered price history for one symbol, strictly increasing by date.
pub type PriceSeries = Vec<PricePoint>;

/// Historical span requested from the provider.
///
/// Fixed at one year of daily observations; the engine does not expose
/// this as configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookbackWindow {
    /// Provider period token (e.g. "1y")
    pub period: &'static str,

    /// Provider sampling interval token (e.g. "1d")
    pub interval: &'static str,
}

impl LookbackWindow {
    /// The window every engine invocation uses.
    pub const ONE_YEAR_DAILY: Self = Self {
        period: "1y",
        interval: "1d",
    };

    /// Human-readable description for diagnostics.
    pub fn describe(&self) -> String {
        match (self.period, self.interval) {
            ("1y", "1d") => "1 year (daily)".to_string(),
            (period, interval) => format!("{} ({})", period, interval),
        }
    }
}

/// Read access to the current holdings snapshot.
pub trait HoldingsSource {
    /// Return the current holdings. An empty vector is a valid result
    /// (empty portfolio); only an unreachable store is an error.
    fn get_holdings(&self) -> Result<Vec<Holding>, StoreUnavailable>;
}

/// Read access to historical prices for a set of symbols.
pub trait PriceHistorySource {
    /// Return per-symbol price history over the given window.
    ///
    /// A provider may return a subset of the requested symbols; missing
    /// symbols are a data-quality condition handled by alignment, not an
    /// error.
    fn get_history(
        &self,
        symbols: &[String],
        window: LookbackWindow,
    ) -> Result<HashMap<String, PriceSeries>, DataProviderError>;
}

/// Normalize a raw holdings snapshot: trim and uppercase tickers, drop rows
/// whose ticker normalizes to empty.
///
/// Duplicate tickers are kept as-is; the store is assumed to enforce
/// uniqueness, and if it does not, the weight builder aggregates duplicates
/// by sum rather than merging them silently here.
pub fn normalize_holdings(holdings: Vec<Holding>) -> Vec<Holding> {
    holdings
        .into_iter()
        .filter_map(|mut holding| {
            let ticker = holding.ticker.trim().to_uppercase();
            if ticker.is_empty() {
                return None;
            }
            holding.ticker = ticker;
            Some(holding)
        })
        .collect()
}
