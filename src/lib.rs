//! # folio-risk: Portfolio Risk Analytics Engine
//!
//! Batch risk analytics for an equity portfolio dashboard: given the current
//! holdings and historical prices for their tickers (plus a benchmark),
//! compute a return-covariance matrix, portfolio-level annualized
//! volatility, a benchmark volatility comparison, and a diversification
//! ratio.
//!
//! ## Core Components
//!
//! - **RiskAnalyticsEngine**: one blocking pass from holdings to a complete
//!   [`RiskReport`]
//! - **PriceTable / ReturnTable**: alignment of ragged, gappy price series
//!   onto a common date index and derivation of daily returns
//! - **WeightVector**: value-based portfolio weights with documented
//!   fallback rules
//! - **CovarianceMatrix**: unbiased sample covariance of aligned returns
//! - **Diagnostics**: an auditable status text attached to every result
//!
//! The engine consumes its two collaborators — a [`HoldingsSource`] and a
//! [`PriceHistorySource`] — as injected trait objects, and recomputes
//! everything from scratch on every call.
//!
//! ## Example Usage
//!
//! ```rust
//! use std::collections::HashMap;
//! use chrono::NaiveDate;
//! use folio_risk::{
//!     DataProviderError, Holding, HoldingsSource, LookbackWindow, PricePoint,
//!     PriceHistorySource, PriceSeries, RiskAnalyticsEngine, StoreUnavailable,
//! };
//!
//! struct FixedHoldings(Vec<Holding>);
//!
//! impl HoldingsSource for FixedHoldings {
//!     fn get_holdings(&self) -> Result<Vec<Holding>, StoreUnavailable> {
//!         Ok(self.0.clone())
//!     }
//! }
//!
//! struct FixedHistory(HashMap<String, PriceSeries>);
//!
//! impl PriceHistorySource for FixedHistory {
//!     fn get_history(
//!         &self,
//!         _symbols: &[String],
//!         _window: LookbackWindow,
//!     ) -> Result<HashMap<String, PriceSeries>, DataProviderError> {
//!         Ok(self.0.clone())
//!     }
//! }
//!
//! fn point(day: u32, price: f64) -> PricePoint {
//!     PricePoint {
//!         date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
//!         adj_close: Some(price),
//!         close: Some(price),
//!     }
//! }
//!
//! let holdings = FixedHoldings(vec![Holding {
//!     ticker: "aaa".to_string(),
//!     shares: 10.0,
//!     avg_price: 90.0,
//!     current_price: 100.0,
//!     market_value: 1000.0,
//! }]);
//!
//! let mut history = HashMap::new();
//! history.insert(
//!     "AAA".to_string(),
//!     vec![point(2, 100.0), point(3, 101.0), point(4, 99.5)],
//! );
//! history.insert(
//!     "SPY".to_string(),
//!     vec![point(2, 470.0), point(3, 472.0), point(4, 471.0)],
//! );
//!
//! let engine = RiskAnalyticsEngine::new(holdings, FixedHistory(history));
//! let report = engine.run().unwrap();
//!
//! // A single holding cannot diversify against itself.
//! assert_eq!(report.metric_text.diversification, "1.000");
//! assert!(report.status.contains("Tickers used: 1 / 1."));
//! ```

mod covariance;
mod diagnostics;
mod engine;
mod error;
mod format;
mod metrics;
mod sources;
mod table;
mod weights;

pub use covariance::CovarianceMatrix;
pub use diagnostics::Diagnostics;
pub use engine::{EngineConfig, RiskAnalyticsEngine, RiskReport};
pub use error::{DataProviderError, EngineError, Result, StoreUnavailable};
pub use format::{covariance_rows, metric_texts, MetricText, NULL_PLACEHOLDER};
pub use metrics::{annualized_volatility, portfolio_metrics, RiskMetrics};
pub use sources::{
    normalize_holdings, Holding, HoldingsSource, LookbackWindow, PriceHistorySource, PricePoint,
    PriceSeries,
};
pub use table::{PriceField, PriceTable, ReturnTable, PRICE_FIELD_PRIORITY};
pub use weights::{position_value, ValueBasis, WeightVector, VALUE_BASIS_PRIORITY};

/// Trading days per year used to annualize daily statistics (×√252).
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;
