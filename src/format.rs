//! Display formatting
//!
//! The engine's internal result types carry true optionals; this module is
//! the only place they become display strings. Contract:
//! - covariance cells: 6 decimal places
//! - volatilities: percentages, 2 decimal places
//! - diversification ratio: 3 decimal places
//! - any null metric: the literal "--"

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::covariance::CovarianceMatrix;
use crate::metrics::RiskMetrics;

/// Rendering of a null metric.
pub const NULL_PLACEHOLDER: &str = "--";

/// Display strings for the three metric cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricText {
    pub portfolio_vol: String,
    pub benchmark_vol: String,
    pub diversification: String,
}

impl MetricText {
    /// All-placeholder text for degenerate results.
    pub fn unavailable() -> Self {
        Self {
            portfolio_vol: NULL_PLACEHOLDER.to_string(),
            benchmark_vol: NULL_PLACEHOLDER.to_string(),
            diversification: NULL_PLACEHOLDER.to_string(),
        }
    }
}

/// Render the metric set.
///
/// The benchmark card carries the volatility spread versus the portfolio in
/// percentage points when both volatilities are available; the spread
/// segment is omitted otherwise.
pub fn metric_texts(metrics: &RiskMetrics, benchmark: &str) -> MetricText {
    let portfolio_vol = metrics
        .portfolio_vol_ann
        .map(format_percent)
        .unwrap_or_else(|| NULL_PLACEHOLDER.to_string());

    let benchmark_vol = match metrics.benchmark_vol_ann {
        None => NULL_PLACEHOLDER.to_string(),
        Some(bench) => match metrics.portfolio_vol_ann {
            Some(portfolio) => format!(
                "{} {} | Spread {:+.2} pp",
                benchmark,
                format_percent(bench),
                (portfolio - bench) * 100.0
            ),
            None => format!("{} {}", benchmark, format_percent(bench)),
        },
    };

    let diversification = metrics
        .diversification_ratio
        .map(|ratio| format!("{:.3}", ratio))
        .unwrap_or_else(|| NULL_PLACEHOLDER.to_string());

    MetricText {
        portfolio_vol,
        benchmark_vol,
        diversification,
    }
}

fn format_percent(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

/// Display rows for the covariance table: one row per ticker, the row label
/// inserted as the first column, cells formatted to 6 decimal places.
pub fn covariance_rows(cov: &CovarianceMatrix) -> Vec<IndexMap<String, String>> {
    cov.tickers()
        .iter()
        .enumerate()
        .map(|(i, row_ticker)| {
            let mut row = IndexMap::with_capacity(cov.dim() + 1);
            row.insert("ticker".to_string(), row_ticker.clone());
            for (j, col_ticker) in cov.tickers().iter().enumerate() {
                row.insert(col_ticker.clone(), format!("{:.6}", cov.get(i, j)));
            }
            row
        })
        .collect()
}
