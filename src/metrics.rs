//! Risk metric calculation
//!
//! Derives the three portfolio-level metrics from the covariance matrix and
//! weight vector:
//! - Portfolio annualized volatility: √(wᵀΣw) × √252, variance clamped ≥ 0
//! - Benchmark annualized volatility: sample std of benchmark returns × √252
//! - Diversification ratio: Σ wᵢσᵢ / σ_portfolio
//!
//! Each metric is independently nullable; a null never becomes a numeric
//! placeholder.

use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::covariance::CovarianceMatrix;
use crate::weights::WeightVector;
use crate::TRADING_DAYS_PER_YEAR;

/// Portfolio-level risk metrics. A `None` field means its preconditions
/// were not met, never that the value is zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskMetrics {
    /// Annualized portfolio volatility (fraction, not percent)
    pub portfolio_vol_ann: Option<f64>,

    /// Annualized benchmark volatility
    pub benchmark_vol_ann: Option<f64>,

    /// Weighted-average asset volatility over portfolio volatility;
    /// > 1 indicates a diversification benefit
    pub diversification_ratio: Option<f64>,
}

/// Annualized volatility of a daily return series, or `None` below 2
/// observations.
pub fn annualized_volatility(returns: &[f64]) -> Option<f64> {
    if returns.len() < 2 {
        return None;
    }
    Some(returns.iter().std_dev() * TRADING_DAYS_PER_YEAR.sqrt())
}

/// Portfolio annualized volatility and diversification ratio from a
/// covariance matrix and a weight vector.
///
/// The weight vector is densified in the matrix's ticker order; a ticker
/// missing from the weights contributes 0. Negative variance from an
/// ill-conditioned matrix is clamped to 0 rather than surfaced as an error.
/// With exactly one ticker the diversification ratio is 1.0 by definition;
/// with more tickers and zero portfolio volatility it is undefined.
pub fn portfolio_metrics(
    cov: &CovarianceMatrix,
    weights: &WeightVector,
) -> (Option<f64>, Option<f64>) {
    let order = cov.tickers();
    let w = DVector::from_iterator(
        order.len(),
        order.iter().map(|ticker| weights.get(ticker).unwrap_or(0.0)),
    );

    let variance_daily = (&w.transpose() * cov.matrix() * &w)[(0, 0)].max(0.0);
    let sigma_daily = variance_daily.sqrt();
    let portfolio_vol_ann = Some(sigma_daily * TRADING_DAYS_PER_YEAR.sqrt());

    let diversification_ratio = if order.len() == 1 {
        Some(1.0)
    } else if sigma_daily > 0.0 {
        let weighted_asset_vol: f64 = order
            .iter()
            .enumerate()
            .map(|(i, ticker)| {
                let sigma_i = cov.get(i, i).max(0.0).sqrt();
                weights.get(ticker).unwrap_or(0.0) * sigma_i
            })
            .sum();
        Some(weighted_asset_vol / sigma_daily)
    } else {
        None
    };

    (portfolio_vol_ann, diversification_ratio)
}
