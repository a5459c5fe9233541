//! Portfolio weight vector
//!
//! Derives one weight per valid ticker from the holdings snapshot. The value
//! basis for a position follows an ordered priority list; weights sum to 1.0
//! unless there are no valid tickers at all, in which case the vector is
//! empty.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::sources::Holding;

/// Candidate value bases for a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueBasis {
    /// Recorded market value from the store
    MarketValue,
    /// shares × current_price, for rows with a stale or missing market value
    SharesTimesPrice,
}

/// Ordered preference for the value basis of a position.
pub const VALUE_BASIS_PRIORITY: [ValueBasis; 2] =
    [ValueBasis::MarketValue, ValueBasis::SharesTimesPrice];

impl ValueBasis {
    /// Value of this basis for one holding, accepted only when finite and
    /// strictly positive.
    pub fn value(&self, holding: &Holding) -> Option<f64> {
        let value = match self {
            ValueBasis::MarketValue => holding.market_value,
            ValueBasis::SharesTimesPrice => holding.shares * holding.current_price,
        };
        (value.is_finite() && value > 0.0).then_some(value)
    }
}

/// Position value of one holding: the first basis in
/// [`VALUE_BASIS_PRIORITY`] that yields a positive finite value, else 0.
pub fn position_value(holding: &Holding) -> f64 {
    VALUE_BASIS_PRIORITY
        .iter()
        .find_map(|basis| basis.value(holding))
        .unwrap_or(0.0)
}

/// Mapping ticker → weight in [0, 1], summing to 1.0 (or empty).
///
/// Recomputed from the holdings snapshot on every engine invocation; never
/// persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeightVector {
    weights: IndexMap<String, f64>,
}

impl WeightVector {
    /// Build weights for the tickers that survived alignment and return
    /// computation.
    ///
    /// Duplicate holdings rows for the same ticker are aggregated by sum.
    /// When every position value is zero, falls back to equal weighting so
    /// a diversification ratio remains computable.
    pub fn from_holdings(holdings: &[Holding], valid_tickers: &[String]) -> Self {
        if valid_tickers.is_empty() {
            return Self::default();
        }

        let mut weights: IndexMap<String, f64> = valid_tickers
            .iter()
            .map(|ticker| (ticker.clone(), 0.0))
            .collect();
        for holding in holdings {
            if let Some(slot) = weights.get_mut(&holding.ticker) {
                *slot += position_value(holding);
            }
        }

        let total: f64 = weights.values().sum();
        if total > 0.0 {
            for value in weights.values_mut() {
                *value /= total;
            }
        } else {
            let equal = 1.0 / valid_tickers.len() as f64;
            for value in weights.values_mut() {
                *value = equal;
            }
        }

        Self { weights }
    }

    pub fn get(&self, ticker: &str) -> Option<f64> {
        self.weights.get(ticker).copied()
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.weights.iter().map(|(ticker, w)| (ticker.as_str(), *w))
    }

    /// Sum of all weights. 1.0 ± 1e-9 for any non-empty vector.
    pub fn sum(&self) -> f64 {
        self.weights.values().sum()
    }
}
