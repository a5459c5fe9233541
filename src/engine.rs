//! Risk analytics engine
//!
//! Orchestrates one batch pass over the portfolio snapshot: read holdings,
//! fetch price history, align, compute returns, weights, covariance, and
//! metrics, and co-return diagnostics describing what happened.
//!
//! Every invocation recomputes from scratch; the engine holds no mutable
//! state across calls, so overlapping invocations interleave safely.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, warn};

use crate::covariance::CovarianceMatrix;
use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::format::{self, MetricText};
use crate::metrics::{annualized_volatility, portfolio_metrics, RiskMetrics};
use crate::sources::{normalize_holdings, HoldingsSource, LookbackWindow, PriceHistorySource};
use crate::table::PriceTable;
use crate::weights::WeightVector;

/// Engine configuration.
///
/// Only the benchmark symbol is configurable; the lookback window and the
/// 252-day annualization constant are fixed by design.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Reference instrument for the volatility comparison
    #[serde(default = "default_benchmark")]
    pub benchmark: String,
}

fn default_benchmark() -> String {
    "SPY".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            benchmark: default_benchmark(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from YAML
    pub fn from_yaml(yaml: &str) -> std::result::Result<Self, String> {
        serde_yaml::from_str(yaml).map_err(|e| format!("Failed to parse YAML: {}", e))
    }

    /// Load configuration from JSON
    pub fn from_json(json: &str) -> std::result::Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("Failed to parse JSON: {}", e))
    }
}

/// Complete output of one engine invocation.
///
/// The status text is always present, including on degenerate results, so
/// the consuming layer always has something renderable.
#[derive(Debug, Clone)]
pub struct RiskReport {
    /// Human-readable account of coverage and degenerate cases
    pub status: String,

    /// Numeric covariance matrix; `None` below 2 usable tickers or 2
    /// return observations
    pub covariance: Option<CovarianceMatrix>,

    /// Display rows of the covariance matrix, row label first, cells to 6
    /// decimal places; empty when `covariance` is `None`
    pub covariance_table: Vec<IndexMap<String, String>>,

    /// Numeric metrics with true nulls
    pub metrics: RiskMetrics,

    /// Display strings for the metrics ("--" for nulls)
    pub metric_text: MetricText,
}

impl RiskReport {
    fn degenerate(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            covariance: None,
            covariance_table: Vec::new(),
            metrics: RiskMetrics::default(),
            metric_text: MetricText::unavailable(),
        }
    }
}

/// Portfolio risk analytics engine.
///
/// Takes its two collaborators by constructor injection; it never reaches
/// for module-level singletons. One call to [`run`](Self::run) produces one
/// complete, internally consistent [`RiskReport`].
pub struct RiskAnalyticsEngine<H, P> {
    holdings: H,
    prices: P,
    config: EngineConfig,
}

impl<H: HoldingsSource, P: PriceHistorySource> RiskAnalyticsEngine<H, P> {
    /// Create an engine with the default configuration.
    pub fn new(holdings: H, prices: P) -> Self {
        Self::with_config(holdings, prices, EngineConfig::default())
    }

    /// Create an engine with an explicit configuration.
    pub fn with_config(holdings: H, prices: P, config: EngineConfig) -> Self {
        Self {
            holdings,
            prices,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run one full analytics pass.
    ///
    /// Only an unreachable holdings store is an error. A provider failure,
    /// insufficient history, or an empty portfolio all produce an `Ok`
    /// report whose status explains the outcome and whose metrics are null.
    pub fn run(&self) -> Result<RiskReport> {
        let holdings = normalize_holdings(self.holdings.get_holdings()?);
        if holdings.is_empty() {
            debug!("holdings snapshot is empty");
            return Ok(RiskReport::degenerate("No holdings found."));
        }

        let tickers: Vec<String> = holdings
            .iter()
            .map(|h| h.ticker.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let mut symbol_set: BTreeSet<String> = tickers.iter().cloned().collect();
        symbol_set.insert(self.config.benchmark.clone());
        let symbols: Vec<String> = symbol_set.into_iter().collect();

        let window = LookbackWindow::ONE_YEAR_DAILY;
        debug!(symbols = symbols.len(), "requesting price history");
        let history = match self.prices.get_history(&symbols, window) {
            Ok(history) => history,
            Err(err) => {
                warn!(error = %err, "price history request failed");
                return Ok(RiskReport::degenerate(format!(
                    "Unable to fetch market data: {}",
                    err
                )));
            }
        };

        let aligned = PriceTable::from_history(&history, &symbols);
        if aligned.is_empty() {
            debug!("no usable price history for any requested symbol");
            return Ok(RiskReport::degenerate(
                "Insufficient price history to compute covariance.",
            ));
        }

        // The benchmark gets its own return series and volatility; it does
        // not enter the portfolio covariance unless independently held.
        let benchmark_returns = aligned.column_returns(&self.config.benchmark);
        let benchmark_vol_ann = annualized_volatility(&benchmark_returns);

        let mut portfolio = aligned.select_columns(&tickers);
        portfolio.drop_all_null_columns();
        portfolio.forward_fill();
        portfolio.drop_all_null_rows();
        let returns = portfolio.to_returns();

        let valid_tickers: Vec<String> = returns.columns().to_vec();
        let observations = returns.num_observations();

        let mut metrics = RiskMetrics {
            benchmark_vol_ann,
            ..RiskMetrics::default()
        };
        let covariance = CovarianceMatrix::estimate(&returns);
        if let Some(cov) = &covariance {
            let weights = WeightVector::from_holdings(&holdings, &valid_tickers);
            let (portfolio_vol_ann, diversification_ratio) = portfolio_metrics(cov, &weights);
            metrics.portfolio_vol_ann = portfolio_vol_ann;
            metrics.diversification_ratio = diversification_ratio;
        }
        let metric_text = format::metric_texts(&metrics, &self.config.benchmark);

        let mut diag = Diagnostics::new();
        diag.window(&window);
        diag.coverage(valid_tickers.len(), tickers.len());
        diag.observations(observations);
        let dropped: Vec<String> = tickers
            .iter()
            .filter(|ticker| !valid_tickers.contains(ticker))
            .cloned()
            .collect();
        diag.filtered(&dropped);

        if observations < 2 || valid_tickers.len() < 2 {
            diag.note("Need at least 2 tickers with usable return history for covariance.");
            debug!(
                observations,
                tickers = valid_tickers.len(),
                "insufficient return history for covariance table"
            );
            return Ok(RiskReport {
                status: diag.status(),
                covariance: None,
                covariance_table: Vec::new(),
                metrics,
                metric_text,
            });
        }

        let covariance_table = covariance
            .as_ref()
            .map(format::covariance_rows)
            .unwrap_or_default();
        debug!(
            tickers = valid_tickers.len(),
            observations, "covariance matrix computed"
        );

        Ok(RiskReport {
            status: diag.status(),
            covariance,
            covariance_table,
            metrics,
            metric_text,
        })
    }
}
