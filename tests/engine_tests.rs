//! Integration tests for the risk analytics engine
//!
//! Drives the public API end-to-end with in-memory holdings and price
//! sources, covering the degenerate paths (empty portfolio, provider
//! failure, missing symbols, insufficient history) as well as the full
//! covariance pipeline.

use std::collections::HashMap;

use chrono::NaiveDate;
use folio_risk::{
    DataProviderError, EngineConfig, EngineError, Holding, HoldingsSource, LookbackWindow,
    PricePoint, PriceHistorySource, PriceSeries, RiskAnalyticsEngine, StoreUnavailable,
};

struct FixedHoldings(Vec<Holding>);

impl HoldingsSource for FixedHoldings {
    fn get_holdings(&self) -> Result<Vec<Holding>, StoreUnavailable> {
        Ok(self.0.clone())
    }
}

struct FailingStore;

impl HoldingsSource for FailingStore {
    fn get_holdings(&self) -> Result<Vec<Holding>, StoreUnavailable> {
        Err(StoreUnavailable("connection refused".to_string()))
    }
}

struct FixedHistory(HashMap<String, PriceSeries>);

impl PriceHistorySource for FixedHistory {
    fn get_history(
        &self,
        _symbols: &[String],
        _window: LookbackWindow,
    ) -> Result<HashMap<String, PriceSeries>, DataProviderError> {
        Ok(self.0.clone())
    }
}

struct FailingProvider;

impl PriceHistorySource for FailingProvider {
    fn get_history(
        &self,
        _symbols: &[String],
        _window: LookbackWindow,
    ) -> Result<HashMap<String, PriceSeries>, DataProviderError> {
        Err(DataProviderError("rate limited".to_string()))
    }
}

fn holding(ticker: &str, shares: f64, price: f64, market_value: f64) -> Holding {
    Holding {
        ticker: ticker.to_string(),
        shares,
        avg_price: price,
        current_price: price,
        market_value,
    }
}

/// Consecutive calendar days starting 2024-01-01.
fn dates(count: usize) -> Vec<NaiveDate> {
    let mut dates = Vec::with_capacity(count);
    let mut date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    for _ in 0..count {
        dates.push(date);
        date = date.succ_opt().unwrap();
    }
    dates
}

fn series(prices: &[f64]) -> PriceSeries {
    dates(prices.len())
        .into_iter()
        .zip(prices)
        .map(|(date, price)| PricePoint {
            date,
            adj_close: Some(*price),
            close: Some(*price),
        })
        .collect()
}

#[test]
fn empty_portfolio_yields_no_holdings_diagnostic() {
    let engine = RiskAnalyticsEngine::new(FixedHoldings(vec![]), FixedHistory(HashMap::new()));
    let report = engine.run().unwrap();

    assert_eq!(report.status, "No holdings found.");
    assert!(report.covariance.is_none());
    assert!(report.covariance_table.is_empty());
    assert_eq!(report.metrics.portfolio_vol_ann, None);
    assert_eq!(report.metric_text.portfolio_vol, "--");
    assert_eq!(report.metric_text.benchmark_vol, "--");
    assert_eq!(report.metric_text.diversification, "--");
}

#[test]
fn store_failure_propagates() {
    let engine = RiskAnalyticsEngine::new(FailingStore, FixedHistory(HashMap::new()));
    let err = engine.run().unwrap_err();

    match err {
        EngineError::Store(inner) => {
            assert!(inner.to_string().contains("connection refused"));
        }
    }
}

#[test]
fn provider_failure_becomes_diagnostic_report() {
    let holdings = FixedHoldings(vec![holding("AAA", 10.0, 100.0, 1000.0)]);
    let engine = RiskAnalyticsEngine::new(holdings, FailingProvider);
    let report = engine.run().unwrap();

    assert!(report.status.starts_with("Unable to fetch market data:"));
    assert!(report.status.contains("rate limited"));
    assert!(report.covariance.is_none());
    assert_eq!(report.metric_text.portfolio_vol, "--");
}

#[test]
fn provider_with_no_usable_series_yields_insufficient_history() {
    let holdings = FixedHoldings(vec![holding("AAA", 10.0, 100.0, 1000.0)]);
    let engine = RiskAnalyticsEngine::new(holdings, FixedHistory(HashMap::new()));
    let report = engine.run().unwrap();

    assert_eq!(
        report.status,
        "Insufficient price history to compute covariance."
    );
    assert!(report.covariance.is_none());
}

#[test]
fn missing_symbol_is_listed_as_filtered() {
    // Scenario: provider returns AAA but not BBB.
    let holdings = FixedHoldings(vec![
        holding("AAA", 10.0, 100.0, 1000.0),
        holding("BBB", 10.0, 100.0, 1000.0),
    ]);
    let mut history = HashMap::new();
    history.insert("AAA".to_string(), series(&[100.0, 101.0, 99.0, 102.0]));
    history.insert("SPY".to_string(), series(&[470.0, 471.0, 469.0, 472.0]));

    let engine = RiskAnalyticsEngine::new(holdings, FixedHistory(history));
    let report = engine.run().unwrap();

    assert!(report.status.contains("Tickers used: 1 / 2."));
    assert!(report.status.contains("Filtered due to missing data: BBB."));
    // Only one usable ticker left: no covariance table, but the single-name
    // metrics still compute.
    assert!(report
        .status
        .contains("Need at least 2 tickers with usable return history for covariance."));
    assert!(report.covariance.is_none());
    assert!(report.metrics.portfolio_vol_ann.is_some());
    assert_eq!(report.metrics.diversification_ratio, Some(1.0));
}

#[test]
fn zero_variance_pair_has_zero_vol_and_undefined_ratio() {
    // 253 constant prices → 252 identical daily returns of 0 for each name.
    let prices = vec![100.0; 253];
    let holdings = FixedHoldings(vec![
        holding("AAA", 10.0, 100.0, 1000.0),
        holding("BBB", 10.0, 100.0, 1000.0),
    ]);
    let mut history = HashMap::new();
    history.insert("AAA".to_string(), series(&prices));
    history.insert("BBB".to_string(), series(&prices));

    let engine = RiskAnalyticsEngine::new(holdings, FixedHistory(history));
    let report = engine.run().unwrap();

    assert!(report.status.contains("Observations: 252."));
    let cov = report.covariance.as_ref().unwrap();
    for i in 0..cov.dim() {
        for j in 0..cov.dim() {
            assert_eq!(cov.get(i, j), 0.0);
        }
    }
    assert_eq!(report.metrics.portfolio_vol_ann, Some(0.0));
    assert_eq!(report.metrics.diversification_ratio, None);
    assert_eq!(report.metric_text.portfolio_vol, "0.00%");
    assert_eq!(report.metric_text.diversification, "--");
    for row in &report.covariance_table {
        for (key, value) in row {
            if key != "ticker" {
                assert_eq!(value, "0.000000");
            }
        }
    }
}

#[test]
fn single_ticker_portfolio_has_unit_diversification() {
    // 31 prices → 30 return observations with nonzero variance.
    let prices: Vec<f64> = (0..31)
        .map(|i| 100.0 + ((i * 7) % 11) as f64)
        .collect();
    let holdings = FixedHoldings(vec![holding("AAA", 30.0, 100.0, 3000.0)]);
    let mut history = HashMap::new();
    history.insert("AAA".to_string(), series(&prices));

    let engine = RiskAnalyticsEngine::new(holdings, FixedHistory(history));
    let report = engine.run().unwrap();

    assert_eq!(report.metrics.diversification_ratio, Some(1.0));
    assert!(report.metrics.portfolio_vol_ann.unwrap() > 0.0);
    // No benchmark data: the benchmark metric is independently null.
    assert_eq!(report.metrics.benchmark_vol_ann, None);
    assert_eq!(report.metric_text.benchmark_vol, "--");
    assert_eq!(report.metric_text.diversification, "1.000");
}

#[test]
fn benchmark_metric_is_independent_of_portfolio_metrics() {
    // Benchmark history present; the sole portfolio ticker has a single
    // observation on the last date, so no return can be formed for it even
    // after forward-fill.
    let holdings = FixedHoldings(vec![holding("AAA", 10.0, 100.0, 1000.0)]);
    let mut history = HashMap::new();
    history.insert(
        "AAA".to_string(),
        vec![PricePoint {
            date: NaiveDate::from_ymd_opt(2024, 1, 4).unwrap(),
            adj_close: Some(100.0),
            close: Some(100.0),
        }],
    );
    history.insert("SPY".to_string(), series(&[470.0, 471.0, 468.0, 472.0]));

    let engine = RiskAnalyticsEngine::new(holdings, FixedHistory(history));
    let report = engine.run().unwrap();

    assert!(report.metrics.benchmark_vol_ann.is_some());
    assert_eq!(report.metrics.portfolio_vol_ann, None);
    assert_eq!(report.metrics.diversification_ratio, None);
    // Spread segment is omitted when the portfolio volatility is null.
    assert!(report.metric_text.benchmark_vol.starts_with("SPY "));
    assert!(!report.metric_text.benchmark_vol.contains("Spread"));
    assert_eq!(report.metric_text.portfolio_vol, "--");
}

#[test]
fn full_pipeline_produces_symmetric_covariance_table() {
    let holdings = FixedHoldings(vec![
        holding("BBB", 10.0, 100.0, 1000.0),
        holding("AAA", 30.0, 100.0, 3000.0),
    ]);
    let mut history = HashMap::new();
    history.insert("AAA".to_string(), series(&[100.0, 102.0, 99.0, 103.0, 101.0]));
    history.insert("BBB".to_string(), series(&[50.0, 49.0, 50.5, 51.0, 50.0]));
    history.insert("SPY".to_string(), series(&[470.0, 471.0, 469.0, 473.0, 472.0]));

    let engine = RiskAnalyticsEngine::new(holdings, FixedHistory(history));
    let report = engine.run().unwrap();

    assert!(report.status.contains("Window: 1 year (daily)."));
    assert!(report.status.contains("Tickers used: 2 / 2."));
    assert!(report.status.contains("Observations: 4."));
    assert!(!report.status.contains("Filtered"));

    let cov = report.covariance.as_ref().unwrap();
    // The benchmark is not a holding, so it stays out of the matrix.
    assert_eq!(cov.tickers(), &["AAA".to_string(), "BBB".to_string()]);
    for i in 0..cov.dim() {
        for j in 0..cov.dim() {
            assert!((cov.get(i, j) - cov.get(j, i)).abs() < 1e-15);
        }
    }

    // Display rows: label column first, then one 6-decimal cell per ticker.
    assert_eq!(report.covariance_table.len(), 2);
    let first_row = &report.covariance_table[0];
    let keys: Vec<&String> = first_row.keys().collect();
    assert_eq!(keys, vec!["ticker", "AAA", "BBB"]);
    assert_eq!(first_row["ticker"], "AAA");
    for (key, value) in first_row.iter().skip(1) {
        assert_eq!(
            value.split('.').nth(1).map(str::len),
            Some(6),
            "cell {key} not formatted to 6 decimal places: {value}"
        );
    }

    assert!(report.metrics.portfolio_vol_ann.is_some());
    assert!(report.metrics.benchmark_vol_ann.is_some());
    assert!(report.metrics.diversification_ratio.is_some());
    assert!(report.metric_text.benchmark_vol.contains("| Spread "));
}

#[test]
fn benchmark_held_in_portfolio_enters_covariance() {
    let holdings = FixedHoldings(vec![
        holding("AAA", 10.0, 100.0, 1000.0),
        holding("SPY", 2.0, 470.0, 940.0),
    ]);
    let mut history = HashMap::new();
    history.insert("AAA".to_string(), series(&[100.0, 102.0, 99.0, 103.0]));
    history.insert("SPY".to_string(), series(&[470.0, 471.0, 469.0, 473.0]));

    let engine = RiskAnalyticsEngine::new(holdings, FixedHistory(history));
    let report = engine.run().unwrap();

    let cov = report.covariance.as_ref().unwrap();
    assert_eq!(cov.tickers(), &["AAA".to_string(), "SPY".to_string()]);
    assert!(report.metrics.benchmark_vol_ann.is_some());
}

#[test]
fn insufficient_observations_nulls_portfolio_metrics() {
    // Two prices → one return observation, below the covariance threshold.
    let holdings = FixedHoldings(vec![
        holding("AAA", 10.0, 100.0, 1000.0),
        holding("BBB", 10.0, 100.0, 1000.0),
    ]);
    let mut history = HashMap::new();
    history.insert("AAA".to_string(), series(&[100.0, 101.0]));
    history.insert("BBB".to_string(), series(&[50.0, 50.5]));

    let engine = RiskAnalyticsEngine::new(holdings, FixedHistory(history));
    let report = engine.run().unwrap();

    assert!(report.status.contains("Observations: 1."));
    assert!(report
        .status
        .contains("Need at least 2 tickers with usable return history for covariance."));
    assert!(report.covariance.is_none());
    assert_eq!(report.metrics.portfolio_vol_ann, None);
    assert_eq!(report.metrics.diversification_ratio, None);
    assert_eq!(report.metric_text.portfolio_vol, "--");
}

#[test]
fn duplicate_and_messy_tickers_are_normalized() {
    let holdings = FixedHoldings(vec![
        holding(" aaa ", 5.0, 100.0, 500.0),
        holding("AAA", 5.0, 100.0, 500.0),
        holding("  ", 5.0, 100.0, 500.0),
        holding("bbb", 10.0, 100.0, 1000.0),
    ]);
    let mut history = HashMap::new();
    history.insert("AAA".to_string(), series(&[100.0, 102.0, 99.0, 103.0]));
    history.insert("BBB".to_string(), series(&[50.0, 49.0, 50.5, 51.0]));
    history.insert("SPY".to_string(), series(&[470.0, 471.0, 469.0, 473.0]));

    let engine = RiskAnalyticsEngine::new(holdings, FixedHistory(history));
    let report = engine.run().unwrap();

    // The blank row is dropped; "aaa"/"AAA" collapse to one requested ticker.
    assert!(report.status.contains("Tickers used: 2 / 2."));
    let cov = report.covariance.as_ref().unwrap();
    assert_eq!(cov.tickers(), &["AAA".to_string(), "BBB".to_string()]);
}

#[test]
fn repeated_runs_are_bit_identical() {
    let make_engine = || {
        let holdings = FixedHoldings(vec![
            holding("AAA", 10.0, 100.0, 1000.0),
            holding("BBB", 30.0, 100.0, 3000.0),
        ]);
        let mut history = HashMap::new();
        history.insert("AAA".to_string(), series(&[100.0, 102.0, 99.0, 103.0, 101.0]));
        history.insert("BBB".to_string(), series(&[50.0, 49.0, 50.5, 51.0, 50.0]));
        history.insert("SPY".to_string(), series(&[470.0, 471.0, 469.0, 473.0, 472.0]));
        RiskAnalyticsEngine::new(holdings, FixedHistory(history))
    };

    let first = make_engine().run().unwrap();
    let second = make_engine().run().unwrap();

    assert_eq!(first.status, second.status);
    assert_eq!(first.metrics, second.metrics);
    assert_eq!(first.metric_text, second.metric_text);
    assert_eq!(first.covariance_table, second.covariance_table);
    let (a, b) = (
        first.covariance.as_ref().unwrap(),
        second.covariance.as_ref().unwrap(),
    );
    assert_eq!(a.matrix(), b.matrix());
}

#[test]
fn custom_benchmark_symbol_is_respected() {
    let holdings = FixedHoldings(vec![holding("AAA", 10.0, 100.0, 1000.0)]);
    let mut history = HashMap::new();
    history.insert("AAA".to_string(), series(&[100.0, 102.0, 99.0, 103.0]));
    history.insert("QQQ".to_string(), series(&[400.0, 402.0, 398.0, 404.0]));

    let config = EngineConfig::from_yaml("benchmark: QQQ").unwrap();
    let engine = RiskAnalyticsEngine::with_config(holdings, FixedHistory(history), config);
    let report = engine.run().unwrap();

    assert!(report.metrics.benchmark_vol_ann.is_some());
    assert!(report.metric_text.benchmark_vol.starts_with("QQQ "));
}

#[test]
fn equal_weight_fallback_still_yields_diversification_ratio() {
    // Every position value is zero: equal weighting keeps the ratio
    // computable instead of dividing by zero.
    let holdings = FixedHoldings(vec![
        holding("AAA", 0.0, 0.0, 0.0),
        holding("BBB", 0.0, 0.0, 0.0),
    ]);
    let mut history = HashMap::new();
    history.insert("AAA".to_string(), series(&[100.0, 102.0, 99.0, 103.0, 101.0]));
    history.insert("BBB".to_string(), series(&[50.0, 49.0, 50.5, 51.0, 50.0]));

    let engine = RiskAnalyticsEngine::new(holdings, FixedHistory(history));
    let report = engine.run().unwrap();

    assert!(report.metrics.portfolio_vol_ann.unwrap() > 0.0);
    assert!(report.metrics.diversification_ratio.is_some());
}
