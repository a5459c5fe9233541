//! Error types for the risk analytics engine

use thiserror::Error;

/// The holdings store could not be reached.
///
/// This is the only failure allowed to cross the engine boundary: without a
/// portfolio snapshot there is nothing meaningful to diagnose.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("holdings store unavailable: {0}")]
pub struct StoreUnavailable(pub String);

/// The market-data provider failed to deliver price history.
///
/// Recovered locally by the engine: the failure is folded into a diagnostic
/// report instead of being raised past the engine boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("market data request failed: {0}")]
pub struct DataProviderError(pub String);

/// Errors that can escape [`RiskAnalyticsEngine::run`](crate::RiskAnalyticsEngine::run)
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Store(#[from] StoreUnavailable),
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
