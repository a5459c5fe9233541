//! Diagnostics reporting
//!
//! Accumulates a human-readable account of what the pipeline saw: the
//! lookback window, ticker coverage, observation counts, symbols filtered
//! for missing data, and degenerate-case explanations. The resulting status
//! text is attached to every report so a caller can always explain why a
//! metric renders as "--".

use serde::{Deserialize, Serialize};

use crate::sources::LookbackWindow;

/// Ordered accumulator of status sentences.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    parts: Vec<String>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the lookback window in use.
    pub fn window(&mut self, window: &LookbackWindow) {
        self.parts.push(format!("Window: {}.", window.describe()));
    }

    /// Record how many requested tickers survived alignment.
    pub fn coverage(&mut self, used: usize, requested: usize) {
        self.parts
            .push(format!("Tickers used: {} / {}.", used, requested));
    }

    /// Record the number of return observations.
    pub fn observations(&mut self, count: usize) {
        self.parts.push(format!("Observations: {}.", count));
    }

    /// Record tickers dropped for missing data. Silent when none were.
    pub fn filtered(&mut self, dropped: &[String]) {
        if !dropped.is_empty() {
            self.parts.push(format!(
                "Filtered due to missing data: {}.",
                dropped.join(", ")
            ));
        }
    }

    /// Append a free-form explanation (degenerate cases, short circuits).
    pub fn note(&mut self, message: impl Into<String>) {
        self.parts.push(message.into());
    }

    /// The assembled status text.
    pub fn status(&self) -> String {
        self.parts.join(" ")
    }
}
