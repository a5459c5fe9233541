//! Sample covariance estimation
//!
//! Unbiased (N−1 denominator) covariance of aligned daily returns, computed
//! pairwise over rows where both cells are present. A pair with fewer than
//! two common observations contributes 0.0 rather than propagating a null
//! into downstream linear algebra.

use nalgebra::DMatrix;

use crate::table::ReturnTable;

/// Square, symmetric covariance matrix indexed by ticker.
#[derive(Debug, Clone, PartialEq)]
pub struct CovarianceMatrix {
    tickers: Vec<String>,
    matrix: DMatrix<f64>,
}

impl CovarianceMatrix {
    /// Estimate the covariance matrix of a return table.
    ///
    /// Returns `None` when there are fewer than 2 return observations or no
    /// columns: a matrix below that threshold would masquerade as valid.
    pub fn estimate(returns: &ReturnTable) -> Option<Self> {
        let tickers = returns.columns().to_vec();
        if tickers.is_empty() || returns.num_observations() < 2 {
            return None;
        }

        let n = tickers.len();
        let mut matrix = DMatrix::zeros(n, n);
        for i in 0..n {
            for j in i..n {
                let cov =
                    pairwise_covariance(returns.column_cells(i), returns.column_cells(j));
                matrix[(i, j)] = cov;
                matrix[(j, i)] = cov;
            }
        }

        Some(Self { tickers, matrix })
    }

    /// Tickers indexing the rows and columns, in matrix order.
    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }

    /// Number of tickers (matrix dimension).
    pub fn dim(&self) -> usize {
        self.tickers.len()
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.matrix[(i, j)]
    }
}

/// Sample covariance of two cell series over their common non-null rows.
fn pairwise_covariance(a: &[Option<f64>], b: &[Option<f64>]) -> f64 {
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b.iter())
        .filter_map(|(x, y)| x.zip(*y))
        .collect();
    if pairs.len() < 2 {
        return 0.0;
    }

    let n = pairs.len() as f64;
    let mean_a = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_b = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;
    pairs
        .iter()
        .map(|(x, y)| (x - mean_a) * (y - mean_b))
        .sum::<f64>()
        / (n - 1.0)
}
