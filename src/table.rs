//! Price alignment and return computation
//!
//! Merges ragged per-symbol price series into a single date-indexed table:
//! - one canonical price field per symbol, chosen by an ordered priority list
//! - rows are the union of observed dates
//! - gaps are forward-filled (last known value carried forward)
//! - rows and columns with no usable data are dropped
//!
//! From the aligned table, simple period returns are derived per column; the
//! first row never has a prior observation and is always dropped.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};

use crate::sources::{PricePoint, PriceSeries};

/// Candidate price fields a provider may supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceField {
    /// Adjusted closing price (splits and dividends applied)
    AdjClose,
    /// Raw closing price
    Close,
}

/// Ordered preference for the canonical price field of a symbol.
pub const PRICE_FIELD_PRIORITY: [PriceField; 2] = [PriceField::AdjClose, PriceField::Close];

impl PriceField {
    /// Value of this field at one observation.
    pub fn value(&self, point: &PricePoint) -> Option<f64> {
        match self {
            PriceField::AdjClose => point.adj_close,
            PriceField::Close => point.close,
        }
    }

    /// Pick the canonical field for a series: the first field in
    /// [`PRICE_FIELD_PRIORITY`] with at least one non-null observation.
    /// A series with neither field populated contributes no column.
    pub fn select(series: &PriceSeries) -> Option<PriceField> {
        PRICE_FIELD_PRIORITY
            .iter()
            .copied()
            .find(|field| series.iter().any(|point| field.value(point).is_some()))
    }
}

/// Date-indexed table of price levels, one column per surviving symbol.
///
/// Cells are stored column-major; a `None` cell is a gap that forward-fill
/// may later cover.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTable {
    dates: Vec<NaiveDate>,
    columns: Vec<String>,
    cells: Vec<Vec<Option<f64>>>,
}

impl PriceTable {
    /// Build the aligned table for the requested symbols.
    ///
    /// Symbols absent from the provider response, or whose series has no
    /// usable price field, contribute no column. Column order follows the
    /// requested symbol order.
    pub fn from_history(history: &HashMap<String, PriceSeries>, symbols: &[String]) -> Self {
        let mut kept: Vec<(String, &PriceSeries, PriceField)> = Vec::new();
        for symbol in symbols {
            if let Some(series) = history.get(symbol) {
                if let Some(field) = PriceField::select(series) {
                    kept.push((symbol.clone(), series, field));
                }
            }
        }

        let mut date_set: BTreeSet<NaiveDate> = BTreeSet::new();
        for (_, series, _) in &kept {
            for point in series.iter() {
                date_set.insert(point.date);
            }
        }
        let dates: Vec<NaiveDate> = date_set.into_iter().collect();
        let row_of: HashMap<NaiveDate, usize> =
            dates.iter().enumerate().map(|(row, date)| (*date, row)).collect();

        let mut columns = Vec::with_capacity(kept.len());
        let mut cells = Vec::with_capacity(kept.len());
        for (symbol, series, field) in kept {
            let mut column = vec![None; dates.len()];
            for point in series.iter() {
                column[row_of[&point.date]] = field.value(point);
            }
            columns.push(symbol);
            cells.push(column);
        }

        Self {
            dates,
            columns,
            cells,
        }
    }

    /// True when the table has no rows or no columns.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty() || self.columns.is_empty()
    }

    pub fn num_rows(&self) -> usize {
        self.dates.len()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Cells of one column, in date order.
    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        let idx = self.columns.iter().position(|col| col == name)?;
        Some(&self.cells[idx])
    }

    /// Restrict to the given columns, preserving table order.
    pub fn select_columns(&self, keep: &[String]) -> PriceTable {
        let keep: HashSet<&str> = keep.iter().map(String::as_str).collect();
        let mut columns = Vec::new();
        let mut cells = Vec::new();
        for (name, column) in self.columns.iter().zip(&self.cells) {
            if keep.contains(name.as_str()) {
                columns.push(name.clone());
                cells.push(column.clone());
            }
        }
        PriceTable {
            dates: self.dates.clone(),
            columns,
            cells,
        }
    }

    /// Carry the last known value of each column forward across gaps.
    /// Cells before the first observation stay null.
    pub fn forward_fill(&mut self) {
        for column in &mut self.cells {
            let mut last = None;
            for cell in column.iter_mut() {
                if cell.is_some() {
                    last = *cell;
                } else {
                    *cell = last;
                }
            }
        }
    }

    /// Drop rows where every column is null.
    pub fn drop_all_null_rows(&mut self) {
        prune_null_rows(&mut self.dates, &mut self.cells);
    }

    /// Drop columns with no non-null observation at all.
    pub fn drop_all_null_columns(&mut self) {
        prune_null_columns(&mut self.columns, &mut self.cells);
    }

    /// Simple returns of a single column: forward-fill, drop leading nulls,
    /// then percentage change between consecutive observations.
    ///
    /// Used for the benchmark, which gets its own volatility without
    /// entering the portfolio covariance. An unknown column yields an empty
    /// series. Non-finite ratios (a zero prior price) are skipped.
    pub fn column_returns(&self, name: &str) -> Vec<f64> {
        let Some(column) = self.column(name) else {
            return Vec::new();
        };
        let mut prices = Vec::new();
        let mut last = None;
        for cell in column {
            if cell.is_some() {
                last = *cell;
            }
            if let Some(price) = last {
                prices.push(price);
            }
        }
        prices
            .windows(2)
            .filter_map(|pair| {
                let ret = pair[1] / pair[0] - 1.0;
                ret.is_finite().then_some(ret)
            })
            .collect()
    }

    /// Derive the return table: percentage change between consecutive rows
    /// per column. The first row is always dropped, then all-null rows and
    /// all-null columns are pruned.
    pub fn to_returns(&self) -> ReturnTable {
        let rows = self.dates.len();
        let dates = if rows > 1 {
            self.dates[1..].to_vec()
        } else {
            Vec::new()
        };
        let cells: Vec<Vec<Option<f64>>> = self
            .cells
            .iter()
            .map(|column| {
                (1..rows)
                    .map(|row| match (column[row - 1], column[row]) {
                        (Some(prev), Some(cur)) => {
                            let ret = cur / prev - 1.0;
                            ret.is_finite().then_some(ret)
                        }
                        _ => None,
                    })
                    .collect()
            })
            .collect();

        let mut returns = ReturnTable {
            dates,
            columns: self.columns.clone(),
            cells,
        };
        returns.prune();
        returns
    }
}

/// Date-indexed table of simple period returns.
///
/// Same column set as its source price table, minus columns that became
/// entirely null after differencing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnTable {
    dates: Vec<NaiveDate>,
    columns: Vec<String>,
    cells: Vec<Vec<Option<f64>>>,
}

impl ReturnTable {
    /// Number of return observations (rows).
    pub fn num_observations(&self) -> usize {
        self.dates.len()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Cells of one column by position, in date order.
    pub fn column_cells(&self, idx: usize) -> &[Option<f64>] {
        &self.cells[idx]
    }

    /// Cells of one column by name.
    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        let idx = self.columns.iter().position(|col| col == name)?;
        Some(&self.cells[idx])
    }

    fn prune(&mut self) {
        prune_null_rows(&mut self.dates, &mut self.cells);
        prune_null_columns(&mut self.columns, &mut self.cells);
    }
}

fn prune_null_rows(dates: &mut Vec<NaiveDate>, cells: &mut [Vec<Option<f64>>]) {
    let keep: Vec<usize> = (0..dates.len())
        .filter(|&row| cells.iter().any(|column| column[row].is_some()))
        .collect();
    if keep.len() == dates.len() {
        return;
    }
    *dates = keep.iter().map(|&row| dates[row]).collect();
    for column in cells.iter_mut() {
        *column = keep.iter().map(|&row| column[row]).collect();
    }
}

fn prune_null_columns(columns: &mut Vec<String>, cells: &mut Vec<Vec<Option<f64>>>) {
    let mut kept_columns = Vec::with_capacity(columns.len());
    let mut kept_cells = Vec::with_capacity(cells.len());
    for (name, column) in columns.drain(..).zip(cells.drain(..)) {
        if column.iter().any(Option::is_some) {
            kept_columns.push(name);
            kept_cells.push(column);
        }
    }
    *columns = kept_columns;
    *cells = kept_cells;
}
