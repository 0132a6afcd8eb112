//! Dense numeric feature matrix
//!
//! Rows are stored row-major; every row has exactly one value per named
//! column. Row order is never changed by any operation in this module.

use serde::{Deserialize, Serialize};

use crate::errors::{CoreError, Result};

/// Named, row-major matrix of `f64` features
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureMatrix {
    columns: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl FeatureMatrix {
    /// Create an empty matrix with the given column names
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a matrix from column names and row-major values
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<f64>>) -> Result<Self> {
        let mut matrix = Self::new(columns);
        for row in rows {
            matrix.push_row(row)?;
        }
        Ok(matrix)
    }

    /// Build a matrix from column-major data
    ///
    /// Every column must have `n_rows` values.
    pub fn from_columns(n_rows: usize, columns: Vec<(String, Vec<f64>)>) -> Result<Self> {
        let mut names = Vec::with_capacity(columns.len());
        let mut rows = vec![Vec::with_capacity(columns.len()); n_rows];

        for (name, values) in columns {
            if values.len() != n_rows {
                return Err(CoreError::ShapeMismatch {
                    expected: n_rows,
                    actual: values.len(),
                });
            }
            for (row, value) in rows.iter_mut().zip(values) {
                row.push(value);
            }
            names.push(name);
        }

        Ok(Self {
            columns: names,
            rows,
        })
    }

    /// Append one row; its width must match the column count
    pub fn push_row(&mut self, row: Vec<f64>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(CoreError::ShapeMismatch {
                expected: self.columns.len(),
                actual: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Concatenate `other`'s columns to the right of this matrix
    pub fn hstack(mut self, other: FeatureMatrix) -> Result<Self> {
        // A side without columns contributes nothing beyond its row count.
        if self.columns.is_empty() && (self.rows.is_empty() || self.n_rows() == other.n_rows()) {
            return Ok(other);
        }
        if other.columns.is_empty() && (other.rows.is_empty() || other.n_rows() == self.n_rows()) {
            return Ok(self);
        }
        if self.n_rows() != other.n_rows() {
            return Err(CoreError::ShapeMismatch {
                expected: self.n_rows(),
                actual: other.n_rows(),
            });
        }

        self.columns.extend(other.columns);
        for (row, extra) in self.rows.iter_mut().zip(other.rows) {
            row.extend(extra);
        }
        Ok(self)
    }

    /// Number of rows
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Number of feature columns
    pub fn n_features(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column names in matrix order
    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    /// Index of a named column
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Borrow row `idx`
    pub fn row(&self, idx: usize) -> Option<&[f64]> {
        self.rows.get(idx).map(Vec::as_slice)
    }

    /// Iterate over rows in order
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Copy out one column
    pub fn column(&self, idx: usize) -> Option<Vec<f64>> {
        if idx >= self.columns.len() {
            return None;
        }
        Some(self.rows.iter().map(|r| r[idx]).collect())
    }

    /// Value at `(row, col)`
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.rows.get(row).and_then(|r| r.get(col)).copied()
    }

    /// Reject non-finite cells, naming the first offending column and row
    pub fn ensure_finite(&self) -> Result<()> {
        for (row_idx, row) in self.rows.iter().enumerate() {
            if let Some(col_idx) = row.iter().position(|v| !v.is_finite()) {
                return Err(CoreError::TypeMismatch {
                    column: self.columns[col_idx].clone(),
                    row: row_idx,
                    reason: format!("non-finite value {}", row[col_idx]),
                });
            }
        }
        Ok(())
    }
}
