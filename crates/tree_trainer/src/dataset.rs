//! CSV table loading
//!
//! Reads a delimited file with a header row into an in-memory table of
//! string cells. Column types are inferred from content: a column is
//! numeric when every non-empty cell parses as a float.

use animal_tree_core::CoreError;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::errors::{PipelineError, Result};

/// Inferred column type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Categorical,
    Numeric,
}

/// Rows of string cells under named, typed columns
#[derive(Clone, Debug)]
pub struct Table {
    headers: Vec<String>,
    dtypes: Vec<ColumnType>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Load a table from a CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P, delimiter: u8) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|err| match err.kind() {
            std::io::ErrorKind::NotFound => PipelineError::FileNotFound(path.to_path_buf()),
            _ => PipelineError::Io(err),
        })?;
        Self::from_reader(file, delimiter)
    }

    /// Load a table from any reader producing CSV text
    pub fn from_reader<R: Read>(reader: R, delimiter: u8) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(delimiter)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Self::new(headers, rows)
    }

    /// Build a table from headers and rows, inferring column types
    ///
    /// Every row must have one cell per header.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        if let Some(row) = rows.iter().find(|r| r.len() != headers.len()) {
            return Err(CoreError::ShapeMismatch {
                expected: headers.len(),
                actual: row.len(),
            }
            .into());
        }

        let dtypes = (0..headers.len())
            .map(|col| infer_dtype(rows.iter().map(|r| r[col].as_str())))
            .collect();

        Ok(Self {
            headers,
            dtypes,
            rows,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn dtypes(&self) -> &[ColumnType] {
        &self.dtypes
    }

    /// Number of data rows (header excluded)
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_columns(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Type of a named column
    pub fn dtype(&self, name: &str) -> Option<ColumnType> {
        self.column_index(name).map(|idx| self.dtypes[idx])
    }

    /// Override the inferred type of a column
    pub fn set_dtype(&mut self, name: &str, dtype: ColumnType) -> Result<()> {
        let idx = self
            .column_index(name)
            .ok_or_else(|| PipelineError::UnknownColumn(name.to_string()))?;
        self.dtypes[idx] = dtype;
        Ok(())
    }

    /// Cells of one column, in row order
    pub fn column_values(&self, idx: usize) -> impl Iterator<Item = &str> + '_ {
        self.rows.iter().map(move |r| r[idx].as_str())
    }

    /// First `n` rows, for previews
    pub fn head(&self, n: usize) -> &[Vec<String>] {
        &self.rows[..n.min(self.rows.len())]
    }

    /// Categorical column names in table order (label column included)
    pub fn categorical_columns(&self) -> Vec<String> {
        self.columns_of(ColumnType::Categorical)
    }

    /// Numeric column names in table order (label column included)
    pub fn continuous_columns(&self) -> Vec<String> {
        self.columns_of(ColumnType::Numeric)
    }

    fn columns_of(&self, dtype: ColumnType) -> Vec<String> {
        self.headers
            .iter()
            .zip(&self.dtypes)
            .filter(|(_, &t)| t == dtype)
            .map(|(h, _)| h.clone())
            .collect()
    }

    /// Name of the label column (the last one)
    pub fn target_column(&self) -> Option<&str> {
        self.headers.last().map(String::as_str)
    }

    /// Label column values, verbatim and in row order
    pub fn target(&self) -> Result<Vec<String>> {
        if self.headers.is_empty() {
            return Err(PipelineError::Core(CoreError::EmptyDataset));
        }
        let idx = self.headers.len() - 1;
        Ok(self.column_values(idx).map(str::to_string).collect())
    }
}

/// Numeric if every non-empty cell parses as `f64` and at least one does
fn infer_dtype<'a>(values: impl Iterator<Item = &'a str>) -> ColumnType {
    let mut seen_number = false;
    for value in values {
        if value.is_empty() {
            continue;
        }
        if value.parse::<f64>().is_err() {
            return ColumnType::Categorical;
        }
        seen_number = true;
    }

    if seen_number {
        ColumnType::Numeric
    } else {
        ColumnType::Categorical
    }
}

/// Parse a numeric cell; empty cells become `NaN`
pub(crate) fn parse_numeric(value: &str) -> Option<f64> {
    if value.is_empty() {
        return Some(f64::NAN);
    }
    value.parse::<f64>().ok()
}
