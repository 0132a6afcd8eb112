//! Indicator (one-hot) encoding
//!
//! Builds the numeric feature matrix from a table: continuous columns are
//! copied as-is, then every non-label categorical column is expanded into
//! one 0/1 column per observed value. No baseline category is dropped, so
//! exactly one indicator per source column is set in every row.

use animal_tree_core::FeatureMatrix;
use std::collections::BTreeSet;
use tracing::debug;

use crate::dataset::{parse_numeric, Table};
use crate::errors::{PipelineError, Result};

/// Separator between source column name and category in indicator names
pub const DEFAULT_SEPARATOR: &str = "_";

/// Fitted category vocabulary for a table layout
#[derive(Clone, Debug, PartialEq)]
pub struct OneHotEncoder {
    continuous: Vec<String>,
    categories: Vec<(String, Vec<String>)>,
    separator: String,
}

impl OneHotEncoder {
    /// Learn the vocabulary of `categorical` columns from `table`
    ///
    /// Every other column except the label is treated as continuous.
    pub fn fit(table: &Table, categorical: &[String]) -> Result<Self> {
        Self::fit_with_separator(table, categorical, DEFAULT_SEPARATOR)
    }

    pub fn fit_with_separator(
        table: &Table,
        categorical: &[String],
        separator: &str,
    ) -> Result<Self> {
        let target = table.target_column();

        let mut categories = Vec::with_capacity(categorical.len());
        for name in categorical {
            if Some(name.as_str()) == target {
                continue;
            }
            let idx = table
                .column_index(name)
                .ok_or_else(|| PipelineError::UnknownColumn(name.clone()))?;

            let values: BTreeSet<&str> = table.column_values(idx).collect();
            categories.push((
                name.clone(),
                values.into_iter().map(str::to_string).collect(),
            ));
        }

        let continuous = table
            .headers()
            .iter()
            .filter(|h| Some(h.as_str()) != target && !categorical.contains(h))
            .cloned()
            .collect();

        Ok(Self {
            continuous,
            categories,
            separator: separator.to_string(),
        })
    }

    /// Continuous source columns, in table order
    pub fn continuous_columns(&self) -> &[String] {
        &self.continuous
    }

    /// Categorical source columns with their sorted categories
    pub fn categories(&self) -> &[(String, Vec<String>)] {
        &self.categories
    }

    /// Output column names: continuous first, then indicators
    pub fn feature_names(&self) -> Vec<String> {
        let mut names = self.continuous.clone();
        for (column, values) in &self.categories {
            for value in values {
                names.push(format!("{}{}{}", column, self.separator, value));
            }
        }
        names
    }

    /// Build the feature matrix for `table`
    ///
    /// Fails on unparseable continuous cells and on categories outside the
    /// fitted vocabulary. Empty continuous cells become `NaN`.
    pub fn transform(&self, table: &Table) -> Result<FeatureMatrix> {
        let n_rows = table.n_rows();
        let mut columns = Vec::new();

        for name in &self.continuous {
            let idx = table
                .column_index(name)
                .ok_or_else(|| PipelineError::UnknownColumn(name.clone()))?;

            let mut values = Vec::with_capacity(n_rows);
            for (row, cell) in table.column_values(idx).enumerate() {
                let value = parse_numeric(cell).ok_or_else(|| PipelineError::TypeMismatch {
                    column: name.clone(),
                    row,
                    value: cell.to_string(),
                })?;
                values.push(value);
            }
            columns.push((name.clone(), values));
        }

        for (name, vocabulary) in &self.categories {
            let idx = table
                .column_index(name)
                .ok_or_else(|| PipelineError::UnknownColumn(name.clone()))?;

            let mut indicators = vec![vec![0.0; n_rows]; vocabulary.len()];
            for (row, cell) in table.column_values(idx).enumerate() {
                let slot = vocabulary
                    .binary_search_by(|v| v.as_str().cmp(cell))
                    .map_err(|_| PipelineError::UnseenCategory {
                        column: name.clone(),
                        value: cell.to_string(),
                    })?;
                indicators[slot][row] = 1.0;
            }

            for (value, column) in vocabulary.iter().zip(indicators) {
                columns.push((format!("{}{}{}", name, self.separator, value), column));
            }
        }

        let matrix = FeatureMatrix::from_columns(n_rows, columns)?;
        debug!(
            "Encoded {} rows into {} features",
            matrix.n_rows(),
            matrix.n_features()
        );
        Ok(matrix)
    }
}

/// Categorical columns of `table` that are not the label
pub fn feature_categoricals(table: &Table) -> Vec<String> {
    let target = table.target_column();
    table
        .categorical_columns()
        .into_iter()
        .filter(|c| Some(c.as_str()) != target)
        .collect()
}

/// Fit an encoder on the table's own categorical columns and transform it
pub fn encode(table: &Table) -> Result<(OneHotEncoder, FeatureMatrix)> {
    let encoder = OneHotEncoder::fit(table, &feature_categoricals(table))?;
    let matrix = encoder.transform(table)?;
    Ok((encoder, matrix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn table(csv: &str) -> Table {
        Table::from_reader(csv.as_bytes(), b',').unwrap()
    }

    #[test]
    fn indicators_follow_continuous_columns() {
        let t = table("covering,legs,class\nfur,4,mammal\nfeathers,2,bird\nfur,4,mammal\n");
        let (encoder, m) = encode(&t).unwrap();

        assert_eq!(
            encoder.feature_names(),
            vec!["legs", "covering_feathers", "covering_fur"]
        );
        assert_eq!(m.column_names(), &encoder.feature_names()[..]);
        assert_eq!(m.row(0), Some(&[4.0, 0.0, 1.0][..]));
        assert_eq!(m.row(1), Some(&[2.0, 1.0, 0.0][..]));
    }

    #[test]
    fn label_column_is_never_encoded() {
        let t = table("legs,class\n4,mammal\n2,bird\n");
        let (encoder, m) = encode(&t).unwrap();
        assert_eq!(encoder.feature_names(), vec!["legs"]);
        assert_eq!(m.n_features(), 1);
    }

    #[test]
    fn numeric_label_is_not_a_feature() {
        let t = table("covering,class\nfur,1\nscales,2\n");
        let (encoder, _) = encode(&t).unwrap();
        assert_eq!(
            encoder.feature_names(),
            vec!["covering_fur", "covering_scales"]
        );
    }

    #[test]
    fn forced_continuous_text_is_type_mismatch() {
        let mut t = table("legs,class\n4,mammal\nmany,insect\n");
        // "legs" is inferred categorical; force it continuous.
        t.set_dtype("legs", crate::dataset::ColumnType::Numeric).unwrap();

        match encode(&t) {
            Err(PipelineError::TypeMismatch { column, row, value }) => {
                assert_eq!(column, "legs");
                assert_eq!(row, 1);
                assert_eq!(value, "many");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn unseen_category_is_reported() {
        let train = table("covering,class\nfur,mammal\nfeathers,bird\n");
        let other = table("covering,class\nscales,fish\n");
        let (encoder, _) = encode(&train).unwrap();

        assert!(matches!(
            encoder.transform(&other),
            Err(PipelineError::UnseenCategory { .. })
        ));
    }

    #[test]
    fn custom_separator() {
        let t = table("covering,class\nfur,mammal\n");
        let categorical = feature_categoricals(&t);
        let encoder = OneHotEncoder::fit_with_separator(&t, &categorical, ".").unwrap();
        assert_eq!(encoder.feature_names(), vec!["covering.fur"]);
    }

    #[test]
    fn empty_table_encodes_to_zero_rows() {
        let t = table("covering,legs,class\n");
        let (_, m) = encode(&t).unwrap();
        assert_eq!(m.n_rows(), 0);
    }

    proptest! {
        #[test]
        fn exactly_one_indicator_per_column(
            values in proptest::collection::vec((0u8..4, 0u8..3), 1..40)
        ) {
            let mut csv = String::from("color,size,class\n");
            for (i, (color, size)) in values.iter().enumerate() {
                csv.push_str(&format!("c{},s{},k{}\n", color, size, i % 2));
            }
            let t = table(&csv);
            let (encoder, m) = encode(&t).unwrap();

            let colors: BTreeSet<u8> = values.iter().map(|(c, _)| *c).collect();
            let sizes: BTreeSet<u8> = values.iter().map(|(_, s)| *s).collect();
            prop_assert_eq!(m.n_features(), colors.len() + sizes.len());
            prop_assert_eq!(m.n_rows(), values.len());

            // Column order first, then sorted categories within a column
            let names = encoder.feature_names();
            let expected: Vec<String> = colors
                .iter()
                .map(|c| format!("color_c{}", c))
                .chain(sizes.iter().map(|s| format!("size_s{}", s)))
                .collect();
            prop_assert_eq!(&names, &expected);

            let (color_block, size_block) = (0..colors.len(), colors.len()..names.len());
            for (row, (color, size)) in m.rows().zip(&values) {
                prop_assert_eq!(row[color_block.clone()].iter().sum::<f64>(), 1.0);
                prop_assert_eq!(row[size_block.clone()].iter().sum::<f64>(), 1.0);
                let hot = [format!("color_c{}", color), format!("size_s{}", size)];
                for (name, &x) in names.iter().zip(row) {
                    prop_assert_eq!(x, if hot.contains(name) { 1.0 } else { 0.0 });
                }
            }
        }
    }
}
