//! Column preprocessing applied in front of every sub-model.
//!
//! Mirrors a column transformer fitted at training time: categorical columns are
//! one-hot encoded over the categories seen during fitting (unknown or missing
//! values encode as all zeros), numeric columns pass through with an optional
//! imputation value. Categorical outputs come first, then numeric outputs.

use serde::{Deserialize, Serialize};

use super::SubModelError;
use crate::domain::feature::FeatureValue;

/// A single request row aligned to the artifact's feature order.
#[derive(Clone, Debug)]
pub struct FeatureRow<'a> {
    columns: &'a [String],
    values: Vec<Option<&'a FeatureValue>>,
}

impl<'a> FeatureRow<'a> {
    pub fn new(columns: &'a [String], values: Vec<Option<&'a FeatureValue>>) -> Self {
        Self { columns, values }
    }

    /// Value for a named column, `None` when the column is unknown or the
    /// feature was not supplied.
    pub fn get(&self, column: &str) -> Option<&'a FeatureValue> {
        self.columns
            .iter()
            .position(|name| name == column)
            .and_then(|index| self.values.get(index).copied().flatten())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnSpec {
    Categorical {
        name: String,
        categories: Vec<String>,
    },
    Numeric {
        name: String,
        /// Imputation value used when the feature is missing or not numeric.
        #[serde(default)]
        fill: Option<f64>,
    },
}

impl ColumnSpec {
    pub fn name(&self) -> &str {
        match self {
            Self::Categorical { name, .. } | Self::Numeric { name, .. } => name,
        }
    }

    fn width(&self) -> usize {
        match self {
            Self::Categorical { categories, .. } => categories.len(),
            Self::Numeric { .. } => 1,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnTransformer {
    pub columns: Vec<ColumnSpec>,
}

impl ColumnTransformer {
    pub fn new(columns: Vec<ColumnSpec>) -> Self {
        Self { columns }
    }

    /// Number of model inputs produced by `transform`.
    pub fn output_width(&self) -> usize {
        self.columns.iter().map(ColumnSpec::width).sum()
    }

    pub fn transform(&self, row: &FeatureRow<'_>) -> Result<Vec<f64>, SubModelError> {
        let mut encoded = Vec::with_capacity(self.output_width());

        for column in &self.columns {
            if let ColumnSpec::Categorical { name, categories } = column {
                let value = row.get(name).and_then(FeatureValue::as_category);
                encoded.extend(categories.iter().map(|category| {
                    if value.as_deref() == Some(category.as_str()) {
                        1.0
                    } else {
                        0.0
                    }
                }));
            }
        }

        for column in &self.columns {
            if let ColumnSpec::Numeric { name, fill } = column {
                let value = row
                    .get(name)
                    .and_then(FeatureValue::as_number)
                    .or(*fill)
                    .ok_or_else(|| SubModelError::MissingValue { column: name.clone() })?;
                encoded.push(value);
            }
        }

        Ok(encoded)
    }
}
