use credit_approval_core::{PipelineError, PipelineResult};
use credit_approval_data::{Column, NumericTable, Table};
use std::collections::HashMap;
use tracing::debug;

/// Encode the categories of one column as integer codes.
///
/// Codes follow the ascending (byte-wise) order of the category text, so fitting the
/// same values twice always yields the same mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelEncoder {
    pub column: String,
    pub classes: Vec<String>,
    pub class_to_idx: HashMap<String, usize>,
}

impl LabelEncoder {
    pub fn new(column: &str) -> Self {
        LabelEncoder {
            column: column.to_string(),
            classes: Vec::new(),
            class_to_idx: HashMap::new(),
        }
    }

    /// Fit the encoder on string labels.
    pub fn fit(&mut self, labels: &[String]) {
        let mut unique: Vec<String> = labels.to_vec();
        unique.sort();
        unique.dedup();
        self.classes = unique;
        self.class_to_idx = self
            .classes
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();
    }

    /// Map each label to its code. Categories not seen by `fit` are an error.
    pub fn transform(&self, labels: &[String]) -> PipelineResult<Vec<f64>> {
        labels
            .iter()
            .map(|l| {
                self.class_to_idx
                    .get(l)
                    .map(|&i| i as f64)
                    .ok_or_else(|| PipelineError::UnknownCategory {
                        column: self.column.clone(),
                        value: l.clone(),
                    })
            })
            .collect()
    }

    pub fn fit_transform(&mut self, labels: &[String]) -> PipelineResult<Vec<f64>> {
        self.fit(labels);
        self.transform(labels)
    }

    /// Inverse transform: code → category.
    pub fn inverse_transform(&self, codes: &[f64]) -> PipelineResult<Vec<String>> {
        codes
            .iter()
            .map(|&v| {
                let idx = v.round();
                if idx < 0.0 || idx as usize >= self.classes.len() {
                    return Err(PipelineError::IndexOutOfBounds {
                        index: idx.max(0.0) as usize,
                        axis: 0,
                        size: self.classes.len(),
                    });
                }
                Ok(self.classes[idx as usize].clone())
            })
            .collect()
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }
}

/// Label-encode every categorical column of a fully imputed table.
///
/// Each column gets its own independent [`LabelEncoder`]; numeric columns pass through.
#[derive(Debug, Clone, Default)]
pub struct ColumnEncoder {
    /// One encoder per table column; `None` for numeric columns.
    pub encoders: Option<Vec<Option<LabelEncoder>>>,
}

impl ColumnEncoder {
    pub fn new() -> Self {
        ColumnEncoder { encoders: None }
    }

    pub fn fit(&mut self, table: &Table) -> PipelineResult<()> {
        let mut encoders = Vec::with_capacity(table.n_cols());
        for (spec, column) in table.schema().columns().iter().zip(table.columns()) {
            let encoder = match column {
                Column::Categorical(_) => {
                    let values = present_strings(&spec.name, column)?;
                    let mut enc = LabelEncoder::new(&spec.name);
                    enc.fit(&values);
                    debug!(column = %spec.name, classes = enc.n_classes(), "fitted label encoder");
                    Some(enc)
                }
                Column::Numeric(_) => None,
            };
            encoders.push(encoder);
        }
        self.encoders = Some(encoders);
        Ok(())
    }

    pub fn transform(&self, table: &Table) -> PipelineResult<NumericTable> {
        let encoders = self
            .encoders
            .as_ref()
            .ok_or(PipelineError::NotFitted("ColumnEncoder"))?;
        if encoders.len() != table.n_cols() {
            return Err(PipelineError::ShapeMismatch {
                expected: vec![encoders.len()],
                got: vec![table.n_cols()],
            });
        }

        let mut columns = Vec::with_capacity(table.n_cols());
        for ((spec, column), encoder) in table
            .schema()
            .columns()
            .iter()
            .zip(table.columns())
            .zip(encoders)
        {
            let encoded = match (column, encoder) {
                (Column::Categorical(_), Some(enc)) => {
                    enc.transform(&present_strings(&spec.name, column)?)?
                }
                (Column::Numeric(values), None) => values
                    .iter()
                    .map(|v| v.ok_or_else(|| absent_cells(&spec.name)))
                    .collect::<PipelineResult<Vec<f64>>>()?,
                _ => {
                    return Err(PipelineError::InvalidSchema(format!(
                        "column '{}' changed kind since fit",
                        spec.name
                    )))
                }
            };
            columns.push(encoded);
        }
        NumericTable::new(table.schema().clone(), columns)
    }

    pub fn fit_transform(&mut self, table: &Table) -> PipelineResult<NumericTable> {
        self.fit(table)?;
        self.transform(table)
    }

    /// Encoder fitted for column `idx`, if that column is categorical.
    pub fn encoder(&self, idx: usize) -> Option<&LabelEncoder> {
        self.encoders.as_ref()?.get(idx)?.as_ref()
    }
}

fn absent_cells(column: &str) -> PipelineError {
    PipelineError::InvalidOperation(format!(
        "column '{}' still has absent values; impute before encoding",
        column
    ))
}

fn present_strings(name: &str, column: &Column) -> PipelineResult<Vec<String>> {
    match column {
        Column::Categorical(values) => values
            .iter()
            .map(|v| v.clone().ok_or_else(|| absent_cells(name)))
            .collect(),
        Column::Numeric(_) => Err(PipelineError::InvalidSchema(format!(
            "column '{}' is not categorical",
            name
        ))),
    }
}
