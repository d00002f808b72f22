use credit_approval_core::{PipelineError, PipelineResult};

use crate::schema::{ColumnKind, Schema};

/// Rectangular grid of raw text fields, exactly as read from the input file.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    rows: Vec<Vec<String>>,
    width: usize,
}

impl RawTable {
    pub fn new(rows: Vec<Vec<String>>) -> PipelineResult<Self> {
        let width = rows.first().map_or(0, Vec::len);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(PipelineError::InvalidOperation(format!(
                    "row {} has {} fields, expected {}",
                    i,
                    row.len(),
                    width
                )));
            }
        }
        Ok(RawTable { rows, width })
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Count cells whose trimmed text equals `token`.
    pub fn count_token(&self, token: &str) -> usize {
        self.rows
            .iter()
            .flatten()
            .filter(|cell| cell.trim() == token)
            .count()
    }
}

/// One typed column. `None` marks an absent value.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Numeric(Vec<Option<f64>>),
    Categorical(Vec<Option<String>>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(v) => v.len(),
            Column::Categorical(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            Column::Numeric(_) => ColumnKind::Numeric,
            Column::Categorical(_) => ColumnKind::Categorical,
        }
    }

    pub fn missing_count(&self) -> usize {
        match self {
            Column::Numeric(v) => v.iter().filter(|c| c.is_none()).count(),
            Column::Categorical(v) => v.iter().filter(|c| c.is_none()).count(),
        }
    }

    pub fn present_count(&self) -> usize {
        self.len() - self.missing_count()
    }

    /// Present numeric values in row order. Empty for categorical columns.
    pub fn present_numbers(&self) -> Vec<f64> {
        match self {
            Column::Numeric(v) => v.iter().flatten().copied().collect(),
            Column::Categorical(_) => Vec::new(),
        }
    }

    /// Render a cell for previews; absent cells show as `NaN`.
    pub fn display_cell(&self, row: usize) -> String {
        match self {
            Column::Numeric(v) => match v.get(row).copied().flatten() {
                Some(x) => format!("{}", x),
                None => "NaN".to_string(),
            },
            Column::Categorical(v) => match v.get(row).and_then(|c| c.as_deref()) {
                Some(s) => s.to_string(),
                None => "NaN".to_string(),
            },
        }
    }
}

/// Typed snapshot of the dataset between cleaning stages.
///
/// Stages never mutate a table; they build a new one with [`Table::with_column`].
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    schema: Schema,
    columns: Vec<Column>,
    n_rows: usize,
}

impl Table {
    pub fn new(schema: Schema, columns: Vec<Column>) -> PipelineResult<Self> {
        if columns.len() != schema.len() {
            return Err(PipelineError::InvalidSchema(format!(
                "schema declares {} columns, table has {}",
                schema.len(),
                columns.len()
            )));
        }
        let n_rows = columns.first().map_or(0, Column::len);
        for (spec, column) in schema.columns().iter().zip(&columns) {
            if column.kind() != spec.kind {
                return Err(PipelineError::InvalidSchema(format!(
                    "column '{}' is declared {:?} but holds {:?} values",
                    spec.name,
                    spec.kind,
                    column.kind()
                )));
            }
            if column.len() != n_rows {
                return Err(PipelineError::ShapeMismatch {
                    expected: vec![n_rows],
                    got: vec![column.len()],
                });
            }
        }
        Ok(Table {
            schema,
            columns,
            n_rows,
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, idx: usize) -> PipelineResult<&Column> {
        self.columns.get(idx).ok_or(PipelineError::IndexOutOfBounds {
            index: idx,
            axis: 1,
            size: self.columns.len(),
        })
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn missing_count(&self) -> usize {
        self.columns.iter().map(Column::missing_count).sum()
    }

    /// Absent-cell count per column, in schema order.
    pub fn missing_counts(&self) -> Vec<(String, usize)> {
        self.schema
            .columns()
            .iter()
            .zip(&self.columns)
            .map(|(spec, col)| (spec.name.clone(), col.missing_count()))
            .collect()
    }

    /// A new table identical to this one except for column `idx`.
    pub fn with_column(&self, idx: usize, column: Column) -> PipelineResult<Table> {
        let mut columns = self.columns.clone();
        if idx >= columns.len() {
            return Err(PipelineError::IndexOutOfBounds {
                index: idx,
                axis: 1,
                size: columns.len(),
            });
        }
        columns[idx] = column;
        Table::new(self.schema.clone(), columns)
    }

    pub fn display_row(&self, row: usize) -> Vec<String> {
        self.columns.iter().map(|c| c.display_cell(row)).collect()
    }
}

/// Fully numeric table: every column present, categorical columns replaced by their codes.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericTable {
    schema: Schema,
    columns: Vec<Vec<f64>>,
}

impl NumericTable {
    pub fn new(schema: Schema, columns: Vec<Vec<f64>>) -> PipelineResult<Self> {
        if columns.len() != schema.len() {
            return Err(PipelineError::InvalidSchema(format!(
                "schema declares {} columns, table has {}",
                schema.len(),
                columns.len()
            )));
        }
        let n_rows = columns.first().map_or(0, Vec::len);
        if let Some(bad) = columns.iter().find(|c| c.len() != n_rows) {
            return Err(PipelineError::ShapeMismatch {
                expected: vec![n_rows],
                got: vec![bad.len()],
            });
        }
        Ok(NumericTable { schema, columns })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn columns(&self) -> &[Vec<f64>] {
        &self.columns
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ColumnRole, ColumnSpec};

    fn tiny_schema() -> Schema {
        Schema::new(vec![
            ColumnSpec::numeric("n"),
            ColumnSpec::categorical("c").with_role(ColumnRole::Label),
        ])
        .unwrap()
    }

    #[test]
    fn test_raw_table_rejects_ragged_rows() {
        let rows = vec![vec!["a".to_string(), "b".to_string()], vec!["c".to_string()]];
        assert!(RawTable::new(rows).is_err());
    }

    #[test]
    fn test_raw_table_counts_token() {
        let rows = vec![
            vec!["?".to_string(), "1".to_string()],
            vec![" ?".to_string(), "?x".to_string()],
        ];
        let raw = RawTable::new(rows).unwrap();
        assert_eq!(raw.count_token("?"), 2);
        assert_eq!(raw.width(), 2);
    }

    #[test]
    fn test_table_checks_kinds() {
        let columns = vec![
            Column::Categorical(vec![Some("x".into())]),
            Column::Categorical(vec![Some("y".into())]),
        ];
        assert!(matches!(
            Table::new(tiny_schema(), columns),
            Err(PipelineError::InvalidSchema(_))
        ));
    }

    #[test]
    fn test_with_column_leaves_original_untouched() {
        let table = Table::new(
            tiny_schema(),
            vec![
                Column::Numeric(vec![Some(1.0), None]),
                Column::Categorical(vec![Some("+".into()), None]),
            ],
        )
        .unwrap();
        assert_eq!(table.missing_count(), 2);

        let filled = table
            .with_column(0, Column::Numeric(vec![Some(1.0), Some(1.0)]))
            .unwrap();
        assert_eq!(filled.missing_count(), 1);
        assert_eq!(table.missing_count(), 2);
        assert_eq!(
            filled.missing_counts(),
            vec![("n".to_string(), 0), ("c".to_string(), 1)]
        );
        assert_eq!(table.display_row(1), vec!["NaN".to_string(), "NaN".to_string()]);
    }
}
