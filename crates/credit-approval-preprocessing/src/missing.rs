use credit_approval_core::{PipelineError, PipelineResult};
use credit_approval_data::{Column, ColumnKind, RawTable, Schema, Table};
use tracing::debug;

/// Placeholder used by the credit-approval file for a missing field.
pub const DEFAULT_MISSING_TOKEN: &str = "?";

/// Type the raw fields per `schema`, turning every `token` cell into an absent value.
///
/// Fields are trimmed before comparison. A numeric field that is neither the token nor a
/// finite number (`NaN` and `inf` included) fails with [`PipelineError::ParseNumber`].
pub fn normalize_missing(raw: &RawTable, schema: &Schema, token: &str) -> PipelineResult<Table> {
    if raw.n_rows() > 0 && raw.width() != schema.len() {
        return Err(PipelineError::InvalidSchema(format!(
            "file has {} columns, schema declares {}",
            raw.width(),
            schema.len()
        )));
    }

    let mut columns = Vec::with_capacity(schema.len());
    for (j, spec) in schema.columns().iter().enumerate() {
        let cells = raw.rows().iter().map(|row| row[j].trim());
        let column = match spec.kind {
            ColumnKind::Numeric => {
                let mut values = Vec::with_capacity(raw.n_rows());
                for (i, cell) in cells.enumerate() {
                    if cell == token {
                        values.push(None);
                        continue;
                    }
                    match cell.parse::<f64>() {
                        Ok(v) if v.is_finite() => values.push(Some(v)),
                        _ => {
                            return Err(PipelineError::ParseNumber {
                                column: spec.name.clone(),
                                row: i,
                                value: cell.to_string(),
                            })
                        }
                    }
                }
                Column::Numeric(values)
            }
            ColumnKind::Categorical => Column::Categorical(
                cells
                    .map(|cell| (cell != token).then(|| cell.to_string()))
                    .collect(),
            ),
        };
        debug!(column = %spec.name, missing = column.missing_count(), "normalized column");
        columns.push(column);
    }

    Table::new(schema.clone(), columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use credit_approval_data::{ColumnRole, ColumnSpec};

    fn schema() -> Schema {
        Schema::new(vec![
            ColumnSpec::numeric("amount"),
            ColumnSpec::categorical("status").with_role(ColumnRole::Label),
        ])
        .unwrap()
    }

    fn raw(rows: &[[&str; 2]]) -> RawTable {
        RawTable::new(
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_token_becomes_absent() {
        let table = normalize_missing(&raw(&[["1.5", "+"], ["?", "-"], ["2", "?"]]), &schema(), "?")
            .unwrap();
        assert_eq!(table.n_rows(), 3);
        assert_eq!(
            table.column(0).unwrap(),
            &Column::Numeric(vec![Some(1.5), None, Some(2.0)])
        );
        assert_eq!(
            table.column(1).unwrap(),
            &Column::Categorical(vec![Some("+".into()), Some("-".into()), None])
        );
    }

    #[test]
    fn test_no_token_is_noop() {
        let table = normalize_missing(&raw(&[["1", "a"], ["2", "b"]]), &schema(), "?").unwrap();
        assert_eq!(table.missing_count(), 0);
    }

    #[test]
    fn test_malformed_number_is_reported() {
        let err = normalize_missing(&raw(&[["1", "a"], ["abc", "b"]]), &schema(), "?").unwrap_err();
        assert_eq!(
            err,
            PipelineError::ParseNumber {
                column: "amount".into(),
                row: 1,
                value: "abc".into(),
            }
        );
    }

    #[test]
    fn test_non_finite_number_is_reported() {
        for (row, cell) in [(1, "NaN"), (2, "inf"), (0, "-infinity")] {
            let mut rows = [["1", "a"], ["2", "b"], ["3", "c"]];
            rows[row][0] = cell;
            let err = normalize_missing(&raw(&rows), &schema(), "?").unwrap_err();
            assert_eq!(
                err,
                PipelineError::ParseNumber {
                    column: "amount".into(),
                    row,
                    value: cell.into(),
                }
            );
        }
    }

    #[test]
    fn test_width_must_match_schema() {
        let r = RawTable::new(vec![vec!["1".to_string()]]).unwrap();
        assert!(matches!(
            normalize_missing(&r, &schema(), "?"),
            Err(PipelineError::InvalidSchema(_))
        ));
    }
}
