use credit_approval_core::{PipelineError, PipelineResult};
use credit_approval_data::{Column, ColumnKind, Table};
use std::collections::HashMap;
use tracing::debug;

/// Mean of the present values, `None` when every cell is absent.
pub fn column_mean(values: &[Option<f64>]) -> Option<f64> {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        return None;
    }
    Some(present.iter().sum::<f64>() / present.len() as f64)
}

/// Most frequent present value, `None` when every cell is absent.
///
/// Equally frequent values are resolved in favour of the one that appears first in row order.
pub fn column_mode(values: &[Option<String>]) -> Option<String> {
    // value -> (count, first row)
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (row, v) in values.iter().enumerate() {
        if let Some(v) = v {
            counts.entry(v.as_str()).or_insert((0, row)).0 += 1;
        }
    }
    counts
        .into_iter()
        .max_by(|(_, (ca, fa)), (_, (cb, fb))| ca.cmp(cb).then(fb.cmp(fa)))
        .map(|(v, _)| v.to_string())
}

fn empty_column(table: &Table, idx: usize) -> PipelineError {
    let column = table
        .schema()
        .column(idx)
        .map(|c| c.name.clone())
        .unwrap_or_default();
    PipelineError::EmptyColumn { column }
}

/// Fill absent numeric cells with the column mean.
#[derive(Debug, Clone, Default)]
pub struct MeanImputer {
    /// `(column index, mean)` for every numeric column, set by `fit`.
    pub means: Option<Vec<(usize, f64)>>,
}

impl MeanImputer {
    pub fn new() -> Self {
        MeanImputer { means: None }
    }

    /// Compute the mean of every numeric column. Fails on a column with no present value.
    pub fn fit(&mut self, table: &Table) -> PipelineResult<()> {
        let mut means = Vec::new();
        for idx in table.schema().indices_of_kind(ColumnKind::Numeric) {
            let mean = match table.column(idx)? {
                Column::Numeric(values) => column_mean(values),
                Column::Categorical(_) => None,
            }
            .ok_or_else(|| empty_column(table, idx))?;
            debug!(column = idx, mean, "numeric column mean");
            means.push((idx, mean));
        }
        self.means = Some(means);
        Ok(())
    }

    pub fn transform(&self, table: &Table) -> PipelineResult<Table> {
        let means = self.means.as_ref().ok_or(PipelineError::NotFitted("MeanImputer"))?;
        let mut out = table.clone();
        for &(idx, mean) in means {
            if let Column::Numeric(values) = table.column(idx)? {
                let filled = values.iter().map(|v| Some(v.unwrap_or(mean))).collect();
                out = out.with_column(idx, Column::Numeric(filled))?;
            }
        }
        Ok(out)
    }

    pub fn fit_transform(&mut self, table: &Table) -> PipelineResult<Table> {
        self.fit(table)?;
        self.transform(table)
    }
}

/// Fill absent categorical cells with the column's most frequent value.
#[derive(Debug, Clone, Default)]
pub struct ModeImputer {
    /// `(column index, mode)` for every categorical column, set by `fit`.
    pub modes: Option<Vec<(usize, String)>>,
}

impl ModeImputer {
    pub fn new() -> Self {
        ModeImputer { modes: None }
    }

    pub fn fit(&mut self, table: &Table) -> PipelineResult<()> {
        let mut modes = Vec::new();
        for idx in table.schema().indices_of_kind(ColumnKind::Categorical) {
            let mode = match table.column(idx)? {
                Column::Categorical(values) => column_mode(values),
                Column::Numeric(_) => None,
            }
            .ok_or_else(|| empty_column(table, idx))?;
            debug!(column = idx, mode = %mode, "categorical column mode");
            modes.push((idx, mode));
        }
        self.modes = Some(modes);
        Ok(())
    }

    pub fn transform(&self, table: &Table) -> PipelineResult<Table> {
        let modes = self.modes.as_ref().ok_or(PipelineError::NotFitted("ModeImputer"))?;
        let mut out = table.clone();
        for (idx, mode) in modes {
            if let Column::Categorical(values) = table.column(*idx)? {
                let filled = values
                    .iter()
                    .map(|v| Some(v.clone().unwrap_or_else(|| mode.clone())))
                    .collect();
                out = out.with_column(*idx, Column::Categorical(filled))?;
            }
        }
        Ok(out)
    }

    pub fn fit_transform(&mut self, table: &Table) -> PipelineResult<Table> {
        self.fit(table)?;
        self.transform(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use credit_approval_data::{ColumnRole, ColumnSpec, Schema};

    fn opt_num(v: &[Option<f64>]) -> Column {
        Column::Numeric(v.to_vec())
    }

    fn opt_cat(v: &[Option<&str>]) -> Column {
        Column::Categorical(v.iter().map(|c| c.map(str::to_string)).collect())
    }

    fn table(columns: Vec<Column>) -> Table {
        let schema = Schema::new(vec![
            ColumnSpec::numeric("x"),
            ColumnSpec::categorical("c"),
            ColumnSpec::categorical("y").with_role(ColumnRole::Label),
        ])
        .unwrap();
        Table::new(schema, columns).unwrap()
    }

    #[test]
    fn test_column_mode_tie_prefers_first_seen() {
        let v: Vec<Option<String>> = ["b", "a", "a", "b", "c"]
            .iter()
            .map(|s| Some(s.to_string()))
            .collect();
        assert_eq!(column_mode(&v).as_deref(), Some("b"));
        assert_eq!(column_mode(&[None, None]), None);
    }

    #[test]
    fn test_mean_imputer_fills_with_mean_only() {
        let original = [Some(1.0), None, Some(3.0), Some(8.0), None];
        let t = table(vec![
            opt_num(&original),
            opt_cat(&[Some("a"); 5]),
            opt_cat(&[Some("+"); 5]),
        ]);
        let mut imp = MeanImputer::new();
        let out = imp.fit_transform(&t).unwrap();
        assert_eq!(out.missing_count(), 0);

        let mean = 4.0;
        let Column::Numeric(values) = out.column(0).unwrap() else {
            panic!("expected numeric column");
        };
        for (v, o) in values.iter().zip(original.iter()) {
            let v = v.unwrap();
            match o {
                Some(orig) => assert_eq!(v, *orig),
                None => assert_abs_diff_eq!(v, mean, epsilon = 1e-12),
            }
        }
        // categorical columns are untouched
        assert_eq!(out.column(1).unwrap(), t.column(1).unwrap());
    }

    #[test]
    fn test_mean_imputer_rejects_all_absent_column() {
        let t = table(vec![
            opt_num(&[None, None]),
            opt_cat(&[Some("a"), Some("b")]),
            opt_cat(&[Some("+"), Some("-")]),
        ]);
        let err = MeanImputer::new().fit(&t).unwrap_err();
        assert_eq!(err, PipelineError::EmptyColumn { column: "x".into() });
    }

    #[test]
    fn test_mode_imputer_preserves_categories() {
        let t = table(vec![
            opt_num(&[Some(1.0); 5]),
            opt_cat(&[Some("A"), Some("B"), None, Some("A"), Some("C")]),
            opt_cat(&[Some("+"), None, Some("-"), Some("-"), Some("+")]),
        ]);
        let mut imp = ModeImputer::new();
        let out = imp.fit_transform(&t).unwrap();
        assert_eq!(out.missing_count(), 0);
        assert_eq!(
            out.column(1).unwrap(),
            &opt_cat(&[Some("A"), Some("B"), Some("A"), Some("A"), Some("C")])
        );
        // "+" and "-" tie at two each; "+" appears first
        assert_eq!(
            out.column(2).unwrap(),
            &opt_cat(&[Some("+"), Some("+"), Some("-"), Some("-"), Some("+")])
        );
    }

    #[test]
    fn test_transform_before_fit() {
        let t = table(vec![
            opt_num(&[Some(1.0)]),
            opt_cat(&[Some("a")]),
            opt_cat(&[Some("+")]),
        ]);
        assert_eq!(
            ModeImputer::new().transform(&t).unwrap_err(),
            PipelineError::NotFitted("ModeImputer")
        );
    }
}
