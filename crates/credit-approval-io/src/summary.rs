//! Text summaries of a [`Table`]: head/tail preview, describe-style statistics and column info.

use credit_approval_data::{Column, ColumnKind, Table};
use std::fmt;

/// Statistics of one numeric column over its present values.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericSummary {
    pub name: String,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator).
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub q50: f64,
    pub q75: f64,
    pub max: f64,
}

/// Linearly interpolated quantile of sorted values.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

impl NumericSummary {
    pub fn from_values(name: &str, values: &[f64]) -> Self {
        let count = values.len();
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let mean = if count == 0 {
            f64::NAN
        } else {
            values.iter().sum::<f64>() / count as f64
        };
        let std = if count < 2 {
            f64::NAN
        } else {
            (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64).sqrt()
        };

        NumericSummary {
            name: name.to_string(),
            count,
            mean,
            std,
            min: sorted.first().copied().unwrap_or(f64::NAN),
            q25: quantile(&sorted, 0.25),
            q50: quantile(&sorted, 0.5),
            q75: quantile(&sorted, 0.75),
            max: sorted.last().copied().unwrap_or(f64::NAN),
        }
    }
}

/// Summaries of every numeric column, in schema order.
pub fn describe(table: &Table) -> Vec<NumericSummary> {
    table
        .schema()
        .columns()
        .iter()
        .zip(table.columns())
        .filter(|(_, col)| matches!(col, Column::Numeric(_)))
        .map(|(spec, col)| NumericSummary::from_values(&spec.name, &col.present_numbers()))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub kind: ColumnKind,
    pub non_null: usize,
}

pub fn column_info(table: &Table) -> Vec<ColumnInfo> {
    table
        .schema()
        .columns()
        .iter()
        .zip(table.columns())
        .map(|(spec, col)| ColumnInfo {
            name: spec.name.clone(),
            kind: spec.kind,
            non_null: col.present_count(),
        })
        .collect()
}

fn write_grid(f: &mut fmt::Formatter<'_>, header: &[String], rows: &[Vec<String>]) -> fmt::Result {
    let widths: Vec<usize> = (0..header.len())
        .map(|j| {
            rows.iter()
                .map(|r| r[j].len())
                .chain(std::iter::once(header[j].len()))
                .max()
                .unwrap_or(0)
        })
        .collect();
    let line = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:>w$}", c, w = w))
            .collect::<Vec<_>>()
            .join("  ")
    };
    writeln!(f, "{}", line(header))?;
    for row in rows {
        writeln!(f, "{}", line(row))?;
    }
    Ok(())
}

/// First and last `n` rows of a table, each prefixed by its row number.
pub struct Preview<'a> {
    pub table: &'a Table,
    pub n: usize,
}

impl<'a> Preview<'a> {
    pub fn new(table: &'a Table, n: usize) -> Self {
        Preview { table, n }
    }

    fn section(&self, f: &mut fmt::Formatter<'_>, rows: std::ops::Range<usize>) -> fmt::Result {
        let mut header = vec![String::new()];
        header.extend(self.table.schema().columns().iter().map(|c| c.name.clone()));
        let body: Vec<Vec<String>> = rows
            .map(|i| {
                let mut cells = vec![i.to_string()];
                cells.extend(self.table.display_row(i));
                cells
            })
            .collect();
        write_grid(f, &header, &body)
    }
}

impl fmt::Display for Preview<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n_rows = self.table.n_rows();
        let head = self.n.min(n_rows);
        self.section(f, 0..head)?;
        writeln!(f)?;
        self.section(f, n_rows - self.n.min(n_rows)..n_rows)?;
        writeln!(f, "[{} rows x {} columns]", n_rows, self.table.n_cols())
    }
}

/// Describe-style table: one column per numeric feature, one row per statistic.
pub struct Describe(pub Vec<NumericSummary>);

impl fmt::Display for Describe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut header = vec![String::new()];
        header.extend(self.0.iter().map(|s| s.name.clone()));

        let stats: [(&str, fn(&NumericSummary) -> f64); 8] = [
            ("count", |s| s.count as f64),
            ("mean", |s| s.mean),
            ("std", |s| s.std),
            ("min", |s| s.min),
            ("25%", |s| s.q25),
            ("50%", |s| s.q50),
            ("75%", |s| s.q75),
            ("max", |s| s.max),
        ];
        let rows: Vec<Vec<String>> = stats
            .iter()
            .map(|(label, get)| {
                let mut row = vec![label.to_string()];
                row.extend(self.0.iter().map(|s| format!("{:.6}", get(s))));
                row
            })
            .collect();
        write_grid(f, &header, &rows)
    }
}

/// Column name, kind and non-null count, one line per column.
pub struct Info<'a> {
    pub table: &'a Table,
}

impl fmt::Display for Info<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} entries, {} columns", self.table.n_rows(), self.table.n_cols())?;
        let header = vec![
            "#".to_string(),
            "Column".to_string(),
            "Non-Null Count".to_string(),
            "Kind".to_string(),
        ];
        let rows: Vec<Vec<String>> = column_info(self.table)
            .into_iter()
            .enumerate()
            .map(|(i, c)| {
                let kind = match c.kind {
                    ColumnKind::Numeric => "numeric",
                    ColumnKind::Categorical => "categorical",
                };
                vec![
                    i.to_string(),
                    c.name,
                    format!("{} non-null", c.non_null),
                    kind.to_string(),
                ]
            })
            .collect();
        write_grid(f, &header, &rows)
    }
}
