use credit_approval_metrics::{ClassificationReport, ConfusionMatrix};
use credit_approval_pipeline::{GridSearchResult, LogisticParams, ParameterGrid};
use std::fmt;

/// Absent-cell counts per column after one cleaning stage.
#[derive(Debug, Clone, PartialEq)]
pub struct StageMissing {
    pub stage: String,
    pub counts: Vec<(String, usize)>,
}

impl StageMissing {
    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, n)| n).sum()
    }
}

/// Titled block of report text.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub title: String,
    pub body: String,
}

/// Everything a run produces.
#[derive(Debug, Clone)]
pub struct Report {
    pub n_rows: usize,
    pub n_cols: usize,
    pub missing_token: String,
    /// Cells equal to `missing_token` in the raw file.
    pub missing_tokens: usize,
    pub preview: String,
    pub describe: String,
    pub info: String,
    pub missing_by_stage: Vec<StageMissing>,
    pub feature_names: Vec<String>,
    /// Label text per class code.
    pub class_names: Vec<String>,
    pub n_train: usize,
    pub n_test: usize,
    pub converged: bool,
    pub n_iter: usize,
    pub test_accuracy: f64,
    pub confusion: ConfusionMatrix,
    /// One per class, in code order.
    pub per_class: Vec<ClassificationReport>,
    pub grid: ParameterGrid,
    pub search: GridSearchResult<LogisticParams>,
}

impl Report {
    pub fn best_params(&self) -> LogisticParams {
        self.search.best_params
    }

    pub fn best_score(&self) -> f64 {
        self.search.best_score
    }

    pub fn sections(&self) -> Vec<Section> {
        let mut sections = vec![
            Section {
                title: "Data preview".into(),
                body: self.preview.clone(),
            },
            Section {
                title: "Summary statistics".into(),
                body: self.describe.clone(),
            },
            Section {
                title: "Column info".into(),
                body: self.info.clone(),
            },
        ];

        let mut missing = format!(
            "'{}' cells in the raw file: {}\n",
            self.missing_token, self.missing_tokens
        );
        for stage in &self.missing_by_stage {
            missing.push_str(&format!("\n{} ({} total)\n", stage.stage, stage.total()));
            let width = stage.counts.iter().map(|(n, _)| n.len()).max().unwrap_or(0);
            for (name, count) in &stage.counts {
                missing.push_str(&format!("  {:<w$}  {}\n", name, count, w = width));
            }
        }
        sections.push(Section {
            title: "Missing values".into(),
            body: missing,
        });

        let mut model = format!(
            "features: {}\ntrain rows: {}, test rows: {}\n",
            self.feature_names.join(", "),
            self.n_train,
            self.n_test
        );
        model.push_str(&format!(
            "solver {} after {} iterations\n",
            if self.converged { "converged" } else { "stopped" },
            self.n_iter
        ));
        model.push_str(&format!(
            "Accuracy of logistic regression classifier: {}\n",
            self.test_accuracy
        ));
        model.push_str(&format!("confusion matrix (classes {:?}):\n{}", self.class_names, self.confusion));
        for r in &self.per_class {
            let name = self.class_names.get(r.class).map_or("?", String::as_str);
            model.push_str(&format!(
                "class {:>3}: precision {:.4}  recall {:.4}  f1 {:.4}\n",
                name, r.precision, r.recall, r.f1
            ));
        }
        sections.push(Section {
            title: "Logistic regression".into(),
            body: model,
        });

        let mut search = format!("param grid: {}\n", self.grid);
        for r in &self.search.cv_results {
            search.push_str(&format!(
                "  {}  mean {:.6}  std {:.6}\n",
                r.params, r.cv.mean_score, r.cv.std_score
            ));
        }
        search.push_str(&format!(
            "Best: {} using {}\n",
            self.best_score(),
            self.best_params()
        ));
        sections.push(Section {
            title: "Grid search".into(),
            body: search,
        });

        sections
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for section in self.sections() {
            writeln!(f, "== {} ==", section.title)?;
            writeln!(f, "{}", section.body)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_total() {
        let stage = StageMissing {
            stage: "after normalizing".into(),
            counts: vec![("a".into(), 2), ("b".into(), 3)],
        };
        assert_eq!(stage.total(), 5);
    }
}
