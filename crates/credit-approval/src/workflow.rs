use credit_approval_data::{RawTable, Table};
use credit_approval_io::{describe, read_raw_table, Describe, Info, IoResult, Preview};
use credit_approval_linear::LogisticRegression;
use credit_approval_metrics::{accuracy, confusion_matrix, ClassificationReport};
use credit_approval_pipeline::{GridSearchCV, LogisticParams, StratifiedKFold};
use credit_approval_preprocessing::{
    normalize_missing, select_features, train_test_split, ColumnEncoder, MeanImputer,
    MinMaxScaler, ModeImputer,
};
use std::path::Path;
use tracing::info;

use crate::config::PipelineConfig;
use crate::report::{Report, StageMissing};

fn stage(name: &str, table: &Table) -> StageMissing {
    let missing = StageMissing {
        stage: name.to_string(),
        counts: table.missing_counts(),
    };
    info!(stage = name, missing = missing.total(), "missing values");
    missing
}

/// Read the file at `path` with the configured delimiter and [`run`] it.
pub fn run_file<P: AsRef<Path>>(config: &PipelineConfig, path: P) -> IoResult<Report> {
    let raw = read_raw_table(path, config.delimiter_byte()?)?;
    run(config, &raw)
}

/// Run the whole pipeline on an already loaded table.
///
/// Each stage takes the previous snapshot and builds a new one; nothing fitted here
/// outlives the call.
pub fn run(config: &PipelineConfig, raw: &RawTable) -> IoResult<Report> {
    let token = config.missing_token.as_str();
    let missing_tokens = raw.count_token(token);
    info!(rows = raw.n_rows(), columns = raw.width(), missing_tokens, "starting run");

    let table = normalize_missing(raw, &config.schema, token)?;
    let preview = Preview::new(&table, config.preview_rows).to_string();
    let summary = Describe(describe(&table)).to_string();
    let column_info = Info { table: &table }.to_string();

    let mut missing_by_stage = vec![stage("after normalizing missing values", &table)];

    let table = MeanImputer::new().fit_transform(&table)?;
    missing_by_stage.push(stage("after mean imputation", &table));

    let table = ModeImputer::new().fit_transform(&table)?;
    missing_by_stage.push(stage("after mode imputation", &table));

    let mut encoder = ColumnEncoder::new();
    let encoded = encoder.fit_transform(&table)?;
    let class_names = config
        .schema
        .label_index()
        .and_then(|i| encoder.encoder(i))
        .map(|e| e.classes.clone())
        .unwrap_or_default();

    let dataset = select_features(&encoded)?;
    info!(
        rows = dataset.len(),
        features = dataset.n_features(),
        "selected features"
    );

    let mut scaler = MinMaxScaler::new().with_feature_names(&dataset.feature_names);
    let scaled = dataset.with_features(scaler.fit_transform(&dataset.features)?)?;

    let (train, test) = train_test_split(&scaled, config.test_ratio, Some(config.seed))?;
    info!(train = train.len(), test = test.len(), "split data");

    let mut model = LogisticRegression::new(config.c, config.tol, config.max_iter)
        .with_solver(config.solver)
        .with_learning_rate(config.learning_rate);
    model.fit(&train.features, &train.labels)?;
    let y_pred = model.predict(&test.features)?;
    let test_accuracy = accuracy(&test.labels, &y_pred)?;
    let confusion = confusion_matrix(&test.labels, &y_pred, class_names.len().max(2))?;
    let per_class = (0..confusion.n_classes())
        .map(|class| ClassificationReport::from_confusion(confusion.clone(), class))
        .collect::<Result<Vec<_>, _>>()?;
    info!(
        accuracy = test_accuracy,
        solver = ?config.solver,
        n_iter = model.n_iter,
        "evaluated classifier"
    );

    let grid = config.param_grid();
    let cv = StratifiedKFold::new(config.cv_folds).with_shuffle(config.seed);
    let (c, solver, learning_rate) = (config.c, config.solver, config.learning_rate);
    let search = GridSearchCV::new(grid.candidates(), cv).fit(&scaled, |p: &LogisticParams| {
        LogisticRegression::new(c, p.tol, p.max_iter)
            .with_solver(solver)
            .with_learning_rate(learning_rate)
    })?;

    Ok(Report {
        n_rows: table.n_rows(),
        n_cols: table.n_cols(),
        missing_token: config.missing_token.clone(),
        missing_tokens,
        preview,
        describe: summary,
        info: column_info,
        missing_by_stage,
        feature_names: scaled.feature_names.clone(),
        class_names,
        n_train: train.len(),
        n_test: test.len(),
        converged: model.converged,
        n_iter: model.n_iter,
        test_accuracy,
        confusion,
        per_class,
        grid,
        search,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use credit_approval_core::PipelineError;
    use credit_approval_data::{ColumnRole, ColumnSpec, Schema};
    use credit_approval_io::IoError;
    use credit_approval_linear::Solver;

    fn small_config() -> PipelineConfig {
        let schema = Schema::new(vec![
            ColumnSpec::numeric("x1"),
            ColumnSpec::numeric("x2"),
            ColumnSpec::categorical("y").with_role(ColumnRole::Label),
        ])
        .unwrap();
        PipelineConfig {
            schema,
            cv_folds: 2,
            ..PipelineConfig::default()
        }
    }

    fn small_rows() -> Vec<Vec<String>> {
        (0..10)
            .map(|i| {
                let label = if i % 2 == 0 { "+" } else { "-" };
                vec![
                    (i + 1).to_string(),
                    ((i * 7) % 10).to_string(),
                    label.to_string(),
                ]
            })
            .collect()
    }

    #[test]
    fn test_wrong_width_is_rejected() {
        let raw = RawTable::new(vec![vec!["1".to_string(), "+".to_string()]]).unwrap();
        let err = run(&PipelineConfig::default(), &raw).unwrap_err();
        assert!(matches!(
            err,
            IoError::Pipeline(PipelineError::InvalidSchema(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = run_file(&PipelineConfig::default(), "/nonexistent/crx.data").unwrap_err();
        assert!(matches!(err, IoError::Io(_)));
    }

    #[test]
    fn test_non_finite_cells_abort_the_run() {
        for (row, col, cell) in [(4, 0, "NaN"), (5, 1, "inf")] {
            let mut rows = small_rows();
            rows[row][col] = cell.to_string();
            let err = run(&small_config(), &RawTable::new(rows).unwrap()).unwrap_err();
            match err {
                IoError::Pipeline(PipelineError::ParseNumber { row: r, value, .. }) => {
                    assert_eq!(r, row);
                    assert_eq!(value, cell);
                }
                other => panic!("unexpected error {:?}", other),
            }
        }
    }

    #[test]
    fn test_gradient_descent_solver_is_used() {
        let raw = RawTable::new(small_rows()).unwrap();
        let config = PipelineConfig {
            solver: Solver::GradientDescent,
            learning_rate: 0.5,
            max_iter: 7,
            tol: 0.0,
            ..small_config()
        };
        let report = run(&config, &raw).unwrap();
        // tol = 0 never converges, so n_iter is the configured cap.
        assert_eq!(report.n_iter, 7);
        assert!(!report.converged);
        assert_eq!(report.search.cv_results.len(), 9);

        // Only gradient descent validates the step size.
        let bad = PipelineConfig {
            learning_rate: -1.0,
            ..config
        };
        assert!(matches!(
            run(&bad, &raw),
            Err(IoError::Pipeline(PipelineError::InvalidParameter(_)))
        ));
    }
}
