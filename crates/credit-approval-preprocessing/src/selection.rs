use credit_approval_core::{PipelineError, PipelineResult, Tensor};
use credit_approval_data::{ColumnRole, NumericTable, TensorDataset};
use tracing::debug;

/// Drop the columns marked [`ColumnRole::Drop`] and split the rest into a feature matrix
/// (feature columns in schema order) and the label vector.
pub fn select_features(table: &NumericTable) -> PipelineResult<TensorDataset> {
    let schema = table.schema();
    let feature_idx = schema.indices_of_role(ColumnRole::Feature);
    if feature_idx.is_empty() {
        return Err(PipelineError::InvalidSchema("no feature columns".into()));
    }

    let dropped: Vec<&str> = schema
        .indices_of_role(ColumnRole::Drop)
        .into_iter()
        .filter_map(|i| schema.column(i).map(|c| c.name.as_str()))
        .collect();
    debug!(?dropped, features = feature_idx.len(), "selecting features");

    let columns: Vec<Vec<f64>> = feature_idx
        .iter()
        .map(|&i| table.columns()[i].clone())
        .collect();
    let names: Vec<String> = feature_idx
        .iter()
        .filter_map(|&i| schema.column(i).map(|c| c.name.clone()))
        .collect();

    let label = schema
        .label_index()
        .ok_or_else(|| PipelineError::InvalidSchema("no label column".into()))?;
    let features = Tensor::from_columns(&columns)?;
    let labels = Tensor::from_slice(&table.columns()[label]);
    TensorDataset::new(features, labels, names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use credit_approval_data::{ColumnSpec, Schema};

    #[test]
    fn test_drops_and_splits() {
        let schema = Schema::new(vec![
            ColumnSpec::numeric("a"),
            ColumnSpec::numeric("zip").with_role(ColumnRole::Drop),
            ColumnSpec::categorical("b"),
            ColumnSpec::categorical("y").with_role(ColumnRole::Label),
        ])
        .unwrap();
        let table = NumericTable::new(
            schema,
            vec![
                vec![1.0, 2.0],
                vec![9.0, 9.0],
                vec![0.0, 1.0],
                vec![1.0, 0.0],
            ],
        )
        .unwrap();

        let ds = select_features(&table).unwrap();
        assert_eq!(ds.feature_names, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(ds.features.shape_vec(), vec![2, 2]);
        assert_eq!(ds.features.data(), &[1.0, 0.0, 2.0, 1.0]);
        assert_eq!(ds.labels.data(), &[1.0, 0.0]);
    }

    #[test]
    fn test_credit_schema_keeps_thirteen_features() {
        let schema = Schema::credit_approval();
        let columns = vec![vec![0.0, 1.0]; schema.len()];
        let table = NumericTable::new(schema, columns).unwrap();
        let ds = select_features(&table).unwrap();
        assert_eq!(ds.n_features(), 13);
        assert!(!ds.feature_names.contains(&"ZipCode".to_string()));
        assert!(!ds.feature_names.contains(&"CreditScore".to_string()));
        assert!(!ds.feature_names.contains(&"ApprovalStatus".to_string()));
    }
}
