use credit_approval_core::{PipelineError, PipelineResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// How the values of a column are typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

/// What a column is used for once the table is clean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    Feature,
    Drop,
    Label,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub kind: ColumnKind,
    pub role: ColumnRole,
}

impl ColumnSpec {
    pub fn new(name: &str, kind: ColumnKind, role: ColumnRole) -> Self {
        ColumnSpec {
            name: name.to_string(),
            kind,
            role,
        }
    }

    pub fn numeric(name: &str) -> Self {
        Self::new(name, ColumnKind::Numeric, ColumnRole::Feature)
    }

    pub fn categorical(name: &str) -> Self {
        Self::new(name, ColumnKind::Categorical, ColumnRole::Feature)
    }

    pub fn with_role(mut self, role: ColumnRole) -> Self {
        self.role = role;
        self
    }
}

/// Ordered, named description of every column of the input file.
///
/// Columns are matched to file fields by position; every other stage refers to them
/// by kind and role instead of magic indices. A valid schema has unique names and
/// exactly one label column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ColumnSpec>", into = "Vec<ColumnSpec>")]
pub struct Schema {
    columns: Vec<ColumnSpec>,
}

impl Schema {
    pub fn new(columns: Vec<ColumnSpec>) -> PipelineResult<Self> {
        if columns.is_empty() {
            return Err(PipelineError::InvalidSchema("schema has no columns".into()));
        }
        let mut seen = HashSet::new();
        for c in &columns {
            if !seen.insert(c.name.as_str()) {
                return Err(PipelineError::InvalidSchema(format!(
                    "duplicate column name '{}'",
                    c.name
                )));
            }
        }
        let labels = columns.iter().filter(|c| c.role == ColumnRole::Label).count();
        if labels != 1 {
            return Err(PipelineError::InvalidSchema(format!(
                "expected exactly one label column, found {}",
                labels
            )));
        }
        Ok(Schema { columns })
    }

    /// The UCI credit-approval layout: 16 anonymised columns, numeric at positions
    /// 2, 7, 10 and 14, `CreditScore` and `ZipCode` dropped, `ApprovalStatus` as label.
    pub fn credit_approval() -> Self {
        let columns = vec![
            ColumnSpec::categorical("Gender"),
            ColumnSpec::categorical("Age"),
            ColumnSpec::numeric("Debt"),
            ColumnSpec::categorical("Married"),
            ColumnSpec::categorical("BankCustomer"),
            ColumnSpec::categorical("EducationLevel"),
            ColumnSpec::categorical("Ethnicity"),
            ColumnSpec::numeric("YearsEmployed"),
            ColumnSpec::categorical("PriorDefault"),
            ColumnSpec::categorical("Employed"),
            ColumnSpec::numeric("CreditScore").with_role(ColumnRole::Drop),
            ColumnSpec::categorical("DriversLicense"),
            ColumnSpec::categorical("Citizen"),
            ColumnSpec::categorical("ZipCode").with_role(ColumnRole::Drop),
            ColumnSpec::numeric("Income"),
            ColumnSpec::categorical("ApprovalStatus").with_role(ColumnRole::Label),
        ];
        Schema { columns }
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column(&self, idx: usize) -> Option<&ColumnSpec> {
        self.columns.get(idx)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn indices_of_kind(&self, kind: ColumnKind) -> Vec<usize> {
        self.indices_where(|c| c.kind == kind)
    }

    pub fn indices_of_role(&self, role: ColumnRole) -> Vec<usize> {
        self.indices_where(|c| c.role == role)
    }

    pub fn label_index(&self) -> Option<usize> {
        self.columns.iter().position(|c| c.role == ColumnRole::Label)
    }

    fn indices_where<F: Fn(&ColumnSpec) -> bool>(&self, pred: F) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, c)| pred(c))
            .map(|(i, _)| i)
            .collect()
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::credit_approval()
    }
}

impl TryFrom<Vec<ColumnSpec>> for Schema {
    type Error = PipelineError;

    fn try_from(columns: Vec<ColumnSpec>) -> PipelineResult<Self> {
        Schema::new(columns)
    }
}

impl From<Schema> for Vec<ColumnSpec> {
    fn from(schema: Schema) -> Self {
        schema.columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credit_approval_layout() {
        let s = Schema::credit_approval();
        assert_eq!(s.len(), 16);
        assert_eq!(s.indices_of_kind(ColumnKind::Numeric), vec![2, 7, 10, 14]);
        assert_eq!(s.indices_of_role(ColumnRole::Drop), vec![10, 13]);
        assert_eq!(s.indices_of_role(ColumnRole::Feature).len(), 13);
        assert_eq!(s.label_index(), Some(15));
        assert_eq!(s.position("Income"), Some(14));
        assert!(Schema::new(s.columns().to_vec()).is_ok());
    }

    #[test]
    fn test_default_schema_passes_validation() {
        let s = Schema::default();
        assert_eq!(Schema::new(s.columns().to_vec()).unwrap(), s);
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(serde_json::from_str::<Schema>(&json).unwrap(), s);
    }

    #[test]
    fn test_rejects_missing_label() {
        let r = Schema::new(vec![ColumnSpec::numeric("a"), ColumnSpec::categorical("b")]);
        assert!(matches!(r, Err(PipelineError::InvalidSchema(_))));
    }

    #[test]
    fn test_rejects_duplicate_names() {
        let r = Schema::new(vec![
            ColumnSpec::numeric("a"),
            ColumnSpec::categorical("a").with_role(ColumnRole::Label),
        ]);
        assert!(matches!(r, Err(PipelineError::InvalidSchema(_))));
    }

    #[test]
    fn test_json_validation() {
        let json = r#"[
            {"name": "x", "kind": "numeric", "role": "feature"},
            {"name": "y", "kind": "categorical", "role": "label"}
        ]"#;
        let s: Schema = serde_json::from_str(json).unwrap();
        assert_eq!(s.label_index(), Some(1));

        let no_label = r#"[{"name": "x", "kind": "numeric", "role": "feature"}]"#;
        assert!(serde_json::from_str::<Schema>(no_label).is_err());
    }
}
