//! Table/column selection models.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A chosen table plus the chosen subset of its columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectionCriterion {
    pub table_name: String,
    pub column_names: BTreeSet<String>,
}

/// The tables a user may pick from, each with its own column set.
///
/// Deserializes from a plain object: `{"users": ["id", "email"], ...}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionCatalog {
    tables: BTreeMap<String, BTreeSet<String>>,
}

impl SelectionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a table and its columns.
    pub fn with_table<I, S>(mut self, table: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tables
            .insert(table.into(), columns.into_iter().map(Into::into).collect());
        self
    }

    /// Table names in sorted order.
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn contains_table(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }

    /// Column names of `table`, or `None` when the table is unknown.
    pub fn columns(&self, table: &str) -> Option<&BTreeSet<String>> {
        self.tables.get(table)
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_from_json() {
        let catalog: SelectionCatalog =
            serde_json::from_str(r#"{"users": ["id", "email"], "orders": ["id", "total"]}"#)
                .unwrap();
        assert_eq!(catalog.table_names().collect::<Vec<_>>(), vec!["orders", "users"]);
        assert!(catalog.columns("users").unwrap().contains("email"));
        assert!(!catalog.columns("orders").unwrap().contains("email"));
        assert!(catalog.columns("missing").is_none());
    }

    #[test]
    fn test_criterion_is_camel_case() {
        let criterion = SelectionCriterion {
            table_name: "users".into(),
            column_names: ["id".to_string()].into_iter().collect(),
        };
        let json = serde_json::to_value(&criterion).unwrap();
        assert_eq!(json["tableName"], "users");
        assert_eq!(json["columnNames"][0], "id");
    }
}
