//! Table/column selection form.
//!
//! Holds the user's current pick against a [`SelectionCatalog`] and hands the
//! result to a caller-supplied handler on submit. Nothing is persisted.

use std::collections::BTreeSet;
use std::path::Path;

use common::models::{SelectionCatalog, SelectionCriterion};

use crate::error::SelectionError;

/// Reads a catalog from a JSON file shaped `{"table": ["col", ...], ...}`.
pub fn load_catalog(path: impl AsRef<Path>) -> Result<SelectionCatalog, SelectionError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .map_err(|e| SelectionError::Catalog(format!("{}: {}", path.display(), e)))?;
    serde_json::from_str(&content)
        .map_err(|e| SelectionError::Catalog(format!("{}: {}", path.display(), e)))
}

#[derive(Debug, Clone)]
pub struct SelectionForm {
    catalog: SelectionCatalog,
    table: Option<String>,
    columns: BTreeSet<String>,
}

impl SelectionForm {
    pub fn new(catalog: SelectionCatalog) -> Self {
        Self {
            catalog,
            table: None,
            columns: BTreeSet::new(),
        }
    }

    /// Tables offered in the table picker.
    pub fn table_options(&self) -> Vec<&str> {
        self.catalog.table_names().collect()
    }

    /// Columns offered for the selected table; empty until a table is picked.
    pub fn column_options(&self) -> Vec<&str> {
        self.table
            .as_deref()
            .and_then(|table| self.catalog.columns(table))
            .map(|columns| columns.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn selected_table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    pub fn selected_columns(&self) -> &BTreeSet<String> {
        &self.columns
    }

    /// Picks a table. Switching to a different table clears the column pick.
    pub fn select_table(&mut self, table: &str) -> Result<(), SelectionError> {
        if !self.catalog.contains_table(table) {
            return Err(SelectionError::UnknownTable(table.to_string()));
        }
        if self.table.as_deref() != Some(table) {
            self.columns.clear();
            self.table = Some(table.to_string());
        }
        Ok(())
    }

    /// Replaces the column pick. Every column must belong to the selected
    /// table; on error the previous pick is kept.
    pub fn select_columns<I, S>(&mut self, columns: I) -> Result<(), SelectionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let table = self.table.as_deref().ok_or(SelectionError::NoTableSelected)?;
        let allowed = self
            .catalog
            .columns(table)
            .ok_or_else(|| SelectionError::UnknownTable(table.to_string()))?;

        let mut picked = BTreeSet::new();
        for column in columns {
            let column = column.into();
            if !allowed.contains(&column) {
                return Err(SelectionError::UnknownColumn {
                    table: table.to_string(),
                    column,
                });
            }
            picked.insert(column);
        }
        self.columns = picked;
        Ok(())
    }

    /// Clears the current pick.
    pub fn reset(&mut self) {
        self.table = None;
        self.columns.clear();
    }

    /// The criterion the form currently describes.
    pub fn criterion(&self) -> Result<SelectionCriterion, SelectionError> {
        let table = self.table.clone().ok_or(SelectionError::NoTableSelected)?;
        Ok(SelectionCriterion {
            table_name: table,
            column_names: self.columns.clone(),
        })
    }

    /// Emits the criterion to `handler` and returns what it returns.
    pub fn submit<F, R>(&self, handler: F) -> Result<R, SelectionError>
    where
        F: FnOnce(SelectionCriterion) -> R,
    {
        let criterion = self.criterion()?;
        tracing::debug!(
            table = %criterion.table_name,
            columns = criterion.column_names.len(),
            "提交表/列选择"
        );
        Ok(handler(criterion))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> SelectionCatalog {
        SelectionCatalog::new()
            .with_table("users", ["id", "email", "created_at"])
            .with_table("orders", ["id", "total"])
    }

    #[test]
    fn test_table_and_column_options() {
        let mut form = SelectionForm::new(catalog());
        assert_eq!(form.table_options(), vec!["orders", "users"]);
        assert!(form.column_options().is_empty());

        form.select_table("orders").unwrap();
        assert_eq!(form.column_options(), vec!["id", "total"]);
    }

    #[test]
    fn test_unknown_table_is_rejected() {
        let mut form = SelectionForm::new(catalog());
        assert_eq!(
            form.select_table("payments"),
            Err(SelectionError::UnknownTable("payments".into()))
        );
        assert!(form.selected_table().is_none());
    }

    #[test]
    fn test_columns_are_scoped_to_table() {
        let mut form = SelectionForm::new(catalog());
        form.select_table("orders").unwrap();
        form.select_columns(["total"]).unwrap();

        let err = form.select_columns(["id", "email"]).unwrap_err();
        assert_eq!(
            err,
            SelectionError::UnknownColumn {
                table: "orders".into(),
                column: "email".into()
            }
        );
        // previous pick survives a rejected update
        assert!(form.selected_columns().contains("total"));
    }

    #[test]
    fn test_switching_table_clears_columns() {
        let mut form = SelectionForm::new(catalog());
        form.select_table("users").unwrap();
        form.select_columns(["email"]).unwrap();

        form.select_table("users").unwrap();
        assert_eq!(form.selected_columns().len(), 1);

        form.select_table("orders").unwrap();
        assert!(form.selected_columns().is_empty());
    }

    #[test]
    fn test_submit_emits_criterion() {
        let mut form = SelectionForm::new(catalog());
        assert_eq!(
            form.submit(|_| ()).unwrap_err(),
            SelectionError::NoTableSelected
        );

        form.select_table("users").unwrap();
        form.select_columns(["email", "id", "email"]).unwrap();

        let mut received = None;
        form.submit(|criterion| received = Some(criterion)).unwrap();
        let criterion = received.unwrap();
        assert_eq!(criterion.table_name, "users");
        assert_eq!(
            criterion.column_names.into_iter().collect::<Vec<_>>(),
            vec!["email", "id"]
        );
    }

    #[test]
    fn test_submit_with_no_columns() {
        let mut form = SelectionForm::new(catalog());
        form.select_table("orders").unwrap();
        let criterion = form.submit(|c| c).unwrap();
        assert!(criterion.column_names.is_empty());
    }

    #[test]
    fn test_load_catalog_missing_file() {
        let err = load_catalog("/nonexistent/catalog.json").unwrap_err();
        assert!(matches!(err, SelectionError::Catalog(_)));
    }
}
