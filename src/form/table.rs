//! A filterable table of form records.

use crate::log::{debug, warn};
use crate::tree::{NodeId, ObservableList, TreeArena};

use super::{FormProperty, FormRecord};

/// Column derived from a record field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormColumn {
    pub key: String,
    /// Field label, or the key when the field has none.
    pub label: String,
    pub validator: Option<String>,
}

/// Records shown as a tree of rows, with columns taken from the first record.
pub struct FormTable {
    records: ObservableList<FormRecord>,
    columns: Vec<FormColumn>,
    tree: TreeArena<FormRecord>,
    filter: Option<String>,
}

impl Default for FormTable {
    fn default() -> Self {
        Self::new()
    }
}

impl FormTable {
    pub fn new() -> Self {
        let records = ObservableList::new();
        let tree = TreeArena::from_list(records.clone(), FormRecord::children);
        Self {
            records,
            columns: Vec::new(),
            tree,
            filter: None,
        }
    }

    pub fn with_records(records: impl IntoIterator<Item = FormRecord>) -> Self {
        let mut table = Self::new();
        table.add_records(records);
        table
    }

    /// Append records. Columns are derived once, from the first record.
    pub fn add_records(&mut self, records: impl IntoIterator<Item = FormRecord>) {
        self.records.extend(records);
        if self.columns.is_empty() {
            if let Some(first) = self.records.get(0) {
                self.columns = columns_of(&first);
                debug!(columns = self.columns.len(), "form table columns derived");
            }
        }
        self.sync();
    }

    pub fn records(&self) -> &ObservableList<FormRecord> {
        &self.records
    }

    pub fn columns(&self) -> &[FormColumn] {
        &self.columns
    }

    pub fn tree(&self) -> &TreeArena<FormRecord> {
        &self.tree
    }

    /// Apply pending record list changes to the rows.
    pub fn sync(&mut self) -> usize {
        self.tree.sync()
    }

    /// Visible rows in display order.
    pub fn rows(&self) -> Vec<NodeId> {
        self.tree.visible_descendants(self.tree.root())
    }

    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    /// Show only rows with a visible field containing `text`, ignoring case.
    /// An empty filter shows everything.
    pub fn set_filter(&mut self, text: &str) {
        let root = self.tree.root();
        let needle = text.trim().to_lowercase();
        if needle.is_empty() {
            self.filter = None;
            self.tree.set_predicate(root, None);
            return;
        }
        self.filter = Some(needle.clone());
        self.tree.set_filter(root, move |record: &FormRecord| {
            record
                .keys()
                .iter()
                .filter_map(|k| record.peek(k))
                .any(|v| v.to_lowercase().contains(&needle))
        });
    }

    pub fn cell_value(&self, row: NodeId, column: usize) -> Option<String> {
        let record = self.tree.value(row)?;
        let column = self.columns.get(column)?;
        Some(record.value(&column.key))
    }

    /// Write an edited cell back to its record and re-apply the filter.
    pub fn commit_edit(&mut self, row: NodeId, column: usize, value: &str) -> bool {
        let (Some(record), Some(column)) = (self.tree.value(row), self.columns.get(column)) else {
            warn!(?row, column, "edit on a missing cell dropped");
            return false;
        };
        record.set_value(&column.key, value);
        debug!(?row, key = %column.key, "cell edit committed");
        let root = self.tree.root();
        self.tree.refilter(root);
        true
    }
}

fn columns_of(record: &FormRecord) -> Vec<FormColumn> {
    record
        .keys()
        .into_iter()
        .map(|key| FormColumn {
            label: record.label(&key).unwrap_or_else(|| key.clone()),
            validator: record.validator_regex(&key),
            key,
        })
        .collect()
}
