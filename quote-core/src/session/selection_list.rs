use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::SessionError;
use crate::LineSelection;

/// Ordered list of selected lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionList {
    lines: Vec<LineSelection>,
}

impl SelectionList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a selection. Selections without a SKU are ignored.
    ///
    /// Returns whether the selection was added.
    pub fn add(
        &mut self,
        selection: LineSelection,
    ) -> bool {
        if selection.sku.trim().is_empty() {
            return false;
        }
        self.lines.push(selection);
        true
    }

    /// Removes the selection at `index`, closing the gap.
    ///
    /// # Errors
    ///
    /// [`SessionError::IndexOutOfRange`] if there is no such position; the
    /// list is left unchanged.
    pub fn remove_at(
        &mut self,
        index: usize,
    ) -> Result<LineSelection, SessionError> {
        if index >= self.lines.len() {
            return Err(SessionError::IndexOutOfRange {
                index,
                len: self.lines.len(),
            });
        }
        Ok(self.lines.remove(index))
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Drops every selection whose SKU is not in `valid_skus` and returns how
    /// many were dropped.
    pub fn reconcile(
        &mut self,
        valid_skus: &HashSet<String>,
    ) -> usize {
        let before = self.lines.len();
        self.lines.retain(|line| valid_skus.contains(&line.sku));
        before - self.lines.len()
    }

    pub fn as_slice(&self) -> &[LineSelection] {
        &self.lines
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LineSelection> {
        self.lines.iter()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl From<Vec<LineSelection>> for SelectionList {
    fn from(lines: Vec<LineSelection>) -> Self {
        let mut list = Self::new();
        for line in lines {
            list.add(line);
        }
        list
    }
}

impl<'a> IntoIterator for &'a SelectionList {
    type Item = &'a LineSelection;
    type IntoIter = std::slice::Iter<'a, LineSelection>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::Supplier;

    fn line(sku: &str) -> LineSelection {
        LineSelection::new(sku, Supplier::Alpha, dec!(1))
    }

    fn skus(list: &SelectionList) -> Vec<&str> {
        list.iter().map(|l| l.sku.as_str()).collect()
    }

    #[test]
    fn add_appends_in_order() {
        let mut list = SelectionList::new();

        assert!(list.add(line("X1")));
        assert!(list.add(line("X2")));

        assert_eq!(skus(&list), vec!["X1", "X2"]);
    }

    #[test]
    fn add_ignores_blank_sku() {
        let mut list = SelectionList::new();

        assert!(!list.add(line("")));
        assert!(!list.add(line("   ")));

        assert!(list.is_empty());
    }

    #[test]
    fn duplicate_lines_are_kept() {
        let mut list = SelectionList::new();
        list.add(line("X1"));
        list.add(line("X1"));

        assert_eq!(list.len(), 2);
    }

    #[test]
    fn remove_at_closes_the_gap() {
        let mut list = SelectionList::from(vec![line("X1"), line("X2"), line("X3")]);

        let removed = list.remove_at(1).expect("index 1 exists");

        assert_eq!(removed.sku, "X2");
        assert_eq!(skus(&list), vec!["X1", "X3"]);
    }

    #[test]
    fn remove_at_out_of_range_leaves_list_untouched() {
        let mut list = SelectionList::from(vec![line("X1"), line("X2")]);

        let result = list.remove_at(2);

        assert_eq!(result, Err(SessionError::IndexOutOfRange { index: 2, len: 2 }));
        assert_eq!(skus(&list), vec!["X1", "X2"]);
    }

    #[test]
    fn clear_on_empty_list_is_a_no_op() {
        let mut list = SelectionList::new();

        list.clear();
        list.clear();

        assert!(list.is_empty());
    }

    #[test]
    fn reconcile_removes_missing_skus_and_keeps_order() {
        let mut list = SelectionList::from(vec![line("X1"), line("X2"), line("X3")]);
        let valid: HashSet<String> = ["X1", "X3"].iter().map(|s| s.to_string()).collect();

        let removed = list.reconcile(&valid);

        assert_eq!(removed, 1);
        assert_eq!(skus(&list), vec!["X1", "X3"]);
    }

    #[test]
    fn reconcile_with_everything_valid_removes_nothing() {
        let mut list = SelectionList::from(vec![line("X1"), line("X2")]);
        let valid: HashSet<String> = ["X1", "X2", "X9"].iter().map(|s| s.to_string()).collect();

        assert_eq!(list.reconcile(&valid), 0);
        assert_eq!(list.len(), 2);
    }
}
