use std::fmt;

use thiserror::Error;
use tracing::{debug, warn};

use super::SelectionList;
use crate::calculations::PricingEngine;
use crate::{CatalogFilter, CatalogPair, LineSelection, PricedQuote, PricingConfig};

/// Errors returned when an action cannot be applied to a session.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// `index` is 0-based; `len` is the list length at the time.
    #[error("no selection at position {index} (list has {len} entries)")]
    IndexOutOfRange { index: usize, len: usize },
}

/// User actions that change the selection list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    Add(LineSelection),
    /// 0-based position to remove.
    Remove(usize),
    Clear,
    /// Replaces the whole list, e.g. with previously exported selections.
    Replace(Vec<LineSelection>),
}

/// Non-fatal notice that selections were dropped after a catalog change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaleSelectionWarning {
    pub removed: usize,
}

impl fmt::Display for StaleSelectionWarning {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(
            f,
            "Removed {} outdated selection(s) because the catalog changed.",
            self.removed
        )
    }
}

/// State of one interactive quoting session.
///
/// Handlers take the current state and return the next one; a failed action
/// leaves the previous state untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuoteSession {
    pub browse: CatalogFilter,
    pub selections: SelectionList,
}

impl QuoteSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a user action and returns the resulting session.
    ///
    /// Supplier A has no home/laminate variants, so those fields are blanked
    /// on add.
    pub fn apply(
        &self,
        action: SessionAction,
    ) -> Result<QuoteSession, SessionError> {
        let mut next = self.clone();

        match action {
            SessionAction::Add(selection) => {
                if !next.selections.add(without_unused_variant(selection)) {
                    debug!("ignored selection without a SKU");
                }
            }
            SessionAction::Remove(index) => {
                let removed = next.selections.remove_at(index)?;
                debug!(sku = %removed.sku, index, "removed selection");
            }
            SessionAction::Clear => next.selections.clear(),
            SessionAction::Replace(lines) => {
                let lines = lines.into_iter().map(without_unused_variant).collect::<Vec<_>>();
                next.selections = SelectionList::from(lines);
            }
        }

        Ok(next)
    }

    /// Drops selections whose SKU is in neither catalog.
    ///
    /// Returns a warning when anything was dropped.
    pub fn reconciled(
        mut self,
        catalogs: &CatalogPair,
    ) -> (QuoteSession, Option<StaleSelectionWarning>) {
        let removed = self.selections.reconcile(&catalogs.valid_skus());
        if removed == 0 {
            return (self, None);
        }

        warn!(removed, "dropped selections missing from the current catalogs");
        (self, Some(StaleSelectionWarning { removed }))
    }

    /// Prices the current selections. Call after [`QuoteSession::reconciled`].
    pub fn price(
        &self,
        catalogs: &CatalogPair,
        config: &PricingConfig,
    ) -> PricedQuote {
        PricingEngine::new(catalogs, config).price(self.selections.as_slice())
    }
}

/// Suppliers without variants never carry a home or laminate value.
fn without_unused_variant(mut selection: LineSelection) -> LineSelection {
    if !selection.supplier.has_variants() {
        selection.home = None;
        selection.laminate = None;
    }
    selection
}
