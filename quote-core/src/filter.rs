//! Browsing filters over a supplier catalog.
//!
//! Supplier B encodes the home type and laminate finish as a SKU suffix
//! (`B-100-HDB`, `B-100-SNS`, `B-100-CONDO`). Picking either attribute narrows
//! the listing to one suffix; supplier A has no variants and ignores both.

use std::fmt;

use crate::{CatalogEntry, CatalogPair, Home, Laminate, Supplier};

/// SKU suffix selected by the home/laminate filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkuSuffix {
    Hdb,
    Sns,
    Condo,
}

impl SkuSuffix {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hdb => "HDB",
            Self::Sns => "SNS",
            Self::Condo => "CONDO",
        }
    }

    /// Whether `sku` ends with `-<suffix>`, ignoring case.
    pub fn matches(
        &self,
        sku: &str,
    ) -> bool {
        sku.to_uppercase().ends_with(&format!("-{}", self.as_str()))
    }
}

impl fmt::Display for SkuSuffix {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps free-form home/laminate text to a SKU suffix.
///
/// Condo and landed homes share the `CONDO` range. Otherwise an `sns`
/// laminate picks `SNS`, and everything else (including two empty inputs)
/// falls back to `HDB`.
///
/// # Examples
///
/// ```
/// use quote_core::choose_suffix;
///
/// assert_eq!(choose_suffix("condo", "standard").as_str(), "CONDO");
/// assert_eq!(choose_suffix("hdb", "sns").as_str(), "SNS");
/// assert_eq!(choose_suffix("hdb", "standard").as_str(), "HDB");
/// assert_eq!(choose_suffix("", "").as_str(), "HDB");
/// ```
pub fn choose_suffix(
    home: &str,
    laminate: &str,
) -> SkuSuffix {
    let home = home.trim().to_lowercase();
    let laminate = laminate.trim().to_lowercase();

    if matches!(
        home.as_str(),
        "condo" | "landed" | "condo/landed" | "condo_landed"
    ) {
        return SkuSuffix::Condo;
    }
    if laminate == "sns" {
        SkuSuffix::Sns
    } else {
        SkuSuffix::Hdb
    }
}

/// What the user is currently browsing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    pub supplier: Supplier,
    pub home: Option<Home>,
    pub laminate: Option<Laminate>,
    pub query: Option<String>,
}

impl CatalogFilter {
    pub fn new(supplier: Supplier) -> Self {
        Self {
            supplier,
            ..Default::default()
        }
    }

    /// Suffix to filter on, or `None` when no suffix filtering applies.
    pub fn suffix(&self) -> Option<SkuSuffix> {
        if !self.supplier.has_variants() {
            return None;
        }
        if self.home.is_none() && self.laminate.is_none() {
            return None;
        }
        let home = self.home.as_ref().map(Home::as_str).unwrap_or("");
        let laminate = self.laminate.as_ref().map(Laminate::as_str).unwrap_or("");
        Some(choose_suffix(home, laminate))
    }

    /// Whether a single entry passes the suffix and text filters.
    pub fn accepts(
        &self,
        entry: &CatalogEntry,
    ) -> bool {
        if let Some(suffix) = self.suffix() {
            if !suffix.matches(&entry.sku) {
                return false;
            }
        }
        match self.query.as_deref().map(str::to_lowercase) {
            Some(q) if !q.is_empty() => {
                entry.description.to_lowercase().contains(&q) || entry.sku.to_lowercase().contains(&q)
            }
            _ => true,
        }
    }
}

/// Entries of the selected supplier's catalog that pass `filter`, in catalog
/// order.
pub fn filter_catalog<'a>(
    catalogs: &'a CatalogPair,
    filter: &CatalogFilter,
) -> Vec<&'a CatalogEntry> {
    catalogs
        .get(filter.supplier)
        .entries()
        .iter()
        .filter(|entry| filter.accepts(entry))
        .collect()
}
