use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Supplier;

/// One row of a supplier catalog.
///
/// `price` is `None` when the catalog left the cell blank; such an item can
/// still be listed and selected but its cost is undefined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub sku: String,
    pub description: String,
    pub unit: String,
    pub price: Option<Decimal>,
}

/// A supplier's price list in file order.
///
/// Duplicate SKUs are kept as loaded; [`Catalog::find`] returns the first
/// entry with a matching SKU.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn find(
        &self,
        sku: &str,
    ) -> Option<&CatalogEntry> {
        self.entries.iter().find(|entry| entry.sku == sku)
    }

    pub fn contains(
        &self,
        sku: &str,
    ) -> bool {
        self.find(sku).is_some()
    }

    pub fn skus(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.sku.as_str())
    }
}

/// Both supplier catalogs as produced by a single load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogPair {
    pub alpha: Catalog,
    pub ben: Catalog,
}

impl CatalogPair {
    pub fn new(
        alpha: Catalog,
        ben: Catalog,
    ) -> Self {
        Self { alpha, ben }
    }

    pub fn get(
        &self,
        supplier: Supplier,
    ) -> &Catalog {
        match supplier {
            Supplier::Alpha => &self.alpha,
            Supplier::Ben => &self.ben,
        }
    }

    /// Union of the SKUs of both catalogs.
    pub fn valid_skus(&self) -> HashSet<String> {
        self.alpha
            .skus()
            .chain(self.ben.skus())
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn entry(
        sku: &str,
        price: Decimal,
    ) -> CatalogEntry {
        CatalogEntry {
            sku: sku.to_string(),
            description: format!("item {sku}"),
            unit: "pc".to_string(),
            price: Some(price),
        }
    }

    #[test]
    fn find_returns_first_duplicate() {
        let catalog = Catalog::new(vec![
            entry("A-1", dec!(10)),
            entry("A-2", dec!(20)),
            entry("A-1", dec!(99)),
        ]);

        assert_eq!(catalog.find("A-1").and_then(|e| e.price), Some(dec!(10)));
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn find_is_case_sensitive() {
        let catalog = Catalog::new(vec![entry("A-1", dec!(10))]);

        assert!(catalog.contains("A-1"));
        assert!(!catalog.contains("a-1"));
    }

    #[test]
    fn pair_routes_by_supplier() {
        let pair = CatalogPair::new(
            Catalog::new(vec![entry("A-1", dec!(1))]),
            Catalog::new(vec![entry("B-1-HDB", dec!(2))]),
        );

        assert!(pair.get(Supplier::Alpha).contains("A-1"));
        assert!(!pair.get(Supplier::Alpha).contains("B-1-HDB"));
        assert!(pair.get(Supplier::Ben).contains("B-1-HDB"));
    }

    #[test]
    fn valid_skus_is_union_of_both_catalogs() {
        let pair = CatalogPair::new(
            Catalog::new(vec![entry("A-1", dec!(1)), entry("SHARED", dec!(1))]),
            Catalog::new(vec![entry("B-1-HDB", dec!(2)), entry("SHARED", dec!(3))]),
        );

        let mut skus: Vec<_> = pair.valid_skus().into_iter().collect();
        skus.sort();

        assert_eq!(skus, vec!["A-1", "B-1-HDB", "SHARED"]);
    }
}
