//! Margin-based pricing for a quote.
//!
//! Every selected line is joined with its supplier catalog cost and priced as
//! follows:
//!
//! | Value        | Rule                                                        |
//! |--------------|-------------------------------------------------------------|
//! | `cost`       | price of the first catalog entry with the line's SKU, else undefined |
//! | `unit_sell`  | override if given (undefined if unparseable), else `cost / (1 - margin/100)` |
//! | `line_total` | `round(unit_sell × qty)`                                    |
//! | `subtotal`   | sum of line totals                                          |
//! | `tax`        | `round(subtotal × tax_rate/100)`                            |
//! | `total`      | `round(subtotal + tax)`                                     |
//!
//! Rounding happens only at the three `round` steps above. An undefined value
//! never becomes zero: it makes every value derived from it undefined too.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use quote_core::calculations::PricingEngine;
//! use quote_core::{Catalog, CatalogEntry, CatalogPair, LineSelection, PricingConfig, Supplier};
//!
//! let catalogs = CatalogPair::new(
//!     Catalog::new(vec![CatalogEntry {
//!         sku: "A-100".to_string(),
//!         description: "Base cabinet".to_string(),
//!         unit: "pc".to_string(),
//!         price: Some(dec!(50.0)),
//!     }]),
//!     Catalog::default(),
//! );
//! let config = PricingConfig {
//!     margin_pct: dec!(25),
//!     tax_rate_pct: dec!(9),
//!     currency: "SGD".to_string(),
//!     round_digits: 2,
//! };
//! let selections = vec![LineSelection::new("A-100", Supplier::Alpha, dec!(2))];
//!
//! let quote = PricingEngine::new(&catalogs, &config).price(&selections);
//!
//! assert_eq!(quote.lines[0].line_total, Some(dec!(133.33)));
//! assert_eq!(quote.subtotal, Some(dec!(133.33)));
//! assert_eq!(quote.tax, Some(dec!(12.00)));
//! assert_eq!(quote.total, Some(dec!(145.33)));
//! ```

use std::str::FromStr;

use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::common::{checked_sum, round_half_up};
use crate::{CatalogPair, LineSelection, PricedLine, PricedQuote, PricingConfig};

/// Computes a margin-based sell price: `cost / (1 - margin/100)`.
///
/// Returns `None` for a margin of 100% or more, where no finite sell price
/// achieves the margin.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use quote_core::calculations::sell_from_margin;
///
/// assert_eq!(sell_from_margin(dec!(80), dec!(20)), Some(dec!(100)));
/// assert_eq!(sell_from_margin(dec!(80), dec!(100)), None);
/// ```
pub fn sell_from_margin(
    cost: Decimal,
    margin_pct: Decimal,
) -> Option<Decimal> {
    if margin_pct >= Decimal::ONE_HUNDRED {
        return None;
    }
    let divisor = Decimal::ONE - margin_pct / Decimal::ONE_HUNDRED;
    cost.checked_div(divisor)
}

/// Parses a user-entered override sell price.
///
/// Accepts plain (`"12.5"`) and scientific (`"1.25e1"`) notation with
/// surrounding whitespace. Returns `None` when the text is not a number.
pub fn parse_override(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}

/// Calculator that prices selections against a pair of catalogs.
#[derive(Debug, Clone)]
pub struct PricingEngine<'a> {
    catalogs: &'a CatalogPair,
    config: &'a PricingConfig,
}

impl<'a> PricingEngine<'a> {
    pub fn new(
        catalogs: &'a CatalogPair,
        config: &'a PricingConfig,
    ) -> Self {
        Self { catalogs, config }
    }

    /// Prices every selection in order and computes the aggregates.
    pub fn price(
        &self,
        selections: &[LineSelection],
    ) -> PricedQuote {
        let lines: Vec<PricedLine> = selections.iter().map(|s| self.price_line(s)).collect();

        let subtotal = self.subtotal(&lines);
        let tax = subtotal.and_then(|s| self.tax(s));
        let total = subtotal.zip(tax).and_then(|(s, t)| self.total(s, t));

        PricedQuote {
            lines,
            subtotal,
            tax,
            total,
        }
    }

    /// Prices a single selection.
    pub fn price_line(
        &self,
        selection: &LineSelection,
    ) -> PricedLine {
        let cost = self.lookup_cost(selection);
        let unit_sell = self.unit_sell(selection, cost);
        let line_total = unit_sell.and_then(|u| self.line_total(u, selection.quantity));

        if line_total.is_none() {
            debug!(
                sku = %selection.sku,
                supplier = %selection.supplier,
                ?cost,
                ?unit_sell,
                "line price is undefined"
            );
        }

        PricedLine {
            selection: selection.clone(),
            cost,
            unit_sell,
            line_total,
        }
    }

    /// Catalog cost of the line's SKU in its supplier's catalog.
    fn lookup_cost(
        &self,
        selection: &LineSelection,
    ) -> Option<Decimal> {
        self.catalogs
            .get(selection.supplier)
            .find(&selection.sku)
            .and_then(|entry| entry.price)
    }

    /// Override when one was entered, otherwise the margin-based price.
    ///
    /// An override that does not parse is undefined rather than falling back
    /// to the margin price.
    fn unit_sell(
        &self,
        selection: &LineSelection,
        cost: Option<Decimal>,
    ) -> Option<Decimal> {
        match selection.override_unit_sell.as_deref() {
            Some(raw) => parse_override(raw),
            None => cost.and_then(|c| sell_from_margin(c, self.config.margin_pct)),
        }
    }

    fn line_total(
        &self,
        unit_sell: Decimal,
        quantity: Decimal,
    ) -> Option<Decimal> {
        unit_sell
            .checked_mul(quantity)
            .map(|v| round_half_up(v, self.config.round_digits))
    }

    /// Sum of line totals. Not rounded again since each term already is.
    fn subtotal(
        &self,
        lines: &[PricedLine],
    ) -> Option<Decimal> {
        checked_sum(lines.iter().map(|line| line.line_total))
    }

    fn tax(
        &self,
        subtotal: Decimal,
    ) -> Option<Decimal> {
        let rate = self.config.tax_rate_pct / Decimal::ONE_HUNDRED;
        subtotal
            .checked_mul(rate)
            .map(|v| round_half_up(v, self.config.round_digits))
    }

    fn total(
        &self,
        subtotal: Decimal,
        tax: Decimal,
    ) -> Option<Decimal> {
        subtotal
            .checked_add(tax)
            .map(|v| round_half_up(v, self.config.round_digits))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::{Catalog, CatalogEntry, Home, Laminate, Supplier};

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

    fn catalogs() -> CatalogPair {
        let unpriced = CatalogEntry {
            price: None,
            ..entry("A-300", Decimal::ZERO)
        };
        CatalogPair::new(
            Catalog::new(vec![entry("A-100", dec!(50.0)), entry("A-200", dec!(80)), unpriced]),
            Catalog::new(vec![entry("B-1-HDB", dec!(120)), entry("B-1-CONDO", dec!(150))]),
        )
    }

    fn config(margin: Decimal) -> PricingConfig {
        PricingConfig {
            margin_pct: margin,
            tax_rate_pct: dec!(9),
            currency: "SGD".to_string(),
            round_digits: 2,
        }
    }

    // =========================================================================
    // sell_from_margin tests
    // =========================================================================

    #[test]
    fn sell_from_margin_twenty_percent() {
        assert_eq!(sell_from_margin(dec!(80), dec!(20)), Some(dec!(100)));
    }

    #[test]
    fn sell_from_margin_zero_margin_is_cost() {
        assert_eq!(sell_from_margin(dec!(80), dec!(0)), Some(dec!(80)));
    }

    #[test]
    fn sell_from_margin_hundred_is_undefined() {
        assert_eq!(sell_from_margin(dec!(80), dec!(100)), None);
    }

    #[test]
    fn sell_from_margin_above_hundred_is_undefined() {
        assert_eq!(sell_from_margin(dec!(80), dec!(150)), None);
    }

    #[test]
    fn sell_from_margin_is_not_rounded() {
        let sell = sell_from_margin(dec!(50), dec!(25)).expect("defined");

        assert!(sell > dec!(66.6666666));
        assert!(sell < dec!(66.6666667));
    }

    // =========================================================================
    // parse_override tests
    // =========================================================================

    #[test]
    fn parse_override_accepts_plain_and_scientific() {
        assert_eq!(parse_override("12.50"), Some(dec!(12.50)));
        assert_eq!(parse_override("  7 "), Some(dec!(7)));
        assert_eq!(parse_override("1.25e1"), Some(dec!(12.5)));
    }

    #[test]
    fn parse_override_rejects_text() {
        assert_eq!(parse_override("abc"), None);
        assert_eq!(parse_override("12,50"), None);
    }

    // =========================================================================
    // PricingEngine tests
    // =========================================================================

    #[test]
    fn end_to_end_margin_and_tax() {
        let catalogs = catalogs();
        let config = config(dec!(25));
        let selections = vec![LineSelection::new("A-100", Supplier::Alpha, dec!(2))];

        let quote = PricingEngine::new(&catalogs, &config).price(&selections);

        assert_eq!(quote.lines.len(), 1);
        assert_eq!(quote.lines[0].cost, Some(dec!(50.0)));
        assert_eq!(quote.lines[0].line_total, Some(dec!(133.33)));
        assert_eq!(quote.subtotal, Some(dec!(133.33)));
        assert_eq!(quote.tax, Some(dec!(12.00)));
        assert_eq!(quote.total, Some(dec!(145.33)));
    }

    #[test]
    fn override_is_used_verbatim() {
        let catalogs = catalogs();
        let config = config(dec!(25));
        let selections =
            vec![LineSelection::new("A-200", Supplier::Alpha, dec!(3)).with_override("99.999")];

        let quote = PricingEngine::new(&catalogs, &config).price(&selections);

        assert_eq!(quote.lines[0].cost, Some(dec!(80)));
        assert_eq!(quote.lines[0].unit_sell, Some(dec!(99.999)));
        assert_eq!(quote.lines[0].line_total, Some(dec!(300.00)));
    }

    #[test]
    fn unparseable_override_is_undefined_and_propagates() {
        let catalogs = catalogs();
        let config = config(dec!(25));
        let selections = vec![
            LineSelection::new("A-100", Supplier::Alpha, dec!(1)),
            LineSelection::new("A-200", Supplier::Alpha, dec!(1)).with_override("cheap"),
        ];

        let quote = PricingEngine::new(&catalogs, &config).price(&selections);

        assert!(quote.lines[0].is_defined());
        assert_eq!(quote.lines[1].cost, Some(dec!(80)));
        assert_eq!(quote.lines[1].unit_sell, None);
        assert_eq!(quote.lines[1].line_total, None);
        assert_eq!(quote.subtotal, None);
        assert_eq!(quote.tax, None);
        assert_eq!(quote.total, None);
        assert_eq!(quote.undefined_lines(), 1);
    }

    #[test]
    fn margin_of_one_hundred_makes_every_line_undefined() {
        let catalogs = catalogs();
        let config = config(dec!(100));
        let selections = vec![LineSelection::new("A-100", Supplier::Alpha, dec!(1))];

        let quote = PricingEngine::new(&catalogs, &config).price(&selections);

        assert_eq!(quote.lines[0].cost, Some(dec!(50.0)));
        assert_eq!(quote.lines[0].unit_sell, None);
        assert_eq!(quote.total, None);
    }

    #[test]
    fn override_still_prices_when_margin_is_one_hundred() {
        let catalogs = catalogs();
        let config = config(dec!(100));
        let selections =
            vec![LineSelection::new("A-100", Supplier::Alpha, dec!(1)).with_override("10")];

        let quote = PricingEngine::new(&catalogs, &config).price(&selections);

        assert_eq!(quote.total, Some(dec!(10.90)));
    }

    #[test]
    fn missing_sku_has_undefined_cost() {
        let catalogs = catalogs();
        let config = config(dec!(25));
        let selections = vec![LineSelection::new("GONE", Supplier::Alpha, dec!(1))];

        let quote = PricingEngine::new(&catalogs, &config).price(&selections);

        assert_eq!(quote.lines[0].cost, None);
        assert_eq!(quote.lines[0].unit_sell, None);
        assert_eq!(quote.subtotal, None);
    }

    #[test]
    fn blank_catalog_price_is_undefined_for_that_line_only() {
        let catalogs = catalogs();
        let config = config(dec!(25));
        let selections = vec![
            LineSelection::new("A-100", Supplier::Alpha, dec!(2)),
            LineSelection::new("A-300", Supplier::Alpha, dec!(1)),
        ];

        let quote = PricingEngine::new(&catalogs, &config).price(&selections);

        assert_eq!(quote.lines[0].line_total, Some(dec!(133.33)));
        assert_eq!(quote.lines[1].cost, None);
        assert_eq!(quote.lines[1].unit_sell, None);
        assert_eq!(quote.lines[1].line_total, None);
        assert_eq!(quote.subtotal, None);
        assert_eq!(quote.total, None);
        assert_eq!(quote.undefined_lines(), 1);
    }

    #[test]
    fn override_prices_an_item_without_catalog_price() {
        let catalogs = catalogs();
        let config = config(dec!(25));
        let selections =
            vec![LineSelection::new("A-300", Supplier::Alpha, dec!(1)).with_override("10")];

        let quote = PricingEngine::new(&catalogs, &config).price(&selections);

        assert_eq!(quote.lines[0].cost, None);
        assert!(quote.lines[0].is_defined());
        assert_eq!(quote.undefined_lines(), 0);
        assert_eq!(quote.total, Some(dec!(10.90)));
    }

    #[test]
    fn cost_is_looked_up_in_the_lines_supplier_catalog() {
        let catalogs = catalogs();
        let config = config(dec!(25));
        // A-100 only exists in catalog A.
        let selections = vec![LineSelection::new("A-100", Supplier::Ben, dec!(1))];

        let quote = PricingEngine::new(&catalogs, &config).price(&selections);

        assert_eq!(quote.lines[0].cost, None);
    }

    #[test]
    fn multiple_lines_sum_rounded_line_totals() {
        let catalogs = catalogs();
        let config = config(dec!(25));
        let selections = vec![
            LineSelection::new("A-100", Supplier::Alpha, dec!(2)),
            LineSelection::new("B-1-CONDO", Supplier::Ben, dec!(1))
                .with_variant(Some(Home::Condo), Some(Laminate::Standard)),
        ];

        let quote = PricingEngine::new(&catalogs, &config).price(&selections);

        // 150 / 0.75 = 200
        assert_eq!(quote.lines[1].line_total, Some(dec!(200.00)));
        assert_eq!(quote.subtotal, Some(dec!(333.33)));
        // 333.33 × 0.09 = 29.9997
        assert_eq!(quote.tax, Some(dec!(30.00)));
        assert_eq!(quote.total, Some(dec!(363.33)));
    }

    #[test]
    fn zero_round_digits() {
        let catalogs = catalogs();
        let config = PricingConfig {
            round_digits: 0,
            ..config(dec!(25))
        };
        let selections = vec![LineSelection::new("A-100", Supplier::Alpha, dec!(2))];

        let quote = PricingEngine::new(&catalogs, &config).price(&selections);

        assert_eq!(quote.lines[0].line_total, Some(dec!(133)));
        // 133 × 0.09 = 11.97
        assert_eq!(quote.tax, Some(dec!(12)));
        assert_eq!(quote.total, Some(dec!(145)));
    }

    #[test]
    fn zero_quantity_prices_to_zero() {
        let catalogs = catalogs();
        let config = config(dec!(25));
        let selections = vec![LineSelection::new("A-100", Supplier::Alpha, dec!(0))];

        let quote = PricingEngine::new(&catalogs, &config).price(&selections);

        assert_eq!(quote.lines[0].line_total, Some(dec!(0)));
        assert_eq!(quote.total, Some(dec!(0)));
    }

    #[test]
    fn empty_selection_prices_to_zero() {
        let catalogs = catalogs();
        let config = config(dec!(25));

        let quote = PricingEngine::new(&catalogs, &config).price(&[]);

        assert!(quote.lines.is_empty());
        assert_eq!(quote.subtotal, Some(Decimal::ZERO));
        assert_eq!(quote.tax, Some(Decimal::ZERO));
        assert_eq!(quote.total, Some(Decimal::ZERO));
    }
}
