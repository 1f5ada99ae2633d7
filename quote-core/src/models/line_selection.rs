use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Home, Laminate, Supplier};

/// A line item the user has picked for the quote.
///
/// `override_unit_sell` keeps the raw text the user typed so that an
/// unparseable override can still be reported (and exported) as entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineSelection {
    pub sku: String,
    pub supplier: Supplier,
    pub quantity: Decimal,
    pub override_unit_sell: Option<String>,
    pub home: Option<Home>,
    pub laminate: Option<Laminate>,
}

impl LineSelection {
    pub fn new(
        sku: impl Into<String>,
        supplier: Supplier,
        quantity: Decimal,
    ) -> Self {
        Self {
            sku: sku.into(),
            supplier,
            quantity,
            override_unit_sell: None,
            home: None,
            laminate: None,
        }
    }

    /// Sets the override from user text. Blank text clears it.
    pub fn with_override(
        mut self,
        raw: &str,
    ) -> Self {
        let trimmed = raw.trim();
        self.override_unit_sell = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }

    pub fn with_variant(
        mut self,
        home: Option<Home>,
        laminate: Option<Laminate>,
    ) -> Self {
        self.home = home;
        self.laminate = laminate;
        self
    }

    /// Override text, or `""` when absent.
    pub fn override_str(&self) -> &str {
        self.override_unit_sell.as_deref().unwrap_or("")
    }

    pub fn home_str(&self) -> &'static str {
        self.home.as_ref().map(Home::as_str).unwrap_or("")
    }

    pub fn laminate_str(&self) -> &'static str {
        self.laminate.as_ref().map(Laminate::as_str).unwrap_or("")
    }
}
