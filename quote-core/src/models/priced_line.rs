use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::LineSelection;

/// A selection joined with its catalog cost and computed prices.
///
/// Each money field is `None` when it could not be determined (missing
/// catalog entry, unparseable override, margin of 100% or more). `None`
/// propagates into every value computed from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedLine {
    pub selection: LineSelection,
    pub cost: Option<Decimal>,
    pub unit_sell: Option<Decimal>,
    pub line_total: Option<Decimal>,
}

impl PricedLine {
    /// Whether the line has a sell price and total. An override can price a
    /// line whose cost is unknown.
    pub fn is_defined(&self) -> bool {
        self.unit_sell.is_some() && self.line_total.is_some()
    }
}

/// Priced breakdown plus the three aggregate figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedQuote {
    pub lines: Vec<PricedLine>,
    pub subtotal: Option<Decimal>,
    pub tax: Option<Decimal>,
    pub total: Option<Decimal>,
}

impl PricedQuote {
    /// Number of lines whose figures are undefined.
    pub fn undefined_lines(&self) -> usize {
        self.lines.iter().filter(|line| !line.is_defined()).count()
    }
}
