use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest supported number of decimal places for money rounding.
pub const MAX_ROUND_DIGITS: u32 = 4;

/// Errors raised when a [`PricingConfig`] is outside its supported ranges.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingConfigError {
    #[error("margin must be at least 0% and below 100%, got {0}%")]
    MarginOutOfRange(Decimal),

    #[error("tax rate must be between 0% and 100%, got {0}%")]
    TaxRateOutOfRange(Decimal),

    #[error("rounding must be between 0 and {MAX_ROUND_DIGITS} decimals, got {0}")]
    RoundDigitsOutOfRange(u32),
}

/// Pricing knobs supplied for each render cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Target margin as a percentage of the sell price.
    pub margin_pct: Decimal,
    /// Tax (GST) rate as a percentage of the subtotal.
    pub tax_rate_pct: Decimal,
    /// Display label only; no conversion is performed.
    pub currency: String,
    pub round_digits: u32,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            margin_pct: Decimal::from(25),
            tax_rate_pct: Decimal::from(9),
            currency: "SGD".to_string(),
            round_digits: 2,
        }
    }
}

impl PricingConfig {
    /// Checks the configured ranges.
    ///
    /// The pricing engine does not call this: a margin of 100% or more is
    /// still priced, and yields undefined sell prices.
    pub fn validate(&self) -> Result<(), PricingConfigError> {
        let hundred = Decimal::ONE_HUNDRED;

        if self.margin_pct < Decimal::ZERO || self.margin_pct >= hundred {
            return Err(PricingConfigError::MarginOutOfRange(self.margin_pct));
        }
        if self.tax_rate_pct < Decimal::ZERO || self.tax_rate_pct > hundred {
            return Err(PricingConfigError::TaxRateOutOfRange(self.tax_rate_pct));
        }
        if self.round_digits > MAX_ROUND_DIGITS {
            return Err(PricingConfigError::RoundDigitsOutOfRange(self.round_digits));
        }
        Ok(())
    }
}
