//! Pricing calculations for a quote.
//!
//! This module provides the margin/tax pricing engine and the rounding
//! helpers it shares with display code.

pub mod common;
pub mod pricing;

pub use pricing::{PricingEngine, parse_override, sell_from_margin};
