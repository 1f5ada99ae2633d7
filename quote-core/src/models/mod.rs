mod catalog;
mod line_selection;
mod priced_line;
mod pricing_config;
mod supplier;

pub use catalog::{Catalog, CatalogEntry, CatalogPair};
pub use line_selection::LineSelection;
pub use priced_line::{PricedLine, PricedQuote};
pub use pricing_config::{MAX_ROUND_DIGITS, PricingConfig, PricingConfigError};
pub use supplier::{Home, Laminate, Supplier};
