pub mod calculations;
pub mod filter;
pub mod models;
pub mod session;

pub use filter::{CatalogFilter, SkuSuffix, choose_suffix, filter_catalog};
pub use models::*;
pub use session::{QuoteSession, SelectionList, SessionAction, SessionError, StaleSelectionWarning};
