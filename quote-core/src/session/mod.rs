//! Session-scoped selection state.
//!
//! The selection list lives only as long as one interactive session. It is
//! mutated through [`QuoteSession::apply`] and pruned against freshly loaded
//! catalogs before every priced read.

mod quote_session;
mod selection_list;

pub use quote_session::{QuoteSession, SessionAction, SessionError, StaleSelectionWarning};
pub use selection_list::SelectionList;
