pub mod app;
pub mod commands;
pub mod config;
pub mod logging;
pub mod utils;

pub use app::{Flow, QuoteApp};
pub use commands::{CatalogCommand, Command, ControlCommand, FilterArg, parse_line};
pub use config::{AppConfig, CatalogPaths, ConfigError, ExportPaths};
