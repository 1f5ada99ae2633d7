//! Parsing of the interactive session's command lines.
//!
//! Each line is split into words (double quotes group words containing
//! spaces) and parsed with clap, so every command gets usage errors and a
//! generated help listing for free.

use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use quote_core::{Home, Laminate, Supplier};
use rust_decimal::Decimal;

use crate::utils::parse_decimal;

/// A home/laminate filter argument: one value, or `-` for any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterArg<T> {
    Only(T),
    Any,
}

impl<T> FilterArg<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Only(value) => Some(value),
            Self::Any => None,
        }
    }
}

fn parse_supplier(s: &str) -> Result<Supplier, String> {
    Supplier::parse(s).ok_or_else(|| format!("unknown supplier '{s}' (expected a or b)"))
}

fn parse_home(s: &str) -> Result<FilterArg<Home>, String> {
    if s.trim() == "-" {
        return Ok(FilterArg::Any);
    }
    Home::parse(s)
        .map(FilterArg::Only)
        .ok_or_else(|| format!("unknown home type '{s}' (expected hdb, condo, landed or -)"))
}

fn parse_laminate(s: &str) -> Result<FilterArg<Laminate>, String> {
    if s.trim() == "-" {
        return Ok(FilterArg::Any);
    }
    Laminate::parse(s)
        .map(FilterArg::Only)
        .ok_or_else(|| format!("unknown laminate '{s}' (expected standard, sns or -)"))
}

fn parse_amount(s: &str) -> Result<Decimal, String> {
    parse_decimal(s).map_err(|e| e.to_string())
}

fn parse_quantity(s: &str) -> Result<Decimal, String> {
    let qty = parse_amount(s)?;
    if qty.is_sign_negative() && !qty.is_zero() {
        return Err(format!("quantity must not be negative, got {qty}"));
    }
    Ok(qty)
}

#[derive(Debug, Parser)]
#[command(
    name = "quote",
    no_binary_name = true,
    disable_help_flag = true,
    disable_help_subcommand = true,
    disable_version_flag = true,
    help_template = "Commands:\n{subcommands}"
)]
struct CommandLine {
    #[command(subcommand)]
    command: Command,
}

/// One session command, split by whether it needs the catalogs loaded.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    #[command(flatten)]
    Catalogs(CatalogCommand),
    #[command(flatten)]
    Control(ControlCommand),
}

/// Commands that run inside a render cycle (catalog load and reconciliation
/// first).
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum CatalogCommand {
    /// Browse supplier a or b
    Supplier {
        #[arg(value_parser = parse_supplier)]
        supplier: Supplier,
    },
    /// Filter supplier b by home type (hdb, condo, landed, - for any)
    Home {
        #[arg(value_parser = parse_home)]
        home: FilterArg<Home>,
    },
    /// Filter supplier b by laminate (standard, sns, - for any)
    Laminate {
        #[arg(value_parser = parse_laminate)]
        laminate: FilterArg<Laminate>,
    },
    /// Search descriptions and SKUs; no text clears the search
    Search {
        #[arg(num_args = 0.., trailing_var_arg = true, allow_hyphen_values = true)]
        words: Vec<String>,
    },
    /// Show the browsable catalog
    Catalog,
    /// Add a SKU from the browsed supplier
    Add {
        sku: String,
        #[arg(value_parser = parse_quantity, default_value = "1")]
        qty: Decimal,
        /// Unit sell price to use instead of the margin price
        #[arg(long = "override", allow_hyphen_values = true)]
        override_unit_sell: Option<String>,
    },
    /// Remove the selection at a listed position
    Remove { position: usize },
    /// Remove every selection
    Clear,
    /// Show the selections
    List,
    /// Show the priced breakdown and totals
    Quote,
    /// Set the margin percentage
    Margin {
        #[arg(value_parser = parse_amount, allow_hyphen_values = true)]
        pct: Decimal,
    },
    /// Set the tax percentage
    Tax {
        #[arg(value_parser = parse_amount, allow_hyphen_values = true)]
        pct: Decimal,
    },
    /// Set the currency label
    Currency { label: String },
    /// Set the number of decimals money is rounded to
    Round { digits: u32 },
    /// Write the items and cost breakdown CSV files
    Export {
        #[arg(long)]
        items: Option<PathBuf>,
        #[arg(long)]
        breakdown: Option<PathBuf>,
    },
    /// Replace the selections with a previously exported items file
    Import { path: PathBuf },
    /// Forget cached catalogs and load them again
    Refresh,
}

/// Commands that never touch the catalogs.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum ControlCommand {
    /// Change the log level (error, warn, info, debug, trace)
    Log { level: String },
    /// Show this list
    Help,
    /// Leave the session
    #[command(alias = "exit")]
    Quit,
}

/// Splits a line on whitespace; `"..."` keeps its contents as one word.
fn split_words(line: &str) -> Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quoted = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                quoted = !quoted;
                in_word = true;
            }
            c if c.is_whitespace() && !quoted => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if quoted {
        return Err("unterminated quote".to_string());
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

/// Parses one input line. Blank lines yield `Ok(None)`.
///
/// The error text is ready to show to the user.
pub fn parse_line(line: &str) -> Result<Option<Command>, String> {
    let words = split_words(line)?;
    if words.is_empty() {
        return Ok(None);
    }

    CommandLine::try_parse_from(words)
        .map(|parsed| Some(parsed.command))
        .map_err(|e| e.render().to_string().trim_end().to_string())
}

/// The generated command listing.
pub fn help_text() -> String {
    CommandLine::command().render_help().to_string()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn parse(line: &str) -> CatalogCommand {
        match parse_line(line).unwrap().unwrap() {
            Command::Catalogs(command) => command,
            other => panic!("expected a catalog command, got {other:?}"),
        }
    }

    #[test]
    fn blank_line_is_no_command() {
        assert_eq!(parse_line("   "), Ok(None));
    }

    #[test]
    fn quoted_words_stay_together() {
        assert_eq!(
            split_words(r#"export --items "my items.csv""#).unwrap(),
            vec!["export", "--items", "my items.csv"]
        );
        assert!(split_words(r#"import "half"#).is_err());
    }

    #[test]
    fn add_defaults_to_one_unit() {
        assert_eq!(
            parse("add A-100"),
            CatalogCommand::Add {
                sku: "A-100".into(),
                qty: dec!(1),
                override_unit_sell: None,
            }
        );
    }

    #[test]
    fn add_with_quantity_and_override() {
        assert_eq!(
            parse("add B-100-CONDO 1,200.5 --override 180"),
            CatalogCommand::Add {
                sku: "B-100-CONDO".into(),
                qty: dec!(1200.5),
                override_unit_sell: Some("180".into()),
            }
        );
    }

    #[test]
    fn add_rejects_negative_quantity() {
        let err = parse_line("add A-100 -2").unwrap_err();

        assert!(err.contains("quantity must not be negative") || err.contains("-2"));
    }

    #[test]
    fn filter_arguments() {
        assert_eq!(parse("supplier B"), CatalogCommand::Supplier { supplier: Supplier::Ben });
        assert_eq!(
            parse("home condo"),
            CatalogCommand::Home { home: FilterArg::Only(Home::Condo) }
        );
        assert_eq!(parse("laminate -"), CatalogCommand::Laminate { laminate: FilterArg::Any });
        assert!(parse_line("home villa").unwrap_err().contains("unknown home type"));
    }

    #[test]
    fn search_collects_all_words() {
        assert_eq!(
            parse("search soft close"),
            CatalogCommand::Search { words: vec!["soft".into(), "close".into()] }
        );
        assert_eq!(parse("search"), CatalogCommand::Search { words: vec![] });
    }

    #[test]
    fn pricing_settings() {
        assert_eq!(parse("margin 30"), CatalogCommand::Margin { pct: dec!(30) });
        assert_eq!(parse("tax 8.5"), CatalogCommand::Tax { pct: dec!(8.5) });
        assert_eq!(parse("round 0"), CatalogCommand::Round { digits: 0 });
        assert_eq!(parse("currency MYR"), CatalogCommand::Currency { label: "MYR".into() });
    }

    #[test]
    fn exit_is_an_alias_of_quit() {
        assert_eq!(parse_line("exit"), Ok(Some(Command::Control(ControlCommand::Quit))));
    }

    #[test]
    fn commands_are_split_by_catalog_use() {
        assert_eq!(parse_line("help"), Ok(Some(Command::Control(ControlCommand::Help))));
        assert_eq!(
            parse_line("log debug"),
            Ok(Some(Command::Control(ControlCommand::Log { level: "debug".into() })))
        );
        assert_eq!(parse("list"), CatalogCommand::List);
        assert_eq!(parse("refresh"), CatalogCommand::Refresh);
    }

    #[test]
    fn unknown_command_is_reported() {
        assert!(parse_line("frobnicate").is_err());
    }

    #[test]
    fn help_lists_every_command() {
        let help = help_text();

        for name in ["supplier", "add", "remove", "export", "import", "refresh", "log", "quit"] {
            assert!(help.contains(name), "help is missing {name}");
        }
    }
}
