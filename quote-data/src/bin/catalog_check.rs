use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use quote_core::Supplier;
use quote_data::{CatalogSource, load_uncached};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Validate a pair of supplier price lists.
///
/// Each CSV file must have the columns `sku`, `description`, `unit` and
/// `price` (any casing, any order). Extra columns are ignored.
#[derive(Parser, Debug)]
#[command(name = "catalog-check")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to supplier A's price list
    #[arg(short = 'a', long, default_value = "supplier_a.csv")]
    supplier_a: PathBuf,

    /// Path to supplier B's price list
    #[arg(short = 'b', long, default_value = "supplier_b.csv")]
    supplier_b: PathBuf,

    /// Also print every entry
    #[arg(short, long, default_value_t = false)]
    list: bool,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::from("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .without_time()
        .with_target(false)
        .init();

    let args = Args::parse();

    info!(
        "checking {} and {}",
        args.supplier_a.display(),
        args.supplier_b.display()
    );

    let source = CatalogSource::Bundled {
        alpha: args.supplier_a.clone(),
        ben: args.supplier_b.clone(),
    };
    let catalogs = load_uncached(&source).context("Problem loading catalogs")?;

    for supplier in Supplier::all() {
        let catalog = catalogs.get(*supplier);
        println!("{}: {} entries", supplier.label(), catalog.len());

        if args.list {
            for entry in catalog.entries() {
                let price = entry.price.map_or_else(|| "-".to_string(), |p| p.to_string());
                println!(
                    "  {:<20} {:<40} {:<6} {}",
                    entry.sku, entry.description, entry.unit, price
                );
            }
        }
    }

    Ok(())
}
