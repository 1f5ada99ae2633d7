use std::{
    io::{self, IsTerminal},
    path::PathBuf,
};

use anyhow::Context;
use clap::Parser;
use rust_decimal::Decimal;
use tracing::{debug, info};

use quote_app::{AppConfig, QuoteApp, logging, utils::parse_decimal};
use quote_data::CatalogSource;

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Carpentry quoting session.
///
/// Browse two supplier price lists, pick line items and export the quote as
/// CSV. Commands are read from stdin one per line; type `help` for the list.
#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
    /// TOML config file. Defaults to `quote-tool.toml` when present.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Bundled price list for supplier A.
    #[arg(long)]
    supplier_a: Option<PathBuf>,

    /// Bundled price list for supplier B.
    #[arg(long)]
    supplier_b: Option<PathBuf>,

    /// Uploaded price list for supplier A (needs --upload-b).
    #[arg(long, requires = "upload_b")]
    upload_a: Option<PathBuf>,

    /// Uploaded price list for supplier B (needs --upload-a).
    #[arg(long, requires = "upload_a")]
    upload_b: Option<PathBuf>,

    /// Margin percentage.
    #[arg(long, value_parser = parse_percent)]
    margin: Option<Decimal>,

    /// Tax (GST) percentage.
    #[arg(long, value_parser = parse_percent)]
    tax: Option<Decimal>,

    /// Currency label shown next to amounts.
    #[arg(long)]
    currency: Option<String>,

    /// Decimals that money is rounded to.
    #[arg(long)]
    round: Option<u32>,

    /// Default destination of the items export.
    #[arg(long)]
    items: Option<PathBuf>,

    /// Default destination of the cost breakdown export.
    #[arg(long)]
    breakdown: Option<PathBuf>,

    /// Also append log output to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn parse_percent(s: &str) -> Result<Decimal, String> {
    parse_decimal(s).map_err(|e| e.to_string())
}

// ─── configuration ───────────────────────────────────────────────────────────

/// Defaults, then the config file, then command-line flags.
fn resolve_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    let cwd = std::env::current_dir().context("cannot determine working directory")?;
    let mut config = AppConfig::load(cli.config.as_deref(), &cwd)?;

    if let Some(path) = &cli.supplier_a {
        config.catalogs.supplier_a = path.clone();
    }
    if let Some(path) = &cli.supplier_b {
        config.catalogs.supplier_b = path.clone();
    }
    if let Some(margin) = cli.margin {
        config.pricing.margin_pct = margin;
    }
    if let Some(tax) = cli.tax {
        config.pricing.tax_rate_pct = tax;
    }
    if let Some(currency) = &cli.currency {
        config.pricing.currency = currency.clone();
    }
    if let Some(round) = cli.round {
        config.pricing.round_digits = round;
    }
    if let Some(path) = &cli.items {
        config.export.items = path.clone();
    }
    if let Some(path) = &cli.breakdown {
        config.export.breakdown = path.clone();
    }

    config.validate().context("invalid pricing settings")?;
    Ok(config)
}

/// Uploads mode when both upload files are given, bundled paths otherwise.
fn catalog_source(
    cli: &Cli,
    config: &AppConfig,
) -> anyhow::Result<CatalogSource> {
    match (&cli.upload_a, &cli.upload_b) {
        (Some(a), Some(b)) => {
            let alpha = std::fs::read(a).with_context(|| format!("reading {}", a.display()))?;
            let ben = std::fs::read(b).with_context(|| format!("reading {}", b.display()))?;
            info!("using uploaded catalogs {} and {}", a.display(), b.display());
            Ok(CatalogSource::Uploads { alpha, ben })
        }
        _ => Ok(CatalogSource::Bundled {
            alpha: config.catalogs.supplier_a.clone(),
            ben: config.catalogs.supplier_b.clone(),
        }),
    }
}

// ─── entry point ─────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    logging::init_logging("info");

    let cli = Cli::parse();

    if let Some(path) = &cli.log_file {
        logging::enable_file_logging(path)?;
    }

    let config = resolve_config(&cli)?;
    debug!(?config, "resolved configuration");

    let source = catalog_source(&cli, &config)?;
    let mut app = QuoteApp::new(source, config.pricing, config.export);

    let interactive = io::stdin().is_terminal();
    if interactive {
        println!("Type 'help' for the list of commands.");
    }

    let mut stdout = io::stdout().lock();
    app.run(io::stdin().lock(), &mut stdout, interactive)?;

    Ok(())
}
