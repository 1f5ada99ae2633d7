//! The interactive quoting session.
//!
//! Every command that touches catalogs runs as one render cycle: the
//! catalogs are loaded through the cache, stale selections are dropped, and
//! only then does the command run. A load failure skips the command.

use std::{
    fs::File,
    io::{self, BufRead, BufWriter, Write},
    path::Path,
};

use anyhow::Context;
use quote_core::{
    CatalogPair, LineSelection, PricedQuote, PricingConfig, QuoteSession, SessionAction,
    SessionError, filter_catalog,
};
use quote_data::{
    CatalogCache, CatalogLoader, CatalogSource, read_selections, write_breakdown, write_selections,
};
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::{
    commands::{CatalogCommand, Command, ControlCommand, help_text, parse_line},
    config::ExportPaths,
    logging,
    utils::{format_money, format_percent, tax_label},
};

/// Whether the session should keep reading commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct QuoteApp {
    cache: CatalogCache,
    source: CatalogSource,
    session: QuoteSession,
    pricing: PricingConfig,
    export: ExportPaths,
}

impl QuoteApp {
    pub fn new(
        source: CatalogSource,
        pricing: PricingConfig,
        export: ExportPaths,
    ) -> Self {
        Self {
            cache: CatalogCache::new(),
            source,
            session: QuoteSession::new(),
            pricing,
            export,
        }
    }

    pub fn session(&self) -> &QuoteSession {
        &self.session
    }

    pub fn pricing(&self) -> &PricingConfig {
        &self.pricing
    }

    pub fn cache(&self) -> &CatalogCache {
        &self.cache
    }

    /// Reads commands from `input` until `quit` or end of input.
    pub fn run<R: BufRead, W: Write>(
        &mut self,
        input: R,
        out: &mut W,
        prompt: bool,
    ) -> io::Result<()> {
        let mut lines = input.lines();
        loop {
            if prompt {
                write!(out, "> ")?;
                out.flush()?;
            }
            let Some(line) = lines.next() else {
                break;
            };
            if self.handle_line(&line?, out)? == Flow::Quit {
                break;
            }
        }
        Ok(())
    }

    /// Parses and runs one input line.
    pub fn handle_line<W: Write>(
        &mut self,
        line: &str,
        out: &mut W,
    ) -> io::Result<Flow> {
        match parse_line(line) {
            Ok(Some(command)) => self.handle(command, out),
            Ok(None) => Ok(Flow::Continue),
            Err(message) => {
                writeln!(out, "{message}")?;
                Ok(Flow::Continue)
            }
        }
    }

    pub fn handle<W: Write>(
        &mut self,
        command: Command,
        out: &mut W,
    ) -> io::Result<Flow> {
        debug!(?command, "handling command");

        match command {
            Command::Control(command) => self.run_control_command(command, out),
            Command::Catalogs(command) => {
                self.render_cycle(command, out)?;
                Ok(Flow::Continue)
            }
        }
    }

    fn run_control_command<W: Write>(
        &mut self,
        command: ControlCommand,
        out: &mut W,
    ) -> io::Result<Flow> {
        match command {
            ControlCommand::Quit => return Ok(Flow::Quit),
            ControlCommand::Help => write!(out, "{}", help_text())?,
            ControlCommand::Log { level } => match logging::set_log_level(&level) {
                Ok(()) => writeln!(out, "Log level set to {level}.")?,
                Err(err) => writeln!(out, "{err}")?,
            },
        }
        Ok(Flow::Continue)
    }

    /// Loads the catalogs, drops stale selections and then runs `command`.
    fn render_cycle<W: Write>(
        &mut self,
        command: CatalogCommand,
        out: &mut W,
    ) -> io::Result<()> {
        if command == CatalogCommand::Refresh {
            self.cache.clear();
            info!("catalog cache cleared");
        }

        let catalogs = match CatalogLoader::new(&self.cache).load(&self.source) {
            Ok(catalogs) => catalogs,
            Err(err) => return writeln!(out, "Problem loading catalogs: {err}"),
        };

        let (session, warning) = std::mem::take(&mut self.session).reconciled(&catalogs);
        self.session = session;
        if let Some(warning) = warning {
            writeln!(out, "{warning}")?;
        }

        self.run_catalog_command(command, &catalogs, out)
    }

    fn run_catalog_command<W: Write>(
        &mut self,
        command: CatalogCommand,
        catalogs: &CatalogPair,
        out: &mut W,
    ) -> io::Result<()> {
        match command {
            CatalogCommand::Supplier { supplier } => {
                self.session.browse.supplier = supplier;
                writeln!(out, "Browsing {}.", supplier.label())?;
            }
            CatalogCommand::Home { home } => {
                self.session.browse.home = home.into_option();
                self.write_browse_note(out)?;
            }
            CatalogCommand::Laminate { laminate } => {
                self.session.browse.laminate = laminate.into_option();
                self.write_browse_note(out)?;
            }
            CatalogCommand::Search { words } => {
                let query = words.join(" ");
                self.session.browse.query = (!query.trim().is_empty()).then_some(query);
                self.write_browse_note(out)?;
            }
            CatalogCommand::Catalog => self.write_catalog(catalogs, out)?,
            CatalogCommand::Add {
                sku,
                qty,
                override_unit_sell,
            } => self.add(catalogs, sku, qty, override_unit_sell, out)?,
            CatalogCommand::Remove { position } => self.remove(position, out)?,
            CatalogCommand::Clear => {
                if self.apply(SessionAction::Clear, out)? {
                    writeln!(out, "Cleared all selections.")?;
                }
            }
            CatalogCommand::List => self.write_selections(out)?,
            CatalogCommand::Quote => {
                let quote = self.session.price(catalogs, &self.pricing);
                self.write_quote(&quote, out)?;
            }
            CatalogCommand::Margin { pct } => {
                if self.update_pricing(out, |p| p.margin_pct = pct)? {
                    writeln!(out, "Margin set to {}.", format_percent(pct))?;
                }
            }
            CatalogCommand::Tax { pct } => {
                if self.update_pricing(out, |p| p.tax_rate_pct = pct)? {
                    writeln!(out, "Tax rate set to {}.", format_percent(pct))?;
                }
            }
            CatalogCommand::Currency { label } => {
                writeln!(out, "Currency label set to {label}.")?;
                self.pricing.currency = label;
            }
            CatalogCommand::Round { digits } => {
                if self.update_pricing(out, |p| p.round_digits = digits)? {
                    writeln!(out, "Rounding to {digits} decimal(s).")?;
                }
            }
            CatalogCommand::Export { items, breakdown } => {
                let items = items.unwrap_or_else(|| self.export.items.clone());
                let breakdown = breakdown.unwrap_or_else(|| self.export.breakdown.clone());
                let quote = self.session.price(catalogs, &self.pricing);

                match export_quote(&items, &breakdown, self.session.selections.as_slice(), &quote)
                {
                    Ok(()) => writeln!(
                        out,
                        "Wrote {} selection(s) to {} and the cost breakdown to {}.",
                        quote.lines.len(),
                        items.display(),
                        breakdown.display()
                    )?,
                    Err(err) => writeln!(out, "Export failed: {err:#}")?,
                }
            }
            CatalogCommand::Import { path } => match import_selections(&path) {
                Ok(lines) => {
                    let count = lines.len();
                    if !self.apply(SessionAction::Replace(lines), out)? {
                        return Ok(());
                    }
                    writeln!(out, "Imported {count} selection(s).")?;

                    let (session, warning) = std::mem::take(&mut self.session).reconciled(catalogs);
                    self.session = session;
                    if let Some(warning) = warning {
                        writeln!(out, "{warning}")?;
                    }
                }
                Err(err) => writeln!(out, "Import failed: {err:#}")?,
            },
            CatalogCommand::Refresh => {
                writeln!(
                    out,
                    "Reloaded catalogs: {} item(s) from supplier A, {} from supplier B.",
                    catalogs.alpha.len(),
                    catalogs.ben.len()
                )?;
            }
        }
        Ok(())
    }

    /// Applies `action` to the session. A rejected action is reported to
    /// the user and leaves the session unchanged.
    fn apply<W: Write>(
        &mut self,
        action: SessionAction,
        out: &mut W,
    ) -> io::Result<bool> {
        match self.session.apply(action) {
            Ok(next) => {
                self.session = next;
                Ok(true)
            }
            Err(err) => {
                writeln!(out, "{err}")?;
                Ok(false)
            }
        }
    }

    fn add<W: Write>(
        &mut self,
        catalogs: &CatalogPair,
        sku: String,
        qty: Decimal,
        override_unit_sell: Option<String>,
        out: &mut W,
    ) -> io::Result<()> {
        let browse = &self.session.browse;
        let supplier = browse.supplier;

        if !catalogs.get(supplier).contains(&sku) {
            writeln!(out, "SKU '{sku}' is not in {}.", supplier.label())?;
            return Ok(());
        }

        let selection = LineSelection::new(sku, supplier, qty)
            .with_override(override_unit_sell.as_deref().unwrap_or(""))
            .with_variant(browse.home, browse.laminate);
        let added = format!("Added {} x {}.", selection.sku, selection.quantity);
        if self.apply(SessionAction::Add(selection), out)? {
            writeln!(out, "{added}")?;
        }
        Ok(())
    }

    fn remove<W: Write>(
        &mut self,
        position: usize,
        out: &mut W,
    ) -> io::Result<()> {
        let Some(index) = position.checked_sub(1) else {
            return writeln!(out, "Positions start at 1.");
        };

        match self.session.apply(SessionAction::Remove(index)) {
            Ok(next) => {
                self.session = next;
                writeln!(out, "Removed selection #{position}.")
            }
            Err(SessionError::IndexOutOfRange { len, .. }) => {
                writeln!(out, "There is no selection #{position}; the list has {len}.")
            }
        }
    }

    /// Applies `change` to a copy of the pricing settings and keeps it only
    /// if it validates.
    fn update_pricing<W: Write>(
        &mut self,
        out: &mut W,
        change: impl FnOnce(&mut PricingConfig),
    ) -> io::Result<bool> {
        let mut candidate = self.pricing.clone();
        change(&mut candidate);

        match candidate.validate() {
            Ok(()) => {
                self.pricing = candidate;
                Ok(true)
            }
            Err(err) => {
                writeln!(out, "{err}")?;
                Ok(false)
            }
        }
    }

    fn write_browse_note<W: Write>(
        &self,
        out: &mut W,
    ) -> io::Result<()> {
        let browse = &self.session.browse;
        let home = browse.home.map_or("any", |h| h.as_str());
        let laminate = browse.laminate.map_or("any", |l| l.as_str());
        let query = browse.query.as_deref().unwrap_or("");

        write!(out, "Filters: home {home}, laminate {laminate}")?;
        if !query.is_empty() {
            write!(out, ", search \"{query}\"")?;
        }
        writeln!(out, ".")?;

        if !browse.supplier.has_variants() && (browse.home.is_some() || browse.laminate.is_some())
        {
            writeln!(out, "Home and laminate filters only apply to supplier B.")?;
        }
        Ok(())
    }

    fn write_catalog<W: Write>(
        &self,
        catalogs: &CatalogPair,
        out: &mut W,
    ) -> io::Result<()> {
        let browse = &self.session.browse;
        let entries = filter_catalog(catalogs, browse);

        write!(out, "{}", browse.supplier.label())?;
        if let Some(suffix) = browse.suffix() {
            write!(out, " [-{suffix}]")?;
        }
        writeln!(out)?;

        if entries.is_empty() {
            return writeln!(out, "No matching items.");
        }
        for entry in &entries {
            writeln!(
                out,
                "  {:<16} {:<32} {:<6} {:>14}",
                entry.sku,
                entry.description,
                entry.unit,
                format_money(entry.price, &self.pricing)
            )?;
        }
        writeln!(out, "{} item(s).", entries.len())
    }

    fn write_selections<W: Write>(
        &self,
        out: &mut W,
    ) -> io::Result<()> {
        if self.session.selections.is_empty() {
            return writeln!(out, "No selections yet.");
        }

        for (idx, line) in self.session.selections.iter().enumerate() {
            write!(
                out,
                "{:>3}. {:<16} {} qty {}",
                idx + 1,
                line.sku,
                line.supplier,
                line.quantity
            )?;
            if let Some(raw) = &line.override_unit_sell {
                write!(out, " override {raw}")?;
            }
            if line.home.is_some() || line.laminate.is_some() {
                write!(out, " ({}/{})", line.home_str(), line.laminate_str())?;
            }
            writeln!(out)?;
        }
        Ok(())
    }

    fn write_quote<W: Write>(
        &self,
        quote: &PricedQuote,
        out: &mut W,
    ) -> io::Result<()> {
        let money = |v| format_money(v, &self.pricing);

        writeln!(
            out,
            "  # {:<16} {:<3} {:>8} {:>14} {:>14} {:>14}",
            "SKU", "Sup", "Qty", "Cost", "Unit sell", "Line total"
        )?;
        for (idx, line) in quote.lines.iter().enumerate() {
            writeln!(
                out,
                "{:>3} {:<16} {:<3} {:>8} {:>14} {:>14} {:>14}",
                idx + 1,
                line.selection.sku,
                line.selection.supplier.as_str(),
                line.selection.quantity,
                money(line.cost),
                money(line.unit_sell),
                money(line.line_total)
            )?;
        }

        writeln!(out, "{:>16} {}", "Subtotal", money(quote.subtotal))?;
        writeln!(out, "{:>16} {}", tax_label(&self.pricing), money(quote.tax))?;
        writeln!(out, "{:>16} {}", "Total", money(quote.total))?;

        let undefined = quote.undefined_lines();
        if undefined > 0 {
            writeln!(
                out,
                "{undefined} line(s) have an undefined price, shown as NaN."
            )?;
        }
        Ok(())
    }
}

fn export_quote(
    items: &Path,
    breakdown: &Path,
    selections: &[LineSelection],
    quote: &PricedQuote,
) -> anyhow::Result<()> {
    let file = File::create(items).with_context(|| format!("creating {}", items.display()))?;
    write_selections(BufWriter::new(file), selections)
        .with_context(|| format!("writing {}", items.display()))?;

    let file =
        File::create(breakdown).with_context(|| format!("creating {}", breakdown.display()))?;
    write_breakdown(BufWriter::new(file), &quote.lines)
        .with_context(|| format!("writing {}", breakdown.display()))?;

    info!(
        items = %items.display(),
        breakdown = %breakdown.display(),
        lines = selections.len(),
        "exported quote"
    );
    Ok(())
}

fn import_selections(path: &Path) -> anyhow::Result<Vec<LineSelection>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let lines = read_selections(io::BufReader::new(file))
        .with_context(|| format!("reading {}", path.display()))?;

    info!(path = %path.display(), count = lines.len(), "imported selections");
    Ok(lines)
}
