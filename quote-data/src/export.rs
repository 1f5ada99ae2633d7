//! CSV exports of a quote.
//!
//! Two independent files are produced:
//!
//! * **items** - the raw selections, which can be read back with
//!   [`read_selections`]:
//!   `sku,supplier,qty,override_unit_sell,home,laminate`
//! * **cost breakdown** - the priced lines:
//!   `sku,supplier,qty,cost,unit_sell,line_total,home,laminate`
//!
//! Decimals are written with their canonical `Display` form, so the output
//! does not depend on locale. Undefined money values are written as `NaN`.

use std::{
    io::{Read, Write},
    str::FromStr,
};

use quote_core::{Home, Laminate, LineSelection, PricedLine, Supplier};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

/// Column order of the items export.
pub const SELECTION_HEADERS: [&str; 6] = [
    "sku",
    "supplier",
    "qty",
    "override_unit_sell",
    "home",
    "laminate",
];

/// Column order of the cost breakdown export.
pub const BREAKDOWN_HEADERS: [&str; 8] = [
    "sku",
    "supplier",
    "qty",
    "cost",
    "unit_sell",
    "line_total",
    "home",
    "laminate",
];

/// Text written for an undefined money value.
pub const UNDEFINED: &str = "NaN";

/// Errors that can occur while writing or reading quote CSV files.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A cell of an items file could not be converted. `row` is 1-based
    /// (header = row 0).
    #[error("invalid {field} '{value}' on row {row}")]
    InvalidField {
        field: &'static str,
        value: String,
        row: usize,
    },
}

fn amount_cell(value: Option<Decimal>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| UNDEFINED.to_string())
}

fn csv_writer<W: Write>(writer: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer)
}

/// Writes the items export for `selections`, in list order.
pub fn write_selections<W: Write>(
    writer: W,
    selections: &[LineSelection],
) -> Result<(), ExportError> {
    let mut csv = csv_writer(writer);
    csv.write_record(SELECTION_HEADERS)?;

    for line in selections {
        let qty = line.quantity.to_string();
        csv.write_record([
            line.sku.as_str(),
            line.supplier.as_str(),
            qty.as_str(),
            line.override_str(),
            line.home_str(),
            line.laminate_str(),
        ])?;
    }

    csv.flush()?;
    Ok(())
}

/// Writes the cost breakdown export for `lines`, in list order.
pub fn write_breakdown<W: Write>(
    writer: W,
    lines: &[PricedLine],
) -> Result<(), ExportError> {
    let mut csv = csv_writer(writer);
    csv.write_record(BREAKDOWN_HEADERS)?;

    for line in lines {
        let selection = &line.selection;
        let qty = selection.quantity.to_string();
        let cost = amount_cell(line.cost);
        let unit_sell = amount_cell(line.unit_sell);
        let line_total = amount_cell(line.line_total);
        csv.write_record([
            selection.sku.as_str(),
            selection.supplier.as_str(),
            qty.as_str(),
            cost.as_str(),
            unit_sell.as_str(),
            line_total.as_str(),
            selection.home_str(),
            selection.laminate_str(),
        ])?;
    }

    csv.flush()?;
    Ok(())
}

/// Items export as an in-memory byte buffer.
pub fn selections_csv(selections: &[LineSelection]) -> Result<Vec<u8>, ExportError> {
    let mut buf = Vec::new();
    write_selections(&mut buf, selections)?;
    Ok(buf)
}

/// Cost breakdown export as an in-memory byte buffer.
pub fn breakdown_csv(lines: &[PricedLine]) -> Result<Vec<u8>, ExportError> {
    let mut buf = Vec::new();
    write_breakdown(&mut buf, lines)?;
    Ok(buf)
}

// ---------------------------------------------------------------------------
// Re-import of the items file
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SelectionRow {
    sku: String,
    supplier: String,
    qty: String,
    #[serde(default)]
    override_unit_sell: String,
    #[serde(default)]
    home: String,
    #[serde(default)]
    laminate: String,
}

fn optional<T>(
    field: &'static str,
    raw: &str,
    row: usize,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<Option<T>, ExportError> {
    if raw.is_empty() {
        return Ok(None);
    }
    parse(raw).map(Some).ok_or_else(|| ExportError::InvalidField {
        field,
        value: raw.to_string(),
        row,
    })
}

fn convert_row(
    row: SelectionRow,
    row_number: usize,
) -> Result<LineSelection, ExportError> {
    let invalid = |field: &'static str, value: &str| ExportError::InvalidField {
        field,
        value: value.to_string(),
        row: row_number,
    };

    let supplier = Supplier::parse(&row.supplier).ok_or_else(|| invalid("supplier", &row.supplier))?;
    let quantity = Decimal::from_str(&row.qty)
        .ok()
        .filter(|q| !q.is_sign_negative() || q.is_zero())
        .ok_or_else(|| invalid("qty", &row.qty))?;
    let home = optional("home", &row.home, row_number, Home::parse)?;
    let laminate = optional("laminate", &row.laminate, row_number, Laminate::parse)?;

    Ok(LineSelection::new(row.sku, supplier, quantity)
        .with_override(&row.override_unit_sell)
        .with_variant(home, laminate))
}

/// Reads an items file back into selections, in file order.
///
/// # Errors
///
/// * [`ExportError::Csv`] - malformed CSV or a missing required column.
/// * [`ExportError::InvalidField`] - an unknown supplier, home or laminate, or
///   a quantity that is not a non-negative decimal.
pub fn read_selections<R: Read>(reader: R) -> Result<Vec<LineSelection>, ExportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    reader
        .deserialize::<SelectionRow>()
        .enumerate()
        .map(|(idx, result)| convert_row(result?, idx + 1))
        .collect()
}
