//! CSV loader for the two supplier price lists.
//!
//! ## CSV Format
//!
//! Each catalog must contain the following columns. Header names are matched
//! case-insensitively (they are lowercased on load), column order does not
//! matter, and any additional columns are ignored.
//!
//! | Column        | Type    | Notes                                          |
//! |---------------|---------|------------------------------------------------|
//! | `sku`         | string  | e.g. `B-100-HDB`                               |
//! | `description` | string  |                                                |
//! | `unit`        | string  | e.g. `pc`, `ft`, `set`                         |
//! | `price`       | decimal | cost price, must not be negative; blank = unpriced |
//!
//! ### Example
//!
//! ```csv
//! SKU,Description,Unit,Price
//! A-100,Base cabinet 600mm,pc,50.00
//! A-200,Wall cabinet 600mm,pc,42.50
//! ```
//!
//! Both catalogs are parsed before anything is returned or cached, so a
//! failure in either one leaves no partial result behind.

use std::{
    fs::{self, File},
    io::Read,
    path::{Path, PathBuf},
    str::FromStr,
    sync::Arc,
    time::UNIX_EPOCH,
};

use quote_core::{Catalog, CatalogEntry, CatalogPair, Supplier};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, info};

use crate::cache::{CacheKey, CatalogCache, SourceMode};

/// Columns every catalog must provide, after lowercasing.
pub const REQUIRED_COLUMNS: [&str; 4] = ["sku", "description", "unit", "price"];

// ---------------------------------------------------------------------------
// Public error type
// ---------------------------------------------------------------------------

/// Errors that can occur while loading a catalog pair.
#[derive(Debug, Error)]
pub enum CatalogLoadError {
    /// The catalog file could not be opened or read.
    #[error("{} could not be read: {source}", .side.label())]
    Io {
        side: Supplier,
        #[source]
        source: std::io::Error,
    },

    /// The content is not well-formed CSV (ragged rows, bad UTF-8, etc.).
    #[error("{} is not a valid CSV file: {source}", .side.label())]
    Parse {
        side: Supplier,
        #[source]
        source: csv::Error,
    },

    /// One or more required columns are absent. `missing` is sorted.
    #[error("{} is missing required columns: {}", .side.label(), .missing.join(", "))]
    MissingColumns { side: Supplier, missing: Vec<String> },

    /// A non-blank `price` cell is not a non-negative decimal. `row` is 1-based
    /// (header = row 0).
    #[error("{} has an invalid price '{value}' on row {row}", .side.label())]
    InvalidPrice {
        side: Supplier,
        row: usize,
        value: String,
    },
}

impl CatalogLoadError {
    pub fn side(&self) -> Supplier {
        match self {
            Self::Io { side, .. }
            | Self::Parse { side, .. }
            | Self::MissingColumns { side, .. }
            | Self::InvalidPrice { side, .. } => *side,
        }
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Positions of the required columns within a header row.
#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    sku: usize,
    description: usize,
    unit: usize,
    price: usize,
}

impl ColumnIndex {
    /// Resolves required columns from already-normalized headers. The first
    /// occurrence of a repeated header wins.
    fn resolve(
        side: Supplier,
        headers: &[String],
    ) -> Result<Self, CatalogLoadError> {
        let position = |name: &str| headers.iter().position(|h| h == name);

        match (
            position("sku"),
            position("description"),
            position("unit"),
            position("price"),
        ) {
            (Some(sku), Some(description), Some(unit), Some(price)) => Ok(Self {
                sku,
                description,
                unit,
                price,
            }),
            _ => {
                let mut missing: Vec<String> = REQUIRED_COLUMNS
                    .into_iter()
                    .filter(|name| position(*name).is_none())
                    .map(str::to_string)
                    .collect();
                missing.sort();
                Err(CatalogLoadError::MissingColumns { side, missing })
            }
        }
    }
}

/// Lowercases and trims a header cell, dropping a leading byte-order mark.
fn normalize_header(header: &str) -> String {
    header.trim_start_matches('\u{feff}').trim().to_lowercase()
}

/// A blank cell (already trimmed) is an unpriced item rather than an error.
fn parse_price(
    side: Supplier,
    row: usize,
    raw: &str,
) -> Result<Option<Decimal>, CatalogLoadError> {
    if raw.is_empty() {
        debug!(supplier = %side, row, "catalog row has no price");
        return Ok(None);
    }

    let invalid = || CatalogLoadError::InvalidPrice {
        side,
        row,
        value: raw.to_string(),
    };

    let price = Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|_| invalid())?;
    if price.is_sign_negative() && !price.is_zero() {
        return Err(invalid());
    }
    Ok(Some(price))
}

/// Parses one catalog from any CSV reader. Rows are returned in file order.
///
/// # Errors
///
/// * [`CatalogLoadError::Parse`] - the CSV is structurally invalid.
/// * [`CatalogLoadError::MissingColumns`] - a required column is absent.
/// * [`CatalogLoadError::InvalidPrice`] - a non-blank price is not a
///   non-negative decimal.
pub fn parse_catalog<R: Read>(
    side: Supplier,
    reader: R,
) -> Result<Catalog, CatalogLoadError> {
    let parse_err = |source| CatalogLoadError::Parse { side, source };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(false)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()
        .map_err(parse_err)?
        .iter()
        .map(normalize_header)
        .collect();
    let columns = ColumnIndex::resolve(side, &headers)?;

    let mut entries = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.map_err(parse_err)?;
        let row = idx + 1;
        let field = |i: usize| record.get(i).unwrap_or_default().to_string();

        entries.push(CatalogEntry {
            sku: field(columns.sku),
            description: field(columns.description),
            unit: field(columns.unit),
            price: parse_price(side, row, record.get(columns.price).unwrap_or_default())?,
        });
    }

    debug!(supplier = %side, entries = entries.len(), "parsed catalog");
    Ok(Catalog::new(entries))
}

// ---------------------------------------------------------------------------
// Sources and cached loading
// ---------------------------------------------------------------------------

/// Where to load the two catalogs from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    /// Raw contents of two uploaded files.
    Uploads { alpha: Vec<u8>, ben: Vec<u8> },
    /// Catalog files shipped alongside the tool.
    Bundled { alpha: PathBuf, ben: PathBuf },
}

impl CatalogSource {
    pub fn mode(&self) -> SourceMode {
        match self {
            Self::Uploads { .. } => SourceMode::Uploads,
            Self::Bundled { .. } => SourceMode::Bundled,
        }
    }

    /// Cache key for the current state of the source.
    ///
    /// Bundled files are keyed by path and modification time, so touching a
    /// file is enough to invalidate its cached parse.
    pub fn cache_key(&self) -> CacheKey {
        match self {
            Self::Uploads { alpha, ben } => {
                CacheKey::new(SourceMode::Uploads, alpha.clone(), ben.clone())
            }
            Self::Bundled { alpha, ben } => {
                CacheKey::new(SourceMode::Bundled, file_token(alpha), file_token(ben))
            }
        }
    }
}

/// Modification time of `path` in nanoseconds since the Unix epoch, or `0`
/// when the file is missing or has no usable timestamp.
pub fn modified_nanos(path: &Path) -> u128 {
    fs::metadata(path)
        .and_then(|meta| meta.modified())
        .ok()
        .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
        .map(|elapsed| elapsed.as_nanos())
        .unwrap_or(0)
}

fn file_token(path: &Path) -> Vec<u8> {
    format!("{}|{}", path.display(), modified_nanos(path)).into_bytes()
}

fn parse_file(
    side: Supplier,
    path: &Path,
) -> Result<Catalog, CatalogLoadError> {
    let file = File::open(path).map_err(|source| CatalogLoadError::Io { side, source })?;
    parse_catalog(side, file)
}

/// Loads catalog pairs through a [`CatalogCache`].
#[derive(Debug, Clone, Copy)]
pub struct CatalogLoader<'a> {
    cache: &'a CatalogCache,
}

impl<'a> CatalogLoader<'a> {
    pub fn new(cache: &'a CatalogCache) -> Self {
        Self { cache }
    }

    /// Returns the cached pair for the source's current key, parsing and
    /// caching it on a miss. Failed loads are not cached.
    pub fn load(
        &self,
        source: &CatalogSource,
    ) -> Result<Arc<CatalogPair>, CatalogLoadError> {
        let key = source.cache_key();
        if let Some(catalogs) = self.cache.get(&key) {
            debug!(mode = ?key.mode, "catalog cache hit");
            return Ok(catalogs);
        }

        debug!(mode = ?key.mode, "catalog cache miss");
        let catalogs = load_uncached(source)?;
        info!(
            mode = ?key.mode,
            alpha = catalogs.alpha.len(),
            ben = catalogs.ben.len(),
            "loaded catalogs"
        );
        Ok(self.cache.insert(key, catalogs))
    }
}

/// Parses both catalogs without touching any cache.
pub fn load_uncached(source: &CatalogSource) -> Result<CatalogPair, CatalogLoadError> {
    let (alpha, ben) = match source {
        CatalogSource::Uploads { alpha, ben } => (
            parse_catalog(Supplier::Alpha, alpha.as_slice())?,
            parse_catalog(Supplier::Ben, ben.as_slice())?,
        ),
        CatalogSource::Bundled { alpha, ben } => (
            parse_file(Supplier::Alpha, alpha)?,
            parse_file(Supplier::Ben, ben)?,
        ),
    };
    Ok(CatalogPair::new(alpha, ben))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
