pub mod cache;
pub mod export;
pub mod loader;

pub use cache::{CacheKey, CatalogCache, SourceMode};
pub use export::{
    ExportError, breakdown_csv, read_selections, selections_csv, write_breakdown,
    write_selections,
};
pub use loader::{CatalogLoadError, CatalogLoader, CatalogSource, load_uncached, parse_catalog};
