//! Lookup tables loaded from disk: cosmetic items and bot bundles

mod bots;
mod items;

pub use bots::{BotCatalog, BotScanner, CfgDirectoryScanner};
pub use items::ItemCatalog;

use std::path::PathBuf;

pub type CatalogResult<T> = Result<T, CatalogError>;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed row {line}: {reason}")]
    MalformedRow { line: usize, reason: String },

    #[error("No bots found in {0}")]
    NoBots(PathBuf),
}
