use super::{CatalogError, CatalogResult};
use crate::types::BotDefinition;
use std::path::Path;

/// Finds bot definitions in a directory
pub trait BotScanner: Send + Sync {
    fn scan(&self, dir: &Path) -> CatalogResult<Vec<BotDefinition>>;
}

/// Scans for bot bundle `.cfg` files, recursing into subdirectories.
///
/// A bundle is an INI file with a `[Locations]` section holding a `name` key.
/// Other `.cfg` files (appearance configs, script configs) are skipped.
#[derive(Debug, Clone, Default)]
pub struct CfgDirectoryScanner;

impl BotScanner for CfgDirectoryScanner {
    fn scan(&self, dir: &Path) -> CatalogResult<Vec<BotDefinition>> {
        let mut bots = Vec::new();
        let mut pending = vec![dir.to_path_buf()];

        while let Some(current) = pending.pop() {
            let entries = std::fs::read_dir(&current).map_err(|source| CatalogError::Io {
                path: current.clone(),
                source,
            })?;

            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    pending.push(path);
                } else if path.extension().is_some_and(|ext| ext == "cfg") {
                    match std::fs::read_to_string(&path) {
                        Ok(text) => {
                            if let Some(name) = bundle_name(&text) {
                                bots.push(BotDefinition {
                                    name,
                                    config_path: path,
                                });
                            }
                        }
                        Err(e) => {
                            tracing::warn!(path = %path.display(), "Skipping unreadable cfg: {}", e)
                        }
                    }
                }
            }
        }

        Ok(bots)
    }
}

/// `name` from the `[Locations]` section, if present
fn bundle_name(text: &str) -> Option<String> {
    let mut in_locations = false;
    for line in text.lines().map(str::trim) {
        if line.starts_with('[') && line.ends_with(']') {
            in_locations = line[1..line.len() - 1].trim().eq_ignore_ascii_case("locations");
            continue;
        }
        if !in_locations {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            if key.trim().eq_ignore_ascii_case("name") {
                let value = value.trim();
                if !value.is_empty() {
                    return Some(value.to_string());
                }
            }
        }
    }
    None
}

/// Bot definitions sorted by display name; positions are the numbers viewers guess
#[derive(Debug, Clone, Default)]
pub struct BotCatalog {
    bots: Vec<BotDefinition>,
}

impl BotCatalog {
    pub fn load(scanner: &dyn BotScanner, dir: &Path) -> CatalogResult<Self> {
        let mut bots = scanner.scan(dir)?;
        bots.sort_by_key(|bot| bot.name.to_lowercase());
        tracing::debug!(dir = %dir.display(), count = bots.len(), "Bot catalog scanned");
        Ok(Self { bots })
    }

    pub fn get(&self, index: usize) -> Option<&BotDefinition> {
        self.bots.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BotDefinition> {
        self.bots.iter()
    }

    pub fn len(&self) -> usize {
        self.bots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bots.is_empty()
    }
}
