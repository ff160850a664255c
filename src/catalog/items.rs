use super::{CatalogError, CatalogResult};
use std::collections::HashMap;
use std::path::Path;

/// Cosmetic item ids grouped by category, e.g. "Body" -> [23, 403, ...]
#[derive(Debug, Clone, Default)]
pub struct ItemCatalog {
    items: HashMap<String, Vec<u32>>,
}

impl ItemCatalog {
    pub fn load(path: &Path) -> CatalogResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::parse(&text)?;
        tracing::info!(
            path = %path.display(),
            categories = catalog.items.len(),
            items = catalog.len(),
            "Item catalog loaded"
        );
        Ok(catalog)
    }

    /// Parse `itemId,categoryName` rows
    pub fn parse(text: &str) -> CatalogResult<Self> {
        let mut items: HashMap<String, Vec<u32>> = HashMap::new();

        for (index, line) in text.lines().enumerate() {
            let line_no = index + 1;
            if line.trim().is_empty() {
                continue;
            }

            let mut fields = line.split(',').map(str::trim);
            let id = fields.next().unwrap_or_default();
            let category = fields
                .next()
                .filter(|c| !c.is_empty())
                .ok_or_else(|| CatalogError::MalformedRow {
                    line: line_no,
                    reason: "missing category".to_string(),
                })?;
            let id: u32 = id.parse().map_err(|_| CatalogError::MalformedRow {
                line: line_no,
                reason: format!("invalid item id '{}'", id),
            })?;

            items.entry(category.to_string()).or_default().push(id);
        }

        Ok(Self { items })
    }

    pub fn ids(&self, category: &str) -> Option<&[u32]> {
        self.items.get(category).map(Vec::as_slice)
    }

    /// Total number of items across all categories
    pub fn len(&self) -> usize {
        self.items.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
