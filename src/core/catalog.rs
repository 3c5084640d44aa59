use crate::domain::model::{CatalogEntry, Product};
use std::collections::HashMap;

/// Products keyed by identifier. The selection flag on each product is the only record of
/// what is selected; the selected subset is always derived by filtering.
#[derive(Debug, Clone, Default)]
pub struct ProductCatalog {
    products: Vec<Product>,
    index: HashMap<String, usize>,
}

impl ProductCatalog {
    /// Builds the catalog, skipping entries without an id or cost and repeated ids.
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Self {
        let mut catalog = Self::default();

        for (position, entry) in entries.into_iter().enumerate() {
            let id = match entry.id.map(|id| id.trim().to_string()) {
                Some(id) if !id.is_empty() => id,
                _ => {
                    tracing::debug!("Skipping catalog entry #{}: missing identifier", position);
                    continue;
                }
            };

            let Some(points) = entry.points else {
                tracing::debug!("Skipping catalog entry '{}': missing points", id);
                continue;
            };

            if catalog.index.contains_key(&id) {
                tracing::debug!("Skipping catalog entry '{}': duplicate identifier", id);
                continue;
            }

            catalog.index.insert(id.clone(), catalog.products.len());
            catalog.products.push(Product {
                id,
                points,
                name: entry.name.filter(|name| !name.trim().is_empty()),
                selected: false,
            });
        }

        catalog
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Product> {
        self.index.get(id).map(|&i| &self.products[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.products.iter()
    }

    pub fn selected(&self) -> impl Iterator<Item = &Product> {
        self.products.iter().filter(|p| p.selected)
    }

    pub fn selected_ids(&self) -> Vec<String> {
        self.selected().map(|p| p.id.clone()).collect()
    }

    pub fn selected_count(&self) -> usize {
        self.selected().count()
    }

    pub fn has_selection(&self) -> bool {
        self.products.iter().any(|p| p.selected)
    }

    pub fn total_selected_points(&self) -> u64 {
        self.selected().map(|p| p.points).sum()
    }

    /// Sets the flag and returns the previous value, or `None` for an unknown id.
    pub(crate) fn set_selected(&mut self, id: &str, selected: bool) -> Option<bool> {
        let &i = self.index.get(id)?;
        let product = &mut self.products[i];
        Some(std::mem::replace(&mut product.selected, selected))
    }

    /// Clears every flag and returns the ids that were selected.
    pub(crate) fn clear_selection(&mut self) -> Vec<String> {
        let mut cleared = Vec::new();
        for product in self.products.iter_mut().filter(|p| p.selected) {
            product.selected = false;
            cleared.push(product.id.clone());
        }
        cleared
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: Option<&str>, points: Option<u64>) -> CatalogEntry {
        CatalogEntry {
            id: id.map(str::to_string),
            points,
            name: None,
        }
    }

    #[test]
    fn test_malformed_and_duplicate_entries_are_skipped() {
        let catalog = ProductCatalog::from_entries(vec![
            entry(Some("a"), Some(3000)),
            entry(None, Some(100)),
            entry(Some("   "), Some(100)),
            entry(Some("b"), None),
            entry(Some("a"), Some(1)),
            entry(Some("c"), Some(0)),
        ]);

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("a").map(|p| p.points), Some(3000));
        assert!(catalog.get("b").is_none());
        assert_eq!(catalog.get("c").map(|p| p.points), Some(0));
    }

    #[test]
    fn test_selection_is_derived_from_flags() {
        let mut catalog = ProductCatalog::from_entries(vec![
            entry(Some("a"), Some(3000)),
            entry(Some("b"), Some(2000)),
            entry(Some("c"), Some(500)),
        ]);
        assert!(!catalog.has_selection());

        assert_eq!(catalog.set_selected("a", true), Some(false));
        assert_eq!(catalog.set_selected("c", true), Some(false));
        assert_eq!(catalog.set_selected("zzz", true), None);

        assert_eq!(catalog.selected_ids(), vec!["a", "c"]);
        assert_eq!(catalog.total_selected_points(), 3500);

        let cleared = catalog.clear_selection();
        assert_eq!(cleared, vec!["a", "c"]);
        assert!(!catalog.has_selection());
        assert_eq!(catalog.total_selected_points(), 0);
    }
}
