//! Product catalog: store key → category → products.

use crate::{CatalogError, CatalogResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// A purchasable item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    /// Price in cedis.
    #[serde(default)]
    pub price: f64,
    /// Image path, relative to the storefront's asset root. May be empty.
    #[serde(default)]
    pub image: String,
}

impl Product {
    /// Price in pesewas, rounded to the nearest unit.
    pub fn price_minor(&self) -> i64 {
        to_minor(self.price)
    }
}

pub(crate) fn to_minor(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

/// Which categories of a store to list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl From<&str> for CategoryFilter {
    /// `"All"` selects every category; anything else names one.
    fn from(value: &str) -> Self {
        if value == "All" {
            CategoryFilter::All
        } else {
            CategoryFilter::Only(value.to_string())
        }
    }
}

impl From<Option<&str>> for CategoryFilter {
    fn from(value: Option<&str>) -> Self {
        value.map(CategoryFilter::from).unwrap_or_default()
    }
}

pub(crate) type Categories = BTreeMap<String, Vec<Product>>;

/// The full catalog, serialized as a plain nested JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    pub(crate) stores: BTreeMap<String, Categories>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> CatalogResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> CatalogResult<Self> {
        let contents = fs::read_to_string(path)?;
        let catalog = Self::from_json(&contents)?;
        debug!(path = %path.display(), stores = catalog.stores.len(), "Loaded catalog");
        Ok(catalog)
    }

    /// Load `path`, falling back to an empty catalog if it is missing or invalid.
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::load(path) {
            Ok(catalog) => catalog,
            Err(CatalogError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No catalog file, starting empty");
                Self::default()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not load catalog, starting empty");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> CatalogResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_pretty_json()?)?;
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }

    pub fn contains_store(&self, store: &str) -> bool {
        self.stores.contains_key(store)
    }

    pub fn stores(&self) -> Vec<&str> {
        self.stores.keys().map(String::as_str).collect()
    }

    pub fn categories(&self, store: &str) -> CatalogResult<Vec<&str>> {
        Ok(self.store(store)?.keys().map(String::as_str).collect())
    }

    /// Products of `store` under `filter`. An unknown category lists nothing.
    pub fn products(&self, store: &str, filter: &CategoryFilter) -> CatalogResult<Vec<&Product>> {
        let categories = self.store(store)?;
        Ok(match filter {
            CategoryFilter::All => categories.values().flatten().collect(),
            CategoryFilter::Only(name) => categories
                .get(name)
                .map(|products| products.iter().collect())
                .unwrap_or_default(),
        })
    }

    /// Case-insensitive substring match on product names.
    pub fn search(
        &self,
        store: &str,
        filter: &CategoryFilter,
        query: &str,
    ) -> CatalogResult<Vec<&Product>> {
        let needle = query.to_lowercase();
        Ok(self
            .products(store, filter)?
            .into_iter()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .collect())
    }

    pub fn find_product(&self, store: &str, id: &str) -> Option<&Product> {
        self.stores
            .get(store)?
            .values()
            .flatten()
            .find(|p| p.id == id)
    }

    fn store(&self, store: &str) -> CatalogResult<&Categories> {
        self.stores
            .get(store)
            .ok_or_else(|| CatalogError::StoreNotFound(store.to_string()))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tempfile::TempDir;

    pub(crate) const SAMPLE: &str = r#"{
        "shoprite": {
            "Dairy": [{"id": "shop-1", "name": "Fresh Milk (2L)", "price": 12.0, "image": "images/products/shoprite/milk.jpg"}],
            "Bakery": [{"id": "shop-2", "name": "Bread Loaf", "price": 10.0, "image": "images/products/shoprite/bread.jpg"}],
            "Fruits": [{"id": "shop-3", "name": "Bananas (1kg)", "price": 8.0, "image": "images/products/shoprite/bananas.jpg"}]
        },
        "citymall": {
            "Groceries": [
                {"id": "city-1", "name": "Golden Tree Chocolate (250g)", "price": 15.0, "image": ""},
                {"id": "city-3", "name": "Indomie Noodles (Pack)", "price": 3.5}
            ]
        }
    }"#;

    pub(crate) fn sample() -> Catalog {
        Catalog::from_json(SAMPLE).unwrap()
    }

    #[test]
    fn lists_stores_and_categories() {
        let catalog = sample();
        assert_eq!(catalog.stores(), vec!["citymall", "shoprite"]);
        assert_eq!(
            catalog.categories("shoprite").unwrap(),
            vec!["Bakery", "Dairy", "Fruits"]
        );
        assert!(matches!(
            catalog.categories("melcom"),
            Err(CatalogError::StoreNotFound(_))
        ));
    }

    #[test]
    fn products_by_filter() {
        let catalog = sample();
        assert_eq!(catalog.products("shoprite", &CategoryFilter::All).unwrap().len(), 3);

        let dairy = catalog
            .products("shoprite", &CategoryFilter::from("Dairy"))
            .unwrap();
        assert_eq!(dairy.len(), 1);
        assert_eq!(dairy[0].id, "shop-1");

        assert!(catalog
            .products("shoprite", &CategoryFilter::from("Meats"))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn search_ignores_case() {
        let catalog = sample();
        let hits = catalog
            .search("citymall", &CategoryFilter::All, "INDOMIE")
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "city-3");

        let all = catalog.search("citymall", &CategoryFilter::All, "").unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn find_product_across_categories() {
        let catalog = sample();
        assert_eq!(
            catalog.find_product("shoprite", "shop-3").map(|p| p.name.as_str()),
            Some("Bananas (1kg)")
        );
        assert!(catalog.find_product("shoprite", "city-1").is_none());
        assert!(catalog.find_product("nowhere", "shop-1").is_none());
    }

    #[test]
    fn missing_fields_default() {
        let catalog = sample();
        let noodles = catalog.find_product("citymall", "city-3").unwrap();
        assert_eq!(noodles.image, "");
        assert_eq!(noodles.price_minor(), 350);
    }

    #[test]
    fn load_or_empty_falls_back() {
        let temp = TempDir::new().unwrap();

        let missing = temp.path().join("products.json");
        assert!(Catalog::load_or_empty(&missing).is_empty());

        let invalid = temp.path().join("broken.json");
        fs::write(&invalid, "[1, 2, 3]").unwrap();
        assert!(Catalog::load_or_empty(&invalid).is_empty());
    }

    #[test]
    fn save_and_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("data").join("products.json");
        let catalog = sample();

        catalog.save(&path).unwrap();
        assert_eq!(Catalog::load(&path).unwrap(), catalog);
    }
}
