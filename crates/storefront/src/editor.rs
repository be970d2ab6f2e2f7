//! In-place catalog editing.
//!
//! These are the maintenance operations behind the catalog admin screen. All
//! of them mutate the in-memory catalog; call [`Catalog::save`] to persist.

use crate::catalog::Categories;
use crate::{Catalog, CatalogError, CatalogResult, Product};

/// Name given to products created by [`Catalog::add_product`].
pub const NEW_PRODUCT_NAME: &str = "New Product";

impl Catalog {
    pub fn add_store(&mut self, key: &str) -> CatalogResult<()> {
        let key = validate_store_key(key)?;
        if self.stores.contains_key(key) {
            return Err(CatalogError::StoreExists(key.to_string()));
        }
        self.stores.insert(key.to_string(), Categories::new());
        Ok(())
    }

    /// Rename a store, keeping its categories. Renaming to the same key is a no-op.
    pub fn rename_store(&mut self, from: &str, to: &str) -> CatalogResult<()> {
        let to = validate_store_key(to)?;
        if !self.stores.contains_key(from) {
            return Err(CatalogError::StoreNotFound(from.to_string()));
        }
        if from == to {
            return Ok(());
        }
        if self.stores.contains_key(to) {
            return Err(CatalogError::StoreExists(to.to_string()));
        }
        let categories = self
            .stores
            .remove(from)
            .ok_or_else(|| CatalogError::StoreNotFound(from.to_string()))?;
        self.stores.insert(to.to_string(), categories);
        Ok(())
    }

    /// Remove a store with all its categories and products.
    pub fn remove_store(&mut self, key: &str) -> CatalogResult<()> {
        self.stores
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| CatalogError::StoreNotFound(key.to_string()))
    }

    pub fn add_category(&mut self, store: &str, name: &str) -> CatalogResult<()> {
        let name = validate_name(name)?;
        let categories = self.store_mut(store)?;
        if categories.contains_key(name) {
            return Err(CatalogError::CategoryExists {
                store: store.to_string(),
                category: name.to_string(),
            });
        }
        categories.insert(name.to_string(), Vec::new());
        Ok(())
    }

    pub fn rename_category(&mut self, store: &str, from: &str, to: &str) -> CatalogResult<()> {
        let to = validate_name(to)?;
        let categories = self.store_mut(store)?;
        if !categories.contains_key(from) {
            return Err(category_not_found(store, from));
        }
        if from == to {
            return Ok(());
        }
        if categories.contains_key(to) {
            return Err(CatalogError::CategoryExists {
                store: store.to_string(),
                category: to.to_string(),
            });
        }
        let products = categories
            .remove(from)
            .ok_or_else(|| category_not_found(store, from))?;
        categories.insert(to.to_string(), products);
        Ok(())
    }

    pub fn remove_category(&mut self, store: &str, name: &str) -> CatalogResult<()> {
        self.store_mut(store)?
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| category_not_found(store, name))
    }

    /// Append a placeholder product and return its generated id.
    ///
    /// Ids are the first three characters of the store key, a dash, and a
    /// random seven-character suffix.
    pub fn add_product(&mut self, store: &str, category: &str) -> CatalogResult<String> {
        let id = generate_product_id(store);
        let products = self.category_mut(store, category)?;
        products.push(Product {
            id: id.clone(),
            name: NEW_PRODUCT_NAME.to_string(),
            price: 0.0,
            image: String::new(),
        });
        Ok(id)
    }

    /// Overwrite a product's editable fields. Negative or non-finite prices become 0.
    pub fn update_product(
        &mut self,
        store: &str,
        category: &str,
        id: &str,
        name: &str,
        price: f64,
        image: &str,
    ) -> CatalogResult<()> {
        let name = validate_name(name)?;
        let product = self
            .category_mut(store, category)?
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| CatalogError::ProductNotFound(id.to_string()))?;

        product.name = name.to_string();
        product.price = if price.is_finite() && price > 0.0 { price } else { 0.0 };
        product.image = image.trim().to_string();
        Ok(())
    }

    pub fn remove_product(&mut self, store: &str, category: &str, id: &str) -> CatalogResult<()> {
        let products = self.category_mut(store, category)?;
        let pos = products
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| CatalogError::ProductNotFound(id.to_string()))?;
        products.remove(pos);
        Ok(())
    }

    /// Replace the whole catalog from JSON. On error the catalog is unchanged.
    pub fn replace_all(&mut self, json: &str) -> CatalogResult<()> {
        *self = Catalog::from_json(json)?;
        Ok(())
    }

    pub fn to_pretty_json(&self) -> CatalogResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn store_mut(&mut self, store: &str) -> CatalogResult<&mut Categories> {
        self.stores
            .get_mut(store)
            .ok_or_else(|| CatalogError::StoreNotFound(store.to_string()))
    }

    fn category_mut(&mut self, store: &str, category: &str) -> CatalogResult<&mut Vec<Product>> {
        self.store_mut(store)?
            .get_mut(category)
            .ok_or_else(|| category_not_found(store, category))
    }
}

fn validate_store_key(key: &str) -> CatalogResult<&str> {
    let key = key.trim();
    if key.is_empty() || key.chars().any(char::is_whitespace) {
        return Err(CatalogError::InvalidKey(format!(
            "store key must be non-empty with no spaces: {:?}",
            key
        )));
    }
    Ok(key)
}

fn validate_name(name: &str) -> CatalogResult<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CatalogError::InvalidKey("name must not be blank".to_string()));
    }
    Ok(name)
}

fn category_not_found(store: &str, category: &str) -> CatalogError {
    CatalogError::CategoryNotFound {
        store: store.to_string(),
        category: category.to_string(),
    }
}

fn generate_product_id(store: &str) -> String {
    let prefix: String = store.chars().take(3).collect();
    let suffix: String = uuid::Uuid::new_v4().simple().to_string().chars().take(7).collect();
    format!("{}-{}", prefix, suffix)
}
