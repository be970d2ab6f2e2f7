//! Catalog browsing and maintenance commands.

use std::path::Path;

use anyhow::Context;
use storefront::{format_ghs, Catalog, CatalogError, CategoryFilter};
use tracing::info;

/// One change to the catalog file.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogEdit {
    AddStore { key: String },
    RenameStore { from: String, to: String },
    RemoveStore { key: String },
    AddCategory { store: String, name: String },
    RenameCategory { store: String, from: String, to: String },
    RemoveCategory { store: String, name: String },
    AddProduct { store: String, category: String },
    UpdateProduct {
        store: String,
        category: String,
        id: String,
        name: String,
        price: f64,
        image: String,
    },
    RemoveProduct { store: String, category: String, id: String },
}

pub fn list_stores(catalog_path: &Path) -> anyhow::Result<()> {
    let catalog = Catalog::load_or_empty(catalog_path);
    if catalog.is_empty() {
        println!("No stores (catalog: {})", catalog_path.display());
        return Ok(());
    }
    for store in catalog.stores() {
        println!("{}", store);
    }
    Ok(())
}

pub fn list_products(
    catalog_path: &Path,
    store: &str,
    category: Option<&str>,
    query: Option<&str>,
) -> anyhow::Result<()> {
    let catalog = Catalog::load_or_empty(catalog_path);
    let filter = CategoryFilter::from(category);
    let products = catalog.search(store, &filter, query.unwrap_or(""))?;

    if products.is_empty() {
        println!("No products found");
        return Ok(());
    }
    for product in products {
        println!(
            "{:<12} {:<40} {}",
            product.id,
            product.name,
            format_ghs(product.price_minor())
        );
    }
    Ok(())
}

/// Validate `source` as a catalog and write it to `catalog_path`.
pub fn import_catalog(catalog_path: &Path, source: &Path) -> anyhow::Result<()> {
    let json = std::fs::read_to_string(source)
        .with_context(|| format!("reading {}", source.display()))?;

    let mut catalog = Catalog::load_or_empty(catalog_path);
    catalog.replace_all(&json).context("invalid catalog JSON")?;
    catalog.save(catalog_path)?;

    info!(
        path = %catalog_path.display(),
        stores = catalog.stores().len(),
        "Catalog imported"
    );
    println!("Imported {} store(s)", catalog.stores().len());
    Ok(())
}

/// Apply `edit` to the catalog file and save it.
///
/// A missing file counts as an empty catalog. An unreadable one is an error,
/// so an edit never overwrites a file it could not parse.
pub fn edit_catalog(catalog_path: &Path, edit: CatalogEdit) -> anyhow::Result<()> {
    let mut catalog = match Catalog::load(catalog_path) {
        Ok(catalog) => catalog,
        Err(CatalogError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Catalog::new(),
        Err(e) => {
            return Err(e).with_context(|| format!("loading catalog {}", catalog_path.display()))
        }
    };

    let message = match &edit {
        CatalogEdit::AddStore { key } => {
            catalog.add_store(key)?;
            format!("Added store {}", key.trim())
        }
        CatalogEdit::RenameStore { from, to } => {
            catalog.rename_store(from, to)?;
            format!("Renamed store {} to {}", from, to.trim())
        }
        CatalogEdit::RemoveStore { key } => {
            catalog.remove_store(key)?;
            format!("Removed store {}", key)
        }
        CatalogEdit::AddCategory { store, name } => {
            catalog.add_category(store, name)?;
            format!("Added category {} to {}", name.trim(), store)
        }
        CatalogEdit::RenameCategory { store, from, to } => {
            catalog.rename_category(store, from, to)?;
            format!("Renamed category {} to {}", from, to.trim())
        }
        CatalogEdit::RemoveCategory { store, name } => {
            catalog.remove_category(store, name)?;
            format!("Removed category {} from {}", name, store)
        }
        CatalogEdit::AddProduct { store, category } => {
            let id = catalog.add_product(store, category)?;
            format!("Added product {}", id)
        }
        CatalogEdit::UpdateProduct {
            store,
            category,
            id,
            name,
            price,
            image,
        } => {
            catalog.update_product(store, category, id, name, *price, image)?;
            format!("Updated product {}", id)
        }
        CatalogEdit::RemoveProduct { store, category, id } => {
            catalog.remove_product(store, category, id)?;
            format!("Removed product {}", id)
        }
    };

    catalog.save(catalog_path)?;
    info!(path = %catalog_path.display(), ?edit, "Catalog edited");
    println!("{}", message);
    Ok(())
}

pub fn export_catalog(catalog_path: &Path) -> anyhow::Result<()> {
    let catalog = Catalog::load_or_empty(catalog_path);
    println!("{}", catalog.to_pretty_json()?);
    Ok(())
}
