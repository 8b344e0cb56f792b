//! # In-Memory Stores
//!
//! Shared state behind cloneable handles. Every clone of a store sees the
//! same map; the services and the document worker each hold one.
//!
//! Closures passed to [`Collection::update`] run under the write lock, so
//! a read-modify-write on one entity is atomic with respect to every other
//! handle.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rackcpq_core::{Product, ProductCatalog, ProductType, Quote, RackConfiguration};

// =============================================================================
// Generic Collection
// =============================================================================

/// Keyed collection of `T` shared across handles.
#[derive(Debug)]
pub struct Collection<T> {
    inner: Arc<RwLock<HashMap<String, T>>>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Collection {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Collection {
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl<T: Clone> Collection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, T>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, T>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Inserts or replaces the entry under `id`.
    pub fn insert(&self, id: impl Into<String>, value: T) {
        self.write().insert(id.into(), value);
    }

    pub fn get(&self, id: &str) -> Option<T> {
        self.read().get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.read().contains_key(id)
    }

    /// Every entry matching `pred`, in no particular order.
    pub fn find<P>(&self, pred: P) -> Vec<T>
    where
        P: Fn(&T) -> bool,
    {
        self.read().values().filter(|v| pred(v)).cloned().collect()
    }

    pub fn find_one<P>(&self, pred: P) -> Option<T>
    where
        P: Fn(&T) -> bool,
    {
        self.read().values().find(|v| pred(v)).cloned()
    }

    /// Runs `f` on the entry under the write lock. `None` when `id` is absent.
    pub fn update<R, F>(&self, id: &str, f: F) -> Option<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        self.write().get_mut(id).map(f)
    }

    /// Runs `f` on every entry under one write lock, counting the `true`s.
    pub fn update_where<F>(&self, mut f: F) -> usize
    where
        F: FnMut(&mut T) -> bool,
    {
        self.write().values_mut().map(|v| f(v)).filter(|changed| *changed).count()
    }

    pub fn remove(&self, id: &str) -> Option<T> {
        self.write().remove(id)
    }

    pub fn values(&self) -> Vec<T> {
        self.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

pub type ConfigurationStore = Collection<RackConfiguration>;
pub type QuoteStore = Collection<Quote>;

// =============================================================================
// Catalog
// =============================================================================

/// Product catalog keyed by SKU.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    products: Collection<Product>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a product by SKU. Returns true when it was new.
    pub fn upsert(&self, product: Product) -> bool {
        let is_new = !self.products.contains(&product.sku);
        self.products.insert(product.sku.clone(), product);
        is_new
    }

    pub fn get(&self, sku: &str) -> Option<Product> {
        self.products.get(sku)
    }

    /// Drops a product from the catalog. Existing quotes keep their copy.
    pub fn remove(&self, sku: &str) -> Option<Product> {
        self.products.remove(sku)
    }

    /// Active products sorted by SKU.
    pub fn list_all(&self) -> Vec<Product> {
        sorted(self.products.find(|p| p.active))
    }

    pub fn list_by_type(&self, product_type: ProductType) -> Vec<Product> {
        sorted(
            self.products
                .find(|p| p.active && p.product_type == product_type),
        )
    }

    /// Case-insensitive substring match on SKU or name.
    pub fn search(&self, term: &str) -> Vec<Product> {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return self.list_all();
        }
        sorted(self.products.find(|p| {
            p.active
                && (p.sku.to_lowercase().contains(&term) || p.name.to_lowercase().contains(&term))
        }))
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

fn sorted(mut products: Vec<Product>) -> Vec<Product> {
    products.sort_by(|a, b| a.sku.cmp(&b.sku));
    products
}

impl ProductCatalog for InMemoryCatalog {
    fn get_product_by_sku(&self, sku: &str) -> Option<Product> {
        self.products.get(sku)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rackcpq_core::Money;

    fn catalog() -> InMemoryCatalog {
        let catalog = InMemoryCatalog::new();
        catalog.upsert(Product::new(
            "SW-24",
            "Catalyst 24-port",
            ProductType::Switch,
            Money::from_cents(459_999),
        ));
        catalog.upsert(Product::new(
            "PSU-1000",
            "1000W Platinum",
            ProductType::Psu,
            Money::from_cents(59_999),
        ));
        catalog.upsert(Product::new(
            "SW-48",
            "Catalyst 48-port",
            ProductType::Switch,
            Money::from_cents(729_999),
        ));
        catalog
    }

    #[test]
    fn test_clones_share_state() {
        let store: Collection<u32> = Collection::new();
        let other = store.clone();
        store.insert("a", 1);
        assert_eq!(other.get("a"), Some(1));
        let bumped = other.update("a", |v| {
            *v += 1;
            *v
        });
        assert_eq!(bumped, Some(2));
        assert_eq!(store.get("a"), Some(2));
        assert_eq!(store.update("missing", |v| *v), None);
    }

    #[test]
    fn test_update_where_counts_changes() {
        let store: Collection<u32> = Collection::new();
        for (id, v) in [("a", 1), ("b", 5), ("c", 9)] {
            store.insert(id, v);
        }
        let changed = store.update_where(|v| {
            if *v > 3 {
                *v = 0;
                true
            } else {
                false
            }
        });
        assert_eq!(changed, 2);
        assert_eq!(store.find(|v| *v == 0).len(), 2);
        assert_eq!(store.remove("a"), Some(1));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_catalog_upsert_and_lookup() {
        let catalog = catalog();
        assert_eq!(catalog.len(), 3);
        assert!(!catalog.upsert(Product::new(
            "SW-24",
            "Renamed",
            ProductType::Switch,
            Money::from_cents(1),
        )));
        assert_eq!(catalog.len(), 3);
        assert_eq!(
            catalog.get_product_by_sku("SW-24").map(|p| p.name),
            Some("Renamed".to_string())
        );
        assert!(catalog.get_product_by_sku("NOPE").is_none());
    }

    #[test]
    fn test_catalog_listing() {
        let catalog = catalog();
        let switches: Vec<String> = catalog
            .list_by_type(ProductType::Switch)
            .into_iter()
            .map(|p| p.sku)
            .collect();
        assert_eq!(switches, vec!["SW-24", "SW-48"]);

        let found: Vec<String> = catalog.search("platinum").into_iter().map(|p| p.sku).collect();
        assert_eq!(found, vec!["PSU-1000"]);
        assert_eq!(catalog.search("sw-").len(), 2);
        assert_eq!(catalog.search("  ").len(), 3);
    }
}
