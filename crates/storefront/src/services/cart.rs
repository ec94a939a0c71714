//! Cart store with pluggable persistence.
//!
//! [`CartStore`] wraps an [`orchard_core::Cart`] together with a
//! [`CartStorage`] slot. Every mutation serializes the whole cart and writes
//! it under [`CART_KEY`]. Opening a store reads that slot back; unreadable or
//! malformed data is logged and replaced by an empty cart.
//!
//! The storefront stores carts in the visitor's session. Tests use
//! [`MemoryStorage`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use orchard_core::{Cart, CartItem, ProductId};
use thiserror::Error;
use tower_sessions::Session;
use tracing::{debug, warn};

/// Storage key holding the serialized cart.
pub const CART_KEY: &str = "cart";

/// Errors from cart persistence.
#[derive(Debug, Error)]
pub enum CartStorageError {
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
    #[error("failed to serialize cart: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Key-value slot a cart is persisted into.
#[async_trait]
pub trait CartStorage: Send + Sync {
    /// Read the raw value stored under `key`.
    async fn read(&self, key: &str) -> Result<Option<String>, CartStorageError>;

    /// Replace the value stored under `key`.
    async fn write(&self, key: &str, value: String) -> Result<(), CartStorageError>;
}

#[async_trait]
impl CartStorage for Session {
    async fn read(&self, key: &str) -> Result<Option<String>, CartStorageError> {
        Ok(self.get::<String>(key).await?)
    }

    async fn write(&self, key: &str, value: String) -> Result<(), CartStorageError> {
        Ok(self.insert(key, value).await?)
    }
}

/// In-memory storage. Clones share the same slots.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slots: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    /// Create storage with `value` preloaded under `key`.
    #[must_use]
    pub fn with_value(key: &str, value: impl Into<String>) -> Self {
        let storage = Self::default();
        storage
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.into());
        storage
    }

    /// Current raw value under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}

#[async_trait]
impl CartStorage for MemoryStorage {
    async fn read(&self, key: &str) -> Result<Option<String>, CartStorageError> {
        Ok(self.get(key))
    }

    async fn write(&self, key: &str, value: String) -> Result<(), CartStorageError> {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value);
        Ok(())
    }
}

/// A cart bound to its storage slot.
///
/// The cart can only be changed through the four operations below, each of
/// which persists the result before returning.
#[derive(Debug)]
pub struct CartStore<S> {
    storage: S,
    cart: Cart,
}

impl<S: CartStorage> CartStore<S> {
    /// Open the cart persisted in `storage`.
    ///
    /// Never fails: a missing slot, a storage error or malformed data all
    /// produce an empty cart.
    pub async fn open(storage: S) -> Self {
        let cart = match storage.read(CART_KEY).await {
            Ok(Some(raw)) => Cart::from_json(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "Discarding malformed stored cart");
                Cart::new()
            }),
            Ok(None) => Cart::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read stored cart");
                Cart::new()
            }
        };

        Self { storage, cart }
    }

    /// The current cart.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Add `item`, merging quantities with an existing line of the same id.
    ///
    /// # Errors
    ///
    /// Returns `CartStorageError` if the cart cannot be persisted.
    pub async fn add_to_cart(&mut self, item: CartItem) -> Result<&Cart, CartStorageError> {
        debug!(id = %item.id, quantity = item.quantity, "Adding to cart");
        self.cart.add(item);
        self.persist().await
    }

    /// Remove the line with `id`; no-op if absent.
    ///
    /// # Errors
    ///
    /// Returns `CartStorageError` if the cart cannot be persisted.
    pub async fn remove_from_cart(&mut self, id: ProductId) -> Result<&Cart, CartStorageError> {
        if !self.cart.remove(id) {
            debug!(%id, "Remove of missing cart line ignored");
        }
        self.persist().await
    }

    /// Increment the quantity of the line with `id`; no-op if absent.
    ///
    /// # Errors
    ///
    /// Returns `CartStorageError` if the cart cannot be persisted.
    pub async fn increase_qty(&mut self, id: ProductId) -> Result<&Cart, CartStorageError> {
        self.cart.increase(id);
        self.persist().await
    }

    /// Decrement the quantity of the line with `id`, stopping at 1; no-op if
    /// absent.
    ///
    /// # Errors
    ///
    /// Returns `CartStorageError` if the cart cannot be persisted.
    pub async fn decrease_qty(&mut self, id: ProductId) -> Result<&Cart, CartStorageError> {
        self.cart.decrease(id);
        self.persist().await
    }

    async fn persist(&self) -> Result<&Cart, CartStorageError> {
        let json = self.cart.to_json()?;
        self.storage.write(CART_KEY, json).await?;
        Ok(&self.cart)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use orchard_core::Price;

    use super::*;

    fn item(id: i64, price: i64, quantity: u32) -> CartItem {
        CartItem {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            price: Price::from_dollars(price),
            image: format!("/static/images/{id}.png"),
            quantity,
        }
    }

    #[tokio::test]
    async fn test_open_empty_storage() {
        let store = CartStore::open(MemoryStorage::default()).await;
        assert!(store.cart().is_empty());
    }

    #[tokio::test]
    async fn test_open_malformed_storage_is_empty() {
        let storage = MemoryStorage::with_value(CART_KEY, "{definitely not a cart");
        let store = CartStore::open(storage).await;
        assert!(store.cart().is_empty());
    }

    #[tokio::test]
    async fn test_every_mutation_persists() {
        let storage = MemoryStorage::default();
        let mut store = CartStore::open(storage.clone()).await;

        store.add_to_cart(item(5, 100, 1)).await.unwrap();
        let stored = Cart::from_json(&storage.get(CART_KEY).unwrap()).unwrap();
        assert_eq!(stored.items()[0].quantity, 1);

        store.increase_qty(ProductId::new(5)).await.unwrap();
        let stored = Cart::from_json(&storage.get(CART_KEY).unwrap()).unwrap();
        assert_eq!(stored.items()[0].quantity, 2);

        store.decrease_qty(ProductId::new(5)).await.unwrap();
        let stored = Cart::from_json(&storage.get(CART_KEY).unwrap()).unwrap();
        assert_eq!(stored.items()[0].quantity, 1);

        store.remove_from_cart(ProductId::new(5)).await.unwrap();
        let stored = Cart::from_json(&storage.get(CART_KEY).unwrap()).unwrap();
        assert!(stored.is_empty());
    }

    #[tokio::test]
    async fn test_merge_scenario_survives_reopen() {
        let storage = MemoryStorage::default();
        let mut store = CartStore::open(storage.clone()).await;
        store.add_to_cart(item(5, 100, 1)).await.unwrap();
        let cart = store.add_to_cart(item(5, 100, 2)).await.unwrap();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.total_price(), Price::from_dollars(300));

        let reopened = CartStore::open(storage).await;
        assert_eq!(reopened.cart(), store.cart());
        assert_eq!(reopened.cart().items()[0].quantity, 3);
    }

    #[tokio::test]
    async fn test_decrease_at_one_keeps_line() {
        let mut store = CartStore::open(MemoryStorage::default()).await;
        store.add_to_cart(item(1, 10, 1)).await.unwrap();

        let cart = store.decrease_qty(ProductId::new(1)).await.unwrap();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].quantity, 1);
    }

    #[tokio::test]
    async fn test_missing_ids_are_noops() {
        let mut store = CartStore::open(MemoryStorage::default()).await;
        store.add_to_cart(item(1, 10, 2)).await.unwrap();
        let before = store.cart().clone();

        store.increase_qty(ProductId::new(2)).await.unwrap();
        store.decrease_qty(ProductId::new(2)).await.unwrap();
        store.remove_from_cart(ProductId::new(2)).await.unwrap();
        assert_eq!(store.cart(), &before);
    }
}
