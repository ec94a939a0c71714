//! Cart line items and the cart mutation contract.
//!
//! A [`Cart`] is an ordered list of [`CartItem`]s, unique by id. It can only
//! be changed through its four operations, which keep two invariants:
//!
//! - every line has `quantity >= 1`
//! - no two lines share an id
//!
//! Decrement stops at 1. Only [`Cart::remove`] deletes a line.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::Product;
use crate::types::{Price, ProductId};

/// Error decoding a persisted cart.
#[derive(Debug, Error)]
#[error("malformed cart data: {0}")]
pub struct CartDecodeError(#[from] serde_json::Error);

/// A cart line, denormalized from the product it was created from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub image: String,
    pub quantity: u32,
}

impl CartItem {
    /// Create a line for `quantity` units of `product`.
    ///
    /// A zero quantity is raised to 1.
    #[must_use]
    pub fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            price: product.price,
            image: product.image.clone(),
            quantity: quantity.max(1),
        }
    }

    /// Price of this line (unit price times quantity).
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// The visitor's cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Look up a line by product id.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == id)
    }

    fn get_mut(&mut self, id: ProductId) -> Option<&mut CartItem> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    /// Add `item`. An existing line with the same id absorbs its quantity;
    /// otherwise the item is appended.
    pub fn add(&mut self, mut item: CartItem) {
        item.quantity = item.quantity.max(1);
        if let Some(existing) = self.get_mut(item.id) {
            existing.quantity = existing.quantity.saturating_add(item.quantity);
        } else {
            self.items.push(item);
        }
    }

    /// Remove the line with `id`. Returns whether a line was removed.
    pub fn remove(&mut self, id: ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }

    /// Increment the quantity of the line with `id` by one.
    /// Returns whether a line was found.
    pub fn increase(&mut self, id: ProductId) -> bool {
        self.get_mut(id).is_some_and(|item| {
            item.quantity = item.quantity.saturating_add(1);
            true
        })
    }

    /// Decrement the quantity of the line with `id` by one, never below 1.
    /// Returns whether a line was found.
    pub fn decrease(&mut self, id: ProductId) -> bool {
        self.get_mut(id).is_some_and(|item| {
            item.quantity = item.quantity.saturating_sub(1).max(1);
            true
        })
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of quantities over all lines.
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.items
            .iter()
            .fold(0_u32, |acc, item| acc.saturating_add(item.quantity))
    }

    /// Sum of line totals.
    #[must_use]
    pub fn total_price(&self) -> Price {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Serialize as a JSON array of lines.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Decode a JSON array of lines.
    ///
    /// Lines are re-added one by one, so stored data with duplicate ids or a
    /// zero quantity still yields a cart that holds the invariants.
    ///
    /// # Errors
    ///
    /// Returns `CartDecodeError` if `json` is not an array of cart lines.
    pub fn from_json(json: &str) -> Result<Self, CartDecodeError> {
        let items: Vec<CartItem> = serde_json::from_str(json)?;
        Ok(items.into_iter().collect())
    }
}

impl FromIterator<CartItem> for Cart {
    fn from_iter<I: IntoIterator<Item = CartItem>>(iter: I) -> Self {
        let mut cart = Self::new();
        for item in iter {
            cart.add(item);
        }
        cart
    }
}

impl<'de> Deserialize<'de> for Cart {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let items = Vec::<CartItem>::deserialize(deserializer)?;
        Ok(items.into_iter().collect())
    }
}
