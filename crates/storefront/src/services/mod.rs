//! Business logic services for storefront.
//!
//! # Services
//!
//! - `cart` - Session-persisted cart store over the core cart contract

pub mod cart;

pub use cart::{CART_KEY, CartStorage, CartStorageError, CartStore, MemoryStorage};
