//! Orchard Core - Shared catalog and cart library.
//!
//! This crate provides the domain logic shared by the Orchard components:
//! - `storefront` - Server-rendered landing page, store listing and cart
//! - `cli` - Offline catalog inspection tools
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP,
//! no session handling. Persistence of the cart and loading of the catalog
//! fixture live in the storefront crate.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for product ids and prices
//! - [`catalog`] - Product records and category selection
//! - [`filter`] - Facet filtering, price range and sorting of a catalog
//! - [`cart`] - Cart line items and the cart mutation contract

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod filter;
pub mod types;

pub use cart::{Cart, CartDecodeError, CartItem};
pub use catalog::{CatalogIssue, Category, Product};
pub use filter::{FacetOptions, FilterSelection, Listing, PriceRange, SortKey};
pub use types::*;
