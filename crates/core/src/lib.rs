//! ishq Core - Domain types for the ishq vegan bakery storefront.
//!
//! This crate holds everything the storefront knows about products and carts:
//! - [`types`] - Newtype IDs and prices
//! - [`catalog`] - The fixed, read-only product list
//! - [`cart`] - Per-session cart with quantity handling and totals
//! - [`session`] - The per-visitor shop session and the intents applied to it
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no HTTP, no
//! clocks. Every cart operation is synchronous and total.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod session;
pub mod types;

pub use cart::{Cart, CartLine};
pub use catalog::{Catalog, CatalogError, Category, Product};
pub use session::{Intent, Section, SessionError, ShopSession, UnknownSection};
pub use types::*;
