//! Per-visitor shop session.
//!
//! A `ShopSession` is created when a visitor's browser session starts and is
//! dropped when it expires. It owns the cart and the selected view section;
//! nothing else in the storefront holds mutable visitor state.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cart::Cart;
use crate::catalog::{Catalog, Category, Product};
use crate::types::ProductId;

/// The page currently shown to the visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    #[default]
    Desserts,
    Meat,
    About,
    Delivery,
    Contacts,
}

impl Section {
    /// Every section, in navigation order.
    pub const ALL: [Self; 5] = [
        Self::Desserts,
        Self::Meat,
        Self::About,
        Self::Delivery,
        Self::Contacts,
    ];

    /// URL slug, also the content page slug for informational sections.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Desserts => "desserts",
            Self::Meat => "meat",
            Self::About => "about",
            Self::Delivery => "delivery",
            Self::Contacts => "contacts",
        }
    }

    /// Navigation label.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Desserts => "Десерты",
            Self::Meat => "Растительное мясо",
            Self::About => "О нас",
            Self::Delivery => "Доставка",
            Self::Contacts => "Контакты",
        }
    }

    /// The catalog category listed by this section, if it is a catalog section.
    #[must_use]
    pub const fn category(self) -> Option<Category> {
        match self {
            Self::Desserts => Some(Category::Desserts),
            Self::Meat => Some(Category::PlantMeat),
            Self::About | Self::Delivery | Self::Contacts => None,
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// A section slug that names no section.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown section: {0}")]
pub struct UnknownSection(pub String);

impl FromStr for Section {
    type Err = UnknownSection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|section| section.slug() == s)
            .ok_or_else(|| UnknownSection(s.to_string()))
    }
}

/// A user action dispatched from the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    AddItem(ProductId),
    ChangeQuantity { product_id: ProductId, delta: i32 },
    RemoveItem(ProductId),
    SelectSection(Section),
}

/// Errors applying an intent.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("product {0} is not in the catalog")]
    UnknownProduct(ProductId),
}

/// Cart and selected section for one visitor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopSession {
    pub cart: Cart,
    pub section: Section,
}

impl ShopSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one intent.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::UnknownProduct` when adding an id the catalog
    /// does not contain. The session is left unchanged in that case.
    pub fn dispatch(&mut self, intent: Intent, catalog: &Catalog) -> Result<(), SessionError> {
        match intent {
            Intent::AddItem(product_id) => {
                let product = catalog
                    .get(product_id)
                    .ok_or(SessionError::UnknownProduct(product_id))?;
                self.cart.add(product);
            }
            Intent::ChangeQuantity { product_id, delta } => {
                self.cart.update_quantity(product_id, delta);
            }
            Intent::RemoveItem(product_id) => self.cart.remove(product_id),
            Intent::SelectSection(section) => self.section = section,
        }
        Ok(())
    }

    /// Products listed by the selected section; empty for informational pages.
    pub fn visible_products<'a>(&self, catalog: &'a Catalog) -> Vec<&'a Product> {
        self.section
            .category()
            .map(|category| catalog.list_by_category(category).collect())
            .unwrap_or_default()
    }
}
