//! The fixed product catalog.
//!
//! Products are created once at startup and never mutated. Lookups are
//! linear scans; the catalog holds a few dozen entries at most.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Price, ProductId};

/// Product category used to split the catalog into sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Vegan cakes.
    Desserts,
    /// Plant-based meat products.
    #[serde(rename = "meat")]
    PlantMeat,
}

impl Category {
    /// Every category, in navigation order.
    pub const ALL: [Self; 2] = [Self::Desserts, Self::PlantMeat];

    /// Human-readable title shown in navigation and section headings.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Desserts => "Десерты",
            Self::PlantMeat => "Растительное мясо",
        }
    }

    /// Tagline shown under the section heading.
    #[must_use]
    pub const fn tagline(self) -> &'static str {
        match self {
            Self::Desserts => "Веганские торты, созданные с любовью и вдохновением",
            Self::PlantMeat => "Полезная альтернатива мясу на растительной основе",
        }
    }
}

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub description: String,
    /// Opaque image reference, resolved by the rendering layer.
    pub image: String,
    pub category: Option<Category>,
}

impl Product {
    /// Build a product from its parts.
    #[must_use]
    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        price: Price,
        description: impl Into<String>,
        image: impl Into<String>,
        category: Option<Category>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            description: description.into(),
            image: image.into(),
            category,
        }
    }
}

/// Errors building a catalog.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("duplicate product id: {0}")]
    DuplicateProductId(ProductId),
}

/// Read-only list of products in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate product ids.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::DuplicateProductId` for the first repeated id.
    pub fn new(products: Vec<Product>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(products.len());
        for product in &products {
            if !seen.insert(product.id) {
                return Err(CatalogError::DuplicateProductId(product.id));
            }
        }
        Ok(Self { products })
    }

    /// The bakery's product list.
    #[must_use]
    pub fn bakery() -> Self {
        const CDN: &str = "https://cdn.poehali.dev/projects/6c4cef6e-3f0c-4613-8a3b-b439a9576d0a/files";
        let chocolate = format!("{CDN}/c56e6950-f13e-4ae3-b96b-94842aedfdb3.jpg");
        let raspberry = format!("{CDN}/5ec246e2-193e-4ba1-8505-dc6ede7d9065.jpg");
        let lemon = format!("{CDN}/5f878890-9a50-43d1-aae0-e66529ff4288.jpg");
        let desserts = Some(Category::Desserts);
        let meat = Some(Category::PlantMeat);

        Self {
            products: vec![
                Product::new(
                    ProductId::new(1),
                    "Шоколадный вихрь",
                    Price::from_major(2500),
                    "Нежный шоколадный торт с кремом из кешью и какао",
                    chocolate.clone(),
                    desserts,
                ),
                Product::new(
                    ProductId::new(2),
                    "Малиновая медитация",
                    Price::from_major(2800),
                    "Воздушный бисквит с малиновым муссом и фисташками",
                    raspberry.clone(),
                    desserts,
                ),
                Product::new(
                    ProductId::new(3),
                    "Лимонное просветление",
                    Price::from_major(2400),
                    "Освежающий лимонный торт с кокосовым кремом",
                    lemon.clone(),
                    desserts,
                ),
                Product::new(
                    ProductId::new(4),
                    "Ягодное вращение",
                    Price::from_major(3000),
                    "Ассорти из лесных ягод с ванильным кремом",
                    raspberry,
                    desserts,
                ),
                Product::new(
                    ProductId::new(5),
                    "Манго сансара",
                    Price::from_major(2900),
                    "Тропический торт с манго и маракуйей",
                    lemon,
                    desserts,
                ),
                Product::new(
                    ProductId::new(6),
                    "Фисташковый танец",
                    Price::from_major(3200),
                    "Изысканный торт с фисташковым кремом и розой",
                    chocolate,
                    desserts,
                ),
                Product::new(
                    ProductId::new(7),
                    "Пельмени",
                    Price::from_major(450),
                    "Сочные веганские пельмени с растительным мясом",
                    "/static/images/placeholder.svg",
                    meat,
                ),
                Product::new(
                    ProductId::new(8),
                    "Фарш",
                    Price::from_major(380),
                    "Растительный фарш для любых блюд",
                    "/static/images/placeholder.svg",
                    meat,
                ),
            ],
        }
    }

    /// Products in the given category, in source order.
    pub fn list_by_category(&self, category: Category) -> impl Iterator<Item = &Product> {
        self.products
            .iter()
            .filter(move |p| p.category == Some(category))
    }

    /// Look up a product by id.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// All products in source order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
