//! Home page and section selection.
//!
//! `/` renders whichever section the visitor last selected: a product grid for
//! catalog sections, a content page for the informational ones.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use ishq_core::{Category, Intent, Product, Section};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::models::{load_shop, save_shop};
use crate::routes::pages::render_page;
use crate::state::AppState;

// =============================================================================
// Shared Views
// =============================================================================

/// Navigation link for the header.
#[derive(Clone)]
pub struct NavItem {
    pub href: String,
    pub title: &'static str,
    pub active: bool,
}

/// Header navigation with `current` highlighted.
#[must_use]
pub fn nav_items(current: Section) -> Vec<NavItem> {
    Section::ALL
        .into_iter()
        .map(|section| NavItem {
            href: format!("/sections/{}", section.slug()),
            title: section.title(),
            active: section == current,
        })
        .collect()
}

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub price: String,
    pub image: String,
    /// Alternating hover animation for the card overlay.
    pub spin_class: &'static str,
}

impl ProductView {
    fn new(index: usize, product: &Product) -> Self {
        Self {
            id: product.id.as_i32(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.to_string(),
            image: product.image.clone(),
            spin_class: if index % 2 == 0 {
                "spin-slow"
            } else {
                "spin-reverse"
            },
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Catalog section template.
#[derive(Template, WebTemplate)]
#[template(path = "catalog.html")]
pub struct CatalogTemplate {
    pub nav: Vec<NavItem>,
    pub cart_count: u64,
    pub title: &'static str,
    pub tagline: &'static str,
    pub icon: &'static str,
    pub products: Vec<ProductView>,
}

const fn category_icon(category: Category) -> &'static str {
    match category {
        Category::Desserts => "🌙",
        Category::PlantMeat => "🥟",
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the selected section.
///
/// # Errors
///
/// Returns 404 if an informational section has no content page.
#[instrument(skip(state, session))]
pub async fn home(State(state): State<AppState>, session: Session) -> Result<Response> {
    let shop = load_shop(&session).await;
    let nav = nav_items(shop.section);
    let cart_count = shop.cart.total_items();

    let Some(category) = shop.section.category() else {
        return render_page(&state, shop.section.slug(), nav, cart_count)
            .map(IntoResponse::into_response);
    };

    let products = shop
        .visible_products(state.catalog())
        .into_iter()
        .enumerate()
        .map(|(i, product)| ProductView::new(i, product))
        .collect();

    Ok(CatalogTemplate {
        nav,
        cart_count,
        title: category.title(),
        tagline: category.tagline(),
        icon: category_icon(category),
        products,
    }
    .into_response())
}

/// Select a section and go back to `/`.
///
/// # Errors
///
/// Returns 404 for an unknown section slug, 500 if the session cannot be saved.
#[instrument(skip(state, session))]
pub async fn select_section(
    State(state): State<AppState>,
    session: Session,
    Path(slug): Path<String>,
) -> Result<Redirect> {
    let section: Section = slug.parse()?;

    let mut shop = load_shop(&session).await;
    shop.dispatch(Intent::SelectSection(section), state.catalog())?;
    save_shop(&session, &shop).await?;

    tracing::debug!(%section, "Section selected");
    Ok(Redirect::to("/"))
}
