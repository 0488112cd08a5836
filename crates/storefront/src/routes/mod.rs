//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Selected section (product grid or content page)
//! GET  /sections/{section}     - Select a section, redirect to /
//!
//! # Cart (HTMX fragments, redirects without HTMX)
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add to cart (returns cart_count, triggers cart-updated)
//! POST /cart/update            - Change quantity (returns cart_items fragment)
//! POST /cart/remove            - Remove line (returns cart_items fragment)
//! GET  /cart/count             - Cart count badge (fragment)
//!
//! # Checkout
//! POST /checkout               - Log the order summary, redirect to /cart?checkout=1
//! ```

pub mod cart;
pub mod home;
pub mod pages;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/sections/{section}", get(home::select_section))
        .nest("/cart", cart_routes())
        .route("/checkout", post(cart::checkout))
}
