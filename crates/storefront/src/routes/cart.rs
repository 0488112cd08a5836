//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! Requests without the `HX-Request` header get a redirect instead of a
//! fragment, so every form also works with JavaScript disabled.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::HeaderMap,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use ishq_core::{Cart, CartLine, Intent, ProductId, ShopSession};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::models::{load_shop, save_shop};
use crate::routes::home::{NavItem, nav_items};
use crate::state::AppState;

/// Header HTMX sets on every request it issues.
const HX_REQUEST: &str = "hx-request";

/// Event fired so the header badge refreshes itself.
const CART_UPDATED_TRIGGER: (&str, &str) = ("HX-Trigger", "cart-updated");

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartLineView {
    pub product_id: i32,
    pub name: String,
    pub image: String,
    pub price: String,
    pub line_price: String,
    pub quantity: u32,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub total: String,
    pub item_count: u64,
}

// =============================================================================
// Type Conversions
// =============================================================================

impl From<&CartLine> for CartLineView {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product.id.as_i32(),
            name: line.product.name.clone(),
            image: line.product.image.clone(),
            price: line.product.price.to_string(),
            line_price: line.line_price().to_string(),
            quantity: line.quantity,
        }
    }
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            lines: cart.lines().iter().map(CartLineView::from).collect(),
            total: cart.total_price().to_string(),
            item_count: cart.total_items(),
        }
    }
}

// =============================================================================
// Forms
// =============================================================================

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
}

/// Update quantity form data. `delta` is usually `1` or `-1`.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: ProductId,
    pub delta: i32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: ProductId,
}

/// Cart page query string.
#[derive(Debug, Default, Deserialize)]
pub struct CartQuery {
    /// Set after the checkout button was pressed.
    #[serde(default)]
    pub checkout: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub nav: Vec<NavItem>,
    pub cart_count: u64,
    pub cart: CartView,
    pub checkout_notice: bool,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u64,
}

// =============================================================================
// Handlers
// =============================================================================

fn is_htmx(headers: &HeaderMap) -> bool {
    headers.contains_key(HX_REQUEST)
}

/// Apply `intent` to the visitor's session and store the result.
async fn apply(state: &AppState, session: &Session, intent: Intent) -> Result<ShopSession> {
    let mut shop = load_shop(session).await;
    shop.dispatch(intent, state.catalog())?;
    save_shop(session, &shop).await?;
    tracing::debug!(
        ?intent,
        lines = shop.cart.len(),
        items = shop.cart.total_items(),
        "Cart updated"
    );
    Ok(shop)
}

/// Fragment reply for HTMX requests, redirect to the cart page otherwise.
fn cart_items_reply(headers: &HeaderMap, shop: &ShopSession) -> Response {
    if is_htmx(headers) {
        (
            AppendHeaders([CART_UPDATED_TRIGGER]),
            CartItemsTemplate {
                cart: CartView::from(&shop.cart),
            },
        )
            .into_response()
    } else {
        Redirect::to("/cart").into_response()
    }
}

/// Display cart page.
#[instrument(skip(session))]
pub async fn show(session: Session, Query(query): Query<CartQuery>) -> impl IntoResponse {
    let shop = load_shop(&session).await;

    CartShowTemplate {
        nav: nav_items(shop.section),
        cart_count: shop.cart.total_items(),
        cart: CartView::from(&shop.cart),
        checkout_notice: query.checkout.is_some(),
    }
}

/// Add one unit of a product to the cart.
///
/// HTMX requests get the refreshed count badge; plain form posts are
/// redirected back to the catalog.
///
/// # Errors
///
/// Returns 404 if the product is not in the catalog.
#[instrument(skip(state, session, headers))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let shop = apply(&state, &session, Intent::AddItem(form.product_id)).await?;

    if !is_htmx(&headers) {
        return Ok(Redirect::to("/").into_response());
    }

    Ok((
        AppendHeaders([CART_UPDATED_TRIGGER]),
        CartCountTemplate {
            count: shop.cart.total_items(),
        },
    )
        .into_response())
}

/// Change a line's quantity by `delta` (never below 1).
///
/// # Errors
///
/// Returns 500 if the session cannot be saved.
#[instrument(skip(state, session, headers))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response> {
    let intent = Intent::ChangeQuantity {
        product_id: form.product_id,
        delta: form.delta,
    };
    let shop = apply(&state, &session, intent).await?;
    Ok(cart_items_reply(&headers, &shop))
}

/// Remove a line from the cart.
///
/// # Errors
///
/// Returns 500 if the session cannot be saved.
#[instrument(skip(state, session, headers))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response> {
    let shop = apply(&state, &session, Intent::RemoveItem(form.product_id)).await?;
    Ok(cart_items_reply(&headers, &shop))
}

/// Get cart count badge (HTMX).
#[instrument(skip(session))]
pub async fn count(session: Session) -> impl IntoResponse {
    let shop = load_shop(&session).await;
    CartCountTemplate {
        count: shop.cart.total_items(),
    }
}

/// Checkout button.
///
/// Orders are not submitted anywhere: the summary is logged, the cart is left
/// as it is, and the visitor is sent back to the cart page with a notice.
#[instrument(skip(session))]
pub async fn checkout(session: Session) -> Redirect {
    let shop = load_shop(&session).await;

    if shop.cart.is_empty() {
        return Redirect::to("/cart");
    }

    let total = shop.cart.total_price();
    tracing::info!(
        lines = shop.cart.len(),
        items = shop.cart.total_items(),
        total_minor = total.minor(),
        "Checkout requested"
    );
    add_breadcrumb(
        "cart",
        "Checkout requested",
        Some(&[("total", total.to_string().as_str())]),
    );

    Redirect::to("/cart?checkout=1")
}
