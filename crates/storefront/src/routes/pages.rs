//! Informational content pages (about, delivery, contacts).

use askama::Template;
use askama_web::WebTemplate;

use crate::error::{AppError, Result};
use crate::filters;
use crate::routes::home::NavItem;
use crate::state::AppState;

/// Content page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/content.html")]
pub struct ContentPageTemplate {
    pub nav: Vec<NavItem>,
    pub cart_count: u64,
    pub title: String,
    pub description: String,
    pub content_html: String,
}

/// Render the content page stored under `slug`.
///
/// # Errors
///
/// Returns `AppError::NotFound` if no page was loaded for the slug.
pub fn render_page(
    state: &AppState,
    slug: &str,
    nav: Vec<NavItem>,
    cart_count: u64,
) -> Result<ContentPageTemplate> {
    let page = state
        .content()
        .get_page(slug)
        .ok_or_else(|| AppError::NotFound(format!("page {slug}")))?;

    Ok(ContentPageTemplate {
        nav,
        cart_count,
        title: page.meta.title.clone(),
        description: page.meta.description.clone().unwrap_or_default(),
        content_html: page.content_html.clone(),
    })
}
