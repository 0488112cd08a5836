//! ishq Storefront library.
//!
//! This crate provides the storefront functionality as a library,
//! allowing it to be tested and reused. The binary in `main.rs` only adds
//! configuration, telemetry and the listener.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod content;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;

use axum::{
    Router,
    extract::Request,
    http::{HeaderValue, header::CACHE_CONTROL},
    middleware::{from_fn, from_fn_with_state},
    routing::get,
};
use tower::ServiceBuilder;
use tower_http::{services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer};

use state::AppState;

/// Cache lifetime for stylesheets and images under `/static`.
const STATIC_CACHE_CONTROL: &str = "public, max-age=3600";

/// Build the full application router.
///
/// Sentry layers are added by the binary so tests can run without a client.
pub fn app(state: AppState) -> Router {
    let session_layer = middleware::create_session_layer(state.config());
    let static_dir = ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static(STATIC_CACHE_CONTROL),
        ))
        .service(ServeDir::new(&state.config().static_dir));

    Router::new()
        .route("/health", get(health))
        .merge(routes::routes())
        .nest_service("/static", static_dir)
        .layer(session_layer)
        .layer(from_fn_with_state(
            state.clone(),
            middleware::session_lock_middleware,
        ))
        .layer(from_fn(middleware::security_headers_middleware))
        .layer(from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
            )
        }))
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. There are no dependencies to check.
async fn health() -> &'static str {
    "ok"
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
        response::Response,
    };
    use ishq_core::Catalog;
    use tower::ServiceExt;

    use super::*;
    use crate::config::StorefrontConfig;
    use crate::content::{ContentStore, parse_page};

    fn test_app() -> Router {
        let pages = [
            ("about", "---\ntitle: О нас\n---\nishq — это любовь к жизни.\n"),
            ("delivery", "---\ntitle: Доставка\n---\nПо Москве — 400 ₽.\n"),
        ]
        .into_iter()
        .map(|(slug, body)| parse_page(slug, body).unwrap());

        let state = AppState::from_parts(
            StorefrontConfig::default(),
            Catalog::bakery(),
            ContentStore::from_pages(pages),
        );
        app(state)
    }

    /// Minimal cookie jar: replays the session cookie between requests.
    struct Client {
        app: Router,
        cookie: Option<String>,
    }

    impl Client {
        fn new() -> Self {
            Self {
                app: test_app(),
                cookie: None,
            }
        }

        async fn send(&mut self, request: Request<Body>) -> Response {
            let mut request = request;
            if let Some(cookie) = &self.cookie {
                request
                    .headers_mut()
                    .insert(header::COOKIE, cookie.parse().unwrap());
            }

            let response = self.app.clone().oneshot(request).await.unwrap();

            if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
                let pair = set_cookie.to_str().unwrap().split(';').next().unwrap();
                self.cookie = Some(pair.to_string());
            }
            response
        }

        async fn get(&mut self, uri: &str) -> Response {
            self.send(Request::get(uri).body(Body::empty()).unwrap())
                .await
        }

        async fn post(&mut self, uri: &str, form: &str, htmx: bool) -> Response {
            let mut builder = Request::post(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
            if htmx {
                builder = builder.header("HX-Request", "true");
            }
            self.send(builder.body(Body::from(form.to_string())).unwrap())
                .await
        }
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn location(response: &Response) -> &str {
        response
            .headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let mut client = Client::new();
        let response = client.get("/health").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "ok");
    }

    #[tokio::test]
    async fn test_home_lists_desserts_by_default() {
        let mut client = Client::new();
        let response = client.get("/").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        assert!(response.headers().contains_key(header::CONTENT_SECURITY_POLICY));

        let html = body_text(response).await;
        assert!(html.contains("Шоколадный вихрь"));
        assert!(html.contains("2 500 ₽"));
        assert!(!html.contains("Пельмени"));
    }

    #[tokio::test]
    async fn test_static_files_are_cacheable_pages_are_not() {
        let config = StorefrontConfig {
            static_dir: std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("static"),
            ..StorefrontConfig::default()
        };
        let state = AppState::from_parts(config, Catalog::bakery(), ContentStore::default());
        let mut client = Client {
            app: app(state),
            cookie: None,
        };

        let response = client.get("/static/css/main.css").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).unwrap(),
            STATIC_CACHE_CONTROL
        );

        let response = client.get("/cart").await;
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).unwrap(),
            "no-store, max-age=0"
        );
    }

    #[tokio::test]
    async fn test_request_id_is_propagated() {
        let mut client = Client::new();
        let request = Request::get("/health")
            .header("x-request-id", "abc-123")
            .body(Body::empty())
            .unwrap();
        let response = client.send(request).await;
        assert_eq!(response.headers().get("x-request-id").unwrap(), "abc-123");
    }

    #[tokio::test]
    async fn test_section_selection_sticks_to_session() {
        let mut client = Client::new();

        let response = client.get("/sections/meat").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");

        let html = body_text(client.get("/").await).await;
        assert!(html.contains("Пельмени"));
        assert!(html.contains("Фарш"));
        assert!(!html.contains("Шоколадный вихрь"));
    }

    #[tokio::test]
    async fn test_content_section_renders_page() {
        let mut client = Client::new();
        client.get("/sections/delivery").await;

        let response = client.get("/").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("По Москве — 400 ₽."));
    }

    #[tokio::test]
    async fn test_content_section_without_page_is_not_found() {
        let mut client = Client::new();
        client.get("/sections/contacts").await;
        assert_eq!(client.get("/").await.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_section_is_not_found() {
        let mut client = Client::new();
        let response = client.get("/sections/blog").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_cart_flow_with_htmx() {
        let mut client = Client::new();

        let response = client.post("/cart/add", "product_id=1", true).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get("HX-Trigger").unwrap(), "cart-updated");
        assert!(body_text(response).await.contains(">1<"));

        let response = client.post("/cart/add", "product_id=1", true).await;
        assert!(body_text(response).await.contains(">2<"));

        let count = body_text(client.get("/cart/count").await).await;
        assert!(count.contains(">2<"));

        let response = client
            .post("/cart/update", "product_id=1&delta=-1", true)
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let fragment = body_text(response).await;
        assert!(fragment.contains("id=\"cart-items\""));
        assert!(fragment.contains("2 500 ₽"));

        let response = client
            .post("/cart/update", "product_id=1&delta=-5", true)
            .await;
        let fragment = body_text(response).await;
        assert!(fragment.contains("Шоколадный вихрь"));

        let response = client.post("/cart/remove", "product_id=1", true).await;
        let fragment = body_text(response).await;
        assert!(fragment.contains("Корзина пуста"));
        assert!(!fragment.contains("Шоколадный вихрь"));
    }

    #[tokio::test]
    async fn test_cart_forms_without_htmx_redirect() {
        let mut client = Client::new();

        let response = client.post("/cart/add", "product_id=7", false).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");

        let response = client
            .post("/cart/update", "product_id=7&delta=2", false)
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/cart");

        client.post("/cart/add", "product_id=1", false).await;

        let html = body_text(client.get("/cart").await).await;
        assert!(html.contains("Пельмени"));
        assert!(html.contains("1 350 ₽"));
        assert!(html.contains("<p class=\"line-price\">4 050 ₽</p>"));
        assert!(html.contains("6 550 ₽"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_adds_on_one_session_are_all_kept() {
        let mut client = Client::new();
        client.post("/cart/add", "product_id=1", true).await;
        let cookie = client.cookie.clone().unwrap();

        let tasks: Vec<_> = (0..50)
            .map(|_| {
                let app = client.app.clone();
                let cookie = cookie.clone();
                tokio::spawn(async move {
                    let request = Request::post("/cart/add")
                        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                        .header("HX-Request", "true")
                        .header(header::COOKIE, cookie)
                        .body(Body::from("product_id=1"))
                        .unwrap();
                    app.oneshot(request).await.unwrap().status()
                })
            })
            .collect();

        for task in tasks {
            assert!(task.await.unwrap().is_success());
        }

        let count = body_text(client.get("/cart/count").await).await;
        assert!(count.contains(">51<"), "adds were lost: {count}");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_section_and_cart_changes_both_stick() {
        let mut client = Client::new();
        client.post("/cart/add", "product_id=7", true).await;
        let cookie = client.cookie.clone().unwrap();

        let select = {
            let app = client.app.clone();
            let request = Request::get("/sections/meat")
                .header(header::COOKIE, cookie.clone())
                .body(Body::empty())
                .unwrap();
            tokio::spawn(async move { app.oneshot(request).await.unwrap().status() })
        };
        let add = {
            let app = client.app.clone();
            let request = Request::post("/cart/add")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .header(header::COOKIE, cookie)
                .body(Body::from("product_id=8"))
                .unwrap();
            tokio::spawn(async move { app.oneshot(request).await.unwrap().status() })
        };
        assert_eq!(select.await.unwrap(), StatusCode::SEE_OTHER);
        assert_eq!(add.await.unwrap(), StatusCode::SEE_OTHER);

        let html = body_text(client.get("/").await).await;
        assert!(html.contains("Пельмени"));
        assert!(!html.contains("Шоколадный вихрь"));
        assert!(body_text(client.get("/cart/count").await).await.contains(">2<"));
    }

    #[tokio::test]
    async fn test_add_unknown_product_is_not_found() {
        let mut client = Client::new();
        let response = client.post("/cart/add", "product_id=999", true).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_update_and_remove_absent_products_are_noops() {
        let mut client = Client::new();
        let response = client
            .post("/cart/update", "product_id=3&delta=1", true)
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("Корзина пуста"));

        let response = client.post("/cart/remove", "product_id=3", true).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_malformed_form_is_rejected() {
        let mut client = Client::new();
        let response = client.post("/cart/add", "product_id=cake", true).await;
        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn test_checkout_keeps_cart_and_shows_notice() {
        let mut client = Client::new();

        let response = client.post("/checkout", "", false).await;
        assert_eq!(location(&response), "/cart");

        client.post("/cart/add", "product_id=2", true).await;
        let response = client.post("/checkout", "", false).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/cart?checkout=1");

        let html = body_text(client.get("/cart?checkout=1").await).await;
        assert!(html.contains("Малиновая медитация"));
        assert!(html.contains("class=\"notice\""));
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let mut first = Client::new();
        let app = first.app.clone();
        first.post("/cart/add", "product_id=1", true).await;

        let mut second = Client { app, cookie: None };
        let count = body_text(second.get("/cart/count").await).await;
        assert!(!count.contains(">1<"));
    }
}
