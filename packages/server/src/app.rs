//! Application setup and router wiring.

use std::sync::Arc;

use axum::http::Method;
use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use scheme_scraper::store::SchemeStore;

use crate::invoker::ScrapeInvoker;
use crate::routes::{health_handler, scrape_handler};

/// Shared application state: the store handle and the scrape invoker,
/// both explicitly constructed in `main` and injected here.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SchemeStore>,
    pub invoker: Arc<dyn ScrapeInvoker>,
}

/// Build the Axum application router.
pub fn build_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET]);

    Router::new()
        .route("/api/scrape", get(scrape_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
