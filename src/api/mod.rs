//! HTTP API.
//!
//! | Method | Path            | Handler                          |
//! |--------|-----------------|----------------------------------|
//! | POST   | `/api/feedback` | [`feedback::create_feedback`]    |
//! | GET    | `/api/feedback` | [`feedback::list_feedback`]      |
//! | GET    | `/`             | [`pages::host_page`]             |
//! | GET    | `/embed`        | [`pages::embed`]                 |
//! | GET    | `/health`       | [`health`]                       |
//!
//! With cross-origin support enabled every path also answers `OPTIONS`.

pub mod cors;
pub mod error;
pub mod feedback;
pub mod pages;

use std::sync::Arc;

use axum::routing::get;
use axum::{middleware, Json, Router};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::config::{ServerConfig, API_BASE};
use crate::db::Database;
use crate::widget::{ElementDefinition, ElementRegistry};

pub use error::{ApiError, PersistenceError, ValidationError};

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub elements: Arc<ElementRegistry>,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        let mut elements = ElementRegistry::new();
        // The widget tag is always valid, so this can only fail on a typo.
        if let Err(e) = elements.define(ElementDefinition::widget()) {
            tracing::error!(error = %e, "failed to register widget element");
        }

        Self {
            db,
            elements: Arc::new(elements),
        }
    }
}

pub fn create_router(db: Database, config: &ServerConfig) -> Router {
    let router = Router::new()
        .route(
            API_BASE,
            get(feedback::list_feedback).post(feedback::create_feedback),
        )
        .route("/", get(pages::host_page))
        .route("/embed", get(pages::embed))
        .route("/health", get(health))
        .with_state(AppState::new(db));

    let router = if config.cors {
        tracing::info!("cross-origin requests enabled");
        router.layer(middleware::from_fn(cors::cors))
    } else {
        router
    };

    router.layer(TraceLayer::new_for_http())
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
