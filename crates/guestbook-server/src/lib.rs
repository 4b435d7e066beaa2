//! guestbook-server: HTTP front end for the guestbook store.
//!
//! | Route                     | Method | Handler                      |
//! |---------------------------|--------|------------------------------|
//! | `/api/guestbook`          | GET    | [`routes::list_entries`]     |
//! | `/api/guestbook`          | POST   | [`routes::create_entry`]     |
//! | `/api/guestbook/layout`   | GET    | [`routes::layout`]           |
//!
//! Anything else falls through to the static directory when one is configured.

pub mod cli;
pub mod config;
pub mod error;
pub mod routes;

use axum::Router;
use axum::routing::get;
use guestbook_core::client::API_PATH;
use routes::AppState;
use std::path::Path;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Builds the application router.
pub fn router(state: AppState, static_dir: Option<&Path>) -> Router {
    let mut app = Router::new()
        .route(
            API_PATH,
            get(routes::list_entries).post(routes::create_entry),
        )
        .route(&format!("{API_PATH}/layout"), get(routes::layout));

    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
