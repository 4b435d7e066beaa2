//! Guestbook API handlers.

use crate::error::ApiError;
use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use guestbook_core::client::{SubmitRequest, SubmitResponse};
use guestbook_core::layout::{MAX_BUBBLES, Placement, Viewport, compute_layout};
use guestbook_core::{Entry, StoreHandle};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Deserialize;
use tracing::{debug, info};

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: StoreHandle,
}

impl AppState {
    pub fn new(store: StoreHandle) -> Self {
        Self { store }
    }
}

/// `GET /api/guestbook`: the active log, newest first.
pub async fn list_entries(State(state): State<AppState>) -> Json<Vec<Entry>> {
    Json(state.store.list().await)
}

/// `POST /api/guestbook`.
///
/// A body that is missing or not valid JSON is handled like one without an
/// answer.
pub async fn create_entry(
    State(state): State<AppState>,
    payload: Result<Json<SubmitRequest>, JsonRejection>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            debug!(reason = %rejection.body_text(), "unreadable submission body");
            SubmitRequest::default()
        }
    };

    let entry = state
        .store
        .append(request.name.as_deref(), request.answer.as_deref())
        .await?;
    info!(id = %entry.id, "entry created");

    Ok(Json(SubmitResponse {
        success: true,
        entry,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutQuery {
    pub width: f64,
    pub height: f64,
    pub header_bottom: Option<f64>,
    pub content_bottom: Option<f64>,
}

/// `GET /api/guestbook/layout`: placements for the newest entries in the
/// given viewport.
pub async fn layout(
    State(state): State<AppState>,
    query: Result<Query<LayoutQuery>, QueryRejection>,
) -> Result<Json<Vec<Placement>>, ApiError> {
    let Query(query) = query.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;

    let mut entries = state.store.list().await;
    entries.truncate(MAX_BUBBLES);

    let viewport = Viewport {
        width: query.width,
        height: query.height,
        content_bottom: query.content_bottom,
    };
    let mut rng = StdRng::from_entropy();
    Ok(Json(compute_layout(
        &entries,
        &viewport,
        query.header_bottom,
        &mut rng,
    )))
}
