//! Staff JSON API.
//!
//! All endpoints require [`RequireAdmin`].
//!
//! ```text
//! GET   /admin/api/rma?q=&status=&page=   → page of requests, newest first
//! GET   /admin/api/rma/:id                → one request
//! PATCH /admin/api/rma/:id                → edit status and instructions
//! ```

use crate::error::AppError;
use crate::extractors::RequireAdmin;
use crate::state::{AppState, Providers};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use rma_desk_core::providers::{RmaPage, RmaSearch};
use rma_desk_core::{RmaId, RmaRequest, RmaUpdate, Updated};

/// List and search requests.
///
/// # Errors
///
/// Returns error if the store cannot be queried.
pub async fn list_requests<P: Providers>(
    _admin: RequireAdmin,
    State(state): State<AppState<P>>,
    Query(search): Query<RmaSearch>,
) -> Result<Json<RmaPage>, AppError> {
    let page = state.controller.search(&search).await?;
    Ok(Json(page))
}

/// Load one request.
///
/// # Errors
///
/// Returns 404 if the request does not exist.
pub async fn get_request<P: Providers>(
    _admin: RequireAdmin,
    State(state): State<AppState<P>>,
    Path(id): Path<i64>,
) -> Result<Json<RmaRequest>, AppError> {
    let request = state.controller.find(RmaId::new(id)).await?;
    Ok(Json(request))
}

/// Change the status and/or instructions of a request.
///
/// Moving to `rma_sent` emails the return instructions in the background.
///
/// # Errors
///
/// Returns 404 if the request does not exist, or 500 if it cannot be saved.
pub async fn update_request<P: Providers>(
    _admin: RequireAdmin,
    State(state): State<AppState<P>>,
    Path(id): Path<i64>,
    Json(update): Json<RmaUpdate>,
) -> Result<Json<RmaRequest>, AppError> {
    let Updated {
        request,
        persisted,
        notification,
    } = state.controller.update(RmaId::new(id), update).await?;

    tracing::info!(
        request_id = id,
        rma_number = %request.rma_number,
        status = %request.status,
        persisted,
        notifications = notification.len(),
        "RMA request updated by staff"
    );
    drop(notification);

    Ok(Json(request))
}
