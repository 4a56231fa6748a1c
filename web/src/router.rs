//! Router configuration.

use crate::handlers::{admin, health_check, rma_form};
use crate::middleware::no_index_layer;
use crate::state::{AppState, Providers};
use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

/// Build the complete Axum router.
///
/// - `/` and `/rma`: customer form (GET page, POST fragment)
/// - `/health`: liveness
/// - `/admin/api/rma`: staff API
///
/// Every response carries `X-Robots-Tag: noindex, nofollow`.
pub fn build_router<P: Providers>(state: AppState<P>) -> Router {
    let admin_routes = Router::new()
        .route("/rma", get(admin::list_requests::<P>))
        .route(
            "/rma/:id",
            get(admin::get_request::<P>).patch(admin::update_request::<P>),
        );

    Router::new()
        .route(
            "/",
            get(rma_form::show_form::<P>).post(rma_form::submit_form::<P>),
        )
        .route(
            "/rma",
            get(rma_form::show_form::<P>).post(rma_form::submit_form::<P>),
        )
        .route("/health", get(health_check))
        .nest("/admin/api", admin_routes)
        .layer(no_index_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
