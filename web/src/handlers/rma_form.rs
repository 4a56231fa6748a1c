//! Customer RMA form.
//!
//! ```text
//! GET  /rma  → full page with an empty form
//! POST /rma  → success fragment, or the form fragment with errors
//! ```
//!
//! Both POST outcomes are HTTP 200 so the fragment can be swapped in place.

use crate::error::AppError;
use crate::pages::{FORM_BLOCK, REQUEST_PAGE, RmaPageContext, SUCCESS_BLOCK};
use crate::state::{AppState, Providers};
use axum::{Form, extract::State, response::Html};
use rma_desk_core::validation::{RmaFormInput, ValidationErrors};
use rma_desk_core::{RmaError, Submitted};

/// Render the RMA request page.
///
/// # Errors
///
/// Returns error if site metadata cannot be loaded or the page fails to render.
pub async fn show_form<P: Providers>(
    State(state): State<AppState<P>>,
) -> Result<Html<String>, AppError> {
    let site_data = state.controller.site().rma_page_metadata().await?;
    let html = state
        .pages
        .render(REQUEST_PAGE, &RmaPageContext::new(site_data))?;
    Ok(Html(html))
}

/// Validate and submit the RMA form.
///
/// Validation failures and duplicate submissions re-render the form with
/// errors. Notifications are sent in the background.
///
/// # Errors
///
/// Returns error if the request cannot be stored or a fragment fails to render.
pub async fn submit_form<P: Providers>(
    State(state): State<AppState<P>>,
    Form(input): Form<RmaFormInput>,
) -> Result<Html<String>, AppError> {
    let site_data = state.controller.site().rma_page_metadata().await?;
    let context = RmaPageContext::new(site_data);

    let submission = match input.validate() {
        Ok(submission) => submission,
        Err(errors) => {
            tracing::debug!(errors = %errors, "RMA form rejected");
            let html = state
                .pages
                .render(FORM_BLOCK, &context.rejected(input, errors))?;
            return Ok(Html(html));
        }
    };

    let rejection = match state.controller.submit(submission).await {
        Ok(Submitted {
            request,
            notification,
        }) => {
            drop(notification);
            let html = state
                .pages
                .render(SUCCESS_BLOCK, &context.created(request.rma_number.to_string()))?;
            return Ok(Html(html));
        }
        Err(RmaError::Validation(errors)) => errors,
        Err(err @ RmaError::DuplicateRequest) => {
            let mut errors = ValidationErrors::default();
            errors.add_non_field(err.to_string());
            errors
        }
        Err(err) => return Err(err.into()),
    };

    let html = state
        .pages
        .render(FORM_BLOCK, &context.rejected(input, rejection))?;
    Ok(Html(html))
}
