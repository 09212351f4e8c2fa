use axum::{
    Form, Json,
    extract::{State, rejection::FormRejection},
    http::StatusCode,
    response::{Html, IntoResponse},
};
use tracing::{error, info};

use super::{
    error::ApiError,
    models::{HealthResponse, MashupForm},
    pages,
    state::AppState,
    validation::validate_form,
};
use crate::pipeline::Outcome;

/// Intake form (GET /)
pub async fn index(State(state): State<AppState>) -> Html<String> {
    pages::index_page(&state.config.limits, None)
}

/// Job submission (POST /)
///
/// Runs the whole pipeline before answering. The job executes on its own
/// task so that a panic inside it still yields the generic failure page.
pub async fn submit(
    State(state): State<AppState>,
    form: Result<Form<MashupForm>, FormRejection>,
) -> Result<Html<String>, ApiError> {
    let limits = state.config.limits.clone();
    let Form(form) = form.map_err(|rejection| ApiError::UnreadableForm {
        status: rejection.status(),
        reason: rejection.body_text(),
        limits: limits.clone(),
    })?;

    let query = validate_form(&form, &limits)
        .map_err(|source| ApiError::InvalidForm { source, limits })?;

    info!(
        performer = %query.performer,
        count = query.count,
        duration_secs = query.duration_secs,
        "Mashup requested"
    );

    let orchestrator = state.orchestrator.clone();
    let outcome = match tokio::spawn(async move { orchestrator.run(&query).await }).await {
        Ok(report) => report.outcome(),
        Err(e) => {
            error!(error = %e, "Mashup job aborted");
            Outcome::FailedNoAudio
        }
    };

    Ok(pages::status_page(outcome.message()))
}

/// Health check endpoint (GET /health)
///
/// Reports liveness, the crate version, and job counters since start.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let response = HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        jobs: state.metrics.snapshot(),
    };

    (StatusCode::OK, Json(response))
}
