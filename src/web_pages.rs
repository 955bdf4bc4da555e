use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;

use crate::{
    AppState,
    imgbb::HostedImage,
    orchestrator::OutcomeState,
    tools::{GenerateImageRequest, ListGenerationsRequest, StyleCatalog},
};

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Serialize)]
pub struct GenerateResponse {
    pub state: OutcomeState,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_base64: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hosted: Option<HostedImage>,
}

fn json_error(status: StatusCode, message: &str) -> Response {
    (status, Json(ErrorResponse { error: message.to_string() })).into_response()
}

/// JSON routes, each mounted at `{prefix}/<name>`. `prefix` is empty or starts
/// with a slash.
pub fn router(state: Arc<AppState>, prefix: &str) -> Router {
    Router::new()
        .route(&format!("{prefix}/generate"), post(generate))
        .route(&format!("{prefix}/generations"), get(list_generations))
        .route(&format!("{prefix}/styles"), get(list_styles))
        .with_state(state)
}

pub async fn generate(
    State(state): State<Arc<AppState>>,
    Json(body): Json<GenerateImageRequest>,
) -> Response {
    let request = match body.into_request() {
        Ok(request) => request,
        Err(err) => return json_error(StatusCode::BAD_REQUEST, &err.to_string()),
    };
    let outcome = state.orchestrator.run(request).await;
    let status_code = match outcome.state {
        OutcomeState::Failed => StatusCode::BAD_GATEWAY,
        OutcomeState::Success | OutcomeState::PartialSuccess => StatusCode::OK,
    };
    let dimensions = outcome.image.as_ref().map(|image| image.dimensions());
    let response = GenerateResponse {
        state: outcome.state,
        status: outcome.status,
        image_base64: outcome.image.as_ref().map(|image| image.to_base64()),
        mime_type: outcome.image.as_ref().map(|image| image.mime_type),
        width: dimensions.map(|(width, _)| width),
        height: dimensions.map(|(_, height)| height),
        hosted: outcome.hosted,
    };
    (status_code, Json(response)).into_response()
}

pub async fn list_generations(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListGenerationsRequest>,
) -> Response {
    match state.orchestrator.store().recent(query.limit()).await {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "list generations failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "failed to load generations")
        }
    }
}

pub async fn list_styles() -> Json<StyleCatalog> {
    Json(StyleCatalog::current())
}
