use axum::{extract::State, routing::post, Json, Router};

use crate::models::{AppState, SummarizeRequest, SummarizeResponse};
use crate::types::AppResult;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/summarize", post(summarize))
        .with_state(state)
}

async fn summarize(
    State(state): State<AppState>,
    Json(request): Json<SummarizeRequest>,
) -> AppResult<Json<SummarizeResponse>> {
    let response = state.pipeline.summarize(&request.file_id, request.max_length).await?;
    Ok(Json(response))
}
