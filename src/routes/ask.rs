use axum::{extract::State, routing::post, Json, Router};

use crate::models::{AppState, AskRequest, AskResponse};
use crate::types::AppResult;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ask", post(ask))
        .with_state(state)
}

async fn ask(State(state): State<AppState>, Json(request): Json<AskRequest>) -> AppResult<Json<AskResponse>> {
    let response = state
        .pipeline
        .answer_question(&request.file_id, &request.question, request.top_k)
        .await?;
    Ok(Json(response))
}
