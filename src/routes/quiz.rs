use axum::{extract::State, routing::post, Json, Router};

use crate::models::{AppState, QuestionBankResponse, QuizRequest, QuizResponse};
use crate::types::AppResult;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/quiz", post(create_quiz))
        .route("/questionbank", post(create_question_bank))
        .route("/question-bank", post(create_question_bank))
        .with_state(state)
}

async fn create_quiz(
    State(state): State<AppState>,
    Json(request): Json<QuizRequest>,
) -> AppResult<Json<QuizResponse>> {
    let response = state
        .pipeline
        .generate_quiz(&request.file_id, request.num_questions)
        .await?;
    Ok(Json(response))
}

async fn create_question_bank(
    State(state): State<AppState>,
    Json(request): Json<QuizRequest>,
) -> AppResult<Json<QuestionBankResponse>> {
    let response = state
        .pipeline
        .generate_question_bank(&request.file_id, request.num_questions)
        .await?;
    Ok(Json(response))
}
