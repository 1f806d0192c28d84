use axum::{
    extract::{DefaultBodyLimit, Multipart, Query, State},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::models::{AppState, DeleteFileRequest, DetailResponse, FileMeta, UserQuery};
use crate::types::{AppError, AppResult, DocumentType};

/// Multipart framing allowance on top of the file size cap.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

pub fn router(state: AppState) -> Router {
    let body_limit = usize::try_from(state.config.storage.max_upload_bytes())
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        .route("/upload", post(upload_file).layer(DefaultBodyLimit::max(body_limit)))
        .route("/files", get(list_files))
        .route("/delete-file", delete(delete_file))
        .with_state(state)
}

async fn upload_file(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
    mut multipart: Multipart,
) -> AppResult<Json<FileMeta>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| AppError::InvalidRequest("No file provided".to_string()))?;
        let doc_type = DocumentType::from_path(&filename)?;

        let stored = state
            .storage
            .save_stream(&filename, &doc_type.to_string(), field)
            .await?;

        let meta = FileMeta {
            file_id: Uuid::new_v4().to_string(),
            user_id: query.user_id,
            filename: stored.filename,
            filepath: stored.path.to_string_lossy().into_owned(),
            filetype: doc_type.to_string(),
            upload_date: Utc::now(),
        };
        if let Err(e) = state.store.upsert(meta.clone()).await {
            // a stored file without metadata is unreachable, remove it
            if let Err(cleanup) = tokio::fs::remove_file(&stored.path).await {
                warn!(path = %stored.path.display(), error = %cleanup, "Could not remove orphaned upload");
            }
            return Err(e);
        }

        info!(file_id = %meta.file_id, filename = %meta.filename, size = stored.size, "File uploaded");
        return Ok(Json(meta));
    }

    Err(AppError::InvalidRequest("No file provided".to_string()))
}

async fn list_files(State(state): State<AppState>, Query(query): Query<UserQuery>) -> Json<Vec<FileMeta>> {
    match state.store.list_by_user(&query.user_id).await {
        Ok(files) => Json(files),
        Err(e) => {
            error!(user_id = %query.user_id, error = %e, "Listing files failed");
            Json(Vec::new())
        }
    }
}

async fn delete_file(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
    Json(request): Json<DeleteFileRequest>,
) -> AppResult<Json<DetailResponse>> {
    let filename = request.filename();
    if !state.storage.delete(filename).await? {
        return Err(AppError::DocumentNotFound("File not found".to_string()));
    }

    for meta in state.store.find_by_user_and_filename(&query.user_id, filename).await? {
        state.store.delete(&meta.file_id).await?;
    }

    info!(user_id = %query.user_id, filename = %filename, "File deleted");
    Ok(Json(DetailResponse {
        detail: "File deleted".to_string(),
    }))
}
