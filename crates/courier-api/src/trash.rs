use axum::Json;
use axum::extract::State;

use courier_types::api::{
    EmptyTrashResponse, MessageIdRequest, RestoreResponse, TrashResponse,
};

use crate::AppState;
use crate::error::{ApiError, join_error};

/// `GET /trash` — trashed entries in deletion order.
pub async fn get_trash(State(state): State<AppState>) -> Result<Json<TrashResponse>, ApiError> {
    let db = state.db.clone();
    let entries = tokio::task::spawn_blocking(move || db.get_trash())
        .await
        .map_err(join_error)??;

    Ok(Json(TrashResponse {
        trash: entries.into_iter().map(Into::into).collect(),
    }))
}

/// `POST /restore_message` — move an entry back to the inbox. 404 when the
/// id is not in Trash; both stores are left untouched in that case.
pub async fn restore_message(
    State(state): State<AppState>,
    Json(req): Json<MessageIdRequest>,
) -> Result<Json<RestoreResponse>, ApiError> {
    let db = state.db.clone();
    let restored = tokio::task::spawn_blocking(move || db.restore_message(req.notification_id))
        .await
        .map_err(join_error)??
        .ok_or(ApiError::NotFound)?;

    Ok(Json(RestoreResponse {
        restored: restored.into(),
    }))
}

/// `POST /empty_trash` — permanently destroys all trashed entries.
pub async fn empty_trash(
    State(state): State<AppState>,
) -> Result<Json<EmptyTrashResponse>, ApiError> {
    let db = state.db.clone();
    let removed = tokio::task::spawn_blocking(move || db.empty_trash())
        .await
        .map_err(join_error)??;

    Ok(Json(EmptyTrashResponse { removed }))
}
