use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;

use courier_types::api::{
    ClearInboxResponse, DeleteMessageResponse, GroupedInboxResponse, InboxGroup, InboxResponse,
    MessageIdRequest,
};

use crate::AppState;
use crate::error::{ApiError, join_error};

#[derive(Debug, Deserialize)]
pub struct InboxQuery {
    /// Case-insensitive substring filter on the event type.
    pub q: Option<String>,
}

/// `GET /inbox` — active entries, newest first.
pub async fn get_inbox(
    State(state): State<AppState>,
    Query(query): Query<InboxQuery>,
) -> Result<Json<InboxResponse>, ApiError> {
    let db = state.db.clone();
    let entries = tokio::task::spawn_blocking(move || db.get_inbox(query.q.as_deref()))
        .await
        .map_err(join_error)??;

    Ok(Json(InboxResponse {
        inbox: entries.into_iter().map(Into::into).collect(),
    }))
}

/// `GET /inbox/grouped` — Today / Yesterday / Earlier buckets by local
/// calendar date, empty buckets omitted.
pub async fn get_inbox_grouped(
    State(state): State<AppState>,
    Query(query): Query<InboxQuery>,
) -> Result<Json<GroupedInboxResponse>, ApiError> {
    let db = state.db.clone();
    let groups = tokio::task::spawn_blocking(move || db.get_inbox_grouped(query.q.as_deref()))
        .await
        .map_err(join_error)??;

    Ok(Json(GroupedInboxResponse {
        groups: groups
            .into_iter()
            .map(|(bucket, entries)| InboxGroup {
                label: bucket.label().to_string(),
                entries: entries.into_iter().map(Into::into).collect(),
            })
            .collect(),
    }))
}

/// `POST /clear_inbox` — removes every active entry. Irreversible: bulk
/// clear does not route through Trash.
pub async fn clear_inbox(
    State(state): State<AppState>,
) -> Result<Json<ClearInboxResponse>, ApiError> {
    let db = state.db.clone();
    let cleared = tokio::task::spawn_blocking(move || db.clear_inbox())
        .await
        .map_err(join_error)??;

    Ok(Json(ClearInboxResponse { cleared }))
}

/// `POST /delete_message` — move one entry to Trash.
pub async fn delete_message(
    State(state): State<AppState>,
    Json(req): Json<MessageIdRequest>,
) -> Result<Json<DeleteMessageResponse>, ApiError> {
    let db = state.db.clone();
    let deleted = tokio::task::spawn_blocking(move || db.soft_delete(req.notification_id))
        .await
        .map_err(join_error)??;

    Ok(Json(DeleteMessageResponse { deleted }))
}
