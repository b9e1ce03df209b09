use axum::Json;
use axum::extract::State;
use tracing::info;

use courier_types::api::{DemoMode, SendRequest, SendResponse};

use crate::AppState;
use crate::error::ApiError;

/// `POST /send` — run one notification to delivery.
///
/// Never fails from a business standpoint: channel failures are absorbed by
/// escalation and the terminal Inbox fallback. Only store failures surface.
pub async fn send(
    State(state): State<AppState>,
    Json(req): Json<SendRequest>,
) -> Result<Json<SendResponse>, ApiError> {
    let force_primary_fail = req.demo_mode == Some(DemoMode::ForcePrimaryFail);

    let result = state
        .orchestrator
        .deliver(req.event_type, force_primary_fail, req.intended_channel)
        .await?;

    info!(
        notification_id = %result.notification_id,
        delivered_via = %result.delivered_via,
        "send complete"
    );

    Ok(Json(SendResponse {
        notification: result.into(),
    }))
}
