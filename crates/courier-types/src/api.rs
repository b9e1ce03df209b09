use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{
    AttemptStatus, Channel, DeliveryResult, EventType, InboxEntry, TrashEntry,
};

// -- Send --

/// Diagnostic mode accepted by `POST /send`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DemoMode {
    ForcePrimaryFail,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendRequest {
    pub event_type: EventType,
    #[serde(default)]
    pub demo_mode: Option<DemoMode>,
    /// Optional preferred channel. Honored only when the routing policy
    /// allows it for this event type; otherwise auto-corrected.
    #[serde(default)]
    pub intended_channel: Option<Channel>,
}

#[derive(Debug, Serialize)]
pub struct SendResponse {
    pub notification: NotificationView,
}

#[derive(Debug, Serialize)]
pub struct NotificationView {
    pub notification_id: Uuid,
    pub event_type: EventType,
    pub primary_channel: Channel,
    pub delivered_via: Channel,
    pub retry_score: u32,
    pub retry_percentage: u32,
    pub routing_order: Vec<Channel>,
    pub attempts: Vec<AttemptView>,
}

#[derive(Debug, Serialize)]
pub struct AttemptView {
    pub channel: Channel,
    pub status: AttemptStatus,
    pub reason: Option<String>,
}

impl From<DeliveryResult> for NotificationView {
    fn from(result: DeliveryResult) -> Self {
        Self {
            notification_id: result.notification_id,
            event_type: result.event_type,
            primary_channel: result.primary_channel,
            delivered_via: result.delivered_via,
            retry_score: result.retry_score,
            retry_percentage: result.retry_percentage,
            routing_order: result.routing_order,
            attempts: result
                .attempts
                .into_iter()
                .map(|a| AttemptView {
                    channel: a.channel,
                    status: a.status,
                    reason: a.reason,
                })
                .collect(),
        }
    }
}

// -- Inbox --

#[derive(Debug, Serialize)]
pub struct InboxResponse {
    pub inbox: Vec<InboxEntryView>,
}

#[derive(Debug, Serialize)]
pub struct InboxEntryView {
    pub notification_id: Uuid,
    pub event_type: EventType,
    pub timestamp: DateTime<Utc>,
}

impl From<InboxEntry> for InboxEntryView {
    fn from(entry: InboxEntry) -> Self {
        Self {
            notification_id: entry.notification_id,
            event_type: entry.event_type,
            timestamp: entry.timestamp,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GroupedInboxResponse {
    pub groups: Vec<InboxGroup>,
}

#[derive(Debug, Serialize)]
pub struct InboxGroup {
    pub label: String,
    pub entries: Vec<InboxEntryView>,
}

#[derive(Debug, Serialize)]
pub struct ClearInboxResponse {
    pub cleared: usize,
}

#[derive(Debug, Serialize)]
pub struct DeleteMessageResponse {
    pub deleted: bool,
}

// -- Trash --

#[derive(Debug, Serialize)]
pub struct TrashResponse {
    pub trash: Vec<TrashEntryView>,
}

#[derive(Debug, Serialize)]
pub struct TrashEntryView {
    pub notification_id: Uuid,
    pub event_type: EventType,
    pub delivered_via: Channel,
    pub deleted_at: DateTime<Utc>,
}

impl From<TrashEntry> for TrashEntryView {
    fn from(entry: TrashEntry) -> Self {
        Self {
            notification_id: entry.notification_id,
            event_type: entry.event_type,
            delivered_via: entry.delivered_via,
            deleted_at: entry.deleted_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RestoreResponse {
    pub restored: InboxEntryView,
}

#[derive(Debug, Serialize)]
pub struct EmptyTrashResponse {
    pub removed: usize,
}

/// Body for `POST /delete_message` and `POST /restore_message`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MessageIdRequest {
    pub notification_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_request_parses_demo_mode() {
        let req: SendRequest =
            serde_json::from_str(r#"{"event_type":"OTP","demo_mode":"force_primary_fail"}"#)
                .unwrap();
        assert_eq!(req.event_type, EventType::Otp);
        assert_eq!(req.demo_mode, Some(DemoMode::ForcePrimaryFail));
        assert!(req.intended_channel.is_none());
    }

    #[test]
    fn send_request_null_demo_mode() {
        let req: SendRequest =
            serde_json::from_str(r#"{"event_type":"Fraud Alert","demo_mode":null}"#).unwrap();
        assert!(req.demo_mode.is_none());
    }

    #[test]
    fn send_request_rejects_unknown_demo_mode() {
        let res: Result<SendRequest, _> =
            serde_json::from_str(r#"{"event_type":"OTP","demo_mode":"force_everything"}"#);
        assert!(res.is_err());
    }

    #[test]
    fn send_request_intended_channel() {
        let req: SendRequest =
            serde_json::from_str(r#"{"event_type":"OTP","intended_channel":"WhatsApp"}"#).unwrap();
        assert_eq!(req.intended_channel, Some(Channel::WhatsApp));
    }
}
