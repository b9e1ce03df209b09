use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde::de::Deserializer;
use serde::ser::Serializer;
use uuid::Uuid;

/// A delivery mechanism. `Inbox` is the distinguished terminal channel:
/// it can never fail and is only used for the final fallback delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    #[serde(rename = "SMS")]
    Sms,
    Email,
    Push,
    WhatsApp,
    Inbox,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Sms => "SMS",
            Channel::Email => "Email",
            Channel::Push => "Push",
            Channel::WhatsApp => "WhatsApp",
            Channel::Inbox => "Inbox",
        }
    }

    /// Parse a stored channel tag. Tags are written by `as_str`, so an
    /// unknown tag means corrupt data.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "SMS" => Some(Channel::Sms),
            "Email" => Some(Channel::Email),
            "Push" => Some(Channel::Push),
            "WhatsApp" => Some(Channel::WhatsApp),
            "Inbox" => Some(Channel::Inbox),
            _ => None,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Open enumeration of notification event types. Unrecognized strings
/// round-trip through `Other` so new event types degrade to the default
/// routing policy instead of being rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventType {
    Otp,
    TransactionOtp,
    FraudAlert,
    MonthlyStatement,
    PaymentConfirmation,
    Other(String),
}

impl EventType {
    pub fn as_str(&self) -> &str {
        match self {
            EventType::Otp => "OTP",
            EventType::TransactionOtp => "Transaction OTP",
            EventType::FraudAlert => "Fraud Alert",
            EventType::MonthlyStatement => "Monthly Statement",
            EventType::PaymentConfirmation => "Payment Confirmation",
            EventType::Other(name) => name,
        }
    }
}

impl From<&str> for EventType {
    fn from(s: &str) -> Self {
        match s {
            "OTP" => EventType::Otp,
            "Transaction OTP" => EventType::TransactionOtp,
            "Fraud Alert" => EventType::FraudAlert,
            "Monthly Statement" => EventType::MonthlyStatement,
            "Payment Confirmation" => EventType::PaymentConfirmation,
            other => EventType::Other(other.to_string()),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for EventType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EventType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(EventType::from(s.as_str()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttemptStatus {
    Success,
    Failed,
}

impl AttemptStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttemptStatus::Success => "SUCCESS",
            AttemptStatus::Failed => "FAILED",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "SUCCESS" => Some(AttemptStatus::Success),
            "FAILED" => Some(AttemptStatus::Failed),
            _ => None,
        }
    }
}

/// A notification to deliver. Identity is fixed at creation; everything
/// that happens afterwards is recorded as Attempts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub event_type: EventType,
    pub created_at: DateTime<Utc>,
    /// Diagnostic override: forces the first (primary-channel) attempt to
    /// fail so the escalation path can be exercised. Never a production
    /// signal and never applied past the first attempt.
    pub force_primary_fail: bool,
}

impl Notification {
    pub fn new(event_type: EventType, force_primary_fail: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_type,
            created_at: Utc::now(),
            force_primary_fail,
        }
    }
}

/// One delivery attempt. Append-only: once recorded an attempt is never
/// mutated or removed. The sequence position is the index in the
/// notification's attempt log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attempt {
    pub channel: Channel,
    pub status: AttemptStatus,
    /// Machine-readable failure code; `None` on an ordinary success.
    pub reason: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// The outcome of a full delivery run, returned to the caller. Derived
/// state — the attempt log is the persistent record.
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryResult {
    pub notification_id: Uuid,
    pub event_type: EventType,
    pub primary_channel: Channel,
    pub delivered_via: Channel,
    pub routing_order: Vec<Channel>,
    pub retry_score: u32,
    pub retry_percentage: u32,
    pub attempts: Vec<Attempt>,
}

/// A Secure Inbox record. Exists if and only if the notification's final
/// attempt was the Inbox fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboxEntry {
    pub notification_id: Uuid,
    pub event_type: EventType,
    pub timestamp: DateTime<Utc>,
    pub delivered_via: Channel,
}

/// A soft-deleted inbox entry. Keeps every original field so a restore is
/// lossless; `deleted_at` is discarded on restore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrashEntry {
    pub notification_id: Uuid,
    pub event_type: EventType,
    pub timestamp: DateTime<Utc>,
    pub delivered_via: Channel,
    pub deleted_at: DateTime<Utc>,
}

/// Display bucket for inbox listings, in fixed display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayBucket {
    Today,
    Yesterday,
    Earlier,
}

impl DayBucket {
    pub fn label(&self) -> &'static str {
        match self {
            DayBucket::Today => "Today",
            DayBucket::Yesterday => "Yesterday",
            DayBucket::Earlier => "Earlier",
        }
    }
}
