//! Channel adapters — the uniform send contract per channel.
//!
//! Attempt-level failures are data, never errors: `attempt_send` always
//! returns an outcome, and the orchestrator decides what to do with it.
//! Provider protocol details are out of scope; the default adapter
//! simulates provider behavior.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

use courier_types::models::{AttemptStatus, Channel, Notification};

/// First-attempt diagnostic failure (the `demo_mode` override).
pub const REASON_FORCED_PRIMARY_FAILURE: &str = "forced_primary_failure_demo_mode";
/// Provider-side unavailability, recovered locally by escalation.
pub const REASON_CHANNEL_UNAVAILABLE: &str = "channel_unavailable";
/// Terminal fallback after every real-time channel was tried.
pub const REASON_FINAL_FALLBACK: &str = "forced_final_fallback";
/// Terminal fallback because the retry score crossed the stop threshold.
pub const REASON_RETRY_SCORE: &str = "retry_score";

/// Result of a single adapter call.
#[derive(Debug, Clone)]
pub struct AttemptOutcome {
    pub status: AttemptStatus,
    pub reason: Option<String>,
}

impl AttemptOutcome {
    pub fn success() -> Self {
        Self {
            status: AttemptStatus::Success,
            reason: None,
        }
    }

    pub fn failed(reason: &str) -> Self {
        Self {
            status: AttemptStatus::Failed,
            reason: Some(reason.to_string()),
        }
    }
}

/// Uniform send contract over all channels.
///
/// `forced_failure` is the diagnostic override threaded through the first
/// adapter call only. The Inbox channel must always succeed regardless of
/// adapter implementation; adapters hold no state and persist nothing.
#[async_trait]
pub trait ChannelAdapter: Send + Sync {
    async fn attempt_send(
        &self,
        notification: &Notification,
        channel: Channel,
        forced_failure: bool,
    ) -> AttemptOutcome;
}

/// Stand-in for real provider integrations: draws an outcome from a
/// per-channel base failure rate and sleeps briefly to model provider
/// latency.
pub struct SimulatedAdapter {
    latency: Duration,
}

impl SimulatedAdapter {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }

    /// Base failure rates derived from historical sample-event reliability
    /// per channel.
    fn failure_rate(channel: Channel) -> f64 {
        match channel {
            Channel::Sms => 0.10,
            Channel::Email => 0.15,
            Channel::Push => 0.20,
            Channel::WhatsApp => 0.30,
            Channel::Inbox => 0.0,
        }
    }
}

impl Default for SimulatedAdapter {
    fn default() -> Self {
        Self::new(Duration::from_millis(25))
    }
}

#[async_trait]
impl ChannelAdapter for SimulatedAdapter {
    async fn attempt_send(
        &self,
        _notification: &Notification,
        channel: Channel,
        forced_failure: bool,
    ) -> AttemptOutcome {
        if channel == Channel::Inbox {
            return AttemptOutcome::success();
        }
        if forced_failure {
            return AttemptOutcome::failed(REASON_FORCED_PRIMARY_FAILURE);
        }

        tokio::time::sleep(self.latency).await;

        let rate = Self::failure_rate(channel).clamp(0.0, 1.0);
        if rand::rng().random_bool(rate) {
            AttemptOutcome::failed(REASON_CHANNEL_UNAVAILABLE)
        } else {
            AttemptOutcome::success()
        }
    }
}

/// Test adapter replaying a fixed outcome sequence for real-time channels.
/// Inbox still always succeeds.
#[cfg(test)]
pub(crate) struct ScriptedAdapter {
    outcomes: std::sync::Mutex<std::collections::VecDeque<AttemptStatus>>,
}

#[cfg(test)]
impl ScriptedAdapter {
    pub fn new(outcomes: &[AttemptStatus]) -> Self {
        Self {
            outcomes: std::sync::Mutex::new(outcomes.iter().copied().collect()),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl ChannelAdapter for ScriptedAdapter {
    async fn attempt_send(
        &self,
        _notification: &Notification,
        channel: Channel,
        forced_failure: bool,
    ) -> AttemptOutcome {
        if channel == Channel::Inbox {
            return AttemptOutcome::success();
        }
        if forced_failure {
            return AttemptOutcome::failed(REASON_FORCED_PRIMARY_FAILURE);
        }
        match self.outcomes.lock().unwrap().pop_front() {
            Some(AttemptStatus::Success) | None => AttemptOutcome::success(),
            Some(AttemptStatus::Failed) => AttemptOutcome::failed(REASON_CHANNEL_UNAVAILABLE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_types::models::EventType;

    #[tokio::test]
    async fn inbox_never_fails() {
        let adapter = SimulatedAdapter::new(Duration::ZERO);
        let n = Notification::new(EventType::Otp, false);
        for _ in 0..50 {
            let outcome = adapter.attempt_send(&n, Channel::Inbox, false).await;
            assert_eq!(outcome.status, AttemptStatus::Success);
            assert!(outcome.reason.is_none());
        }
    }

    #[tokio::test]
    async fn forced_failure_overrides_outcome() {
        let adapter = SimulatedAdapter::new(Duration::ZERO);
        let n = Notification::new(EventType::Otp, true);
        let outcome = adapter.attempt_send(&n, Channel::Sms, true).await;
        assert_eq!(outcome.status, AttemptStatus::Failed);
        assert_eq!(
            outcome.reason.as_deref(),
            Some(REASON_FORCED_PRIMARY_FAILURE)
        );
    }

    #[tokio::test]
    async fn scripted_adapter_replays_outcomes() {
        let adapter =
            ScriptedAdapter::new(&[AttemptStatus::Failed, AttemptStatus::Success]);
        let n = Notification::new(EventType::Otp, false);

        let first = adapter.attempt_send(&n, Channel::Sms, false).await;
        assert_eq!(first.status, AttemptStatus::Failed);
        assert_eq!(first.reason.as_deref(), Some(REASON_CHANNEL_UNAVAILABLE));

        let second = adapter.attempt_send(&n, Channel::Email, false).await;
        assert_eq!(second.status, AttemptStatus::Success);
    }
}
