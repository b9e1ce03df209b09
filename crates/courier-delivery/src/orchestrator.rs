//! Delivery orchestration — drives one notification through the ranked
//! channels until it is delivered.
//!
//! The attempt sequence is strictly sequential: each adapter call is
//! awaited before the next decision, because trying channel N+1 before
//! channel N's outcome is known could produce duplicate real-world
//! notifications. Independent notifications run concurrently and share
//! nothing but the store.
//!
//! Every delivery terminates: on success the sequence ends immediately; on
//! failure the scorer either continues escalation or stops it, and a stop
//! always ends in exactly one terminal attempt against the Inbox channel,
//! which cannot fail.

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use courier_types::models::{
    Attempt, AttemptStatus, Channel, DeliveryResult, EventType, InboxEntry, Notification,
};

use crate::adapter::{ChannelAdapter, REASON_FINAL_FALLBACK, REASON_RETRY_SCORE};
use crate::policy;
use crate::scorer::{RetryScorer, ScorerConfig, StopCause, Verdict};

/// Persistence the orchestrator needs: the append-only attempt log and the
/// Secure Inbox. Implemented by the store crate; mocked in tests.
#[async_trait]
pub trait DeliveryStore: Send + Sync {
    /// Record one attempt at its sequence position. Attempts are written as
    /// they happen so partial history survives an abandoned caller.
    async fn record_attempt(
        &self,
        notification_id: Uuid,
        seq: u32,
        attempt: &Attempt,
    ) -> anyhow::Result<()>;

    /// Append a terminal-fallback entry. Must be idempotent on
    /// `notification_id`.
    async fn append_inbox(&self, entry: &InboxEntry) -> anyhow::Result<()>;
}

enum RealtimeOutcome {
    Delivered(Channel),
    Stopped(StopCause),
}

pub struct Orchestrator<A, S> {
    adapter: A,
    store: S,
    scorer_config: ScorerConfig,
}

impl<A: ChannelAdapter, S: DeliveryStore> Orchestrator<A, S> {
    pub fn new(adapter: A, store: S) -> Self {
        Self::with_scorer_config(adapter, store, ScorerConfig::default())
    }

    pub fn with_scorer_config(adapter: A, store: S, scorer_config: ScorerConfig) -> Self {
        Self {
            adapter,
            store,
            scorer_config,
        }
    }

    /// Run one notification to delivery. Never fails from a business
    /// standpoint — only store errors propagate.
    pub async fn deliver(
        &self,
        event_type: EventType,
        force_primary_fail: bool,
        intended_channel: Option<Channel>,
    ) -> anyhow::Result<DeliveryResult> {
        let notification = Notification::new(event_type, force_primary_fail);
        let route = policy::route_for(&notification.event_type, intended_channel);
        let primary_channel = route[0];

        debug!(
            notification_id = %notification.id,
            event_type = %notification.event_type,
            ?route,
            "starting delivery"
        );

        let mut scorer = RetryScorer::new(self.scorer_config.clone());
        let mut attempts: Vec<Attempt> = Vec::new();

        let mut outcome = RealtimeOutcome::Stopped(StopCause::Exhausted);
        for (i, &channel) in route.iter().enumerate() {
            let forced = notification.force_primary_fail && i == 0;
            let result = self.adapter.attempt_send(&notification, channel, forced).await;

            let attempt = Attempt {
                channel,
                status: result.status,
                reason: result.reason,
                timestamp: Utc::now(),
            };
            self.store
                .record_attempt(notification.id, attempts.len() as u32, &attempt)
                .await?;
            let status = attempt.status;
            attempts.push(attempt);

            if status == AttemptStatus::Success {
                outcome = RealtimeOutcome::Delivered(channel);
                break;
            }

            let score = scorer.record_failure(channel);
            debug!(notification_id = %notification.id, channel = %channel, score, "attempt failed");

            match scorer.verdict(route.len() - i - 1) {
                Verdict::Continue => {}
                Verdict::Stop(cause) => {
                    outcome = RealtimeOutcome::Stopped(cause);
                    break;
                }
            }
        }

        let delivered_via = match outcome {
            RealtimeOutcome::Delivered(channel) => channel,
            RealtimeOutcome::Stopped(cause) => {
                // Terminal guarantee: one final attempt against the Inbox
                // channel. The adapter contract says Inbox cannot fail, so
                // the outcome is not consulted.
                self.adapter
                    .attempt_send(&notification, Channel::Inbox, false)
                    .await;

                let reason = match cause {
                    StopCause::Exhausted => REASON_FINAL_FALLBACK,
                    StopCause::RetryScore => REASON_RETRY_SCORE,
                };
                let attempt = Attempt {
                    channel: Channel::Inbox,
                    status: AttemptStatus::Success,
                    reason: Some(reason.to_string()),
                    timestamp: Utc::now(),
                };
                self.store
                    .record_attempt(notification.id, attempts.len() as u32, &attempt)
                    .await?;

                let entry = InboxEntry {
                    notification_id: notification.id,
                    event_type: notification.event_type.clone(),
                    timestamp: attempt.timestamp,
                    delivered_via: Channel::Inbox,
                };
                self.store.append_inbox(&entry).await?;
                attempts.push(attempt);

                Channel::Inbox
            }
        };

        info!(
            notification_id = %notification.id,
            event_type = %notification.event_type,
            delivered_via = %delivered_via,
            attempts = attempts.len(),
            retry_score = scorer.score(),
            "notification delivered"
        );

        Ok(DeliveryResult {
            notification_id: notification.id,
            event_type: notification.event_type,
            primary_channel,
            delivered_via,
            routing_order: route,
            retry_score: scorer.score(),
            retry_percentage: scorer.percentage(),
            attempts,
        })
    }
}
