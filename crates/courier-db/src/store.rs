//! `DeliveryStore` implementation backing the orchestrator with SQLite.
//!
//! Runs the blocking rusqlite work off the async runtime.

use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use uuid::Uuid;

use courier_delivery::orchestrator::DeliveryStore;
use courier_types::models::{Attempt, InboxEntry};

use crate::Database;

/// Store handle wrapping a shared [`Database`].
///
/// The `DeliveryStore` trait and `Arc` both live outside this crate, so the
/// orphan rule forbids `impl DeliveryStore for Arc<Database>` here. This thin
/// local newtype is the covered type that lets the impl live in this crate
/// while still owning a cloneable shared handle for `spawn_blocking`.
#[derive(Clone)]
pub struct DbStore(pub Arc<Database>);

impl DbStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self(db)
    }
}

#[async_trait]
impl DeliveryStore for DbStore {
    async fn record_attempt(
        &self,
        notification_id: Uuid,
        seq: u32,
        attempt: &Attempt,
    ) -> anyhow::Result<()> {
        let db = self.0.clone();
        let attempt = attempt.clone();
        tokio::task::spawn_blocking(move || db.insert_attempt(notification_id, seq, &attempt))
            .await
            .map_err(|e| anyhow!("task join error: {e}"))?
    }

    async fn append_inbox(&self, entry: &InboxEntry) -> anyhow::Result<()> {
        let db = self.0.clone();
        let entry = entry.clone();
        tokio::task::spawn_blocking(move || db.insert_inbox_entry(&entry).map(|_| ()))
            .await
            .map_err(|e| anyhow!("task join error: {e}"))?
    }
}
