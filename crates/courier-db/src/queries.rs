use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Local, NaiveDate, Utc};
use rusqlite::params;
use uuid::Uuid;

use courier_types::models::{
    Attempt, AttemptStatus, Channel, DayBucket, EventType, InboxEntry, TrashEntry,
};

use crate::Database;
use crate::models::{AttemptRow, MessageRow};

impl Database {
    // -- Attempt log --

    pub fn insert_attempt(&self, notification_id: Uuid, seq: u32, attempt: &Attempt) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO attempts (notification_id, seq, channel, status, reason, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    notification_id.to_string(),
                    seq,
                    attempt.channel.as_str(),
                    attempt.status.as_str(),
                    attempt.reason,
                    attempt.timestamp.to_rfc3339(),
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_attempts(&self, notification_id: Uuid) -> Result<Vec<Attempt>> {
        let rows = self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT channel, status, reason, timestamp FROM attempts
                 WHERE notification_id = ?1
                 ORDER BY seq ASC",
            )?;
            let rows = stmt
                .query_map([notification_id.to_string()], |row| {
                    Ok(AttemptRow {
                        channel: row.get(0)?,
                        status: row.get(1)?,
                        reason: row.get(2)?,
                        timestamp: row.get(3)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })?;

        rows.into_iter().map(attempt_from).collect()
    }

    // -- Inbox --

    /// Append a terminal-fallback entry. Idempotent on `notification_id`:
    /// a notification reaching fallback twice must not duplicate. Returns
    /// whether a new row was written.
    pub fn insert_inbox_entry(&self, entry: &InboxEntry) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO messages
                     (notification_id, event_type, delivered_via, state, timestamp)
                 VALUES (?1, ?2, ?3, 'active', ?4)",
                params![
                    entry.notification_id.to_string(),
                    entry.event_type.as_str(),
                    entry.delivered_via.as_str(),
                    entry.timestamp.to_rfc3339(),
                ],
            )?;
            Ok(inserted > 0)
        })
    }

    /// Active entries, newest first, optionally filtered by a
    /// case-insensitive substring match on the event type.
    pub fn get_inbox(&self, filter: Option<&str>) -> Result<Vec<InboxEntry>> {
        let rows = self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT notification_id, event_type, delivered_via, timestamp, deleted_at
                 FROM messages
                 WHERE state = 'active'
                   AND (?1 IS NULL OR instr(lower(event_type), lower(?1)) > 0)
                 ORDER BY timestamp DESC",
            )?;
            let rows = stmt
                .query_map(params![filter], message_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })?;

        rows.into_iter().map(inbox_entry_from).collect()
    }

    /// Active entries grouped into Today / Yesterday / Earlier buckets by
    /// local calendar date, fixed display order, empty buckets omitted.
    pub fn get_inbox_grouped(
        &self,
        filter: Option<&str>,
    ) -> Result<Vec<(DayBucket, Vec<InboxEntry>)>> {
        let entries = self.get_inbox(filter)?;
        Ok(group_by_day(entries, Local::now().date_naive()))
    }

    /// Remove every active entry. Irreversible: bulk clear does not route
    /// through Trash (single-entry delete does).
    pub fn clear_inbox(&self) -> Result<usize> {
        self.with_conn_mut(|conn| {
            let removed = conn.execute("DELETE FROM messages WHERE state = 'active'", [])?;
            Ok(removed)
        })
    }

    /// Move one active entry to Trash. Returns whether an entry moved.
    pub fn soft_delete(&self, notification_id: Uuid) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let moved = conn.execute(
                "UPDATE messages SET state = 'trashed', deleted_at = ?2
                 WHERE notification_id = ?1 AND state = 'active'",
                params![notification_id.to_string(), Utc::now().to_rfc3339()],
            )?;
            Ok(moved > 0)
        })
    }

    // -- Trash --

    /// Trashed entries in deletion order.
    pub fn get_trash(&self) -> Result<Vec<TrashEntry>> {
        let rows = self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT notification_id, event_type, delivered_via, timestamp, deleted_at
                 FROM messages
                 WHERE state = 'trashed'
                 ORDER BY deleted_at ASC",
            )?;
            let rows = stmt
                .query_map([], message_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })?;

        rows.into_iter().map(trash_entry_from).collect()
    }

    /// Move a trashed entry back to the inbox with its original fields
    /// intact. Returns `None` when the id is not in Trash; neither store
    /// is touched in that case.
    pub fn restore_message(&self, notification_id: Uuid) -> Result<Option<InboxEntry>> {
        let row = self.with_conn_mut(|conn| {
            let restored = conn.execute(
                "UPDATE messages SET state = 'active', deleted_at = NULL
                 WHERE notification_id = ?1 AND state = 'trashed'",
                [notification_id.to_string()],
            )?;
            if restored == 0 {
                return Ok(None);
            }
            let row = conn.query_row(
                "SELECT notification_id, event_type, delivered_via, timestamp, deleted_at
                 FROM messages WHERE notification_id = ?1",
                [notification_id.to_string()],
                message_row,
            )?;
            Ok(Some(row))
        })?;

        row.map(inbox_entry_from).transpose()
    }

    /// Permanently destroy all trashed entries. Non-recoverable.
    pub fn empty_trash(&self) -> Result<usize> {
        self.with_conn_mut(|conn| {
            let removed = conn.execute("DELETE FROM messages WHERE state = 'trashed'", [])?;
            Ok(removed)
        })
    }
}

fn message_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        notification_id: row.get(0)?,
        event_type: row.get(1)?,
        delivered_via: row.get(2)?,
        timestamp: row.get(3)?,
        deleted_at: row.get(4)?,
    })
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("corrupt timestamp '{raw}'"))
}

fn parse_channel(tag: &str) -> Result<Channel> {
    Channel::from_tag(tag).ok_or_else(|| anyhow!("unknown channel tag '{tag}'"))
}

fn inbox_entry_from(row: MessageRow) -> Result<InboxEntry> {
    Ok(InboxEntry {
        notification_id: row
            .notification_id
            .parse()
            .with_context(|| format!("corrupt notification id '{}'", row.notification_id))?,
        event_type: EventType::from(row.event_type.as_str()),
        timestamp: parse_timestamp(&row.timestamp)?,
        delivered_via: parse_channel(&row.delivered_via)?,
    })
}

fn trash_entry_from(row: MessageRow) -> Result<TrashEntry> {
    let deleted_at = row
        .deleted_at
        .as_deref()
        .ok_or_else(|| anyhow!("trashed row '{}' missing deleted_at", row.notification_id))?;
    let deleted_at = parse_timestamp(deleted_at)?;
    let entry = inbox_entry_from(row)?;
    Ok(TrashEntry {
        notification_id: entry.notification_id,
        event_type: entry.event_type,
        timestamp: entry.timestamp,
        delivered_via: entry.delivered_via,
        deleted_at,
    })
}

fn attempt_from(row: AttemptRow) -> Result<Attempt> {
    Ok(Attempt {
        channel: parse_channel(&row.channel)?,
        status: AttemptStatus::from_tag(&row.status)
            .ok_or_else(|| anyhow!("unknown attempt status '{}'", row.status))?,
        reason: row.reason,
        timestamp: parse_timestamp(&row.timestamp)?,
    })
}

/// Bucket one local calendar date against "today". Midnight-aligned day
/// boundaries, not a rolling 24h window.
fn bucket_for(date: NaiveDate, today: NaiveDate) -> DayBucket {
    if date == today {
        DayBucket::Today
    } else if today.pred_opt() == Some(date) {
        DayBucket::Yesterday
    } else {
        DayBucket::Earlier
    }
}

/// Group entries (already sorted newest-first) into display buckets,
/// omitting empty ones.
fn group_by_day(entries: Vec<InboxEntry>, today: NaiveDate) -> Vec<(DayBucket, Vec<InboxEntry>)> {
    let mut buckets: [(DayBucket, Vec<InboxEntry>); 3] = [
        (DayBucket::Today, Vec::new()),
        (DayBucket::Yesterday, Vec::new()),
        (DayBucket::Earlier, Vec::new()),
    ];

    for entry in entries {
        let local_date = entry.timestamp.with_timezone(&Local).date_naive();
        let slot = match bucket_for(local_date, today) {
            DayBucket::Today => 0,
            DayBucket::Yesterday => 1,
            DayBucket::Earlier => 2,
        };
        buckets[slot].1.push(entry);
    }

    buckets
        .into_iter()
        .filter(|(_, entries)| !entries.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn entry(event_type: EventType, timestamp: DateTime<Utc>) -> InboxEntry {
        InboxEntry {
            notification_id: Uuid::new_v4(),
            event_type,
            timestamp,
            delivered_via: Channel::Inbox,
        }
    }

    fn db_with(entries: &[InboxEntry]) -> Database {
        let db = Database::open_in_memory().unwrap();
        for e in entries {
            assert!(db.insert_inbox_entry(e).unwrap());
        }
        db
    }

    #[test]
    fn insert_inbox_entry_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        let e = entry(EventType::Otp, Utc::now());

        assert!(db.insert_inbox_entry(&e).unwrap());
        assert!(!db.insert_inbox_entry(&e).unwrap());
        assert_eq!(db.get_inbox(None).unwrap().len(), 1);
    }

    #[test]
    fn inbox_lists_newest_first() {
        let now = Utc::now();
        let old = entry(EventType::Otp, now - Duration::hours(2));
        let new = entry(EventType::FraudAlert, now);
        let db = db_with(&[old.clone(), new.clone()]);

        let listed = db.get_inbox(None).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].notification_id, new.notification_id);
        assert_eq!(listed[1].notification_id, old.notification_id);
    }

    #[test]
    fn inbox_filter_is_case_insensitive_substring() {
        let now = Utc::now();
        let db = db_with(&[
            entry(EventType::Otp, now),
            entry(EventType::TransactionOtp, now - Duration::minutes(1)),
            entry(EventType::FraudAlert, now - Duration::minutes(2)),
        ]);

        let matched = db.get_inbox(Some("otp")).unwrap();
        assert_eq!(matched.len(), 2);
        assert!(matched.iter().all(|e| e.event_type.as_str().contains("OTP")));

        assert!(db.get_inbox(Some("statement")).unwrap().is_empty());
    }

    #[test]
    fn soft_delete_moves_entry_to_trash() {
        let e = entry(EventType::Otp, Utc::now());
        let db = db_with(&[e.clone()]);

        assert!(db.soft_delete(e.notification_id).unwrap());
        assert!(db.get_inbox(None).unwrap().is_empty());

        let trash = db.get_trash().unwrap();
        assert_eq!(trash.len(), 1);
        assert_eq!(trash[0].notification_id, e.notification_id);
        assert_eq!(trash[0].event_type, e.event_type);
    }

    #[test]
    fn soft_delete_unknown_id_is_a_noop() {
        let db = db_with(&[entry(EventType::Otp, Utc::now())]);
        assert!(!db.soft_delete(Uuid::new_v4()).unwrap());
        assert_eq!(db.get_inbox(None).unwrap().len(), 1);
        assert!(db.get_trash().unwrap().is_empty());
    }

    #[test]
    fn restore_round_trips_original_fields() {
        let e = entry(EventType::PaymentConfirmation, Utc::now());
        let db = db_with(&[e.clone()]);

        db.soft_delete(e.notification_id).unwrap();
        let restored = db.restore_message(e.notification_id).unwrap().unwrap();

        assert_eq!(restored, e);
        assert!(db.get_trash().unwrap().is_empty());

        let inbox = db.get_inbox(None).unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0], e);
    }

    #[test]
    fn restore_unknown_id_leaves_stores_unchanged() {
        let kept = entry(EventType::Otp, Utc::now());
        let trashed = entry(EventType::FraudAlert, Utc::now());
        let db = db_with(&[kept.clone(), trashed.clone()]);
        db.soft_delete(trashed.notification_id).unwrap();

        assert!(db.restore_message(Uuid::new_v4()).unwrap().is_none());
        assert_eq!(db.get_inbox(None).unwrap().len(), 1);
        assert_eq!(db.get_trash().unwrap().len(), 1);
    }

    #[test]
    fn empty_trash_is_permanent() {
        let e = entry(EventType::Otp, Utc::now());
        let db = db_with(&[e.clone()]);
        db.soft_delete(e.notification_id).unwrap();

        assert_eq!(db.empty_trash().unwrap(), 1);
        assert!(db.get_trash().unwrap().is_empty());
        // purged entries cannot be restored
        assert!(db.restore_message(e.notification_id).unwrap().is_none());
    }

    #[test]
    fn clear_inbox_does_not_touch_trash() {
        let active = entry(EventType::Otp, Utc::now());
        let trashed = entry(EventType::FraudAlert, Utc::now());
        let db = db_with(&[active, trashed.clone()]);
        db.soft_delete(trashed.notification_id).unwrap();

        assert_eq!(db.clear_inbox().unwrap(), 1);
        assert!(db.get_inbox(None).unwrap().is_empty());
        assert_eq!(db.get_trash().unwrap().len(), 1);
    }

    #[test]
    fn attempts_round_trip_in_sequence_order() {
        let db = Database::open_in_memory().unwrap();
        let id = Uuid::new_v4();
        let now = Utc::now();

        let attempts = [
            Attempt {
                channel: Channel::Sms,
                status: AttemptStatus::Failed,
                reason: Some("channel_unavailable".to_string()),
                timestamp: now,
            },
            Attempt {
                channel: Channel::Inbox,
                status: AttemptStatus::Success,
                reason: Some("forced_final_fallback".to_string()),
                timestamp: now,
            },
        ];
        for (i, a) in attempts.iter().enumerate() {
            db.insert_attempt(id, i as u32, a).unwrap();
        }

        let stored = db.get_attempts(id).unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].channel, Channel::Sms);
        assert_eq!(stored[0].reason.as_deref(), Some("channel_unavailable"));
        assert_eq!(stored[1].channel, Channel::Inbox);
        assert_eq!(stored[1].status, AttemptStatus::Success);
    }

    #[test]
    fn bucket_for_is_midnight_aligned() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        assert_eq!(bucket_for(today, today), DayBucket::Today);
        assert_eq!(
            bucket_for(today.pred_opt().unwrap(), today),
            DayBucket::Yesterday
        );
        assert_eq!(
            bucket_for(NaiveDate::from_ymd_opt(2026, 3, 8).unwrap(), today),
            DayBucket::Earlier
        );
        // future dates (clock skew) land in Earlier rather than inventing
        // a bucket
        assert_eq!(
            bucket_for(NaiveDate::from_ymd_opt(2026, 3, 11).unwrap(), today),
            DayBucket::Earlier
        );
    }

    #[test]
    fn grouping_omits_empty_buckets_and_keeps_order() {
        let now = Local::now();
        let today = now.date_naive();

        let today_entry = entry(EventType::Otp, now.with_timezone(&Utc));
        let earlier_entry = entry(
            EventType::FraudAlert,
            (now - Duration::days(5)).with_timezone(&Utc),
        );

        let groups = group_by_day(vec![today_entry.clone(), earlier_entry.clone()], today);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, DayBucket::Today);
        assert_eq!(groups[0].1[0].notification_id, today_entry.notification_id);
        assert_eq!(groups[1].0, DayBucket::Earlier);
        assert_eq!(groups[1].1[0].notification_id, earlier_entry.notification_id);
    }

    #[test]
    fn grouping_splits_yesterday_from_today() {
        let now = Local::now();
        let today = now.date_naive();

        let yesterday_entry = entry(
            EventType::MonthlyStatement,
            (now - Duration::days(1)).with_timezone(&Utc),
        );
        let groups = group_by_day(vec![yesterday_entry], today);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].0, DayBucket::Yesterday);
    }
}
