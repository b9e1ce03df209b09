/// Database row types — these map directly to SQLite rows.
/// Distinct from the courier-types domain models to keep the DB layer
/// independent; conversion happens in `queries`.

pub struct MessageRow {
    pub notification_id: String,
    pub event_type: String,
    pub delivered_via: String,
    pub timestamp: String,
    pub deleted_at: Option<String>,
}

pub struct AttemptRow {
    pub channel: String,
    pub status: String,
    pub reason: Option<String>,
    pub timestamp: String,
}
