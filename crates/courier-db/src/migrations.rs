use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        -- One transactional store for inbox and trash: a message is either
        -- 'active' or 'trashed', never in both containers and never in
        -- neither.
        CREATE TABLE IF NOT EXISTS messages (
            notification_id TEXT PRIMARY KEY,
            event_type      TEXT NOT NULL,
            delivered_via   TEXT NOT NULL,
            state           TEXT NOT NULL DEFAULT 'active'
                            CHECK (state IN ('active', 'trashed')),
            timestamp       TEXT NOT NULL,
            deleted_at      TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_messages_state
            ON messages(state, timestamp);

        -- Append-only delivery attempt log.
        CREATE TABLE IF NOT EXISTS attempts (
            notification_id TEXT NOT NULL,
            seq             INTEGER NOT NULL,
            channel         TEXT NOT NULL,
            status          TEXT NOT NULL,
            reason          TEXT,
            timestamp       TEXT NOT NULL,
            PRIMARY KEY (notification_id, seq)
        );
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
