use rusqlite::Connection;

/// Run all pending migrations on the database.
///
/// Uses `PRAGMA user_version` to track which migrations have been applied.
pub fn migrate(conn: &Connection) -> rusqlite::Result<()> {
    let version: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    if version < 1 {
        migrate_v0_to_v1(conn)?;
    }

    Ok(())
}

fn migrate_v0_to_v1(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE conferences (
            id              INTEGER PRIMARY KEY,
            acronym         TEXT NOT NULL UNIQUE,
            slug            TEXT NOT NULL UNIQUE,
            title           TEXT,
            schedule_url    TEXT,
            schedule_state  TEXT NOT NULL DEFAULT 'not_present',
            logo            TEXT,
            images_path     TEXT NOT NULL,
            recordings_path TEXT NOT NULL,
            aspect_ratio    TEXT,
            created_at      TEXT NOT NULL,
            updated_at      TEXT NOT NULL
        );

        CREATE TABLE events (
            id              INTEGER PRIMARY KEY,
            conference_id   INTEGER NOT NULL REFERENCES conferences ON DELETE CASCADE,
            guid            TEXT NOT NULL UNIQUE,
            title           TEXT NOT NULL,
            created_at      TEXT NOT NULL
        );

        CREATE INDEX idx_events_conference ON events(conference_id);

        PRAGMA user_version = 1;
        ",
    )?;
    Ok(())
}
