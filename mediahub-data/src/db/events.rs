use chrono::Utc;
use rusqlite::{params, Connection};
use serde::Serialize;

/// A recorded session owned by a conference. Deliberately thin: enough
/// surface for ownership and cascading deletes, nothing more.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub id: i64,
    pub conference_id: i64,
    pub guid: String,
    pub title: String,
    pub created_at: String,
}

/// Insert a new event under a conference. Returns the assigned id.
pub fn insert(
    conn: &Connection,
    conference_id: i64,
    guid: &str,
    title: &str,
) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO events (conference_id, guid, title, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![conference_id, guid, title, Utc::now().to_rfc3339()],
    )?;
    Ok(conn.last_insert_rowid())
}

/// List all events owned by a conference, oldest first.
pub fn list_by_conference(conn: &Connection, conference_id: i64) -> rusqlite::Result<Vec<Event>> {
    let mut stmt = conn.prepare(
        "SELECT id, conference_id, guid, title, created_at
         FROM events WHERE conference_id = ?1 ORDER BY id",
    )?;
    let rows = stmt.query_map(params![conference_id], row_to_event)?;
    rows.collect()
}

fn row_to_event(row: &rusqlite::Row) -> rusqlite::Result<Event> {
    Ok(Event {
        id: row.get(0)?,
        conference_id: row.get(1)?,
        guid: row.get(2)?,
        title: row.get(3)?,
        created_at: row.get(4)?,
    })
}
