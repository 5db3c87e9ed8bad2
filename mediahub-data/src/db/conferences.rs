use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use crate::conference::{Conference, NewConference};
use crate::schedule::ScheduleState;

const COLUMNS: &str = "id, acronym, slug, title, schedule_url, schedule_state, logo, images_path, recordings_path, aspect_ratio, created_at, updated_at";

/// Insert a new conference record. Returns the assigned id.
///
/// The schedule state starts at `not_present`; timestamps are set here.
pub fn insert(conn: &Connection, new: &NewConference) -> rusqlite::Result<i64> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO conferences (acronym, slug, title, schedule_url, logo, images_path, recordings_path, aspect_ratio, schedule_state, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            new.acronym,
            new.slug,
            new.title,
            new.schedule_url,
            new.logo,
            new.images_path,
            new.recordings_path,
            new.aspect_ratio,
            ScheduleState::initial().as_str(),
            now,
            now,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn find_by_id(conn: &Connection, id: i64) -> rusqlite::Result<Option<Conference>> {
    conn.query_row(
        &format!("SELECT {} FROM conferences WHERE id = ?1", COLUMNS),
        params![id],
        row_to_conference,
    )
    .optional()
}

pub fn find_by_slug(conn: &Connection, slug: &str) -> rusqlite::Result<Option<Conference>> {
    conn.query_row(
        &format!("SELECT {} FROM conferences WHERE slug = ?1", COLUMNS),
        params![slug],
        row_to_conference,
    )
    .optional()
}

/// List all conferences, most recently created first.
pub fn list_all(conn: &Connection) -> rusqlite::Result<Vec<Conference>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM conferences ORDER BY created_at DESC, id DESC",
        COLUMNS
    ))?;
    let rows = stmt.query_map([], row_to_conference)?;
    rows.collect()
}

/// Set the schedule URL (possibly clearing it).
pub fn update_schedule_url(
    conn: &Connection,
    id: i64,
    schedule_url: Option<&str>,
) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE conferences SET schedule_url = ?1, updated_at = ?2 WHERE id = ?3",
        params![schedule_url, Utc::now().to_rfc3339(), id],
    )?;
    Ok(())
}

/// Persist a schedule state transition.
pub fn update_schedule_state(
    conn: &Connection,
    id: i64,
    state: ScheduleState,
) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE conferences SET schedule_state = ?1, updated_at = ?2 WHERE id = ?3",
        params![state.as_str(), Utc::now().to_rfc3339(), id],
    )?;
    Ok(())
}

/// Delete a conference. Owned events go with it (ON DELETE CASCADE).
/// Returns the number of deleted conference rows.
pub fn delete(conn: &Connection, id: i64) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM conferences WHERE id = ?1", params![id])
}

/// Map a uniqueness-constraint failure back to the offending field, so
/// the API can report it like any other validation error.
pub fn unique_violation_field(err: &rusqlite::Error) -> Option<&'static str> {
    match err {
        rusqlite::Error::SqliteFailure(e, Some(msg))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            if msg.contains("conferences.acronym") {
                Some("acronym")
            } else if msg.contains("conferences.slug") {
                Some("slug")
            } else {
                None
            }
        }
        _ => None,
    }
}

fn row_to_conference(row: &rusqlite::Row) -> rusqlite::Result<Conference> {
    let state: String = row.get(5)?;
    let schedule_state = state.parse::<ScheduleState>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Conference {
        id: row.get(0)?,
        acronym: row.get(1)?,
        slug: row.get(2)?,
        title: row.get(3)?,
        schedule_url: row.get(4)?,
        schedule_state,
        logo: row.get(6)?,
        images_path: row.get(7)?,
        recordings_path: row.get(8)?,
        aspect_ratio: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}
