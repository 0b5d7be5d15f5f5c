use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{now_str, parse_ts, ts_str};
use crate::error::AppError;
use crate::models::session::Session;
use crate::models::Id;

fn from_row(row: &Row) -> rusqlite::Result<Session> {
    Ok(Session {
        id: row.get("id")?,
        owner_id: row.get("owner_id")?,
        session_id: row.get("session_id")?,
        expires_at: parse_ts(row, "expires_at")?,
        source_address: row.get("source_address")?,
        user_agent: row.get("user_agent")?,
        created_at: parse_ts(row, "created_at")?,
        last_access_at: parse_ts(row, "last_access_at")?,
    })
}

const SELECT: &str = "SELECT id, owner_id, session_id, expires_at, source_address, user_agent, \
    created_at, last_access_at FROM sessions";

pub struct NewSessionRow<'a> {
    pub owner_id: Id,
    pub session_id: &'a str,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub source_address: Option<&'a str>,
    pub user_agent: Option<&'a str>,
}

pub fn insert(conn: &Connection, input: NewSessionRow) -> Result<Session, AppError> {
    let now = now_str();
    conn.execute(
        "INSERT INTO sessions (owner_id, session_id, expires_at, source_address, user_agent, \
         created_at, last_access_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
        params![
            input.owner_id,
            input.session_id,
            ts_str(input.expires_at),
            input.source_address,
            input.user_agent,
            now,
        ],
    )?;

    let id = conn.last_insert_rowid();
    conn.query_row(&format!("{SELECT} WHERE id = ?1"), params![id], from_row)
        .map_err(AppError::from)
}

pub fn find_by_session_id(conn: &Connection, session_id: &str) -> Result<Option<Session>, AppError> {
    conn.query_row(
        &format!("{SELECT} WHERE session_id = ?1"),
        params![session_id],
        from_row,
    )
    .optional()
    .map_err(AppError::from)
}

pub fn list_active_for_owner(conn: &Connection, owner_id: Id) -> Result<Vec<Session>, AppError> {
    let mut stmt = conn.prepare(&format!("{SELECT} WHERE owner_id = ?1 AND expires_at > ?2 ORDER BY last_access_at DESC"))?;
    let rows = stmt
        .query_map(params![owner_id, now_str()], from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Deletes the session row matching `session_id`, if any. Idempotent: an
/// unknown session id is not an error.
pub fn delete_by_session_id(conn: &Connection, session_id: &str) -> Result<(), AppError> {
    conn.execute("DELETE FROM sessions WHERE session_id = ?1", params![session_id])?;
    Ok(())
}

pub fn delete_by_id_for_owner(conn: &Connection, id: Id, owner_id: Id) -> Result<bool, AppError> {
    let changed = conn.execute(
        "DELETE FROM sessions WHERE id = ?1 AND owner_id = ?2",
        params![id, owner_id],
    )?;
    Ok(changed > 0)
}

pub fn delete_all_for_owner(conn: &Connection, owner_id: Id) -> Result<(), AppError> {
    conn.execute("DELETE FROM sessions WHERE owner_id = ?1", params![owner_id])?;
    Ok(())
}
