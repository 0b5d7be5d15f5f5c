use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{now_str, parse_ts, parse_ts_opt, ts_str};
use crate::error::AppError;
use crate::models::user::User;
use crate::models::Id;

fn from_row(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get("id")?,
        email: row.get("email")?,
        password_hash: row.get("password_hash")?,
        given_name: row.get("given_name")?,
        family_name: row.get("family_name")?,
        verified: row.get::<_, i64>("verified")? != 0,
        verification_token: row.get("verification_token")?,
        reset_token: row.get("reset_token")?,
        reset_token_expires_at: parse_ts_opt(row, "reset_token_expires_at")?,
        last_login_at: parse_ts_opt(row, "last_login_at")?,
        failed_login_count: row.get("failed_login_count")?,
        lock_until: parse_ts_opt(row, "lock_until")?,
        created_at: parse_ts(row, "created_at")?,
        updated_at: parse_ts(row, "updated_at")?,
    })
}

const SELECT: &str = "SELECT id, email, password_hash, given_name, family_name, verified, \
    verification_token, reset_token, reset_token_expires_at, last_login_at, \
    failed_login_count, lock_until, created_at, updated_at FROM users";

pub fn find_by_id(conn: &Connection, id: Id) -> Result<Option<User>, AppError> {
    conn.query_row(&format!("{SELECT} WHERE id = ?1"), params![id], from_row)
        .optional()
        .map_err(AppError::from)
}

pub fn find_by_email(conn: &Connection, email: &str) -> Result<Option<User>, AppError> {
    conn.query_row(
        &format!("{SELECT} WHERE email = ?1"),
        params![email.to_lowercase()],
        from_row,
    )
    .optional()
    .map_err(AppError::from)
}

pub fn find_by_verification_token(conn: &Connection, token: &str) -> Result<Option<User>, AppError> {
    conn.query_row(
        &format!("{SELECT} WHERE verification_token = ?1"),
        params![token],
        from_row,
    )
    .optional()
    .map_err(AppError::from)
}

pub fn find_by_reset_token(conn: &Connection, token: &str) -> Result<Option<User>, AppError> {
    conn.query_row(
        &format!("{SELECT} WHERE reset_token = ?1"),
        params![token],
        from_row,
    )
    .optional()
    .map_err(AppError::from)
}

pub struct NewUserRow<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
    pub given_name: &'a str,
    pub family_name: &'a str,
    pub verified: bool,
    pub verification_token: Option<&'a str>,
}

pub fn insert(conn: &Connection, input: NewUserRow) -> Result<User, AppError> {
    let now = now_str();

    let result = conn.execute(
        "INSERT INTO users (email, password_hash, given_name, family_name, verified, \
         verification_token, failed_login_count, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7, ?7)",
        params![
            input.email.to_lowercase(),
            input.password_hash,
            input.given_name,
            input.family_name,
            input.verified as i64,
            input.verification_token,
            now,
        ],
    );

    match result {
        Ok(_) => {}
        Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            return Err(AppError::Conflict(format!(
                "an account with email {} already exists",
                input.email.to_lowercase()
            )));
        }
        Err(e) => return Err(AppError::from(e)),
    }

    let id = conn.last_insert_rowid();
    find_by_id(conn, id)?.ok_or(AppError::NotFound)
}

pub fn record_login_success(conn: &Connection, id: Id) -> Result<(), AppError> {
    conn.execute(
        "UPDATE users SET last_login_at = ?2, failed_login_count = 0, lock_until = NULL, updated_at = ?2 \
         WHERE id = ?1",
        params![id, now_str()],
    )?;
    Ok(())
}

/// Increments the failed-login counter and, once it reaches the threshold,
/// sets `lock_until` `lockout_minutes` from now.
pub fn record_login_failure(
    conn: &Connection,
    id: Id,
    threshold: i64,
    lockout_minutes: i64,
) -> Result<(), AppError> {
    conn.execute(
        "UPDATE users SET failed_login_count = failed_login_count + 1, updated_at = ?2 WHERE id = ?1",
        params![id, now_str()],
    )?;

    let count: i64 = conn.query_row(
        "SELECT failed_login_count FROM users WHERE id = ?1",
        params![id],
        |r| r.get(0),
    )?;

    if count >= threshold {
        let lock_until = chrono::Utc::now() + chrono::Duration::minutes(lockout_minutes);
        conn.execute(
            "UPDATE users SET lock_until = ?2 WHERE id = ?1",
            params![id, ts_str(lock_until)],
        )?;
    }

    Ok(())
}

pub fn set_password(conn: &Connection, id: Id, password_hash: &str) -> Result<(), AppError> {
    conn.execute(
        "UPDATE users SET password_hash = ?2, reset_token = NULL, reset_token_expires_at = NULL, updated_at = ?3 \
         WHERE id = ?1",
        params![id, password_hash, now_str()],
    )?;
    Ok(())
}

pub fn set_reset_token(
    conn: &Connection,
    id: Id,
    token: &str,
    expires_at: chrono::DateTime<chrono::Utc>,
) -> Result<(), AppError> {
    conn.execute(
        "UPDATE users SET reset_token = ?2, reset_token_expires_at = ?3, updated_at = ?4 WHERE id = ?1",
        params![id, token, ts_str(expires_at), now_str()],
    )?;
    Ok(())
}

pub fn verify_email(conn: &Connection, id: Id) -> Result<(), AppError> {
    conn.execute(
        "UPDATE users SET verified = 1, verification_token = NULL, updated_at = ?2 WHERE id = ?1",
        params![id, now_str()],
    )?;
    Ok(())
}
