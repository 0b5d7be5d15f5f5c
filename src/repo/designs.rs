use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::warn;

use super::{now_str, parse_ts};
use crate::error::AppError;
use crate::models::design::{Design, NewDesign, UpdateDesign};
use crate::models::elements::Elements;
use crate::models::Id;

/// Builds a `Design` from a row, logging and returning `elements: None` if the
/// JSON blob fails to deserialize rather than failing the whole row.
fn from_row_lenient(row: &Row) -> rusqlite::Result<Design> {
    let elements_json: String = row.get("elements_json")?;
    let elements = match serde_json::from_str::<Elements>(&elements_json) {
        Ok(e) => Some(e),
        Err(e) => {
            warn!(error = %e, design_id = ?row.get::<_, Id>("id"), "failed to deserialize design elements");
            None
        }
    };

    Ok(Design {
        id: row.get("id")?,
        owner_id: row.get("owner_id")?,
        project_id: row.get("project_id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        width_mm: row.get("width_mm")?,
        height_mm: row.get("height_mm")?,
        thickness_mm: row.get("thickness_mm")?,
        elements,
        created_at: parse_ts(row, "created_at")?,
        updated_at: parse_ts(row, "updated_at")?,
    })
}

const SELECT: &str = "SELECT id, owner_id, project_id, name, description, width_mm, height_mm, \
    thickness_mm, elements_json, created_at, updated_at FROM designs";

struct RawDesignRow {
    id: Id,
    owner_id: Id,
    project_id: Option<Id>,
    name: String,
    description: String,
    width_mm: f64,
    height_mm: f64,
    thickness_mm: f64,
    elements_json: String,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

fn raw_from_row(row: &Row) -> rusqlite::Result<RawDesignRow> {
    Ok(RawDesignRow {
        id: row.get("id")?,
        owner_id: row.get("owner_id")?,
        project_id: row.get("project_id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        width_mm: row.get("width_mm")?,
        height_mm: row.get("height_mm")?,
        thickness_mm: row.get("thickness_mm")?,
        elements_json: row.get("elements_json")?,
        created_at: parse_ts(row, "created_at")?,
        updated_at: parse_ts(row, "updated_at")?,
    })
}

/// Reads a single design, failing loudly if its JSON blob doesn't parse.
pub fn find_by_id_for_owner(conn: &Connection, id: Id, owner_id: Id) -> Result<Option<Design>, AppError> {
    let raw = conn
        .query_row(
            &format!("{SELECT} WHERE id = ?1 AND owner_id = ?2"),
            params![id, owner_id],
            raw_from_row,
        )
        .optional()?;

    let Some(raw) = raw else {
        return Ok(None);
    };

    let elements: Elements = serde_json::from_str(&raw.elements_json)?;

    Ok(Some(Design {
        id: raw.id,
        owner_id: raw.owner_id,
        project_id: raw.project_id,
        name: raw.name,
        description: raw.description,
        width_mm: raw.width_mm,
        height_mm: raw.height_mm,
        thickness_mm: raw.thickness_mm,
        elements: Some(elements),
        created_at: raw.created_at,
        updated_at: raw.updated_at,
    }))
}

pub fn list_for_owner(conn: &Connection, owner_id: Id) -> Result<Vec<Design>, AppError> {
    let mut stmt = conn.prepare(&format!("{SELECT} WHERE owner_id = ?1 ORDER BY updated_at DESC"))?;
    let rows = stmt
        .query_map(params![owner_id], from_row_lenient)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn list_for_project(conn: &Connection, project_id: Id, owner_id: Id) -> Result<Vec<Design>, AppError> {
    let mut stmt = conn.prepare(&format!(
        "{SELECT} WHERE owner_id = ?1 AND project_id = ?2 ORDER BY updated_at DESC"
    ))?;
    let rows = stmt
        .query_map(params![owner_id, project_id], from_row_lenient)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn search_for_owner(conn: &Connection, owner_id: Id, query: &str) -> Result<Vec<Design>, AppError> {
    let pattern = format!("%{}%", query.replace('%', "\\%"));
    let mut stmt = conn.prepare(&format!(
        "{SELECT} WHERE owner_id = ?1 AND (name LIKE ?2 ESCAPE '\\' OR description LIKE ?2 ESCAPE '\\') \
         ORDER BY updated_at DESC"
    ))?;
    let rows = stmt
        .query_map(params![owner_id, pattern], from_row_lenient)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn insert(conn: &Connection, owner_id: Id, input: NewDesign) -> Result<Design, AppError> {
    let elements_json = serde_json::to_string(&input.elements)?;
    let now = now_str();

    conn.execute(
        "INSERT INTO designs (owner_id, project_id, name, description, width_mm, height_mm, \
         thickness_mm, elements_json, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
        params![
            owner_id,
            input.project_id,
            input.name,
            input.description,
            input.width_mm,
            input.height_mm,
            input.thickness_mm,
            elements_json,
            now,
        ],
    )?;

    let id = conn.last_insert_rowid();
    find_by_id_for_owner(conn, id, owner_id)?.ok_or(AppError::NotFound)
}

pub fn update(conn: &Connection, id: Id, owner_id: Id, input: UpdateDesign) -> Result<Design, AppError> {
    let elements_json = serde_json::to_string(&input.elements)?;

    let changed = conn.execute(
        "UPDATE designs SET project_id = ?3, name = ?4, description = ?5, width_mm = ?6, height_mm = ?7, \
         thickness_mm = ?8, elements_json = ?9, updated_at = ?10 WHERE id = ?1 AND owner_id = ?2",
        params![
            id,
            owner_id,
            input.project_id,
            input.name,
            input.description,
            input.width_mm,
            input.height_mm,
            input.thickness_mm,
            elements_json,
            now_str(),
        ],
    )?;

    if changed == 0 {
        return Err(AppError::NotFound);
    }

    find_by_id_for_owner(conn, id, owner_id)?.ok_or(AppError::NotFound)
}

pub fn move_to_project(conn: &Connection, id: Id, owner_id: Id, project_id: Option<Id>) -> Result<Design, AppError> {
    let changed = conn.execute(
        "UPDATE designs SET project_id = ?3, updated_at = ?4 WHERE id = ?1 AND owner_id = ?2",
        params![id, owner_id, project_id, now_str()],
    )?;

    if changed == 0 {
        return Err(AppError::NotFound);
    }

    find_by_id_for_owner(conn, id, owner_id)?.ok_or(AppError::NotFound)
}

pub fn delete(conn: &Connection, id: Id, owner_id: Id) -> Result<bool, AppError> {
    let changed = conn.execute("DELETE FROM designs WHERE id = ?1 AND owner_id = ?2", params![id, owner_id])?;
    Ok(changed > 0)
}
