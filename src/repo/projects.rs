use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{now_str, parse_ts};
use crate::error::AppError;
use crate::models::project::{NewProject, Paging, Project, UpdateProject};
use crate::models::Id;

fn from_row(row: &Row) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get("id")?,
        owner_id: row.get("owner_id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        parent_id: row.get("parent_id")?,
        path: row.get("path")?,
        created_at: parse_ts(row, "created_at")?,
        updated_at: parse_ts(row, "updated_at")?,
    })
}

const SELECT: &str = "SELECT id, owner_id, name, description, parent_id, path, created_at, updated_at FROM projects";

pub fn find_by_id_for_owner(conn: &Connection, id: Id, owner_id: Id) -> Result<Option<Project>, AppError> {
    conn.query_row(
        &format!("{SELECT} WHERE id = ?1 AND owner_id = ?2"),
        params![id, owner_id],
        from_row,
    )
    .optional()
    .map_err(AppError::from)
}

pub fn list_for_owner(conn: &Connection, owner_id: Id, paging: &Paging) -> Result<Vec<Project>, AppError> {
    let mut stmt = conn.prepare(&format!(
        "{SELECT} WHERE owner_id = ?1 ORDER BY path LIMIT ?2 OFFSET ?3"
    ))?;
    let rows = stmt
        .query_map(
            params![owner_id, paging.limit_or_default(), paging.offset_or_default()],
            from_row,
        )?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn list_all_for_owner(conn: &Connection, owner_id: Id) -> Result<Vec<Project>, AppError> {
    let mut stmt = conn.prepare(&format!("{SELECT} WHERE owner_id = ?1 ORDER BY path"))?;
    let rows = stmt
        .query_map(params![owner_id], from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn list_children(conn: &Connection, parent_id: Option<Id>, owner_id: Id) -> Result<Vec<Project>, AppError> {
    let mut stmt = match parent_id {
        Some(_) => conn.prepare(&format!(
            "{SELECT} WHERE owner_id = ?1 AND parent_id = ?2 ORDER BY name"
        ))?,
        None => conn.prepare(&format!(
            "{SELECT} WHERE owner_id = ?1 AND parent_id IS NULL ORDER BY name"
        ))?,
    };

    let rows = match parent_id {
        Some(pid) => stmt
            .query_map(params![owner_id, pid], from_row)?
            .collect::<Result<Vec<_>, _>>()?,
        None => stmt
            .query_map(params![owner_id], from_row)?
            .collect::<Result<Vec<_>, _>>()?,
    };
    Ok(rows)
}

pub fn design_count(conn: &Connection, project_id: Id) -> Result<i64, AppError> {
    conn.query_row(
        "SELECT COUNT(*) FROM designs WHERE project_id = ?1",
        params![project_id],
        |r| r.get(0),
    )
    .map_err(AppError::from)
}

pub fn optimization_count(conn: &Connection, project_id: Id) -> Result<i64, AppError> {
    conn.query_row(
        "SELECT COUNT(*) FROM optimizations WHERE project_id = ?1",
        params![project_id],
        |r| r.get(0),
    )
    .map_err(AppError::from)
}

/// Computes this project's materialised path from its parent's path (or `/`
/// for a root).
fn compute_path(conn: &Connection, parent_id: Option<Id>, owner_id: Id, name: &str) -> Result<String, AppError> {
    match parent_id {
        None => Ok(format!("/{name}")),
        Some(pid) => {
            let parent = find_by_id_for_owner(conn, pid, owner_id)?
                .ok_or_else(|| AppError::Validation("parent project does not exist".into()))?;
            Ok(format!("{}/{}", parent.path, name))
        }
    }
}

pub fn insert(conn: &Connection, owner_id: Id, input: NewProject) -> Result<Project, AppError> {
    let path = compute_path(conn, input.parent_id, owner_id, &input.name)?;
    let now = now_str();

    conn.execute(
        "INSERT INTO projects (owner_id, name, description, parent_id, path, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
        params![owner_id, input.name, input.description, input.parent_id, path, now],
    )?;

    let id = conn.last_insert_rowid();
    find_by_id_for_owner(conn, id, owner_id)?.ok_or(AppError::NotFound)
}

/// Updates a project; if name or parent changed, recomputes this project's
/// path and eagerly rewrites every descendant's path in the same transaction.
pub fn update(conn: &Connection, id: Id, owner_id: Id, input: UpdateProject) -> Result<Project, AppError> {
    let existing = find_by_id_for_owner(conn, id, owner_id)?.ok_or(AppError::NotFound)?;

    let path_changed = existing.name != input.name || existing.parent_id != input.parent_id;
    let new_path = if path_changed {
        compute_path(conn, input.parent_id, owner_id, &input.name)?
    } else {
        existing.path.clone()
    };

    conn.execute(
        "UPDATE projects SET name = ?2, description = ?3, parent_id = ?4, path = ?5, updated_at = ?6 \
         WHERE id = ?1",
        params![id, input.name, input.description, input.parent_id, new_path, now_str()],
    )?;

    if path_changed && new_path != existing.path {
        rewrite_descendant_paths(conn, owner_id, &existing.path, &new_path)?;
    }

    find_by_id_for_owner(conn, id, owner_id)?.ok_or(AppError::NotFound)
}

fn rewrite_descendant_paths(
    conn: &Connection,
    owner_id: Id,
    old_prefix: &str,
    new_prefix: &str,
) -> Result<(), AppError> {
    let like_pattern = format!("{old_prefix}/%");
    let mut stmt = conn.prepare(
        "SELECT id, path FROM projects WHERE owner_id = ?1 AND path LIKE ?2",
    )?;
    let descendants: Vec<(Id, String)> = stmt
        .query_map(params![owner_id, like_pattern], |r| Ok((r.get(0)?, r.get(1)?)))?
        .collect::<Result<_, _>>()?;

    for (descendant_id, descendant_path) in descendants {
        let rewritten = format!("{new_prefix}{}", &descendant_path[old_prefix.len()..]);
        conn.execute(
            "UPDATE projects SET path = ?2, updated_at = ?3 WHERE id = ?1",
            params![descendant_id, rewritten, now_str()],
        )?;
    }

    Ok(())
}

/// Deletes a project and cascades to every descendant project (enforced at
/// the schema level by `ON DELETE CASCADE` on `parent_id`). Designs and
/// optimizations formerly under the deleted subtree have their `project_id`
/// cleared by the schema's `ON DELETE SET NULL`, so ownership survives.
pub fn delete(conn: &Connection, id: Id, owner_id: Id) -> Result<bool, AppError> {
    let changed = conn.execute(
        "DELETE FROM projects WHERE id = ?1 AND owner_id = ?2",
        params![id, owner_id],
    )?;
    Ok(changed > 0)
}
