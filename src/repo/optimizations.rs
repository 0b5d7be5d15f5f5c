use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{now_str, parse_ts};
use crate::error::AppError;
use crate::models::nesting::{Algorithm, Layout, PlacementOptions};
use crate::models::optimization::{Optimization, OptimizationDesignItem};
use crate::models::Id;

fn from_row(row: &Row) -> Result<Optimization, AppError> {
    let design_items_json: String = row.get("design_items_json")?;
    let options_json: String = row.get("options_json")?;
    let layout_json: String = row.get("layout_json")?;
    let algorithm_str: String = row.get("algorithm")?;

    let design_items: Vec<OptimizationDesignItem> = serde_json::from_str(&design_items_json)?;
    let options: PlacementOptions = serde_json::from_str(&options_json)?;
    let layout: Layout = serde_json::from_str(&layout_json)?;
    let algorithm: Algorithm = serde_json::from_str(&format!("\"{algorithm_str}\""))?;

    Ok(Optimization {
        id: row.get("id")?,
        owner_id: row.get("owner_id")?,
        project_id: row.get("project_id")?,
        name: row.get("name")?,
        sheet_id: row.get("sheet_id")?,
        design_items,
        algorithm,
        options,
        layout,
        total_area_mm2: row.get("total_area_mm2")?,
        used_area_mm2: row.get("used_area_mm2")?,
        waste_pct: row.get("waste_pct")?,
        total_cost: row.get("total_cost")?,
        execution_ms: row.get("execution_ms")?,
        created_at: parse_ts(row, "created_at")?,
        updated_at: parse_ts(row, "updated_at")?,
    })
}

const SELECT: &str = "SELECT id, owner_id, project_id, name, sheet_id, design_items_json, algorithm, \
    options_json, layout_json, total_area_mm2, used_area_mm2, waste_pct, total_cost, execution_ms, \
    created_at, updated_at FROM optimizations";

fn algorithm_tag(algorithm: Algorithm) -> &'static str {
    match algorithm {
        Algorithm::Blf => "blf",
        Algorithm::Genetic => "genetic",
        Algorithm::Greedy => "greedy",
    }
}

pub struct NewOptimizationRow<'a> {
    pub project_id: Option<Id>,
    pub name: &'a str,
    pub sheet_id: Id,
    pub design_items: &'a [OptimizationDesignItem],
    pub algorithm: Algorithm,
    pub options: &'a PlacementOptions,
    pub layout: &'a Layout,
    pub total_area_mm2: f64,
    pub used_area_mm2: f64,
    pub waste_pct: f64,
    pub total_cost: f64,
    pub execution_ms: i64,
}

pub fn insert(conn: &Connection, owner_id: Id, input: NewOptimizationRow) -> Result<Optimization, AppError> {
    let design_items_json = serde_json::to_string(input.design_items)?;
    let options_json = serde_json::to_string(input.options)?;
    let layout_json = serde_json::to_string(input.layout)?;
    let now = now_str();

    conn.execute(
        "INSERT INTO optimizations (owner_id, project_id, name, sheet_id, design_items_json, algorithm, \
         options_json, layout_json, total_area_mm2, used_area_mm2, waste_pct, total_cost, execution_ms, \
         created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?14)",
        params![
            owner_id,
            input.project_id,
            input.name,
            input.sheet_id,
            design_items_json,
            algorithm_tag(input.algorithm),
            options_json,
            layout_json,
            input.total_area_mm2,
            input.used_area_mm2,
            input.waste_pct,
            input.total_cost,
            input.execution_ms,
            now,
        ],
    )?;

    let id = conn.last_insert_rowid();
    find_by_id_for_owner(conn, id, owner_id)?.ok_or(AppError::NotFound)
}

pub fn find_by_id_for_owner(conn: &Connection, id: Id, owner_id: Id) -> Result<Option<Optimization>, AppError> {
    conn.query_row(
        &format!("{SELECT} WHERE id = ?1 AND owner_id = ?2"),
        params![id, owner_id],
        |row| Ok(from_row(row)),
    )
    .optional()?
    .transpose()
}

pub fn list_for_owner(conn: &Connection, owner_id: Id) -> Result<Vec<Optimization>, AppError> {
    let mut stmt = conn.prepare(&format!("{SELECT} WHERE owner_id = ?1 ORDER BY created_at DESC"))?;
    let rows = stmt.query_map(params![owner_id], |row| Ok(from_row(row)))?;
    rows.collect::<Result<Vec<_>, rusqlite::Error>>()?
        .into_iter()
        .collect()
}

pub fn list_for_project(conn: &Connection, project_id: Id, owner_id: Id) -> Result<Vec<Optimization>, AppError> {
    let mut stmt = conn.prepare(&format!(
        "{SELECT} WHERE owner_id = ?1 AND project_id = ?2 ORDER BY created_at DESC"
    ))?;
    let rows = stmt.query_map(params![owner_id, project_id], |row| Ok(from_row(row)))?;
    rows.collect::<Result<Vec<_>, rusqlite::Error>>()?
        .into_iter()
        .collect()
}

pub fn delete(conn: &Connection, id: Id, owner_id: Id) -> Result<bool, AppError> {
    let changed = conn.execute(
        "DELETE FROM optimizations WHERE id = ?1 AND owner_id = ?2",
        params![id, owner_id],
    )?;
    Ok(changed > 0)
}
