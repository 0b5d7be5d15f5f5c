use rusqlite::{params, Connection, OptionalExtension, Row};

use super::parse_ts;
use crate::error::AppError;
use crate::models::stock_sheet::StockSheet;
use crate::models::Id;

fn from_row(row: &Row) -> rusqlite::Result<StockSheet> {
    let properties_json: String = row.get("properties_json")?;
    let properties = serde_json::from_str(&properties_json).unwrap_or(serde_json::Value::Null);

    Ok(StockSheet {
        id: row.get("id")?,
        name: row.get("name")?,
        width_mm: row.get("width_mm")?,
        height_mm: row.get("height_mm")?,
        thickness_mm: row.get("thickness_mm")?,
        price_per_sqm: row.get("price_per_sqm")?,
        in_stock: row.get("in_stock")?,
        material: row.get("material")?,
        supplier: row.get("supplier")?,
        grade: row.get("grade")?,
        properties,
        created_at: parse_ts(row, "created_at")?,
        updated_at: parse_ts(row, "updated_at")?,
    })
}

const SELECT: &str = "SELECT id, name, width_mm, height_mm, thickness_mm, price_per_sqm, in_stock, \
    material, supplier, grade, properties_json, created_at, updated_at FROM stock_sheets";

pub fn list_all(conn: &Connection) -> Result<Vec<StockSheet>, AppError> {
    let mut stmt = conn.prepare(&format!("{SELECT} ORDER BY name"))?;
    let rows = stmt.query_map([], from_row)?.collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn find_by_id(conn: &Connection, id: Id) -> Result<Option<StockSheet>, AppError> {
    conn.query_row(&format!("{SELECT} WHERE id = ?1"), params![id], from_row)
        .optional()
        .map_err(AppError::from)
}
