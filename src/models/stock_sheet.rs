use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value as JsonValue;

use super::Id;

/// A shared catalogue entry (no owner — see the Open Questions decision in
/// DESIGN.md: stock sheets are global in this reference behaviour).
#[derive(Debug, Clone, Serialize)]
pub struct StockSheet {
    pub id: Id,
    pub name: String,
    pub width_mm: f64,
    pub height_mm: f64,
    pub thickness_mm: f64,
    pub price_per_sqm: f64,
    pub in_stock: i64,
    pub material: Option<String>,
    pub supplier: Option<String>,
    pub grade: Option<String>,
    pub properties: JsonValue,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StockSheet {
    pub fn area_mm2(&self) -> f64 {
        self.width_mm * self.height_mm
    }
}
