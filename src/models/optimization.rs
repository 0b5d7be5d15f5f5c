use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::nesting::{Algorithm, Layout, PlacementOptions};
use super::Id;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationDesignItem {
    pub design_id: Option<Id>,
    pub quantity: u32,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub override_width_mm: Option<f64>,
    #[serde(default)]
    pub override_height_mm: Option<f64>,
    #[serde(default)]
    pub override_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Optimization {
    pub id: Id,
    pub owner_id: Id,
    pub project_id: Option<Id>,
    pub name: String,
    pub sheet_id: Id,
    pub design_items: Vec<OptimizationDesignItem>,
    pub algorithm: Algorithm,
    pub options: PlacementOptions,
    pub layout: Layout,
    pub total_area_mm2: f64,
    pub used_area_mm2: f64,
    pub waste_pct: f64,
    pub total_cost: f64,
    pub execution_ms: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct RunOptimizationRequest {
    pub project_id: Option<Id>,
    pub name: String,
    pub sheet_id: Id,
    pub design_items: Vec<OptimizationDesignItem>,
    #[serde(default)]
    pub algorithm: Algorithm,
    #[serde(default)]
    pub options: PlacementOptions,
}

#[derive(Debug, Deserialize)]
pub struct RerunOptimizationRequest {
    pub name: Option<String>,
    pub algorithm: Option<Algorithm>,
    pub options: Option<PlacementOptions>,
}

#[derive(Debug, Deserialize)]
pub struct CompareOptimizationsRequest {
    pub optimization_ids: Vec<Id>,
}

#[derive(Debug, Serialize)]
pub struct OptimizationComparison {
    pub optimizations: Vec<Optimization>,
    pub best_by_utilization: Option<Id>,
    pub best_by_waste: Option<Id>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Json,
    Svg,
    Dxf,
    CuttingList,
}
