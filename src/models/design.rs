use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::elements::Elements;
use super::Id;

#[derive(Debug, Clone, Serialize)]
pub struct Design {
    pub id: Id,
    pub owner_id: Id,
    pub project_id: Option<Id>,
    pub name: String,
    pub description: String,
    pub width_mm: f64,
    pub height_mm: f64,
    pub thickness_mm: f64,
    /// `None` when the stored JSON failed to deserialize — list endpoints
    /// still return the scalar columns in that case.
    pub elements: Option<Elements>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Design {
    pub fn area_mm2(&self) -> f64 {
        self.width_mm * self.height_mm
    }
}

#[derive(Debug, Deserialize)]
pub struct NewDesign {
    #[serde(default)]
    pub project_id: Option<Id>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub width_mm: f64,
    pub height_mm: f64,
    pub thickness_mm: f64,
    #[serde(default)]
    pub elements: Elements,
}

#[derive(Debug, Deserialize)]
pub struct UpdateDesign {
    pub project_id: Option<Id>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub width_mm: f64,
    pub height_mm: f64,
    pub thickness_mm: f64,
    #[serde(default)]
    pub elements: Elements,
}

#[derive(Debug, Deserialize)]
pub struct MoveDesign {
    pub project_id: Option<Id>,
}

#[derive(Debug, Serialize)]
pub struct DesignTemplate {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub width_mm: f64,
    pub height_mm: f64,
    pub thickness_mm: f64,
    pub elements: Elements,
}
