use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Id;

#[derive(Debug, Clone, Serialize)]
pub struct Project {
    pub id: Id,
    pub owner_id: Id,
    pub name: String,
    pub description: String,
    pub parent_id: Option<Id>,
    pub path: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A project annotated with the read-computed counts and, optionally, its
/// direct children.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectView {
    #[serde(flatten)]
    pub project: Project,
    pub design_count: i64,
    pub optimization_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<ProjectView>>,
}

#[derive(Debug, Deserialize)]
pub struct NewProject {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub parent_id: Option<Id>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProject {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub parent_id: Option<Id>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Paging {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl Paging {
    pub fn limit_or_default(&self) -> i64 {
        self.limit.unwrap_or(50).clamp(1, 500)
    }

    pub fn offset_or_default(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}
