pub mod design;
pub mod elements;
pub mod nesting;
pub mod optimization;
pub mod project;
pub mod session;
pub mod stock_sheet;
pub mod user;

/// Primary keys are plain rowids, exposed directly to API consumers.
pub type Id = i64;

pub type JsonValue = serde_json::Value;
