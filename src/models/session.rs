use chrono::{DateTime, Utc};
use serde::Serialize;

use super::Id;

/// A row in the `sessions` table. Secondary to the signed bearer token: a
/// session row's absence never invalidates an otherwise-valid token.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: Id,
    pub owner_id: Id,
    pub session_id: String,
    pub expires_at: DateTime<Utc>,
    pub source_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_access_at: DateTime<Utc>,
}

impl Session {
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}
