//! Server permission database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for server_permissions table
#[derive(Debug, Clone, FromRow)]
pub struct ServerPermissionModel {
    pub server_id: i64,
    pub discord_user_id: i64,
    pub permission: String,
    pub granted_by: i64,
    pub granted_at: DateTime<Utc>,
}
