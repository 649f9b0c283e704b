//! Server permission entity - a named grant for a Discord user in one server

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{PermissionType, Snowflake};

/// Permission grant, unique per `(server_id, discord_user_id, permission)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerPermission {
    pub server_id: Snowflake,
    pub discord_user_id: Snowflake,
    pub permission: PermissionType,
    pub granted_by: Snowflake,
    pub granted_at: DateTime<Utc>,
}

impl ServerPermission {
    pub fn new(
        server_id: Snowflake,
        discord_user_id: Snowflake,
        permission: PermissionType,
        granted_by: Snowflake,
    ) -> Self {
        Self {
            server_id,
            discord_user_id,
            permission,
            granted_by,
            granted_at: Utc::now(),
        }
    }
}
