//! Server permission entity <-> model mapper

use scout_core::{DomainError, PermissionType, ServerPermission, Snowflake};

use crate::models::ServerPermissionModel;

use super::corrupt_column;

impl TryFrom<ServerPermissionModel> for ServerPermission {
    type Error = DomainError;

    fn try_from(model: ServerPermissionModel) -> Result<Self, Self::Error> {
        let permission: PermissionType = model
            .permission
            .parse()
            .map_err(|e| corrupt_column("server_permissions.permission", e))?;

        Ok(ServerPermission {
            server_id: Snowflake::new(model.server_id),
            discord_user_id: Snowflake::new(model.discord_user_id),
            permission,
            granted_by: Snowflake::new(model.granted_by),
            granted_at: model.granted_at,
        })
    }
}
