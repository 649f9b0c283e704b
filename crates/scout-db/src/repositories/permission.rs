//! PostgreSQL implementation of PermissionRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use scout_core::{
    DomainError, PermissionRepository, PermissionType, RepoResult, ServerPermission, Snowflake,
};

use crate::models::ServerPermissionModel;

use super::error::map_db_error;

/// PostgreSQL implementation of PermissionRepository
#[derive(Clone)]
pub struct PgPermissionRepository {
    pool: PgPool,
}

impl PgPermissionRepository {
    /// Create a new PgPermissionRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PermissionRepository for PgPermissionRepository {
    #[instrument(skip(self))]
    async fn find(
        &self,
        server_id: Snowflake,
        user_id: Snowflake,
        permission: PermissionType,
    ) -> RepoResult<Option<ServerPermission>> {
        let result = sqlx::query_as::<_, ServerPermissionModel>(
            r#"
            SELECT server_id, discord_user_id, permission, granted_by, granted_at
            FROM server_permissions
            WHERE server_id = $1 AND discord_user_id = $2 AND permission = $3
            "#,
        )
        .bind(server_id.into_inner())
        .bind(user_id.into_inner())
        .bind(permission.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(ServerPermission::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_server(&self, server_id: Snowflake) -> RepoResult<Vec<ServerPermission>> {
        let results = sqlx::query_as::<_, ServerPermissionModel>(
            r#"
            SELECT server_id, discord_user_id, permission, granted_by, granted_at
            FROM server_permissions
            WHERE server_id = $1
            ORDER BY granted_at ASC
            "#,
        )
        .bind(server_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        results.into_iter().map(ServerPermission::try_from).collect()
    }

    #[instrument(skip(self, permission), fields(server_id = %permission.server_id, user_id = %permission.discord_user_id))]
    async fn grant(&self, permission: &ServerPermission) -> RepoResult<ServerPermission> {
        sqlx::query(
            r#"
            INSERT INTO server_permissions (server_id, discord_user_id, permission, granted_by, granted_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (server_id, discord_user_id, permission) DO NOTHING
            "#,
        )
        .bind(permission.server_id.into_inner())
        .bind(permission.discord_user_id.into_inner())
        .bind(permission.permission.as_str())
        .bind(permission.granted_by.into_inner())
        .bind(permission.granted_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        // Either the row just inserted or the earlier grant
        self.find(
            permission.server_id,
            permission.discord_user_id,
            permission.permission,
        )
        .await?
        .ok_or_else(|| DomainError::DatabaseError("Permission grant vanished".to_string()))
    }

    #[instrument(skip(self))]
    async fn revoke(
        &self,
        server_id: Snowflake,
        user_id: Snowflake,
        permission: PermissionType,
    ) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM server_permissions
            WHERE server_id = $1 AND discord_user_id = $2 AND permission = $3
            "#,
        )
        .bind(server_id.into_inner())
        .bind(user_id.into_inner())
        .bind(permission.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }
}
