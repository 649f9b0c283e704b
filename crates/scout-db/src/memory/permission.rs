//! In-memory PermissionRepository

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

use scout_core::{PermissionRepository, PermissionType, RepoResult, ServerPermission, Snowflake};

type GrantKey = (Snowflake, Snowflake, PermissionType);

/// In-memory implementation of PermissionRepository
#[derive(Default)]
pub struct InMemoryPermissionRepository {
    grants: RwLock<HashMap<GrantKey, ServerPermission>>,
}

impl InMemoryPermissionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PermissionRepository for InMemoryPermissionRepository {
    async fn find(
        &self,
        server_id: Snowflake,
        user_id: Snowflake,
        permission: PermissionType,
    ) -> RepoResult<Option<ServerPermission>> {
        Ok(self
            .grants
            .read()
            .get(&(server_id, user_id, permission))
            .cloned())
    }

    async fn find_by_server(&self, server_id: Snowflake) -> RepoResult<Vec<ServerPermission>> {
        let mut found: Vec<ServerPermission> = self
            .grants
            .read()
            .values()
            .filter(|g| g.server_id == server_id)
            .cloned()
            .collect();
        found.sort_by_key(|g| g.granted_at);
        Ok(found)
    }

    async fn grant(&self, permission: &ServerPermission) -> RepoResult<ServerPermission> {
        let key = (
            permission.server_id,
            permission.discord_user_id,
            permission.permission,
        );
        let mut grants = self.grants.write();
        let stored = grants.entry(key).or_insert_with(|| permission.clone());
        Ok(stored.clone())
    }

    async fn revoke(
        &self,
        server_id: Snowflake,
        user_id: Snowflake,
        permission: PermissionType,
    ) -> RepoResult<bool> {
        Ok(self
            .grants
            .write()
            .remove(&(server_id, user_id, permission))
            .is_some())
    }
}
