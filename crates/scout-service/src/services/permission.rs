//! Permission service
//!
//! Server-scoped grants and the competition creation gate.

use chrono::Utc;
use tracing::{debug, info, instrument};

use scout_cache::RateLimitDecision;
use scout_core::{DomainError, PermissionType, ServerPermission, Snowflake};

use crate::dto::CreationEligibility;

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Permission service
pub struct PermissionService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> PermissionService<'a> {
    /// Create a new PermissionService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Grant a permission; granting twice returns the original grant
    #[instrument(skip(self))]
    pub async fn grant_permission(
        &self,
        server_id: Snowflake,
        user_id: Snowflake,
        permission: PermissionType,
        granted_by: Snowflake,
    ) -> ServiceResult<ServerPermission> {
        let grant = ServerPermission::new(server_id, user_id, permission, granted_by);
        let stored = self.ctx.permission_repo().grant(&grant).await?;

        info!(
            server_id = %server_id,
            user_id = %user_id,
            permission = %permission,
            granted_by = %granted_by,
            "Permission granted"
        );

        Ok(stored)
    }

    /// Revoke a permission; returns whether a grant existed
    #[instrument(skip(self))]
    pub async fn revoke_permission(
        &self,
        server_id: Snowflake,
        user_id: Snowflake,
        permission: PermissionType,
    ) -> ServiceResult<bool> {
        let removed = self
            .ctx
            .permission_repo()
            .revoke(server_id, user_id, permission)
            .await?;

        if removed {
            info!(server_id = %server_id, user_id = %user_id, permission = %permission, "Permission revoked");
        }

        Ok(removed)
    }

    #[instrument(skip(self))]
    pub async fn has_permission(
        &self,
        server_id: Snowflake,
        user_id: Snowflake,
        permission: PermissionType,
    ) -> ServiceResult<bool> {
        let grant = self
            .ctx
            .permission_repo()
            .find(server_id, user_id, permission)
            .await?;
        Ok(grant.is_some())
    }

    /// All grants in a server
    #[instrument(skip(self))]
    pub async fn list_permissions(&self, server_id: Snowflake) -> ServiceResult<Vec<ServerPermission>> {
        Ok(self.ctx.permission_repo().find_by_server(server_id).await?)
    }

    /// Whether a user may create a competition right now
    ///
    /// Server admins skip the grant check; the cooldown applies to everyone.
    #[instrument(skip(self))]
    pub async fn can_create_competition(
        &self,
        server_id: Snowflake,
        user_id: Snowflake,
        is_admin: bool,
    ) -> ServiceResult<CreationEligibility> {
        if !is_admin
            && !self
                .has_permission(server_id, user_id, PermissionType::CreateCompetition)
                .await?
        {
            debug!("Creation denied: missing grant");
            return Ok(CreationEligibility::denied(
                DomainError::MissingPermission(PermissionType::CreateCompetition).to_string(),
            ));
        }

        match self
            .ctx
            .rate_limiter()
            .check(server_id, user_id, Utc::now())
            .await?
        {
            RateLimitDecision::Allowed => Ok(CreationEligibility::allowed()),
            RateLimitDecision::Limited { retry_after_secs } => Ok(CreationEligibility::rate_limited(
                DomainError::RateLimited { retry_after_secs }.to_string(),
                retry_after_secs,
            )),
        }
    }
}
