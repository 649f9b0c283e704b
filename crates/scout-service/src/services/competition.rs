//! Competition service
//!
//! Creation, lookup, cancellation and rescheduling of competitions.

use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use tracing::{info, instrument, warn};
use validator::Validate;

use scout_core::{
    Competition, CompetitionDates, CompetitionId, DomainError, NewCompetition, PermissionType,
    SeasonCalendar, Snowflake,
};

use crate::dto::{CompetitionResponse, CreateCompetitionRequest, UpdateDatesRequest};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::permission::PermissionService;

/// Competition service
pub struct CompetitionService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> CompetitionService<'a> {
    /// Create a new CompetitionService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create a new competition
    #[instrument(skip(self, request))]
    pub async fn create_competition(
        &self,
        server_id: Snowflake,
        owner_id: Snowflake,
        is_admin: bool,
        request: CreateCompetitionRequest,
    ) -> ServiceResult<CompetitionResponse> {
        let eligibility = PermissionService::new(self.ctx)
            .can_create_competition(server_id, owner_id, is_admin)
            .await?;
        if !eligibility.can_create {
            return Err(match eligibility.retry_after_secs {
                Some(retry_after_secs) => DomainError::RateLimited { retry_after_secs },
                None => DomainError::MissingPermission(PermissionType::CreateCompetition),
            }
            .into());
        }

        request.validate()?;

        let limits = self.ctx.limits();
        if request.max_participants > limits.max_participants_limit {
            return Err(ServiceError::validation(format!(
                "Max participants cannot exceed {}",
                limits.max_participants_limit
            )));
        }
        request
            .criteria
            .validate()
            .map_err(DomainError::InvalidCriteria)?;

        let calendar = self.ctx.seasons();
        let now = Utc::now();
        Self::check_dates(&request.dates, calendar, now)?;

        // Limits on concurrently open competitions
        let open: Vec<Competition> = self
            .ctx
            .competition_repo()
            .find_by_server(server_id)
            .await?
            .into_iter()
            .filter(|c| c.status_at(now, calendar).is_open())
            .collect();
        if open.len() >= limits.max_active_per_server {
            return Err(DomainError::TooManyActiveCompetitions {
                max: limits.max_active_per_server,
            }
            .into());
        }
        if open.iter().any(|c| c.is_owner(owner_id)) {
            return Err(DomainError::OwnerHasActiveCompetition.into());
        }

        let new_competition = NewCompetition {
            server_id,
            owner_id,
            channel_id: request.channel_id,
            title: request.title.trim().to_string(),
            description: request.description,
            visibility: request.visibility,
            criteria: request.criteria,
            max_participants: request.max_participants,
            dates: request.dates,
        };
        let competition = self.ctx.competition_repo().create(&new_competition).await?;

        // The row exists already; a lost cooldown entry only loosens the limit
        if let Err(e) = self
            .ctx
            .rate_limiter()
            .record(server_id, owner_id, competition.created_at)
            .await
        {
            warn!(error = %e, "Failed to record competition creation");
        }

        info!(
            competition_id = %competition.id,
            server_id = %server_id,
            owner_id = %owner_id,
            criteria = competition.criteria.kind(),
            "Competition created"
        );

        Ok(CompetitionResponse::build(&competition, 0, now, calendar))
    }

    /// Get competition by ID
    #[instrument(skip(self))]
    pub async fn get_competition(&self, id: CompetitionId) -> ServiceResult<CompetitionResponse> {
        let competition = self.get_competition_entity(id).await?;
        self.to_response(&competition).await
    }

    /// Get competition entity by ID
    #[instrument(skip(self))]
    pub async fn get_competition_entity(&self, id: CompetitionId) -> ServiceResult<Competition> {
        self.ctx
            .competition_repo()
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Competition", id.to_string()))
    }

    /// List competitions of a server, newest first
    ///
    /// With `active_only`, cancelled and ended competitions are skipped.
    #[instrument(skip(self))]
    pub async fn list_server_competitions(
        &self,
        server_id: Snowflake,
        active_only: bool,
    ) -> ServiceResult<Vec<CompetitionResponse>> {
        let now = Utc::now();
        let calendar = self.ctx.seasons();
        let competitions: Vec<Competition> = self
            .ctx
            .competition_repo()
            .find_by_server(server_id)
            .await?
            .into_iter()
            .filter(|c| !active_only || c.status_at(now, calendar).is_open())
            .collect();

        let counts = try_join_all(
            competitions
                .iter()
                .map(|c| self.ctx.participant_repo().count_active(c.id)),
        )
        .await?;

        Ok(competitions
            .iter()
            .zip(counts)
            .map(|(c, count)| CompetitionResponse::build(c, count, now, calendar))
            .collect())
    }

    /// Soft-cancel a competition
    #[instrument(skip(self))]
    pub async fn cancel_competition(
        &self,
        id: CompetitionId,
        actor_id: Snowflake,
        is_admin: bool,
    ) -> ServiceResult<CompetitionResponse> {
        let mut competition = self.get_competition_entity(id).await?;
        Self::check_manage(&competition, actor_id, is_admin)?;

        if competition.is_cancelled {
            return Err(DomainError::AlreadyCancelled(id).into());
        }

        competition.cancel();
        self.ctx.competition_repo().update(&competition).await?;

        info!(competition_id = %id, actor_id = %actor_id, "Competition cancelled");

        self.to_response(&competition).await
    }

    /// Replace the date range of a competition that is still open
    #[instrument(skip(self, request))]
    pub async fn update_dates(
        &self,
        id: CompetitionId,
        actor_id: Snowflake,
        is_admin: bool,
        request: UpdateDatesRequest,
    ) -> ServiceResult<CompetitionResponse> {
        let mut competition = self.get_competition_entity(id).await?;
        Self::check_manage(&competition, actor_id, is_admin)?;

        let calendar = self.ctx.seasons();
        let now = Utc::now();
        if competition.is_cancelled {
            return Err(DomainError::CompetitionCancelled(id).into());
        }
        if competition.has_ended(now, calendar) {
            return Err(DomainError::CompetitionEnded(id).into());
        }

        Self::check_dates(&request.dates, calendar, now)?;

        competition.set_dates(request.dates);
        self.ctx.competition_repo().update(&competition).await?;

        info!(competition_id = %id, actor_id = %actor_id, "Competition dates updated");

        self.to_response(&competition).await
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Well-formed dates whose end is still ahead of `now`
    fn check_dates(
        dates: &CompetitionDates,
        calendar: &SeasonCalendar,
        now: DateTime<Utc>,
    ) -> ServiceResult<()> {
        dates.validate(calendar).map_err(DomainError::InvalidDates)?;
        if let Some((_, end)) = dates.resolve(calendar) {
            if end <= now {
                return Err(
                    DomainError::InvalidDates("End date must be in the future".to_string()).into(),
                );
            }
        }
        Ok(())
    }

    fn check_manage(competition: &Competition, actor_id: Snowflake, is_admin: bool) -> ServiceResult<()> {
        if is_admin || competition.is_owner(actor_id) {
            Ok(())
        } else {
            Err(DomainError::NotCompetitionOwner.into())
        }
    }

    async fn to_response(&self, competition: &Competition) -> ServiceResult<CompetitionResponse> {
        let count = self
            .ctx
            .participant_repo()
            .count_active(competition.id)
            .await?;
        Ok(CompetitionResponse::build(
            competition,
            count,
            Utc::now(),
            self.ctx.seasons(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use scout_common::CompetitionConfig;
    use scout_core::{CompetitionCriteria, CompetitionDates, CompetitionStatus, Queue, Visibility};

    const SERVER: Snowflake = Snowflake::new(1_000);
    const ADMIN: Snowflake = Snowflake::new(1);

    fn request(title: &str) -> CreateCompetitionRequest {
        let now = Utc::now();
        CreateCompetitionRequest {
            channel_id: Snowflake::new(55),
            title: title.to_string(),
            description: String::new(),
            visibility: Visibility::Open,
            criteria: CompetitionCriteria::MostGamesPlayed { queue: Queue::Solo },
            max_participants: 10,
            dates: CompetitionDates::Fixed {
                start: now + Duration::hours(1),
                end: now + Duration::days(7),
            },
        }
    }

    fn context() -> ServiceContext {
        ServiceContext::in_memory(CompetitionConfig {
            creation_cooldown_secs: 0,
            ..CompetitionConfig::default()
        })
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let ctx = context();
        let service = CompetitionService::new(&ctx);

        let created = service
            .create_competition(SERVER, ADMIN, true, request("  Solo grind "))
            .await
            .unwrap();
        assert_eq!(created.title, "Solo grind");
        assert_eq!(created.status, CompetitionStatus::Draft);
        assert_eq!(created.participant_count, 0);

        let fetched = service.get_competition(created.id).await.unwrap();
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.owner_id, ADMIN);
    }

    #[tokio::test]
    async fn test_create_requires_permission() {
        let ctx = context();
        let service = CompetitionService::new(&ctx);
        let user = Snowflake::new(77);

        let err = service
            .create_competition(SERVER, user, false, request("No grant"))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "MISSING_PERMISSIONS");

        PermissionService::new(&ctx)
            .grant_permission(SERVER, user, PermissionType::CreateCompetition, ADMIN)
            .await
            .unwrap();
        assert!(service
            .create_competition(SERVER, user, false, request("With grant"))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_create_rate_limited() {
        let ctx = ServiceContext::in_memory(CompetitionConfig::default());
        let service = CompetitionService::new(&ctx);

        service
            .create_competition(SERVER, ADMIN, true, request("First"))
            .await
            .unwrap();
        let err = service
            .create_competition(SERVER, ADMIN, true, request("Second"))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "RATE_LIMITED");
    }

    #[tokio::test]
    async fn test_create_validation() {
        let ctx = context();
        let service = CompetitionService::new(&ctx);

        let mut req = request("");
        let err = service.create_competition(SERVER, ADMIN, true, req.clone()).await.unwrap_err();
        assert_eq!(err.status_code(), 400);

        req.title = "   ".to_string();
        let err = service.create_competition(SERVER, ADMIN, true, req.clone()).await.unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert!(err.to_string().contains("must not be blank"));
        assert!(service.list_server_competitions(SERVER, false).await.unwrap().is_empty());

        req.title = "Too many".to_string();
        req.max_participants = 101;
        let err = service.create_competition(SERVER, ADMIN, true, req.clone()).await.unwrap_err();
        assert!(err.to_string().contains("cannot exceed 100"));

        req.max_participants = 10;
        req.criteria = CompetitionCriteria::HighestRank { queue: Queue::Aram };
        let err = service.create_competition(SERVER, ADMIN, true, req.clone()).await.unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CRITERIA");

        req.criteria = CompetitionCriteria::HighestRank { queue: Queue::Solo };
        req.dates = CompetitionDates::Season {
            season_id: "1999_SEASON_9".to_string(),
        };
        let err = service.create_competition(SERVER, ADMIN, true, req.clone()).await.unwrap_err();
        assert!(err.to_string().contains("Unknown season"));

        let now = Utc::now();
        req.dates = CompetitionDates::Fixed {
            start: now - Duration::days(10),
            end: now - Duration::days(1),
        };
        let err = service.create_competition(SERVER, ADMIN, true, req).await.unwrap_err();
        assert!(err.to_string().contains("future"));
    }

    #[tokio::test]
    async fn test_one_open_competition_per_owner() {
        let ctx = context();
        let service = CompetitionService::new(&ctx);

        service
            .create_competition(SERVER, ADMIN, true, request("First"))
            .await
            .unwrap();
        let err = service
            .create_competition(SERVER, ADMIN, true, request("Second"))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "OWNER_HAS_ACTIVE_COMPETITION");

        // Other servers are independent
        assert!(service
            .create_competition(Snowflake::new(2_000), ADMIN, true, request("Elsewhere"))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_server_active_limit() {
        let ctx = ServiceContext::in_memory(CompetitionConfig {
            max_active_per_server: 2,
            creation_cooldown_secs: 0,
            ..CompetitionConfig::default()
        });
        let service = CompetitionService::new(&ctx);

        for owner in 1..=2 {
            service
                .create_competition(SERVER, Snowflake::new(owner), true, request("Slot"))
                .await
                .unwrap();
        }
        let err = service
            .create_competition(SERVER, Snowflake::new(3), true, request("Overflow"))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "TOO_MANY_ACTIVE_COMPETITIONS");

        // Cancelled competitions free their slot
        let open = service.list_server_competitions(SERVER, true).await.unwrap();
        service.cancel_competition(open[0].id, ADMIN, true).await.unwrap();
        assert!(service
            .create_competition(SERVER, Snowflake::new(3), true, request("Freed"))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_cancel_rules() {
        let ctx = context();
        let service = CompetitionService::new(&ctx);
        let created = service
            .create_competition(SERVER, ADMIN, true, request("Cancel me"))
            .await
            .unwrap();

        let err = service
            .cancel_competition(created.id, Snowflake::new(42), false)
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "NOT_COMPETITION_OWNER");

        let cancelled = service.cancel_competition(created.id, ADMIN, false).await.unwrap();
        assert_eq!(cancelled.status, CompetitionStatus::Cancelled);

        let err = service.cancel_competition(created.id, ADMIN, false).await.unwrap_err();
        assert_eq!(err.error_code(), "ALREADY_CANCELLED");

        let active = service.list_server_competitions(SERVER, true).await.unwrap();
        assert!(active.is_empty());
        let all = service.list_server_competitions(SERVER, false).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_update_dates() {
        let ctx = context();
        let service = CompetitionService::new(&ctx);
        let created = service
            .create_competition(SERVER, ADMIN, true, request("Reschedule"))
            .await
            .unwrap();

        let now = Utc::now();
        let err = service
            .update_dates(
                created.id,
                ADMIN,
                false,
                UpdateDatesRequest {
                    dates: CompetitionDates::Fixed {
                        start: now + Duration::days(2),
                        end: now + Duration::days(1),
                    },
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_DATES");

        let err = service
            .update_dates(
                created.id,
                ADMIN,
                false,
                UpdateDatesRequest {
                    dates: CompetitionDates::Fixed {
                        start: now - Duration::days(10),
                        end: now - Duration::days(1),
                    },
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_DATES");
        assert!(err.to_string().contains("future"));

        let updated = service
            .update_dates(
                created.id,
                ADMIN,
                false,
                UpdateDatesRequest {
                    dates: CompetitionDates::Fixed {
                        start: now - Duration::hours(1),
                        end: now + Duration::days(3),
                    },
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, CompetitionStatus::Active);

        service.cancel_competition(created.id, ADMIN, true).await.unwrap();
        let err = service
            .update_dates(
                created.id,
                ADMIN,
                true,
                UpdateDatesRequest {
                    dates: CompetitionDates::Fixed {
                        start: now,
                        end: now + Duration::days(3),
                    },
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "COMPETITION_CANCELLED");
    }

    #[tokio::test]
    async fn test_missing_competition() {
        let ctx = context();
        let err = CompetitionService::new(&ctx)
            .get_competition(CompetitionId::new(404))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 404);
    }
}
