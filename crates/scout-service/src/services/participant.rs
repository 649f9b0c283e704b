//! Participant service
//!
//! Joining, inviting and leaving competitions. The same rule set backs both
//! the eligibility preview and the actual join, so a "yes" from
//! `can_join_competition` matches what `join_competition` does.

use chrono::Utc;
use futures::future::try_join_all;
use tracing::{debug, info, instrument};

use scout_core::{
    Competition, CompetitionId, CompetitionParticipant, DomainError, ParticipantStatus, PlayerId,
    Snowflake, Visibility,
};

use crate::dto::{JoinEligibility, ParticipantResponse};

use super::competition::CompetitionService;
use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Participant service
pub struct ParticipantService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ParticipantService<'a> {
    /// Create a new ParticipantService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Add a player with the given status
    ///
    /// Does not look at visibility; that is the caller's decision.
    #[instrument(skip(self))]
    pub async fn add_participant(
        &self,
        competition_id: CompetitionId,
        player_id: PlayerId,
        status: ParticipantStatus,
        invited_by: Option<Snowflake>,
    ) -> ServiceResult<CompetitionParticipant> {
        let competition = self.competition(competition_id).await?;
        self.check_open(&competition)?;
        self.ensure_player(player_id).await?;

        let participant = match status {
            ParticipantStatus::Joined => {
                CompetitionParticipant::joined(competition_id, player_id, Utc::now())
            }
            ParticipantStatus::Invited => {
                CompetitionParticipant::invited(competition_id, player_id, invited_by, Utc::now())
            }
            ParticipantStatus::Left => {
                return Err(ServiceError::validation(
                    "A participant cannot be added as LEFT",
                ));
            }
        };

        if let Some(existing) = self
            .ctx
            .participant_repo()
            .find(competition_id, player_id)
            .await?
        {
            return Err(match (existing.status, status) {
                (ParticipantStatus::Left, _) => DomainError::CannotRejoin,
                (ParticipantStatus::Invited, ParticipantStatus::Invited) => {
                    DomainError::AlreadyInvited
                }
                _ => DomainError::AlreadyParticipant,
            }
            .into());
        }

        self.check_capacity(&competition).await?;
        self.ctx.participant_repo().create(&participant).await?;

        info!(
            competition_id = %competition_id,
            player_id = %player_id,
            status = %status,
            "Participant added"
        );

        Ok(participant)
    }

    /// Invite a player on behalf of `inviter_id`
    #[instrument(skip(self))]
    pub async fn invite_participant(
        &self,
        competition_id: CompetitionId,
        player_id: PlayerId,
        inviter_id: Snowflake,
    ) -> ServiceResult<CompetitionParticipant> {
        self.add_participant(
            competition_id,
            player_id,
            ParticipantStatus::Invited,
            Some(inviter_id),
        )
        .await
    }

    /// INVITED -> JOINED
    #[instrument(skip(self))]
    pub async fn accept_invitation(
        &self,
        competition_id: CompetitionId,
        player_id: PlayerId,
    ) -> ServiceResult<CompetitionParticipant> {
        let competition = self.competition(competition_id).await?;
        self.check_open(&competition)?;

        let mut participant = self
            .ctx
            .participant_repo()
            .find(competition_id, player_id)
            .await?
            .filter(|p| p.status == ParticipantStatus::Invited)
            .ok_or(DomainError::NotInvited)?;

        participant.accept(Utc::now())?;
        self.ctx.participant_repo().update(&participant).await?;

        info!(competition_id = %competition_id, player_id = %player_id, "Invitation accepted");

        Ok(participant)
    }

    /// JOINED or INVITED -> LEFT
    ///
    /// LEFT is terminal; the player cannot come back.
    #[instrument(skip(self))]
    pub async fn remove_participant(
        &self,
        competition_id: CompetitionId,
        player_id: PlayerId,
    ) -> ServiceResult<CompetitionParticipant> {
        let mut participant = self
            .ctx
            .participant_repo()
            .find(competition_id, player_id)
            .await?
            .ok_or(DomainError::ParticipantNotFound {
                competition_id,
                player_id,
            })?;

        participant.leave(Utc::now())?;
        self.ctx.participant_repo().update(&participant).await?;

        info!(competition_id = %competition_id, player_id = %player_id, "Participant left");

        Ok(participant)
    }

    /// Preview whether a player may join, with the reason when not
    #[instrument(skip(self))]
    pub async fn can_join_competition(
        &self,
        competition_id: CompetitionId,
        player_id: PlayerId,
    ) -> ServiceResult<JoinEligibility> {
        let Some(competition) = self
            .ctx
            .competition_repo()
            .find_by_id(competition_id)
            .await?
        else {
            return Ok(JoinEligibility::denied(
                DomainError::CompetitionNotFound(competition_id).to_string(),
            ));
        };
        if self.ctx.player_repo().find_by_id(player_id).await?.is_none() {
            return Ok(JoinEligibility::denied(
                DomainError::PlayerNotFound(player_id).to_string(),
            ));
        }

        let existing = self
            .ctx
            .participant_repo()
            .find(competition_id, player_id)
            .await?;

        Ok(match self.join_blocker(&competition, existing.as_ref()).await? {
            Some(blocker) => {
                debug!(reason = %blocker, "Join not allowed");
                JoinEligibility::denied(blocker.to_string())
            }
            None => JoinEligibility::allowed(),
        })
    }

    /// Join as the player: accepts a pending invitation or adds a new row
    #[instrument(skip(self))]
    pub async fn join_competition(
        &self,
        competition_id: CompetitionId,
        player_id: PlayerId,
    ) -> ServiceResult<CompetitionParticipant> {
        let competition = self.competition(competition_id).await?;
        self.ensure_player(player_id).await?;

        let existing = self
            .ctx
            .participant_repo()
            .find(competition_id, player_id)
            .await?;
        if let Some(blocker) = self.join_blocker(&competition, existing.as_ref()).await? {
            return Err(blocker.into());
        }

        let participant = match existing {
            Some(mut invited) => {
                invited.accept(Utc::now())?;
                self.ctx.participant_repo().update(&invited).await?;
                invited
            }
            None => {
                let joined = CompetitionParticipant::joined(competition_id, player_id, Utc::now());
                self.ctx.participant_repo().create(&joined).await?;
                joined
            }
        };

        info!(competition_id = %competition_id, player_id = %player_id, "Player joined competition");

        Ok(participant)
    }

    /// Participants with their aliases, oldest row first
    #[instrument(skip(self))]
    pub async fn list_participants(
        &self,
        competition_id: CompetitionId,
        include_left: bool,
    ) -> ServiceResult<Vec<ParticipantResponse>> {
        self.competition(competition_id).await?;

        let participants: Vec<CompetitionParticipant> = self
            .ctx
            .participant_repo()
            .find_by_competition(competition_id)
            .await?
            .into_iter()
            .filter(|p| include_left || p.is_active())
            .collect();

        let players = try_join_all(
            participants
                .iter()
                .map(|p| self.ctx.player_repo().find_by_id(p.player_id)),
        )
        .await?;

        Ok(participants
            .iter()
            .zip(players)
            .map(|(participant, player)| ParticipantResponse::build(participant, player.as_ref()))
            .collect())
    }

    /// Rows that count toward the participant limit
    #[instrument(skip(self))]
    pub async fn active_participant_count(&self, competition_id: CompetitionId) -> ServiceResult<i64> {
        Ok(self.ctx.participant_repo().count_active(competition_id).await?)
    }

    // =========================================================================
    // Rules
    // =========================================================================

    async fn competition(&self, competition_id: CompetitionId) -> ServiceResult<Competition> {
        CompetitionService::new(self.ctx)
            .get_competition_entity(competition_id)
            .await
    }

    async fn ensure_player(&self, player_id: PlayerId) -> ServiceResult<()> {
        self.ctx
            .player_repo()
            .find_by_id(player_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| DomainError::PlayerNotFound(player_id).into())
    }

    fn check_open(&self, competition: &Competition) -> Result<(), DomainError> {
        if competition.is_cancelled {
            return Err(DomainError::CompetitionCancelled(competition.id));
        }
        if competition.has_ended(Utc::now(), self.ctx.seasons()) {
            return Err(DomainError::CompetitionEnded(competition.id));
        }
        Ok(())
    }

    async fn check_capacity(&self, competition: &Competition) -> ServiceResult<()> {
        let active = self.ctx.participant_repo().count_active(competition.id).await?;
        if active >= i64::from(competition.max_participants) {
            return Err(DomainError::CompetitionFull {
                max: competition.max_participants,
            }
            .into());
        }
        Ok(())
    }

    /// First rule that stops `existing` (or a new row) from joining
    async fn join_blocker(
        &self,
        competition: &Competition,
        existing: Option<&CompetitionParticipant>,
    ) -> ServiceResult<Option<DomainError>> {
        if let Err(closed) = self.check_open(competition) {
            return Ok(Some(closed));
        }

        match existing.map(|p| p.status) {
            Some(ParticipantStatus::Joined) => return Ok(Some(DomainError::AlreadyParticipant)),
            Some(ParticipantStatus::Left) => return Ok(Some(DomainError::CannotRejoin)),
            // Already counted toward capacity
            Some(ParticipantStatus::Invited) => return Ok(None),
            None => {}
        }

        if competition.visibility == Visibility::InviteOnly {
            return Ok(Some(DomainError::InviteOnly(competition.id)));
        }

        match self.check_capacity(competition).await {
            Ok(()) => Ok(None),
            Err(ServiceError::Domain(full @ DomainError::CompetitionFull { .. })) => Ok(Some(full)),
            Err(e) => Err(e),
        }
    }
}
