//! Participant entity - a player's membership in a competition

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::{CompetitionId, ParticipantStatus, PlayerId, Snowflake};

/// Competition participant (junction between Competition and Player)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetitionParticipant {
    pub competition_id: CompetitionId,
    pub player_id: PlayerId,
    pub status: ParticipantStatus,
    pub invited_by: Option<Snowflake>,
    pub invited_at: Option<DateTime<Utc>>,
    pub joined_at: Option<DateTime<Utc>>,
    pub left_at: Option<DateTime<Utc>>,
}

impl CompetitionParticipant {
    /// A player who joined on their own
    pub fn joined(competition_id: CompetitionId, player_id: PlayerId, at: DateTime<Utc>) -> Self {
        Self {
            competition_id,
            player_id,
            status: ParticipantStatus::Joined,
            invited_by: None,
            invited_at: None,
            joined_at: Some(at),
            left_at: None,
        }
    }

    /// A player invited by someone, pending acceptance
    pub fn invited(
        competition_id: CompetitionId,
        player_id: PlayerId,
        invited_by: Option<Snowflake>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            competition_id,
            player_id,
            status: ParticipantStatus::Invited,
            invited_by,
            invited_at: Some(at),
            joined_at: None,
            left_at: None,
        }
    }

    /// Whether this row counts toward the participant limit
    #[inline]
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// INVITED -> JOINED
    pub fn accept(&mut self, at: DateTime<Utc>) -> Result<(), DomainError> {
        self.transition(ParticipantStatus::Joined)?;
        self.joined_at = Some(at);
        Ok(())
    }

    /// JOINED or INVITED -> LEFT
    pub fn leave(&mut self, at: DateTime<Utc>) -> Result<(), DomainError> {
        self.transition(ParticipantStatus::Left)?;
        self.left_at = Some(at);
        Ok(())
    }

    fn transition(&mut self, next: ParticipantStatus) -> Result<(), DomainError> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::InvalidStatusTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> (CompetitionId, PlayerId) {
        (CompetitionId::new(7), PlayerId::new(11))
    }

    #[test]
    fn test_invitation_lifecycle() {
        let (competition_id, player_id) = ids();
        let now = Utc::now();
        let mut participant =
            CompetitionParticipant::invited(competition_id, player_id, Some(Snowflake::new(5)), now);
        assert_eq!(participant.status, ParticipantStatus::Invited);
        assert!(participant.joined_at.is_none());

        participant.accept(now).unwrap();
        assert_eq!(participant.status, ParticipantStatus::Joined);
        assert_eq!(participant.joined_at, Some(now));
        assert_eq!(participant.invited_by, Some(Snowflake::new(5)));
    }

    #[test]
    fn test_leave_sets_timestamp() {
        let (competition_id, player_id) = ids();
        let now = Utc::now();
        let mut participant = CompetitionParticipant::joined(competition_id, player_id, now);
        participant.leave(now).unwrap();
        assert_eq!(participant.status, ParticipantStatus::Left);
        assert_eq!(participant.left_at, Some(now));
        assert!(!participant.is_active());
    }

    #[test]
    fn test_left_cannot_come_back() {
        let (competition_id, player_id) = ids();
        let now = Utc::now();
        let mut participant = CompetitionParticipant::joined(competition_id, player_id, now);
        participant.leave(now).unwrap();

        let err = participant.accept(now).unwrap_err();
        assert!(matches!(err, DomainError::InvalidStatusTransition { .. }));
        assert!(participant.leave(now).is_err());
    }

    #[test]
    fn test_joined_cannot_accept_again() {
        let (competition_id, player_id) = ids();
        let mut participant = CompetitionParticipant::joined(competition_id, player_id, Utc::now());
        assert!(participant.accept(Utc::now()).is_err());
    }
}
