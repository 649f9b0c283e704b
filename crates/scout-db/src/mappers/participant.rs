//! Participant entity <-> model mapper

use scout_core::{
    CompetitionId, CompetitionParticipant, DomainError, ParticipantStatus, PlayerId, Snowflake,
};

use crate::models::ParticipantModel;

use super::corrupt_column;

impl TryFrom<ParticipantModel> for CompetitionParticipant {
    type Error = DomainError;

    fn try_from(model: ParticipantModel) -> Result<Self, Self::Error> {
        let status: ParticipantStatus = model
            .status
            .parse()
            .map_err(|e| corrupt_column("competition_participants.status", e))?;

        Ok(CompetitionParticipant {
            competition_id: CompetitionId::new(model.competition_id),
            player_id: PlayerId::new(model.player_id),
            status,
            invited_by: model.invited_by.map(Snowflake::new),
            invited_at: model.invited_at,
            joined_at: model.joined_at,
            left_at: model.left_at,
        })
    }
}

/// Column values for inserting or updating a participant row
pub struct ParticipantWrite {
    pub competition_id: i32,
    pub player_id: i32,
    pub status: &'static str,
    pub invited_by: Option<i64>,
}

impl ParticipantWrite {
    pub fn new(participant: &CompetitionParticipant) -> Self {
        Self {
            competition_id: participant.competition_id.into_inner(),
            player_id: participant.player_id.into_inner(),
            status: participant.status.as_str(),
            invited_by: participant.invited_by.map(Snowflake::into_inner),
        }
    }
}
