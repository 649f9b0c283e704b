//! Entity to DTO mappers

use chrono::{DateTime, Utc};

use scout_core::{
    Competition, CompetitionDates, CompetitionParticipant, Player, SeasonCalendar,
};

use super::responses::{CompetitionResponse, ParticipantResponse};

impl CompetitionResponse {
    /// Build the response for `competition` as of `now`
    pub fn build(
        competition: &Competition,
        participant_count: i64,
        now: DateTime<Utc>,
        calendar: &SeasonCalendar,
    ) -> Self {
        let range = competition.dates.resolve(calendar);
        let season_id = match &competition.dates {
            CompetitionDates::Season { season_id } => Some(season_id.clone()),
            CompetitionDates::Fixed { .. } => None,
        };

        Self {
            id: competition.id,
            server_id: competition.server_id,
            owner_id: competition.owner_id,
            channel_id: competition.channel_id,
            title: competition.title.clone(),
            description: competition.description.clone(),
            visibility: competition.visibility,
            criteria: competition.criteria.clone(),
            status: competition.status_at(now, calendar),
            max_participants: competition.max_participants,
            participant_count,
            starts_at: range.map(|(start, _)| start),
            ends_at: range.map(|(_, end)| end),
            season_id,
            created_at: competition.created_at,
        }
    }
}

impl ParticipantResponse {
    pub fn build(participant: &CompetitionParticipant, player: Option<&Player>) -> Self {
        Self {
            player_id: participant.player_id,
            alias: player.map(|p| p.display_name().to_string()),
            status: participant.status,
            invited_by: participant.invited_by,
            invited_at: participant.invited_at,
            joined_at: participant.joined_at,
            left_at: participant.left_at,
        }
    }
}

impl From<&CompetitionParticipant> for ParticipantResponse {
    fn from(participant: &CompetitionParticipant) -> Self {
        Self::build(participant, None)
    }
}
