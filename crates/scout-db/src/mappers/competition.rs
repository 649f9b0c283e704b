//! Competition entity <-> model mapper

use scout_core::{
    Competition, CompetitionCriteria, CompetitionDates, CompetitionId, DomainError,
    NewCompetition, Snowflake, Visibility,
};

use crate::models::CompetitionModel;

use super::corrupt_column;

impl TryFrom<CompetitionModel> for Competition {
    type Error = DomainError;

    fn try_from(model: CompetitionModel) -> Result<Self, Self::Error> {
        let visibility: Visibility = model
            .visibility
            .parse()
            .map_err(|e| corrupt_column("competitions.visibility", e))?;
        let criteria: CompetitionCriteria = serde_json::from_value(model.criteria)
            .map_err(|e| corrupt_column("competitions.criteria", e))?;
        let dates: CompetitionDates = serde_json::from_value(model.dates)
            .map_err(|e| corrupt_column("competitions.dates", e))?;

        Ok(Competition {
            id: CompetitionId::new(model.id),
            server_id: Snowflake::new(model.server_id),
            owner_id: Snowflake::new(model.owner_id),
            channel_id: Snowflake::new(model.channel_id),
            title: model.title,
            description: model.description,
            visibility,
            criteria,
            max_participants: model.max_participants,
            dates,
            is_cancelled: model.is_cancelled,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

/// Column values for inserting a competition
pub struct CompetitionInsert<'a> {
    pub server_id: i64,
    pub owner_id: i64,
    pub channel_id: i64,
    pub title: &'a str,
    pub description: &'a str,
    pub visibility: &'static str,
    pub criteria: serde_json::Value,
    pub max_participants: i32,
    pub dates: serde_json::Value,
}

impl<'a> CompetitionInsert<'a> {
    pub fn new(competition: &'a NewCompetition) -> Result<Self, DomainError> {
        Ok(Self {
            server_id: competition.server_id.into_inner(),
            owner_id: competition.owner_id.into_inner(),
            channel_id: competition.channel_id.into_inner(),
            title: &competition.title,
            description: &competition.description,
            visibility: competition.visibility.as_str(),
            criteria: encode_criteria(&competition.criteria)?,
            max_participants: competition.max_participants,
            dates: encode_dates(&competition.dates)?,
        })
    }
}

pub(crate) fn encode_dates(dates: &CompetitionDates) -> Result<serde_json::Value, DomainError> {
    serde_json::to_value(dates).map_err(|e| DomainError::InternalError(e.to_string()))
}

fn encode_criteria(criteria: &CompetitionCriteria) -> Result<serde_json::Value, DomainError> {
    serde_json::to_value(criteria).map_err(|e| DomainError::InternalError(e.to_string()))
}
