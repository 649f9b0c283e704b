//! Request DTOs
//!
//! Field-level limits are checked by `validator`; limits that depend on
//! configuration or on the season calendar are checked by the services.

use serde::Deserialize;
use validator::{Validate, ValidationError};

use scout_core::{CompetitionCriteria, CompetitionDates, Snowflake, Visibility};

/// Create competition request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCompetitionRequest {
    /// Channel the competition posts its updates to
    pub channel_id: Snowflake,

    #[validate(
        length(min = 1, max = 100, message = "Title must be 1-100 characters"),
        custom(function = "not_blank")
    )]
    pub title: String,

    #[serde(default)]
    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: String,

    pub visibility: Visibility,

    pub criteria: CompetitionCriteria,

    #[validate(range(min = 2, message = "A competition needs at least 2 participants"))]
    pub max_participants: i32,

    pub dates: CompetitionDates,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("Title must not be blank".into()));
    }
    Ok(())
}

/// Replace a competition's date range
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateDatesRequest {
    pub dates: CompetitionDates,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request() -> CreateCompetitionRequest {
        serde_json::from_value(json!({
            "channel_id": "987654321",
            "title": "Solo queue grind",
            "visibility": "OPEN",
            "criteria": {"type": "MOST_GAMES_PLAYED", "queue": "SOLO"},
            "max_participants": 10,
            "dates": {"type": "SEASON", "season_id": "2025_SEASON_2"}
        }))
        .unwrap()
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let req = request();
        assert_eq!(req.description, "");
        assert_eq!(req.channel_id, Snowflake::new(987_654_321));
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_title_length() {
        let mut req = request();
        req.title = String::new();
        assert!(req.validate().is_err());

        req.title = "x".repeat(101);
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_whitespace_title_rejected() {
        let mut req = request();
        req.title = " \t  ".to_string();
        let errors = req.validate().unwrap_err();
        let field_errors = errors.field_errors();
        let title = field_errors["title"];
        assert_eq!(title[0].code, "blank");

        req.title = "  Flex night ".to_string();
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_min_participants() {
        let mut req = request();
        req.max_participants = 1;
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("max_participants"));
    }
}
