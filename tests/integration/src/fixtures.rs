//! Test fixtures and data generators

use anyhow::Result;
use chrono::{Duration, Utc};
use std::sync::atomic::{AtomicI64, Ordering};

use scout_core::{CompetitionCriteria, CompetitionDates, Player, Queue, Snowflake, Visibility};
use scout_service::{CreateCompetitionRequest, ServiceContext};

/// Counter for unique test ids
static COUNTER: AtomicI64 = AtomicI64::new(1);

/// Snowflake unique within this run and across runs against one database
pub fn unique_snowflake() -> Snowflake {
    let base = Utc::now().timestamp_micros() * 1_000;
    Snowflake::new(base + COUNTER.fetch_add(1, Ordering::SeqCst))
}

/// Running competition: started an hour ago, ends in a week
pub fn running_dates() -> CompetitionDates {
    let now = Utc::now();
    CompetitionDates::Fixed {
        start: now - Duration::hours(1),
        end: now + Duration::days(7),
    }
}

pub fn competition_request(visibility: Visibility, max_participants: i32) -> CreateCompetitionRequest {
    CreateCompetitionRequest {
        channel_id: unique_snowflake(),
        title: "Weekly solo climb".to_string(),
        description: "Most LP gained this week".to_string(),
        visibility,
        criteria: CompetitionCriteria::MostRankClimb { queue: Queue::Solo },
        max_participants,
        dates: running_dates(),
    }
}

pub async fn create_player(ctx: &ServiceContext, server_id: Snowflake, alias: &str) -> Result<Player> {
    Ok(ctx.player_repo().create(server_id, alias, None).await?)
}
