//! Value objects - immutable types that represent domain concepts

mod criteria;
mod ids;
mod permission;
mod season;
mod snowflake;
mod status;

pub use criteria::{CompetitionCriteria, Queue};
pub use ids::{CompetitionId, PlayerId};
pub use permission::PermissionType;
pub use season::{Season, SeasonCalendar};
pub use snowflake::{Snowflake, SnowflakeParseError};
pub use status::ParticipantStatus;
