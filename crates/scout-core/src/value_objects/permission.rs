//! Server-scoped permission names

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A named permission granted to a Discord user within one server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PermissionType {
    /// Allows creating competitions without being a server administrator
    CreateCompetition,
}

impl PermissionType {
    /// Database / wire representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CreateCompetition => "CREATE_COMPETITION",
        }
    }

    /// All known permissions
    pub const fn all() -> &'static [PermissionType] {
        &[Self::CreateCompetition]
    }
}

impl fmt::Display for PermissionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PermissionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREATE_COMPETITION" => Ok(Self::CreateCompetition),
            _ => Err(format!("Unknown permission: {s}")),
        }
    }
}
