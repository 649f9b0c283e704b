//! Ranked seasons that competitions can be linked to

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A ranked season with fixed boundaries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Season {
    pub id: String,
    pub display_name: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Season {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            start,
            end,
        }
    }

    /// Whether `at` falls inside the season
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at <= self.end
    }
}

/// Lookup table for season-linked competition dates
#[derive(Debug, Clone, Default)]
pub struct SeasonCalendar {
    seasons: Vec<Season>,
}

impl SeasonCalendar {
    pub fn new(seasons: Vec<Season>) -> Self {
        Self { seasons }
    }

    /// Calendar with the 2025 split boundaries
    pub fn builtin() -> Self {
        let at = |y, m, d| {
            Utc.with_ymd_and_hms(y, m, d, 0, 0, 0)
                .single()
                .unwrap_or_default()
        };
        Self::new(vec![
            Season::new("2025_SEASON_1", "Season 1 2025", at(2025, 1, 9), at(2025, 4, 30)),
            Season::new("2025_SEASON_2", "Season 2 2025", at(2025, 4, 30), at(2025, 8, 27)),
            Season::new("2025_SEASON_3", "Season 3 2025", at(2025, 8, 27), at(2026, 1, 7)),
        ])
    }

    pub fn get(&self, id: &str) -> Option<&Season> {
        self.seasons.iter().find(|s| s.id == id)
    }

    /// Season running at the given instant, if any
    pub fn current(&self, at: DateTime<Utc>) -> Option<&Season> {
        self.seasons.iter().find(|s| s.contains(at))
    }

    pub fn seasons(&self) -> &[Season] {
        &self.seasons
    }
}
