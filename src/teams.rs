use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    error::StatsError,
    tournaments::{Circuit, Event, Season, results::TeamResult},
    validation::{is_ascii_no_spaces, is_valid_alias_code},
};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Competitor {
    pub id: String,
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Alias {
    pub id: i64,
    pub code: String,
}

impl Alias {
    pub fn new(id: i64, code: &str) -> Result<Self, StatsError> {
        is_valid_alias_code(code)
            .map_err(|e| StatsError::InvalidId(code.to_string(), e))?;
        Ok(Alias {
            id,
            code: code.to_string(),
        })
    }
}

/// A ranking published for the team by the ingestion pipeline.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Ranking {
    pub season_id: i64,
    pub circuit_id: i64,
    pub circuit_name: Option<String>,
    pub otr: Decimal,
}

/// Which slice of a team's history to load.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TeamQuery {
    pub id: String,
    pub event: Event,
    pub season: Option<i64>,
    pub circuit: Option<i64>,
}

impl TeamQuery {
    pub fn new(id: &str, event: &str) -> Result<Self, StatsError> {
        is_ascii_no_spaces(id)
            .map_err(|e| StatsError::InvalidId(id.to_string(), e))?;

        Ok(TeamQuery {
            id: id.to_string(),
            event: event.parse()?,
            season: None,
            circuit: None,
        })
    }

    pub fn season(mut self, season: Option<i64>) -> Self {
        self.season = season;
        self
    }

    pub fn circuit(mut self, circuit: Option<i64>) -> Self {
        self.circuit = circuit;
        self
    }
}

/// Everything the team profile needs, as returned by
/// [`crate::store::TeamSource::team_summary`].
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TeamSummary {
    pub id: String,
    pub competitors: Vec<Competitor>,
    /// Results matching the query, oldest tournament first.
    pub results: Vec<TeamResult>,
    pub alias: Option<Alias>,
    pub rankings: Vec<Ranking>,
    pub circuits: Vec<Circuit>,
    pub seasons: Vec<Season>,
    /// Number of rounds the team has debated across all events.
    pub round_count: i64,
}

impl TeamSummary {
    /// `"A & B"` for partnerships, the competitor's name for solo entries.
    pub fn display_name(&self) -> String {
        self.competitors
            .iter()
            .map(|competitor| competitor.name.as_str())
            .collect::<Vec<_>>()
            .join(" & ")
    }

    pub fn code(&self) -> &str {
        self.alias.as_ref().map_or("--", |alias| alias.code.as_str())
    }

    /// `first-last` season span, e.g. `2022-2024`.
    pub fn season_span(&self) -> Option<String> {
        let first = self.seasons.iter().map(|s| s.id).min()?;
        let last = self.seasons.iter().map(|s| s.id).max()?;
        Some(format!("{first}-{last}"))
    }
}
