use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::StatsError;

pub mod results;
pub mod rounds;

#[derive(
    Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
pub enum Event {
    PublicForum,
    LincolnDouglas,
    Policy,
}

impl Event {
    pub const ALL: [Event; 3] =
        [Event::PublicForum, Event::LincolnDouglas, Event::Policy];

    /// The value stored in the `event` columns.
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::PublicForum => "PublicForum",
            Event::LincolnDouglas => "LincolnDouglas",
            Event::Policy => "Policy",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Event::PublicForum => "Public Forum",
            Event::LincolnDouglas => "Lincoln Douglas",
            Event::Policy => "Policy",
        })
    }
}

impl FromStr for Event {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Event::ALL
            .into_iter()
            .find(|event| event.as_str() == s)
            .ok_or_else(|| StatsError::InvalidEvent(s.to_string()))
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Circuit {
    pub id: i64,
    pub name: String,
    pub event: Event,
}

#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
pub struct Season {
    /// Seasons are identified by the year in which they end.
    pub id: i64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Tournament {
    pub id: i64,
    pub name: String,
    pub event: Event,
    pub season_id: i64,
    pub start_date: chrono::NaiveDate,
    pub circuits: Vec<Circuit>,
    /// Size of the field, if known.
    pub entries: Option<i64>,
    /// Label of the elimination round whose participants earn a bid, for
    /// tournaments which award bids.
    pub bid_level: Option<String>,
}

impl Tournament {
    /// Key which orders tournaments chronologically. Tournaments starting on
    /// the same day are ordered by id so that the order is total.
    pub fn chronological_key(&self) -> (chrono::NaiveDate, i64) {
        (self.start_date, self.id)
    }
}
