use serde::{Deserialize, Serialize};

use crate::{statistics::metrics::Metric, tournaments::results::TeamResult};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct LastActive {
    pub date: chrono::NaiveDate,
    pub tournament_id: i64,
    pub tournament_name: String,
}

/// The most recent tournament the team attended. Tournaments on the same day
/// are told apart by id, the higher id counting as more recent.
pub struct LastActiveComputer;

impl Metric for LastActiveComputer {
    type Value = Option<LastActive>;

    fn compute(&self, results: &[TeamResult]) -> Option<LastActive> {
        results
            .iter()
            .map(|result| &result.tournament)
            .max_by_key(|tournament| tournament.chronological_key())
            .map(|tournament| LastActive {
                date: tournament.start_date,
                tournament_id: tournament.id,
                tournament_name: tournament.name.clone(),
            })
    }
}
