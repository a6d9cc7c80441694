use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    teams::Alias,
    tournaments::{Tournament, rounds::Round},
};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct School {
    pub id: i64,
    pub name: String,
}

/// A competitor's speaker points over a whole tournament.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ResultSpeaking {
    pub competitor_id: String,
    pub competitor_name: Option<String>,
    pub raw_avg: Decimal,
}

/// One team's participation in one tournament.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TeamResult {
    pub id: i64,
    pub tournament: Tournament,
    pub alias: Option<Alias>,
    pub school: Option<School>,
    /// The team's seed at the end of the preliminary rounds (1 is the top
    /// seed).
    pub prelim_pos: Option<i64>,
    pub speaking: Vec<ResultSpeaking>,
    /// Rounds in canonical order.
    pub rounds: Vec<Round>,
}

impl TeamResult {
    /// Rounds which actually belong to this result. Rounds carrying another
    /// result's id are skipped; [`crate::statistics::RecordAggregator`]
    /// reports them once per computation.
    pub fn own_rounds(&self) -> impl Iterator<Item = &Round> + '_ {
        self.rounds.iter().filter(move |round| {
            let own = round.result_id == self.id;
            if !own {
                tracing::trace!(
                    result = self.id,
                    round = round.id,
                    round_result = round.result_id,
                    "skipping round attached to the wrong result"
                );
            }
            own
        })
    }

    /// Whether the team debated at least one elimination round.
    pub fn broke(&self) -> bool {
        self.own_rounds().any(Round::is_elim)
    }
}
