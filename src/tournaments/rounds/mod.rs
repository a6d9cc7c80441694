use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::tournaments::rounds::sequence::EliminationTier;

pub mod sequence;

#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RoundKind {
    #[serde(rename = "P")]
    Preliminary,
    #[serde(rename = "E")]
    Elimination,
}

impl RoundKind {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "P" => Some(RoundKind::Preliminary),
            "E" => Some(RoundKind::Elimination),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            RoundKind::Preliminary => "P",
            RoundKind::Elimination => "E",
        }
    }
}

/// A single judge's decision, from the perspective of the team whose round
/// this is.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Decision {
    #[serde(rename = "W")]
    Win,
    #[serde(rename = "L")]
    Loss,
}

impl Decision {
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "W" | "w" => Some(Decision::Win),
            "L" | "l" => Some(Decision::Loss),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Decision::Win => "W",
            Decision::Loss => "L",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct JudgeRecord {
    pub judge_id: Option<String>,
    pub judge_name: Option<String>,
    /// `None` if the stored decision could not be understood. Such records
    /// are ignored when deciding the round.
    pub decision: Option<Decision>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct RoundSpeaking {
    pub competitor_id: String,
    pub competitor_name: Option<String>,
    pub points: Decimal,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct OpponentRef {
    pub team_id: String,
    /// The opponent's current display code.
    pub alias: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Round {
    pub id: i64,
    pub result_id: i64,
    /// Standardised round label, e.g. `Round 3` or `Quarterfinals`.
    pub name_std: String,
    pub kind: RoundKind,
    pub number: Option<i64>,
    pub opponent: Option<OpponentRef>,
    pub records: Vec<JudgeRecord>,
    pub speaking: Vec<RoundSpeaking>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RoundOutcome {
    Win,
    Loss,
    /// No strict majority of the panel (split panel, no ballots yet, or only
    /// unreadable ballots).
    Undecided,
}

impl Round {
    pub fn is_prelim(&self) -> bool {
        self.kind == RoundKind::Preliminary
    }

    pub fn is_elim(&self) -> bool {
        self.kind == RoundKind::Elimination
    }

    /// The bracket tier of an elimination round, if its label is recognised.
    pub fn tier(&self) -> Option<EliminationTier> {
        match self.kind {
            RoundKind::Preliminary => None,
            RoundKind::Elimination => EliminationTier::from_label(&self.name_std),
        }
    }

    /// Decides the round by strict majority of the (readable) judge records.
    pub fn outcome(&self) -> RoundOutcome {
        let (votes_for, votes_against) = self
            .records
            .iter()
            .filter_map(|record| record.decision)
            .fold((0u32, 0u32), |(votes_for, votes_against), decision| {
                match decision {
                    Decision::Win => (votes_for + 1, votes_against),
                    Decision::Loss => (votes_for, votes_against + 1),
                }
            });

        let panel = votes_for + votes_against;
        if panel == 0 {
            RoundOutcome::Undecided
        } else if votes_for * 2 > panel {
            RoundOutcome::Win
        } else if votes_against * 2 > panel {
            RoundOutcome::Loss
        } else {
            RoundOutcome::Undecided
        }
    }
}
