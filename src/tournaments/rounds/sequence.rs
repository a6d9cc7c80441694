//! Canonical ordering of the rounds of a single result.
//!
//! Preliminary rounds come first, in ascending round number. They are followed
//! by the elimination rounds, from the widest bracket to the final. Rounds
//! which cannot be placed (unnumbered prelims, elimination rounds with an
//! unknown label) go to the end of their phase. Ties keep their input order.

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{error::StatsError, tournaments::rounds::Round};

/// Depth of an elimination round within the bracket.
#[derive(
    Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
pub enum EliminationTier {
    TripleOctafinals,
    DoubleOctafinals,
    Octafinals,
    Quarterfinals,
    Semifinals,
    Finals,
}

/// Every spelling of an elimination round we know how to place. Labels are
/// compared after [`normalize_label`].
const TIER_LABELS: &[(&str, EliminationTier)] = &[
    ("tripleoctafinals", EliminationTier::TripleOctafinals),
    ("tripleoctofinals", EliminationTier::TripleOctafinals),
    ("triples", EliminationTier::TripleOctafinals),
    ("trips", EliminationTier::TripleOctafinals),
    ("roundof64", EliminationTier::TripleOctafinals),
    ("doubleoctafinals", EliminationTier::DoubleOctafinals),
    ("doubleoctofinals", EliminationTier::DoubleOctafinals),
    ("doubles", EliminationTier::DoubleOctafinals),
    ("dubs", EliminationTier::DoubleOctafinals),
    ("roundof32", EliminationTier::DoubleOctafinals),
    ("octafinals", EliminationTier::Octafinals),
    ("octofinals", EliminationTier::Octafinals),
    ("octas", EliminationTier::Octafinals),
    ("octos", EliminationTier::Octafinals),
    ("roundof16", EliminationTier::Octafinals),
    ("quarterfinals", EliminationTier::Quarterfinals),
    ("quarters", EliminationTier::Quarterfinals),
    ("quarts", EliminationTier::Quarterfinals),
    ("semifinals", EliminationTier::Semifinals),
    ("semis", EliminationTier::Semifinals),
    ("finals", EliminationTier::Finals),
    ("final", EliminationTier::Finals),
];

fn normalize_label(label: &str) -> String {
    label
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

impl EliminationTier {
    pub const ALL: [EliminationTier; 6] = [
        EliminationTier::TripleOctafinals,
        EliminationTier::DoubleOctafinals,
        EliminationTier::Octafinals,
        EliminationTier::Quarterfinals,
        EliminationTier::Semifinals,
        EliminationTier::Finals,
    ];

    pub fn from_label(label: &str) -> Option<Self> {
        let label = normalize_label(label);
        TIER_LABELS
            .iter()
            .find_map(|(known, tier)| (*known == label).then_some(*tier))
    }

    /// Number of teams left in the bracket when this round is debated.
    pub fn teams_remaining(&self) -> u32 {
        match self {
            EliminationTier::TripleOctafinals => 64,
            EliminationTier::DoubleOctafinals => 32,
            EliminationTier::Octafinals => 16,
            EliminationTier::Quarterfinals => 8,
            EliminationTier::Semifinals => 4,
            EliminationTier::Finals => 2,
        }
    }

    /// The round debated by a bracket of `teams` teams.
    pub fn with_teams_remaining(teams: u32) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|tier| tier.teams_remaining() == teams)
    }
}

impl std::fmt::Display for EliminationTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            EliminationTier::TripleOctafinals => "Triple Octafinals",
            EliminationTier::DoubleOctafinals => "Double Octafinals",
            EliminationTier::Octafinals => "Octafinals",
            EliminationTier::Quarterfinals => "Quarterfinals",
            EliminationTier::Semifinals => "Semifinals",
            EliminationTier::Finals => "Finals",
        })
    }
}

/// Sort key placing a round within the canonical order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Slot {
    Prelim(i64),
    UnnumberedPrelim,
    Elim(EliminationTier),
    UnknownElim,
}

fn slot_of(round: &Round) -> Slot {
    if round.is_prelim() {
        round.number.map_or(Slot::UnnumberedPrelim, Slot::Prelim)
    } else {
        round.tier().map_or(Slot::UnknownElim, Slot::Elim)
    }
}

/// Returns references to `rounds` in canonical order, without checking that
/// they belong to the same result.
pub fn canonical_order(rounds: &[Round]) -> Vec<&Round> {
    rounds.iter().sorted_by_key(|round| slot_of(round)).collect()
}

/// Returns the rounds of one result in canonical order.
///
/// Fails if the rounds belong to more than one result.
pub fn sort_rounds(rounds: &[Round]) -> Result<Vec<Round>, StatsError> {
    if let Some(first) = rounds.first() {
        if let Some(stray) =
            rounds.iter().find(|round| round.result_id != first.result_id)
        {
            return Err(StatsError::MixedResults {
                expected: first.result_id,
                found: stray.result_id,
            });
        }
    }

    Ok(canonical_order(rounds).into_iter().cloned().collect())
}
