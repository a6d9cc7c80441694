use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::tournaments::{results::TeamResult, rounds::RoundOutcome};

pub mod bids;
pub mod breaks;
pub mod last_active;
pub mod opwpm;
pub mod record;
pub mod seeds;
pub mod speaks;

/// A statistic derived from a team's results.
///
/// Implementations must be pure: the same results always produce the same
/// value, and missing data degrades the value rather than failing.
pub trait Metric {
    type Value;

    fn compute(&self, results: &[TeamResult]) -> Self::Value;
}

/// Tally of decided rounds. Undecided rounds are never counted.
#[derive(
    Serialize, Deserialize, Copy, Clone, Debug, Default, PartialEq, Eq, Hash,
)]
pub struct WinLoss {
    pub wins: u32,
    pub losses: u32,
}

impl WinLoss {
    pub fn record(&mut self, outcome: RoundOutcome) {
        match outcome {
            RoundOutcome::Win => self.wins += 1,
            RoundOutcome::Loss => self.losses += 1,
            RoundOutcome::Undecided => {}
        }
    }

    pub fn decided(&self) -> u32 {
        self.wins + self.losses
    }

    /// Fraction of decided rounds won, `None` if no round was decided.
    pub fn win_pct(&self) -> Option<Decimal> {
        ratio(self.wins as usize, self.decided() as usize)
    }
}

impl std::ops::AddAssign for WinLoss {
    fn add_assign(&mut self, rhs: Self) {
        self.wins += rhs.wins;
        self.losses += rhs.losses;
    }
}

impl std::fmt::Display for WinLoss {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.wins, self.losses)
    }
}

/// `numerator / denominator`, or `None` when the denominator is zero.
pub fn ratio(numerator: usize, denominator: usize) -> Option<Decimal> {
    if denominator == 0 {
        None
    } else {
        Some(Decimal::from(numerator) / Decimal::from(denominator))
    }
}

/// Arithmetic mean, or `None` for an empty input.
pub fn mean(values: impl IntoIterator<Item = Decimal>) -> Option<Decimal> {
    let (sum, count) = values
        .into_iter()
        .fold((Decimal::ZERO, 0usize), |(sum, count), value| {
            (sum + value, count + 1)
        });

    if count == 0 {
        None
    } else {
        Some(sum / Decimal::from(count))
    }
}
