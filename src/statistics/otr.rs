//! The OTR (overall tournament rating) composite.
//!
//! The score is produced by an [`OtrPolicy`]. The stock policy is a
//! [`WeightTable`], a named vector of weights which can be loaded from the
//! configuration file, so that re-weighting never touches the aggregation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The statistics an OTR policy may draw on.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OtrInputs {
    pub tournaments: usize,
    pub p_wp: Option<Decimal>,
    pub t_wp: Option<Decimal>,
    pub break_pct: Option<Decimal>,
    pub avg_speaks: Option<Decimal>,
    pub avg_op_wpm: Option<Decimal>,
    pub bids: u32,
    pub in_top_20_pct: u32,
}

pub trait OtrPolicy: Send + Sync {
    fn name(&self) -> &str;

    /// `None` if the team has no results to rate.
    fn score(&self, inputs: &OtrInputs) -> Option<Decimal>;
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct WeightTable {
    pub name: String,
    pub prelim_win_pct: Decimal,
    pub true_win_pct: Decimal,
    pub break_pct: Decimal,
    /// Applied to average speaks normalised into `[0, 1]` over
    /// `speaks_floor..=speaks_ceiling`.
    pub speaks: Decimal,
    #[serde(default)]
    pub opponent_win_pct: Decimal,
    /// Per bid.
    pub bids: Decimal,
    /// Per top 20% prelim seed.
    pub top_20_pct: Decimal,
    pub speaks_floor: Decimal,
    pub speaks_ceiling: Decimal,
}

impl WeightTable {
    pub fn standard() -> Self {
        WeightTable {
            name: "standard".to_string(),
            prelim_win_pct: Decimal::ONE,
            true_win_pct: Decimal::ONE,
            break_pct: Decimal::new(15, 1),
            speaks: Decimal::new(5, 1),
            opponent_win_pct: Decimal::ZERO,
            bids: Decimal::new(25, 2),
            top_20_pct: Decimal::new(1, 1),
            speaks_floor: Decimal::from(25),
            speaks_ceiling: Decimal::from(30),
        }
    }

    fn normalized_speaks(&self, avg_speaks: Decimal) -> Decimal {
        let window = self.speaks_ceiling - self.speaks_floor;
        if window <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        ((avg_speaks - self.speaks_floor) / window)
            .clamp(Decimal::ZERO, Decimal::ONE)
    }
}

impl Default for WeightTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl OtrPolicy for WeightTable {
    fn name(&self) -> &str {
        &self.name
    }

    fn score(&self, inputs: &OtrInputs) -> Option<Decimal> {
        if inputs.tournaments == 0 {
            return None;
        }

        let weighted = |weight: Decimal, component: Option<Decimal>| {
            weight * component.unwrap_or(Decimal::ZERO)
        };

        Some(
            weighted(self.prelim_win_pct, inputs.p_wp)
                + weighted(self.true_win_pct, inputs.t_wp)
                + weighted(self.break_pct, inputs.break_pct)
                + weighted(
                    self.speaks,
                    inputs.avg_speaks.map(|s| self.normalized_speaks(s)),
                )
                + weighted(self.opponent_win_pct, inputs.avg_op_wpm)
                + self.bids * Decimal::from(inputs.bids)
                + self.top_20_pct * Decimal::from(inputs.in_top_20_pct),
        )
    }
}
