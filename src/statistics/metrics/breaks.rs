use rust_decimal::Decimal;

use crate::{
    statistics::metrics::{Metric, ratio},
    tournaments::results::TeamResult,
};

/// Fraction of tournaments at which the team debated at least one
/// elimination round.
pub struct BreakPctComputer;

impl Metric for BreakPctComputer {
    type Value = Option<Decimal>;

    fn compute(&self, results: &[TeamResult]) -> Option<Decimal> {
        let breaks = results.iter().filter(|result| result.broke()).count();
        ratio(breaks, results.len())
    }
}
