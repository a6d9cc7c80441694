use rust_decimal::Decimal;

use crate::{
    statistics::metrics::{Metric, mean},
    tournaments::{Tournament, results::TeamResult},
};

/// Resolves an opponent's own win percentage as it stood when a round was
/// debated. Implementations live outside the aggregation (see
/// [`crate::store::opponents::OpponentHistory`]).
pub trait OpponentLookup: Send + Sync {
    /// The opponent's true win percentage over the tournaments strictly
    /// before `tournament`, or `None` if it cannot be resolved.
    fn win_pct_before(
        &self,
        opponent_id: &str,
        tournament: &Tournament,
    ) -> Option<Decimal>;
}

/// Lookup for callers with no opponent data; every opponent is unresolved.
pub struct NoOpponentData;

impl OpponentLookup for NoOpponentData {
    fn win_pct_before(&self, _: &str, _: &Tournament) -> Option<Decimal> {
        None
    }
}

/// Mean, over the rounds with a resolvable opponent, of that opponent's win
/// percentage.
pub struct AvgOpWpmComputer<'a>(pub &'a dyn OpponentLookup);

impl Metric for AvgOpWpmComputer<'_> {
    type Value = Option<Decimal>;

    fn compute(&self, results: &[TeamResult]) -> Option<Decimal> {
        mean(results.iter().flat_map(|result| {
            result.own_rounds().filter_map(move |round| {
                let opponent = round.opponent.as_ref()?;
                self.0.win_pct_before(&opponent.team_id, &result.tournament)
            })
        }))
    }
}
