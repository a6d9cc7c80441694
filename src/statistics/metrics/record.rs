use crate::{
    statistics::metrics::{Metric, WinLoss},
    tournaments::{results::TeamResult, rounds::Round},
};

/// Counts decided rounds. With `PRELIMS_ONLY` set only preliminary rounds are
/// considered, otherwise every round (prelims and elims) is.
pub struct RecordComputer<const PRELIMS_ONLY: bool>;

/// Preliminary record, from which the prelim win percentage is derived.
pub const PRELIM_RECORD: RecordComputer<true> = RecordComputer;

/// Record across all rounds, from which the true win percentage is derived.
pub const TRUE_RECORD: RecordComputer<false> = RecordComputer;

impl<const PRELIMS_ONLY: bool> Metric for RecordComputer<PRELIMS_ONLY> {
    type Value = WinLoss;

    fn compute(&self, results: &[TeamResult]) -> WinLoss {
        results
            .iter()
            .flat_map(|result| result.own_rounds())
            .filter(|round| !PRELIMS_ONLY || round.is_prelim())
            .map(Round::outcome)
            .fold(WinLoss::default(), |mut tally, outcome| {
                tally.record(outcome);
                tally
            })
    }
}
