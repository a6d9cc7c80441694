//! Derived statistics of a team.
//!
//! [`RecordAggregator`] folds a team's results into a [`Statistics`] value.
//! Statistics are never stored; they are recomputed from the results every
//! time they are needed, and the same results always give the same
//! statistics.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    statistics::{
        metrics::{
            Metric, WinLoss,
            bids::{BidRule, BidsComputer, TournamentBidLevel},
            breaks::BreakPctComputer,
            last_active::{LastActive, LastActiveComputer},
            opwpm::{AvgOpWpmComputer, NoOpponentData, OpponentLookup},
            record::{PRELIM_RECORD, TRUE_RECORD},
            seeds::TopSeedComputer,
            speaks::AvgSpeaksComputer,
        },
        otr::{OtrInputs, OtrPolicy, WeightTable},
    },
    tournaments::results::TeamResult,
};

pub mod display;
pub mod metrics;
pub mod otr;

/// Every ratio or mean is `None` when there is nothing to compute it from,
/// which is distinct from a value of zero.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Statistics {
    pub otr: Option<Decimal>,
    pub in_top_20_pct: u32,
    pub bids: u32,
    pub avg_speaks: Option<Decimal>,
    pub p_record: WinLoss,
    pub p_wp: Option<Decimal>,
    pub break_pct: Option<Decimal>,
    pub t_wp: Option<Decimal>,
    pub avg_op_wpm: Option<Decimal>,
    pub last_active: Option<LastActive>,
}

pub(crate) static STANDARD_WEIGHTS: once_cell::sync::Lazy<WeightTable> =
    once_cell::sync::Lazy::new(WeightTable::standard);

/// Computes [`Statistics`] from a team's results.
///
/// The OTR policy, the opponent lookup and the bid rule are plugged in by the
/// caller; by default the standard weight table is used, opponents are not
/// resolved and bids follow each tournament's bid level.
#[derive(Clone, Copy)]
pub struct RecordAggregator<'a> {
    policy: &'a dyn OtrPolicy,
    opponents: &'a dyn OpponentLookup,
    bid_rule: &'a dyn BidRule,
}

impl Default for RecordAggregator<'static> {
    fn default() -> Self {
        RecordAggregator {
            policy: &*STANDARD_WEIGHTS,
            opponents: &NoOpponentData,
            bid_rule: &TournamentBidLevel,
        }
    }
}

impl<'a> RecordAggregator<'a> {
    pub fn new(policy: &'a dyn OtrPolicy) -> Self {
        RecordAggregator {
            policy,
            opponents: &NoOpponentData,
            bid_rule: &TournamentBidLevel,
        }
    }

    pub fn opponents(mut self, opponents: &'a dyn OpponentLookup) -> Self {
        self.opponents = opponents;
        self
    }

    pub fn bid_rule(mut self, bid_rule: &'a dyn BidRule) -> Self {
        self.bid_rule = bid_rule;
        self
    }

    pub fn compute(&self, results: &[TeamResult]) -> Statistics {
        let stray: usize = results
            .iter()
            .map(|result| {
                result
                    .rounds
                    .iter()
                    .filter(|round| round.result_id != result.id)
                    .count()
            })
            .sum();
        if stray > 0 {
            tracing::warn!(stray, "skipping rounds attached to the wrong result");
        }

        let p_record = PRELIM_RECORD.compute(results);
        let t_record = TRUE_RECORD.compute(results);
        let break_pct = BreakPctComputer.compute(results);
        let avg_speaks = AvgSpeaksComputer.compute(results);
        let avg_op_wpm = AvgOpWpmComputer(self.opponents).compute(results);
        let in_top_20_pct = TopSeedComputer::TOP_20_PCT.compute(results);
        let bids = BidsComputer(self.bid_rule).compute(results);
        let last_active = LastActiveComputer.compute(results);

        let p_wp = p_record.win_pct();
        let t_wp = t_record.win_pct();

        let otr = self.policy.score(&OtrInputs {
            tournaments: results.len(),
            p_wp,
            t_wp,
            break_pct,
            avg_speaks,
            avg_op_wpm,
            bids,
            in_top_20_pct,
        });

        tracing::debug!(
            results = results.len(),
            policy = self.policy.name(),
            prelims = %p_record,
            all = %t_record,
            bids,
            "aggregated team statistics"
        );

        Statistics {
            otr,
            in_top_20_pct,
            bids,
            avg_speaks,
            p_record,
            p_wp,
            break_pct,
            t_wp,
            avg_op_wpm,
            last_active,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::test::fixtures::{
        against, elim, prelim, result, tournament, with_decisions, with_speaks,
    };
    use crate::tournaments::Tournament;

    #[test]
    fn no_results_means_no_data() {
        let stats = RecordAggregator::default().compute(&[]);

        assert_eq!(stats.p_wp, None);
        assert_eq!(stats.t_wp, None);
        assert_eq!(stats.break_pct, None);
        assert_eq!(stats.avg_speaks, None);
        assert_eq!(stats.avg_op_wpm, None);
        assert_eq!(stats.last_active, None);
        assert_eq!(stats.otr, None);
        assert_eq!(stats.p_record, WinLoss::default());
        assert_eq!(stats.bids, 0);
        assert_eq!(stats.in_top_20_pct, 0);
    }

    #[test]
    fn losing_tournament_then_winning_tournament() {
        let results = vec![
            result(
                1,
                tournament(1, "2024-10-05"),
                (1..=3)
                    .map(|n| with_decisions(prelim(1, n), &["L", "L", "W"]))
                    .collect(),
            ),
            result(
                2,
                tournament(2, "2024-11-09"),
                (1..=3)
                    .map(|n| with_decisions(prelim(2, n), &["W"]))
                    .chain([with_decisions(elim(2, "Octafinals"), &["W", "W", "W"])])
                    .collect(),
            ),
        ];

        let stats = RecordAggregator::default().compute(&results);

        assert_eq!(stats.p_record, WinLoss { wins: 3, losses: 3 });
        assert_eq!(stats.p_wp, Some(Decimal::new(5, 1)));
        // 3 prelim wins and 1 elim win over 7 decided rounds
        assert_eq!(stats.t_wp, Some(Decimal::from(4) / Decimal::from(7)));
        assert_eq!(stats.break_pct, Some(Decimal::new(5, 1)));
    }

    #[test]
    fn split_panel_counts_for_nothing() {
        let results = vec![result(
            1,
            tournament(1, "2024-10-05"),
            vec![
                with_decisions(prelim(1, 1), &["W", "L"]),
                with_decisions(prelim(1, 2), &["L"]),
            ],
        )];

        let stats = RecordAggregator::default().compute(&results);
        assert_eq!(stats.p_record, WinLoss { wins: 0, losses: 1 });
        assert_eq!(stats.p_wp, Some(Decimal::ZERO));
        assert_eq!(stats.t_wp, Some(Decimal::ZERO));
    }

    #[test]
    fn undecided_only_is_not_zero_percent() {
        let results = vec![result(
            1,
            tournament(1, "2024-10-05"),
            vec![with_decisions(prelim(1, 1), &["W", "L"]), prelim(1, 2)],
        )];

        let stats = RecordAggregator::default().compute(&results);
        assert_eq!(stats.p_wp, None);
        assert_eq!(stats.t_wp, None);
        // but the team did attend, and did not break
        assert_eq!(stats.break_pct, Some(Decimal::ZERO));
        assert!(stats.otr.is_some());
    }

    #[test]
    fn same_day_tournaments_resolve_by_id() {
        let results = vec![
            result(1, tournament(42, "2025-03-01"), vec![]),
            result(2, tournament(17, "2025-03-01"), vec![]),
        ];

        let first = RecordAggregator::default().compute(&results);
        let reversed: Vec<_> = results.into_iter().rev().collect();
        let second = RecordAggregator::default().compute(&reversed);

        assert_eq!(first.last_active.as_ref().unwrap().tournament_id, 42);
        assert_eq!(first, second);
    }

    #[test]
    fn malformed_rounds_only_affect_their_metric() {
        let results = vec![result(
            1,
            tournament(1, "2024-10-05"),
            vec![
                // no ballots but speaks
                with_speaks(prelim(1, 1), &[("a", 280), ("b", 290)]),
                // ballots but no speaks
                with_decisions(prelim(1, 2), &["W"]),
            ],
        )];

        let stats = RecordAggregator::default().compute(&results);
        assert_eq!(stats.avg_speaks, Some(Decimal::new(285, 1)));
        assert_eq!(stats.p_record, WinLoss { wins: 1, losses: 0 });
    }

    #[test]
    fn collaborators_are_pluggable() {
        struct Flat;

        impl OtrPolicy for Flat {
            fn name(&self) -> &str {
                "flat"
            }

            fn score(&self, inputs: &OtrInputs) -> Option<Decimal> {
                Some(Decimal::from(inputs.tournaments))
            }
        }

        struct Half;

        impl OpponentLookup for Half {
            fn win_pct_before(&self, _: &str, _: &Tournament) -> Option<Decimal> {
                Some(Decimal::new(5, 1))
            }
        }

        struct Always;

        impl BidRule for Always {
            fn earned_bid(&self, _: &TeamResult) -> bool {
                true
            }
        }

        let results = vec![result(
            1,
            tournament(1, "2024-10-05"),
            vec![against(prelim(1, 1), "x")],
        )];

        let stats = RecordAggregator::new(&Flat)
            .opponents(&Half)
            .bid_rule(&Always)
            .compute(&results);

        assert_eq!(stats.otr, Some(Decimal::ONE));
        assert_eq!(stats.avg_op_wpm, Some(Decimal::new(5, 1)));
        assert_eq!(stats.bids, 1);
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn stray_rounds_are_reported_once() {
        let results = vec![result(
            1,
            tournament(1, "2024-10-05"),
            vec![
                with_decisions(prelim(1, 1), &["W"]),
                with_speaks(with_decisions(prelim(2, 1), &["W"]), &[("a", 290)]),
            ],
        )];

        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .finish();

        let stats = tracing::subscriber::with_default(subscriber, || {
            RecordAggregator::default().compute(&results)
        });

        assert_eq!(stats.p_record, WinLoss { wins: 1, losses: 0 });
        assert_eq!(stats.avg_speaks, None);

        let logs = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert_eq!(logs.matches("wrong result").count(), 1);
    }

    #[test]
    fn deterministic() {
        let results = vec![result(
            1,
            tournament(1, "2024-10-05"),
            vec![
                with_speaks(
                    with_decisions(prelim(1, 1), &["W", "W", "L"]),
                    &[("a", 287), ("b", 281)],
                ),
                with_decisions(elim(1, "Finals"), &["L", "L", "W"]),
            ],
        )];

        let aggregator = RecordAggregator::default();
        let first = aggregator.compute(&results);
        for _ in 0..10 {
            assert_eq!(aggregator.compute(&results), first);
        }
    }
}
