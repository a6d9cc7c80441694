use std::collections::HashMap;

use chrono::NaiveDate;
use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};
use rust_decimal::Decimal;

use crate::{
    schema::results,
    statistics::metrics::{WinLoss, opwpm::OpponentLookup},
    store::{ResultRow, load_rounds, load_tournaments},
    tournaments::{Event, Tournament},
};

/// Per-tournament records of a set of teams, used to resolve the strength of
/// the opponents a team faced.
///
/// An opponent's win percentage "before" a tournament only counts
/// tournaments which sort strictly earlier by `(start date, tournament id)`,
/// so the team's own round against them never feeds back into the figure.
#[derive(Debug, Default, Clone)]
pub struct OpponentHistory {
    tallies: HashMap<String, Vec<((NaiveDate, i64), WinLoss)>>,
}

impl OpponentHistory {
    pub fn record(&mut self, team_id: &str, tournament: &Tournament, tally: WinLoss) {
        self.tallies
            .entry(team_id.to_string())
            .or_default()
            .push((tournament.chronological_key(), tally));
    }

    /// Loads the records of `team_ids` in `event`.
    pub fn fetch(
        team_ids: &[String],
        event: Event,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> QueryResult<Self> {
        let mut history = OpponentHistory::default();
        if team_ids.is_empty() {
            return Ok(history);
        }

        let rows = results::table
            .filter(results::team_id.eq_any(team_ids))
            .load::<ResultRow>(conn)?;

        let tournament_ids: Vec<i64> =
            rows.iter().map(|row| row.tournament_id).collect();
        let tournaments = load_tournaments(&tournament_ids, conn)?;

        let result_ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
        let rounds = load_rounds(&result_ids, conn)?;

        for row in &rows {
            let Some(tournament) = tournaments
                .get(&row.tournament_id)
                .filter(|tournament| tournament.event == event)
            else {
                continue;
            };

            let tally = rounds
                .get(&row.id)
                .into_iter()
                .flatten()
                .fold(WinLoss::default(), |mut tally, round| {
                    tally.record(round.outcome());
                    tally
                });

            history.record(&row.team_id, tournament, tally);
        }

        tracing::trace!(
            teams = history.tallies.len(),
            results = rows.len(),
            "loaded opponent history"
        );

        Ok(history)
    }
}

impl OpponentLookup for OpponentHistory {
    fn win_pct_before(
        &self,
        opponent_id: &str,
        tournament: &Tournament,
    ) -> Option<Decimal> {
        let before = tournament.chronological_key();
        self.tallies
            .get(opponent_id)?
            .iter()
            .filter(|(key, _)| *key < before)
            .fold(WinLoss::default(), |mut total, (_, tally)| {
                total += *tally;
                total
            })
            .win_pct()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::fixtures::tournament;

    #[test]
    fn only_earlier_tournaments_count() {
        let mut history = OpponentHistory::default();
        history.record("opp", &tournament(1, "2024-09-01"), WinLoss {
            wins: 3,
            losses: 1,
        });
        history.record("opp", &tournament(2, "2024-10-01"), WinLoss {
            wins: 0,
            losses: 4,
        });

        assert_eq!(
            history.win_pct_before("opp", &tournament(3, "2024-10-01")),
            // same date but a later id, so both count
            Some(Decimal::new(375, 3))
        );
        assert_eq!(
            history.win_pct_before("opp", &tournament(2, "2024-10-01")),
            Some(Decimal::new(75, 2))
        );
        assert_eq!(
            history.win_pct_before("opp", &tournament(9, "2024-08-01")),
            None
        );
        assert_eq!(
            history.win_pct_before("stranger", &tournament(9, "2025-08-01")),
            None
        );
    }

    #[test]
    fn opponents_without_decided_rounds_are_unresolved() {
        let mut history = OpponentHistory::default();
        history.record("opp", &tournament(1, "2024-09-01"), WinLoss::default());

        assert_eq!(
            history.win_pct_before("opp", &tournament(2, "2024-10-01")),
            None
        );
    }
}
