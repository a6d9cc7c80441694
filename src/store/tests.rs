use diesel::connection::SimpleConnection;
use rust_decimal::Decimal;

use super::*;
use crate::statistics::{
    metrics::{WinLoss, opwpm::OpponentLookup},
    otr::WeightTable,
};

const SEED: &str = r#"
insert into seasons (id) values (2024), (2025);
insert into circuits (id, name, event) values
    (1, 'National', 'PublicForum'),
    (2, 'Texas', 'LincolnDouglas');
insert into teams (id) values ('alpha'), ('beta'), ('gamma');
insert into competitors (id, name) values ('ada', 'Ada'), ('bob', 'Bob');
insert into team_competitors (team_id, competitor_id) values
    ('alpha', 'bob'), ('alpha', 'ada');
insert into aliases (id, team_id, code) values
    (1, 'alpha', 'Westside AB'),
    (2, 'alpha', 'Westside AL'),
    (3, 'beta', 'Eastside XY');
insert into schools (id, name) values (1, 'Westside High');
insert into team_circuits (team_id, circuit_id) values ('alpha', 1);
insert into team_seasons (team_id, season_id) values
    ('alpha', 2025), ('alpha', 2024);

insert into tournaments (id, name, event, season_id, start_date, entries, bid_level) values
    (10, 'Early', 'PublicForum', 2025, '2024-09-14', 50, 'Octafinals'),
    (11, 'Late', 'PublicForum', 2025, '2024-11-02', null, null),
    (12, 'LD Open', 'LincolnDouglas', 2025, '2024-10-05', 40, null),
    (13, 'Old', 'PublicForum', 2024, '2023-10-01', 30, null);
insert into tournament_circuits (tournament_id, circuit_id) values
    (10, 1), (11, 1), (12, 2), (13, 1);

insert into results (id, team_id, tournament_id, alias_id, school_id, prelim_pos) values
    (1, 'alpha', 10, 1, 1, 5),
    (2, 'alpha', 11, 2, null, null),
    (3, 'alpha', 12, 2, null, null),
    (4, 'alpha', 13, 1, 1, 20),
    (20, 'beta', 10, 3, null, null),
    (21, 'beta', 11, 3, null, null);

insert into result_speaking (id, result_id, competitor_id, raw_avg) values
    (1, 1, 'ada', 28.5);

-- inserted out of order on purpose
insert into rounds (id, result_id, name_std, kind, number, opponent_id) values
    (103, 1, 'Octafinals', 'E', null, null),
    (102, 1, 'Round 2', 'P', 2, null),
    (101, 1, 'Round 1', 'P', 1, null),
    (201, 2, 'Round 1', 'P', 1, 'beta'),
    (301, 3, 'Round 1', 'P', 1, null),
    (401, 4, 'Round 1', 'P', 1, null),
    (501, 20, 'Round 1', 'P', 1, 'gamma'),
    (502, 20, 'Round 2', 'P', 2, 'gamma'),
    (601, 21, 'Round 1', 'P', 1, 'alpha');

insert into judges (id, name) values ('j1', 'Judge One'), ('j2', 'Judge Two');
insert into judge_records (id, round_id, judge_id, decision) values
    (1, 101, 'j1', 'L'),
    (2, 102, 'j1', 'W'),
    (3, 103, 'j1', 'W'),
    (4, 103, 'j2', 'W'),
    (5, 103, null, 'L'),
    (6, 201, 'j2', 'W'),
    (7, 301, 'j1', 'W'),
    (8, 401, 'j1', 'L'),
    (9, 401, 'j2', '?'),
    (10, 501, 'j1', 'W'),
    (11, 502, 'j1', 'L'),
    (12, 601, 'j1', 'L');

insert into round_speaking (id, round_id, competitor_id, points) values
    (1, 201, 'ada', 29.0),
    (2, 201, 'bob', 28.0);

insert into rankings (id, team_id, season_id, circuit_id, otr) values
    (1, 'alpha', 2025, 1, 3.1),
    (2, 'alpha', 2024, 1, 2.0);
"#;

fn store() -> SqliteStore {
    let mut store = SqliteStore::connect(":memory:").unwrap();
    store.conn().batch_execute(SEED).unwrap();
    store
}

fn query() -> TeamQuery {
    TeamQuery::new("alpha", "PublicForum").unwrap()
}

fn result_ids(summary: &TeamSummary) -> Vec<i64> {
    summary.results.iter().map(|result| result.id).collect()
}

#[test]
fn unknown_team_is_not_found() {
    let mut store = store();
    let query = TeamQuery::new("nobody", "PublicForum").unwrap();
    assert!(matches!(
        store.team_summary(&query),
        Err(StatsError::NotFound)
    ));
}

#[test]
fn summary_of_one_event() {
    let mut store = store();
    let summary = store.team_summary(&query()).unwrap();

    // oldest first, and the Lincoln Douglas result is left out
    assert_eq!(result_ids(&summary), vec![4, 1, 2]);
    assert_eq!(summary.display_name(), "Ada & Bob");
    assert_eq!(summary.code(), "Westside AL");
    assert_eq!(summary.rankings.len(), 2);
    assert_eq!(summary.circuits.len(), 1);
    assert_eq!(summary.seasons.len(), 2);
    // every round the team debated, whatever the event
    assert_eq!(summary.round_count, 6);

    let early = &summary.results[1];
    assert_eq!(early.alias.as_ref().unwrap().code, "Westside AB");
    assert_eq!(early.school.as_ref().unwrap().name, "Westside High");
    assert_eq!(early.speaking[0].competitor_name.as_deref(), Some("Ada"));
    assert_eq!(early.speaking[0].raw_avg, Decimal::new(285, 1));
    assert_eq!(early.tournament.circuits[0].name, "National");

    let names: Vec<&str> =
        early.rounds.iter().map(|round| round.name_std.as_str()).collect();
    assert_eq!(names, vec!["Round 1", "Round 2", "Octafinals"]);

    let late = &summary.results[2];
    let opponent = late.rounds[0].opponent.as_ref().unwrap();
    assert_eq!(opponent.team_id, "beta");
    assert_eq!(opponent.alias.as_deref(), Some("Eastside XY"));
}

#[test]
fn season_and_circuit_filters() {
    let mut store = store();

    let summary = store.team_summary(&query().season(Some(2025))).unwrap();
    assert_eq!(result_ids(&summary), vec![1, 2]);
    assert_eq!(summary.rankings.len(), 1);
    assert_eq!(summary.rankings[0].otr, Decimal::new(31, 1));
    assert_eq!(summary.rankings[0].circuit_name.as_deref(), Some("National"));

    // the Texas circuit only runs Lincoln Douglas
    let summary = store.team_summary(&query().circuit(Some(2))).unwrap();
    assert!(summary.results.is_empty());
    assert!(summary.rankings.is_empty());

    let ld = TeamQuery::new("alpha", "LincolnDouglas")
        .unwrap()
        .circuit(Some(2));
    let summary = store.team_summary(&ld).unwrap();
    assert_eq!(result_ids(&summary), vec![3]);
}

#[test]
fn result_rounds_are_sequenced() {
    let mut store = store();
    let rounds = store.result_rounds(1).unwrap();

    let ids: Vec<i64> = rounds.iter().map(|round| round.id).collect();
    assert_eq!(ids, vec![101, 102, 103]);

    let octas = &rounds[2];
    assert_eq!(octas.records.len(), 3);
    assert_eq!(octas.records[0].judge_name.as_deref(), Some("Judge One"));
    assert_eq!(octas.records[2].judge_id, None);
    assert_eq!(octas.records[2].judge_name, None);

    assert!(store.result_rounds(999).unwrap().is_empty());
}

#[test]
fn unreadable_decisions_are_kept_but_not_counted() {
    let mut store = store();
    let rounds = store.result_rounds(4).unwrap();

    assert_eq!(rounds[0].records.len(), 2);
    assert_eq!(rounds[0].records[1].decision, None);
    assert_eq!(
        rounds[0].outcome(),
        crate::tournaments::rounds::RoundOutcome::Loss
    );
}

#[test]
fn opponents_are_resolved_before_the_tournament() {
    let mut store = store();
    let summary = store.team_summary(&query()).unwrap();
    let history = store.opponent_history(&summary).unwrap();

    let late = &summary.results[2].tournament;
    // beta went 1-1 at Early; its round against alpha at Late is not counted
    assert_eq!(
        history.win_pct_before("beta", late),
        Some(Decimal::new(5, 1))
    );
    let early = &summary.results[1].tournament;
    assert_eq!(history.win_pct_before("beta", early), None);
}

#[test]
fn statistics_end_to_end() {
    let mut store = store();
    let (summary, stats) = team_statistics(
        &mut store,
        &query().season(Some(2025)),
        &WeightTable::standard(),
    )
    .unwrap();

    assert_eq!(summary.results.len(), 2);
    assert_eq!(stats.p_record, WinLoss { wins: 2, losses: 1 });
    assert_eq!(stats.t_wp, Some(Decimal::new(75, 2)));
    assert_eq!(stats.break_pct, Some(Decimal::new(5, 1)));
    assert_eq!(stats.avg_speaks, Some(Decimal::new(285, 1)));
    assert_eq!(stats.avg_op_wpm, Some(Decimal::new(5, 1)));
    assert_eq!(stats.bids, 1);
    assert_eq!(stats.in_top_20_pct, 1);
    assert_eq!(stats.last_active.as_ref().unwrap().tournament_id, 11);
    assert!(stats.otr.is_some());
}
