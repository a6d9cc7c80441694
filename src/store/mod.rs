//! Read access to team histories.
//!
//! [`TeamSource`] is the contract the statistics are computed against;
//! [`SqliteStore`] implements it over the schema in `migrations/`. The store
//! only reads. Rows which cannot be interpreted (unknown event or round kind,
//! non-finite speaks) are skipped with a warning rather than failing the
//! whole request.

use std::collections::{HashMap, HashSet};

use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};
use diesel_migrations::MigrationHarness;
use indexmap::IndexMap;
use rust_decimal::{Decimal, prelude::FromPrimitive};

use crate::{
    MIGRATIONS,
    error::StatsError,
    schema::{
        aliases, circuits, competitors, judge_records, judges, rankings,
        result_speaking, results, round_speaking, rounds, schools, team_circuits,
        team_competitors, team_seasons, teams, tournament_circuits, tournaments,
    },
    statistics::{RecordAggregator, Statistics, otr::OtrPolicy},
    store::opponents::OpponentHistory,
    teams::{Alias, Competitor, Ranking, TeamQuery, TeamSummary},
    tournaments::{
        Circuit, Event, Season, Tournament,
        results::{ResultSpeaking, School, TeamResult},
        rounds::{
            Decision, JudgeRecord, OpponentRef, Round, RoundKind, RoundSpeaking,
            sequence::sort_rounds,
        },
    },
};

pub mod opponents;

/// The data the statistics are computed from.
pub trait TeamSource {
    /// A team's history in one event, optionally narrowed to a season and/or
    /// a circuit. Fails with [`StatsError::NotFound`] for unknown teams.
    fn team_summary(&mut self, query: &TeamQuery) -> Result<TeamSummary, StatsError>;

    /// The rounds of one result, in canonical order.
    fn result_rounds(&mut self, result_id: i64) -> Result<Vec<Round>, StatsError>;

    /// Records of every opponent the team faced in `summary`.
    fn opponent_history(
        &mut self,
        summary: &TeamSummary,
    ) -> Result<OpponentHistory, StatsError>;
}

/// Fetches a team summary and computes its statistics.
pub fn team_statistics(
    source: &mut impl TeamSource,
    query: &TeamQuery,
    policy: &dyn OtrPolicy,
) -> Result<(TeamSummary, Statistics), StatsError> {
    let summary = source.team_summary(query)?;
    let opponents = source.opponent_history(&summary)?;
    let statistics = RecordAggregator::new(policy)
        .opponents(&opponents)
        .compute(&summary.results);
    Ok((summary, statistics))
}

pub struct SqliteStore {
    conn: SqliteConnection,
}

impl SqliteStore {
    pub fn new(conn: SqliteConnection) -> Self {
        SqliteStore { conn }
    }

    /// Connects to `database_url` and brings the schema up to date.
    pub fn connect(database_url: &str) -> Result<Self, StatsError> {
        let mut conn = SqliteConnection::establish(database_url)?;
        conn.run_pending_migrations(MIGRATIONS)
            .map_err(|e| StatsError::Migration(e.to_string()))?;
        Ok(SqliteStore { conn })
    }

    pub fn conn(&mut self) -> &mut SqliteConnection {
        &mut self.conn
    }
}

impl TeamSource for SqliteStore {
    #[tracing::instrument(skip(self))]
    fn team_summary(&mut self, query: &TeamQuery) -> Result<TeamSummary, StatsError> {
        fetch_team_summary(query, &mut self.conn)
    }

    #[tracing::instrument(skip(self))]
    fn result_rounds(&mut self, result_id: i64) -> Result<Vec<Round>, StatsError> {
        let mut by_result = load_rounds(&[result_id], &mut self.conn)?;
        let rounds = by_result.swap_remove(&result_id).unwrap_or_default();
        sort_rounds(&rounds)
    }

    #[tracing::instrument(skip_all, fields(team = %summary.id))]
    fn opponent_history(
        &mut self,
        summary: &TeamSummary,
    ) -> Result<OpponentHistory, StatsError> {
        let Some(event) = summary.results.first().map(|r| r.tournament.event)
        else {
            return Ok(OpponentHistory::default());
        };

        let opponents: Vec<String> = summary
            .results
            .iter()
            .flat_map(|result| result.rounds.iter())
            .filter_map(|round| round.opponent.as_ref())
            .map(|opponent| opponent.team_id.clone())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        Ok(OpponentHistory::fetch(&opponents, event, &mut self.conn)?)
    }
}

#[derive(Queryable, Clone, Debug)]
pub(crate) struct TournamentRow {
    pub id: i64,
    pub name: String,
    pub event: String,
    pub season_id: i64,
    pub start_date: chrono::NaiveDate,
    pub entries: Option<i64>,
    pub bid_level: Option<String>,
}

#[derive(Queryable, Clone, Debug)]
pub(crate) struct ResultRow {
    pub id: i64,
    pub team_id: String,
    pub tournament_id: i64,
    pub alias_id: i64,
    pub school_id: Option<i64>,
    pub prelim_pos: Option<i64>,
}

#[derive(Queryable, Clone, Debug)]
struct RoundRow {
    id: i64,
    result_id: i64,
    name_std: String,
    kind: String,
    number: Option<i64>,
    opponent_id: Option<String>,
}

#[derive(Queryable, Clone, Debug)]
struct AliasRow {
    id: i64,
    team_id: String,
    code: String,
}

fn parse_event(event: &str) -> Option<Event> {
    match event.parse() {
        Ok(event) => Some(event),
        Err(_) => {
            tracing::warn!(event, "skipping row with an unknown event");
            None
        }
    }
}

fn decimal(value: f64) -> Option<Decimal> {
    let ret = Decimal::from_f64(value);
    if ret.is_none() {
        tracing::warn!(value, "skipping value which is not a finite number");
    }
    ret
}

fn fetch_team_summary(
    query: &TeamQuery,
    conn: &mut impl LoadConnection<Backend = Sqlite>,
) -> Result<TeamSummary, StatsError> {
    let team_id = teams::table
        .filter(teams::id.eq(&query.id))
        .select(teams::id)
        .first::<String>(conn)
        .optional()?
        .ok_or(StatsError::NotFound)?;

    let competitors = team_competitors::table
        .inner_join(competitors::table)
        .filter(team_competitors::team_id.eq(&team_id))
        .order_by(competitors::id.asc())
        .select((competitors::id, competitors::name))
        .load::<(String, String)>(conn)?
        .into_iter()
        .map(|(id, name)| Competitor { id, name })
        .collect();

    let results = {
        let rows = results::table
            .filter(results::team_id.eq(&team_id))
            .load::<ResultRow>(conn)?;
        let tournament_ids: Vec<i64> =
            rows.iter().map(|row| row.tournament_id).collect();
        let tournaments = load_tournaments(&tournament_ids, conn)?;

        let rows = rows
            .into_iter()
            .filter(|row| {
                tournaments.get(&row.tournament_id).is_some_and(|t| {
                    t.event == query.event
                        && query.season.is_none_or(|season| t.season_id == season)
                        && query
                            .circuit
                            .is_none_or(|c| t.circuits.iter().any(|tc| tc.id == c))
                })
            })
            .collect::<Vec<_>>();

        assemble_results(rows, &tournaments, conn)?
    };

    let alias = aliases::table
        .filter(aliases::team_id.eq(&team_id))
        .order_by(aliases::id.desc())
        .first::<AliasRow>(conn)
        .optional()?
        .map(|row| Alias {
            id: row.id,
            code: row.code,
        });

    let rankings = rankings::table
        .left_join(circuits::table)
        .filter(rankings::team_id.eq(&team_id))
        .order_by(rankings::season_id.asc())
        .select((
            rankings::season_id,
            rankings::circuit_id,
            circuits::name.nullable(),
            circuits::event.nullable(),
            rankings::otr,
        ))
        .load::<(i64, i64, Option<String>, Option<String>, f64)>(conn)?
        .into_iter()
        .filter(|(season_id, circuit_id, _, event, _)| {
            query.season.is_none_or(|season| *season_id == season)
                && query.circuit.is_none_or(|circuit| {
                    *circuit_id == circuit
                        && event.as_deref() == Some(query.event.as_str())
                })
        })
        .filter_map(|(season_id, circuit_id, circuit_name, _, otr)| {
            Some(Ranking {
                season_id,
                circuit_id,
                circuit_name,
                otr: decimal(otr)?,
            })
        })
        .collect();

    let circuits = {
        let ids = team_circuits::table
            .filter(team_circuits::team_id.eq(&team_id))
            .select(team_circuits::circuit_id)
            .load::<i64>(conn)?;
        circuits::table
            .filter(circuits::id.eq_any(&ids))
            .order_by(circuits::id.asc())
            .load::<(i64, String, String)>(conn)?
            .into_iter()
            .filter_map(|(id, name, event)| {
                Some(Circuit {
                    id,
                    name,
                    event: parse_event(&event)?,
                })
            })
            .collect()
    };

    let seasons = team_seasons::table
        .filter(team_seasons::team_id.eq(&team_id))
        .order_by(team_seasons::season_id.asc())
        .select(team_seasons::season_id)
        .load::<i64>(conn)?
        .into_iter()
        .map(|id| Season { id })
        .collect();

    let round_count = rounds::table
        .inner_join(results::table)
        .filter(results::team_id.eq(&team_id))
        .count()
        .get_result::<i64>(conn)?;

    tracing::trace!(
        team = %team_id,
        results = results.len(),
        round_count,
        "fetched team summary"
    );

    Ok(TeamSummary {
        id: team_id,
        competitors,
        results,
        alias,
        rankings,
        circuits,
        seasons,
        round_count,
    })
}

/// Loads tournaments (with their circuits) by id. Tournaments with an event
/// we don't know are left out.
pub(crate) fn load_tournaments(
    ids: &[i64],
    conn: &mut impl LoadConnection<Backend = Sqlite>,
) -> QueryResult<HashMap<i64, Tournament>> {
    let mut circuits_of: HashMap<i64, Vec<Circuit>> = HashMap::new();
    for (tournament_id, id, name, event) in tournament_circuits::table
        .inner_join(circuits::table)
        .filter(tournament_circuits::tournament_id.eq_any(ids))
        .order_by(circuits::id.asc())
        .select((
            tournament_circuits::tournament_id,
            circuits::id,
            circuits::name,
            circuits::event,
        ))
        .load::<(i64, i64, String, String)>(conn)?
    {
        if let Some(event) = parse_event(&event) {
            circuits_of
                .entry(tournament_id)
                .or_default()
                .push(Circuit { id, name, event });
        }
    }

    Ok(tournaments::table
        .filter(tournaments::id.eq_any(ids))
        .load::<TournamentRow>(conn)?
        .into_iter()
        .filter_map(|row| {
            let event = parse_event(&row.event)?;
            Some((
                row.id,
                Tournament {
                    id: row.id,
                    name: row.name,
                    event,
                    season_id: row.season_id,
                    start_date: row.start_date,
                    circuits: circuits_of.remove(&row.id).unwrap_or_default(),
                    entries: row.entries,
                    bid_level: row.bid_level,
                },
            ))
        })
        .collect())
}

/// Joins result rows with their tournament, alias, school, speaks and
/// rounds. The returned results are ordered oldest tournament first.
fn assemble_results(
    rows: Vec<ResultRow>,
    tournaments: &HashMap<i64, Tournament>,
    conn: &mut impl LoadConnection<Backend = Sqlite>,
) -> Result<Vec<TeamResult>, StatsError> {
    let result_ids: Vec<i64> = rows.iter().map(|row| row.id).collect();

    let alias_ids: Vec<i64> = rows.iter().map(|row| row.alias_id).collect();
    let aliases: HashMap<i64, Alias> = aliases::table
        .filter(aliases::id.eq_any(&alias_ids))
        .load::<AliasRow>(conn)?
        .into_iter()
        .map(|row| {
            (
                row.id,
                Alias {
                    id: row.id,
                    code: row.code,
                },
            )
        })
        .collect();

    let school_ids: Vec<i64> = rows.iter().filter_map(|row| row.school_id).collect();
    let schools: HashMap<i64, School> = schools::table
        .filter(schools::id.eq_any(&school_ids))
        .load::<(i64, String)>(conn)?
        .into_iter()
        .map(|(id, name)| (id, School { id, name }))
        .collect();

    let mut speaking: HashMap<i64, Vec<ResultSpeaking>> = HashMap::new();
    for (result_id, competitor_id, competitor_name, raw_avg) in
        result_speaking::table
            .left_join(competitors::table)
            .filter(result_speaking::result_id.eq_any(&result_ids))
            .order_by(result_speaking::id.asc())
            .select((
                result_speaking::result_id,
                result_speaking::competitor_id,
                competitors::name.nullable(),
                result_speaking::raw_avg,
            ))
            .load::<(i64, String, Option<String>, f64)>(conn)?
    {
        if let Some(raw_avg) = decimal(raw_avg) {
            speaking.entry(result_id).or_default().push(ResultSpeaking {
                competitor_id,
                competitor_name,
                raw_avg,
            });
        }
    }

    let mut rounds = load_rounds(&result_ids, conn)?;

    let mut results = rows
        .into_iter()
        .filter_map(|row| {
            let tournament = tournaments.get(&row.tournament_id)?.clone();
            let rounds = rounds.swap_remove(&row.id).unwrap_or_default();
            Some((row, tournament, rounds))
        })
        .map(|(row, tournament, rounds)| {
            Ok(TeamResult {
                id: row.id,
                tournament,
                alias: aliases.get(&row.alias_id).cloned(),
                school: row.school_id.and_then(|id| schools.get(&id).cloned()),
                prelim_pos: row.prelim_pos,
                speaking: speaking.remove(&row.id).unwrap_or_default(),
                rounds: sort_rounds(&rounds)?,
            })
        })
        .collect::<Result<Vec<_>, StatsError>>()?;

    results.sort_by_key(|result| result.tournament.chronological_key());

    Ok(results)
}

/// Loads the rounds of the given results, grouped by result id. Within a
/// result, rounds are in insertion order.
pub(crate) fn load_rounds(
    result_ids: &[i64],
    conn: &mut impl LoadConnection<Backend = Sqlite>,
) -> QueryResult<IndexMap<i64, Vec<Round>>> {
    let rows = rounds::table
        .filter(rounds::result_id.eq_any(result_ids))
        .order_by(rounds::id.asc())
        .load::<RoundRow>(conn)?;

    let round_ids: Vec<i64> = rows.iter().map(|row| row.id).collect();

    let mut records: HashMap<i64, Vec<JudgeRecord>> = HashMap::new();
    for (round_id, judge_id, judge_name, decision) in judge_records::table
        .left_join(judges::table.on(judges::id.nullable().eq(judge_records::judge_id)))
        .filter(judge_records::round_id.eq_any(&round_ids))
        .order_by(judge_records::id.asc())
        .select((
            judge_records::round_id,
            judge_records::judge_id,
            judges::name.nullable(),
            judge_records::decision,
        ))
        .load::<(i64, Option<String>, Option<String>, String)>(conn)?
    {
        let parsed = Decision::from_code(&decision);
        if parsed.is_none() {
            tracing::warn!(round_id, decision, "unreadable judge decision");
        }
        records.entry(round_id).or_default().push(JudgeRecord {
            judge_id,
            judge_name,
            decision: parsed,
        });
    }

    let mut speaking: HashMap<i64, Vec<RoundSpeaking>> = HashMap::new();
    for (round_id, competitor_id, competitor_name, points) in round_speaking::table
        .left_join(competitors::table)
        .filter(round_speaking::round_id.eq_any(&round_ids))
        .order_by(round_speaking::id.asc())
        .select((
            round_speaking::round_id,
            round_speaking::competitor_id,
            competitors::name.nullable(),
            round_speaking::points,
        ))
        .load::<(i64, String, Option<String>, f64)>(conn)?
    {
        if let Some(points) = decimal(points) {
            speaking.entry(round_id).or_default().push(RoundSpeaking {
                competitor_id,
                competitor_name,
                points,
            });
        }
    }

    let opponent_ids: Vec<&String> =
        rows.iter().filter_map(|row| row.opponent_id.as_ref()).collect();
    // the most recent alias of each opponent wins
    let opponent_codes: HashMap<String, String> = aliases::table
        .filter(aliases::team_id.eq_any(opponent_ids))
        .order_by(aliases::id.asc())
        .load::<AliasRow>(conn)?
        .into_iter()
        .map(|row| (row.team_id, row.code))
        .collect();

    let mut by_result: IndexMap<i64, Vec<Round>> = IndexMap::new();
    for row in rows {
        let Some(kind) = RoundKind::from_code(&row.kind) else {
            tracing::warn!(round = row.id, kind = row.kind, "unknown round kind");
            continue;
        };

        by_result.entry(row.result_id).or_default().push(Round {
            id: row.id,
            result_id: row.result_id,
            name_std: row.name_std,
            kind,
            number: row.number,
            opponent: row.opponent_id.map(|team_id| OpponentRef {
                alias: opponent_codes.get(&team_id).cloned(),
                team_id,
            }),
            records: records.remove(&row.id).unwrap_or_default(),
            speaking: speaking.remove(&row.id).unwrap_or_default(),
        });
    }

    Ok(by_result)
}

#[cfg(test)]
mod tests;
