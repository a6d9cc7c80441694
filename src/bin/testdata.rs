//! Seeds a database with a synthetic season of one circuit, for trying out
//! the `teamstats` binary.

use chrono::{Days, NaiveDate};
use clap::Parser;
use debateland::{
    StatsError, TeamSource, config::StatsConfig,
    schema::{
        aliases, circuits, competitors, judge_records, judges, rankings,
        result_speaking, results, round_speaking, rounds, schools, seasons,
        team_circuits, team_competitors, team_seasons, teams, tournament_circuits,
        tournaments,
    },
    statistics::RecordAggregator,
    teams::{Alias, TeamQuery},
    tournaments::{Event, rounds::sequence::EliminationTier},
};
use diesel::{dsl::max, prelude::*};
use rand::{
    Rng, SeedableRng,
    rngs::StdRng,
    seq::{IndexedRandom, SliceRandom},
};
use rust_decimal::prelude::ToPrimitive;
use uuid::Uuid;

#[derive(Parser)]
pub struct Generate {
    database_url: Option<String>,
    #[clap(long, default_value_t = 24)]
    teams: usize,
    #[clap(long, default_value_t = 6)]
    tournaments: usize,
    #[clap(long, default_value_t = 4)]
    prelims: i64,
    #[clap(long, default_value = "PublicForum")]
    event: String,
    #[clap(long, default_value_t = 2025)]
    season: i64,
    /// Generates the same data for the same seed.
    #[clap(long)]
    seed: Option<u64>,
}

const FIRST_NAMES: &[&str] = &[
    "Ada", "Bea", "Cal", "Dev", "Eli", "Fay", "Gus", "Hal", "Ivy", "Jo", "Kai",
    "Lea", "Max", "Nia", "Oz", "Pia", "Quin", "Ray", "Sol", "Tess",
];

const SCHOOLS: &[&str] = &[
    "Northfield", "Lakeside", "Ridgeview", "Harbor", "Summit", "Cedar Park",
    "Westwood", "Oakmont",
];

struct Team {
    id: String,
    alias_id: i64,
    school_id: i64,
    competitors: [String; 2],
    strength: f64,
}

/// A team's standing during one tournament.
struct Entry {
    team: usize,
    result_id: i64,
    wins: u32,
    points: [Vec<f64>; 2],
}

impl Entry {
    fn total_points(&self) -> f64 {
        self.points.iter().flatten().sum()
    }
}

/// Ids continue from whatever is already in the database.
struct Ids {
    alias: i64,
    school: i64,
    circuit: i64,
    tournament: i64,
    result: i64,
    round: i64,
    judge_record: i64,
    round_speaking: i64,
    result_speaking: i64,
    ranking: i64,
}

impl Ids {
    fn load(conn: &mut SqliteConnection) -> QueryResult<Self> {
        Ok(Ids {
            alias: aliases::table
                .select(max(aliases::id))
                .first::<Option<i64>>(conn)?
                .unwrap_or(0),
            school: schools::table
                .select(max(schools::id))
                .first::<Option<i64>>(conn)?
                .unwrap_or(0),
            circuit: circuits::table
                .select(max(circuits::id))
                .first::<Option<i64>>(conn)?
                .unwrap_or(0),
            tournament: tournaments::table
                .select(max(tournaments::id))
                .first::<Option<i64>>(conn)?
                .unwrap_or(0),
            result: results::table
                .select(max(results::id))
                .first::<Option<i64>>(conn)?
                .unwrap_or(0),
            round: rounds::table
                .select(max(rounds::id))
                .first::<Option<i64>>(conn)?
                .unwrap_or(0),
            judge_record: judge_records::table
                .select(max(judge_records::id))
                .first::<Option<i64>>(conn)?
                .unwrap_or(0),
            round_speaking: round_speaking::table
                .select(max(round_speaking::id))
                .first::<Option<i64>>(conn)?
                .unwrap_or(0),
            result_speaking: result_speaking::table
                .select(max(result_speaking::id))
                .first::<Option<i64>>(conn)?
                .unwrap_or(0),
            ranking: rankings::table
                .select(max(rankings::id))
                .first::<Option<i64>>(conn)?
                .unwrap_or(0),
        })
    }
}

fn bump(id: &mut i64) -> i64 {
    *id += 1;
    *id
}

fn speaks(rng: &mut StdRng, strength: f64) -> f64 {
    let raw = 27.5 + strength * 0.6 + rng.random_range(-1.0..1.0);
    (raw.clamp(25.0, 30.0) * 10.0).round() / 10.0
}

/// One round between `a` and `b`. Returns the decisions from `a`'s side.
fn judge(rng: &mut StdRng, a: &Team, b: &Team, panel: usize) -> Vec<bool> {
    let p = 1.0 / (1.0 + (b.strength - a.strength).exp());
    (0..panel).map(|_| rng.random_bool(p)).collect()
}

struct Simulation<'a> {
    conn: &'a mut SqliteConnection,
    rng: StdRng,
    ids: Ids,
    teams: Vec<Team>,
    judges: Vec<String>,
}

impl Simulation<'_> {
    #[allow(clippy::too_many_arguments)]
    fn insert_round(
        &mut self,
        entry: &mut Entry,
        opponent_id: &str,
        name: &str,
        kind: &str,
        number: Option<i64>,
        decisions: &[bool],
        judges: &[String],
    ) -> QueryResult<()> {
        let round_id = bump(&mut self.ids.round);
        diesel::insert_into(rounds::table)
            .values((
                rounds::id.eq(round_id),
                rounds::result_id.eq(entry.result_id),
                rounds::name_std.eq(name),
                rounds::kind.eq(kind),
                rounds::number.eq(number),
                rounds::opponent_id.eq(opponent_id),
            ))
            .execute(&mut *self.conn)?;

        for (decision, judge_id) in decisions.iter().zip(judges) {
            diesel::insert_into(judge_records::table)
                .values((
                    judge_records::id.eq(bump(&mut self.ids.judge_record)),
                    judge_records::round_id.eq(round_id),
                    judge_records::judge_id.eq(judge_id),
                    judge_records::decision.eq(if *decision { "W" } else { "L" }),
                ))
                .execute(&mut *self.conn)?;
        }

        let team = &self.teams[entry.team];
        for (i, competitor) in team.competitors.iter().enumerate() {
            let points = speaks(&mut self.rng, team.strength);
            entry.points[i].push(points);
            diesel::insert_into(round_speaking::table)
                .values((
                    round_speaking::id.eq(bump(&mut self.ids.round_speaking)),
                    round_speaking::round_id.eq(round_id),
                    round_speaking::competitor_id.eq(competitor),
                    round_speaking::points.eq(points),
                ))
                .execute(&mut *self.conn)?;
        }

        Ok(())
    }

    /// Both sides of one debate.
    fn debate(
        &mut self,
        entries: &mut [Entry],
        (a, b): (usize, usize),
        name: &str,
        kind: &str,
        number: Option<i64>,
        panel: usize,
    ) -> QueryResult<bool> {
        let decisions = judge(
            &mut self.rng,
            &self.teams[entries[a].team],
            &self.teams[entries[b].team],
            panel,
        );
        let panel: Vec<String> = self
            .judges
            .choose_multiple(&mut self.rng, panel)
            .cloned()
            .collect();
        let a_won = decisions.iter().filter(|d| **d).count() * 2 > decisions.len();
        let flipped: Vec<bool> = decisions.iter().map(|d| !d).collect();

        let id_a = self.teams[entries[a].team].id.clone();
        let id_b = self.teams[entries[b].team].id.clone();
        self.insert_round(
            &mut entries[a],
            &id_b,
            name,
            kind,
            number,
            &decisions,
            &panel,
        )?;
        self.insert_round(
            &mut entries[b],
            &id_a,
            name,
            kind,
            number,
            &flipped,
            &panel,
        )?;

        if a_won {
            entries[a].wins += 1;
        } else {
            entries[b].wins += 1;
        }

        Ok(a_won)
    }

    fn tournament(
        &mut self,
        index: usize,
        event: Event,
        season: i64,
        circuit_id: i64,
        date: NaiveDate,
        prelims: i64,
    ) -> QueryResult<()> {
        let tournament_id = bump(&mut self.ids.tournament);
        let break_size = if self.teams.len() >= 16 { 8 } else { 4 };
        // every other tournament awards bids to its semifinalists
        let bid_level = (index % 2 == 0).then_some("Semifinals");

        diesel::insert_into(tournaments::table)
            .values((
                tournaments::id.eq(tournament_id),
                tournaments::name.eq(format!("Synthetic Invitational {}", index + 1)),
                tournaments::event.eq(event.as_str()),
                tournaments::season_id.eq(season),
                tournaments::start_date.eq(date),
                tournaments::entries.eq(self.teams.len() as i64),
                tournaments::bid_level.eq(bid_level),
            ))
            .execute(&mut *self.conn)?;
        diesel::insert_into(tournament_circuits::table)
            .values((
                tournament_circuits::tournament_id.eq(tournament_id),
                tournament_circuits::circuit_id.eq(circuit_id),
            ))
            .execute(&mut *self.conn)?;

        let mut entries = Vec::with_capacity(self.teams.len());
        for (i, team) in self.teams.iter().enumerate() {
            let result_id = bump(&mut self.ids.result);
            diesel::insert_into(results::table)
                .values((
                    results::id.eq(result_id),
                    results::team_id.eq(&team.id),
                    results::tournament_id.eq(tournament_id),
                    results::alias_id.eq(team.alias_id),
                    results::school_id.eq(team.school_id),
                ))
                .execute(&mut *self.conn)?;
            entries.push(Entry {
                team: i,
                result_id,
                wins: 0,
                points: [Vec::new(), Vec::new()],
            });
        }

        for number in 1..=prelims {
            let mut order: Vec<usize> = (0..entries.len()).collect();
            order.shuffle(&mut self.rng);
            for pair in order.chunks_exact(2) {
                self.debate(
                    &mut entries,
                    (pair[0], pair[1]),
                    &format!("Round {number}"),
                    "P",
                    Some(number),
                    1,
                )?;
            }
        }

        let mut seeds: Vec<usize> = (0..entries.len()).collect();
        seeds.sort_by(|a, b| {
            entries[*b].wins.cmp(&entries[*a].wins).then(
                entries[*b].total_points().total_cmp(&entries[*a].total_points()),
            )
        });

        for (pos, index) in seeds.iter().enumerate() {
            let entry = &entries[*index];
            diesel::update(results::table.find(entry.result_id))
                .set(results::prelim_pos.eq(pos as i64 + 1))
                .execute(&mut *self.conn)?;
            for (competitor, points) in
                self.teams[entry.team].competitors.iter().zip(&entry.points)
            {
                if points.is_empty() {
                    continue;
                }
                diesel::insert_into(result_speaking::table)
                    .values((
                        result_speaking::id.eq(bump(&mut self.ids.result_speaking)),
                        result_speaking::result_id.eq(entry.result_id),
                        result_speaking::competitor_id.eq(competitor),
                        result_speaking::raw_avg
                            .eq(points.iter().sum::<f64>() / points.len() as f64),
                    ))
                    .execute(&mut *self.conn)?;
            }
        }

        let mut bracket: Vec<usize> = seeds.into_iter().take(break_size).collect();
        while bracket.len() >= 2 {
            let label = EliminationTier::with_teams_remaining(bracket.len() as u32)
                .map_or_else(|| "Elimination".to_string(), |tier| tier.to_string());
            let n = bracket.len();
            let mut advancing = Vec::with_capacity(n / 2);
            for i in 0..n / 2 {
                let (high, low) = (bracket[i], bracket[n - 1 - i]);
                let high_won =
                    self.debate(&mut entries, (high, low), &label, "E", None, 3)?;
                advancing.push(if high_won { high } else { low });
            }
            bracket = advancing;
        }

        Ok(())
    }
}

fn main() -> Result<(), StatsError> {
    let args = Generate::parse();

    let mut config = StatsConfig::load()?;
    if let Some(url) = args.database_url {
        config.database_url = url;
    }
    config.init_logging();
    let event: Event = args.event.parse()?;

    let mut store = config.connect()?;
    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let (circuit_id, team_ids) =
        store.conn().transaction::<_, StatsError, _>(|conn| {
            let mut ids = Ids::load(conn)?;
            let mut rng = rng;

            let circuit_id = bump(&mut ids.circuit);
            diesel::insert_into(circuits::table)
                .values((
                    circuits::id.eq(circuit_id),
                    circuits::name.eq(format!("Synthetic Circuit {circuit_id}")),
                    circuits::event.eq(event.as_str()),
                ))
                .execute(conn)?;
            diesel::insert_or_ignore_into(seasons::table)
                .values(seasons::id.eq(args.season))
                .execute(conn)?;

            let mut school_ids = Vec::new();
            for name in SCHOOLS {
                let id = bump(&mut ids.school);
                diesel::insert_into(schools::table)
                    .values((schools::id.eq(id), schools::name.eq(*name)))
                    .execute(conn)?;
                school_ids.push((id, *name));
            }

            let judges: Vec<String> = (0..12)
                .map(|i| {
                    let id = Uuid::now_v7().to_string();
                    diesel::insert_into(judges::table)
                        .values((
                            judges::id.eq(&id),
                            judges::name.eq(format!("Judge {}", i + 1)),
                        ))
                        .execute(conn)
                        .map(|_| id)
                })
                .collect::<QueryResult<_>>()?;

            let mut teams = Vec::with_capacity(args.teams);
            for i in 0..args.teams {
                let team_id = Uuid::now_v7().to_string();
                let (school_id, school) = school_ids[i % school_ids.len()];
                let names = [
                    FIRST_NAMES[rng.random_range(0..FIRST_NAMES.len())],
                    FIRST_NAMES[rng.random_range(0..FIRST_NAMES.len())],
                ];

                diesel::insert_into(teams::table)
                    .values(teams::id.eq(&team_id))
                    .execute(conn)?;
                let competitors = names.map(|name| {
                    (Uuid::new_v4().to_string(), format!("{name} {school}"))
                });
                for (competitor_id, name) in &competitors {
                    diesel::insert_into(competitors::table)
                        .values((
                            competitors::id.eq(competitor_id),
                            competitors::name.eq(name),
                        ))
                        .execute(conn)?;
                    diesel::insert_into(team_competitors::table)
                        .values((
                            team_competitors::team_id.eq(&team_id),
                            team_competitors::competitor_id.eq(competitor_id),
                        ))
                        .execute(conn)?;
                }

                let initials: String =
                    names.iter().filter_map(|name| name.chars().next()).collect();
                let alias =
                    Alias::new(bump(&mut ids.alias), &format!("{school} {initials}"))?;
                diesel::insert_into(aliases::table)
                    .values((
                        aliases::id.eq(alias.id),
                        aliases::team_id.eq(&team_id),
                        aliases::code.eq(&alias.code),
                    ))
                    .execute(conn)?;
                diesel::insert_into(team_circuits::table)
                    .values((
                        team_circuits::team_id.eq(&team_id),
                        team_circuits::circuit_id.eq(circuit_id),
                    ))
                    .execute(conn)?;
                diesel::insert_into(team_seasons::table)
                    .values((
                        team_seasons::team_id.eq(&team_id),
                        team_seasons::season_id.eq(args.season),
                    ))
                    .execute(conn)?;

                teams.push(Team {
                    id: team_id,
                    alias_id: alias.id,
                    school_id,
                    competitors: competitors.map(|(id, _)| id),
                    strength: rng.random_range(-1.5..1.5),
                });
            }

            let team_ids: Vec<String> = teams.iter().map(|t| t.id.clone()).collect();
            let mut simulation = Simulation {
                conn,
                rng,
                ids,
                teams,
                judges,
            };

            let first = NaiveDate::from_ymd_opt(args.season as i32 - 1, 9, 6)
                .unwrap_or_default();
            for index in 0..args.tournaments {
                let date = first
                    .checked_add_days(Days::new(14 * index as u64))
                    .unwrap_or(first);
                simulation.tournament(
                    index,
                    event,
                    args.season,
                    circuit_id,
                    date,
                    args.prelims,
                )?;
            }

            Ok((circuit_id, team_ids))
        })?;

    let policy = config.otr_policy()?;
    let mut ranking_id = Ids::load(store.conn())?.ranking;
    for team_id in &team_ids {
        let query = TeamQuery::new(team_id, event.as_str())?
            .season(Some(args.season))
            .circuit(Some(circuit_id));
        let summary = store.team_summary(&query)?;
        let opponents = store.opponent_history(&summary)?;
        let stats = RecordAggregator::new(policy)
            .opponents(&opponents)
            .compute(&summary.results);

        if let Some(otr) = stats.otr.and_then(|otr| otr.to_f64()) {
            diesel::insert_into(rankings::table)
                .values((
                    rankings::id.eq(bump(&mut ranking_id)),
                    rankings::team_id.eq(team_id),
                    rankings::season_id.eq(args.season),
                    rankings::circuit_id.eq(circuit_id),
                    rankings::otr.eq(otr),
                ))
                .execute(store.conn())?;
        }
    }

    tracing::info!(
        circuit = circuit_id,
        teams = team_ids.len(),
        tournaments = args.tournaments,
        "generated synthetic circuit"
    );

    Ok(())
}
