use std::io::Write;

use clap::{Parser, Subcommand};
use debateland::{
    StatsError, TeamSource, config::StatsConfig,
    statistics::display::StatisticsView, team_statistics, teams::TeamQuery,
    tournaments::rounds::{Round, RoundOutcome},
};
use itertools::Itertools;
use serde::Serialize;

#[derive(Parser)]
#[command(about = "Compute the statistics of a debate team")]
struct Cli {
    /// Takes precedence over `DATABASE_URL` and the configuration file.
    #[arg(long)]
    database_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print a team's statistics panel.
    Summary {
        team: String,
        #[arg(long, default_value = "PublicForum")]
        event: String,
        #[arg(long)]
        season: Option<i64>,
        #[arg(long)]
        circuit: Option<i64>,
        #[arg(long, action)]
        json: bool,
    },
    /// List the rounds of one result in order.
    Rounds {
        result: i64,
        #[arg(long, action)]
        csv: bool,
        #[arg(long, action, conflicts_with = "csv")]
        json: bool,
    },
}

#[derive(Serialize)]
struct RoundLine<'a> {
    id: i64,
    name: &'a str,
    kind: &'static str,
    opponent: Option<&'a str>,
    decisions: String,
    outcome: &'static str,
    speaks: String,
}

impl<'a> From<&'a Round> for RoundLine<'a> {
    fn from(round: &'a Round) -> Self {
        RoundLine {
            id: round.id,
            name: &round.name_std,
            kind: round.kind.code(),
            opponent: round.opponent.as_ref().map(|opponent| {
                opponent.alias.as_deref().unwrap_or(&opponent.team_id)
            }),
            decisions: round
                .records
                .iter()
                .map(|record| record.decision.map_or("?", |d| d.code()))
                .join(""),
            outcome: match round.outcome() {
                RoundOutcome::Win => "W",
                RoundOutcome::Loss => "L",
                RoundOutcome::Undecided => "-",
            },
            speaks: round
                .speaking
                .iter()
                .map(|entry| entry.points.to_string())
                .join(" "),
        }
    }
}

fn main() -> Result<(), StatsError> {
    let args = Cli::parse();

    let mut config = StatsConfig::load()?;
    if let Some(url) = args.database_url {
        config.database_url = url;
    }
    config.init_logging();

    let mut store = config.connect()?;
    let mut out = std::io::stdout().lock();

    match args.command {
        Command::Summary {
            team,
            event,
            season,
            circuit,
            json,
        } => {
            let query = TeamQuery::new(&team, &event)?
                .season(season)
                .circuit(circuit);
            let (summary, stats) =
                team_statistics(&mut store, &query, config.otr_policy()?)?;
            let view = StatisticsView::new(&summary, &stats);

            if json {
                serde_json::to_writer_pretty(
                    &mut out,
                    &serde_json::json!({
                        "team": summary.id,
                        "name": summary.display_name(),
                        "code": summary.code(),
                        "statistics": stats,
                        "view": view,
                    }),
                )?;
                writeln!(out)?;
            } else {
                writeln!(out, "{} ({})", summary.display_name(), summary.code())?;
                if let Some(span) = summary.season_span() {
                    writeln!(out, "seasons {span}")?;
                }
                for stat in view.rows() {
                    writeln!(out, "{:<22}{}", stat.description, stat.value)?;
                }
            }
        }
        Command::Rounds { result, csv, json } => {
            let rounds = store.result_rounds(result)?;
            let lines: Vec<RoundLine> = rounds.iter().map(RoundLine::from).collect();

            if csv {
                let mut writer = csv::Writer::from_writer(&mut out);
                for line in &lines {
                    writer.serialize(line)?;
                }
                writer.flush()?;
            } else if json {
                serde_json::to_writer_pretty(&mut out, &lines)?;
                writeln!(out)?;
            } else {
                for line in &lines {
                    writeln!(
                        out,
                        "{:<16}{:<3}{:<20}{:<6}{}",
                        line.name,
                        line.outcome,
                        line.opponent.unwrap_or(""),
                        line.decisions,
                        line.speaks
                    )?;
                }
            }
        }
    }

    Ok(())
}
