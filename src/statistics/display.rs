//! Rounding and labelling of statistics for display. The aggregation keeps
//! full precision; this is the only place values are rounded.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::{
    statistics::{Statistics, metrics::WinLoss},
    teams::TeamSummary,
};

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub enum MetricValue {
    Integer(i64),
    Float(Decimal),
    /// Already scaled to `0..=100`.
    Percentage(Decimal),
    /// A number of occurrences, shown as `3x`.
    Times(u32),
    Record(WinLoss),
    Date(chrono::NaiveDate),
    NoData,
}

impl std::fmt::Display for MetricValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricValue::Integer(integer) => write!(f, "{integer}"),
            MetricValue::Float(decimal) => write!(f, "{decimal}"),
            MetricValue::Percentage(decimal) => write!(f, "{decimal}%"),
            MetricValue::Times(n) => write!(f, "{n}x"),
            MetricValue::Record(record) => write!(f, "{record}"),
            MetricValue::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            MetricValue::NoData => f.write_str("--"),
        }
    }
}

fn round(value: Decimal, dp: u32) -> Decimal {
    value
        .round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
        .normalize()
}

fn float(value: Option<Decimal>, dp: u32) -> MetricValue {
    value.map_or(MetricValue::NoData, |v| MetricValue::Float(round(v, dp)))
}

fn percentage(value: Option<Decimal>) -> MetricValue {
    value.map_or(MetricValue::NoData, |v| {
        MetricValue::Percentage(round(v * Decimal::ONE_HUNDRED, 1))
    })
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Stat {
    pub description: String,
    pub value: MetricValue,
}

impl Stat {
    fn new(description: impl Into<String>, value: MetricValue) -> Self {
        Stat {
            description: description.into(),
            value,
        }
    }
}

/// The statistics panel of a team profile: headline figures first, then the
/// advanced ones.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct StatisticsView {
    pub primary: Vec<Stat>,
    pub advanced: Vec<Stat>,
}

impl StatisticsView {
    pub fn new(summary: &TeamSummary, stats: &Statistics) -> Self {
        let primary = vec![
            Stat::new("OTR Score", float(stats.otr, 2)),
            Stat::new("Top 20% Prelim Seed", MetricValue::Times(stats.in_top_20_pct)),
            Stat::new(
                if stats.bids == 1 { "TOC Bid" } else { "TOC Bids" },
                MetricValue::Integer(i64::from(stats.bids)),
            ),
            Stat::new("Avg Raw Spks.", float(stats.avg_speaks, 1)),
        ];

        let advanced = vec![
            Stat::new(
                "Tournaments",
                MetricValue::Integer(summary.results.len() as i64),
            ),
            Stat::new("Rounds", MetricValue::Integer(summary.round_count)),
            Stat::new(
                "Last Active",
                stats
                    .last_active
                    .as_ref()
                    .map_or(MetricValue::NoData, |last| {
                        MetricValue::Date(last.date)
                    }),
            ),
            Stat::new("Avg. OpWpM", float(stats.avg_op_wpm, 1)),
            Stat::new("Prelim Rcd.", MetricValue::Record(stats.p_record)),
            Stat::new("Prelim Win Pct.", percentage(stats.p_wp)),
            Stat::new("Break Pct.", percentage(stats.break_pct)),
            Stat::new("True Win Pct.", percentage(stats.t_wp)),
        ];

        StatisticsView { primary, advanced }
    }

    pub fn rows(&self) -> impl Iterator<Item = &Stat> {
        self.primary.iter().chain(self.advanced.iter())
    }
}
