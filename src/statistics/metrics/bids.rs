use crate::{
    statistics::metrics::Metric,
    tournaments::{
        results::TeamResult,
        rounds::{Round, sequence::EliminationTier},
    },
};

/// Decides whether a result earned the team a bid. How a tournament awards
/// bids is a property of the tournament, so this is supplied from outside the
/// aggregation.
pub trait BidRule: Send + Sync {
    fn earned_bid(&self, result: &TeamResult) -> bool;
}

/// Bid rule driven by [`crate::tournaments::Tournament::bid_level`]: teams
/// which debated an elimination round at or past that tier earn a bid.
/// Tournaments without a bid level award none.
pub struct TournamentBidLevel;

impl BidRule for TournamentBidLevel {
    fn earned_bid(&self, result: &TeamResult) -> bool {
        let Some(label) = result.tournament.bid_level.as_deref() else {
            return false;
        };
        let Some(level) = EliminationTier::from_label(label) else {
            tracing::warn!(
                tournament = result.tournament.id,
                bid_level = label,
                "tournament has an unrecognised bid level"
            );
            return false;
        };

        result
            .own_rounds()
            .filter_map(Round::tier)
            .any(|tier| tier >= level)
    }
}

pub struct BidsComputer<'a>(pub &'a dyn BidRule);

impl Metric for BidsComputer<'_> {
    type Value = u32;

    fn compute(&self, results: &[TeamResult]) -> u32 {
        results
            .iter()
            .filter(|result| self.0.earned_bid(result))
            .count() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::fixtures::{elim, prelim, result, tournament};

    fn bid_tournament(id: i64, level: Option<&str>) -> crate::tournaments::Tournament {
        let mut t = tournament(id, "2025-01-10");
        t.bid_level = level.map(str::to_string);
        t
    }

    #[test]
    fn reaching_the_bid_level_earns_a_bid() {
        let results = vec![
            // reached quarters at an octas bid
            result(
                1,
                bid_tournament(1, Some("Octafinals")),
                vec![prelim(1, 1), elim(1, "Octafinals"), elim(1, "Quarters")],
            ),
            // lost in doubles at an octas bid
            result(
                2,
                bid_tournament(2, Some("Octafinals")),
                vec![prelim(2, 1), elim(2, "Double Octafinals")],
            ),
            // reached finals at a tournament without bids
            result(3, bid_tournament(3, None), vec![elim(3, "Finals")]),
            // bid level nobody can interpret
            result(4, bid_tournament(4, Some("TBD")), vec![elim(4, "Finals")]),
            // semis bid, but only an unknown elim label
            result(5, bid_tournament(5, Some("Semis")), vec![elim(5, "Runoff")]),
        ];

        assert_eq!(BidsComputer(&TournamentBidLevel).compute(&results), 1);
    }

    #[test]
    fn custom_rules_can_be_supplied() {
        struct EveryBreak;

        impl BidRule for EveryBreak {
            fn earned_bid(&self, result: &TeamResult) -> bool {
                result.broke()
            }
        }

        let results = vec![
            result(1, tournament(1, "2025-01-10"), vec![elim(1, "Finals")]),
            result(2, tournament(2, "2025-01-17"), vec![prelim(2, 1)]),
        ];
        assert_eq!(BidsComputer(&EveryBreak).compute(&results), 1);
    }
}
