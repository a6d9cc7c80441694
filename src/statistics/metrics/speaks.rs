use rust_decimal::Decimal;

use crate::{
    statistics::metrics::{Metric, mean},
    tournaments::results::TeamResult,
};

/// Mean raw speaker points.
///
/// Every round-level speaking entry of every competitor on the team is
/// pooled, so a round in which only one partner received points weighs half
/// as much as one in which both did. The value is never rounded here.
pub struct AvgSpeaksComputer;

impl Metric for AvgSpeaksComputer {
    type Value = Option<Decimal>;

    fn compute(&self, results: &[TeamResult]) -> Option<Decimal> {
        mean(
            results
                .iter()
                .flat_map(|result| result.own_rounds())
                .flat_map(|round| round.speaking.iter())
                .map(|entry| entry.points),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::fixtures::{prelim, result, tournament, with_speaks};

    #[test]
    fn pools_every_entry() {
        let results = vec![
            result(
                1,
                tournament(1, "2024-09-01"),
                vec![
                    with_speaks(prelim(1, 1), &[("a", 285), ("b", 290)]),
                    // missing speaks for one partner
                    with_speaks(prelim(1, 2), &[("a", 271)]),
                    // and for both
                    prelim(1, 3),
                ],
            ),
            result(
                2,
                tournament(2, "2024-10-01"),
                vec![with_speaks(prelim(2, 1), &[("a", 293), ("b", 288)])],
            ),
        ];

        // (28.5 + 29.0 + 27.1 + 29.3 + 28.8) / 5 = 28.54
        assert_eq!(
            AvgSpeaksComputer.compute(&results),
            Some(Decimal::new(2854, 2))
        );
    }

    #[test]
    fn mean_is_not_rounded() {
        let results = vec![result(
            1,
            tournament(1, "2024-09-01"),
            vec![with_speaks(prelim(1, 1), &[("a", 285), ("b", 290), ("a", 290)])],
        )];

        let avg = AvgSpeaksComputer.compute(&results).unwrap();
        assert_eq!(avg, Decimal::new(865, 1) / Decimal::from(3));
        assert_ne!(avg, avg.round_dp(1));
    }

    #[test]
    fn no_entries_no_average() {
        let results =
            vec![result(1, tournament(1, "2024-09-01"), vec![prelim(1, 1)])];
        assert_eq!(AvgSpeaksComputer.compute(&results), None);
        assert_eq!(AvgSpeaksComputer.compute(&[]), None);
    }
}
