use crate::{statistics::metrics::Metric, tournaments::results::TeamResult};

/// Number of tournaments at which the team finished prelims seeded within the
/// top `percent` of the field.
pub struct TopSeedComputer {
    pub percent: u32,
}

impl TopSeedComputer {
    pub const TOP_20_PCT: TopSeedComputer = TopSeedComputer { percent: 20 };

    fn within(&self, result: &TeamResult) -> Option<bool> {
        let seed = result.prelim_pos.filter(|seed| *seed > 0)?;
        let entries = result.tournament.entries.filter(|entries| *entries > 0)?;
        // out of range values are never within the cutoff
        let seed = seed.checked_mul(100)?;
        let cutoff = entries.checked_mul(i64::from(self.percent))?;
        Some(seed <= cutoff)
    }
}

impl Metric for TopSeedComputer {
    type Value = u32;

    fn compute(&self, results: &[TeamResult]) -> u32 {
        results
            .iter()
            .filter(|result| self.within(result).unwrap_or(false))
            .count() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::fixtures::{result, tournament};

    #[test]
    fn counts_top_seeds() {
        let mut field_of_40 = tournament(1, "2024-09-01");
        field_of_40.entries = Some(40);

        let seeded = |id, pos| {
            let mut r = result(id, field_of_40.clone(), vec![]);
            r.prelim_pos = pos;
            r
        };

        let results = vec![
            seeded(1, Some(1)),
            // 8 / 40 is exactly 20%
            seeded(2, Some(8)),
            seeded(3, Some(9)),
            seeded(4, None),
        ];

        assert_eq!(TopSeedComputer::TOP_20_PCT.compute(&results), 2);
    }

    #[test]
    fn huge_values_do_not_overflow() {
        let mut huge_field = tournament(1, "2024-09-01");
        huge_field.entries = Some(i64::MAX);

        let mut r = result(1, huge_field, vec![]);
        r.prelim_pos = Some(i64::MAX / 2);

        assert_eq!(TopSeedComputer::TOP_20_PCT.compute(&[r]), 0);
    }

    #[test]
    fn unknown_field_size_is_skipped() {
        let mut r = result(1, tournament(1, "2024-09-01"), vec![]);
        r.prelim_pos = Some(1);
        assert_eq!(TopSeedComputer::TOP_20_PCT.compute(&[r]), 0);
    }
}
