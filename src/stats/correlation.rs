use courtside_api::StatSummary;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Pearson product-moment correlation of two equal-length series.
///
/// Returns 0.0 when the lengths differ, the input is empty, or either series
/// is constant. Sums are taken about the means, so a large common offset does
/// not swamp a small spread.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.is_empty() || is_constant(x) || is_constant(y) {
        return 0.0;
    }
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (a, b) in x.iter().zip(y) {
        let (dx, dy) = (a - mean_x, b - mean_y);
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denominator = (var_x * var_y).sqrt();
    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }
    (cov / denominator).clamp(-1.0, 1.0)
}

fn is_constant(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] == w[1])
}

/// Spearman rank correlation: Pearson applied to [`ranks`] of each series.
pub fn spearman(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.is_empty() {
        return 0.0;
    }
    pearson(&ranks(x), &ranks(y))
}

/// 1-based ranks after a stable descending sort. Ties keep first-seen order,
/// so equal values get consecutive ranks rather than an average.
pub fn ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[b].partial_cmp(&values[a]).unwrap_or(Ordering::Equal));

    let mut out = vec![0.0; values.len()];
    for (rank, idx) in order.into_iter().enumerate() {
        out[idx] = (rank + 1) as f64;
    }
    out
}

/// Statistic values of teams present in both summaries, in `primary` order.
pub fn paired_values(primary: &StatSummary, other: &StatSummary) -> (Vec<f64>, Vec<f64>) {
    pair_by_team(primary, other, |e| e.statistic_value)
}

/// Tie-averaged ranks of teams present in both summaries, in `primary` order.
pub fn paired_ranks(primary: &StatSummary, other: &StatSummary) -> (Vec<f64>, Vec<f64>) {
    pair_by_team(primary, other, |e| e.rank_tie_avg)
}

fn pair_by_team(
    primary: &StatSummary,
    other: &StatSummary,
    pick: impl Fn(&courtside_api::StatEntry) -> f64,
) -> (Vec<f64>, Vec<f64>) {
    let lookup: HashMap<i64, f64> = other.statistics.iter().map(|e| (e.team.id, pick(e))).collect();
    primary
        .statistics
        .iter()
        .filter_map(|e| lookup.get(&e.team.id).map(|&v| (pick(e), v)))
        .unzip()
}

/// Side-by-side comparison of two stats over their shared teams.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Correlation {
    pub pearson: f64,
    pub spearman: f64,
    /// Spearman over the server's tie-averaged ranks.
    pub rank_spearman: f64,
    pub teams: usize,
}

impl Correlation {
    pub fn between(primary: &StatSummary, other: &StatSummary) -> Self {
        let (xs, ys) = paired_values(primary, other);
        let (rx, ry) = paired_ranks(primary, other);
        Self {
            pearson: pearson(&xs, &ys),
            spearman: spearman(&xs, &ys),
            rank_spearman: spearman(&rx, &ry),
            teams: xs.len(),
        }
    }

    /// Rough verbal strength, used in the stats comparison panel.
    pub fn strength(value: f64) -> &'static str {
        match value.abs() {
            v if v >= 0.8 => "very strong",
            v if v >= 0.6 => "strong",
            v if v >= 0.4 => "moderate",
            v if v >= 0.2 => "weak",
            _ => "negligible",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courtside_api::{StatEntry, Team};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn pearson_of_series_with_itself_is_one() {
        let x = [3.0, 1.5, 8.25, 4.0, -2.0];
        assert!(close(pearson(&x, &x), 1.0));
    }

    #[test]
    fn pearson_of_negated_series_is_minus_one() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y: Vec<f64> = x.iter().map(|v| -2.0 * v + 7.0).collect();
        assert!(close(pearson(&x, &y), -1.0));
    }

    #[test]
    fn pearson_of_constant_series_is_zero() {
        assert_eq!(pearson(&[5.0, 5.0, 5.0], &[5.0, 5.0, 5.0]), 0.0);
        assert_eq!(pearson(&[0.1, 0.1, 0.1], &[1.0, 2.0, 3.0]), 0.0);
    }

    #[test]
    fn pearson_survives_a_large_common_offset() {
        let x = [1e7, 1e7 + 1.0, 1e7 + 2.0];
        assert!(close(pearson(&x, &x), 1.0));

        let y = [3e9 + 2.0, 3e9 + 1.0, 3e9];
        assert!(close(pearson(&x, &y), -1.0));
    }

    #[test]
    fn pearson_rejects_mismatched_or_empty_input() {
        assert_eq!(pearson(&[], &[]), 0.0);
        assert_eq!(pearson(&[1.0, 2.0], &[1.0]), 0.0);
        assert_eq!(spearman(&[1.0], &[]), 0.0);
    }

    #[test]
    fn pearson_matches_hand_computed_value() {
        // n=5, Σx=15, Σy=20, Σxy=69, Σx²=55, Σy²=90 → 45 / sqrt(50 * 50)
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [2.0, 4.0, 3.0, 5.0, 6.0];
        assert!(close(pearson(&x, &y), 0.9));
    }

    #[test]
    fn ranks_are_descending_and_ties_keep_first_seen_order() {
        assert_eq!(ranks(&[10.0, 30.0, 20.0]), vec![3.0, 1.0, 2.0]);
        assert_eq!(ranks(&[5.0, 7.0, 5.0, 1.0]), vec![2.0, 1.0, 3.0, 4.0]);
        assert!(ranks(&[]).is_empty());
    }

    #[test]
    fn spearman_ignores_increasing_transforms() {
        let x = [0.5, 3.0, 1.25, 9.0, 4.0, 2.0];
        let y = [1.0, 2.0, 0.5, 7.0, 3.5, 6.0];
        let base = spearman(&x, &y);

        let cubed: Vec<f64> = x.iter().map(|v| v * v * v).collect();
        let exped: Vec<f64> = y.iter().map(|v| v.exp()).collect();
        assert!(close(spearman(&cubed, &exped), base));

        // A decreasing transform mirrors the ranks, so only the sign changes.
        let negated: Vec<f64> = x.iter().map(|v| -v).collect();
        assert!(close(spearman(&negated, &y), -base));
    }

    #[test]
    fn spearman_sees_monotonic_relationship_as_perfect() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [1.0, 8.0, 27.0, 64.0, 125.0];
        assert!(pearson(&x, &y) < 1.0);
        assert!(close(spearman(&x, &y), 1.0));
    }

    fn entry(team_id: i64, value: f64, rank_tie_avg: f64) -> StatEntry {
        StatEntry {
            team: Team { id: team_id, ..Default::default() },
            statistic_value: value,
            rank_tie_avg,
            ..Default::default()
        }
    }

    #[test]
    fn summaries_are_joined_by_team_id() {
        let ppg = StatSummary {
            key: "ppg".into(),
            statistics: vec![entry(1, 80.0, 1.0), entry(2, 70.0, 2.0), entry(3, 60.0, 3.0)],
            ..Default::default()
        };
        let rpg = StatSummary {
            key: "rpg".into(),
            statistics: vec![entry(3, 30.0, 2.5), entry(1, 40.0, 1.0), entry(9, 50.0, 2.5)],
            ..Default::default()
        };

        assert_eq!(paired_values(&ppg, &rpg), (vec![80.0, 60.0], vec![40.0, 30.0]));
        assert_eq!(paired_ranks(&ppg, &rpg), (vec![1.0, 3.0], vec![1.0, 2.5]));

        let corr = Correlation::between(&ppg, &rpg);
        assert_eq!(corr.teams, 2);
        assert!(close(corr.pearson, 1.0));
        assert!(close(corr.spearman, 1.0));
        assert!(close(corr.rank_spearman, 1.0));
    }

    #[test]
    fn rank_comparison_is_spearman_of_tied_ranks() {
        let primary = StatSummary {
            key: "ppg".into(),
            statistics: vec![entry(1, 90.0, 1.0), entry(2, 80.0, 2.5), entry(3, 80.0, 2.5), entry(4, 70.0, 4.0)],
            ..Default::default()
        };
        let other = StatSummary {
            key: "apg".into(),
            statistics: vec![entry(1, 15.0, 2.0), entry(2, 17.0, 1.0), entry(3, 12.0, 3.5), entry(4, 12.0, 3.5)],
            ..Default::default()
        };

        let (rx, ry) = paired_ranks(&primary, &other);
        assert_eq!(rx, vec![1.0, 2.5, 2.5, 4.0]);
        assert_eq!(ry, vec![2.0, 1.0, 3.5, 3.5]);

        let corr = Correlation::between(&primary, &other);
        assert!(close(corr.rank_spearman, spearman(&rx, &ry)));
        assert!(close(corr.rank_spearman, 0.0));
        // Pearson over the same ranks would report 0.5 here.
        assert!(close(pearson(&rx, &ry), 0.5));
    }

    #[test]
    fn strength_labels() {
        assert_eq!(Correlation::strength(-0.85), "very strong");
        assert_eq!(Correlation::strength(0.05), "negligible");
    }
}
