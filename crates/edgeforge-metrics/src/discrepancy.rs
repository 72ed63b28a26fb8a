//! L2-star discrepancy of a scaled feature table.

use crate::features::FeatureTable;

/// Closed-form L2-star discrepancy of the table's rows as points in the
/// unit cube.
///
/// Measures how far the empirical point mass inside every origin-anchored
/// axis-aligned box deviates from that box's volume, aggregated in the L2
/// sense. Lower means the synthetic population fills the feature cube more
/// uniformly. Pure and permutation-invariant over rows.
#[must_use]
pub fn l2_star_discrepancy(table: &FeatureTable) -> f64 {
    let points: Vec<[f64; 3]> = table.points().collect();
    if points.is_empty() {
        return 0.0;
    }
    let n = points.len() as f64;
    let dims = 3i32;

    let single: f64 = points
        .iter()
        .map(|p| p.iter().map(|&x| 1.0 - x * x).product::<f64>())
        .sum();

    let mut pairwise = 0.0;
    for a in &points {
        for b in &points {
            pairwise += a
                .iter()
                .zip(b)
                .map(|(&x, &y)| 1.0 - x.max(y))
                .product::<f64>();
        }
    }

    let squared =
        3f64.powi(-dims) - single * 2f64.powi(1 - dims) / n + pairwise / (n * n);
    // guard the sqrt against negative rounding residue
    squared.max(0.0).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureRow;
    use edgeforge_model::UserId;

    fn table_of(points: &[[f64; 3]]) -> FeatureTable {
        FeatureTable::from_rows(
            points
                .iter()
                .enumerate()
                .map(|(i, p)| {
                    (
                        UserId(i as u32),
                        FeatureRow {
                            pagerank: p[0],
                            degree: p[1],
                            signature: p[2],
                        },
                    )
                })
                .collect(),
        )
    }

    fn grid_points() -> Vec<[f64; 3]> {
        let mut points = Vec::new();
        for &x in &[0.25, 0.75] {
            for &y in &[0.25, 0.75] {
                for &z in &[0.25, 0.75] {
                    points.push([x, y, z]);
                }
            }
        }
        points
    }

    #[test]
    fn spread_points_beat_a_corner_cluster() {
        let grid = l2_star_discrepancy(&table_of(&grid_points()));
        let cluster = l2_star_discrepancy(&table_of(&[[0.05, 0.05, 0.05]; 8]));
        assert!(grid < cluster, "grid {grid} vs cluster {cluster}");
    }

    #[test]
    fn score_is_nonnegative_and_finite() {
        let score = l2_star_discrepancy(&table_of(&[[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]]));
        assert!(score >= 0.0);
        assert!(score.is_finite());
    }

    #[test]
    fn row_permutation_does_not_change_the_score() {
        let mut points = grid_points();
        let forward = l2_star_discrepancy(&table_of(&points));
        points.reverse();
        let backward = l2_star_discrepancy(&table_of(&points));
        assert!((forward - backward).abs() < 1e-15);
    }

    #[test]
    fn empty_table_scores_zero() {
        assert_eq!(l2_star_discrepancy(&FeatureTable::default()), 0.0);
    }
}
