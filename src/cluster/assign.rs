//! Nearest-representative assignment shared by the centroid and medoid engines.

use super::metric::Distance;
use crate::points::Points;
use ndarray::{Array2, ArrayView1};

/// Index of the representative row closest to `point`.
///
/// Ties go to the first representative encountered (strict `<`). Returns 0
/// when there are no representatives.
#[inline]
pub(crate) fn nearest(
    point: ArrayView1<'_, f64>,
    representatives: &Array2<f64>,
    metric: Distance,
) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (r, rep) in representatives.rows().into_iter().enumerate() {
        let dist = metric.distance(point, rep);
        if dist < best_dist {
            best_dist = dist;
            best = r;
        }
    }
    best
}

/// Label every point with its nearest representative. O(n·k).
pub(crate) fn assign(
    points: &Points,
    representatives: &Array2<f64>,
    metric: Distance,
) -> Vec<usize> {
    (0..points.len())
        .map(|i| nearest(points.row(i), representatives, metric))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn assigns_to_closest_representative() {
        let points = Points::from_rows(&[vec![0.0, 0.0], vec![9.0, 9.0], vec![1.0, 0.5]]).unwrap();
        let reps = array![[10.0, 10.0], [0.0, 0.0]];
        assert_eq!(assign(&points, &reps, Distance::Euclidean), vec![1, 0, 1]);
    }

    #[test]
    fn ties_go_to_first_representative() {
        let points = Points::from_rows(&[vec![0.0]]).unwrap();
        let reps = array![[-1.0], [1.0]];
        assert_eq!(assign(&points, &reps, Distance::Manhattan), vec![0]);
    }

    #[test]
    fn metric_changes_the_winner() {
        // (3, 3) vs (0, 4) from the origin: Euclidean 4.24 vs 4, Max 3 vs 4.
        let points = Points::from_rows(&[vec![0.0, 0.0]]).unwrap();
        let reps = array![[3.0, 3.0], [0.0, 4.0]];
        assert_eq!(assign(&points, &reps, Distance::Euclidean), vec![1]);
        assert_eq!(assign(&points, &reps, Distance::Max), vec![0]);
    }
}
