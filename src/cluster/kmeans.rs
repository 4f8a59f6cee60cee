//! K-means clustering.
//!
//! Partitions points into k clusters around synthetic centroids (Lloyd 1957).
//!
//! # Algorithm
//!
//! 1. **Init**: place k centroids (uniformly inside the observed bounding box,
//!    on k random points, or at caller-fixed positions)
//! 2. **Assign**: each point → nearest centroid under the configured metric
//! 3. **Update**: each non-empty centroid → mean of its points
//! 4. Repeat until no centroid coordinate moves at 4 decimal places, or the
//!    iteration cap is hit
//!
//! A centroid that receives no points keeps its position for that round.
//!
//! # Objective
//!
//! ```text
//! J = Σ_k Σ_{x ∈ C_k} ||x - μ_k||²
//! ```
//!
//! With the Euclidean metric, `J` measured after each assignment step never
//! increases; [`KmeansFit::inertia`] records it so callers can check.

use super::assign::assign;
use super::metric::{squared_euclidean, Distance};
use super::traits::Clustering;
use super::util::{self, make_rng};
use crate::error::{Error, Result};
use crate::partition::Partition;
use crate::points::Points;
use log::{debug, warn};
use ndarray::{Array2, Axis};
use rand::prelude::*;

/// How initial centroids are chosen.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum KmeansInit {
    /// Uniform random value per dimension within that dimension's observed
    /// `[min, max]`.
    #[default]
    UniformRange,
    /// k distinct input points, chosen uniformly at random.
    RandomPoints,
    /// Caller-supplied `k × d` centroids.
    Fixed(Array2<f64>),
}

/// K-means configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct KmeansParams {
    /// Number of clusters.
    pub k: usize,
    /// Metric used by the assignment step.
    pub distance: Distance,
    /// Maximum number of assign/update rounds.
    pub max_iterations: usize,
    /// Centroid initialization.
    pub init: KmeansInit,
    /// Optional RNG seed for reproducibility.
    pub seed: Option<u64>,
}

impl KmeansParams {
    /// Defaults for `k` clusters: Euclidean, 10 iterations, uniform init.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            distance: Distance::Euclidean,
            max_iterations: 10,
            init: KmeansInit::UniformRange,
            seed: None,
        }
    }
}

/// Result of a k-means run.
#[derive(Debug, Clone)]
pub struct KmeansFit {
    /// Final centroids (`k × d`).
    pub centroids: Array2<f64>,
    /// Cluster label per point, from the last assignment step.
    pub labels: Vec<usize>,
    /// The `k` clusters, in centroid order (possibly empty).
    pub partition: Partition,
    /// Within-cluster sum of squared Euclidean distances after each assignment.
    pub inertia: Vec<f64>,
    /// Rounds run.
    pub iterations: usize,
    /// Whether centroids stopped moving before the cap.
    pub converged: bool,
}

/// K-means clustering algorithm.
#[derive(Debug, Clone)]
pub struct Kmeans {
    params: KmeansParams,
}

impl Kmeans {
    /// Validate `params` and create the engine.
    pub fn new(params: KmeansParams) -> Result<Self> {
        util::check_k(params.k)?;
        util::check_max_iterations(params.max_iterations)?;
        if let KmeansInit::Fixed(centroids) = &params.init {
            if centroids.nrows() != params.k {
                return Err(Error::DimensionMismatch {
                    expected: params.k,
                    found: centroids.nrows(),
                });
            }
            if centroids.iter().any(|v| !v.is_finite()) {
                return Err(Error::InvalidParameter {
                    name: "init",
                    message: "fixed centroids must be finite",
                });
            }
        }
        Ok(Self { params })
    }

    /// Shorthand for `Kmeans::new(KmeansParams::new(k))`.
    pub fn with_k(k: usize) -> Result<Self> {
        Self::new(KmeansParams::new(k))
    }

    /// The validated configuration.
    pub fn params(&self) -> &KmeansParams {
        &self.params
    }

    /// Run k-means on `points`.
    pub fn fit(&self, points: &Points) -> Result<KmeansFit> {
        let k = self.params.k;
        let n = points.len();
        if n == 0 {
            return Ok(KmeansFit {
                centroids: Array2::zeros((0, points.dims())),
                labels: Vec::new(),
                partition: Partition::empty(),
                inertia: Vec::new(),
                iterations: 0,
                converged: true,
            });
        }
        util::check_k_fits(k, n)?;

        let mut rng = make_rng(self.params.seed);
        let mut centroids = self.init_centroids(points, &mut rng)?;
        let mut labels = vec![0usize; n];
        let mut inertia = Vec::with_capacity(self.params.max_iterations);
        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.params.max_iterations {
            labels = assign(points, &centroids, self.params.distance);
            inertia.push(within_cluster_sse(points, &centroids, &labels));

            let updated = update_centroids(points, &labels, &centroids);
            iterations += 1;

            let stable = util::unchanged_rounded(&centroids, &updated);
            centroids = updated;
            if stable {
                converged = true;
                break;
            }
        }

        if converged {
            debug!("k-means converged after {iterations} iterations (k={k}, n={n})");
        } else {
            debug!("k-means stopped at the iteration cap ({iterations}) without converging");
        }

        let partition = Partition::from_labels(&labels, k);
        Ok(KmeansFit {
            centroids,
            labels,
            partition,
            inertia,
            iterations,
            converged,
        })
    }

    fn init_centroids(&self, points: &Points, rng: &mut impl Rng) -> Result<Array2<f64>> {
        let k = self.params.k;
        let d = points.dims();
        match &self.params.init {
            KmeansInit::UniformRange => {
                let bounds = points.column_bounds();
                Ok(Array2::from_shape_fn((k, d), |(_, j)| {
                    // Interpolate instead of sampling a range: `hi - lo` may overflow.
                    let (lo, hi) = bounds[j];
                    let u: f64 = rng.random();
                    (lo * (1.0 - u) + hi * u).clamp(lo, hi)
                }))
            }
            KmeansInit::RandomPoints => {
                let picks = rand::seq::index::sample(rng, points.len(), k).into_vec();
                Ok(points.as_array().select(Axis(0), &picks))
            }
            KmeansInit::Fixed(centroids) => {
                if centroids.ncols() != d {
                    return Err(Error::DimensionMismatch {
                        expected: d,
                        found: centroids.ncols(),
                    });
                }
                Ok(centroids.clone())
            }
        }
    }
}

impl Clustering for Kmeans {
    fn fit_predict(&self, points: &Points) -> Result<Vec<usize>> {
        Ok(self.fit(points)?.labels)
    }

    fn n_clusters(&self) -> usize {
        self.params.k
    }

    fn partition(&self, points: &Points) -> Result<Partition> {
        Ok(self.fit(points)?.partition)
    }
}

/// Rule-of-thumb cluster count for `n` points: `max(2, ceil(sqrt(n / 2)))`.
pub fn suggested_k(n: usize) -> usize {
    ((n as f64 / 2.0).sqrt().ceil() as usize).max(2)
}

fn update_centroids(points: &Points, labels: &[usize], previous: &Array2<f64>) -> Array2<f64> {
    let k = previous.nrows();
    let mut counts = vec![0usize; k];
    for &label in labels {
        counts[label] += 1;
    }

    // Accumulate `x / count` so the running sum stays within the points' range.
    let mut means = Array2::<f64>::zeros(previous.raw_dim());
    for (i, &label) in labels.iter().enumerate() {
        let count = counts[label] as f64;
        means.row_mut(label).scaled_add(1.0 / count, &points.row(i));
    }

    for (c, &count) in counts.iter().enumerate() {
        if count == 0 {
            warn!("k-means: cluster {c} is empty, keeping its previous centroid");
            means.row_mut(c).assign(&previous.row(c));
        }
    }
    means
}

fn within_cluster_sse(points: &Points, centroids: &Array2<f64>, labels: &[usize]) -> f64 {
    labels
        .iter()
        .enumerate()
        .map(|(i, &c)| squared_euclidean(points.row(i), centroids.row(c)))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn blobs() -> Points {
        Points::from_rows(&[
            vec![0.0, 0.0],
            vec![0.1, 0.1],
            vec![0.2, 0.0],
            vec![10.0, 10.0],
            vec![10.1, 10.1],
            vec![9.9, 10.2],
        ])
        .unwrap()
    }

    #[test]
    fn fixed_centroids_converge_to_means() {
        let points =
            Points::from_rows(&[vec![0.0, 0.0], vec![0.0, 1.0], vec![10.0, 10.0], vec![10.0, 11.0]])
                .unwrap();
        let kmeans = Kmeans::new(KmeansParams {
            init: KmeansInit::Fixed(array![[0.0, 0.0], [10.0, 10.0]]),
            ..KmeansParams::new(2)
        })
        .unwrap();

        let fit = kmeans.fit(&points).unwrap();
        assert_eq!(fit.labels, vec![0, 0, 1, 1]);
        assert_eq!(fit.centroids, array![[0.0, 0.5], [10.0, 10.5]]);
        assert!(fit.converged);
        assert_eq!(fit.iterations, 2);
        assert_eq!(fit.partition.clusters(), &[vec![0, 1], vec![2, 3]]);
    }

    #[test]
    fn separates_two_blobs() {
        let kmeans = Kmeans::new(KmeansParams {
            init: KmeansInit::RandomPoints,
            seed: Some(42),
            ..KmeansParams::new(2)
        })
        .unwrap();
        let labels = kmeans.fit_predict(&blobs()).unwrap();

        assert_eq!(labels[0], labels[1]);
        assert_eq!(labels[1], labels[2]);
        assert_eq!(labels[3], labels[4]);
        assert_eq!(labels[4], labels[5]);
        assert_ne!(labels[0], labels[3]);
    }

    #[test]
    fn deterministic_with_seed() {
        let params = KmeansParams {
            seed: Some(7),
            ..KmeansParams::new(3)
        };
        let a = Kmeans::new(params.clone()).unwrap().fit(&blobs()).unwrap();
        let b = Kmeans::new(params).unwrap().fit(&blobs()).unwrap();
        assert_eq!(a.labels, b.labels);
        assert_eq!(a.centroids, b.centroids);
    }

    #[test]
    fn empty_cluster_keeps_centroid() {
        let points = Points::from_rows(&[vec![0.0, 0.0], vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();
        let kmeans = Kmeans::new(KmeansParams {
            init: KmeansInit::Fixed(array![[0.0, 0.0], [100.0, 100.0]]),
            ..KmeansParams::new(2)
        })
        .unwrap();

        let fit = kmeans.fit(&points).unwrap();
        assert_eq!(fit.labels, vec![0, 0, 0]);
        assert_eq!(fit.centroids.row(1).to_vec(), vec![100.0, 100.0]);
        assert_eq!(fit.partition.len(), 2);
        assert!(fit.partition.clusters()[1].is_empty());
    }

    #[test]
    fn inertia_never_increases() {
        let points = Points::from_rows(
            &(0..40)
                .map(|i| vec![(i % 7) as f64 * 1.3, (i % 5) as f64 * 0.7 + (i / 10) as f64])
                .collect::<Vec<_>>(),
        )
        .unwrap();
        let fit = Kmeans::new(KmeansParams {
            max_iterations: 50,
            seed: Some(3),
            ..KmeansParams::new(4)
        })
        .unwrap()
        .fit(&points)
        .unwrap();

        for pair in fit.inertia.windows(2) {
            assert!(pair[1] <= pair[0] + 1e-9, "inertia rose: {:?}", fit.inertia);
        }
    }

    #[test]
    fn empty_input_gives_empty_partition() {
        let points = Points::from_rows::<Vec<f64>>(&[]).unwrap();
        let fit = Kmeans::with_k(3).unwrap().fit(&points).unwrap();
        assert!(fit.partition.is_empty());
        assert!(fit.labels.is_empty());
    }

    #[test]
    fn invalid_configuration() {
        assert!(Kmeans::with_k(0).is_err());
        assert!(Kmeans::new(KmeansParams {
            max_iterations: 0,
            ..KmeansParams::new(2)
        })
        .is_err());
        assert!(matches!(
            Kmeans::new(KmeansParams {
                init: KmeansInit::Fixed(array![[0.0, 0.0]]),
                ..KmeansParams::new(2)
            }),
            Err(Error::DimensionMismatch {
                expected: 2,
                found: 1
            })
        ));
    }

    #[test]
    fn k_larger_than_n_is_an_error() {
        let points = Points::from_rows(&[vec![0.0], vec![1.0]]).unwrap();
        let result = Kmeans::with_k(3).unwrap().fit(&points);
        assert!(matches!(
            result,
            Err(Error::InvalidClusterCount {
                requested: 3,
                n_items: 2
            })
        ));
    }

    #[test]
    fn fixed_centroid_width_must_match() {
        let points = Points::from_rows(&[vec![0.0, 0.0], vec![1.0, 1.0]]).unwrap();
        let kmeans = Kmeans::new(KmeansParams {
            init: KmeansInit::Fixed(array![[0.0], [1.0]]),
            ..KmeansParams::new(2)
        })
        .unwrap();
        assert!(matches!(
            kmeans.fit(&points),
            Err(Error::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn uniform_init_stays_in_bounds() {
        let points = Points::from_rows(&[vec![-1.0, 5.0], vec![3.0, 5.0], vec![1.0, 5.0]]).unwrap();
        let kmeans = Kmeans::new(KmeansParams {
            max_iterations: 1,
            seed: Some(11),
            ..KmeansParams::new(3)
        })
        .unwrap();
        let mut rng = make_rng(Some(11));
        let init = kmeans.init_centroids(&points, &mut rng).unwrap();
        for row in init.rows() {
            assert!((-1.0..=3.0).contains(&row[0]));
            assert_eq!(row[1], 5.0);
        }
    }

    #[test]
    fn extreme_coordinates_do_not_overflow() {
        let points = Points::from_rows(&[vec![-1e308], vec![1e308]]).unwrap();
        for seed in 0..8 {
            let fit = Kmeans::new(KmeansParams {
                seed: Some(seed),
                ..KmeansParams::new(2)
            })
            .unwrap()
            .fit(&points)
            .unwrap();
            assert_eq!(fit.partition.n_points(), 2);
            assert!(fit.centroids.iter().all(|v| v.is_finite()));
        }

        let same_side = Points::from_rows(&[vec![1e308], vec![1.5e308]]).unwrap();
        let fit = Kmeans::new(KmeansParams {
            init: KmeansInit::Fixed(array![[0.0]]),
            ..KmeansParams::new(1)
        })
        .unwrap()
        .fit(&same_side)
        .unwrap();
        approx::assert_relative_eq!(fit.centroids[[0, 0]], 1.25e308, max_relative = 1e-12);
    }

    #[test]
    fn suggested_k_rule_of_thumb() {
        assert_eq!(suggested_k(0), 2);
        assert_eq!(suggested_k(8), 2);
        assert_eq!(suggested_k(50), 5);
        assert_eq!(suggested_k(51), 6);
    }
}
