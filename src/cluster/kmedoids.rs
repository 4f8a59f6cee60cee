//! K-medoids clustering (PAM-style swap).
//!
//! Like k-means, but every cluster representative is one of the input points.
//! Each round assigns points to their nearest medoid, then lets every cluster
//! try each of its members as the new medoid and keeps the cheapest one, where
//! the cost of a configuration is the sum of member-to-medoid distances.
//!
//! Working on real points instead of means makes the result less sensitive to
//! outliers and lets any metric be used (the mean is only the optimal
//! representative under squared Euclidean distance).
//!
//! # References
//!
//! Kaufman, L., Rousseeuw, P. J. (1987). "Clustering by means of medoids."

use super::assign::assign;
use super::metric::Distance;
use super::traits::Clustering;
use super::util::{self, make_rng};
use crate::error::{Error, Result};
use crate::partition::Partition;
use crate::points::Points;
use log::debug;
use ndarray::{Array2, Axis};

/// K-medoids configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct KmedoidsParams {
    /// Number of clusters.
    pub k: usize,
    /// Metric between a point and a medoid.
    pub distance: Distance,
    /// Maximum number of assign/reselect rounds.
    pub max_iterations: usize,
    /// Caller-fixed initial medoids (point indices). Random when `None`.
    pub initial_medoids: Option<Vec<usize>>,
    /// Optional RNG seed for reproducibility.
    pub seed: Option<u64>,
}

impl KmedoidsParams {
    /// Defaults for `k` clusters: Euclidean, 10 iterations, random medoids.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            distance: Distance::Euclidean,
            max_iterations: 10,
            initial_medoids: None,
            seed: None,
        }
    }

    /// Defaults with caller-fixed initial medoids; `k` is their count.
    pub fn with_medoids(medoids: Vec<usize>) -> Self {
        let k = medoids.len();
        Self {
            initial_medoids: Some(medoids),
            ..Self::new(k)
        }
    }
}

/// Result of a k-medoids run.
#[derive(Debug, Clone)]
pub struct KmedoidsFit {
    /// Medoid point index per cluster.
    pub medoids: Vec<usize>,
    /// Cluster label per point.
    pub labels: Vec<usize>,
    /// The `k` clusters, in medoid order.
    pub partition: Partition,
    /// Sum of distances from every point to its medoid.
    pub cost: f64,
    /// Rounds run.
    pub iterations: usize,
    /// Whether the medoids stopped changing before the cap.
    pub converged: bool,
}

/// K-medoids clustering algorithm.
#[derive(Debug, Clone)]
pub struct Kmedoids {
    params: KmedoidsParams,
}

impl Kmedoids {
    /// Validate `params` and create the engine.
    pub fn new(params: KmedoidsParams) -> Result<Self> {
        util::check_k(params.k)?;
        util::check_max_iterations(params.max_iterations)?;
        if let Some(medoids) = &params.initial_medoids {
            if medoids.len() != params.k {
                return Err(Error::InvalidParameter {
                    name: "initial_medoids",
                    message: "must list exactly k point indices",
                });
            }
            let mut sorted = medoids.clone();
            sorted.sort_unstable();
            sorted.dedup();
            if sorted.len() != medoids.len() {
                return Err(Error::InvalidParameter {
                    name: "initial_medoids",
                    message: "must be distinct",
                });
            }
        }
        Ok(Self { params })
    }

    /// Shorthand for `Kmedoids::new(KmedoidsParams::new(k))`.
    pub fn with_k(k: usize) -> Result<Self> {
        Self::new(KmedoidsParams::new(k))
    }

    /// The validated configuration.
    pub fn params(&self) -> &KmedoidsParams {
        &self.params
    }

    /// Run k-medoids on `points`.
    pub fn fit(&self, points: &Points) -> Result<KmedoidsFit> {
        let k = self.params.k;
        let n = points.len();
        if n == 0 {
            return Ok(KmedoidsFit {
                medoids: Vec::new(),
                labels: Vec::new(),
                partition: Partition::empty(),
                cost: 0.0,
                iterations: 0,
                converged: true,
            });
        }
        util::check_k_fits(k, n)?;

        let metric = self.params.distance;
        let mut medoids = self.init_medoids(n)?;
        let mut labels = vec![0usize; n];
        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.params.max_iterations {
            labels = assign(points, &medoid_rows(points, &medoids), metric);
            iterations += 1;

            let mut moved = false;
            for (c, medoid) in medoids.iter_mut().enumerate() {
                let members: Vec<usize> = (0..n).filter(|&i| labels[i] == c).collect();
                if members.is_empty() {
                    continue;
                }
                let best = cheapest_medoid(points, &members, *medoid, metric);
                if best != *medoid {
                    *medoid = best;
                    moved = true;
                }
            }

            if !moved {
                converged = true;
                break;
            }
        }

        if converged {
            debug!("k-medoids converged after {iterations} iterations (k={k}, n={n})");
        } else {
            debug!("k-medoids stopped at the iteration cap ({iterations}) without converging");
        }

        // Labels must describe the final medoids when the cap cut a swap round short.
        if !converged {
            labels = assign(points, &medoid_rows(points, &medoids), metric);
        }
        let cost = labels
            .iter()
            .enumerate()
            .map(|(i, &c)| metric.distance(points.row(i), points.row(medoids[c])))
            .sum();
        let partition = Partition::from_labels(&labels, k);

        Ok(KmedoidsFit {
            medoids,
            labels,
            partition,
            cost,
            iterations,
            converged,
        })
    }

    fn init_medoids(&self, n: usize) -> Result<Vec<usize>> {
        match &self.params.initial_medoids {
            Some(fixed) => {
                if let Some(&index) = fixed.iter().find(|&&m| m >= n) {
                    return Err(Error::IndexOutOfRange { index, len: n });
                }
                Ok(fixed.clone())
            }
            None => {
                let mut rng = make_rng(self.params.seed);
                Ok(rand::seq::index::sample(&mut rng, n, self.params.k).into_vec())
            }
        }
    }
}

impl Clustering for Kmedoids {
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

fn medoid_rows(points: &Points, medoids: &[usize]) -> Array2<f64> {
    points.as_array().select(Axis(0), medoids)
}

/// Member of `members` minimizing the summed distance to all members.
///
/// The incumbent is kept unless a candidate is strictly cheaper.
fn cheapest_medoid(
    points: &Points,
    members: &[usize],
    incumbent: usize,
    metric: Distance,
) -> usize {
    let cost_of = |candidate: usize| -> f64 {
        members
            .iter()
            .map(|&i| metric.distance(points.row(i), points.row(candidate)))
            .sum()
    };

    let mut best = incumbent;
    let mut best_cost = cost_of(incumbent);
    for &candidate in members {
        if candidate == incumbent {
            continue;
        }
        let cost = cost_of(candidate);
        if cost < best_cost {
            best_cost = cost;
            best = candidate;
        }
    }
    best
}
