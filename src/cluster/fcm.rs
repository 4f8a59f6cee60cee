//! Fuzzy c-means (soft k-means).
//!
//! Every point gets a degree of membership in every cluster instead of a
//! single label. Memberships form an `n × k` matrix `U` whose rows sum to 1.
//!
//! # Algorithm (Bezdek, 1981)
//!
//! Starting from random row-normalized memberships, alternate:
//!
//! ```text
//! c_k    = Σ_i U[i,k]^m · x_i / Σ_i U[i,k]^m
//! U[i,k] = 1 / Σ_j ( d(x_i, c_k) / d(x_i, c_j) )^(2/(m-1))
//! ```
//!
//! until `U`, rounded to 4 decimals, stops changing or the iteration cap is
//! hit. The fuzziness exponent `m > 1` controls softness: values close to 1
//! approach hard k-means, large values push every row towards uniform.
//!
//! A point sitting exactly on a centroid would divide by zero; it gets full
//! membership in that cluster instead.
//!
//! A hard partition is derived at the end by taking each row's largest
//! membership.

use super::metric::Distance;
use super::traits::{Clustering, SoftClustering};
use super::util::{self, make_rng};
use crate::error::{Error, Result};
use crate::partition::Partition;
use crate::points::Points;
use log::debug;
use ndarray::{Array1, Array2};
use rand::prelude::*;

/// Fuzzy c-means configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyParams {
    /// Number of clusters.
    pub k: usize,
    /// Fuzziness exponent, must be greater than 1.
    pub m: f64,
    /// Metric between points and centroids.
    pub distance: Distance,
    /// Maximum number of update rounds.
    pub max_iterations: usize,
    /// Optional RNG seed for the initial memberships.
    pub seed: Option<u64>,
}

impl FuzzyParams {
    /// Defaults for `k` clusters: `m = 2`, Euclidean, 10 iterations.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            m: 2.0,
            distance: Distance::Euclidean,
            max_iterations: 10,
            seed: None,
        }
    }
}

/// Result of a fuzzy c-means run.
#[derive(Debug, Clone)]
pub struct FuzzyFit {
    /// Membership matrix `U` (`n × k`, rows sum to 1).
    pub membership: Array2<f64>,
    /// Final centroids (`k × d`).
    pub centroids: Array2<f64>,
    /// Hard label per point (largest membership, first on ties).
    pub labels: Vec<usize>,
    /// Hard partition with `k` slots.
    pub partition: Partition,
    /// Rounds run.
    pub iterations: usize,
    /// Whether memberships stopped changing before the cap.
    pub converged: bool,
}

/// Fuzzy c-means clustering algorithm.
#[derive(Debug, Clone)]
pub struct FuzzyCMeans {
    params: FuzzyParams,
}

impl FuzzyCMeans {
    /// Validate `params` and create the engine.
    pub fn new(params: FuzzyParams) -> Result<Self> {
        util::check_k(params.k)?;
        util::check_max_iterations(params.max_iterations)?;
        if !(params.m.is_finite() && params.m > 1.0) {
            return Err(Error::InvalidParameter {
                name: "m",
                message: "fuzziness exponent must be a finite value greater than 1",
            });
        }
        Ok(Self { params })
    }

    /// Shorthand for `FuzzyCMeans::new(FuzzyParams::new(k))`.
    pub fn with_k(k: usize) -> Result<Self> {
        Self::new(FuzzyParams::new(k))
    }

    /// The validated configuration.
    pub fn params(&self) -> &FuzzyParams {
        &self.params
    }

    /// Run fuzzy c-means on `points`.
    pub fn fit(&self, points: &Points) -> Result<FuzzyFit> {
        let k = self.params.k;
        let n = points.len();
        if n == 0 {
            return Ok(FuzzyFit {
                membership: Array2::zeros((0, k)),
                centroids: Array2::zeros((0, points.dims())),
                labels: Vec::new(),
                partition: Partition::empty(),
                iterations: 0,
                converged: true,
            });
        }
        util::check_k_fits(k, n)?;

        let mut rng = make_rng(self.params.seed);
        let mut membership = random_membership(n, k, &mut rng);
        let mut centroids = Array2::<f64>::zeros((k, points.dims()));
        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.params.max_iterations {
            centroids = update_centroids(points, &membership, self.params.m, &centroids);
            let updated =
                update_membership(points, &centroids, self.params.m, self.params.distance);
            iterations += 1;

            let stable = util::unchanged_rounded(&membership, &updated);
            membership = updated;
            if stable {
                converged = true;
                break;
            }
        }

        if converged {
            debug!("fuzzy c-means converged after {iterations} iterations (k={k}, n={n})");
        } else {
            debug!("fuzzy c-means stopped at the iteration cap ({iterations}) without converging");
        }

        let labels = hard_labels(&membership);
        let partition = Partition::from_labels(&labels, k);
        Ok(FuzzyFit {
            membership,
            centroids,
            labels,
            partition,
            iterations,
            converged,
        })
    }
}

impl Clustering for FuzzyCMeans {
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

impl SoftClustering for FuzzyCMeans {
    fn fit_predict_proba(&self, points: &Points) -> Result<Array2<f64>> {
        Ok(self.fit(points)?.membership)
    }
}

fn random_membership(n: usize, k: usize, rng: &mut impl Rng) -> Array2<f64> {
    let mut membership = Array2::from_shape_fn((n, k), |_| rng.random::<f64>());
    for mut row in membership.rows_mut() {
        let sum = row.sum();
        if sum > 0.0 {
            row.mapv_inplace(|v| v / sum);
        } else {
            row.fill(1.0 / k as f64);
        }
    }
    membership
}

fn update_centroids(
    points: &Points,
    membership: &Array2<f64>,
    m: f64,
    previous: &Array2<f64>,
) -> Array2<f64> {
    let mut centroids = previous.clone();
    for (c, column) in membership.columns().into_iter().enumerate() {
        let weights: Array1<f64> = column.mapv(|u| u.powf(m));
        let total = weights.sum();
        if total <= 0.0 || !total.is_finite() {
            continue;
        }
        // Normalized weights keep the weighted sum within the points' range.
        let weights = weights / total;
        centroids.row_mut(c).assign(&weights.dot(points.as_array()));
    }
    centroids
}

fn update_membership(
    points: &Points,
    centroids: &Array2<f64>,
    m: f64,
    metric: Distance,
) -> Array2<f64> {
    let n = points.len();
    let k = centroids.nrows();
    let exponent = 2.0 / (m - 1.0);
    let mut membership = Array2::<f64>::zeros((n, k));

    for i in 0..n {
        let dists: Vec<f64> = centroids
            .rows()
            .into_iter()
            .map(|c| metric.distance(points.row(i), c))
            .collect();

        if let Some(hit) = dists.iter().position(|&d| d == 0.0) {
            membership[[i, hit]] = 1.0;
            continue;
        }

        for c in 0..k {
            let denom: f64 = dists
                .iter()
                .map(|&dj| distance_ratio(dists[c], dj).powf(exponent))
                .sum();
            membership[[i, c]] = 1.0 / denom;
        }

        let mut row = membership.row_mut(i);
        let total = row.sum();
        row.mapv_inplace(|u| u / total);
    }
    membership
}

/// `a / b`, with equal distances (both infinite included) comparing as 1.
fn distance_ratio(a: f64, b: f64) -> f64 {
    if a == b {
        1.0
    } else {
        a / b
    }
}

fn hard_labels(membership: &Array2<f64>) -> Vec<usize> {
    membership
        .rows()
        .into_iter()
        .map(|row| {
            let mut best = 0;
            for (c, &u) in row.iter().enumerate() {
                if u > row[best] {
                    best = c;
                }
            }
            best
        })
        .collect()
}
