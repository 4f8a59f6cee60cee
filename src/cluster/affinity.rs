//! Affinity propagation: exemplar selection by message passing.
//!
//! # The Algorithm (Frey & Dueck, 2007)
//!
//! Every point is a candidate exemplar. Two kinds of messages are exchanged
//! until the set of exemplars stops changing:
//!
//! - **Responsibility** `R[i,k]`: how well suited `k` is to be `i`'s exemplar,
//!   compared with `i`'s best alternative.
//! - **Availability** `A[i,k]`: how appropriate it is for `i` to pick `k`,
//!   given the support `k` receives from other points.
//!
//! ```text
//! R[i,k] ← S[i,k] − max_{k'≠k} (A[i,k'] + S[i,k'])
//! A[i,k] ← min(0, R[k,k] + Σ_{i'∉{i,k}} max(0, R[i',k]))     (i ≠ k)
//! A[k,k] ← Σ_{i'≠k} max(0, R[i',k])
//! ```
//!
//! Both updates are damped: `new = (1 − λ)·fresh + λ·old`, `λ ∈ [0.5, 1)`.
//! Point `k` is an exemplar when `R[k,k] + A[k,k] > 0`.
//!
//! ## Inputs
//!
//! - **Similarity** `S[i,k]`: directed, "how good `k` is as an exemplar for
//!   `i`". Pairs without a similarity are `-∞` (never chosen).
//! - **Preference** `S[k,k]`: the a-priori suitability of each point as an
//!   exemplar. Higher preference → more clusters. Defaults to the median of
//!   the known similarities.
//!
//! ## Convergence
//!
//! Each round records which points currently qualify as exemplars. The run
//! stops once every point's status has been constant over the last
//! `conv_iterations` rounds and at least one exemplar exists, or at
//! `max_iterations`.
//!
//! ## Post-processing
//!
//! Points attach to the exemplar they are most similar to; each group then
//! re-elects the member with the highest summed similarity from the rest of
//! the group, and points are attached once more to the refined exemplars.
//!
//! # References
//!
//! Frey, B. J., Dueck, D. (2007). "Clustering by Passing Messages Between
//! Data Points." Science 315(5814).

use super::traits::Clustering;
use super::util;
use crate::error::{Error, Result};
use crate::partition::Partition;
use crate::points::Points;
use log::{debug, warn};
use ndarray::Array2;
use std::fmt;
use std::str::FromStr;

/// How the diagonal of the similarity matrix is filled.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Preference {
    /// Median of all known (finite, off-diagonal) similarities.
    #[default]
    Median,
    /// Minimum of all known similarities; yields few clusters.
    Min,
    /// A fixed, finite value.
    Value(f64),
}

impl FromStr for Preference {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "median" => Ok(Preference::Median),
            "min" => Ok(Preference::Min),
            other => match other.parse::<f64>() {
                Ok(v) if v.is_finite() => Ok(Preference::Value(v)),
                _ => Err(Error::UnknownOption {
                    option: "preference",
                    value: s.to_string(),
                }),
            },
        }
    }
}

impl fmt::Display for Preference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Preference::Median => f.write_str("median"),
            Preference::Min => f.write_str("min"),
            Preference::Value(v) => write!(f, "{v}"),
        }
    }
}

/// Directed pairwise similarities between `n` points.
///
/// Entry `(i, j)` is the similarity of point `j` to point `i`, i.e. how well
/// `j` would serve as `i`'s exemplar. Pairs that were never set are `-∞`.
/// The diagonal is ignored; it is replaced by the preference at fit time.
#[derive(Debug, Clone, PartialEq)]
pub struct Similarities {
    matrix: Array2<f64>,
}

impl Similarities {
    /// `n` points with no known similarities.
    pub fn new(n: usize) -> Self {
        Self {
            matrix: Array2::from_elem((n, n), f64::NEG_INFINITY),
        }
    }

    /// Build from `(source, target, weight)` edges. Later edges overwrite
    /// earlier ones for the same ordered pair.
    pub fn from_edges<I>(n: usize, edges: I) -> Result<Self>
    where
        I: IntoIterator<Item = (usize, usize, f64)>,
    {
        let mut sims = Self::new(n);
        for (source, target, weight) in edges {
            sims.set(source, target, weight)?;
        }
        Ok(sims)
    }

    /// Negative squared Euclidean distance between every pair of points.
    pub fn negative_squared_euclidean(points: &Points) -> Self {
        let n = points.len();
        let mut sims = Self::new(n);
        for i in 0..n {
            for j in (i + 1)..n {
                let d = -super::metric::squared_euclidean(points.row(i), points.row(j));
                sims.matrix[[i, j]] = d;
                sims.matrix[[j, i]] = d;
            }
        }
        sims
    }

    /// Set the similarity of `target` to `source`.
    pub fn set(&mut self, source: usize, target: usize, weight: f64) -> Result<()> {
        let n = self.len();
        for index in [source, target] {
            if index >= n {
                return Err(Error::IndexOutOfRange { index, len: n });
            }
        }
        if !weight.is_finite() {
            return Err(Error::InvalidParameter {
                name: "weight",
                message: "similarities must be finite",
            });
        }
        self.matrix[[source, target]] = weight;
        Ok(())
    }

    /// Similarity of `target` to `source` (`-∞` when unknown).
    pub fn get(&self, source: usize, target: usize) -> f64 {
        self.matrix[[source, target]]
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.matrix.nrows()
    }

    /// Whether there are no points.
    pub fn is_empty(&self) -> bool {
        self.matrix.nrows() == 0
    }

    fn known_off_diagonal(&self) -> Vec<f64> {
        self.matrix
            .indexed_iter()
            .filter(|&((i, j), v)| i != j && v.is_finite())
            .map(|(_, &v)| v)
            .collect()
    }
}

/// Affinity propagation configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AffinityParams {
    /// Diagonal fill policy; controls the number of clusters.
    pub preference: Preference,
    /// Damping factor in `[0.5, 1)`.
    pub damping: f64,
    /// Hard cap on message-passing rounds.
    pub max_iterations: usize,
    /// Number of consecutive rounds with unchanged exemplars required to stop.
    pub conv_iterations: usize,
}

impl Default for AffinityParams {
    fn default() -> Self {
        Self {
            preference: Preference::Median,
            damping: 0.8,
            max_iterations: 1000,
            conv_iterations: 100,
        }
    }
}

/// Result of an affinity propagation run.
#[derive(Debug, Clone)]
pub struct AffinityFit {
    /// Exemplar point indices, ascending.
    pub exemplars: Vec<usize>,
    /// Cluster label per point (index into `exemplars`).
    pub labels: Vec<usize>,
    /// One cluster per exemplar, in `exemplars` order.
    pub partition: Partition,
    /// Preference value placed on the diagonal.
    pub preference: f64,
    /// Rounds run.
    pub iterations: usize,
    /// Whether the exemplar set stabilized before the cap.
    pub converged: bool,
}

/// Affinity propagation clustering algorithm.
#[derive(Debug, Clone)]
pub struct AffinityPropagation {
    params: AffinityParams,
}

impl AffinityPropagation {
    /// Validate `params` and create the engine.
    pub fn new(params: AffinityParams) -> Result<Self> {
        if !(0.5..1.0).contains(&params.damping) {
            return Err(Error::InvalidParameter {
                name: "damping",
                message: "must be >= 0.5 and < 1",
            });
        }
        if let Preference::Value(v) = params.preference {
            if !v.is_finite() {
                return Err(Error::InvalidParameter {
                    name: "preference",
                    message: "must be 'median', 'min', or a finite number",
                });
            }
        }
        util::check_max_iterations(params.max_iterations)?;
        if params.conv_iterations == 0 {
            return Err(Error::InvalidParameter {
                name: "conv_iterations",
                message: "must be at least 1",
            });
        }
        Ok(Self { params })
    }

    /// The validated configuration.
    pub fn params(&self) -> &AffinityParams {
        &self.params
    }

    /// Run affinity propagation over `similarities`.
    pub fn fit(&self, similarities: &Similarities) -> Result<AffinityFit> {
        let n = similarities.len();
        let preference = self.preference_value(similarities);
        if n == 0 {
            return Ok(AffinityFit {
                exemplars: Vec::new(),
                labels: Vec::new(),
                partition: Partition::empty(),
                preference,
                iterations: 0,
                converged: true,
            });
        }

        if let Some(common) = uniform_similarity(similarities) {
            return Ok(degenerate_fit(n, common, preference));
        }

        let mut s = similarities.matrix.clone();
        for i in 0..n {
            s[[i, i]] = preference;
        }

        let damping = self.params.damping;
        let max_iterations = self.params.max_iterations;
        // No more than `max_iterations` rounds can ever be recorded.
        let window = self.params.conv_iterations.min(max_iterations);

        let mut r = Array2::<f64>::zeros((n, n));
        let mut a = Array2::<f64>::zeros((n, n));
        // Circular buffer of exemplar marks, one column per round.
        let mut marks = Array2::<bool>::from_elem((n, window), false);
        let mut iterations = 0;
        let mut converged = false;

        while iterations < max_iterations {
            update_responsibilities(&s, &a, &mut r, damping);
            update_availabilities(&r, &mut a, damping);

            let slot = iterations % window;
            iterations += 1;

            let mut any_exemplar = false;
            for i in 0..n {
                let is_exemplar = r[[i, i]] + a[[i, i]] > 0.0;
                marks[[i, slot]] = is_exemplar;
                any_exemplar |= is_exemplar;
            }

            if iterations >= window || iterations == max_iterations {
                let filled = iterations.min(window);
                let stable = marks.rows().into_iter().all(|row| {
                    let set = row.iter().take(filled).filter(|&&m| m).count();
                    set == 0 || set == filled
                });
                if stable && any_exemplar {
                    converged = true;
                    break;
                }
            }
        }

        if converged {
            debug!("affinity propagation converged after {iterations} iterations (n={n})");
        } else {
            debug!("affinity propagation stopped at the iteration cap ({iterations}) without converging");
        }

        let mut exemplars: Vec<usize> = (0..n).filter(|&i| r[[i, i]] + a[[i, i]] > 0.0).collect();
        if exemplars.is_empty() {
            let strongest = strongest_self_evidence(&r, &a);
            warn!("affinity propagation found no exemplar; using point {strongest} as the only one");
            exemplars.push(strongest);
        }

        let labels = attach(&s, &exemplars);
        let mut refined: Vec<usize> = exemplars
            .iter()
            .enumerate()
            .map(|(c, &incumbent)| {
                let members: Vec<usize> = (0..n).filter(|&i| labels[i] == c).collect();
                central_member(&s, &members, incumbent)
            })
            .collect();
        refined.sort_unstable();
        refined.dedup();

        let labels = attach(&s, &refined);
        let partition = Partition::from_labels(&labels, refined.len());

        Ok(AffinityFit {
            exemplars: refined,
            labels,
            partition,
            preference,
            iterations,
            converged,
        })
    }

    /// The diagonal value the configured preference policy yields for
    /// `similarities`.
    ///
    /// Statistics are taken over finite off-diagonal similarities only. When
    /// none is known, the preference falls back to 0.
    pub fn preference_value(&self, similarities: &Similarities) -> f64 {
        let policy = match self.params.preference {
            Preference::Value(v) => return v,
            policy => policy,
        };

        let mut known = similarities.known_off_diagonal();
        if known.is_empty() {
            if !similarities.is_empty() {
                warn!("no known similarities; using preference 0 instead of the {policy}");
            }
            return 0.0;
        }
        known.sort_by(|a, b| a.total_cmp(b));

        match policy {
            Preference::Min => known[0],
            _ => {
                let mid = known.len() / 2;
                if known.len() % 2 == 0 {
                    (known[mid - 1] + known[mid]) / 2.0
                } else {
                    known[mid]
                }
            }
        }
    }
}

impl Clustering for AffinityPropagation {
    /// Cluster points using negative squared Euclidean similarities.
    fn fit_predict(&self, points: &Points) -> Result<Vec<usize>> {
        Ok(self.fit(&Similarities::negative_squared_euclidean(points))?.labels)
    }

    fn n_clusters(&self) -> usize {
        0
    }

    fn partition(&self, points: &Points) -> Result<Partition> {
        Ok(self.fit(&Similarities::negative_squared_euclidean(points))?.partition)
    }
}

/// Row-wise responsibility update.
///
/// Each row's best candidate is measured against the runner-up so that it
/// cannot reinforce itself.
fn update_responsibilities(s: &Array2<f64>, a: &Array2<f64>, r: &mut Array2<f64>, damping: f64) {
    let n = s.nrows();
    for i in 0..n {
        let mut first = f64::NEG_INFINITY;
        let mut second = f64::NEG_INFINITY;
        let mut argmax = 0;
        for j in 0..n {
            let v = a[[i, j]] + s[[i, j]];
            if v > first {
                second = first;
                first = v;
                argmax = j;
            } else if v > second {
                second = v;
            }
        }

        for j in 0..n {
            let competitor = if j == argmax { second } else { first };
            let fresh = s[[i, j]] - competitor;
            r[[i, j]] = (1.0 - damping) * fresh + damping * r[[i, j]];
        }
    }
}

/// Column-wise availability update.
///
/// Only the diagonal responsibility can be unbounded (a point with no other
/// candidate), so the positive off-diagonal sum is accumulated separately and
/// `R[k,k]` is never subtracted from itself.
fn update_availabilities(r: &Array2<f64>, a: &mut Array2<f64>, damping: f64) {
    let n = r.nrows();
    for k in 0..n {
        let support: f64 = (0..n).filter(|&j| j != k).map(|j| r[[j, k]].max(0.0)).sum();
        let self_resp = r[[k, k]];
        for j in 0..n {
            let fresh = if j == k {
                support
            } else {
                (self_resp + support - r[[j, k]].max(0.0)).min(0.0)
            };
            a[[j, k]] = (1.0 - damping) * fresh + damping * a[[j, k]];
        }
    }
}

fn strongest_self_evidence(r: &Array2<f64>, a: &Array2<f64>) -> usize {
    let mut best = 0;
    for i in 1..r.nrows() {
        if r[[i, i]] + a[[i, i]] > r[[best, best]] + a[[best, best]] {
            best = i;
        }
    }
    best
}

/// Label every point with the index of its most similar exemplar.
///
/// Exemplars label themselves. Ties, including points with no known
/// similarity to any exemplar, go to the first exemplar.
fn attach(s: &Array2<f64>, exemplars: &[usize]) -> Vec<usize> {
    (0..s.nrows())
        .map(|i| {
            if let Some(own) = exemplars.iter().position(|&e| e == i) {
                return own;
            }
            let mut best = 0;
            for (c, &e) in exemplars.iter().enumerate().skip(1) {
                if s[[i, e]] > s[[i, exemplars[best]]] {
                    best = c;
                }
            }
            best
        })
        .collect()
}

/// Member with the highest summed similarity from the other members.
///
/// The incumbent exemplar wins ties.
fn central_member(s: &Array2<f64>, members: &[usize], incumbent: usize) -> usize {
    let score = |candidate: usize| -> f64 {
        members
            .iter()
            .filter(|&&j| j != candidate)
            .map(|&j| s[[j, candidate]])
            .sum()
    };

    let mut best = incumbent;
    let mut best_score = score(incumbent);
    for &candidate in members {
        let candidate_score = score(candidate);
        if candidate_score > best_score {
            best = candidate;
            best_score = candidate_score;
        }
    }
    best
}

/// The shared value when every off-diagonal similarity is known and equal.
fn uniform_similarity(similarities: &Similarities) -> Option<f64> {
    let n = similarities.len();
    if n < 2 {
        return None;
    }
    let known = similarities.known_off_diagonal();
    if known.len() != n * (n - 1) {
        return None;
    }
    let first = known[0];
    known.iter().all(|&v| v == first).then_some(first)
}

/// Result for perfectly symmetric input, where message passing cannot break
/// ties: one cluster when the preference is below the common similarity,
/// singletons otherwise.
fn degenerate_fit(n: usize, common: f64, preference: f64) -> AffinityFit {
    warn!("all similarities are equal; affinity propagation result is decided by the preference alone");
    let (exemplars, labels) = if preference < common {
        (vec![0], vec![0; n])
    } else {
        ((0..n).collect(), (0..n).collect())
    };
    let partition = Partition::from_labels(&labels, exemplars.len());
    AffinityFit {
        exemplars,
        labels,
        partition,
        preference,
        iterations: 0,
        converged: true,
    }
}
