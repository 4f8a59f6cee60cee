//! Agglomerative (bottom-up) hierarchical clustering.
//!
//! Every point starts as its own cluster. The two closest clusters are merged
//! repeatedly until the closest remaining pair is at least `threshold` apart.
//! The number of clusters is therefore an outcome, not an input.
//!
//! # Linkage
//!
//! How the distance from a merged cluster to every other cluster is derived
//! from the two clusters it replaces:
//!
//! | Linkage | Merged distance |
//! |---------|-----------------|
//! | Single | min(d(A,C), d(B,C)) |
//! | Complete | max(d(A,C), d(B,C)) |
//! | Average | (\|A\|·d(A,C) + \|B\|·d(B,C)) / (\|A\| + \|B\|) |
//! | FirstMember | d(first point of A, first point of C) |
//!
//! # Nearest-neighbour cache
//!
//! Finding the closest pair by scanning the whole distance matrix costs O(k²)
//! per merge. Instead each cluster remembers its nearest neighbour
//! ([`NearestCache`]); the closest pair is the best cached entry, and after a
//! merge only the clusters whose cached neighbour took part in it are
//! rescanned. Single, complete and average linkage never bring a merged cluster
//! closer to a third cluster than both of its parts were, so the untouched
//! entries stay valid. Every other entry adopts the merged cluster when it is
//! now closer than the cached neighbour, or equally close and earlier in order
//! (which `FirstMember` linkage can cause).
//!
//! # Complexity
//!
//! O(n²) memory for the distance matrix; O(n²) time to build it, plus O(n)
//! per merge and a rescan for each invalidated cache entry.

use super::metric::Distance;
use super::traits::Clustering;
use crate::error::{Error, Result};
use crate::partition::Partition;
use crate::points::Points;
use log::debug;
use ndarray::Array2;
use std::fmt;
use std::str::FromStr;

/// Rule for the distance between two clusters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Linkage {
    /// Minimum distance between members.
    #[default]
    Single,
    /// Maximum distance between members.
    Complete,
    /// Size-weighted mean of the merged parts' distances.
    Average,
    /// Distance between the clusters' first members.
    FirstMember,
}

impl FromStr for Linkage {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(Linkage::Single),
            "complete" => Ok(Linkage::Complete),
            "average" => Ok(Linkage::Average),
            _ => Err(Error::UnknownOption {
                option: "linkage",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Linkage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Linkage::Single => "single",
            Linkage::Complete => "complete",
            Linkage::Average => "average",
            Linkage::FirstMember => "first-member",
        })
    }
}

/// Agglomerative clustering configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AgglomerativeParams {
    /// Point-to-point metric.
    pub distance: Distance,
    /// Cluster-to-cluster rule.
    pub linkage: Linkage,
    /// Merging stops once the closest pair is at least this far apart.
    pub threshold: f64,
}

impl Default for AgglomerativeParams {
    fn default() -> Self {
        Self {
            distance: Distance::Euclidean,
            linkage: Linkage::Single,
            threshold: 10.0,
        }
    }
}

/// One merge step.
///
/// Clusters are identified by the index of the point that founded them; the
/// survivor keeps its identity and absorbs the other cluster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Merge {
    /// Cluster that remains.
    pub survivor: usize,
    /// Cluster merged into the survivor.
    pub absorbed: usize,
    /// Linkage distance at which the merge happened.
    pub distance: f64,
    /// Size of the merged cluster.
    pub size: usize,
}

/// Result of an agglomerative run.
#[derive(Debug, Clone)]
pub struct AgglomerativeFit {
    /// Clusters remaining when merging stopped.
    pub partition: Partition,
    /// Cluster label per point.
    pub labels: Vec<usize>,
    /// Merges in the order they happened.
    pub merges: Vec<Merge>,
}

/// Agglomerative clustering algorithm.
#[derive(Debug, Clone)]
pub struct Agglomerative {
    params: AgglomerativeParams,
}

impl Agglomerative {
    /// Validate `params` and create the engine.
    pub fn new(params: AgglomerativeParams) -> Result<Self> {
        if params.threshold.is_nan() || params.threshold < 0.0 {
            return Err(Error::InvalidParameter {
                name: "threshold",
                message: "must be a non-negative number",
            });
        }
        Ok(Self { params })
    }

    /// The validated configuration.
    pub fn params(&self) -> &AgglomerativeParams {
        &self.params
    }

    /// Run agglomerative clustering on `points`.
    pub fn fit(&self, points: &Points) -> Result<AgglomerativeFit> {
        let n = points.len();
        let metric = self.params.distance;

        let mut dists = Array2::from_elem((n, n), f64::INFINITY);
        for i in 0..n {
            for j in (i + 1)..n {
                let d = metric.distance(points.row(i), points.row(j));
                dists[[i, j]] = d;
                dists[[j, i]] = d;
            }
        }

        // Active clusters in output order; `active[c]` is the founding point of cluster c.
        let mut active: Vec<usize> = (0..n).collect();
        let mut members: Vec<Vec<usize>> = (0..n).map(|i| vec![i]).collect();
        let mut cache = NearestCache::build(&dists, &active);
        let mut merges = Vec::new();

        while let Some((survivor, absorbed, distance)) = cache.closest_pair(&dists, &active) {
            if distance >= self.params.threshold {
                break;
            }

            let (survivor_size, absorbed_size) = (members[survivor].len(), members[absorbed].len());
            let moved = std::mem::take(&mut members[absorbed]);
            members[survivor].extend(moved);
            active.retain(|&key| key != absorbed);

            for &other in &active {
                if other == survivor {
                    continue;
                }
                let d = match self.params.linkage {
                    Linkage::Single => dists[[survivor, other]].min(dists[[absorbed, other]]),
                    Linkage::Complete => dists[[survivor, other]].max(dists[[absorbed, other]]),
                    Linkage::Average => {
                        (dists[[survivor, other]] * survivor_size as f64
                            + dists[[absorbed, other]] * absorbed_size as f64)
                            / (survivor_size + absorbed_size) as f64
                    }
                    Linkage::FirstMember => {
                        let (a, b) = (members[other][0], members[survivor][0]);
                        metric.distance(points.row(a), points.row(b))
                    }
                };
                dists[[survivor, other]] = d;
                dists[[other, survivor]] = d;
            }

            cache.refresh(&dists, &active, survivor, absorbed);
            merges.push(Merge {
                survivor,
                absorbed,
                distance,
                size: survivor_size + absorbed_size,
            });
        }

        debug!(
            "agglomerative clustering: {} merges, {} clusters (linkage={}, threshold={})",
            merges.len(),
            active.len(),
            self.params.linkage,
            self.params.threshold
        );

        let clusters: Vec<Vec<usize>> = active
            .iter()
            .map(|&key| std::mem::take(&mut members[key]))
            .collect();
        let partition = Partition::from_clusters(clusters);
        let labels = partition.labels();
        Ok(AgglomerativeFit {
            partition,
            labels,
            merges,
        })
    }
}

impl Clustering for Agglomerative {
    fn fit_predict(&self, points: &Points) -> Result<Vec<usize>> {
        Ok(self.fit(points)?.labels)
    }

    fn n_clusters(&self) -> usize {
        0
    }

    fn partition(&self, points: &Points) -> Result<Partition> {
        Ok(self.fit(points)?.partition)
    }
}

/// Per-cluster cached nearest neighbour over a symmetric distance matrix.
///
/// Invariant: for every active key `k`, `nearest[k]` is an active key
/// minimizing `dists[k][·]` (first in `active` order on ties), or `k` itself
/// when no other cluster is active. The diagonal of `dists` must be `+∞` and
/// `active` must be ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NearestCache {
    nearest: Vec<usize>,
}

impl NearestCache {
    /// Scan every active pair once.
    pub fn build(dists: &Array2<f64>, active: &[usize]) -> Self {
        let mut nearest: Vec<usize> = (0..dists.nrows()).collect();
        for &key in active {
            nearest[key] = scan(dists, active, key);
        }
        Self { nearest }
    }

    /// Cached nearest neighbour of `key`.
    pub fn nearest(&self, key: usize) -> usize {
        self.nearest[key]
    }

    /// Closest active pair `(key, its nearest, distance)` read from the cache.
    ///
    /// `None` when fewer than two clusters are active.
    pub fn closest_pair(
        &self,
        dists: &Array2<f64>,
        active: &[usize],
    ) -> Option<(usize, usize, f64)> {
        if active.len() < 2 {
            return None;
        }
        let mut best: Option<(usize, usize, f64)> = None;
        for &key in active {
            let other = self.nearest[key];
            let d = dists[[key, other]];
            if best.map_or(true, |(_, _, best_d)| d < best_d) {
                best = Some((key, other, d));
            }
        }
        best
    }

    /// Restore the invariant after `absorbed` was merged into `survivor` and
    /// the survivor's distances were rewritten.
    ///
    /// Only entries that pointed at either merged cluster are rescanned.
    pub fn refresh(
        &mut self,
        dists: &Array2<f64>,
        active: &[usize],
        survivor: usize,
        absorbed: usize,
    ) {
        for &key in active {
            let current = self.nearest[key];
            if current == survivor || current == absorbed {
                self.nearest[key] = scan(dists, active, key);
            } else if key != survivor {
                let (to_survivor, to_current) = (dists[[key, survivor]], dists[[key, current]]);
                if to_survivor < to_current || (to_survivor == to_current && survivor < current) {
                    self.nearest[key] = survivor;
                }
            }
        }
    }
}

fn scan(dists: &Array2<f64>, active: &[usize], key: usize) -> usize {
    let mut best = key;
    for &other in active {
        if dists[[key, other]] < dists[[key, best]] {
            best = other;
        }
    }
    best
}
