//! Clustering algorithms for grouping similar items.
//!
//! Every engine reads a [`Points`](crate::Points) matrix (or, for affinity
//! propagation, a [`Similarities`] matrix) and returns a
//! [`Partition`](crate::Partition): an ordered list of clusters of point
//! indices.
//!
//! ## Hard vs Soft Clustering
//!
//! **Hard clustering** assigns each item to exactly one cluster. Simple, but
//! loses information when items genuinely span multiple groups.
//!
//! **Soft clustering** gives each item a degree of membership in every cluster.
//! [`FuzzyCMeans`] produces such a membership matrix (each row sums to 1) and
//! also derives a hard partition from it.
//!
//! ## Algorithms
//!
//! ### K-means
//!
//! Assign each point to the nearest centroid, then move each centroid to the
//! mean of its points. Repeat.
//!
//! ```text
//! J = Σ_k Σ_{x ∈ C_k} ||x - μ_k||²
//! ```
//!
//! **Assumptions**: roughly spherical clusters of similar size, and a known k.
//! [`suggested_k`] gives the `√(n/2)` rule of thumb when k is unknown.
//!
//! ### K-medoids
//!
//! Like k-means, but every representative is an actual input point, chosen to
//! minimize the summed distance to its members. Less sensitive to outliers and
//! valid for any metric.
//!
//! ### Fuzzy C-means
//!
//! Soft k-means: memberships decay with relative distance, controlled by the
//! fuzziness exponent `m > 1`.
//!
//! ### Affinity propagation
//!
//! Message passing over pairwise similarities. Every point competes to be an
//! exemplar; the number of clusters follows from the preference value rather
//! than being given.
//!
//! ### Agglomerative
//!
//! Bottom-up merging of the closest clusters under a linkage rule, until the
//! closest pair is at least a distance threshold apart.
//!
//! ## Usage
//!
//! ```rust
//! use nodeclust::cluster::{
//!     Agglomerative, AgglomerativeParams, AffinityPropagation, AffinityParams, Clustering,
//!     FuzzyCMeans, Kmeans, KmeansParams,
//! };
//! use nodeclust::Points;
//!
//! let points = Points::from_rows(&[
//!     vec![0.0, 0.0],
//!     vec![0.1, 0.1],
//!     vec![10.0, 10.0],
//!     vec![10.1, 10.1],
//! ])
//! .unwrap();
//!
//! // Hard clustering with k-means (fixed seed for reproducibility)
//! let kmeans = Kmeans::new(KmeansParams { seed: Some(7), ..KmeansParams::new(2) }).unwrap();
//! let partition = kmeans.partition(&points).unwrap();
//! assert_eq!(partition.n_points(), 4);
//!
//! // Soft clustering: one membership row per point
//! let fit = FuzzyCMeans::with_k(2).unwrap().fit(&points).unwrap();
//! assert_eq!(fit.membership.nrows(), 4);
//!
//! // Cluster count discovered from the data
//! let ap = AffinityPropagation::new(AffinityParams::default()).unwrap();
//! let labels = ap.fit_predict(&points).unwrap();
//! assert_eq!(labels[0], labels[1]);
//! assert_ne!(labels[0], labels[2]);
//!
//! let merged = Agglomerative::new(AgglomerativeParams { threshold: 1.0, ..Default::default() })
//!     .unwrap()
//!     .partition(&points)
//!     .unwrap();
//! assert_eq!(merged.clusters(), &[vec![0, 1], vec![2, 3]]);
//! ```

mod affinity;
mod agglomerative;
mod assign;
mod fcm;
mod kmeans;
mod kmedoids;
mod metric;
mod traits;
mod util;

pub use affinity::{AffinityFit, AffinityParams, AffinityPropagation, Preference, Similarities};
pub use agglomerative::{
    Agglomerative, AgglomerativeFit, AgglomerativeParams, Linkage, Merge, NearestCache,
};
pub use fcm::{FuzzyCMeans, FuzzyFit, FuzzyParams};
pub use kmeans::{suggested_k, Kmeans, KmeansFit, KmeansInit, KmeansParams};
pub use kmedoids::{Kmedoids, KmedoidsFit, KmedoidsParams};
pub use metric::Distance;
pub use traits::{Clustering, SoftClustering};
