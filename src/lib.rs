//! Clustering of attribute vectors.
//!
//! `nodeclust` groups items by the numeric attributes extracted from them.
//! Items become rows of a [`Points`] matrix (directly, or through a
//! [`Fields`] extractor); the engines under [`cluster`] turn that matrix into
//! a [`Partition`] of point indices:
//! - k-means and k-medoids (fixed k, centroid or medoid representatives)
//! - fuzzy c-means (soft memberships plus a derived hard partition)
//! - affinity propagation (exemplars discovered from pairwise similarities)
//! - agglomerative clustering (threshold-stopped merging under a linkage rule)

#![forbid(unsafe_code)]

pub mod cluster;
pub mod error;
pub mod partition;
pub mod points;

pub use cluster::{
    suggested_k, AffinityFit, AffinityParams, AffinityPropagation, Agglomerative,
    AgglomerativeFit, AgglomerativeParams, Clustering, Distance, FuzzyCMeans, FuzzyFit,
    FuzzyParams, Kmeans, KmeansFit, KmeansInit, KmeansParams, Kmedoids, KmedoidsFit,
    KmedoidsParams, Linkage, Merge, Preference, Similarities, SoftClustering,
};
pub use error::{Error, Result};
pub use partition::Partition;
pub use points::{Attributes, Fields, Points};
