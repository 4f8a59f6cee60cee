use crate::error::Result;
use crate::partition::Partition;
use crate::points::Points;
use ndarray::Array2;

/// Common interface for hard clustering algorithms (one label per point).
pub trait Clustering {
    /// Fit the model and return one cluster label per input point.
    ///
    /// An empty point set yields an empty label vector.
    fn fit_predict(&self, points: &Points) -> Result<Vec<usize>>;

    /// The configured number of clusters (if applicable).
    ///
    /// For algorithms that discover the number of clusters themselves
    /// (affinity propagation, agglomerative), this returns 0.
    fn n_clusters(&self) -> usize;

    /// Fit the model and return the partition.
    fn partition(&self, points: &Points) -> Result<Partition> {
        let labels = self.fit_predict(points)?;
        Ok(Partition::from_labels(&labels, self.n_clusters()))
    }
}

/// Clustering algorithms that also produce soft assignments.
pub trait SoftClustering: Clustering {
    /// Fit and return the `n × k` membership matrix.
    ///
    /// Entry `[i, c]` is the degree to which point `i` belongs to cluster `c`;
    /// every row sums to 1.
    fn fit_predict_proba(&self, points: &Points) -> Result<Array2<f64>>;
}
