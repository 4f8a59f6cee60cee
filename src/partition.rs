//! Partitions: the output shape shared by every engine.

/// An ordered list of disjoint clusters of point indices.
///
/// Each cluster lists its members in ascending index order. Hard-clustering
/// engines guarantee that every input point appears in exactly one cluster;
/// clusters may be empty when an engine keeps a fixed number of slots
/// (k-means, fuzzy c-means) and a slot received no points.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Partition {
    clusters: Vec<Vec<usize>>,
    n_points: usize,
}

impl Partition {
    /// An empty partition (no points, no clusters).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a partition with `n_clusters` slots from one label per point.
    ///
    /// Labels `>= n_clusters` grow the slot count so no point is dropped.
    pub fn from_labels(labels: &[usize], n_clusters: usize) -> Self {
        let slots = labels.iter().map(|&l| l + 1).max().unwrap_or(0).max(n_clusters);
        let mut clusters: Vec<Vec<usize>> = vec![Vec::new(); slots];
        for (i, &label) in labels.iter().enumerate() {
            clusters[label].push(i);
        }
        Self {
            clusters,
            n_points: labels.len(),
        }
    }

    /// Build a partition from explicit clusters, sorting each cluster's members.
    ///
    /// Callers are responsible for the clusters being disjoint.
    pub fn from_clusters(mut clusters: Vec<Vec<usize>>) -> Self {
        let n_points = clusters.iter().map(Vec::len).sum();
        for cluster in &mut clusters {
            cluster.sort_unstable();
        }
        Self { clusters, n_points }
    }

    /// The clusters, in engine order.
    pub fn clusters(&self) -> &[Vec<usize>] {
        &self.clusters
    }

    /// Consume the partition, returning its clusters.
    pub fn into_clusters(self) -> Vec<Vec<usize>> {
        self.clusters
    }

    /// Number of cluster slots (including empty ones).
    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    /// Whether the partition has no clusters.
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Number of clusters that received at least one point.
    pub fn non_empty(&self) -> usize {
        self.clusters.iter().filter(|c| !c.is_empty()).count()
    }

    /// Total number of points covered.
    pub fn n_points(&self) -> usize {
        self.n_points
    }

    /// One cluster label per point (the inverse of [`Partition::from_labels`]).
    pub fn labels(&self) -> Vec<usize> {
        let mut labels = vec![0usize; self.n_points];
        for (c, members) in self.clusters.iter().enumerate() {
            for &i in members {
                labels[i] = c;
            }
        }
        labels
    }

    /// Iterate over clusters.
    pub fn iter(&self) -> std::slice::Iter<'_, Vec<usize>> {
        self.clusters.iter()
    }
}

impl<'a> IntoIterator for &'a Partition {
    type Item = &'a Vec<usize>;
    type IntoIter = std::slice::Iter<'a, Vec<usize>>;

    fn into_iter(self) -> Self::IntoIter {
        self.clusters.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip() {
        let labels = vec![1, 0, 1, 2, 0];
        let partition = Partition::from_labels(&labels, 3);
        assert_eq!(partition.clusters(), &[vec![1, 4], vec![0, 2], vec![3]]);
        assert_eq!(partition.labels(), labels);
        assert_eq!(partition.n_points(), 5);
    }

    #[test]
    fn empty_slots_are_kept() {
        let partition = Partition::from_labels(&[0, 0, 2], 4);
        assert_eq!(partition.len(), 4);
        assert_eq!(partition.non_empty(), 2);
        assert!(partition.clusters()[1].is_empty());
        assert!(partition.clusters()[3].is_empty());
    }

    #[test]
    fn from_clusters_sorts_members() {
        let partition = Partition::from_clusters(vec![vec![3, 0], vec![2, 1]]);
        assert_eq!(partition.clusters(), &[vec![0, 3], vec![1, 2]]);
        assert_eq!(partition.labels(), vec![0, 1, 1, 0]);
    }

    #[test]
    fn empty_partition() {
        let partition = Partition::empty();
        assert!(partition.is_empty());
        assert_eq!(partition.n_points(), 0);
        assert!(partition.labels().is_empty());
    }
}
