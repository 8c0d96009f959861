use crate::cluster::Cluster;
use crate::space::VectorSpace;

/// A candidate merge between two clusters, identified by arena slot.
///
/// `value` caches the increase in total variance that merging the two
/// clusters would cause and is the pair's priority in the
/// [`PairHeap`](crate::heap::PairHeap).
#[derive(Debug, Clone)]
pub(crate) struct ClusterPair {
    pub(crate) c1: usize,
    pub(crate) c2: usize,
    /// Position in the heap array, `None` while not queued.
    pub(crate) index: Option<usize>,
    pub(crate) value: f64,
}

impl ClusterPair {
    /// Creates a pair and computes its merge cost. Panics if `c1 == c2`.
    pub(crate) fn new<K>(
        c1: usize,
        c2: usize,
        space: &VectorSpace,
        clusters: &[Cluster<K>],
    ) -> Self {
        assert_ne!(c1, c2, "gvm: a cluster cannot be paired with itself");
        let mut pair = Self {
            c1,
            c2,
            index: None,
            value: 0.0,
        };
        pair.update(space, clusters);
        pair
    }

    /// Recomputes the merge cost from the current cluster statistics.
    pub(crate) fn update<K>(&mut self, space: &VectorSpace, clusters: &[Cluster<K>]) {
        let c1 = &clusters[self.c1];
        let c2 = &clusters[self.c2];
        self.value = c1.test_cluster(space, c2) - c1.var - c2.var;
    }

    /// The endpoint that is not `slot`.
    pub(crate) fn other(&self, slot: usize) -> usize {
        if self.c1 == slot { self.c2 } else { self.c1 }
    }
}
