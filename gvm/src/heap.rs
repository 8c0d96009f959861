use crate::cluster::Cluster;
use crate::pair::ClusterPair;
use crate::space::VectorSpace;

/// Handle to a [`ClusterPair`] in the pool owned by [`PairHeap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct PairId(usize);

/// Binary min-heap of cluster pairs keyed by merge cost.
///
/// Pairs live in a fixed-size pool sized for every unordered pair of
/// `capacity` clusters; the heap array holds handles into that pool. Every
/// pair records its own heap position, so removing or re-sorting an
/// arbitrary pair is O(log n) without a search.
///
/// Ties in merge cost are broken by array position.
pub(crate) struct PairHeap {
    pool: Vec<ClusterPair>,
    free: Vec<PairId>,
    max_pairs: usize,
    heap: Vec<PairId>,
}

impl PairHeap {
    /// Creates an empty heap able to hold every pair of `capacity` clusters.
    pub(crate) fn new(capacity: usize) -> Self {
        let max_pairs = capacity * capacity.saturating_sub(1) / 2;
        Self {
            pool: Vec::with_capacity(max_pairs),
            free: Vec::new(),
            max_pairs,
            heap: Vec::with_capacity(max_pairs),
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.heap.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub(crate) fn get(&self, id: PairId) -> &ClusterPair {
        &self.pool[id.0]
    }

    /// The cheapest pair, or `None` when empty.
    pub(crate) fn peek(&self) -> Option<PairId> {
        self.heap.first().copied()
    }

    /// Stores `pair` in the pool and queues it.
    pub(crate) fn insert(&mut self, pair: ClusterPair) -> PairId {
        let id = match self.free.pop() {
            Some(id) => {
                self.pool[id.0] = pair;
                id
            }
            None => {
                assert!(
                    self.pool.len() < self.max_pairs,
                    "gvm: pair pool exhausted ({} pairs)",
                    self.max_pairs
                );
                self.pool.push(pair);
                PairId(self.pool.len() - 1)
            }
        };
        self.add(id);
        id
    }

    /// Dequeues `id` if queued and returns it to the pool.
    pub(crate) fn release(&mut self, id: PairId) {
        if self.pool[id.0].index.is_some() {
            self.remove(id);
        }
        self.free.push(id);
    }

    /// Queues a pooled pair that is not currently in the heap.
    pub(crate) fn add(&mut self, id: PairId) {
        debug_assert!(self.pool[id.0].index.is_none(), "gvm: pair already queued");
        let i = self.heap.len();
        self.heap.push(id);
        self.sift_up(i, id);
    }

    /// Removes a queued pair. Panics if the pair is not in the heap.
    pub(crate) fn remove(&mut self, id: PairId) {
        let i = self.index_of(id);
        self.remove_at(i);
    }

    /// Recomputes the pair's merge cost and restores heap order around it.
    /// Panics if the pair is not in the heap.
    pub(crate) fn reprioritize<K>(
        &mut self,
        id: PairId,
        space: &VectorSpace,
        clusters: &[Cluster<K>],
    ) {
        let i = self.index_of(id);
        self.pool[id.0].update(space, clusters);
        let value = self.pool[id.0].value;
        if i > 0 && self.value_at((i - 1) >> 1) > value {
            self.sift_up(i, id);
        } else {
            self.sift_down(i, id);
        }
    }

    /// Drops every pair, queued or not.
    pub(crate) fn clear(&mut self) {
        self.pool.clear();
        self.free.clear();
        self.heap.clear();
    }

    fn index_of(&self, id: PairId) -> usize {
        match self.pool[id.0].index {
            Some(i) => i,
            None => panic!("gvm: pair {id:?} is not in the heap"),
        }
    }

    fn value_at(&self, i: usize) -> f64 {
        self.pool[self.heap[i].0].value
    }

    fn place(&mut self, k: usize, id: PairId) {
        self.heap[k] = id;
        self.pool[id.0].index = Some(k);
    }

    fn remove_at(&mut self, i: usize) {
        let removed = self.heap[i];
        self.pool[removed.0].index = None;
        let Some(moved) = self.heap.pop() else {
            return;
        };
        if moved == removed {
            // removed the last element
            return;
        }
        self.sift_down(i, moved);
        if self.heap[i] == moved {
            self.sift_up(i, moved);
        }
    }

    fn sift_up(&mut self, mut k: usize, id: PairId) {
        let value = self.pool[id.0].value;
        while k > 0 {
            let parent = (k - 1) >> 1;
            let e = self.heap[parent];
            if value >= self.pool[e.0].value {
                break;
            }
            self.place(k, e);
            k = parent;
        }
        self.place(k, id);
    }

    fn sift_down(&mut self, mut k: usize, id: PairId) {
        let value = self.pool[id.0].value;
        let size = self.heap.len();
        let half = size >> 1;
        while k < half {
            let mut child = (k << 1) + 1;
            let right = child + 1;
            if right < size && self.value_at(child) > self.value_at(right) {
                child = right;
            }
            let c = self.heap[child];
            if value <= self.pool[c.0].value {
                break;
            }
            self.place(k, c);
            k = child;
        }
        self.place(k, id);
    }

    /// Checks the min-heap property and the stored back-indices.
    #[cfg(test)]
    pub(crate) fn is_valid(&self) -> bool {
        self.heap.iter().enumerate().all(|(i, &id)| {
            let indexed = self.pool[id.0].index == Some(i);
            let ordered = i == 0 || self.value_at((i - 1) >> 1) <= self.pool[id.0].value;
            indexed && ordered
        })
    }
}
