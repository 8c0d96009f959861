use serde::Deserialize;
use tracing::{debug, trace};

use crate::cluster::Cluster;
use crate::error::GvmError;
use crate::heap::{PairHeap, PairId};
use crate::keyer::{DefaultKeyer, Keyer};
use crate::pair::ClusterPair;
use crate::result::ClusterResult;
use crate::space::VectorSpace;

/// Parameters for [`Clusters::reduce_with`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReduceOptions {
    /// Stop before the normalized total variance would exceed this value.
    /// `None` means unbounded.
    pub max_variance: Option<f64>,

    /// Never reduce below this many clusters.
    pub min_clusters: usize,
}

/// Maintains at most `capacity` clusters over a stream of weighted points.
///
/// Every [`add`](Clusters::add) either extends the existing cluster whose
/// variance grows least, or merges the cheapest pair of clusters to free a
/// slot for the new point, whichever increases total variance less.
///
/// All cluster and pair storage is allocated at construction; clusters and
/// pairs refer to each other by arena index. Not thread-safe: wrap in a
/// lock if it must be shared.
pub struct Clusters<K> {
    capacity: usize,
    space: VectorSpace,
    keyer: Box<dyn Keyer<K>>,
    /// Cluster arena, one slot per unit of capacity.
    slots: Vec<Cluster<K>>,
    /// Unused slots, popped from the back.
    free: Vec<usize>,
    /// Live slots in result order.
    live: Vec<usize>,
    pairs: PairHeap,
    additions: usize,
}

impl<K> Clusters<K> {
    /// Creates an empty engine with the default (representative) keyer.
    pub fn new(space: VectorSpace, capacity: usize) -> Result<Self, GvmError> {
        Self::with_keyer(space, capacity, DefaultKeyer)
    }

    /// Creates an empty engine using `keyer` to combine keys.
    pub fn with_keyer(
        space: VectorSpace,
        capacity: usize,
        keyer: impl Keyer<K> + 'static,
    ) -> Result<Self, GvmError> {
        if capacity == 0 {
            return Err(GvmError::InvalidCapacity(capacity));
        }
        let slots = (0..capacity).map(|_| Cluster::new(&space, capacity)).collect();
        Ok(Self {
            capacity,
            space,
            keyer: Box::new(keyer),
            slots,
            free: (0..capacity).rev().collect(),
            live: Vec::with_capacity(capacity),
            pairs: PairHeap::new(capacity),
            additions: 0,
        })
    }

    /// The greatest number of clusters that will be kept.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The space the points live in.
    pub fn space(&self) -> &VectorSpace {
        &self.space
    }

    /// The keyer in use.
    pub fn keyer(&self) -> &dyn Keyer<K> {
        self.keyer.as_ref()
    }

    /// Replaces the keyer. Keys already held by clusters are kept as-is.
    pub fn set_keyer(&mut self, keyer: impl Keyer<K> + 'static) {
        self.keyer = Box::new(keyer);
    }

    /// Current number of clusters.
    pub fn count(&self) -> usize {
        self.live.len()
    }

    /// Returns true if no clusters exist.
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Number of points with non-zero mass added since creation or [`clear`](Clusters::clear).
    pub fn additions(&self) -> usize {
        self.additions
    }

    /// Live clusters in slot order.
    pub fn clusters(&self) -> impl Iterator<Item = &Cluster<K>> + '_ {
        self.live.iter().map(|&slot| &self.slots[slot])
    }

    /// Removes all clusters and pairs. The keyer and space are retained.
    pub fn clear(&mut self) {
        for &slot in &self.live {
            self.slots[slot].clear(&self.space);
            self.slots[slot].pairs.clear();
        }
        self.live.clear();
        self.free = (0..self.capacity).rev().collect();
        self.pairs.clear();
        self.additions = 0;
        debug!("gvm: cleared {} slots", self.capacity);
    }

    /// Adds a point with mass `m` and an optional key.
    ///
    /// A zero mass is silently ignored. Negative or non-finite masses and
    /// points of the wrong dimension are rejected without touching state.
    pub fn add(&mut self, m: f64, pt: &[f64], key: Option<K>) -> Result<(), GvmError> {
        let dim = self.space.dimensions();
        if pt.len() != dim {
            return Err(GvmError::DimensionMismatch {
                expected: dim,
                got: pt.len(),
            });
        }
        if !m.is_finite() || m < 0.0 {
            return Err(GvmError::InvalidMass(m));
        }
        if pt.iter().any(|c| !c.is_finite()) {
            return Err(GvmError::NonFinitePoint);
        }
        if m == 0.0 {
            return Ok(());
        }

        if self.live.len() < self.capacity {
            self.grow(m, pt, key);
        } else {
            self.absorb(m, pt, key);
        }
        self.additions += 1;
        Ok(())
    }

    /// Merges clusters until `min_clusters` remain or the next merge would
    /// push the mass-normalized total variance above `max_variance`.
    ///
    /// A negative `max_variance` means unbounded.
    pub fn reduce(&mut self, max_variance: f64, min_clusters: usize) -> Result<(), GvmError> {
        if max_variance.is_nan() {
            return Err(GvmError::InvalidMaxVariance(max_variance));
        }
        let before = self.live.len();
        if before <= min_clusters {
            return Ok(());
        }

        let mut total_var = 0.0;
        let mut total_mass = 0.0;
        for &slot in &self.live {
            total_var += self.slots[slot].var;
            total_mass += self.slots[slot].m0;
        }

        let mut count = before;
        while count > min_clusters {
            if count == 1 {
                // No pair left: retire the last cluster outright.
                let last = self.live.iter().copied().find(|&s| !self.slots[s].removed);
                if let Some(slot) = last {
                    self.slots[slot].removed = true;
                }
            } else {
                let Some(id) = self.pairs.peek() else {
                    break;
                };
                let (c1, c2) = self.heavier_first(id);
                if max_variance >= 0.0 && total_mass > 0.0 {
                    total_var += self.pairs.get(id).value;
                    if total_var / total_mass > max_variance {
                        break;
                    }
                }
                self.merge(c1, c2);
                self.remove_pairs(c2);
                self.slots[c2].removed = true;
            }
            count -= 1;
        }

        self.compact();
        debug!(
            "gvm: reduced {} clusters to {} (max_variance={}, min_clusters={})",
            before,
            self.live.len(),
            max_variance,
            min_clusters
        );
        Ok(())
    }

    /// [`reduce`](Clusters::reduce) driven by [`ReduceOptions`].
    pub fn reduce_with(&mut self, opts: &ReduceOptions) -> Result<(), GvmError> {
        self.reduce(opts.max_variance.unwrap_or(-1.0), opts.min_clusters)
    }

    /// Summaries of the live clusters in slot order.
    pub fn results(&self) -> Vec<ClusterResult<K>>
    where
        K: Clone,
    {
        self.clusters()
            .map(|c| ClusterResult::project(c, c.key.clone()))
            .collect()
    }

    /// Like [`results`](Clusters::results) but moves the keys out instead of
    /// cloning them.
    pub fn into_results(mut self) -> Vec<ClusterResult<K>> {
        let live = std::mem::take(&mut self.live);
        live.into_iter()
            .map(|slot| {
                let key = self.slots[slot].key.take();
                ClusterResult::project(&self.slots[slot], key)
            })
            .collect()
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    /// Growth phase: the point becomes a new singleton cluster.
    fn grow(&mut self, m: f64, pt: &[f64], key: Option<K>) {
        let slot = self
            .free
            .pop()
            .expect("gvm: a free slot exists while below capacity");
        let cluster = &mut self.slots[slot];
        cluster.clear(&self.space);
        cluster.pairs.clear();
        cluster.set(&self.space, m, pt);
        self.add_pairs(slot);
        self.slots[slot].key = self.keyer.add_key(None, key);
        self.live.push(slot);
    }

    /// Steady state: add to the cheapest cluster or merge the cheapest pair,
    /// whichever costs less.
    fn absorb(&mut self, m: f64, pt: &[f64], key: Option<K>) {
        let merge_t = self.pairs.peek().map_or(f64::MAX, |id| self.pairs.get(id).value);

        let mut cheapest: Option<(usize, f64)> = None;
        for &slot in &self.live {
            let t = self.slots[slot].test(&self.space, m, pt);
            if cheapest.is_none_or(|(_, best)| t < best) {
                cheapest = Some((slot, t));
            }
        }
        let (slot, addition_t) = cheapest.expect("gvm: live clusters exist at capacity");

        match self.pairs.peek() {
            Some(id) if merge_t < addition_t => {
                let (c1, c2) = self.heavier_first(id);
                trace!("gvm: merge {} into {} (cost {})", c2, c1, merge_t);
                self.merge(c1, c2);
                // The vacated cluster takes the new point.
                let cluster = &mut self.slots[c2];
                cluster.set(&self.space, m, pt);
                cluster.key = None;
                self.update_pairs(c2);
                self.slots[c2].key = self.keyer.add_key(None, key);
            }
            _ => {
                trace!("gvm: add to {} (cost {})", slot, addition_t);
                self.slots[slot].add(&self.space, m, pt);
                self.update_pairs(slot);
                let existing = self.slots[slot].key.take();
                self.slots[slot].key = self.keyer.add_key(existing, key);
            }
        }
    }

    /// Endpoints of a pair, more massive cluster first.
    fn heavier_first(&self, id: PairId) -> (usize, usize) {
        let pair = self.pairs.get(id);
        if self.slots[pair.c1].m0 < self.slots[pair.c2].m0 {
            (pair.c2, pair.c1)
        } else {
            (pair.c1, pair.c2)
        }
    }

    /// Folds `c2` into `c1`, combining keys, and re-sorts `c1`'s pairs.
    /// `c2`'s statistics are left in place for the caller to reset or retire.
    fn merge(&mut self, c1: usize, c2: usize) {
        let k1 = self.slots[c1].key.take();
        let k2 = self.slots[c2].key.take();
        self.slots[c1].key = self.keyer.merge_keys(k1, k2);

        let (dst, src) = split_pair(&mut self.slots, c1, c2);
        dst.add_cluster(&self.space, src);
        self.update_pairs(c1);
    }

    /// Pairs the cluster in `slot` with every live cluster.
    fn add_pairs(&mut self, slot: usize) {
        for n in 0..self.live.len() {
            let other = self.live[n];
            let id = self
                .pairs
                .insert(ClusterPair::new(other, slot, &self.space, &self.slots));
            self.slots[other].pairs.push(id);
            self.slots[slot].pairs.push(id);
        }
    }

    /// Re-sorts every queued pair of the cluster in `slot`.
    fn update_pairs(&mut self, slot: usize) {
        for n in 0..self.slots[slot].pairs.len() {
            let id = self.slots[slot].pairs[n];
            let other = self.pairs.get(id).other(slot);
            if self.slots[other].removed {
                continue;
            }
            self.pairs.reprioritize(id, &self.space, &self.slots);
        }
    }

    /// Dequeues every pair of the cluster in `slot`.
    fn remove_pairs(&mut self, slot: usize) {
        for n in 0..self.slots[slot].pairs.len() {
            let id = self.slots[slot].pairs[n];
            let other = self.pairs.get(id).other(slot);
            if self.slots[other].removed {
                continue;
            }
            self.pairs.remove(id);
        }
    }

    /// Evicts removed clusters from the live list (keeping survivor order),
    /// returns their slots and stale pairs to the pools.
    fn compact(&mut self) {
        let removed: Vec<bool> = self.slots.iter().map(|c| c.removed).collect();
        if !removed.contains(&true) {
            return;
        }

        for n in 0..self.live.len() {
            let slot = self.live[n];
            if removed[slot] {
                let mut stale = std::mem::take(&mut self.slots[slot].pairs);
                for &id in &stale {
                    let other = self.pairs.get(id).other(slot);
                    // Pairs between two removed clusters are released once.
                    if !removed[other] || slot < other {
                        self.pairs.release(id);
                    }
                }
                stale.clear();
                self.slots[slot].pairs = stale;
                self.slots[slot].clear(&self.space);
                self.free.push(slot);
            } else {
                let pairs = &self.pairs;
                self.slots[slot]
                    .pairs
                    .retain(|&id| !removed[pairs.get(id).other(slot)]);
            }
        }
        self.live.retain(|&slot| !removed[slot]);
    }

    #[cfg(test)]
    fn heap_is_valid(&self) -> bool {
        self.pairs.is_valid()
    }

    #[cfg(test)]
    fn queued_pairs(&self) -> usize {
        self.pairs.len()
    }
}

/// Mutable borrow of `items[a]` alongside a shared borrow of `items[b]`.
/// Panics if `a == b`: a cluster is never merged with itself.
fn split_pair<T>(items: &mut [T], a: usize, b: usize) -> (&mut T, &T) {
    assert_ne!(a, b, "gvm: cannot merge a cluster with itself");
    if a < b {
        let (lo, hi) = items.split_at_mut(b);
        (&mut lo[a], &hi[0])
    } else {
        let (lo, hi) = items.split_at_mut(a);
        (&mut hi[0], &lo[b])
    }
}
