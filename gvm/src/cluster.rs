use crate::heap::PairId;
use crate::space::VectorSpace;

/// Clamps a variance at zero so floating-point cancellation never produces
/// a negative value.
#[inline]
pub(crate) fn correct(var: f64) -> f64 {
    if var >= 0.0 { var } else { 0.0 }
}

/// Sufficient statistics for one group of points.
///
/// A cluster never stores the points it has absorbed, only their count,
/// total mass and mass-weighted first and second moments. Clusters live in
/// the arena owned by [`Clusters`](crate::Clusters) and are handed out
/// read-only through [`Clusters::clusters`](crate::Clusters::clusters).
#[derive(Debug, Clone)]
pub struct Cluster<K> {
    pub(crate) removed: bool,
    pub(crate) count: usize,
    pub(crate) m0: f64,
    pub(crate) m1: Vec<f64>,
    pub(crate) m2: Vec<f64>,
    pub(crate) var: f64,
    pub(crate) key: Option<K>,
    /// Pairs with every other live cluster.
    pub(crate) pairs: Vec<PairId>,
}

impl<K> Cluster<K> {
    pub(crate) fn new(space: &VectorSpace, capacity: usize) -> Self {
        Self {
            removed: false,
            count: 0,
            m0: 0.0,
            m1: space.new_origin(),
            m2: space.new_origin(),
            var: 0.0,
            key: None,
            pairs: Vec::with_capacity(capacity.saturating_sub(1)),
        }
    }

    /// Number of points in the cluster.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Total mass of the cluster.
    pub fn mass(&self) -> f64 {
        self.m0
    }

    /// Un-normalized variance (sum of weighted squared deviations).
    pub fn variance(&self) -> f64 {
        self.var
    }

    /// Mass-weighted coordinate sum.
    pub fn first_moment(&self) -> &[f64] {
        &self.m1
    }

    /// Mass-weighted squared-coordinate sum.
    pub fn second_moment(&self) -> &[f64] {
        &self.m2
    }

    /// The key associated with the cluster, if any.
    pub fn key(&self) -> Option<&K> {
        self.key.as_ref()
    }

    /// Removes all points, mass and the key.
    pub(crate) fn clear(&mut self, space: &VectorSpace) {
        self.removed = false;
        self.count = 0;
        self.m0 = 0.0;
        space.set_to_origin(&mut self.m1);
        space.set_to_origin(&mut self.m2);
        self.var = 0.0;
        self.key = None;
    }

    /// Resets the cluster to hold the single point `pt` with mass `m`.
    pub(crate) fn set(&mut self, space: &VectorSpace, m: f64, pt: &[f64]) {
        space.set_to_scaled(&mut self.m1, m, pt);
        space.set_to_scaled_sqr(&mut self.m2, m, pt);
        self.count = 1;
        self.m0 = m;
        self.var = 0.0;
    }

    /// Adds the point `pt` with mass `m`.
    pub(crate) fn add(&mut self, space: &VectorSpace, m: f64, pt: &[f64]) {
        if self.count == 0 {
            self.set(space, m, pt);
            return;
        }
        self.count += 1;
        if m != 0.0 {
            self.m0 += m;
            space.add_scaled(&mut self.m1, m, pt);
            space.add_scaled_sqr(&mut self.m2, m, pt);
            self.update(space);
        }
    }

    /// Makes this cluster a copy of `other`'s statistics. The key is untouched.
    pub(crate) fn set_cluster(&mut self, space: &VectorSpace, other: &Cluster<K>) {
        self.count = other.count;
        self.m0 = other.m0;
        space.set_to(&mut self.m1, &other.m1);
        space.set_to(&mut self.m2, &other.m2);
        self.var = other.var;
    }

    /// Absorbs `other`'s statistics. The key is untouched.
    pub(crate) fn add_cluster(&mut self, space: &VectorSpace, other: &Cluster<K>) {
        if self.count == 0 {
            self.set_cluster(space, other);
            return;
        }
        self.count += other.count;
        self.m0 += other.m0;
        space.add(&mut self.m1, &other.m1);
        space.add(&mut self.m2, &other.m2);
        self.update(space);
    }

    /// Increase in variance if `pt` with mass `m` were added.
    pub(crate) fn test(&self, space: &VectorSpace, m: f64, pt: &[f64]) -> f64 {
        if self.m0 == 0.0 && m == 0.0 {
            return 0.0;
        }
        correct(space.variance_with_point(self.m0, &self.m1, &self.m2, m, pt)) - self.var
    }

    /// Variance the union of this cluster and `other` would have.
    pub(crate) fn test_cluster(&self, space: &VectorSpace, other: &Cluster<K>) -> f64 {
        if self.m0 == 0.0 && other.m0 == 0.0 {
            return 0.0;
        }
        correct(space.variance_with_cluster(
            self.m0, &self.m1, &self.m2, other.m0, &other.m1, &other.m2,
        ))
    }

    /// Recomputes the variance from the current moments.
    pub(crate) fn update(&mut self, space: &VectorSpace) {
        self.var = if self.m0 == 0.0 {
            0.0
        } else {
            correct(space.variance(self.m0, &self.m1, &self.m2))
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn space3() -> VectorSpace {
        VectorSpace::new(3).unwrap()
    }

    #[test]
    fn correct_clamps_negative() {
        assert_eq!(correct(-1e-12), 0.0);
        assert_eq!(correct(0.0), 0.0);
        assert_eq!(correct(2.5), 2.5);
    }

    #[test]
    fn set_makes_singleton() {
        let space = space3();
        let mut c: Cluster<()> = Cluster::new(&space, 4);
        c.set(&space, 2.0, &[1.0, 2.0, 3.0]);
        assert_eq!(c.count(), 1);
        assert_eq!(c.mass(), 2.0);
        assert_eq!(c.first_moment(), &[2.0, 4.0, 6.0]);
        assert_eq!(c.second_moment(), &[2.0, 8.0, 18.0]);
        assert_eq!(c.variance(), 0.0);
    }

    #[test]
    fn add_to_empty_is_set() {
        let space = space3();
        let mut a: Cluster<()> = Cluster::new(&space, 4);
        let mut b: Cluster<()> = Cluster::new(&space, 4);
        a.add(&space, 1.5, &[1.0, -1.0, 0.0]);
        b.set(&space, 1.5, &[1.0, -1.0, 0.0]);
        assert_eq!(a.count, b.count);
        assert_eq!(a.m0, b.m0);
        assert_eq!(a.m1, b.m1);
        assert_eq!(a.m2, b.m2);
    }

    #[test]
    fn add_accumulates_variance() {
        let space = space3();
        let mut c: Cluster<()> = Cluster::new(&space, 4);
        c.add(&space, 1.0, &[0.0, 0.0, 0.0]);
        c.add(&space, 1.0, &[2.0, 2.0, 2.0]);
        assert_eq!(c.count(), 2);
        assert_eq!(c.mass(), 2.0);
        // each point is sqrt(3) from the centroid: 3 + 3
        assert!((c.variance() - 6.0).abs() < 1e-9, "got {}", c.variance());
    }

    #[test]
    fn test_predicts_add_without_mutating() {
        let space = space3();
        let mut c: Cluster<()> = Cluster::new(&space, 4);
        c.add(&space, 1.0, &[0.0, 0.0, 0.0]);
        c.add(&space, 1.0, &[1.0, 0.0, 0.0]);
        let before = c.variance();

        let delta = c.test(&space, 2.0, &[5.0, 1.0, -1.0]);
        assert_eq!(c.variance(), before);
        assert_eq!(c.count(), 2);

        c.add(&space, 2.0, &[5.0, 1.0, -1.0]);
        assert!((c.variance() - before - delta).abs() < 1e-9);
    }

    #[test]
    fn test_on_empty_with_zero_mass() {
        let space = space3();
        let c: Cluster<()> = Cluster::new(&space, 4);
        assert_eq!(c.test(&space, 0.0, &[1.0, 2.0, 3.0]), 0.0);
    }

    #[test]
    fn add_cluster_matches_test_cluster() {
        let space = space3();
        let mut a: Cluster<()> = Cluster::new(&space, 4);
        let mut b: Cluster<()> = Cluster::new(&space, 4);
        a.add(&space, 1.0, &[0.0, 0.0, 0.0]);
        a.add(&space, 1.0, &[1.0, 1.0, 1.0]);
        b.add(&space, 3.0, &[10.0, 10.0, 10.0]);
        b.add(&space, 1.0, &[9.0, 10.0, 11.0]);

        let predicted = a.test_cluster(&space, &b);
        a.add_cluster(&space, &b);
        assert_eq!(a.count(), 4);
        assert_eq!(a.mass(), 6.0);
        assert!((a.variance() - predicted).abs() < 1e-9);
    }

    #[test]
    fn add_cluster_into_empty_copies() {
        let space = space3();
        let mut a: Cluster<()> = Cluster::new(&space, 4);
        let mut b: Cluster<()> = Cluster::new(&space, 4);
        b.add(&space, 1.0, &[1.0, 2.0, 3.0]);
        b.add(&space, 1.0, &[3.0, 2.0, 1.0]);
        a.add_cluster(&space, &b);
        assert_eq!(a.count(), 2);
        assert_eq!(a.m1, b.m1);
        assert_eq!(a.variance(), b.variance());
    }

    #[test]
    fn clear_resets_everything() {
        let space = space3();
        let mut c: Cluster<u32> = Cluster::new(&space, 4);
        c.add(&space, 1.0, &[1.0, 2.0, 3.0]);
        c.key = Some(7);
        c.removed = true;
        c.clear(&space);
        assert_eq!(c.count(), 0);
        assert_eq!(c.mass(), 0.0);
        assert_eq!(c.first_moment(), &[0.0, 0.0, 0.0]);
        assert!(c.key().is_none());
        assert!(!c.removed);
    }
}
