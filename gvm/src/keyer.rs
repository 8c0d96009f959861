//! Strategies controlling how keys propagate through clustering.
//!
//! Some applications discard keys entirely (only cluster shape matters),
//! some keep one representative key per cluster (an exemplar), and some
//! keep every key so each input item can be mapped back to its cluster.

use std::fmt;

/// Combines caller-supplied keys as points are added and clusters merge.
///
/// Keys are moved in and out of clusters, so a keyer may reuse either
/// argument's storage for the result.
pub trait Keyer<K> {
    /// Called when two clusters merge.
    ///
    /// `k1` belongs to the cluster with the greater mass, `k2` to the one
    /// with the lesser mass. Returns the key of the merged cluster.
    fn merge_keys(&self, k1: Option<K>, k2: Option<K>) -> Option<K>;

    /// Called when a point with key `key` is added to a cluster currently
    /// holding `existing`. Returns the cluster's new key.
    fn add_key(&self, existing: Option<K>, key: Option<K>) -> Option<K>;
}

/// Drops every key.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardKeyer;

impl<K> Keyer<K> for DiscardKeyer {
    fn merge_keys(&self, _k1: Option<K>, _k2: Option<K>) -> Option<K> {
        None
    }

    fn add_key(&self, _existing: Option<K>, _key: Option<K>) -> Option<K> {
        None
    }
}

/// Keeps one representative key per cluster.
///
/// Merging prefers the key of the more massive cluster; adding never
/// replaces a key that is already present.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultKeyer;

impl<K> Keyer<K> for DefaultKeyer {
    fn merge_keys(&self, k1: Option<K>, k2: Option<K>) -> Option<K> {
        k1.or(k2)
    }

    fn add_key(&self, existing: Option<K>, key: Option<K>) -> Option<K> {
        existing.or(key)
    }
}

/// Keeps every key, with keys being lists that are concatenated.
///
/// Memory grows with the total number of keyed items.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListKeyer;

impl ListKeyer {
    fn combine<T>(list1: Option<Vec<T>>, list2: Option<Vec<T>>) -> Option<Vec<T>> {
        match (list1, list2) {
            (Some(mut a), Some(b)) => {
                a.extend(b);
                Some(a)
            }
            (a, None) => a,
            (None, b) => b,
        }
    }
}

impl<T> Keyer<Vec<T>> for ListKeyer {
    fn merge_keys(&self, k1: Option<Vec<T>>, k2: Option<Vec<T>>) -> Option<Vec<T>> {
        Self::combine(k1, k2)
    }

    fn add_key(&self, existing: Option<Vec<T>>, key: Option<Vec<T>>) -> Option<Vec<T>> {
        Self::combine(existing, key)
    }
}

/// Caller-defined keyer built from a pair of closures.
pub struct FnKeyer<M, A> {
    merge: M,
    add: A,
}

impl<M, A> FnKeyer<M, A> {
    /// `merge` receives `(greater_mass_key, lesser_mass_key)`,
    /// `add` receives `(existing_key, incoming_key)`.
    pub fn new(merge: M, add: A) -> Self {
        Self { merge, add }
    }
}

impl<M, A> fmt::Debug for FnKeyer<M, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnKeyer").finish_non_exhaustive()
    }
}

impl<K, M, A> Keyer<K> for FnKeyer<M, A>
where
    M: Fn(Option<K>, Option<K>) -> Option<K>,
    A: Fn(Option<K>, Option<K>) -> Option<K>,
{
    fn merge_keys(&self, k1: Option<K>, k2: Option<K>) -> Option<K> {
        (self.merge)(k1, k2)
    }

    fn add_key(&self, existing: Option<K>, key: Option<K>) -> Option<K> {
        (self.add)(existing, key)
    }
}
