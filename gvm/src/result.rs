use std::fmt;

use serde::Serialize;

use crate::cluster::Cluster;
use crate::space::format_point;

/// Read-only summary of one live cluster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterResult<K> {
    /// Number of points in the cluster.
    pub count: usize,

    /// Aggregate mass of the cluster.
    pub mass: f64,

    /// Coordinates of the cluster's centroid.
    pub point: Vec<f64>,

    /// Variance of the cluster, normalized by its mass.
    pub variance: f64,

    /// Key associated with the cluster, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<K>,
}

impl<K> ClusterResult<K> {
    pub(crate) fn project(cluster: &Cluster<K>, key: Option<K>) -> Self {
        let mass = cluster.m0;
        let point = cluster.m1.iter().map(|&c| c / mass).collect();
        Self {
            count: cluster.count,
            mass,
            point,
            variance: cluster.var / mass,
            key,
        }
    }

    /// Standard deviation of the cluster.
    pub fn std_deviation(&self) -> f64 {
        self.variance.sqrt()
    }
}

impl<K> fmt::Display for ClusterResult<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}  count: {}  variance: {:.3}  mass: {:.3}",
            format_point(&self.point),
            self.count,
            self.variance,
            self.mass
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space::VectorSpace;

    fn pair_cluster() -> Cluster<&'static str> {
        let space = VectorSpace::new(3).unwrap();
        let mut c = Cluster::new(&space, 2);
        c.add(&space, 1.0, &[0.0, 0.0, 0.0]);
        c.add(&space, 1.0, &[1.0, 1.0, 1.0]);
        c
    }

    #[test]
    fn projection_normalizes_by_mass() {
        let c = pair_cluster();
        let r = ClusterResult::project(&c, Some("a"));
        assert_eq!(r.count, 2);
        assert_eq!(r.mass, 2.0);
        assert_eq!(r.point, vec![0.5, 0.5, 0.5]);
        // raw variance 1.5 over mass 2
        assert!((r.variance - 0.75).abs() < 1e-12, "got {}", r.variance);
        assert!((r.std_deviation() - 0.75f64.sqrt()).abs() < 1e-12);
        assert_eq!(r.key, Some("a"));
    }

    #[test]
    fn display_format() {
        let r = ClusterResult::project(&pair_cluster(), None);
        assert_eq!(
            r.to_string(),
            "0.5 0.5 0.5  count: 2  variance: 0.750  mass: 2.000"
        );
    }

    #[test]
    fn serializes_without_missing_key() {
        let r = ClusterResult::project(&pair_cluster(), None);
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["count"], 2);
        assert_eq!(json["point"][0], 0.5);
        assert!(json.get("key").is_none());
    }
}
