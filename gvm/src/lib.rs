//! Bounded-memory online clustering of weighted points by greedy variance
//! minimization.
//!
//! Points of a fixed dimension stream in one at a time, each with a
//! non-negative mass and an optional key. At most `capacity` clusters are
//! ever held. Each cluster stores only its sufficient statistics (count,
//! mass, first and second moments), so memory never depends on how many
//! points were added.
//!
//! # Usage
//!
//! ```
//! use gvm::{Clusters, VectorSpace};
//!
//! let space = VectorSpace::new(3)?;
//! let mut clusters = Clusters::new(space, 2)?;
//!
//! clusters.add(1.0, &[0.0, 0.0, 0.0], Some("origin"))?;
//! clusters.add(1.0, &[10.0, 10.0, 10.0], Some("far"))?;
//! clusters.add(1.0, &[1.0, 1.0, 1.0], Some("near"))?;
//!
//! let results = clusters.results();
//! assert_eq!(results.len(), 2);
//! assert_eq!(results[0].count, 2);
//! assert_eq!(results[0].point, vec![0.5, 0.5, 0.5]);
//! assert_eq!(results[0].key, Some("origin"));
//! # Ok::<(), gvm::GvmError>(())
//! ```
//!
//! # Design
//!
//! Until `capacity` is reached every point becomes its own cluster. After
//! that each addition either grows the cluster whose variance rises least
//! or merges the cheapest pair of clusters (tracked in an indexable
//! min-heap) and reuses the vacated slot for the new point. Afterwards
//! [`Clusters::reduce`] can collapse the result further.
//!
//! Keys are combined by a [`Keyer`]: [`DefaultKeyer`] keeps one
//! representative, [`ListKeyer`] keeps them all, [`DiscardKeyer`] keeps none.

mod cluster;
mod clusters;
mod error;
mod heap;
mod keyer;
mod pair;
mod result;
mod space;

pub use cluster::Cluster;
pub use clusters::{Clusters, ReduceOptions};
pub use error::GvmError;
pub use keyer::{DefaultKeyer, DiscardKeyer, FnKeyer, Keyer, ListKeyer};
pub use result::ClusterResult;
pub use space::VectorSpace;
