//! Superlayer clusters and their fit-ready form.

use crate::geometry::{LocalError, LocalPoint};
use crate::superlayer::SuperLayerId;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A cluster of drift-tube hits reconstructed within one superlayer.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SuperLayerCluster {
    /// Superlayer the cluster was built in.
    pub superlayer: SuperLayerId,
    /// Number of hits in the cluster.
    pub n_hits: usize,
}

impl SuperLayerCluster {
    /// Creates a new cluster.
    #[inline]
    #[must_use]
    pub fn new(superlayer: SuperLayerId, n_hits: usize) -> Self {
        Self { superlayer, n_hits }
    }
}

/// A cluster expressed in the segment's local frame, ready to be tested
/// against (and attached to) a segment candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClusterForFit {
    /// The underlying cluster.
    pub cluster: SuperLayerCluster,
    /// Position estimate in the segment's local frame.
    pub pos: LocalPoint,
    /// Position error estimate.
    pub err: LocalError,
}

impl ClusterForFit {
    /// Creates a new fit-ready cluster.
    #[inline]
    #[must_use]
    pub fn new(cluster: SuperLayerCluster, pos: LocalPoint, err: LocalError) -> Self {
        Self { cluster, pos, err }
    }

    /// Superlayer of the underlying cluster.
    #[inline]
    #[must_use]
    pub fn superlayer(&self) -> SuperLayerId {
        self.cluster.superlayer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cluster_for_fit() {
        let sl = SuperLayerId::new(1, 3, 5, 2).unwrap();
        let clus = ClusterForFit::new(
            SuperLayerCluster::new(sl, 4),
            LocalPoint::new(10.0, 0.0, 23.5),
            LocalError::from_xx(0.04),
        );
        assert_eq!(clus.superlayer(), sl);
        assert_eq!(clus.cluster.n_hits, 4);
    }
}
