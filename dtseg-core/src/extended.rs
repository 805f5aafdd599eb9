//! Segment candidate extended with clusters from other superlayers.
//!
//! [`ExtendedSegmentCandidate`] wraps a fitted [`SegmentCandidate`] together
//! with the clusters attached to it, and answers three questions:
//!
//! 1. Is a given cluster compatible with the segment's extrapolation?
//! 2. How many hits does the extended candidate carry?
//! 3. Does the base segment pass the quality cuts?

use log::{debug, trace};

use crate::candidate::SegmentCandidate;
use crate::cluster::ClusterForFit;
use crate::config::EvaluatorConfig;
use crate::error::{Error, Result};
use crate::geometry::LocalPoint;
use crate::superlayer::SuperLayerId;

/// A segment candidate plus the clusters attached to it.
#[derive(Debug, Clone)]
pub struct ExtendedSegmentCandidate<C> {
    base: C,
    clusters: Vec<ClusterForFit>,
    config: EvaluatorConfig,
}

impl<C: SegmentCandidate> ExtendedSegmentCandidate<C> {
    /// Wraps a base candidate with no attached clusters.
    pub fn new(base: C, config: EvaluatorConfig) -> Self {
        Self {
            base,
            clusters: Vec::new(),
            config,
        }
    }

    /// The wrapped base candidate.
    pub fn base(&self) -> &C {
        &self.base
    }

    /// The evaluator configuration.
    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Clusters attached so far.
    pub fn clusters(&self) -> &[ClusterForFit] {
        &self.clusters
    }

    /// Attaches a cluster. No compatibility check is made here.
    pub fn add_cluster(&mut self, cluster: ClusterForFit) {
        self.clusters.push(cluster);
    }

    /// Consumes the candidate, returning the base and the attached clusters.
    pub fn into_parts(self) -> (C, Vec<ClusterForFit>) {
        (self.base, self.clusters)
    }

    /// Extrapolates the segment to local depth `z`.
    ///
    /// Fails with [`Error::DegenerateDirection`] when the direction has no
    /// usable component along local z.
    pub fn predicted_position(&self, z: f64) -> Result<LocalPoint> {
        let direction = self.base.direction();
        let degenerate = || Error::DegenerateDirection {
            x: direction.x,
            y: direction.y,
            z: direction.z,
        };

        let unit = direction.unit().ok_or_else(degenerate)?;
        let cos_theta = unit.cos_theta();
        if !cos_theta.is_finite() || cos_theta.abs() < f64::EPSILON {
            return Err(degenerate());
        }

        let position = self.base.position();
        Ok(position + unit * ((z - position.z) / cos_theta))
    }

    /// Signed x residual between the extrapolated segment and the cluster.
    pub fn residual(&self, cluster: &ClusterForFit) -> Result<f64> {
        let predicted = self.predicted_position(cluster.pos.z)?;
        Ok((predicted - cluster.pos).x)
    }

    /// Returns true if the cluster lies strictly inside the compatibility
    /// window around the extrapolated segment.
    pub fn is_compatible(&self, cluster: &ClusterForFit) -> Result<bool> {
        let xx = cluster.err.xx;
        if !xx.is_finite() || xx < 0.0 {
            return Err(Error::InvalidClusterError(xx));
        }

        let residual = self.residual(cluster)?.abs();
        let window = self.config.compatibility.window(&cluster.err);
        let compatible = residual < window;
        trace!(
            "cluster in {} at {:?}: |dx| = {:.3} cm, window = {:.3} cm, compatible = {}",
            cluster.superlayer(),
            cluster.pos,
            residual,
            window,
            compatible
        );
        Ok(compatible)
    }

    /// Hits of the base segment plus one per attached cluster.
    pub fn n_hits(&self) -> usize {
        self.base.n_hits() + self.clusters.len()
    }

    /// chi2 / ndof of the base segment fit.
    pub fn reduced_chi2(&self) -> Result<f64> {
        match self.base.ndof() {
            0 => Err(Error::ZeroDegreesOfFreedom),
            ndof => Ok(self.base.chi2() / f64::from(ndof)),
        }
    }

    /// Applies the quality cuts to the base segment.
    ///
    /// The hit-count cut is checked first; a segment that fails it is not
    /// good whatever its fit statistics, so zero degrees of freedom only
    /// raises [`Error::ZeroDegreesOfFreedom`] once the hit count passes.
    pub fn good(&self) -> Result<bool> {
        let cuts = &self.config.quality;
        let base_hits = self.base.n_hits();
        if base_hits < cuts.n_hits_min {
            debug!(
                "segment in {} rejected: {} hits < {}",
                self.base.superlayer(),
                base_hits,
                cuts.n_hits_min
            );
            return Ok(false);
        }

        let reduced = self.reduced_chi2()?;
        let limit = cuts.chi2_limit(&self.base.superlayer());
        let good = reduced < limit;
        debug!(
            "segment in {}: {} hits, chi2/ndof = {:.3}, limit = {:.3}, good = {}",
            self.base.superlayer(),
            base_hits,
            reduced,
            limit,
            good
        );
        Ok(good)
    }

    /// The base superlayer followed by the distinct superlayers of the
    /// attached clusters, in attachment order.
    pub fn superlayers(&self) -> Vec<SuperLayerId> {
        let mut ids = vec![self.base.superlayer()];
        for cluster in &self.clusters {
            let id = cluster.superlayer();
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::FittedSegment;
    use crate::cluster::SuperLayerCluster;
    use crate::config::{CompatibilityConfig, QualityCuts};
    use crate::geometry::{LocalError, LocalVector};
    use approx::assert_relative_eq;

    fn sl(index: u8) -> SuperLayerId {
        SuperLayerId::new(0, 2, 4, index).unwrap()
    }

    fn config() -> EvaluatorConfig {
        EvaluatorConfig::new(QualityCuts::new(3, 20.0))
    }

    fn vertical_segment() -> FittedSegment {
        FittedSegment::new(
            sl(1),
            LocalPoint::new(0.0, 0.0, 0.0),
            LocalVector::new(0.0, 0.0, 1.0),
            6,
        )
    }

    fn cluster_at(x: f64, z: f64, xx: f64) -> ClusterForFit {
        ClusterForFit::new(
            SuperLayerCluster::new(sl(2), 3),
            LocalPoint::new(x, 0.0, z),
            LocalError::from_xx(xx),
        )
    }

    #[test]
    fn test_predicted_position_vertical() {
        let cand = ExtendedSegmentCandidate::new(vertical_segment(), config());
        let p = cand.predicted_position(10.0).unwrap();
        assert_relative_eq!(p.x, 0.0);
        assert_relative_eq!(p.z, 10.0);
    }

    #[test]
    fn test_predicted_position_slanted() {
        let seg = FittedSegment::new(
            sl(1),
            LocalPoint::new(2.0, 0.0, -5.0),
            LocalVector::new(1.0, 0.0, 1.0),
            6,
        );
        let cand = ExtendedSegmentCandidate::new(seg, config());
        let p = cand.predicted_position(5.0).unwrap();
        assert_relative_eq!(p.x, 12.0, epsilon = 1e-9);
        assert_relative_eq!(p.z, 5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_compatible_inside_window() {
        let cand = ExtendedSegmentCandidate::new(vertical_segment(), config());
        // window = max(10 * 2, 25) = 25
        assert!(cand.is_compatible(&cluster_at(20.0, 10.0, 4.0)).unwrap());
        assert!(!cand.is_compatible(&cluster_at(26.0, 10.0, 4.0)).unwrap());
    }

    #[test]
    fn test_compatible_boundary_is_exclusive() {
        let cand = ExtendedSegmentCandidate::new(vertical_segment(), config());
        assert!(!cand.is_compatible(&cluster_at(25.0, 10.0, 4.0)).unwrap());
        // window = 10 * 3 = 30
        assert!(!cand.is_compatible(&cluster_at(30.0, 10.0, 9.0)).unwrap());
        assert!(cand.is_compatible(&cluster_at(29.9, 10.0, 9.0)).unwrap());
    }

    #[test]
    fn test_compatible_sign_symmetric() {
        let cand = ExtendedSegmentCandidate::new(vertical_segment(), config());
        for x in [5.0, 24.9, 25.0, 40.0] {
            assert_eq!(
                cand.is_compatible(&cluster_at(x, 7.0, 1.0)).unwrap(),
                cand.is_compatible(&cluster_at(-x, 7.0, 1.0)).unwrap(),
                "asymmetric at |dx| = {x}"
            );
        }
    }

    #[test]
    fn test_custom_window() {
        let cfg = config().with_compatibility(CompatibilityConfig::new().with_min_error(1.0));
        let cand = ExtendedSegmentCandidate::new(vertical_segment(), cfg);
        // window = 10 * 0.2 = 2
        assert!(cand.is_compatible(&cluster_at(1.5, 10.0, 0.04)).unwrap());
        assert!(!cand.is_compatible(&cluster_at(2.5, 10.0, 0.04)).unwrap());
    }

    #[test]
    fn test_degenerate_direction() {
        let mut seg = vertical_segment();
        seg.direction = LocalVector::new(1.0, 0.0, 0.0);
        let cand = ExtendedSegmentCandidate::new(seg, config());
        assert!(matches!(
            cand.is_compatible(&cluster_at(0.0, 10.0, 1.0)),
            Err(Error::DegenerateDirection { .. })
        ));

        seg.direction = LocalVector::default();
        let cand = ExtendedSegmentCandidate::new(seg, config());
        assert!(matches!(
            cand.predicted_position(1.0),
            Err(Error::DegenerateDirection { .. })
        ));
    }

    #[test]
    fn test_huge_direction_components_extrapolate() {
        let mut seg = vertical_segment();
        seg.direction = LocalVector::new(1e200, 0.0, 1e200);
        let cand = ExtendedSegmentCandidate::new(seg, config());
        let p = cand.predicted_position(10.0).unwrap();
        assert_relative_eq!(p.x, 10.0, epsilon = 1e-9);
        assert!(cand.is_compatible(&cluster_at(20.0, 10.0, 4.0)).unwrap());
    }

    #[test]
    fn test_invalid_cluster_error() {
        let cand = ExtendedSegmentCandidate::new(vertical_segment(), config());
        assert_eq!(
            cand.is_compatible(&cluster_at(0.0, 10.0, -1.0)),
            Err(Error::InvalidClusterError(-1.0))
        );
    }

    #[test]
    fn test_n_hits_counts_clusters() {
        let mut cand = ExtendedSegmentCandidate::new(vertical_segment(), config());
        assert_eq!(cand.n_hits(), 6);
        let mut previous = cand.n_hits();
        for i in 0..4 {
            cand.add_cluster(cluster_at(f64::from(i), 10.0, 1.0));
            assert!(cand.n_hits() >= previous);
            previous = cand.n_hits();
        }
        assert_eq!(cand.n_hits(), 10);
        assert_eq!(cand.clusters().len(), 4);
    }

    #[test]
    fn test_good_hit_count_cut() {
        let cfg = EvaluatorConfig::new(QualityCuts::new(8, 20.0));
        let seg = vertical_segment().with_chi2(0.0);
        let mut seg7 = seg;
        seg7.n_hits = 7;
        let cand = ExtendedSegmentCandidate::new(seg7, cfg);
        assert!(!cand.good().unwrap());

        // attached clusters do not count towards the cut
        let mut cand = cand;
        cand.add_cluster(cluster_at(0.0, 10.0, 1.0));
        assert_eq!(cand.n_hits(), 8);
        assert!(!cand.good().unwrap());
    }

    #[test]
    fn test_good_relaxed_for_theta_superlayer() {
        let cuts = QualityCuts::new(3, 10.0);
        // chi2/ndof = 15 = 1.5 * chi2_max
        let phi = vertical_segment().with_chi2(60.0).with_ndof(4);
        let mut theta = phi;
        theta.superlayer = sl(2);

        let phi_cand = ExtendedSegmentCandidate::new(phi, EvaluatorConfig::new(cuts));
        let theta_cand = ExtendedSegmentCandidate::new(theta, EvaluatorConfig::new(cuts));
        assert!(!phi_cand.good().unwrap());
        assert!(theta_cand.good().unwrap());
    }

    #[test]
    fn test_good_chi2_boundary_is_exclusive() {
        let cuts = QualityCuts::new(3, 10.0);
        let seg = vertical_segment().with_chi2(40.0).with_ndof(4);
        let cand = ExtendedSegmentCandidate::new(seg, EvaluatorConfig::new(cuts));
        assert!(!cand.good().unwrap());

        let mut theta = seg.with_chi2(80.0);
        theta.superlayer = sl(2);
        let cand = ExtendedSegmentCandidate::new(theta, EvaluatorConfig::new(cuts));
        assert!(!cand.good().unwrap());
    }

    #[test]
    fn test_good_zero_ndof() {
        let seg = vertical_segment().with_ndof(0);
        let cand = ExtendedSegmentCandidate::new(seg, config());
        assert_eq!(cand.good(), Err(Error::ZeroDegreesOfFreedom));
        assert_eq!(cand.reduced_chi2(), Err(Error::ZeroDegreesOfFreedom));

        // hit-count failure short-circuits before the chi2 ratio
        let mut few = seg;
        few.n_hits = 1;
        let cand = ExtendedSegmentCandidate::new(few, config());
        assert_eq!(cand.good(), Ok(false));
    }

    #[test]
    fn test_superlayers() {
        let mut cand = ExtendedSegmentCandidate::new(vertical_segment(), config());
        cand.add_cluster(cluster_at(0.0, 10.0, 1.0));
        cand.add_cluster(cluster_at(1.0, 12.0, 1.0));
        assert_eq!(cand.superlayers(), vec![sl(1), sl(2)]);
    }
}
