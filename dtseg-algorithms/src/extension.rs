//! Attaching compatible clusters from other superlayers to a segment.

use dtseg_core::{
    ClusterForFit, EvaluatorConfig, ExtendedSegmentCandidate, Result, SegmentCandidate,
};
use log::debug;

/// Builds an extended candidate from `base`, attaching every cluster that
/// belongs to another superlayer of the same chamber and lies inside the
/// compatibility window.
///
/// # Errors
/// Propagates [`dtseg_core::Error::DegenerateDirection`] and
/// [`dtseg_core::Error::InvalidClusterError`] from the compatibility test.
pub fn extend_candidate<C: SegmentCandidate>(
    base: C,
    clusters: &[ClusterForFit],
    config: EvaluatorConfig,
) -> Result<ExtendedSegmentCandidate<C>> {
    extend_candidate_indexed(base, clusters, config).map(|(candidate, _)| candidate)
}

/// Like [`extend_candidate`], also returning the positions in `clusters`
/// of the attached clusters, in attachment order.
///
/// # Errors
/// Same as [`extend_candidate`].
pub fn extend_candidate_indexed<C: SegmentCandidate>(
    base: C,
    clusters: &[ClusterForFit],
    config: EvaluatorConfig,
) -> Result<(ExtendedSegmentCandidate<C>, Vec<usize>)> {
    let home = base.superlayer();
    let mut candidate = ExtendedSegmentCandidate::new(base, config);
    let mut attached = Vec::new();

    for (index, cluster) in clusters.iter().enumerate() {
        let sl = cluster.superlayer();
        if sl == home || !sl.same_chamber(&home) {
            continue;
        }
        if candidate.is_compatible(cluster)? {
            candidate.add_cluster(*cluster);
            attached.push(index);
        }
    }

    debug!(
        "extended segment in {}: {} of {} clusters attached",
        home,
        attached.len(),
        clusters.len()
    );
    Ok((candidate, attached))
}
