//! Ordering of extended candidates.

use std::cmp::Ordering;

use dtseg_core::{ExtendedSegmentCandidate, SegmentCandidate};
use log::warn;

/// Compares two candidates, `Greater` meaning `a` is the better one.
///
/// More hits (including attached clusters) wins; on equal hits the lower
/// chi2 wins.
pub fn compare_candidates<A, B>(
    a: &ExtendedSegmentCandidate<A>,
    b: &ExtendedSegmentCandidate<B>,
) -> Ordering
where
    A: SegmentCandidate,
    B: SegmentCandidate,
{
    a.n_hits()
        .cmp(&b.n_hits())
        .then_with(|| b.base().chi2().total_cmp(&a.base().chi2()))
}

/// Sorts candidates best first.
pub fn rank_candidates<C: SegmentCandidate>(candidates: &mut [ExtendedSegmentCandidate<C>]) {
    candidates.sort_by(|a, b| compare_candidates(b, a));
}

/// Returns the first of the greatest items under `compare`.
///
/// Ties keep the earlier item, matching the stable order of
/// [`rank_candidates`].
pub(crate) fn first_max_by<T, I, F>(items: I, mut compare: F) -> Option<T>
where
    I: IntoIterator<Item = T>,
    F: FnMut(&T, &T) -> Ordering,
{
    items.into_iter().reduce(|best, item| {
        if compare(&item, &best) == Ordering::Greater {
            item
        } else {
            best
        }
    })
}

/// Returns the best candidate that passes the quality cuts.
///
/// Candidates whose quality cannot be evaluated are skipped. Among equally
/// ranked candidates the first one wins.
pub fn best_candidate<C: SegmentCandidate>(
    candidates: &[ExtendedSegmentCandidate<C>],
) -> Option<&ExtendedSegmentCandidate<C>> {
    let good = candidates.iter().filter(|candidate| match candidate.good() {
        Ok(good) => good,
        Err(err) => {
            warn!(
                "skipping segment in {}: {}",
                candidate.base().superlayer(),
                err
            );
            false
        }
    });
    first_max_by(good, |a, b| compare_candidates(*a, *b))
}
