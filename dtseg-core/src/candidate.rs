//! Segment candidate trait and a plain fitted-segment value.

use crate::geometry::{LocalPoint, LocalVector};
use crate::superlayer::SuperLayerId;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Read-only view of a fitted segment candidate.
///
/// The fit itself (position, direction, chi2) is produced elsewhere; the
/// evaluator only consumes the result through this trait.
pub trait SegmentCandidate: Send + Sync {
    /// Reference position of the fitted line, in the local frame.
    fn position(&self) -> LocalPoint;

    /// Direction of the fitted line, in the local frame.
    fn direction(&self) -> LocalVector;

    /// Number of hits used in the fit.
    fn n_hits(&self) -> usize;

    /// Chi-square of the fit.
    fn chi2(&self) -> f64;

    /// Degrees of freedom of the fit.
    fn ndof(&self) -> u32;

    /// Superlayer the candidate was built in.
    fn superlayer(&self) -> SuperLayerId;
}

impl<T: SegmentCandidate + ?Sized> SegmentCandidate for &T {
    #[inline]
    fn position(&self) -> LocalPoint {
        (**self).position()
    }

    #[inline]
    fn direction(&self) -> LocalVector {
        (**self).direction()
    }

    #[inline]
    fn n_hits(&self) -> usize {
        (**self).n_hits()
    }

    #[inline]
    fn chi2(&self) -> f64 {
        (**self).chi2()
    }

    #[inline]
    fn ndof(&self) -> u32 {
        (**self).ndof()
    }

    #[inline]
    fn superlayer(&self) -> SuperLayerId {
        (**self).superlayer()
    }
}

/// A segment fit result stored by value.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FittedSegment {
    pub superlayer: SuperLayerId,
    pub position: LocalPoint,
    pub direction: LocalVector,
    pub n_hits: usize,
    pub chi2: f64,
    pub ndof: u32,
}

impl FittedSegment {
    /// Creates a fitted segment with zero chi2 and `n_hits - 2` degrees of
    /// freedom (a straight line in one projection has two parameters).
    #[must_use]
    pub fn new(
        superlayer: SuperLayerId,
        position: LocalPoint,
        direction: LocalVector,
        n_hits: usize,
    ) -> Self {
        Self {
            superlayer,
            position,
            direction,
            n_hits,
            chi2: 0.0,
            ndof: u32::try_from(n_hits.saturating_sub(2)).unwrap_or(u32::MAX),
        }
    }

    /// Sets the fit chi2.
    #[must_use]
    pub fn with_chi2(mut self, chi2: f64) -> Self {
        self.chi2 = chi2;
        self
    }

    /// Sets the degrees of freedom.
    #[must_use]
    pub fn with_ndof(mut self, ndof: u32) -> Self {
        self.ndof = ndof;
        self
    }
}

impl SegmentCandidate for FittedSegment {
    #[inline]
    fn position(&self) -> LocalPoint {
        self.position
    }

    #[inline]
    fn direction(&self) -> LocalVector {
        self.direction
    }

    #[inline]
    fn n_hits(&self) -> usize {
        self.n_hits
    }

    #[inline]
    fn chi2(&self) -> f64 {
        self.chi2
    }

    #[inline]
    fn ndof(&self) -> u32 {
        self.ndof
    }

    #[inline]
    fn superlayer(&self) -> SuperLayerId {
        self.superlayer
    }
}
