//! Evaluation configuration.

use crate::error::{Error, Result};
use crate::geometry::LocalError;
use crate::superlayer::SuperLayerId;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Window used to decide whether a cluster is compatible with a segment.
///
/// The window half-width along local x is
/// `max(err_scale_factor * sigma_x, min_error)`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CompatibilityConfig {
    /// Multiplier applied to the cluster's x uncertainty.
    pub err_scale_factor: f64,
    /// Lower bound on the window half-width (cm).
    pub min_error: f64,
}

impl Default for CompatibilityConfig {
    fn default() -> Self {
        Self {
            err_scale_factor: 10.0,
            min_error: 25.0, // cm
        }
    }
}

impl CompatibilityConfig {
    /// Creates a compatibility configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the error scale factor.
    #[must_use]
    pub fn with_err_scale_factor(mut self, factor: f64) -> Self {
        self.err_scale_factor = factor;
        self
    }

    /// Sets the minimum window half-width.
    #[must_use]
    pub fn with_min_error(mut self, min_error: f64) -> Self {
        self.min_error = min_error;
        self
    }

    /// Window half-width for a cluster with the given position error.
    #[inline]
    #[must_use]
    pub fn window(&self, err: &LocalError) -> f64 {
        (self.err_scale_factor * err.sigma_x()).max(self.min_error)
    }

    /// Checks that both parameters are finite and non-negative.
    pub fn validate(&self) -> Result<()> {
        if !self.err_scale_factor.is_finite() || self.err_scale_factor < 0.0 {
            return Err(Error::ConfigError(format!(
                "err_scale_factor must be finite and non-negative, got {}",
                self.err_scale_factor
            )));
        }
        if !self.min_error.is_finite() || self.min_error < 0.0 {
            return Err(Error::ConfigError(format!(
                "min_error must be finite and non-negative, got {}",
                self.min_error
            )));
        }
        Ok(())
    }
}

/// Hit-count and reduced chi-square cuts deciding whether a segment is good.
///
/// There are no built-in defaults: both thresholds come from the
/// reconstruction configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct QualityCuts {
    /// Minimum number of hits in the base segment.
    pub n_hits_min: usize,
    /// Upper bound (exclusive) on chi2 / ndof.
    pub chi2_max: f64,
}

impl QualityCuts {
    /// The theta superlayer has a shorter lever arm, so its chi2 cut is
    /// multiplied by this factor.
    pub const THETA_CHI2_FACTOR: f64 = 2.0;

    /// Creates a set of cuts.
    #[must_use]
    pub fn new(n_hits_min: usize, chi2_max: f64) -> Self {
        Self {
            n_hits_min,
            chi2_max,
        }
    }

    /// Sets the minimum hit count.
    #[must_use]
    pub fn with_n_hits_min(mut self, n_hits_min: usize) -> Self {
        self.n_hits_min = n_hits_min;
        self
    }

    /// Sets the reduced chi-square bound.
    #[must_use]
    pub fn with_chi2_max(mut self, chi2_max: f64) -> Self {
        self.chi2_max = chi2_max;
        self
    }

    /// Reduced chi-square bound for a segment in the given superlayer.
    #[inline]
    #[must_use]
    pub fn chi2_limit(&self, superlayer: &SuperLayerId) -> f64 {
        if superlayer.is_theta() {
            self.chi2_max * Self::THETA_CHI2_FACTOR
        } else {
            self.chi2_max
        }
    }

    /// Checks that the chi2 bound is finite and positive.
    pub fn validate(&self) -> Result<()> {
        if !self.chi2_max.is_finite() || self.chi2_max <= 0.0 {
            return Err(Error::ConfigError(format!(
                "chi2_max must be finite and positive, got {}",
                self.chi2_max
            )));
        }
        Ok(())
    }
}

/// Complete configuration of a segment evaluator.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EvaluatorConfig {
    /// Cluster compatibility window.
    #[cfg_attr(feature = "serde", serde(default))]
    pub compatibility: CompatibilityConfig,
    /// Segment quality cuts.
    pub quality: QualityCuts,
}

impl EvaluatorConfig {
    /// Creates a configuration with the given cuts and the default
    /// compatibility window.
    #[must_use]
    pub fn new(quality: QualityCuts) -> Self {
        Self {
            compatibility: CompatibilityConfig::default(),
            quality,
        }
    }

    /// Sets the compatibility window.
    #[must_use]
    pub fn with_compatibility(mut self, compatibility: CompatibilityConfig) -> Self {
        self.compatibility = compatibility;
        self
    }

    /// Validates both parts of the configuration.
    pub fn validate(&self) -> Result<()> {
        self.compatibility.validate()?;
        self.quality.validate()
    }
}
