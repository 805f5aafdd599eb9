//! Batch evaluation of segment candidates.

use dtseg_core::{
    ClusterForFit, Error, EvaluatorConfig, ExtendedSegmentCandidate, Result, SegmentCandidate,
    SuperLayerId,
};
use log::{debug, warn};
use rayon::prelude::*;

use crate::extension::extend_candidate_indexed;
use crate::ranking::{compare_candidates, first_max_by};

#[cfg(feature = "serde")]
use serde::Serialize;

/// Outcome of evaluating one candidate.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Evaluation {
    /// Position of the candidate in the input slice.
    pub index: usize,
    /// Superlayer of the base segment.
    pub superlayer: SuperLayerId,
    /// Hits of the base segment.
    pub base_hits: usize,
    /// Base hits plus attached clusters.
    pub n_hits: usize,
    /// Indices (into the cluster slice) of the attached clusters.
    pub attached_clusters: Vec<usize>,
    /// chi2 / ndof of the base fit, `None` when the fit has no degrees of freedom.
    pub reduced_chi2: Option<f64>,
    /// Whether the base segment passes the quality cuts.
    pub good: bool,
}

/// A candidate that could not be evaluated.
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    /// Position of the candidate in the input slice.
    pub index: usize,
    /// Why evaluation failed.
    pub error: Error,
}

/// Aggregate counts over one batch.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct SelectionStatistics {
    /// Candidates in the batch.
    pub candidates: usize,
    /// Candidates passing the quality cuts.
    pub good: usize,
    /// Candidates failing the quality cuts.
    pub rejected: usize,
    /// Candidates that could not be evaluated.
    pub failed: usize,
    /// Cluster attachments over all candidates.
    pub attached_clusters: usize,
    /// Mean chi2 / ndof of the good candidates.
    pub mean_good_reduced_chi2: Option<f64>,
}

impl SelectionStatistics {
    /// Fraction of evaluated candidates that are good.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn efficiency(&self) -> Option<f64> {
        let evaluated = self.good + self.rejected;
        if evaluated > 0 {
            Some(self.good as f64 / evaluated as f64)
        } else {
            None
        }
    }
}

/// Result of [`evaluate_batch`].
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Successful evaluations, in input order.
    pub evaluations: Vec<Evaluation>,
    /// Failed evaluations, in input order.
    pub failures: Vec<Failure>,
    /// Index of the best good candidate, if any.
    pub best: Option<usize>,
    /// Aggregate counts.
    pub statistics: SelectionStatistics,
}

impl BatchReport {
    /// Evaluations that pass the quality cuts.
    pub fn good(&self) -> impl Iterator<Item = &Evaluation> {
        self.evaluations.iter().filter(|evaluation| evaluation.good)
    }
}

/// Extends and evaluates one candidate against the cluster pool.
///
/// # Errors
/// Returns the first error met while extending or applying the cuts.
pub fn evaluate_candidate<'a, C: SegmentCandidate>(
    index: usize,
    candidate: &'a C,
    clusters: &[ClusterForFit],
    config: &EvaluatorConfig,
) -> Result<(Evaluation, ExtendedSegmentCandidate<&'a C>)> {
    let (extended, attached_clusters) = extend_candidate_indexed(candidate, clusters, *config)?;
    let good = extended.good()?;
    let reduced_chi2 = extended.reduced_chi2().ok();

    let evaluation = Evaluation {
        index,
        superlayer: candidate.superlayer(),
        base_hits: candidate.n_hits(),
        n_hits: extended.n_hits(),
        attached_clusters,
        reduced_chi2,
        good,
    };
    Ok((evaluation, extended))
}

/// Evaluates every candidate against the shared cluster pool in parallel.
///
/// # Errors
/// Returns a configuration error if `config` does not validate. Errors of
/// individual candidates are collected in [`BatchReport::failures`].
pub fn evaluate_batch<C: SegmentCandidate>(
    candidates: &[C],
    clusters: &[ClusterForFit],
    config: &EvaluatorConfig,
) -> Result<BatchReport> {
    config.validate()?;

    let outcomes: Vec<_> = candidates
        .par_iter()
        .enumerate()
        .map(|(index, candidate)| {
            evaluate_candidate(index, candidate, clusters, config).map_err(|error| Failure {
                index,
                error,
            })
        })
        .collect();

    let mut report = BatchReport::default();
    let mut good_candidates: Vec<(usize, ExtendedSegmentCandidate<&C>)> = Vec::new();
    let mut good_chi2_sum = 0.0;

    for outcome in outcomes {
        match outcome {
            Ok((evaluation, extended)) => {
                report.statistics.attached_clusters += evaluation.attached_clusters.len();
                if evaluation.good {
                    report.statistics.good += 1;
                    good_chi2_sum += evaluation.reduced_chi2.unwrap_or_default();
                    good_candidates.push((evaluation.index, extended));
                } else {
                    report.statistics.rejected += 1;
                }
                report.evaluations.push(evaluation);
            }
            Err(failure) => {
                warn!("candidate {} not evaluated: {}", failure.index, failure.error);
                report.statistics.failed += 1;
                report.failures.push(failure);
            }
        }
    }

    report.statistics.candidates = candidates.len();
    if report.statistics.good > 0 {
        #[allow(clippy::cast_precision_loss)]
        let mean = good_chi2_sum / report.statistics.good as f64;
        report.statistics.mean_good_reduced_chi2 = Some(mean);
    }
    report.best = first_max_by(good_candidates, |(_, a), (_, b)| compare_candidates(a, b))
        .map(|(index, _)| index);

    debug!(
        "batch: {} candidates, {} good, {} rejected, {} failed",
        report.statistics.candidates,
        report.statistics.good,
        report.statistics.rejected,
        report.statistics.failed
    );
    Ok(report)
}
