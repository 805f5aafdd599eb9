//! dtseg-algorithms: Candidate extension, ranking and batch evaluation.
//!
//! - **Extension** attaches compatible clusters from the other superlayers
//!   of a chamber to a fitted segment
//! - **Ranking** orders extended candidates by hit count, then chi2
//! - **Batch evaluation** runs both over many candidates in parallel
//!
#![warn(missing_docs)]

mod extension;
mod processing;
mod ranking;

pub use extension::{extend_candidate, extend_candidate_indexed};
pub use processing::{
    evaluate_batch, evaluate_candidate, BatchReport, Evaluation, Failure, SelectionStatistics,
};
pub use ranking::{best_candidate, compare_candidates, rank_candidates};

// Re-export core evaluation types
pub use dtseg_core::{EvaluatorConfig, ExtendedSegmentCandidate, QualityCuts};
