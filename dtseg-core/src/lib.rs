//! dtseg-core: Core traits and types for drift-tube segment quality evaluation.
//!
//! This crate provides local-frame geometry, superlayer identifiers,
//! clusters, the segment candidate trait, evaluation configuration, and the
//! extended-candidate evaluator that decides cluster compatibility and
//! segment quality.
//!

pub mod candidate;
pub mod cluster;
pub mod config;
pub mod error;
pub mod extended;
pub mod geometry;
pub mod superlayer;

pub use candidate::{FittedSegment, SegmentCandidate};
pub use cluster::{ClusterForFit, SuperLayerCluster};
pub use config::{CompatibilityConfig, EvaluatorConfig, QualityCuts};
pub use error::{Error, Result};
pub use extended::ExtendedSegmentCandidate;
pub use geometry::{LocalError, LocalPoint, LocalVector};
pub use superlayer::SuperLayerId;
