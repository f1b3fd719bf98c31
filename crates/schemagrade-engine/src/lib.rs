//! SchemaGrade engine - reconciliation of schema graphs
//!
//! This crate implements the grading logic:
//! - Category passes (entities with their attributes and identifiers,
//!   relationships, inheritances, associations, association links)
//! - Greedy first-match correspondence over order-preserving pools
//! - Batch grading of submission directories

pub mod associations;
pub mod batch;
pub mod entities;
pub mod error;
pub mod inheritances;
pub mod pool;
pub mod reconciler;
pub mod relationships;

pub use batch::{BatchGrader, BatchSummary, GradeError, SubmissionOutcome, SubmissionResult};
pub use error::ReconcileError;
pub use pool::UnmatchedPool;
pub use reconciler::{reconcile, ReconcileOptions, Reconciler};
