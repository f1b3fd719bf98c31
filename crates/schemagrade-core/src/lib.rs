//! schemagrade core
//!
//! Shared vocabulary of the grader: diagnostics, reports, configuration and
//! the name similarity scorer.
//! Never rename diagnostic codes - they are part of the public API.

pub mod diagnostic;
pub mod similarity;
pub mod report;
pub mod config;

pub use diagnostic::{
    Diagnostic, DiagnosticCategory, DiagnosticCode, DiagnosticLog, Severity, SubjectKind,
};
pub use similarity::{NameScorer, WordMatch};
pub use report::{Report, ReportSummary, ReportVersion};
pub use config::{
    BatchConfig, Config, ConfigError, MatchingConfig, SeverityThreshold, DEFAULT_NAME_THRESHOLD,
};
