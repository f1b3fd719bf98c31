//! Batch grading of many submissions against one solution
//!
//! The solution is linked once and shared read-only. Every submission gets
//! its own reconciler, so one broken file never affects the others.

use schemagrade_core::{BatchConfig, Report};
use schemagrade_model::{load_model, DocumentError, Model};
use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::ReconcileError;
use crate::reconciler::{reconcile, ReconcileOptions};

/// Why a submission could not be graded
#[derive(Debug, thiserror::Error)]
pub enum GradeError {
    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
}

/// Outcome of grading one submission file
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmissionOutcome {
    Graded { report: Report },
    Failed { error: String },
}

impl SubmissionOutcome {
    pub fn report(&self) -> Option<&Report> {
        match self {
            Self::Graded { report } => Some(report),
            Self::Failed { .. } => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// One graded (or failed) file
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionResult {
    pub path: PathBuf,
    pub outcome: SubmissionOutcome,
}

/// Results of a whole batch, in grading order
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    pub results: Vec<SubmissionResult>,
}

impl BatchSummary {
    pub fn graded(&self) -> usize {
        self.results.iter().filter(|r| !r.outcome.is_failed()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| r.outcome.is_failed()).count()
    }

    /// Graded submissions whose report contains at least one error
    pub fn with_errors(&self) -> usize {
        self.results
            .iter()
            .filter_map(|r| r.outcome.report())
            .filter(|report| report.has_errors())
            .count()
    }

    /// Graded submissions without a single diagnostic
    pub fn clean(&self) -> usize {
        self.results
            .iter()
            .filter_map(|r| r.outcome.report())
            .filter(|report| report.diagnostics.is_empty())
            .count()
    }
}

pub struct BatchGrader {
    solution: Model,
    solution_label: String,
    options: ReconcileOptions,
}

impl BatchGrader {
    pub fn new(solution: Model, options: ReconcileOptions) -> Self {
        let solution_label = solution.name.clone();
        Self {
            solution,
            solution_label,
            options,
        }
    }

    /// Name recorded as the solution in every report (defaults to the model name)
    pub fn with_solution_label(mut self, label: impl Into<String>) -> Self {
        self.solution_label = label.into();
        self
    }

    pub fn solution(&self) -> &Model {
        &self.solution
    }

    /// Submission files under `dir`, sorted by path
    ///
    /// Only files with the configured extension are returned; file names
    /// matching a skip pattern are left out. Unreadable entries are ignored.
    pub fn discover(dir: &Path, config: &BatchConfig) -> Vec<PathBuf> {
        // Extensions may be compound ("cdm.json"), so match on the name suffix
        let suffix = format!(".{}", config.extension);

        let mut files: Vec<PathBuf> = WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| {
                let name = entry.file_name().to_string_lossy();
                name.ends_with(&suffix) && !config.is_skipped(&name)
            })
            .map(|entry| entry.into_path())
            .collect();

        files.sort();
        files
    }

    /// Grade an already linked submission
    pub fn grade_model(&self, label: impl Into<String>, submission: &Model) -> Result<Report, ReconcileError> {
        let log = reconcile(submission, &self.solution, &self.options)?;
        let metadata = serde_json::json!({
            "submission_model": submission.name,
            "submission_summary": submission.summary(),
        });

        Ok(Report::from_log(label, self.solution_label.clone(), log).with_metadata(metadata))
    }

    fn try_grade_file(&self, path: &Path) -> Result<Report, GradeError> {
        let submission = load_model(path)?;
        Ok(self.grade_model(path.display().to_string(), &submission)?)
    }

    /// Load, link and grade one file; failures become [`SubmissionOutcome::Failed`]
    pub fn grade_file(&self, path: &Path) -> SubmissionOutcome {
        match self.try_grade_file(path) {
            Ok(report) => {
                tracing::debug!(
                    path = %path.display(),
                    diagnostics = report.diagnostics.len(),
                    "Graded submission"
                );
                SubmissionOutcome::Graded { report }
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to grade submission");
                SubmissionOutcome::Failed { error: e.to_string() }
            }
        }
    }

    pub fn grade_all<I, P>(&self, paths: I) -> BatchSummary
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let results = paths
            .into_iter()
            .map(|path| {
                let path = path.as_ref();
                SubmissionResult {
                    path: path.to_path_buf(),
                    outcome: self.grade_file(path),
                }
            })
            .collect();

        BatchSummary { results }
    }
}
