//! Reconciliation of a submitted schema against a solution
//!
//! Each category pass follows the same template:
//! 1. seed an [`UnmatchedPool`] with every solution object of the category,
//! 2. walk source objects in graph order, claim the first corresponding
//!    candidate and compare the pair, or report the source object unmatched,
//! 3. report every candidate left in the pool as unmatched in the solution.
//!
//! Matching is greedy: a claimed candidate is never reconsidered.

use schemagrade_core::{
    Config, Diagnostic, DiagnosticLog, NameScorer, SeverityThreshold, DEFAULT_NAME_THRESHOLD,
};
use schemagrade_model::{Association, Attribute, Entity, Model};

use crate::error::ReconcileError;
use crate::pool::UnmatchedPool;

/// Knobs for one reconciliation run
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileOptions {
    /// Names correspond when their similarity is strictly above this
    pub name_threshold: f64,

    /// Per-code severity overrides
    pub severity: SeverityThreshold,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            name_threshold: DEFAULT_NAME_THRESHOLD,
            severity: SeverityThreshold::default(),
        }
    }
}

impl ReconcileOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            name_threshold: config.matching.name_threshold,
            severity: config.severity.clone(),
        }
    }
}

/// Anything matched by its display name
pub(crate) trait Named {
    fn name(&self) -> &str;
}

impl Named for Entity {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for Attribute {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for Association {
    fn name(&self) -> &str {
        &self.name
    }
}

/// One grading run over a source (submission) and a solution graph
///
/// Owns its scorer and log; nothing is shared between runs.
pub struct Reconciler<'m> {
    pub(crate) source: &'m Model,
    pub(crate) solution: &'m Model,
    pub(crate) options: &'m ReconcileOptions,
    pub(crate) scorer: NameScorer,
    log: DiagnosticLog,
}

impl<'m> Reconciler<'m> {
    pub fn new(source: &'m Model, solution: &'m Model, options: &'m ReconcileOptions) -> Self {
        Self {
            source,
            solution,
            options,
            scorer: NameScorer::new(),
            log: DiagnosticLog::new(),
        }
    }

    /// Run all five category passes and hand back the log
    pub fn run(mut self) -> Result<DiagnosticLog, ReconcileError> {
        tracing::debug!(
            source = %self.source.name,
            solution = %self.solution.name,
            threshold = self.options.name_threshold,
            "Reconciling models"
        );

        self.reconcile_entities()?;
        self.reconcile_relationships()?;
        self.reconcile_inheritances()?;
        self.reconcile_associations()?;
        self.reconcile_association_links()?;

        tracing::debug!(diagnostics = self.log.len(), "Reconciliation finished");
        Ok(self.log)
    }

    /// Diagnostics emitted so far
    pub fn log(&self) -> &DiagnosticLog {
        &self.log
    }

    pub fn into_log(self) -> DiagnosticLog {
        self.log
    }

    /// Append a diagnostic, applying any configured severity override
    pub(crate) fn emit(&mut self, diagnostic: Diagnostic) {
        let severity = self
            .options
            .severity
            .get_severity(diagnostic.code, diagnostic.severity);
        self.log.push(diagnostic.with_severity(severity));
    }

    pub(crate) fn threshold(&self) -> f64 {
        self.options.name_threshold
    }

    /// Strictly-above-threshold name correspondence
    pub(crate) fn names_match(&self, a: &str, b: &str) -> bool {
        self.scorer.similarity(a, b) > self.threshold()
    }

    /// Slot of the best-scoring candidate, if it clears the threshold
    ///
    /// Ties go to the earliest candidate in pool order.
    pub(crate) fn best_name_match<T: Named>(
        &self,
        pool: &UnmatchedPool<&T>,
        name: &str,
    ) -> Option<usize> {
        let (slots, names): (Vec<usize>, Vec<&str>) =
            pool.iter().map(|(slot, item)| (slot, item.name())).unzip();

        match self.scorer.best_match(name, &names) {
            Some((position, score)) if score > self.threshold() => Some(slots[position]),
            _ => None,
        }
    }
}

/// Reconcile `source` against `solution` with the given options
pub fn reconcile(
    source: &Model,
    solution: &Model,
    options: &ReconcileOptions,
) -> Result<DiagnosticLog, ReconcileError> {
    Reconciler::new(source, solution, options).run()
}
