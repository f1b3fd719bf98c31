//! Inheritance pass
//!
//! A solution inheritance corresponds when every source child finds some
//! solution child above the threshold and the parents match. Children are
//! checked first. When nothing corresponds, the reason reported is the one of
//! the closest failing candidate.

use schemagrade_core::{Diagnostic, DiagnosticCode, SubjectKind};
use schemagrade_model::{Inheritance, Model};

use crate::error::{resolve_entity, ReconcileError};
use crate::pool::UnmatchedPool;
use crate::reconciler::Reconciler;

struct Hierarchy<'m> {
    inheritance: &'m Inheritance,
    parent: &'m str,
    children: Vec<&'m str>,
}

impl<'m> Hierarchy<'m> {
    fn resolve(model: &'m Model, inheritance: &'m Inheritance) -> Result<Self, ReconcileError> {
        let context = || format!("inheritance '{}'", inheritance.id);
        let parent = &resolve_entity(model, inheritance.parent, context)?.name;
        let children = inheritance
            .children
            .iter()
            .map(|&child| resolve_entity(model, child, context).map(|e| e.name.as_str()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            inheritance,
            parent,
            children,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Failure {
    Children,
    Parent,
}

/// Outcome of testing one candidate
enum Verdict {
    Match,
    Fail { reason: Failure, closeness: f64 },
}

impl<'m> Reconciler<'m> {
    pub fn reconcile_inheritances(&mut self) -> Result<(), ReconcileError> {
        let source = self.source;
        let solution = self.solution;

        let candidates = solution
            .inheritances
            .iter()
            .map(|inheritance| Hierarchy::resolve(solution, inheritance))
            .collect::<Result<Vec<_>, _>>()?;
        let mut pool = UnmatchedPool::new(candidates);

        for src_inheritance in &source.inheritances {
            let src = Hierarchy::resolve(source, src_inheritance)?;

            let mut matched = None;
            let mut closest: Option<(Failure, f64)> = None;

            for (slot, sol) in pool.iter() {
                match self.judge(&src, sol) {
                    Verdict::Match => {
                        matched = Some(slot);
                        break;
                    }
                    Verdict::Fail { reason, closeness } => match closest {
                        Some((_, best)) if closeness <= best => {}
                        _ => closest = Some((reason, closeness)),
                    },
                }
            }

            if let Some(sol) = matched.and_then(|slot| pool.claim(slot)) {
                self.compare_inheritances(&src, &sol);
                continue;
            }

            let (code, message) = match closest.map(|(reason, _)| reason) {
                None => (
                    DiagnosticCode::InheritanceNotFound,
                    format!(
                        "Inheritance '{}' of parent '{}' not found in solution model",
                        src_inheritance.name, src.parent
                    ),
                ),
                Some(Failure::Children) => (
                    DiagnosticCode::InheritanceChildrenMismatch,
                    format!(
                        "Inheritance '{}' of parent '{}' children mismatch",
                        src_inheritance.name, src.parent
                    ),
                ),
                Some(Failure::Parent) => (
                    DiagnosticCode::InheritanceParentMismatch,
                    format!(
                        "Inheritance '{}' parent '{}' mismatch",
                        src_inheritance.name, src.parent
                    ),
                ),
            };

            self.emit(
                Diagnostic::new(code, SubjectKind::Inheritance, message)
                    .with_subject_id(&src_inheritance.id)
                    .with_subject_name(&src_inheritance.name),
            );
        }

        tracing::debug!(unmatched_in_solution = pool.remaining(), "Inheritance pass finished");

        for sol in pool.into_unclaimed() {
            self.emit(
                Diagnostic::new(
                    DiagnosticCode::InheritanceUnmatchedInSolution,
                    SubjectKind::Inheritance,
                    format!(
                        "Unmatched inheritance in solution model: '{}' of parent '{}'",
                        sol.inheritance.name, sol.parent
                    ),
                )
                .with_subject_name(&sol.inheritance.name),
            );
        }

        Ok(())
    }

    fn judge(&self, src: &Hierarchy<'_>, sol: &Hierarchy<'_>) -> Verdict {
        let threshold = self.threshold();

        let min_child = src
            .children
            .iter()
            .map(|child| self.scorer.compare_word(child, sol.children.as_slice()).score)
            .fold(1.0_f64, f64::min);
        let parent = self.scorer.similarity(src.parent, sol.parent);

        let reason = if min_child <= threshold {
            Failure::Children
        } else if parent <= threshold {
            Failure::Parent
        } else {
            return Verdict::Match;
        };

        Verdict::Fail {
            reason,
            closeness: parent.min(min_child),
        }
    }

    fn compare_inheritances(&mut self, src: &Hierarchy<'m>, sol: &Hierarchy<'m>) {
        let (s, t) = (src.inheritance, sol.inheritance);

        if s.mutually_exclusive != t.mutually_exclusive {
            self.emit(
                Diagnostic::new(
                    DiagnosticCode::InheritanceExclusivityMismatch,
                    SubjectKind::Inheritance,
                    format!("Inheritance '{}' mutually exclusive property mismatch", s.name),
                )
                .with_subject_id(&s.id)
                .with_subject_name(&s.name)
                .with_comparison(t.mutually_exclusive.to_string(), s.mutually_exclusive.to_string()),
            );
        }

        if s.complete != t.complete {
            self.emit(
                Diagnostic::new(
                    DiagnosticCode::InheritanceCompletenessMismatch,
                    SubjectKind::Inheritance,
                    format!("Inheritance '{}' complete property mismatch", s.name),
                )
                .with_subject_id(&s.id)
                .with_subject_name(&s.name)
                .with_comparison(t.complete.to_string(), s.complete.to_string()),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use schemagrade_core::{DiagnosticCode, DiagnosticLog};
    use schemagrade_model::*;
    use crate::reconciler::{ReconcileOptions, Reconciler};

    fn run(source: &Model, solution: &Model) -> DiagnosticLog {
        let options = ReconcileOptions::default();
        let mut reconciler = Reconciler::new(source, solution, &options);
        reconciler.reconcile_inheritances().unwrap();
        reconciler.into_log()
    }

    fn codes(log: &DiagnosticLog) -> Vec<DiagnosticCode> {
        log.iter().map(|d| d.code).collect()
    }

    fn zoo(inheritances: Vec<InheritanceDocument>) -> Model {
        let mut document = ModelDocument::new("m", "Zoo")
            .with_entity(EntityDocument::new("vehicle", "Vehicle"))
            .with_entity(EntityDocument::new("car", "Car"))
            .with_entity(EntityDocument::new("truck", "Truck"))
            .with_entity(EntityDocument::new("trunk", "Trunk"))
            .with_entity(EntityDocument::new("boat", "Boat"))
            .with_entity(EntityDocument::new("animal", "Animal"))
            .with_entity(EntityDocument::new("dog", "Dog"));
        document.inheritances = inheritances;
        document.link().unwrap()
    }

    #[test]
    fn child_subset_matches_and_flags_compare() {
        let source = zoo(vec![InheritanceDocument::new("h1", "kind", "vehicle", ["car"])]);
        let solution = zoo(vec![
            InheritanceDocument::new("h1", "type", "vehicle", ["truck", "car"]).with_flags(true, true),
        ]);

        let log = run(&source, &solution);
        assert_eq!(
            codes(&log),
            vec![
                DiagnosticCode::InheritanceExclusivityMismatch,
                DiagnosticCode::InheritanceCompletenessMismatch,
            ]
        );
    }

    #[test]
    fn parent_mismatch_when_children_agree() {
        let source = zoo(vec![InheritanceDocument::new("h1", "kind", "animal", ["car"])]);
        let solution = zoo(vec![InheritanceDocument::new("h1", "kind", "vehicle", ["car"])]);

        let log = run(&source, &solution);
        assert_eq!(
            codes(&log),
            vec![
                DiagnosticCode::InheritanceParentMismatch,
                DiagnosticCode::InheritanceUnmatchedInSolution,
            ]
        );
    }

    #[test]
    fn closest_failing_candidate_decides_the_reason() {
        // "Dog" shares nothing with "Car"; "Trunk" is one edit away from "Truck"
        let source = zoo(vec![InheritanceDocument::new("h1", "kind", "truck", ["car"])]);
        let solution = zoo(vec![
            InheritanceDocument::new("h1", "a", "truck", ["dog"]),
            InheritanceDocument::new("h2", "b", "trunk", ["car"]),
        ]);

        let log = run(&source, &solution);
        assert_eq!(log.iter().next().unwrap().code, DiagnosticCode::InheritanceParentMismatch);
        assert_eq!(log.count_by_code(DiagnosticCode::InheritanceUnmatchedInSolution), 2);
    }

    #[test]
    fn ties_keep_the_earliest_candidate() {
        // Both candidates score zero: one on children, one on parent
        let source = zoo(vec![InheritanceDocument::new("h1", "kind", "dog", ["car"])]);
        let solution = zoo(vec![
            InheritanceDocument::new("h1", "a", "truck", ["dog"]),
            InheritanceDocument::new("h2", "b", "vehicle", ["car"]),
        ]);

        let log = run(&source, &solution);
        assert_eq!(log.iter().next().unwrap().code, DiagnosticCode::InheritanceChildrenMismatch);
    }

    #[test]
    fn empty_pool_is_not_found() {
        let source = zoo(vec![InheritanceDocument::new("h1", "kind", "vehicle", ["car"])]);
        let solution = zoo(vec![]);

        let log = run(&source, &solution);
        assert_eq!(codes(&log), vec![DiagnosticCode::InheritanceNotFound]);
        assert_eq!(log.iter().next().unwrap().subject_id.as_deref(), Some("h1"));
    }

    #[test]
    fn candidate_without_children_fails_on_children() {
        let source = zoo(vec![InheritanceDocument::new("h1", "kind", "vehicle", ["car"])]);
        let solution = zoo(vec![InheritanceDocument::new("h1", "kind", "vehicle", Vec::<String>::new())]);

        let log = run(&source, &solution);
        assert_eq!(log.iter().next().unwrap().code, DiagnosticCode::InheritanceChildrenMismatch);
    }
}
