//! Relationship pass

use schemagrade_core::{Diagnostic, DiagnosticCode, SubjectKind};
use schemagrade_model::{Model, Relationship};

use crate::error::{resolve_entity, ReconcileError};
use crate::pool::UnmatchedPool;
use crate::reconciler::Reconciler;

/// A relationship with its endpoint names resolved
struct Endpoints<'m> {
    relationship: &'m Relationship,
    entity1: &'m str,
    entity2: &'m str,
}

impl<'m> Endpoints<'m> {
    fn resolve(model: &'m Model, relationship: &'m Relationship) -> Result<Self, ReconcileError> {
        let context = || format!("relationship '{}'", relationship.id);
        Ok(Self {
            relationship,
            entity1: &resolve_entity(model, relationship.entity1, context)?.name,
            entity2: &resolve_entity(model, relationship.entity2, context)?.name,
        })
    }
}

impl<'m> Reconciler<'m> {
    /// Match relationships by both endpoint names and the relationship name
    ///
    /// Endpoints are compared in declared order; a relationship drawn the
    /// other way round does not correspond.
    pub fn reconcile_relationships(&mut self) -> Result<(), ReconcileError> {
        let source = self.source;
        let solution = self.solution;

        let candidates = solution
            .relationships
            .iter()
            .map(|relationship| Endpoints::resolve(solution, relationship))
            .collect::<Result<Vec<_>, _>>()?;
        let mut pool = UnmatchedPool::new(candidates);

        for src_relationship in &source.relationships {
            let src = Endpoints::resolve(source, src_relationship)?;

            let slot = pool.find(|sol| {
                self.names_match(src.entity1, sol.entity1)
                    && self.names_match(src.entity2, sol.entity2)
                    && self.names_match(&src_relationship.name, &sol.relationship.name)
            });

            match slot.and_then(|slot| pool.claim(slot)) {
                Some(sol) => self.compare_relationships(&src, &sol),
                None => self.emit(
                    Diagnostic::new(
                        DiagnosticCode::RelationshipNotFound,
                        SubjectKind::Relationship,
                        format!(
                            "Relationship '{}' between '{}' and '{}' not found in solution model",
                            src_relationship.name, src.entity1, src.entity2
                        ),
                    )
                    .with_subject_id(&src_relationship.id)
                    .with_subject_name(&src_relationship.name),
                ),
            }
        }

        tracing::debug!(unmatched_in_solution = pool.remaining(), "Relationship pass finished");

        for sol in pool.into_unclaimed() {
            self.emit(
                Diagnostic::new(
                    DiagnosticCode::RelationshipUnmatchedInSolution,
                    SubjectKind::Relationship,
                    format!(
                        "Unmatched relationship in solution model: '{}' between '{}' and '{}'",
                        sol.relationship.name, sol.entity1, sol.entity2
                    ),
                )
                .with_subject_name(&sol.relationship.name),
            );
        }

        Ok(())
    }

    fn compare_relationships(&mut self, src: &Endpoints<'m>, sol: &Endpoints<'m>) {
        let (s, t) = (src.relationship, sol.relationship);

        if s.cardinality_1to2 != t.cardinality_1to2 || s.cardinality_2to1 != t.cardinality_2to1 {
            self.emit(
                Diagnostic::new(
                    DiagnosticCode::RelationshipCardinalityMismatch,
                    SubjectKind::Relationship,
                    format!(
                        "Relationship '{}' between '{}' and '{}' cardinality mismatch",
                        s.name, src.entity1, src.entity2
                    ),
                )
                .with_subject_id(&s.id)
                .with_subject_name(&s.name)
                .with_comparison(
                    format!("{} / {}", t.cardinality_1to2, t.cardinality_2to1),
                    format!("{} / {}", s.cardinality_1to2, s.cardinality_2to1),
                ),
            );
        }

        if s.dependent_e1 != t.dependent_e1 || s.dependent_e2 != t.dependent_e2 {
            self.emit(
                Diagnostic::new(
                    DiagnosticCode::RelationshipDependencyMismatch,
                    SubjectKind::Relationship,
                    format!(
                        "Relationship '{}' between '{}' and '{}' dependency mismatch",
                        s.name, src.entity1, src.entity2
                    ),
                )
                .with_subject_id(&s.id)
                .with_subject_name(&s.name)
                .with_comparison(
                    format!("{} / {}", t.dependent_e1, t.dependent_e2),
                    format!("{} / {}", s.dependent_e1, s.dependent_e2),
                ),
            );
        }
    }
}
