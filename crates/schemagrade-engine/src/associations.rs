//! Association and association link passes

use schemagrade_core::{Diagnostic, DiagnosticCode, SubjectKind};
use schemagrade_model::{Association, AssociationLink, Model};

use crate::error::{resolve_association, resolve_entity, ReconcileError};
use crate::pool::UnmatchedPool;
use crate::reconciler::Reconciler;

/// A link with its association and entity names resolved
struct Link<'m> {
    link: &'m AssociationLink,
    association: &'m str,
    entity: &'m str,
}

impl<'m> Link<'m> {
    fn resolve(model: &'m Model, link: &'m AssociationLink) -> Result<Self, ReconcileError> {
        let context = || format!("association link '{}'", link.id);
        Ok(Self {
            link,
            association: &resolve_association(model, link.association, context)?.name,
            entity: &resolve_entity(model, link.entity, context)?.name,
        })
    }
}

impl<'m> Reconciler<'m> {
    /// Match associations by name, requiring their attributes to agree
    pub fn reconcile_associations(&mut self) -> Result<(), ReconcileError> {
        let source = self.source;
        let solution = self.solution;
        let mut pool = UnmatchedPool::new(solution.associations.iter());

        for src_association in &source.associations {
            let mut name_matched = false;

            let slot = pool.find(|candidate| {
                if !self.names_match(&src_association.name, &candidate.name) {
                    return false;
                }
                name_matched = true;
                self.attributes_agree(src_association, candidate)
            });

            if slot.and_then(|slot| pool.claim(slot)).is_some() {
                continue;
            }

            let (code, message) = if name_matched {
                (
                    DiagnosticCode::AssociationAttributesMismatch,
                    format!("Association '{}' attributes mismatch", src_association.name),
                )
            } else {
                (
                    DiagnosticCode::AssociationNotFound,
                    format!("Association '{}' not found in solution model", src_association.name),
                )
            };

            self.emit(
                Diagnostic::new(code, SubjectKind::Association, message)
                    .with_subject_id(&src_association.id)
                    .with_subject_name(&src_association.name),
            );
        }

        tracing::debug!(unmatched_in_solution = pool.remaining(), "Association pass finished");

        for sol_association in pool.into_unclaimed() {
            self.emit(
                Diagnostic::new(
                    DiagnosticCode::AssociationUnmatchedInSolution,
                    SubjectKind::Association,
                    format!("Unmatched association in solution model: '{}'", sol_association.name),
                )
                .with_subject_name(&sol_association.name),
            );
        }

        Ok(())
    }

    /// Existence check: each source attribute has some candidate attribute above
    /// the threshold. Candidate attributes are not consumed.
    ///
    /// An attributeless association only agrees with another attributeless one.
    fn attributes_agree(&self, src: &Association, sol: &Association) -> bool {
        if src.attributes.is_empty() != sol.attributes.is_empty() {
            return false;
        }

        src.attributes.iter().all(|src_attr| {
            sol.attributes
                .iter()
                .any(|sol_attr| self.names_match(&src_attr.name, &sol_attr.name))
        })
    }

    /// Match links by association name and entity name
    ///
    /// A cardinality difference is reported but the link still counts as found.
    pub fn reconcile_association_links(&mut self) -> Result<(), ReconcileError> {
        let source = self.source;
        let solution = self.solution;

        let candidates = solution
            .association_links
            .iter()
            .map(|link| Link::resolve(solution, link))
            .collect::<Result<Vec<_>, _>>()?;
        let mut pool = UnmatchedPool::new(candidates);

        for src_link in &source.association_links {
            let src = Link::resolve(source, src_link)?;

            let slot = pool.find(|sol| {
                self.names_match(src.association, sol.association)
                    && self.names_match(src.entity, sol.entity)
            });

            let Some(sol) = slot.and_then(|slot| pool.claim(slot)) else {
                self.emit(
                    Diagnostic::new(
                        DiagnosticCode::AssociationLinkNotFound,
                        SubjectKind::AssociationLink,
                        format!(
                            "Association link '{}' - '{}' not found in solution model",
                            src.association, src.entity
                        ),
                    )
                    .with_subject_id(&src_link.id)
                    .with_subject_name(src.association),
                );
                continue;
            };

            if src_link.cardinality != sol.link.cardinality {
                self.emit(
                    Diagnostic::new(
                        DiagnosticCode::AssociationLinkCardinalityMismatch,
                        SubjectKind::AssociationLink,
                        format!(
                            "Association link '{}' - '{}' cardinality mismatch",
                            src.association, src.entity
                        ),
                    )
                    .with_subject_id(&src_link.id)
                    .with_subject_name(src.association)
                    .with_comparison(sol.link.cardinality.as_str(), src_link.cardinality.as_str()),
                );
            }
        }

        tracing::debug!(unmatched_in_solution = pool.remaining(), "Association link pass finished");

        for sol in pool.into_unclaimed() {
            self.emit(
                Diagnostic::new(
                    DiagnosticCode::AssociationLinkUnmatchedInSolution,
                    SubjectKind::AssociationLink,
                    format!(
                        "Unmatched association link in solution model: '{}' - '{}'",
                        sol.association, sol.entity
                    ),
                )
                .with_subject_name(sol.association),
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use schemagrade_core::{DiagnosticCode, DiagnosticLog};
    use schemagrade_model::*;
    use crate::reconciler::{ReconcileOptions, Reconciler};

    fn codes(log: &DiagnosticLog) -> Vec<DiagnosticCode> {
        log.iter().map(|d| d.code).collect()
    }

    fn associations(source: &Model, solution: &Model) -> DiagnosticLog {
        let options = ReconcileOptions::default();
        let mut reconciler = Reconciler::new(source, solution, &options);
        reconciler.reconcile_associations().unwrap();
        reconciler.into_log()
    }

    fn links(source: &Model, solution: &Model) -> DiagnosticLog {
        let options = ReconcileOptions::default();
        let mut reconciler = Reconciler::new(source, solution, &options);
        reconciler.reconcile_association_links().unwrap();
        reconciler.into_log()
    }

    fn with_association(association: AssociationDocument) -> Model {
        ModelDocument::new("m", "Shop")
            .with_association(association)
            .link()
            .unwrap()
    }

    fn enrolment(student_card: Cardinality) -> Model {
        ModelDocument::new("m", "School")
            .with_entity(EntityDocument::new("e1", "Student"))
            .with_entity(EntityDocument::new("e2", "Course"))
            .with_association(AssociationDocument::new("a1", "Enrolment"))
            .with_association_link(AssociationLinkDocument::new("l1", "a1", "e1", student_card))
            .with_association_link(AssociationLinkDocument::new("l2", "a1", "e2", Cardinality::ZeroOrMany))
            .link()
            .unwrap()
    }

    #[test]
    fn attributeless_associations_match_by_name() {
        let source = with_association(AssociationDocument::new("a1", "Enrolment"));
        let solution = with_association(AssociationDocument::new("a9", "Enrollment"));

        assert!(associations(&source, &solution).is_empty());
    }

    #[test]
    fn missing_every_attribute_is_attributes_mismatch() {
        let source = with_association(AssociationDocument::new("a1", "Enrolment"));
        let solution = with_association(
            AssociationDocument::new("a1", "Enrolment")
                .with_attribute(AttributeDocument::new("x1", "grade", "I")),
        );

        let log = associations(&source, &solution);
        assert_eq!(
            codes(&log),
            vec![
                DiagnosticCode::AssociationAttributesMismatch,
                DiagnosticCode::AssociationUnmatchedInSolution,
            ]
        );
        assert_eq!(log.iter().next().unwrap().subject_id.as_deref(), Some("a1"));
    }

    #[test]
    fn attribute_check_is_existence_only() {
        let source = with_association(
            AssociationDocument::new("a1", "Enrolment")
                .with_attribute(AttributeDocument::new("x1", "grade", "I"))
                .with_attribute(AttributeDocument::new("x2", "grade", "I")),
        );
        let solution = with_association(
            AssociationDocument::new("a1", "Enrolment")
                .with_attribute(AttributeDocument::new("x1", "grade", "I"))
                .with_attribute(AttributeDocument::new("x2", "date", "D")),
        );

        assert!(associations(&source, &solution).is_empty());
    }

    #[test]
    fn name_match_with_wrong_attributes_is_attributes_mismatch() {
        let source = with_association(
            AssociationDocument::new("a1", "Enrolment")
                .with_attribute(AttributeDocument::new("x1", "grade", "I")),
        );
        let solution = with_association(
            AssociationDocument::new("a1", "Enrolment")
                .with_attribute(AttributeDocument::new("x1", "semester", "I")),
        );

        let log = associations(&source, &solution);
        assert_eq!(
            codes(&log),
            vec![
                DiagnosticCode::AssociationAttributesMismatch,
                DiagnosticCode::AssociationUnmatchedInSolution,
            ]
        );
    }

    #[test]
    fn unknown_association_is_not_found() {
        let source = with_association(AssociationDocument::new("a1", "Enrolment"));
        let solution = with_association(AssociationDocument::new("a1", "Purchase"));

        let log = associations(&source, &solution);
        assert_eq!(
            codes(&log),
            vec![DiagnosticCode::AssociationNotFound, DiagnosticCode::AssociationUnmatchedInSolution]
        );
    }

    #[test]
    fn link_cardinality_mismatch_still_counts_as_found() {
        let source = enrolment(Cardinality::ExactlyOne);
        let solution = enrolment(Cardinality::OneOrMany);

        let log = links(&source, &solution);
        assert_eq!(codes(&log), vec![DiagnosticCode::AssociationLinkCardinalityMismatch]);

        let diagnostic = log.iter().next().unwrap();
        assert_eq!(diagnostic.subject_id.as_deref(), Some("l1"));
        assert_eq!(diagnostic.subject_name.as_deref(), Some("Enrolment"));
        assert_eq!(diagnostic.message, "Association link 'Enrolment' - 'Student' cardinality mismatch");
    }

    #[test]
    fn identical_links_are_silent() {
        let model = enrolment(Cardinality::OneOrMany);
        assert!(links(&model, &model).is_empty());
    }

    #[test]
    fn missing_link_on_each_side() {
        let source = ModelDocument::new("m", "School")
            .with_entity(EntityDocument::new("e1", "Student"))
            .with_entity(EntityDocument::new("e2", "Tutor"))
            .with_association(AssociationDocument::new("a1", "Enrolment"))
            .with_association_link(AssociationLinkDocument::new("l1", "a1", "e2", Cardinality::ZeroOrMany))
            .link()
            .unwrap();
        let solution = enrolment(Cardinality::ZeroOrMany);

        let log = links(&source, &solution);
        assert_eq!(
            codes(&log),
            vec![
                DiagnosticCode::AssociationLinkNotFound,
                DiagnosticCode::AssociationLinkUnmatchedInSolution,
                DiagnosticCode::AssociationLinkUnmatchedInSolution,
            ]
        );
        let unmatched: Vec<&str> = log.iter().skip(1).map(|d| d.message.as_str()).collect();
        assert_eq!(
            unmatched,
            vec![
                "Unmatched association link in solution model: 'Enrolment' - 'Student'",
                "Unmatched association link in solution model: 'Enrolment' - 'Course'",
            ]
        );
    }
}
