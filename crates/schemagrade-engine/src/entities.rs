//! Entity pass, with nested attribute and identifier passes per matched pair

use schemagrade_core::{Diagnostic, DiagnosticCode, SubjectKind};
use schemagrade_model::{Entity, Identifier};

use crate::error::{resolve_attribute, ReconcileError};
use crate::pool::UnmatchedPool;
use crate::reconciler::Reconciler;

impl<'m> Reconciler<'m> {
    /// Match entities by name, then reconcile attributes and identifiers of each pair
    pub fn reconcile_entities(&mut self) -> Result<(), ReconcileError> {
        let source = self.source;
        let solution = self.solution;
        let mut pool = UnmatchedPool::new(solution.entities.iter());

        for src_entity in &source.entities {
            let claimed = self
                .best_name_match(&pool, &src_entity.name)
                .and_then(|slot| pool.claim(slot));

            match claimed {
                Some(sol_entity) => {
                    tracing::trace!(source = %src_entity.name, solution = %sol_entity.name, "Matched entity");
                    self.compare_entities(src_entity, sol_entity)?;
                }
                None => self.emit(
                    Diagnostic::new(
                        DiagnosticCode::EntityNotFound,
                        SubjectKind::Entity,
                        format!("Entity '{}' not found in solution model", src_entity.name),
                    )
                    .with_subject_id(&src_entity.id)
                    .with_subject_name(&src_entity.name),
                ),
            }
        }

        tracing::debug!(unmatched_in_solution = pool.remaining(), "Entity pass finished");

        for sol_entity in pool.into_unclaimed() {
            self.emit(
                Diagnostic::new(
                    DiagnosticCode::EntityUnmatchedInSolution,
                    SubjectKind::Entity,
                    format!("Unmatched entity in solution model: '{}'", sol_entity.name),
                )
                .with_subject_name(&sol_entity.name),
            );
        }

        Ok(())
    }

    fn compare_entities(&mut self, src: &'m Entity, sol: &'m Entity) -> Result<(), ReconcileError> {
        if src.is_child != sol.is_child {
            self.emit(
                Diagnostic::new(
                    DiagnosticCode::EntityChildMismatch,
                    SubjectKind::Entity,
                    format!("Entity '{}' inheritance child property mismatch", src.name),
                )
                .with_subject_id(&src.id)
                .with_subject_name(&src.name)
                .with_comparison(sol.is_child.to_string(), src.is_child.to_string()),
            );
        }

        self.reconcile_attributes(src, sol);
        self.reconcile_identifiers(src, sol)
    }

    /// Attributes of one matched entity pair, matched by name
    fn reconcile_attributes(&mut self, src_entity: &'m Entity, sol_entity: &'m Entity) {
        let mut pool = UnmatchedPool::new(sol_entity.attributes.iter());

        for src_attr in &src_entity.attributes {
            let claimed = self
                .best_name_match(&pool, &src_attr.name)
                .and_then(|slot| pool.claim(slot));

            let Some(sol_attr) = claimed else {
                self.emit(
                    Diagnostic::new(
                        DiagnosticCode::AttributeNotFound,
                        SubjectKind::Attribute,
                        format!(
                            "Attribute '{}' of entity '{}' not found in solution model",
                            src_attr.name, src_entity.name
                        ),
                    )
                    .with_subject_id(&src_entity.id)
                    .with_subject_name(&src_attr.name),
                );
                continue;
            };

            if src_attr.datatype != sol_attr.datatype {
                self.emit(
                    Diagnostic::new(
                        DiagnosticCode::AttributeDatatypeMismatch,
                        SubjectKind::Attribute,
                        format!("Attribute '{}' datatype mismatch", src_attr.name),
                    )
                    .with_subject_id(&src_entity.id)
                    .with_subject_name(&src_attr.name)
                    .with_comparison(sol_attr.datatype.label(), src_attr.datatype.label()),
                );
            }

            if src_attr.mandatory != sol_attr.mandatory {
                self.emit(
                    Diagnostic::new(
                        DiagnosticCode::AttributeMandatoryMismatch,
                        SubjectKind::Attribute,
                        format!("Attribute '{}' mandatory property mismatch", src_attr.name),
                    )
                    .with_subject_id(&src_entity.id)
                    .with_subject_name(&src_attr.name)
                    .with_comparison(sol_attr.mandatory.to_string(), src_attr.mandatory.to_string()),
                );
            }
        }

        for sol_attr in pool.into_unclaimed() {
            self.emit(
                Diagnostic::new(
                    DiagnosticCode::AttributeUnmatchedInSolution,
                    SubjectKind::Attribute,
                    format!(
                        "Unmatched attribute in entity '{}': '{}'",
                        src_entity.name, sol_attr.name
                    ),
                )
                .with_subject_id(&src_entity.id)
                .with_subject_name(&sol_attr.name),
            );
        }
    }

    /// Identifiers of one matched entity pair, matched by member attribute names
    ///
    /// A source identifier corresponds to the first candidate for which every
    /// source member scores at least the threshold against one of the
    /// candidate's members. Member order is irrelevant.
    fn reconcile_identifiers(&mut self, src_entity: &'m Entity, sol_entity: &'m Entity) -> Result<(), ReconcileError> {
        let candidates = sol_entity
            .identifiers
            .iter()
            .map(|identifier| member_names(sol_entity, identifier).map(|names| (identifier, names)))
            .collect::<Result<Vec<_>, _>>()?;
        let mut pool = UnmatchedPool::new(candidates);

        for src_identifier in &src_entity.identifiers {
            let src_members = member_names(src_entity, src_identifier)?;

            let slot = pool.find(|(_, sol_members)| {
                src_members.iter().all(|member| {
                    self.scorer.compare_word(member, sol_members.as_slice()).score >= self.threshold()
                })
            });

            let Some((sol_identifier, _)) = slot.and_then(|slot| pool.claim(slot)) else {
                self.emit(
                    Diagnostic::new(
                        DiagnosticCode::IdentifierNotFound,
                        SubjectKind::Identifier,
                        format!(
                            "Identifier '{}' of entity '{}' has no solution identifier over the same attributes",
                            src_identifier.name, src_entity.name
                        ),
                    )
                    .with_subject_id(&src_entity.id)
                    .with_subject_name(&src_identifier.name),
                );
                continue;
            };

            if src_identifier.is_primary != sol_identifier.is_primary {
                self.emit(
                    Diagnostic::new(
                        DiagnosticCode::IdentifierPrimaryMismatch,
                        SubjectKind::Identifier,
                        format!(
                            "Entity '{}' identifier '{}' primary property mismatch",
                            src_entity.name, src_identifier.name
                        ),
                    )
                    .with_subject_id(&src_entity.id)
                    .with_subject_name(&src_identifier.name)
                    .with_comparison(
                        sol_identifier.is_primary.to_string(),
                        src_identifier.is_primary.to_string(),
                    ),
                );
            }
        }

        for (sol_identifier, _) in pool.into_unclaimed() {
            self.emit(
                Diagnostic::new(
                    DiagnosticCode::IdentifierUnmatchedInSolution,
                    SubjectKind::Identifier,
                    format!(
                        "Unmatched identifier in entity '{}': '{}'",
                        src_entity.name, sol_identifier.name
                    ),
                )
                .with_subject_id(&src_entity.id)
                .with_subject_name(&sol_identifier.name),
            );
        }

        Ok(())
    }
}

fn member_names<'m>(entity: &'m Entity, identifier: &Identifier) -> Result<Vec<&'m str>, ReconcileError> {
    identifier
        .attributes
        .iter()
        .map(|&handle| {
            resolve_attribute(entity, handle, || {
                format!("identifier '{}' of entity '{}'", identifier.id, entity.id)
            })
            .map(|attribute| attribute.name.as_str())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use schemagrade_core::{DiagnosticCode, DiagnosticLog};
    use schemagrade_model::*;
    use crate::reconciler::{ReconcileOptions, Reconciler};

    fn run_entities(source: &Model, solution: &Model) -> DiagnosticLog {
        let options = ReconcileOptions::default();
        let mut reconciler = Reconciler::new(source, solution, &options);
        reconciler.reconcile_entities().unwrap();
        reconciler.into_log()
    }

    fn codes(log: &DiagnosticLog) -> Vec<DiagnosticCode> {
        log.iter().map(|d| d.code).collect()
    }

    fn person(attributes: Vec<AttributeDocument>, identifiers: Vec<IdentifierDocument>) -> Model {
        let mut entity = EntityDocument::new("e1", "Person");
        entity.attributes = attributes;
        entity.identifiers = identifiers;
        ModelDocument::new("m", "M").with_entity(entity).link().unwrap()
    }

    #[test]
    fn best_match_wins_over_pool_order() {
        let source = ModelDocument::new("s", "S")
            .with_entity(EntityDocument::new("s1", "Customers"))
            .link()
            .unwrap();
        let solution = ModelDocument::new("t", "T")
            .with_entity(EntityDocument::new("t1", "Costumer"))
            .with_entity(EntityDocument::new("t2", "Customer"))
            .link()
            .unwrap();

        let log = run_entities(&source, &solution);
        // "Customers" claims "Customer"; "Costumer" is left over
        assert_eq!(codes(&log), vec![DiagnosticCode::EntityUnmatchedInSolution]);
        assert!(log.iter().next().unwrap().message.contains("'Costumer'"));
    }

    #[test]
    fn claimed_entity_is_not_reused() {
        let source = ModelDocument::new("s", "S")
            .with_entity(EntityDocument::new("s1", "Film"))
            .with_entity(EntityDocument::new("s2", "Film"))
            .link()
            .unwrap();
        let solution = ModelDocument::new("t", "T")
            .with_entity(EntityDocument::new("t1", "Film"))
            .link()
            .unwrap();

        let log = run_entities(&source, &solution);
        assert_eq!(codes(&log), vec![DiagnosticCode::EntityNotFound]);
        assert_eq!(log.iter().next().unwrap().subject_id.as_deref(), Some("s2"));
    }

    #[test]
    fn datatype_and_mandatory_are_independent_diagnostics() {
        let source = person(vec![AttributeDocument::new("a1", "birth date", "VA20")], vec![]);
        let solution = person(vec![AttributeDocument::new("a1", "birth date", "D").mandatory()], vec![]);

        let log = run_entities(&source, &solution);
        assert_eq!(
            codes(&log),
            vec![
                DiagnosticCode::AttributeDatatypeMismatch,
                DiagnosticCode::AttributeMandatoryMismatch,
            ]
        );
        let datatype = log.iter().next().unwrap();
        assert_eq!(datatype.expected.as_deref(), Some("Date"));
        assert_eq!(datatype.actual.as_deref(), Some("VARCHAR"));
        assert_eq!(datatype.subject_id.as_deref(), Some("e1"));
    }

    #[test]
    fn unmatched_attributes_on_both_sides() {
        let source = person(vec![AttributeDocument::new("a1", "nickname", "VA")], vec![]);
        let solution = person(vec![AttributeDocument::new("a1", "surname", "VA")], vec![]);

        let log = run_entities(&source, &solution);
        assert_eq!(
            codes(&log),
            vec![DiagnosticCode::AttributeNotFound, DiagnosticCode::AttributeUnmatchedInSolution]
        );
        let names: Vec<&str> = log.iter().filter_map(|d| d.subject_name.as_deref()).collect();
        assert_eq!(names, vec!["nickname", "surname"]);
    }

    #[test]
    fn identifier_matches_regardless_of_member_order() {
        let attributes = vec![
            AttributeDocument::new("a1", "first name", "VA"),
            AttributeDocument::new("a2", "last name", "VA"),
        ];
        let source = person(
            attributes.clone(),
            vec![IdentifierDocument::new("i1", "name key", ["a2", "a1"])],
        );
        let solution = person(
            attributes,
            vec![IdentifierDocument::new("i9", "different name", ["a1", "a2"])],
        );

        assert!(run_entities(&source, &solution).is_empty());
    }

    #[test]
    fn identifier_primary_mismatch() {
        let attributes = vec![AttributeDocument::new("a1", "tax number", "I")];
        let source = person(attributes.clone(), vec![IdentifierDocument::new("i1", "tax", ["a1"])]);

        let mut entity = EntityDocument::new("e1", "Person")
            .with_primary_identifier(IdentifierDocument::new("i1", "tax", ["a1"]));
        entity.attributes = attributes;
        let solution = ModelDocument::new("m", "M").with_entity(entity).link().unwrap();

        let log = run_entities(&source, &solution);
        assert_eq!(codes(&log), vec![DiagnosticCode::IdentifierPrimaryMismatch]);
    }

    #[test]
    fn identifier_with_foreign_members_is_unmatched() {
        let attributes = vec![
            AttributeDocument::new("a1", "tax number", "I"),
            AttributeDocument::new("a2", "passport", "VA"),
        ];
        let source = person(attributes.clone(), vec![IdentifierDocument::new("i1", "k", ["a2"])]);
        let solution = person(attributes, vec![IdentifierDocument::new("i1", "k", ["a1"])]);

        let log = run_entities(&source, &solution);
        assert_eq!(
            codes(&log),
            vec![DiagnosticCode::IdentifierNotFound, DiagnosticCode::IdentifierUnmatchedInSolution]
        );
    }

    #[test]
    fn child_flag_mismatch() {
        let source = ModelDocument::new("s", "S")
            .with_entity(EntityDocument::new("e1", "Vehicle"))
            .with_entity(EntityDocument::new("e2", "Truck"))
            .with_inheritance(InheritanceDocument::new("h1", "kind", "e1", ["e2"]))
            .link()
            .unwrap();
        let solution = ModelDocument::new("t", "T")
            .with_entity(EntityDocument::new("e1", "Vehicle"))
            .with_entity(EntityDocument::new("e2", "Truck"))
            .link()
            .unwrap();

        let log = run_entities(&source, &solution);
        assert_eq!(codes(&log), vec![DiagnosticCode::EntityChildMismatch]);
        assert_eq!(log.iter().next().unwrap().subject_name.as_deref(), Some("Truck"));
    }

    #[test]
    fn dangling_identifier_member_is_malformed_input() {
        let source = person(
            vec![AttributeDocument::new("a1", "id", "I")],
            vec![IdentifierDocument::new("i1", "pk", ["a1"])],
        );
        let mut broken = source.clone();
        broken.entities[0].identifiers[0].attributes.push(AttributeRef(42));

        let options = ReconcileOptions::default();
        let mut reconciler = Reconciler::new(&broken, &source, &options);
        let err = reconciler.reconcile_entities().unwrap_err();
        assert!(err.to_string().contains("missing attribute"));
    }
}
