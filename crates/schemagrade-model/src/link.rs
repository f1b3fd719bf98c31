//! Linking pass: schema document → linked graph
//!
//! Phase one builds every node in document order and indexes ids. Phase two
//! resolves string references into handles, fills entity back-references and
//! marks inheritance children. Linking is all-or-nothing.

use std::collections::HashMap;

use crate::datatype::{DataType, UnknownDataType};
use crate::document::{AttributeDocument, EntityDocument, ModelDocument};
use crate::graph::*;

/// Errors that make a document impossible to link
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkError {
    #[error("Duplicate {kind} id '{id}' in model '{model}'")]
    DuplicateId {
        model: String,
        kind: &'static str,
        id: String,
    },

    #[error("{owner} references unknown {kind} '{id}'")]
    UnresolvedReference {
        owner: String,
        kind: &'static str,
        id: String,
    },

    #[error("Identifier '{identifier}' of entity '{entity}' lists '{attribute}', which is not an attribute of that entity")]
    ForeignIdentifierMember {
        entity: String,
        identifier: String,
        attribute: String,
    },

    #[error("Entity '{entity}' names primary identifier '{identifier}', which it does not own")]
    UnknownPrimaryIdentifier { entity: String, identifier: String },

    #[error("Attribute '{attribute}' of '{owner}': {source}")]
    Datatype {
        owner: String,
        attribute: String,
        #[source]
        source: UnknownDataType,
    },
}

impl ModelDocument {
    /// Resolve all references and build the linked [`Model`]
    pub fn link(&self) -> Result<Model, LinkError> {
        Linker::new(self).link()
    }
}

/// Id → index table for one object kind, rejecting duplicates
struct IdIndex<'d> {
    model: &'d str,
    kind: &'static str,
    ids: HashMap<&'d str, usize>,
}

impl<'d> IdIndex<'d> {
    fn build<I>(model: &'d str, kind: &'static str, ids: I) -> Result<Self, LinkError>
    where
        I: IntoIterator<Item = &'d str>,
    {
        let mut index = HashMap::new();
        for (position, id) in ids.into_iter().enumerate() {
            if index.insert(id, position).is_some() {
                return Err(LinkError::DuplicateId {
                    model: model.to_string(),
                    kind,
                    id: id.to_string(),
                });
            }
        }
        Ok(Self { model, kind, ids: index })
    }

    fn resolve(&self, id: &str, owner: impl FnOnce() -> String) -> Result<usize, LinkError> {
        self.ids.get(id).copied().ok_or_else(|| LinkError::UnresolvedReference {
            owner: owner(),
            kind: self.kind,
            id: id.to_string(),
        })
    }
}

struct Linker<'d> {
    doc: &'d ModelDocument,
}

impl<'d> Linker<'d> {
    fn new(doc: &'d ModelDocument) -> Self {
        Self { doc }
    }

    fn link(self) -> Result<Model, LinkError> {
        let doc = self.doc;
        let model = doc.id.as_str();

        // Phase one: index every addressable object
        let domain_ids = IdIndex::build(model, "domain", doc.domains.iter().map(|d| d.id.as_str()))?;
        let entity_ids = IdIndex::build(model, "entity", doc.entities.iter().map(|e| e.id.as_str()))?;
        let association_ids =
            IdIndex::build(model, "association", doc.associations.iter().map(|a| a.id.as_str()))?;
        IdIndex::build(model, "relationship", doc.relationships.iter().map(|r| r.id.as_str()))?;
        IdIndex::build(model, "inheritance", doc.inheritances.iter().map(|i| i.id.as_str()))?;
        IdIndex::build(model, "association link", doc.association_links.iter().map(|l| l.id.as_str()))?;

        let domains = doc
            .domains
            .iter()
            .map(|d| {
                let datatype = DataType::from_raw(&d.datatype).map_err(|source| LinkError::Datatype {
                    owner: format!("domain '{}'", d.id),
                    attribute: d.name.clone(),
                    source,
                })?;
                Ok(Domain {
                    id: d.id.clone(),
                    name: d.name.clone(),
                    code: d.code.clone(),
                    datatype,
                    length: d.length,
                    precision: d.precision,
                })
            })
            .collect::<Result<Vec<_>, LinkError>>()?;

        let mut entities = doc
            .entities
            .iter()
            .map(|e| self.entity(e, &domain_ids))
            .collect::<Result<Vec<_>, LinkError>>()?;

        let mut associations = doc
            .associations
            .iter()
            .map(|a| {
                let owner = format!("association '{}'", a.id);
                Ok(Association {
                    id: a.id.clone(),
                    name: a.name.clone(),
                    code: a.code.clone(),
                    attributes: self.attributes(&owner, &a.attributes, &domain_ids)?,
                    association_links: Vec::new(),
                })
            })
            .collect::<Result<Vec<_>, LinkError>>()?;

        // Phase two: resolve cross-references and fill back-references
        let mut relationships = Vec::with_capacity(doc.relationships.len());
        for (position, r) in doc.relationships.iter().enumerate() {
            let owner = || format!("relationship '{}'", r.id);
            let entity1 = EntityRef(entity_ids.resolve(&r.entity1, owner)?);
            let entity2 = EntityRef(entity_ids.resolve(&r.entity2, owner)?);

            let handle = RelationshipRef(position);
            entities[entity1.0].relationships.push(handle);
            if entity2 != entity1 {
                entities[entity2.0].relationships.push(handle);
            }

            relationships.push(Relationship {
                id: r.id.clone(),
                name: r.name.clone(),
                code: r.code.clone(),
                entity1,
                entity2,
                dependent_e1: r.dependent_e1,
                dependent_e2: r.dependent_e2,
                cardinality_1to2: r.cardinality_1to2,
                cardinality_2to1: r.cardinality_2to1,
            });
        }

        let mut association_links = Vec::with_capacity(doc.association_links.len());
        for (position, l) in doc.association_links.iter().enumerate() {
            let owner = || format!("association link '{}'", l.id);
            let association = AssociationRef(association_ids.resolve(&l.association, owner)?);
            let entity = EntityRef(entity_ids.resolve(&l.entity, owner)?);

            let handle = AssociationLinkRef(position);
            entities[entity.0].association_links.push(handle);
            associations[association.0].association_links.push(handle);

            association_links.push(AssociationLink {
                id: l.id.clone(),
                association,
                entity,
                cardinality: l.cardinality,
            });
        }

        let mut inheritances = Vec::with_capacity(doc.inheritances.len());
        for i in &doc.inheritances {
            let owner = || format!("inheritance '{}'", i.id);
            let parent = EntityRef(entity_ids.resolve(&i.parent, owner)?);
            let children = i
                .children
                .iter()
                .map(|child| entity_ids.resolve(child, owner).map(EntityRef))
                .collect::<Result<Vec<_>, LinkError>>()?;

            for child in &children {
                entities[child.0].is_child = true;
            }

            inheritances.push(Inheritance {
                id: i.id.clone(),
                name: i.name.clone(),
                code: i.code.clone(),
                mutually_exclusive: i.mutually_exclusive,
                complete: i.complete,
                parent,
                children,
            });
        }

        let packages = doc
            .packages
            .iter()
            .map(|p| Linker::new(p).link())
            .collect::<Result<Vec<_>, LinkError>>()?;

        Ok(Model {
            id: doc.id.clone(),
            name: doc.name.clone(),
            code: doc.code.clone(),
            entities,
            relationships,
            inheritances,
            associations,
            association_links,
            domains,
            packages,
        })
    }

    fn entity(&self, e: &EntityDocument, domain_ids: &IdIndex<'_>) -> Result<Entity, LinkError> {
        let owner = format!("entity '{}'", e.id);
        let attributes = self.attributes(&owner, &e.attributes, domain_ids)?;

        let attribute_ids = IdIndex::build(
            domain_ids.model,
            "attribute",
            e.attributes.iter().map(|a| a.id.as_str()),
        )?;
        IdIndex::build(
            domain_ids.model,
            "identifier",
            e.identifiers.iter().map(|i| i.id.as_str()),
        )?;

        if let Some(primary) = &e.primary_identifier {
            if !e.identifiers.iter().any(|i| &i.id == primary) {
                return Err(LinkError::UnknownPrimaryIdentifier {
                    entity: e.id.clone(),
                    identifier: primary.clone(),
                });
            }
        }

        let identifiers = e
            .identifiers
            .iter()
            .map(|i| {
                let members = i
                    .attributes
                    .iter()
                    .map(|member| {
                        attribute_ids
                            .ids
                            .get(member.as_str())
                            .map(|&position| AttributeRef(position))
                            .ok_or_else(|| LinkError::ForeignIdentifierMember {
                                entity: e.id.clone(),
                                identifier: i.id.clone(),
                                attribute: member.clone(),
                            })
                    })
                    .collect::<Result<Vec<_>, LinkError>>()?;

                Ok(Identifier {
                    id: i.id.clone(),
                    name: i.name.clone(),
                    attributes: members,
                    is_primary: e.primary_identifier.as_deref() == Some(i.id.as_str()),
                })
            })
            .collect::<Result<Vec<_>, LinkError>>()?;

        Ok(Entity {
            id: e.id.clone(),
            name: e.name.clone(),
            code: e.code.clone(),
            is_child: false,
            attributes,
            identifiers,
            relationships: Vec::new(),
            association_links: Vec::new(),
        })
    }

    fn attributes(
        &self,
        owner: &str,
        docs: &[AttributeDocument],
        domain_ids: &IdIndex<'_>,
    ) -> Result<Vec<Attribute>, LinkError> {
        docs.iter()
            .map(|a| {
                let datatype = DataType::from_raw(&a.datatype).map_err(|source| LinkError::Datatype {
                    owner: owner.to_string(),
                    attribute: a.name.clone(),
                    source,
                })?;

                let domain = match &a.domain {
                    Some(id) => Some(DomainRef(
                        domain_ids.resolve(id, || format!("attribute '{}' of {}", a.id, owner))?,
                    )),
                    None => None,
                };

                Ok(Attribute {
                    id: a.id.clone(),
                    name: a.name.clone(),
                    code: a.code.clone(),
                    mandatory: a.mandatory,
                    datatype,
                    length: a.length,
                    precision: a.precision,
                    domain,
                })
            })
            .collect()
    }
}
