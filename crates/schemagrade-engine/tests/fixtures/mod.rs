//! Test fixtures for reconciliation tests
//!
//! A small video rental shop: members rent copies of films, staff are
//! employees specialised as managers or clerks, and employees work at stores.

#![allow(dead_code)]

use schemagrade_model::{
    AssociationDocument, AssociationLinkDocument, AttributeDocument, Cardinality, EntityDocument,
    IdentifierDocument, InheritanceDocument, Model, ModelDocument, RelationshipDocument,
};

/// The reference solution document
pub fn video_shop() -> ModelDocument {
    ModelDocument::new("video_shop", "Video Shop")
        .with_entity(
            EntityDocument::new("e1", "Member")
                .with_attribute(AttributeDocument::new("m1", "member number", "I").mandatory())
                .with_attribute(AttributeDocument::new("m2", "first name", "VA30").mandatory())
                .with_attribute(AttributeDocument::new("m3", "last name", "VA30").mandatory())
                .with_attribute(AttributeDocument::new("m4", "birth date", "D"))
                .with_primary_identifier(IdentifierDocument::new("m_pk", "member key", ["m1"]))
                .with_identifier(IdentifierDocument::new("m_ak", "full name", ["m2", "m3"])),
        )
        .with_entity(
            EntityDocument::new("e2", "Film")
                .with_attribute(AttributeDocument::new("f1", "title", "VA100").mandatory())
                .with_attribute(AttributeDocument::new("f2", "release year", "SI"))
                .with_attribute(AttributeDocument::new("f3", "genre", "VA20"))
                .with_primary_identifier(IdentifierDocument::new("f_pk", "film key", ["f1"])),
        )
        .with_entity(
            EntityDocument::new("e3", "Copy")
                .with_attribute(AttributeDocument::new("c1", "copy number", "I").mandatory())
                .with_attribute(AttributeDocument::new("c2", "acquired", "D"))
                .with_primary_identifier(IdentifierDocument::new("c_pk", "copy key", ["c1"])),
        )
        .with_entity(
            EntityDocument::new("e4", "Employee")
                .with_attribute(AttributeDocument::new("p1", "employee number", "I").mandatory())
                .with_primary_identifier(IdentifierDocument::new("p_pk", "employee key", ["p1"])),
        )
        .with_entity(
            EntityDocument::new("e5", "Manager")
                .with_attribute(AttributeDocument::new("g1", "bonus", "MN")),
        )
        .with_entity(
            EntityDocument::new("e6", "Clerk")
                .with_attribute(AttributeDocument::new("k1", "shift", "VA10")),
        )
        .with_entity(
            EntityDocument::new("e7", "Store")
                .with_attribute(AttributeDocument::new("s1", "address", "VA200").mandatory()),
        )
        .with_relationship(RelationshipDocument::new(
            "r1",
            "rents",
            "e1",
            "e3",
            Cardinality::ZeroOrMany,
            Cardinality::ZeroOrOne,
        ))
        .with_relationship(
            RelationshipDocument::new(
                "r2",
                "has copies",
                "e2",
                "e3",
                Cardinality::OneOrMany,
                Cardinality::ExactlyOne,
            )
            .with_dependency(false, true),
        )
        .with_inheritance(
            InheritanceDocument::new("h1", "staff role", "e4", ["e5", "e6"]).with_flags(true, false),
        )
        .with_association(
            AssociationDocument::new("as1", "Works at")
                .with_attribute(AttributeDocument::new("w1", "since", "D")),
        )
        .with_association_link(AssociationLinkDocument::new(
            "l1",
            "as1",
            "e4",
            Cardinality::ZeroOrOne,
        ))
        .with_association_link(AssociationLinkDocument::new(
            "l2",
            "as1",
            "e7",
            Cardinality::OneOrMany,
        ))
}

pub fn link(document: &ModelDocument) -> Model {
    document.link().expect("fixture links")
}

/// Mutable access to an entity of a document by id
pub fn entity_mut<'d>(document: &'d mut ModelDocument, id: &str) -> &'d mut EntityDocument {
    document
        .entities
        .iter_mut()
        .find(|e| e.id == id)
        .unwrap_or_else(|| panic!("no entity {id}"))
}

/// Mutable access to an attribute of an entity by id
pub fn attribute_mut<'d>(
    document: &'d mut ModelDocument,
    entity: &str,
    id: &str,
) -> &'d mut AttributeDocument {
    entity_mut(document, entity)
        .attributes
        .iter_mut()
        .find(|a| a.id == id)
        .unwrap_or_else(|| panic!("no attribute {id}"))
}
