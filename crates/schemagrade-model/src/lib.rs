//! Schema graph model
//!
//! This crate handles:
//! - Parsing schema documents (unlinked JSON descriptions)
//! - Linking documents into an immutable, arena-owned schema graph
//! - Datatype and cardinality codes

pub mod datatype;
pub mod document;
pub mod graph;
pub mod link;

pub use datatype::{Cardinality, DataType, UnknownDataType};
pub use document::{
    AssociationDocument, AssociationLinkDocument, AttributeDocument, DocumentError, DomainDocument,
    EntityDocument, IdentifierDocument, InheritanceDocument, ModelDocument, RelationshipDocument,
};
pub use graph::{
    Association, AssociationLink, AssociationLinkRef, AssociationRef, Attribute, AttributeRef, Domain,
    DomainRef, Entity, EntityRef, Identifier, Inheritance, Model, ModelSummary, Relationship,
    RelationshipRef,
};
pub use link::LinkError;

use std::path::Path;

/// Load a schema document from file and link it
pub fn load_model(path: &Path) -> Result<Model, DocumentError> {
    let document = ModelDocument::from_file(path)?;
    Ok(document.link()?)
}
