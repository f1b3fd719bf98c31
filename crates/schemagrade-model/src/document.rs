//! Schema document parsing
//!
//! A schema document is the unlinked JSON description of a model: every
//! cross-reference is the string id of the referenced object. Call
//! [`ModelDocument::link`] to turn it into a [`crate::Model`].

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::link::LinkError;

/// Unlinked model (or package)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelDocument {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub domains: Vec<DomainDocument>,
    #[serde(default)]
    pub entities: Vec<EntityDocument>,
    #[serde(default)]
    pub relationships: Vec<RelationshipDocument>,
    #[serde(default)]
    pub inheritances: Vec<InheritanceDocument>,
    #[serde(default)]
    pub associations: Vec<AssociationDocument>,
    #[serde(default)]
    pub association_links: Vec<AssociationLinkDocument>,
    #[serde(default)]
    pub packages: Vec<ModelDocument>,
}

impl ModelDocument {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Load a document from file
    pub fn from_file(path: &Path) -> Result<Self, DocumentError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| DocumentError::IoError(path.display().to_string(), e.to_string()))?;

        Self::from_json(&contents)
    }

    /// Parse a document from a JSON string
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        serde_json::from_str(json)
            .map_err(|e| DocumentError::ParseError(e.to_string()))
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, DocumentError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| DocumentError::ParseError(e.to_string()))
    }

    pub fn with_domain(mut self, domain: DomainDocument) -> Self {
        self.domains.push(domain);
        self
    }

    pub fn with_entity(mut self, entity: EntityDocument) -> Self {
        self.entities.push(entity);
        self
    }

    pub fn with_relationship(mut self, relationship: RelationshipDocument) -> Self {
        self.relationships.push(relationship);
        self
    }

    pub fn with_inheritance(mut self, inheritance: InheritanceDocument) -> Self {
        self.inheritances.push(inheritance);
        self
    }

    pub fn with_association(mut self, association: AssociationDocument) -> Self {
        self.associations.push(association);
        self
    }

    pub fn with_association_link(mut self, link: AssociationLinkDocument) -> Self {
        self.association_links.push(link);
        self
    }

    pub fn with_package(mut self, package: ModelDocument) -> Self {
        self.packages.push(package);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainDocument {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub code: String,
    /// Raw datatype code, may embed a size (`VA50`)
    #[serde(default)]
    pub datatype: String,
    #[serde(default)]
    pub length: Option<u32>,
    #[serde(default)]
    pub precision: Option<u32>,
}

impl DomainDocument {
    pub fn new(id: impl Into<String>, name: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            datatype: datatype.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityDocument {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub attributes: Vec<AttributeDocument>,
    #[serde(default)]
    pub identifiers: Vec<IdentifierDocument>,
    /// Id of the primary identifier, one of `identifiers`
    #[serde(default)]
    pub primary_identifier: Option<String>,
}

impl EntityDocument {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_attribute(mut self, attribute: AttributeDocument) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn with_identifier(mut self, identifier: IdentifierDocument) -> Self {
        self.identifiers.push(identifier);
        self
    }

    /// Add an identifier and make it the primary one
    pub fn with_primary_identifier(mut self, identifier: IdentifierDocument) -> Self {
        self.primary_identifier = Some(identifier.id.clone());
        self.identifiers.push(identifier);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeDocument {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub mandatory: bool,
    /// Raw datatype code, may embed a size (`VA50`)
    #[serde(default)]
    pub datatype: String,
    #[serde(default)]
    pub length: Option<u32>,
    #[serde(default)]
    pub precision: Option<u32>,
    /// Id of a shared domain
    #[serde(default)]
    pub domain: Option<String>,
}

impl AttributeDocument {
    pub fn new(id: impl Into<String>, name: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            datatype: datatype.into(),
            ..Self::default()
        }
    }

    pub fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }

    pub fn with_domain(mut self, domain_id: impl Into<String>) -> Self {
        self.domain = Some(domain_id.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdentifierDocument {
    pub id: String,
    pub name: String,
    /// Ids of member attributes of the owning entity
    #[serde(default)]
    pub attributes: Vec<String>,
}

impl IdentifierDocument {
    pub fn new<I, S>(id: impl Into<String>, name: impl Into<String>, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            name: name.into(),
            attributes: attributes.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipDocument {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub code: String,
    pub entity1: String,
    pub entity2: String,
    #[serde(default)]
    pub dependent_e1: bool,
    #[serde(default)]
    pub dependent_e2: bool,
    pub cardinality_1to2: crate::Cardinality,
    pub cardinality_2to1: crate::Cardinality,
}

impl RelationshipDocument {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        entity1: impl Into<String>,
        entity2: impl Into<String>,
        cardinality_1to2: crate::Cardinality,
        cardinality_2to1: crate::Cardinality,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            code: String::new(),
            entity1: entity1.into(),
            entity2: entity2.into(),
            dependent_e1: false,
            dependent_e2: false,
            cardinality_1to2,
            cardinality_2to1,
        }
    }

    pub fn with_dependency(mut self, dependent_e1: bool, dependent_e2: bool) -> Self {
        self.dependent_e1 = dependent_e1;
        self.dependent_e2 = dependent_e2;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InheritanceDocument {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub mutually_exclusive: bool,
    #[serde(default)]
    pub complete: bool,
    pub parent: String,
    #[serde(default)]
    pub children: Vec<String>,
}

impl InheritanceDocument {
    pub fn new<I, S>(id: impl Into<String>, name: impl Into<String>, parent: impl Into<String>, children: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            name: name.into(),
            parent: parent.into(),
            children: children.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_flags(mut self, mutually_exclusive: bool, complete: bool) -> Self {
        self.mutually_exclusive = mutually_exclusive;
        self.complete = complete;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssociationDocument {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub attributes: Vec<AttributeDocument>,
}

impl AssociationDocument {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_attribute(mut self, attribute: AttributeDocument) -> Self {
        self.attributes.push(attribute);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssociationLinkDocument {
    pub id: String,
    pub association: String,
    pub entity: String,
    pub cardinality: crate::Cardinality,
}

impl AssociationLinkDocument {
    pub fn new(
        id: impl Into<String>,
        association: impl Into<String>,
        entity: impl Into<String>,
        cardinality: crate::Cardinality,
    ) -> Self {
        Self {
            id: id.into(),
            association: association.into(),
            entity: entity.into(),
            cardinality,
        }
    }
}

/// Document loading errors
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("Failed to read schema document {0}: {1}")]
    IoError(String, String),

    #[error("Failed to parse schema document: {0}")]
    ParseError(String),

    #[error(transparent)]
    LinkError(#[from] LinkError),
}
