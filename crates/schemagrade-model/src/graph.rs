//! Linked schema graph
//!
//! The [`Model`] owns every node. Cross-references are typed indices into the
//! model's vectors, so the graph has no owning cycles: an entity lists the
//! relationships it takes part in as [`RelationshipRef`]s, and a relationship
//! names its endpoints as [`EntityRef`]s.
//!
//! Graphs are produced by [`crate::ModelDocument::link`] and are not mutated
//! afterwards. The accessors return `None` for a handle that points nowhere,
//! which only happens if a model was assembled by hand.

use serde::Serialize;

use crate::datatype::{Cardinality, DataType};

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        pub struct $name(pub usize);

        impl $name {
            pub fn index(self) -> usize {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}#{}", stringify!($name), self.0)
            }
        }
    };
}

handle!(
    /// Index of an entity in [`Model::entities`]
    EntityRef
);
handle!(
    /// Index of an association in [`Model::associations`]
    AssociationRef
);
handle!(
    /// Index of a domain in [`Model::domains`]
    DomainRef
);
handle!(
    /// Index of a relationship in [`Model::relationships`]
    RelationshipRef
);
handle!(
    /// Index of an association link in [`Model::association_links`]
    AssociationLinkRef
);
handle!(
    /// Index of an attribute in its owner's attribute list
    AttributeRef
);

/// Root container of one conceptual schema (also used for packages)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Model {
    pub id: String,
    pub name: String,
    pub code: String,
    pub entities: Vec<Entity>,
    pub relationships: Vec<Relationship>,
    pub inheritances: Vec<Inheritance>,
    pub associations: Vec<Association>,
    pub association_links: Vec<AssociationLink>,
    pub domains: Vec<Domain>,
    /// Nested packages, each linked on its own
    pub packages: Vec<Model>,
}

impl Model {
    pub fn entity(&self, handle: EntityRef) -> Option<&Entity> {
        self.entities.get(handle.0)
    }

    pub fn association(&self, handle: AssociationRef) -> Option<&Association> {
        self.associations.get(handle.0)
    }

    pub fn domain(&self, handle: DomainRef) -> Option<&Domain> {
        self.domains.get(handle.0)
    }

    pub fn relationship(&self, handle: RelationshipRef) -> Option<&Relationship> {
        self.relationships.get(handle.0)
    }

    pub fn association_link(&self, handle: AssociationLinkRef) -> Option<&AssociationLink> {
        self.association_links.get(handle.0)
    }

    /// Find an entity by its document id
    pub fn find_entity(&self, id: &str) -> Option<(EntityRef, &Entity)> {
        self.entities
            .iter()
            .enumerate()
            .find(|(_, e)| e.id == id)
            .map(|(i, e)| (EntityRef(i), e))
    }

    pub fn entity_name(&self, handle: EntityRef) -> Option<&str> {
        self.entity(handle).map(|e| e.name.as_str())
    }

    /// Object counts, packages excluded
    pub fn summary(&self) -> ModelSummary {
        ModelSummary {
            entities: self.entities.len(),
            attributes: self.entities.iter().map(|e| e.attributes.len()).sum::<usize>()
                + self.associations.iter().map(|a| a.attributes.len()).sum::<usize>(),
            identifiers: self.entities.iter().map(|e| e.identifiers.len()).sum(),
            relationships: self.relationships.len(),
            inheritances: self.inheritances.len(),
            associations: self.associations.len(),
            association_links: self.association_links.len(),
            domains: self.domains.len(),
            packages: self.packages.len(),
        }
    }
}

/// Per-category object counts of a model
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ModelSummary {
    pub entities: usize,
    pub attributes: usize,
    pub identifiers: usize,
    pub relationships: usize,
    pub inheritances: usize,
    pub associations: usize,
    pub association_links: usize,
    pub domains: usize,
    pub packages: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entity {
    pub id: String,
    pub name: String,
    pub code: String,
    /// Set when the entity is a child of some inheritance
    pub is_child: bool,
    pub attributes: Vec<Attribute>,
    pub identifiers: Vec<Identifier>,
    /// Relationships this entity takes part in, in relationship order
    pub relationships: Vec<RelationshipRef>,
    /// Association links this entity takes part in, in link order
    pub association_links: Vec<AssociationLinkRef>,
}

impl Entity {
    pub fn attribute(&self, handle: AttributeRef) -> Option<&Attribute> {
        self.attributes.get(handle.0)
    }

    pub fn primary_identifier(&self) -> Option<&Identifier> {
        self.identifiers.iter().find(|i| i.is_primary)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribute {
    pub id: String,
    pub name: String,
    pub code: String,
    pub mandatory: bool,
    pub datatype: DataType,
    pub length: Option<u32>,
    pub precision: Option<u32>,
    pub domain: Option<DomainRef>,
}

/// Candidate key over the owning entity's attributes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Identifier {
    pub id: String,
    pub name: String,
    /// Members, as indices into the owning entity's attributes
    pub attributes: Vec<AttributeRef>,
    pub is_primary: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Relationship {
    pub id: String,
    pub name: String,
    pub code: String,
    pub entity1: EntityRef,
    pub entity2: EntityRef,
    pub dependent_e1: bool,
    pub dependent_e2: bool,
    pub cardinality_1to2: Cardinality,
    pub cardinality_2to1: Cardinality,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Domain {
    pub id: String,
    pub name: String,
    pub code: String,
    pub datatype: DataType,
    pub length: Option<u32>,
    pub precision: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Association {
    pub id: String,
    pub name: String,
    pub code: String,
    pub attributes: Vec<Attribute>,
    /// Links attached to this association, in link order
    pub association_links: Vec<AssociationLinkRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssociationLink {
    pub id: String,
    pub association: AssociationRef,
    pub entity: EntityRef,
    pub cardinality: Cardinality,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Inheritance {
    pub id: String,
    pub name: String,
    pub code: String,
    pub mutually_exclusive: bool,
    pub complete: bool,
    pub parent: EntityRef,
    pub children: Vec<EntityRef>,
}
