//! Fatal reconciliation errors

use schemagrade_model::{
    Association, AssociationRef, Attribute, AttributeRef, Entity, EntityRef, Model,
};

/// A graph handed to the engine was not fully linked
///
/// Aborts the current run only; nothing outside the run is touched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReconcileError {
    #[error("Malformed input: {context} references missing {kind} {handle}")]
    MalformedInput {
        kind: &'static str,
        handle: String,
        context: String,
    },
}

pub(crate) fn resolve_entity<'m>(
    model: &'m Model,
    handle: EntityRef,
    context: impl FnOnce() -> String,
) -> Result<&'m Entity, ReconcileError> {
    model.entity(handle).ok_or_else(|| ReconcileError::MalformedInput {
        kind: "entity",
        handle: handle.to_string(),
        context: context(),
    })
}

pub(crate) fn resolve_association<'m>(
    model: &'m Model,
    handle: AssociationRef,
    context: impl FnOnce() -> String,
) -> Result<&'m Association, ReconcileError> {
    model.association(handle).ok_or_else(|| ReconcileError::MalformedInput {
        kind: "association",
        handle: handle.to_string(),
        context: context(),
    })
}

pub(crate) fn resolve_attribute<'m>(
    entity: &'m Entity,
    handle: AttributeRef,
    context: impl FnOnce() -> String,
) -> Result<&'m Attribute, ReconcileError> {
    entity.attribute(handle).ok_or_else(|| ReconcileError::MalformedInput {
        kind: "attribute",
        handle: handle.to_string(),
        context: context(),
    })
}
