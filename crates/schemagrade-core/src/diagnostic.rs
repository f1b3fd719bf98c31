//! Diagnostic codes and the diagnostic log
//!
//! IMPORTANT: Diagnostic codes are versioned and stable.
//! NEVER rename or remove codes - they are part of the public API.
//! Add new codes with new names only.

use serde::{Deserialize, Serialize};

/// Diagnostic code registry (v1)
///
/// These codes are STABLE and VERSIONED.
/// Do NOT rename or remove codes - only add new ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticCode {
    // Entities
    /// Source entity has no counterpart in the solution
    EntityNotFound,

    /// Solution entity never claimed by a source entity
    EntityUnmatchedInSolution,

    /// Matched entities disagree on being an inheritance child
    EntityChildMismatch,

    // Attributes
    /// Source attribute has no counterpart in the matched solution entity
    AttributeNotFound,

    /// Solution attribute never claimed by a source attribute
    AttributeUnmatchedInSolution,

    /// Matched attributes have different datatype codes
    AttributeDatatypeMismatch,

    /// Matched attributes disagree on the mandatory flag
    AttributeMandatoryMismatch,

    // Identifiers
    /// No solution identifier covers the source identifier's attributes
    IdentifierNotFound,

    /// Solution identifier never claimed by a source identifier
    IdentifierUnmatchedInSolution,

    /// Matched identifiers disagree on being primary
    IdentifierPrimaryMismatch,

    // Relationships
    /// Source relationship has no counterpart in the solution
    RelationshipNotFound,

    /// Solution relationship never claimed
    RelationshipUnmatchedInSolution,

    /// Matched relationships differ in at least one cardinality
    RelationshipCardinalityMismatch,

    /// Matched relationships differ in at least one dependency flag
    RelationshipDependencyMismatch,

    // Inheritances
    /// Source inheritance has no counterpart and no candidate was attempted
    InheritanceNotFound,

    /// Closest candidate inheritance failed on its children
    InheritanceChildrenMismatch,

    /// Closest candidate inheritance failed on its parent
    InheritanceParentMismatch,

    /// Solution inheritance never claimed
    InheritanceUnmatchedInSolution,

    /// Matched inheritances disagree on mutual exclusivity
    InheritanceExclusivityMismatch,

    /// Matched inheritances disagree on completeness
    InheritanceCompletenessMismatch,

    // Associations
    /// Source association has no name counterpart in the solution
    AssociationNotFound,

    /// Name-matched solution associations all failed the attribute check
    AssociationAttributesMismatch,

    /// Solution association never claimed
    AssociationUnmatchedInSolution,

    // Association links
    /// Source association link has no counterpart in the solution
    AssociationLinkNotFound,

    /// Solution association link never claimed
    AssociationLinkUnmatchedInSolution,

    /// Matched association links have different cardinalities
    AssociationLinkCardinalityMismatch,
}

impl DiagnosticCode {
    /// Get the diagnostic code as a stable string identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EntityNotFound => "ENTITY_NOT_FOUND",
            Self::EntityUnmatchedInSolution => "ENTITY_UNMATCHED_IN_SOLUTION",
            Self::EntityChildMismatch => "ENTITY_CHILD_MISMATCH",
            Self::AttributeNotFound => "ATTRIBUTE_NOT_FOUND",
            Self::AttributeUnmatchedInSolution => "ATTRIBUTE_UNMATCHED_IN_SOLUTION",
            Self::AttributeDatatypeMismatch => "ATTRIBUTE_DATATYPE_MISMATCH",
            Self::AttributeMandatoryMismatch => "ATTRIBUTE_MANDATORY_MISMATCH",
            Self::IdentifierNotFound => "IDENTIFIER_NOT_FOUND",
            Self::IdentifierUnmatchedInSolution => "IDENTIFIER_UNMATCHED_IN_SOLUTION",
            Self::IdentifierPrimaryMismatch => "IDENTIFIER_PRIMARY_MISMATCH",
            Self::RelationshipNotFound => "RELATIONSHIP_NOT_FOUND",
            Self::RelationshipUnmatchedInSolution => "RELATIONSHIP_UNMATCHED_IN_SOLUTION",
            Self::RelationshipCardinalityMismatch => "RELATIONSHIP_CARDINALITY_MISMATCH",
            Self::RelationshipDependencyMismatch => "RELATIONSHIP_DEPENDENCY_MISMATCH",
            Self::InheritanceNotFound => "INHERITANCE_NOT_FOUND",
            Self::InheritanceChildrenMismatch => "INHERITANCE_CHILDREN_MISMATCH",
            Self::InheritanceParentMismatch => "INHERITANCE_PARENT_MISMATCH",
            Self::InheritanceUnmatchedInSolution => "INHERITANCE_UNMATCHED_IN_SOLUTION",
            Self::InheritanceExclusivityMismatch => "INHERITANCE_EXCLUSIVITY_MISMATCH",
            Self::InheritanceCompletenessMismatch => "INHERITANCE_COMPLETENESS_MISMATCH",
            Self::AssociationNotFound => "ASSOCIATION_NOT_FOUND",
            Self::AssociationAttributesMismatch => "ASSOCIATION_ATTRIBUTES_MISMATCH",
            Self::AssociationUnmatchedInSolution => "ASSOCIATION_UNMATCHED_IN_SOLUTION",
            Self::AssociationLinkNotFound => "ASSOCIATION_LINK_NOT_FOUND",
            Self::AssociationLinkUnmatchedInSolution => "ASSOCIATION_LINK_UNMATCHED_IN_SOLUTION",
            Self::AssociationLinkCardinalityMismatch => "ASSOCIATION_LINK_CARDINALITY_MISMATCH",
        }
    }

    /// Which recoverable error category this code belongs to
    pub fn category(&self) -> DiagnosticCategory {
        match self {
            Self::EntityNotFound
            | Self::AttributeNotFound
            | Self::IdentifierNotFound
            | Self::RelationshipNotFound
            | Self::InheritanceNotFound
            | Self::InheritanceChildrenMismatch
            | Self::InheritanceParentMismatch
            | Self::AssociationNotFound
            | Self::AssociationAttributesMismatch
            | Self::AssociationLinkNotFound => DiagnosticCategory::UnmatchedSource,

            Self::EntityUnmatchedInSolution
            | Self::AttributeUnmatchedInSolution
            | Self::IdentifierUnmatchedInSolution
            | Self::RelationshipUnmatchedInSolution
            | Self::InheritanceUnmatchedInSolution
            | Self::AssociationUnmatchedInSolution
            | Self::AssociationLinkUnmatchedInSolution => DiagnosticCategory::UnmatchedSolution,

            Self::EntityChildMismatch
            | Self::AttributeDatatypeMismatch
            | Self::AttributeMandatoryMismatch
            | Self::IdentifierPrimaryMismatch
            | Self::RelationshipCardinalityMismatch
            | Self::RelationshipDependencyMismatch
            | Self::InheritanceExclusivityMismatch
            | Self::InheritanceCompletenessMismatch
            | Self::AssociationLinkCardinalityMismatch => DiagnosticCategory::StructuralMismatch,
        }
    }

    /// Severity used when the configuration has no override
    pub fn default_severity(&self) -> Severity {
        Severity::Error
    }
}

impl std::fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Recoverable discrepancy categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticCategory {
    /// Field-level difference between a matched pair
    StructuralMismatch,

    /// Source element with no qualifying correspondence
    UnmatchedSource,

    /// Solution element never claimed
    UnmatchedSolution,
}

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message
    Info,

    /// Warning - worth a look but not counted against the submission
    Warn,

    /// Error - counted against the submission
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Kind of schema object a diagnostic is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectKind {
    Entity,
    Attribute,
    Identifier,
    Relationship,
    Inheritance,
    Association,
    AssociationLink,
}

impl std::fmt::Display for SubjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Entity => "Entity",
            Self::Attribute => "Attribute",
            Self::Identifier => "Identifier",
            Self::Relationship => "Relationship",
            Self::Inheritance => "Inheritance",
            Self::Association => "Association",
            Self::AssociationLink => "Association Link",
        };
        write!(f, "{}", name)
    }
}

/// A diagnostic message with structured metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Stable diagnostic code
    pub code: DiagnosticCode,

    /// Kind of object the diagnostic is about
    pub subject_kind: SubjectKind,

    /// Id of the source-graph object to highlight, if any
    pub subject_id: Option<String>,

    /// Name of the object the diagnostic is about, if any
    pub subject_name: Option<String>,

    /// Severity level
    pub severity: Severity,

    /// Human-readable message
    pub message: String,

    /// Expected value (solution side, for comparison diagnostics)
    pub expected: Option<String>,

    /// Actual value (source side, for comparison diagnostics)
    pub actual: Option<String>,
}

impl Diagnostic {
    /// Create a new diagnostic with the code's default severity
    pub fn new(code: DiagnosticCode, subject_kind: SubjectKind, message: impl Into<String>) -> Self {
        Self {
            code,
            subject_kind,
            subject_id: None,
            subject_name: None,
            severity: code.default_severity(),
            message: message.into(),
            expected: None,
            actual: None,
        }
    }

    /// Set the subject id
    pub fn with_subject_id(mut self, id: impl Into<String>) -> Self {
        self.subject_id = Some(id.into());
        self
    }

    /// Set the subject name
    pub fn with_subject_name(mut self, name: impl Into<String>) -> Self {
        self.subject_name = Some(name.into());
        self
    }

    /// Override the severity
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Set expected/actual values
    pub fn with_comparison(mut self, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self.actual = Some(actual.into());
        self
    }

    pub fn category(&self) -> DiagnosticCategory {
        self.code.category()
    }
}

/// Append-only, ordered log of diagnostics produced by one grading run
///
/// No deduplication: repeated diagnostics for one subject are all kept,
/// in emission order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiagnosticLog {
    entries: Vec<Diagnostic>,
}

impl DiagnosticLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a diagnostic
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    /// Whether any diagnostic refers to the given subject id
    pub fn has_subject(&self, subject_id: &str) -> bool {
        self.entries
            .iter()
            .any(|d| d.subject_id.as_deref() == Some(subject_id))
    }

    /// All diagnostics referring to the given subject id, in emission order
    pub fn for_subject<'a>(&'a self, subject_id: &'a str) -> impl Iterator<Item = &'a Diagnostic> + 'a {
        self.entries
            .iter()
            .filter(move |d| d.subject_id.as_deref() == Some(subject_id))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of diagnostics in a category
    pub fn count_by_category(&self, category: DiagnosticCategory) -> usize {
        self.entries.iter().filter(|d| d.category() == category).count()
    }

    /// Number of diagnostics with a given code
    pub fn count_by_code(&self, code: DiagnosticCode) -> usize {
        self.entries.iter().filter(|d| d.code == code).count()
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a DiagnosticLog {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
