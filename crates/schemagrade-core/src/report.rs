//! Grading report schema (stable v1)
//!
//! This schema is STABLE and VERSIONED.
//! Breaking changes require a new version.

use serde::{Deserialize, Serialize};

use crate::diagnostic::{Diagnostic, DiagnosticCategory, DiagnosticLog, Severity};

/// Report schema version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportVersion {
    /// Major version (breaking changes)
    pub major: u32,

    /// Minor version (backward-compatible additions)
    pub minor: u32,
}

impl ReportVersion {
    /// Current report schema version
    pub const CURRENT: ReportVersion = ReportVersion { major: 1, minor: 0 };
}

impl std::fmt::Display for ReportVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Summary statistics for a report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Total number of diagnostics
    pub total: usize,

    /// Number of errors
    pub errors: usize,

    /// Number of warnings
    pub warnings: usize,

    /// Number of info messages
    pub info: usize,

    /// Field-level differences between matched pairs
    pub mismatches: usize,

    /// Submission elements with no counterpart
    pub unmatched_source: usize,

    /// Solution elements never matched
    pub unmatched_solution: usize,
}

impl ReportSummary {
    fn record(&mut self, diagnostic: &Diagnostic) {
        match diagnostic.severity {
            Severity::Error => self.errors += 1,
            Severity::Warn => self.warnings += 1,
            Severity::Info => self.info += 1,
        }

        match diagnostic.category() {
            DiagnosticCategory::StructuralMismatch => self.mismatches += 1,
            DiagnosticCategory::UnmatchedSource => self.unmatched_source += 1,
            DiagnosticCategory::UnmatchedSolution => self.unmatched_solution += 1,
        }

        self.total += 1;
    }
}

/// Grading report (report.json v1)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Schema version
    pub version: ReportVersion,

    /// Timestamp (ISO 8601)
    pub timestamp: String,

    /// Name of the graded submission model
    pub submission: String,

    /// Name of the solution model
    pub solution: String,

    /// Summary statistics
    pub summary: ReportSummary,

    /// All diagnostics, in emission order
    pub diagnostics: Vec<Diagnostic>,

    /// Metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl Report {
    /// Create a new empty report
    pub fn new(submission: impl Into<String>, solution: impl Into<String>) -> Self {
        Self {
            version: ReportVersion::CURRENT,
            timestamp: chrono::Utc::now().to_rfc3339(),
            submission: submission.into(),
            solution: solution.into(),
            summary: ReportSummary::default(),
            diagnostics: Vec::new(),
            metadata: None,
        }
    }

    /// Create a report from a diagnostic log
    pub fn from_log(
        submission: impl Into<String>,
        solution: impl Into<String>,
        log: DiagnosticLog,
    ) -> Self {
        let mut report = Self::new(submission, solution);
        for diagnostic in log.into_diagnostics() {
            report.add_diagnostic(diagnostic);
        }
        report
    }

    /// Add a diagnostic to the report
    pub fn add_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.summary.record(&diagnostic);
        self.diagnostics.push(diagnostic);
    }

    /// Attach free-form metadata
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Check if the report has any errors
    pub fn has_errors(&self) -> bool {
        self.summary.errors > 0
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Save to file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let json = self.to_json()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(path, json)
    }

    /// Render as a Markdown document
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str("# Schema Grading Report\n\n");
        md.push_str(&format!("**Submission:** {}\n\n", self.submission));
        md.push_str(&format!("**Solution:** {}\n\n", self.solution));
        md.push_str(&format!("**Version:** {}\n\n", self.version));
        md.push_str(&format!("**Timestamp:** {}\n\n", self.timestamp));

        md.push_str("## Summary\n\n");
        md.push_str(&format!("- Total diagnostics: {}\n", self.summary.total));
        md.push_str(&format!("- Errors: {}\n", self.summary.errors));
        md.push_str(&format!("- Warnings: {}\n", self.summary.warnings));
        md.push_str(&format!("- Info: {}\n", self.summary.info));
        md.push_str(&format!("- Mismatched properties: {}\n", self.summary.mismatches));
        md.push_str(&format!("- Missing from solution: {}\n", self.summary.unmatched_source));
        md.push_str(&format!("- Missing from submission: {}\n", self.summary.unmatched_solution));
        md.push('\n');

        if self.diagnostics.is_empty() {
            md.push_str("✅ **Submission matches the solution!**\n");
            return md;
        }

        md.push_str("## Diagnostics\n\n");
        md.push_str("| Severity | Code | Subject | Message |\n");
        md.push_str("|---|---|---|---|\n");

        for diag in &self.diagnostics {
            let subject = match &diag.subject_name {
                Some(name) => format!("{} `{}`", diag.subject_kind, name),
                None => diag.subject_kind.to_string(),
            };

            md.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                diag.severity,
                diag.code,
                subject,
                diag.message.replace('|', "\\|")
            ));
        }

        md
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::{DiagnosticCode, SubjectKind};

    fn sample_log() -> DiagnosticLog {
        let mut log = DiagnosticLog::new();
        log.push(
            Diagnostic::new(DiagnosticCode::EntityNotFound, SubjectKind::Entity, "Entity 'Film' not found")
                .with_subject_id("e1")
                .with_subject_name("Film"),
        );
        log.push(
            Diagnostic::new(
                DiagnosticCode::AttributeMandatoryMismatch,
                SubjectKind::Attribute,
                "Attribute 'title' mandatory property mismatch",
            )
            .with_severity(Severity::Warn),
        );
        log.push(Diagnostic::new(
            DiagnosticCode::RelationshipUnmatchedInSolution,
            SubjectKind::Relationship,
            "Unmatched relationship in solution model: 'rents'",
        ));
        log
    }

    #[test]
    fn empty_report() {
        let report = Report::new("student", "solution");
        assert_eq!(report.version, ReportVersion::CURRENT);
        assert_eq!(report.summary.total, 0);
        assert!(!report.has_errors());
        assert!(report.to_markdown().contains("matches the solution"));
    }

    #[test]
    fn report_from_log() {
        let report = Report::from_log("student", "solution", sample_log());
        assert_eq!(report.summary.total, 3);
        assert_eq!(report.summary.errors, 2);
        assert_eq!(report.summary.warnings, 1);
        assert_eq!(report.summary.mismatches, 1);
        assert_eq!(report.summary.unmatched_source, 1);
        assert_eq!(report.summary.unmatched_solution, 1);
        assert!(report.has_errors());
        assert_eq!(report.diagnostics[0].code, DiagnosticCode::EntityNotFound);
    }

    #[test]
    fn report_serialization() {
        let report = Report::from_log("student", "solution", sample_log());
        let json = report.to_json().unwrap();
        assert!(json.contains("\"version\""));
        assert!(json.contains("\"diagnostics\""));
        assert!(json.contains("ENTITY_NOT_FOUND"));

        let parsed: Report = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, report);
    }

    #[test]
    fn markdown_lists_every_diagnostic() {
        let md = Report::from_log("student", "solution", sample_log()).to_markdown();
        assert!(md.contains("| error | ENTITY_NOT_FOUND | Entity `Film` |"));
        assert!(md.contains("ATTRIBUTE_MANDATORY_MISMATCH"));
        assert!(md.contains("RELATIONSHIP_UNMATCHED_IN_SOLUTION"));
    }
}
