//! Run report schema (stable v1)
//!
//! This schema is STABLE and VERSIONED.
//! Breaking changes require a new version.

use crate::result::DiagnosticResult;
use serde::{Deserialize, Serialize};

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

/// What happened to one check during a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    /// The check did not run (skip-listed or not applicable)
    Skipped { reason: String },

    /// The check ran and produced a diagnostic
    Completed { result: DiagnosticResult },

    /// The check could not be evaluated
    Errored { message: String },
}

/// Outcome of one check, keyed by check ID
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckOutcome {
    pub check_id: String,
    pub outcome: Outcome,
}

impl CheckOutcome {
    pub fn skipped(check_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            check_id: check_id.into(),
            outcome: Outcome::Skipped {
                reason: reason.into(),
            },
        }
    }

    pub fn completed(check_id: impl Into<String>, result: DiagnosticResult) -> Self {
        Self {
            check_id: check_id.into(),
            outcome: Outcome::Completed { result },
        }
    }

    pub fn errored(check_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            check_id: check_id.into(),
            outcome: Outcome::Errored {
                message: message.into(),
            },
        }
    }

    /// The diagnostic, if the check completed
    pub fn result(&self) -> Option<&DiagnosticResult> {
        match &self.outcome {
            Outcome::Completed { result } => Some(result),
            _ => None,
        }
    }
}

/// Summary statistics for a report
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Number of registered checks considered
    pub total: usize,

    /// Completed with no False condition
    pub passed: usize,

    /// Completed with at least one False condition
    pub failed: usize,

    /// Completed with at least one blocking False condition
    pub blocking: usize,

    /// Not run
    pub skipped: usize,

    /// Could not be evaluated
    pub errored: usize,
}

/// Run report (report.json v1)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    /// Schema version
    pub version: ReportVersion,

    /// Timestamp (ISO 8601)
    pub timestamp: String,

    /// Platform version detected on the cluster
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_version: Option<String>,

    /// Version the installation is being checked against
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_version: Option<String>,

    /// Summary statistics
    pub summary: ReportSummary,

    /// Outcomes in registration order
    pub outcomes: Vec<CheckOutcome>,

    /// Metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl RunReport {
    /// Create a new empty report
    pub fn new() -> Self {
        Self {
            version: ReportVersion::CURRENT,
            timestamp: chrono::Utc::now().to_rfc3339(),
            current_version: None,
            target_version: None,
            summary: ReportSummary::default(),
            outcomes: Vec::new(),
            metadata: None,
        }
    }

    /// Create a report from outcomes
    pub fn from_outcomes(outcomes: Vec<CheckOutcome>) -> Self {
        let mut report = Self::new();
        for outcome in outcomes {
            report.add_outcome(outcome);
        }
        report
    }

    /// Record the versions the run was evaluated with
    pub fn with_versions(
        mut self,
        current: Option<&semver::Version>,
        target: Option<&semver::Version>,
    ) -> Self {
        self.current_version = current.map(ToString::to_string);
        self.target_version = target.map(ToString::to_string);
        self
    }

    /// Add an outcome to the report
    pub fn add_outcome(&mut self, outcome: CheckOutcome) {
        match &outcome.outcome {
            Outcome::Skipped { .. } => self.summary.skipped += 1,
            Outcome::Errored { .. } => self.summary.errored += 1,
            Outcome::Completed { result } => {
                if result.is_failing() {
                    self.summary.failed += 1;
                } else {
                    self.summary.passed += 1;
                }
                if result.has_blocking_failure() {
                    self.summary.blocking += 1;
                }
            }
        }

        self.summary.total += 1;
        self.outcomes.push(outcome);
    }

    /// Any blocking condition evaluated to False
    pub fn has_blocking_failures(&self) -> bool {
        self.summary.blocking > 0
    }

    /// Any check could not be evaluated
    pub fn has_errors(&self) -> bool {
        self.summary.errored > 0
    }

    /// Find the outcome for a check
    pub fn outcome(&self, check_id: &str) -> Option<&CheckOutcome> {
        self.outcomes.iter().find(|o| o.check_id == check_id)
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
}

impl Default for RunReport {
    fn default() -> Self {
        Self::new()
    }
}
