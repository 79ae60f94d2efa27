//! Conditions and their closed vocabularies
//!
//! IMPORTANT: Reason and condition-type strings are stable.
//! NEVER rename or remove reasons - renderers and downstream tooling match on them.
//! Add new reasons with new names only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Well-known condition types
pub mod condition_types {
    /// A required resource or operator is present
    pub const AVAILABLE: &str = "Available";

    /// A component is configured the way the target version expects
    pub const CONFIGURED: &str = "Configured";

    /// The installation is compatible with the target version
    pub const COMPATIBLE: &str = "Compatible";

    /// Live workloads were validated against the target version
    pub const VALIDATED: &str = "Validated";

    /// Manual migration is required before upgrading
    pub const MIGRATION_REQUIRED: &str = "MigrationRequired";
}

/// Tri-state status of a condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}

impl std::fmt::Display for ConditionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::True => write!(f, "True"),
            Self::False => write!(f, "False"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// How a renderer should treat a failing condition
///
/// Impact is rendering metadata only. Pass/fail rollups read the status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    /// Informational - should be reviewed but does not block the upgrade
    Advisory,

    /// Blocks the upgrade until resolved
    Blocking,
}

impl Default for Impact {
    fn default() -> Self {
        Self::Advisory
    }
}

impl std::fmt::Display for Impact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Advisory => write!(f, "advisory"),
            Self::Blocking => write!(f, "blocking"),
        }
    }
}

/// Machine-readable reason attached to every condition (closed set)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reason {
    // Presence
    /// The resource, singleton or operator was not found
    ResourceNotFound,

    /// The resource, singleton or operator was found
    ResourceFound,

    // Configuration
    /// Nothing in the current configuration requires attention
    RequirementsMet,

    /// The configuration is not valid for the target version
    ConfigurationInvalid,

    /// The component is not managed by the platform operator
    ConfigurationUnmanaged,

    // Versioning
    /// Installed version is compatible with the target
    VersionCompatible,

    /// Installed version is not compatible with the target
    VersionIncompatible,

    // Lifecycle
    /// A feature or component in use is deprecated or removed in the target
    Deprecated,

    /// Live workloads are affected by the upgrade
    WorkloadsImpacted,

    /// Live workloads are unaffected by the upgrade
    NoWorkloadsImpacted,
}

impl Reason {
    /// Get the reason as a stable string identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ResourceNotFound => "ResourceNotFound",
            Self::ResourceFound => "ResourceFound",
            Self::RequirementsMet => "RequirementsMet",
            Self::ConfigurationInvalid => "ConfigurationInvalid",
            Self::ConfigurationUnmanaged => "ConfigurationUnmanaged",
            Self::VersionCompatible => "VersionCompatible",
            Self::VersionIncompatible => "VersionIncompatible",
            Self::Deprecated => "Deprecated",
            Self::WorkloadsImpacted => "WorkloadsImpacted",
            Self::NoWorkloadsImpacted => "NoWorkloadsImpacted",
        }
    }
}

impl std::fmt::Display for Reason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A typed, timestamped fact attached to a diagnostic result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Condition type (see [`condition_types`])
    #[serde(rename = "type")]
    pub condition_type: String,

    /// True / False / Unknown
    pub status: ConditionStatus,

    /// Stable reason
    pub reason: Reason,

    /// Human-readable message
    pub message: String,

    /// Rendering impact
    #[serde(default)]
    pub impact: Impact,

    /// When the condition was observed
    pub last_transition_time: DateTime<Utc>,
}

impl Condition {
    /// Create a new advisory condition stamped with the current time
    pub fn new(
        condition_type: impl Into<String>,
        status: ConditionStatus,
        reason: Reason,
        message: impl Into<String>,
    ) -> Self {
        Self {
            condition_type: condition_type.into(),
            status,
            reason,
            message: message.into(),
            impact: Impact::Advisory,
            last_transition_time: Utc::now(),
        }
    }

    /// Set the impact
    pub fn with_impact(mut self, impact: Impact) -> Self {
        self.impact = impact;
        self
    }

    /// Mark the condition as blocking
    pub fn blocking(self) -> Self {
        self.with_impact(Impact::Blocking)
    }

    pub fn is_true(&self) -> bool {
        self.status == ConditionStatus::True
    }

    pub fn is_false(&self) -> bool {
        self.status == ConditionStatus::False
    }

    /// A False condition that blocks the upgrade
    pub fn is_blocking_failure(&self) -> bool {
        self.is_false() && self.impact == Impact::Blocking
    }
}
