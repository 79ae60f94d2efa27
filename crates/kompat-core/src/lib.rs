//! Kompat Core
//!
//! Core domain model shared by the cluster reader and the check engine:
//! version gating, conditions, diagnostic results and the run report.
//! Reason and condition-type strings are part of the report format - never rename them.

pub mod version;
pub mod condition;
pub mod result;
pub mod report;
pub mod config;

pub use version::{at_least, parse_version, upgrade_from_2x_to_3x, upgrade_between};
pub use condition::{condition_types, Condition, ConditionStatus, Impact, Reason};
pub use result::{CheckGroup, DiagnosticResult, ImpactedObject, ObjectRef, TypeMeta};
pub use report::{CheckOutcome, Outcome, ReportSummary, ReportVersion, RunReport};
pub use config::{CheckRules, Config, ConfigError, ImpactOverrides};
