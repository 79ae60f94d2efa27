//! The check contract and the metadata every check carries

use crate::context::RunContext;
use crate::error::CheckError;
use crate::target::Target;
use kompat_core::{CheckGroup, DiagnosticResult};
use std::sync::Arc;

/// Annotation keys stamped by the protocols
pub mod annotations {
    /// Observed management state of the component
    pub const MANAGEMENT_STATE: &str = "component.kompat.io/management-state";

    /// Platform applications namespace resolved for the check
    pub const APPLICATIONS_NAMESPACE: &str = "component.kompat.io/applications-namespace";

    /// Version the installation is being checked against
    pub const TARGET_VERSION: &str = "check.kompat.io/target-version";

    /// Number of workloads handed to the policy after filtering
    pub const WORKLOAD_COUNT: &str = "workload.kompat.io/count";

    /// Installed operator version
    pub const OPERATOR_INSTALLED_VERSION: &str = "operator.kompat.io/installed-version";
}

/// Synchronous applicability predicate used by the protocol checks
pub type Gate = Arc<dyn Fn(&Target) -> bool + Send + Sync>;

/// Reusable gates
pub mod gates {
    use crate::target::Target;

    /// Always applicable
    pub fn always(_: &Target) -> bool {
        true
    }

    /// Applicable only when upgrading from 2.x to 3.x
    pub fn upgrade_2x_to_3x(target: &Target) -> bool {
        target.is_upgrade_2x_to_3x()
    }

    /// Applicable when the installed version is at least `major.minor`
    pub fn installed_at_least(
        major: u64,
        minor: u64,
    ) -> impl Fn(&Target) -> bool + Send + Sync + 'static {
        move |target: &Target| kompat_core::at_least(target.current_version.as_ref(), major, minor)
    }
}

/// Metadata shared by every check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckMeta {
    /// Stable, unique identifier (e.g. `components.kserve.serverless-removal`)
    pub id: String,

    /// Human-readable name
    pub name: String,

    /// What the check looks for
    pub description: String,

    pub group: CheckGroup,

    /// Component name, workload kind or operator the check inspects
    pub kind: String,

    /// Check type (e.g. `removal`, `deprecation`, `presence`)
    pub check_type: String,

    /// Suggested fix, rendered next to failing conditions
    pub remediation: Option<String>,
}

impl CheckMeta {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        group: CheckGroup,
        kind: impl Into<String>,
        check_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            group,
            kind: kind.into(),
            check_type: check_type.into(),
            remediation: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_remediation(mut self, remediation: impl Into<String>) -> Self {
        self.remediation = Some(remediation.into());
        self
    }

    /// Empty result stamped with this check's group, kind, type, description and remediation
    pub fn new_result(&self) -> DiagnosticResult {
        DiagnosticResult::new(
            self.group,
            self.kind.clone(),
            self.check_type.clone(),
            self.description.clone(),
        )
        .with_remediation(self.remediation.clone())
    }
}

/// A diagnostic check
///
/// Implementations are stateless: everything a run needs comes from the
/// [`Target`] and everything it produces goes into the returned result, so
/// one instance may be evaluated concurrently against different targets.
#[async_trait::async_trait]
pub trait Check: Send + Sync {
    fn meta(&self) -> &CheckMeta;

    fn id(&self) -> &str {
        &self.meta().id
    }

    fn name(&self) -> &str {
        &self.meta().name
    }

    fn description(&self) -> &str {
        &self.meta().description
    }

    fn group(&self) -> CheckGroup {
        self.meta().group
    }

    fn kind(&self) -> &str {
        &self.meta().kind
    }

    fn check_type(&self) -> &str {
        &self.meta().check_type
    }

    /// Whether the check should run at all for this target
    async fn can_apply(&self, ctx: &RunContext, target: &Target) -> Result<bool, CheckError>;

    /// Read cluster state and produce a diagnostic
    async fn validate(
        &self,
        ctx: &RunContext,
        target: &Target,
    ) -> Result<DiagnosticResult, CheckError>;
}
