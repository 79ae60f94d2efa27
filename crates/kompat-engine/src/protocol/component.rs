//! Component-scoped protocol
//!
//! Fetches the platform singleton, reads one component's management state
//! and hands both to a policy when the state is one the check cares about.

use crate::check::{annotations, gates, Check, CheckMeta, Gate};
use crate::context::RunContext;
use crate::error::CheckError;
use crate::protocol::{resource_not_found, stamp_target_version};
use crate::target::Target;
use kompat_cluster::{get_singleton, resources, FieldPath, ResourceReader, ResourceType, Unstructured};
use kompat_core::{condition_types, Condition, ConditionStatus, DiagnosticResult, Reason};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

/// Where the platform initialization singleton keeps the applications namespace
const APPLICATIONS_NAMESPACE_PATH: &str = ".spec.applicationsNamespace";

/// Outcome of resolving the platform applications namespace
enum ApplicationsNamespace {
    Found(String),
    NoSingleton,
    Unset,
}

/// Lifecycle of a platform component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ManagementState {
    Managed,
    Unmanaged,
    Removed,
}

impl ManagementState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Managed => "Managed",
            Self::Unmanaged => "Unmanaged",
            Self::Removed => "Removed",
        }
    }
}

impl fmt::Display for ManagementState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ManagementState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Managed" => Ok(Self::Managed),
            "Unmanaged" => Ok(Self::Unmanaged),
            "Removed" => Ok(Self::Removed),
            other => Err(other.to_string()),
        }
    }
}

/// Everything a component policy gets to see
pub struct ComponentRequest<'a> {
    /// Result being built; pre-stamped with metadata and annotations
    pub result: DiagnosticResult,

    /// Component name
    pub component: &'a str,

    /// The platform singleton
    pub singleton: &'a Unstructured,

    /// Observed management state (Removed when the field is absent)
    pub state: ManagementState,

    /// Applications namespace, when the check asked for it
    pub applications_namespace: Option<String>,

    pub target: &'a Target,

    pub ctx: &'a RunContext,
}

impl ComponentRequest<'_> {
    pub fn reader(&self) -> &dyn ResourceReader {
        self.target.reader()
    }
}

/// Policy callback for [`ComponentCheck`]
#[async_trait::async_trait]
pub trait ComponentPolicy: Send + Sync {
    async fn evaluate(&self, req: &mut ComponentRequest<'_>) -> Result<(), CheckError>;
}

/// Check built on the component-scoped protocol
pub struct ComponentCheck<P> {
    meta: CheckMeta,
    component: String,
    singleton: ResourceType,
    state_path: FieldPath,
    required_states: Option<Vec<ManagementState>>,
    needs_applications_namespace: bool,
    gate: Gate,
    policy: P,
}

impl<P: ComponentPolicy> ComponentCheck<P> {
    /// Check for `component`, reading `.spec.components.<component>.managementState`
    pub fn new(meta: CheckMeta, component: &str, policy: P) -> Result<Self, CheckError> {
        let state_path = FieldPath::from_segments(["spec", "components", component, "managementState"])?;

        Ok(Self {
            meta,
            component: component.to_string(),
            singleton: resources::DATA_SCIENCE_CLUSTER,
            state_path,
            required_states: None,
            needs_applications_namespace: false,
            gate: Arc::new(gates::always),
            policy,
        })
    }

    /// Only run the policy when the component is in one of `states`
    pub fn in_state<I>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = ManagementState>,
    {
        self.required_states = Some(states.into_iter().collect());
        self
    }

    /// Read the management state from a different field
    pub fn with_state_path(mut self, path: &str) -> Result<Self, CheckError> {
        self.state_path = FieldPath::parse(path)?;
        Ok(self)
    }

    /// Read the management state off a different singleton
    pub fn with_singleton(mut self, singleton: ResourceType) -> Self {
        self.singleton = singleton;
        self
    }

    /// Resolve the platform applications namespace before running the policy
    pub fn with_applications_namespace(mut self) -> Self {
        self.needs_applications_namespace = true;
        self
    }

    /// Only apply when `gate` holds for the target
    pub fn applies_when<G>(mut self, gate: G) -> Self
    where
        G: Fn(&Target) -> bool + Send + Sync + 'static,
    {
        self.gate = Arc::new(gate);
        self
    }

    fn read_state(&self, singleton: &Unstructured) -> Result<ManagementState, CheckError> {
        match singleton.get(&self.state_path) {
            // unconfigured and explicitly removed mean the same thing
            None => Ok(ManagementState::Removed),
            Some(Value::String(raw)) => raw.parse().map_err(|value| CheckError::InvalidManagementState {
                component: self.component.clone(),
                value,
            }),
            Some(other) => Err(CheckError::InvalidManagementState {
                component: self.component.clone(),
                value: other.to_string(),
            }),
        }
    }

    async fn applications_namespace(
        &self,
        ctx: &RunContext,
        reader: &dyn ResourceReader,
    ) -> Result<ApplicationsNamespace, CheckError> {
        let initialization = ctx
            .guard(get_singleton(reader, &resources::DSC_INITIALIZATION))
            .await?
            .map_err(|e| CheckError::read(format!("fetching {}", resources::DSC_INITIALIZATION.kind), e))?;

        let Some(initialization) = initialization else {
            return Ok(ApplicationsNamespace::NoSingleton);
        };

        let path = FieldPath::parse(APPLICATIONS_NAMESPACE_PATH)?;
        Ok(initialization
            .get(&path)
            .and_then(Value::as_str)
            .filter(|ns| !ns.is_empty())
            .map_or(ApplicationsNamespace::Unset, |ns| {
                ApplicationsNamespace::Found(ns.to_string())
            }))
    }
}

#[async_trait::async_trait]
impl<P: ComponentPolicy> Check for ComponentCheck<P> {
    fn meta(&self) -> &CheckMeta {
        &self.meta
    }

    async fn can_apply(&self, _ctx: &RunContext, target: &Target) -> Result<bool, CheckError> {
        Ok((self.gate)(target))
    }

    async fn validate(
        &self,
        ctx: &RunContext,
        target: &Target,
    ) -> Result<DiagnosticResult, CheckError> {
        let mut result = self.meta.new_result();
        stamp_target_version(&mut result, target);

        let reader = target.reader();
        let singleton = ctx
            .guard(get_singleton(reader, &self.singleton))
            .await?
            .map_err(|e| CheckError::read(format!("fetching {}", self.singleton.kind), e))?;

        let Some(singleton) = singleton else {
            debug!(check = %self.meta.id, resource = %self.singleton, "singleton not found");
            result.set_condition(resource_not_found(&self.singleton));
            return Ok(result);
        };

        let state = self.read_state(&singleton)?;
        result.set_annotation(annotations::MANAGEMENT_STATE, state.as_str());

        if let Some(required) = &self.required_states {
            if !required.contains(&state) {
                debug!(check = %self.meta.id, component = %self.component, %state, "state outside allow-list");
                result.set_condition(Condition::new(
                    condition_types::CONFIGURED,
                    ConditionStatus::True,
                    Reason::RequirementsMet,
                    format!("{} is {}; no action required", self.component, state),
                ));
                return Ok(result);
            }
        }

        let applications_namespace = if self.needs_applications_namespace {
            match self.applications_namespace(ctx, reader).await? {
                ApplicationsNamespace::Found(ns) => {
                    result.set_annotation(annotations::APPLICATIONS_NAMESPACE, ns.clone());
                    Some(ns)
                }
                ApplicationsNamespace::NoSingleton => {
                    debug!(check = %self.meta.id, "platform initialization singleton not found");
                    result.set_condition(resource_not_found(&resources::DSC_INITIALIZATION));
                    return Ok(result);
                }
                ApplicationsNamespace::Unset => {
                    debug!(check = %self.meta.id, "applications namespace unset");
                    result.set_condition(Condition::new(
                        condition_types::CONFIGURED,
                        ConditionStatus::False,
                        Reason::ConfigurationInvalid,
                        format!(
                            "{} has no {} set",
                            resources::DSC_INITIALIZATION.kind,
                            APPLICATIONS_NAMESPACE_PATH
                        ),
                    ));
                    return Ok(result);
                }
            }
        } else {
            None
        };

        let mut req = ComponentRequest {
            result,
            component: &self.component,
            singleton: &singleton,
            state,
            applications_namespace,
            target,
            ctx,
        };

        debug!(check = %self.meta.id, component = %self.component, %state, "evaluating component policy");
        self.policy.evaluate(&mut req).await?;
        Ok(req.result)
    }
}
