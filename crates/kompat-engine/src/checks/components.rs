//! Component checks: management states on the DataScienceCluster

use crate::check::{gates, CheckMeta};
use crate::error::CheckError;
use crate::protocol::component::{ComponentCheck, ComponentPolicy, ComponentRequest, ManagementState};
use kompat_cluster::KubeObject;
use kompat_core::{condition_types, CheckGroup, Condition, ConditionStatus, Reason};
use serde::Deserialize;

pub const KSERVE_SERVERLESS_REMOVAL: &str = "components.kserve.serverless-removal";
pub const CODEFLARE_REMOVAL: &str = "components.codeflare.removal";

/// Condition type for KServe Serverless deployment mode
pub const SERVERLESS_MODE: &str = "ServerlessMode";

/// Condition type for ModelMesh deployment mode
pub const MODELMESH_MODE: &str = "ModelMeshMode";

/// The slice of the DataScienceCluster the serving-mode policy reads
#[derive(Debug, Default, Deserialize)]
struct ServingSpec {
    #[serde(default)]
    spec: ServingComponents,
}

#[derive(Debug, Default, Deserialize)]
struct ServingComponents {
    #[serde(default)]
    components: ServingModeStates,
}

#[derive(Debug, Default, Deserialize)]
struct ServingModeStates {
    #[serde(default)]
    kserve: KServeComponent,

    #[serde(default)]
    modelmeshserving: ManagedComponent,
}

#[derive(Debug, Default, Deserialize)]
struct KServeComponent {
    #[serde(default)]
    serving: ManagedComponent,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ManagedComponent {
    management_state: Option<ManagementState>,
}

impl ManagedComponent {
    /// An unset state reads as Removed
    fn state(&self) -> ManagementState {
        self.management_state.unwrap_or(ManagementState::Removed)
    }
}

/// Serverless and ModelMesh serving are both gone in 3.x; each gets its own condition
struct ServingModes;

#[async_trait::async_trait]
impl ComponentPolicy for ServingModes {
    async fn evaluate(&self, req: &mut ComponentRequest<'_>) -> Result<(), CheckError> {
        let states = req
            .singleton
            .decode::<ServingSpec>()
            .map_err(|e| {
                CheckError::decode(format!("DataScienceCluster {}", req.singleton.name()), e)
            })?
            .spec
            .components;

        req.result.set_condition(serving_mode_condition(
            SERVERLESS_MODE,
            "KServe Serverless",
            states.kserve.serving.state(),
        ));
        req.result.set_condition(serving_mode_condition(
            MODELMESH_MODE,
            "ModelMesh",
            states.modelmeshserving.state(),
        ));
        Ok(())
    }
}

fn serving_mode_condition(condition_type: &str, mode: &str, state: ManagementState) -> Condition {
    if state == ManagementState::Managed {
        Condition::new(
            condition_type,
            ConditionStatus::False,
            Reason::Deprecated,
            format!("{mode} is Managed but is not supported in 3.x; migrate deployments before upgrading"),
        )
        .blocking()
    } else {
        Condition::new(
            condition_type,
            ConditionStatus::True,
            Reason::RequirementsMet,
            format!("{mode} is {state}"),
        )
    }
}

pub fn kserve_serverless_removal() -> Result<ComponentCheck<impl ComponentPolicy>, CheckError> {
    let meta = CheckMeta::new(
        KSERVE_SERVERLESS_REMOVAL,
        "KServe Serverless removal",
        CheckGroup::Component,
        "kserve",
        "serverless-removal",
    )
    .with_description("KServe Serverless and ModelMesh deployment modes are removed in 3.x")
    .with_remediation("Migrate InferenceServices to RawDeployment mode and set serving.managementState to Removed");

    Ok(ComponentCheck::new(meta, "kserve", ServingModes)?
        .in_state([ManagementState::Managed])
        .with_applications_namespace()
        .applies_when(gates::upgrade_2x_to_3x))
}

/// Any non-removed CodeFlare blocks the upgrade
struct CodeFlareRemoved;

#[async_trait::async_trait]
impl ComponentPolicy for CodeFlareRemoved {
    async fn evaluate(&self, req: &mut ComponentRequest<'_>) -> Result<(), CheckError> {
        let message = format!(
            "{} is {} but is removed in {}",
            req.component,
            req.state,
            req.target.target_version_label()
        );
        req.result.set_condition(
            Condition::new(
                condition_types::COMPATIBLE,
                ConditionStatus::False,
                Reason::VersionIncompatible,
                message,
            )
            .blocking(),
        );
        Ok(())
    }
}

pub fn codeflare_removal() -> Result<ComponentCheck<impl ComponentPolicy>, CheckError> {
    let meta = CheckMeta::new(
        CODEFLARE_REMOVAL,
        "CodeFlare removal",
        CheckGroup::Component,
        "codeflare",
        "removal",
    )
    .with_description("CodeFlare is removed in 3.x")
    .with_remediation("Set codeflare managementState to Removed before upgrading");

    Ok(ComponentCheck::new(meta, "codeflare", CodeFlareRemoved)?
        .in_state([ManagementState::Managed, ManagementState::Unmanaged])
        .applies_when(gates::upgrade_2x_to_3x))
}
