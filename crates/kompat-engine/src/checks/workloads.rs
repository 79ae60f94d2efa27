//! Workload checks: live instances affected by the upgrade

use crate::check::{gates, CheckMeta};
use crate::error::CheckError;
use crate::protocol::workload::{WorkloadCheck, WorkloadPolicy, WorkloadRequest};
use kompat_cluster::{resources, KubeObject, PartialObjectMetadata, Unstructured};
use kompat_core::{condition_types, CheckGroup, Condition, ConditionStatus, Impact, Reason};

pub const MODELMESH_INFERENCE_SERVICES: &str = "workloads.inferenceservice.modelmesh";
pub const NOTEBOOK_INVENTORY: &str = "workloads.notebook.inventory";

/// Annotation KServe uses to select the deployment mode of an InferenceService
pub const DEPLOYMENT_MODE_ANNOTATION: &str = "serving.kserve.io/deploymentMode";

const MODELMESH_MODE: &str = "ModelMesh";

fn impacted_condition<T>(req: &WorkloadRequest<'_, T>, impact: Impact, what: &str) -> Condition {
    let count = req.items.len();
    if count == 0 {
        Condition::new(
            condition_types::VALIDATED,
            ConditionStatus::True,
            Reason::NoWorkloadsImpacted,
            format!("No {what} found"),
        )
    } else {
        Condition::new(
            condition_types::VALIDATED,
            ConditionStatus::False,
            Reason::WorkloadsImpacted,
            format!("Found {count} {what}"),
        )
        .with_impact(impact)
    }
}

/// InferenceServices deployed in ModelMesh mode
struct ModelMeshServices;

#[async_trait::async_trait]
impl WorkloadPolicy<Unstructured> for ModelMeshServices {
    fn filter(&self, item: &Unstructured) -> Result<bool, CheckError> {
        Ok(item.annotation(DEPLOYMENT_MODE_ANNOTATION) == Some(MODELMESH_MODE))
    }

    async fn evaluate(&self, req: &mut WorkloadRequest<'_, Unstructured>) -> Result<(), CheckError> {
        let condition = impacted_condition(req, Impact::Blocking, "InferenceServices using ModelMesh");
        req.result.set_condition(condition);
        Ok(())
    }
}

pub fn modelmesh_inference_services() -> WorkloadCheck<Unstructured, impl WorkloadPolicy<Unstructured>> {
    let meta = CheckMeta::new(
        MODELMESH_INFERENCE_SERVICES,
        "ModelMesh InferenceServices",
        CheckGroup::Workload,
        "inferenceservice",
        "modelmesh",
    )
    .with_description("InferenceServices deployed with ModelMesh stop serving after the upgrade")
    .with_remediation("Redeploy the listed InferenceServices in RawDeployment mode");

    WorkloadCheck::new(meta, resources::INFERENCE_SERVICE, ModelMeshServices)
        .applies_when(gates::upgrade_2x_to_3x)
}

/// Every notebook; they are restarted during the upgrade
struct NotebookInventory;

#[async_trait::async_trait]
impl WorkloadPolicy<PartialObjectMetadata> for NotebookInventory {
    async fn evaluate(
        &self,
        req: &mut WorkloadRequest<'_, PartialObjectMetadata>,
    ) -> Result<(), CheckError> {
        let condition = impacted_condition(req, Impact::Advisory, "notebooks that will be restarted");
        req.result.set_condition(condition);
        Ok(())
    }
}

pub fn notebook_inventory() -> WorkloadCheck<PartialObjectMetadata, impl WorkloadPolicy<PartialObjectMetadata>> {
    let meta = CheckMeta::new(
        NOTEBOOK_INVENTORY,
        "Notebook inventory",
        CheckGroup::Workload,
        "notebook",
        "inventory",
    )
    .with_description("Notebooks are restarted on their new images during the upgrade")
    .with_remediation("Save work in running notebooks before upgrading");

    WorkloadCheck::new(meta, resources::NOTEBOOK, NotebookInventory)
        .applies_when(gates::upgrade_2x_to_3x)
}

