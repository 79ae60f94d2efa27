//! Well-known platform resource types

use crate::resource::ResourceType;

/// Cluster-scoped singleton carrying per-component management states
pub const DATA_SCIENCE_CLUSTER: ResourceType = ResourceType::new(
    "datasciencecluster.opendatahub.io",
    "v1",
    "DataScienceCluster",
    "datascienceclusters",
);

/// Cluster-scoped singleton carrying platform-wide settings
pub const DSC_INITIALIZATION: ResourceType = ResourceType::new(
    "dscinitialization.opendatahub.io",
    "v1",
    "DSCInitialization",
    "dscinitializations",
);

pub const INFERENCE_SERVICE: ResourceType = ResourceType::new(
    "serving.kserve.io",
    "v1beta1",
    "InferenceService",
    "inferenceservices",
);

pub const NOTEBOOK: ResourceType =
    ResourceType::new("kubeflow.org", "v1", "Notebook", "notebooks");

pub const CONFIG_MAP: ResourceType = ResourceType::new("", "v1", "ConfigMap", "configmaps");
