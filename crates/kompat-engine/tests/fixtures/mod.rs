//! Test fixtures for engine integration tests
//!
//! Cluster objects shaped like the platform resources, targets at known
//! versions and recording policies for the protocols.

#![allow(dead_code)]

use kompat_cluster::{resources, KubeObject, Listable, MockReader, Unstructured};
use kompat_engine::{
    CheckError, ComponentPolicy, ComponentRequest, ManagementState, Target, WorkloadPolicy,
    WorkloadRequest,
};
use semver::Version;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// The platform singleton with a raw `.spec.components` body
pub fn data_science_cluster(components: Value) -> Unstructured {
    Unstructured::new(&resources::DATA_SCIENCE_CLUSTER, None, "default-dsc")
        .with_field("spec", json!({ "components": components }))
}

/// The platform initialization singleton
pub fn dsc_initialization(applications_namespace: &str, release: &str) -> Unstructured {
    Unstructured::new(&resources::DSC_INITIALIZATION, None, "default-dsci")
        .with_field("spec", json!({ "applicationsNamespace": applications_namespace }))
        .with_field("status", json!({ "release": { "name": "Open Data Hub", "version": release } }))
}

/// An InferenceService, optionally pinned to a deployment mode
pub fn inference_service(namespace: &str, name: &str, mode: Option<&str>) -> Unstructured {
    let isvc = Unstructured::new(&resources::INFERENCE_SERVICE, Some(namespace), name);
    match mode {
        Some(mode) => isvc.with_annotation("serving.kserve.io/deploymentMode", mode),
        None => isvc,
    }
}

pub fn notebook(namespace: &str, name: &str) -> Unstructured {
    Unstructured::new(&resources::NOTEBOOK, Some(namespace), name)
}

fn version(raw: &str) -> Version {
    Version::parse(raw).unwrap()
}

/// Target for a 2.x to 3.x upgrade
pub fn upgrade_target(reader: MockReader) -> Target {
    Target::new(Arc::new(reader))
        .with_current_version(version("2.17.0"))
        .with_target_version(version("3.0.0"))
}

/// Target without any version information
pub fn unversioned_target(reader: MockReader) -> Target {
    Target::new(Arc::new(reader))
}

/// What a component policy observed on its single invocation
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentSeen {
    pub component: String,
    pub state: ManagementState,
    pub applications_namespace: Option<String>,
    pub annotations: Vec<(String, String)>,
}

/// Component policy that records every invocation
#[derive(Clone, Default)]
pub struct RecordingComponentPolicy {
    pub calls: Arc<AtomicUsize>,
    pub seen: Arc<Mutex<Option<ComponentSeen>>>,
}

impl RecordingComponentPolicy {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Option<ComponentSeen> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ComponentPolicy for RecordingComponentPolicy {
    async fn evaluate(&self, req: &mut ComponentRequest<'_>) -> Result<(), CheckError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.seen.lock().unwrap() = Some(ComponentSeen {
            component: req.component.to_string(),
            state: req.state,
            applications_namespace: req.applications_namespace.clone(),
            annotations: req
                .result
                .annotations
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        });
        Ok(())
    }
}

/// Workload policy that counts invocations and optionally misbehaves
#[derive(Clone, Default)]
pub struct RecordingWorkloadPolicy {
    pub calls: Arc<AtomicUsize>,
    pub seen_items: Arc<AtomicUsize>,
    /// Filter fails with this message
    pub filter_error: Option<String>,
    /// Keep only items with this name prefix
    pub name_prefix: Option<String>,
    /// Set this impacted-object list instead of leaving it unset
    pub custom_impacted: Option<Vec<kompat_core::ObjectRef>>,
}

impl RecordingWorkloadPolicy {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen_items(&self) -> usize {
        self.seen_items.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl<T: Listable> WorkloadPolicy<T> for RecordingWorkloadPolicy {
    fn filter(&self, item: &T) -> Result<bool, CheckError> {
        if let Some(message) = &self.filter_error {
            return Err(anyhow::anyhow!("{message}").into());
        }
        Ok(self
            .name_prefix
            .as_deref()
            .map_or(true, |prefix| item.name().starts_with(prefix)))
    }

    async fn evaluate(&self, req: &mut WorkloadRequest<'_, T>) -> Result<(), CheckError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen_items.store(req.items.len(), Ordering::SeqCst);

        if let Some(objects) = &self.custom_impacted {
            req.result
                .set_impacted_objects(&req.resource.type_meta(), objects.iter().cloned());
        }
        Ok(())
    }
}
