//! Test fixtures for reader integration tests
//!
//! Reusable objects shaped like the platform resources checks read.

#![allow(dead_code)]

use kompat_cluster::{resources, Unstructured};
use serde_json::json;

/// The platform singleton with the given component management states
pub fn data_science_cluster(components: &[(&str, &str)]) -> Unstructured {
    let mut spec = serde_json::Map::new();
    for (component, state) in components {
        spec.insert(
            component.to_string(),
            json!({ "managementState": state }),
        );
    }

    Unstructured::new(&resources::DATA_SCIENCE_CLUSTER, None, "default-dsc")
        .with_field("spec", json!({ "components": spec }))
}

/// The platform initialization singleton
pub fn dsc_initialization(applications_namespace: &str, release: &str) -> Unstructured {
    Unstructured::new(&resources::DSC_INITIALIZATION, None, "default-dsci")
        .with_field("spec", json!({ "applicationsNamespace": applications_namespace }))
        .with_field("status", json!({ "release": { "name": "Open Data Hub", "version": release } }))
}

/// A notebook in a user namespace
pub fn notebook(namespace: &str, name: &str) -> Unstructured {
    Unstructured::new(&resources::NOTEBOOK, Some(namespace), name)
}
