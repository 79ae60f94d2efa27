//! Reusable fetch, filter and validate pipelines every check is built from

pub mod component;
pub mod workload;
pub mod operator;

use crate::check::annotations;
use crate::target::Target;
use kompat_cluster::ResourceType;
use kompat_core::{condition_types, Condition, ConditionStatus, DiagnosticResult, Reason};

/// `Available=False/ResourceNotFound` for a missing resource
pub(crate) fn resource_not_found(resource: &ResourceType) -> Condition {
    Condition::new(
        condition_types::AVAILABLE,
        ConditionStatus::False,
        Reason::ResourceNotFound,
        format!("{} not found on the cluster", resource.kind),
    )
}

pub(crate) fn stamp_target_version(result: &mut DiagnosticResult, target: &Target) {
    result.set_annotation(annotations::TARGET_VERSION, target.target_version_label());
}
