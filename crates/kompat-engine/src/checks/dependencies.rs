//! Dependency checks: operators installed through OLM

use crate::check::{gates, CheckMeta};
use crate::protocol::operator::OperatorCheck;
use kompat_core::{condition_types, CheckGroup, Condition, ConditionStatus, Reason};

pub const SERVICEMESH_V2: &str = "dependencies.servicemesh.v2";
pub const AUTHORINO_PRESENCE: &str = "dependencies.authorino.presence";

/// Service Mesh v2 must be gone before moving to 3.x, so finding it is the failure
pub fn servicemesh_v2() -> OperatorCheck {
    let meta = CheckMeta::new(
        SERVICEMESH_V2,
        "Service Mesh v2",
        CheckGroup::Dependency,
        "servicemeshoperator",
        "deprecation",
    )
    .with_description("Service Mesh v2 is not supported in 3.x")
    .with_remediation("Migrate to Service Mesh v3 and remove the v2 operator subscription");

    OperatorCheck::new(meta)
        .with_channels(["stable", "v2.x"])
        .with_condition(|found, version| {
            let condition = if found {
                Condition::new(
                    condition_types::COMPATIBLE,
                    ConditionStatus::False,
                    Reason::VersionIncompatible,
                    format!("Service Mesh v2 ({version}) is installed and is not supported in 3.x"),
                )
                .blocking()
            } else {
                Condition::new(
                    condition_types::COMPATIBLE,
                    ConditionStatus::True,
                    Reason::VersionCompatible,
                    "Service Mesh v2 is not installed",
                )
            };
            Ok(condition)
        })
        .applies_when(gates::upgrade_2x_to_3x)
}

/// Authorino backs model serving authentication from 2.16 on
pub fn authorino_presence() -> OperatorCheck {
    let meta = CheckMeta::new(
        AUTHORINO_PRESENCE,
        "Authorino operator",
        CheckGroup::Dependency,
        "authorino-operator",
        "presence",
    )
    .with_description("Authorino is required for authenticated model serving")
    .with_remediation("Install the Authorino operator from OperatorHub");

    OperatorCheck::new(meta).applies_when(gates::installed_at_least(2, 16))
}
