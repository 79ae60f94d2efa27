//! Integration tests for the three check protocols
//!
//! Every check here runs against the in-memory mock reader.
//!
//! ```bash
//! cargo test -p kompat-engine --test protocol_tests
//! ```

mod fixtures;

use fixtures::{RecordingComponentPolicy, RecordingWorkloadPolicy};
use kompat_cluster::{
    resources, MockReader, MockReaderBuilder, PartialObjectMetadata, ReadError, Subscription,
    Unstructured, OLM_UNAVAILABLE_MESSAGE,
};
use kompat_core::{
    condition_types, CheckGroup, Condition, ConditionStatus, ObjectRef, Reason, TypeMeta,
};
use kompat_engine::{
    annotations, gates, Check, CheckError, CheckMeta, ComponentCheck, ManagementState,
    OperatorCheck, RunContext, WorkloadCheck,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn component_meta() -> CheckMeta {
    CheckMeta::new(
        "components.kserve.test",
        "KServe test",
        CheckGroup::Component,
        "kserve",
        "removal",
    )
    .with_description("exercises the component protocol")
    .with_remediation("set kserve to Removed")
}

fn workload_meta() -> CheckMeta {
    CheckMeta::new(
        "workloads.notebook.test",
        "Notebook test",
        CheckGroup::Workload,
        "notebook",
        "impacted",
    )
}

fn operator_meta() -> CheckMeta {
    CheckMeta::new(
        "dependencies.servicemesh.test",
        "Service Mesh test",
        CheckGroup::Dependency,
        "servicemeshoperator",
        "presence",
    )
}

fn single_condition(conditions: &[Condition]) -> &Condition {
    assert_eq!(conditions.len(), 1, "expected exactly one condition: {conditions:?}");
    &conditions[0]
}

// =============================================================================
// Gates
// =============================================================================

#[tokio::test]
async fn test_upgrade_gate_without_versions_is_not_applicable() {
    let ctx = RunContext::background();
    let policy = RecordingComponentPolicy::default();
    let check = ComponentCheck::new(component_meta(), "kserve", policy)
        .unwrap()
        .applies_when(gates::upgrade_2x_to_3x);

    let target = fixtures::unversioned_target(MockReader::new());
    assert!(!check.can_apply(&ctx, &target).await.unwrap());

    let target = target.with_current_version(semver::Version::new(2, 17, 0));
    assert!(!check.can_apply(&ctx, &target).await.unwrap());

    let target = fixtures::upgrade_target(MockReader::new());
    assert!(check.can_apply(&ctx, &target).await.unwrap());
}

#[tokio::test]
async fn test_installed_version_gate() {
    let ctx = RunContext::background();
    let check = OperatorCheck::new(operator_meta()).applies_when(gates::installed_at_least(2, 16));

    let target = fixtures::unversioned_target(MockReader::new());
    assert!(!check.can_apply(&ctx, &target).await.unwrap());

    let target = target.with_current_version(semver::Version::new(2, 16, 0));
    assert!(check.can_apply(&ctx, &target).await.unwrap());
}

// =============================================================================
// Component protocol
// =============================================================================

#[tokio::test]
async fn test_component_singleton_absent() {
    let policy = RecordingComponentPolicy::default();
    let check = ComponentCheck::new(component_meta(), "kserve", policy.clone()).unwrap();
    let target = fixtures::upgrade_target(MockReader::new());

    let result = check.validate(&RunContext::background(), &target).await.unwrap();

    let condition = single_condition(&result.conditions);
    assert_eq!(condition.condition_type, condition_types::AVAILABLE);
    assert_eq!(condition.status, ConditionStatus::False);
    assert_eq!(condition.reason, Reason::ResourceNotFound);
    assert_eq!(policy.calls(), 0);
    assert_eq!(result.annotation(annotations::TARGET_VERSION), Some("3.0.0"));
}

#[tokio::test]
async fn test_component_state_outside_allow_list() {
    let reader = MockReaderBuilder::new()
        .with_object(
            &resources::DATA_SCIENCE_CLUSTER,
            fixtures::data_science_cluster(json!({ "kserve": { "managementState": "Removed" } })),
        )
        .build();
    let policy = RecordingComponentPolicy::default();
    let check = ComponentCheck::new(component_meta(), "kserve", policy.clone())
        .unwrap()
        .in_state([ManagementState::Managed]);

    let result = check
        .validate(&RunContext::background(), &fixtures::upgrade_target(reader))
        .await
        .unwrap();

    let condition = single_condition(&result.conditions);
    assert_eq!(condition.condition_type, condition_types::CONFIGURED);
    assert_eq!(condition.status, ConditionStatus::True);
    assert_eq!(condition.reason, Reason::RequirementsMet);
    assert_eq!(policy.calls(), 0);
    assert_eq!(result.annotation(annotations::MANAGEMENT_STATE), Some("Removed"));
}

#[tokio::test]
async fn test_component_missing_state_counts_as_removed() {
    let reader = MockReaderBuilder::new()
        .with_object(
            &resources::DATA_SCIENCE_CLUSTER,
            fixtures::data_science_cluster(json!({})),
        )
        .build();
    let policy = RecordingComponentPolicy::default();
    let check = ComponentCheck::new(component_meta(), "kserve", policy.clone()).unwrap();

    check
        .validate(&RunContext::background(), &fixtures::upgrade_target(reader))
        .await
        .unwrap();

    // no allow-list: the policy runs for Removed too
    assert_eq!(policy.calls(), 1);
    assert_eq!(policy.seen().unwrap().state, ManagementState::Removed);
}

#[tokio::test]
async fn test_component_matching_state_invokes_policy_once() {
    let reader = MockReaderBuilder::new()
        .with_object(
            &resources::DATA_SCIENCE_CLUSTER,
            fixtures::data_science_cluster(json!({ "kserve": { "managementState": "Managed" } })),
        )
        .with_object(
            &resources::DSC_INITIALIZATION,
            fixtures::dsc_initialization("opendatahub", "2.17.0"),
        )
        .build();
    let policy = RecordingComponentPolicy::default();
    let check = ComponentCheck::new(component_meta(), "kserve", policy.clone())
        .unwrap()
        .in_state([ManagementState::Managed, ManagementState::Unmanaged])
        .with_applications_namespace();

    let result = check
        .validate(&RunContext::background(), &fixtures::upgrade_target(reader))
        .await
        .unwrap();

    assert_eq!(policy.calls(), 1);
    let seen = policy.seen().unwrap();
    assert_eq!(seen.component, "kserve");
    assert_eq!(seen.state, ManagementState::Managed);
    assert_eq!(seen.applications_namespace.as_deref(), Some("opendatahub"));

    let keys: Vec<&str> = seen.annotations.iter().map(|(k, _)| k.as_str()).collect();
    assert!(keys.contains(&annotations::MANAGEMENT_STATE));
    assert!(keys.contains(&annotations::TARGET_VERSION));
    assert_eq!(result.annotation(annotations::APPLICATIONS_NAMESPACE), Some("opendatahub"));
}

#[tokio::test]
async fn test_component_applications_namespace_missing() {
    let reader = MockReaderBuilder::new()
        .with_object(
            &resources::DATA_SCIENCE_CLUSTER,
            fixtures::data_science_cluster(json!({ "kserve": { "managementState": "Managed" } })),
        )
        .build();
    let policy = RecordingComponentPolicy::default();
    let check = ComponentCheck::new(component_meta(), "kserve", policy.clone())
        .unwrap()
        .with_applications_namespace();

    let result = check
        .validate(&RunContext::background(), &fixtures::upgrade_target(reader))
        .await
        .unwrap();

    let condition = single_condition(&result.conditions);
    assert_eq!(condition.reason, Reason::ResourceNotFound);
    assert!(condition.message.contains("DSCInitialization"));
    assert_eq!(policy.calls(), 0);
}

#[tokio::test]
async fn test_component_applications_namespace_unset() {
    let reader = MockReaderBuilder::new()
        .with_object(
            &resources::DATA_SCIENCE_CLUSTER,
            fixtures::data_science_cluster(json!({ "kserve": { "managementState": "Managed" } })),
        )
        .with_object(&resources::DSC_INITIALIZATION, fixtures::dsc_initialization("", "2.17.0"))
        .build();
    let policy = RecordingComponentPolicy::default();
    let check = ComponentCheck::new(component_meta(), "kserve", policy.clone())
        .unwrap()
        .with_applications_namespace();

    let result = check
        .validate(&RunContext::background(), &fixtures::upgrade_target(reader))
        .await
        .unwrap();

    let condition = single_condition(&result.conditions);
    assert_eq!(condition.condition_type, condition_types::CONFIGURED);
    assert_eq!(condition.status, ConditionStatus::False);
    assert_eq!(condition.reason, Reason::ConfigurationInvalid);
    assert!(condition.message.contains("applicationsNamespace"), "{}", condition.message);
    assert!(!condition.message.contains("not found"), "{}", condition.message);
    assert!(result.annotation(annotations::APPLICATIONS_NAMESPACE).is_none());
    assert_eq!(policy.calls(), 0);
}

#[tokio::test]
async fn test_component_transport_error_is_fatal() {
    let reader = MockReaderBuilder::new()
        .with_error(
            resources::DATA_SCIENCE_CLUSTER,
            ReadError::Transport("connection refused".to_string()),
        )
        .build();
    let check =
        ComponentCheck::new(component_meta(), "kserve", RecordingComponentPolicy::default()).unwrap();

    let err = check
        .validate(&RunContext::background(), &fixtures::upgrade_target(reader))
        .await
        .unwrap_err();

    assert!(matches!(err, CheckError::Read { .. }));
    assert!(err.to_string().contains("connection refused"));
}

// =============================================================================
// Workload protocol
// =============================================================================

#[tokio::test]
async fn test_workload_crd_absent_is_empty() {
    let policy = RecordingWorkloadPolicy::default();
    let check = WorkloadCheck::<Unstructured, _>::new(workload_meta(), resources::NOTEBOOK, policy.clone());

    let result = check
        .validate(&RunContext::background(), &fixtures::upgrade_target(MockReader::new()))
        .await
        .unwrap();

    assert_eq!(policy.calls(), 1);
    assert_eq!(policy.seen_items(), 0);
    assert_eq!(result.annotation(annotations::WORKLOAD_COUNT), Some("0"));
    // an empty slice stays unset
    assert!(!result.has_impacted_objects_set());
}

#[tokio::test]
async fn test_workload_filter_error_aborts() {
    let reader = MockReaderBuilder::new()
        .with_object(&resources::NOTEBOOK, fixtures::notebook("team-a", "nb"))
        .build();
    let policy = RecordingWorkloadPolicy {
        filter_error: Some("bad annotation".to_string()),
        ..Default::default()
    };
    let check = WorkloadCheck::<Unstructured, _>::new(workload_meta(), resources::NOTEBOOK, policy.clone());

    let err = check
        .validate(&RunContext::background(), &fixtures::upgrade_target(reader))
        .await
        .unwrap_err();

    let message = err.to_string();
    assert!(message.contains("filtering"), "{message}");
    assert!(message.contains("bad annotation"), "{message}");
    assert_eq!(policy.calls(), 0);
}

#[tokio::test]
async fn test_workload_custom_impacted_objects_are_kept() {
    let reader = MockReaderBuilder::new()
        .with_object(&resources::NOTEBOOK, fixtures::notebook("team-a", "nb-1"))
        .with_object(&resources::NOTEBOOK, fixtures::notebook("team-a", "nb-2"))
        .build();
    let policy = RecordingWorkloadPolicy {
        custom_impacted: Some(vec![
            ObjectRef::namespaced("team-a", "nb-2").with_annotation("reason", "custom image")
        ]),
        ..Default::default()
    };
    let check = WorkloadCheck::<Unstructured, _>::new(workload_meta(), resources::NOTEBOOK, policy);

    let result = check
        .validate(&RunContext::background(), &fixtures::upgrade_target(reader))
        .await
        .unwrap();

    let impacted = result.impacted_objects();
    assert_eq!(impacted.len(), 1);
    assert_eq!(impacted[0].name, "nb-2");
    assert_eq!(impacted[0].annotations.get("reason").map(String::as_str), Some("custom image"));
}

#[tokio::test]
async fn test_workload_custom_empty_list_is_kept() {
    let reader = MockReaderBuilder::new()
        .with_object(&resources::NOTEBOOK, fixtures::notebook("team-a", "nb-1"))
        .build();
    let policy = RecordingWorkloadPolicy {
        custom_impacted: Some(Vec::new()),
        ..Default::default()
    };
    let check = WorkloadCheck::<Unstructured, _>::new(workload_meta(), resources::NOTEBOOK, policy);

    let result = check
        .validate(&RunContext::background(), &fixtures::upgrade_target(reader))
        .await
        .unwrap();

    assert!(result.has_impacted_objects_set());
    assert!(result.impacted_objects().is_empty());
}

#[tokio::test]
async fn test_workload_auto_populates_impacted_objects() {
    let reader = MockReaderBuilder::new()
        .with_object(&resources::NOTEBOOK, fixtures::notebook("team-a", "keep-1"))
        .with_object(&resources::NOTEBOOK, fixtures::notebook("team-b", "keep-2"))
        .with_object(&resources::NOTEBOOK, fixtures::notebook("team-b", "drop"))
        .build();
    let policy = RecordingWorkloadPolicy {
        name_prefix: Some("keep".to_string()),
        ..Default::default()
    };
    let check = WorkloadCheck::<PartialObjectMetadata, _>::new(
        workload_meta(),
        resources::NOTEBOOK,
        policy.clone(),
    );

    let result = check
        .validate(&RunContext::background(), &fixtures::upgrade_target(reader))
        .await
        .unwrap();

    assert_eq!(policy.seen_items(), 2);
    assert_eq!(result.annotation(annotations::WORKLOAD_COUNT), Some("2"));

    let expected_type = TypeMeta::new("kubeflow.org/v1", "Notebook");
    let impacted = result.impacted_objects();
    assert_eq!(impacted.len(), 2);
    for object in impacted {
        assert_eq!(object.type_meta, expected_type);
    }
    let names: Vec<&str> = impacted.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, vec!["keep-1", "keep-2"]);
}

#[tokio::test]
async fn test_workload_transport_error_is_wrapped() {
    let reader = MockReaderBuilder::new()
        .with_error(resources::NOTEBOOK, ReadError::Forbidden("notebooks".to_string()))
        .build();
    let policy = RecordingWorkloadPolicy::default();
    let check = WorkloadCheck::<Unstructured, _>::new(workload_meta(), resources::NOTEBOOK, policy.clone());

    let err = check
        .validate(&RunContext::background(), &fixtures::upgrade_target(reader))
        .await
        .unwrap_err();

    assert!(err.to_string().starts_with("listing notebooks.kubeflow.org"));
    assert_eq!(policy.calls(), 0);
}

// =============================================================================
// Operator protocol
// =============================================================================

#[tokio::test]
async fn test_operator_olm_unavailable() {
    let reader = MockReaderBuilder::new().without_olm().build();
    let check = OperatorCheck::new(operator_meta());

    let result = check
        .validate(&RunContext::background(), &fixtures::upgrade_target(reader))
        .await
        .unwrap();

    let condition = single_condition(&result.conditions);
    assert_eq!(condition.status, ConditionStatus::False);
    assert_eq!(condition.reason, Reason::ResourceNotFound);
    assert_eq!(condition.message, OLM_UNAVAILABLE_MESSAGE);
    assert!(result.annotation(annotations::OPERATOR_INSTALLED_VERSION).is_none());
}

#[tokio::test]
async fn test_operator_found_records_version() {
    let reader = MockReaderBuilder::new()
        .with_subscription(
            Subscription::new("openshift-operators", "servicemeshoperator")
                .with_channel("stable")
                .with_installed_csv("servicemeshoperator.v2.6.1"),
        )
        .build();
    let check = OperatorCheck::new(operator_meta());

    let result = check
        .validate(&RunContext::background(), &fixtures::upgrade_target(reader))
        .await
        .unwrap();

    let condition = single_condition(&result.conditions);
    assert_eq!(condition.status, ConditionStatus::True);
    assert_eq!(condition.reason, Reason::ResourceFound);
    assert!(condition.message.contains("2.6.1"));
    assert_eq!(result.annotation(annotations::OPERATOR_INSTALLED_VERSION), Some("2.6.1"));
}

#[tokio::test]
async fn test_operator_version_skips_dots_in_package_name() {
    let reader = MockReaderBuilder::new()
        .with_subscription(
            Subscription::new("openshift-operators", "vertical-operator")
                .with_installed_csv("openshift.vertical-operator.v1.4.0"),
        )
        .build();
    let check = OperatorCheck::new(operator_meta()).with_names(["vertical-operator"]);

    let result = check
        .validate(&RunContext::background(), &fixtures::upgrade_target(reader))
        .await
        .unwrap();

    let condition = single_condition(&result.conditions);
    assert!(condition.message.contains("version 1.4.0"), "{}", condition.message);
    assert_eq!(result.annotation(annotations::OPERATOR_INSTALLED_VERSION), Some("1.4.0"));
}

#[tokio::test]
async fn test_operator_empty_channel_never_matches() {
    let reader = MockReaderBuilder::new()
        .with_subscription(
            Subscription::new("openshift-operators", "servicemeshoperator")
                .with_installed_csv("servicemeshoperator.v2.6.1"),
        )
        .build();
    let check = OperatorCheck::new(operator_meta()).with_channels(["stable", "v2.x"]);

    let result = check
        .validate(&RunContext::background(), &fixtures::upgrade_target(reader))
        .await
        .unwrap();

    let condition = single_condition(&result.conditions);
    assert_eq!(condition.reason, Reason::ResourceNotFound);
    assert!(result.annotation(annotations::OPERATOR_INSTALLED_VERSION).is_none());
}

#[tokio::test]
async fn test_operator_builder_error_is_wrapped() {
    let reader = MockReaderBuilder::new().build();
    let check = OperatorCheck::new(operator_meta())
        .with_condition(|_, _| Err(anyhow::anyhow!("no template").into()));

    let err = check
        .validate(&RunContext::background(), &fixtures::upgrade_target(reader))
        .await
        .unwrap_err();

    assert!(matches!(err, CheckError::Condition { .. }));
    assert!(err.to_string().contains("no template"));
}

#[tokio::test]
async fn test_operator_subscription_error_is_fatal() {
    let reader = MockReaderBuilder::new()
        .with_subscription_error(ReadError::Transport("timeout".to_string()))
        .build();
    let check = OperatorCheck::new(operator_meta());

    let err = check
        .validate(&RunContext::background(), &fixtures::upgrade_target(reader))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("timeout"));
}

// =============================================================================
// Shared behaviour
// =============================================================================

#[tokio::test]
async fn test_results_carry_check_metadata() {
    let ctx = RunContext::background();
    let target = fixtures::upgrade_target(MockReader::new());

    let component = ComponentCheck::new(component_meta(), "kserve", RecordingComponentPolicy::default())
        .unwrap()
        .validate(&ctx, &target)
        .await
        .unwrap();
    let workload = WorkloadCheck::<Unstructured, _>::new(
        workload_meta(),
        resources::NOTEBOOK,
        RecordingWorkloadPolicy::default(),
    )
    .validate(&ctx, &target)
    .await
    .unwrap();
    let operator = OperatorCheck::new(operator_meta())
        .validate(&ctx, &target)
        .await
        .unwrap();

    for (result, meta) in [
        (component, component_meta()),
        (workload, workload_meta()),
        (operator, operator_meta()),
    ] {
        assert_eq!(result.group, meta.group);
        assert_eq!(result.kind, meta.kind);
        assert_eq!(result.name, meta.check_type);
        assert_eq!(result.description, meta.description);
        assert_eq!(result.remediation, meta.remediation);
        assert_eq!(result.annotation(annotations::TARGET_VERSION), Some("3.0.0"));
    }
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_aborts_reads() {
    let reader = MockReaderBuilder::new()
        .with_object(&resources::NOTEBOOK, fixtures::notebook("team-a", "nb"))
        .with_latency(60_000)
        .build();
    let check = WorkloadCheck::<Unstructured, _>::new(
        workload_meta(),
        resources::NOTEBOOK,
        RecordingWorkloadPolicy::default(),
    );
    let target = fixtures::upgrade_target(reader);
    let (ctx, handle) = RunContext::with_cancel();

    let cancel = async {
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        handle.cancel();
    };
    let (outcome, ()) = tokio::join!(check.validate(&ctx, &target), cancel);

    let err = outcome.unwrap_err();
    assert!(err.is_cancelled());
}
