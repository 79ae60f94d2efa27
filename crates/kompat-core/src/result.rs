//! Diagnostic result model
//!
//! A `DiagnosticResult` is created once per check invocation, mutated only
//! inside that invocation and handed to the orchestrator when it returns.

use crate::condition::Condition;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Check grouping used for ordering and rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckGroup {
    /// Platform components toggled through the cluster configuration singleton
    Component,

    /// User workloads (custom resources created by users)
    Workload,

    /// Third-party operators the platform depends on
    Dependency,
}

impl std::fmt::Display for CheckGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Component => write!(f, "component"),
            Self::Workload => write!(f, "workload"),
            Self::Dependency => write!(f, "dependency"),
        }
    }
}

/// API version and kind of a resource
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeMeta {
    pub api_version: String,
    pub kind: String,
}

impl TypeMeta {
    pub fn new(api_version: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            api_version: api_version.into(),
            kind: kind.into(),
        }
    }
}

/// Location of a live object, without its type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ObjectRef {
    /// Namespace (None for cluster-scoped objects)
    pub namespace: Option<String>,

    /// Object name
    pub name: String,

    /// Extra context rendered next to the object
    pub annotations: BTreeMap<String, String>,
}

impl ObjectRef {
    /// Reference a namespaced object
    pub fn namespaced(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            name: name.into(),
            annotations: BTreeMap::new(),
        }
    }

    /// Reference a cluster-scoped object
    pub fn cluster(name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            name: name.into(),
            annotations: BTreeMap::new(),
        }
    }

    /// Attach an annotation
    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }
}

/// Minimal reference to a live resource affected by a condition
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactedObject {
    #[serde(flatten)]
    pub type_meta: TypeMeta,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    pub name: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

impl ImpactedObject {
    /// Stamp an object reference with its type
    pub fn from_ref(type_meta: &TypeMeta, object: ObjectRef) -> Self {
        Self {
            type_meta: type_meta.clone(),
            namespace: object.namespace,
            name: object.name,
            annotations: object.annotations,
        }
    }
}

impl std::fmt::Display for ImpactedObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{}/{}/{}", self.type_meta.kind, ns, self.name),
            None => write!(f, "{}/{}", self.type_meta.kind, self.name),
        }
    }
}

/// Result of a single check invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticResult {
    /// Check group
    pub group: CheckGroup,

    /// Kind of thing the check inspects (component name, CRD kind, operator)
    pub kind: String,

    /// Check type (e.g. "removal", "deprecation")
    pub name: String,

    /// Check description
    pub description: String,

    /// Free-form annotations (management state, versions, counts)
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,

    /// Ordered conditions
    #[serde(default)]
    pub conditions: Vec<Condition>,

    /// Suggested fix, shown next to failing conditions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,

    /// Impacted objects. `None` means nobody has set them yet, which is
    /// different from an explicitly empty list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    impacted_objects: Option<Vec<ImpactedObject>>,
}

impl DiagnosticResult {
    /// Create an empty result stamped with check metadata
    pub fn new(
        group: CheckGroup,
        kind: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            group,
            kind: kind.into(),
            name: name.into(),
            description: description.into(),
            annotations: BTreeMap::new(),
            conditions: Vec::new(),
            remediation: None,
            impacted_objects: None,
        }
    }

    pub fn with_remediation(mut self, remediation: Option<String>) -> Self {
        self.remediation = remediation;
        self
    }

    /// Append a condition. Conditions are additive within one invocation.
    pub fn set_condition(&mut self, condition: Condition) {
        self.conditions.push(condition);
    }

    /// Set (or overwrite) an annotation
    pub fn set_annotation(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.annotations.insert(key.into(), value.into());
    }

    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations.get(key).map(String::as_str)
    }

    /// First condition of the given type
    pub fn condition(&self, condition_type: &str) -> Option<&Condition> {
        self.conditions
            .iter()
            .find(|c| c.condition_type == condition_type)
    }

    /// Replace the impacted objects, stamping each with `type_meta`
    pub fn set_impacted_objects<I>(&mut self, type_meta: &TypeMeta, objects: I)
    where
        I: IntoIterator<Item = ObjectRef>,
    {
        let objects = objects
            .into_iter()
            .map(|o| ImpactedObject::from_ref(type_meta, o))
            .collect();
        self.impacted_objects = Some(objects);
    }

    /// Impacted objects (empty when unset)
    pub fn impacted_objects(&self) -> &[ImpactedObject] {
        self.impacted_objects.as_deref().unwrap_or(&[])
    }

    /// Whether impacted objects were set explicitly, even to an empty list
    pub fn has_impacted_objects_set(&self) -> bool {
        self.impacted_objects.is_some()
    }

    /// Any condition evaluated to False
    pub fn is_failing(&self) -> bool {
        self.conditions.iter().any(Condition::is_false)
    }

    /// Any False condition marked blocking
    pub fn has_blocking_failure(&self) -> bool {
        self.conditions.iter().any(Condition::is_blocking_failure)
    }
}
