//! Resource types and the two object shapes the reader returns

use crate::field_path::FieldPath;
use kompat_core::{ObjectRef, TypeMeta};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Identifies a kind of resource on the cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceType {
    /// API group ("" for the core group)
    pub group: &'static str,

    /// API version
    pub version: &'static str,

    /// Kind
    pub kind: &'static str,

    /// Lowercase plural used in API paths
    pub plural: &'static str,
}

impl ResourceType {
    pub const fn new(
        group: &'static str,
        version: &'static str,
        kind: &'static str,
        plural: &'static str,
    ) -> Self {
        Self {
            group,
            version,
            kind,
            plural,
        }
    }

    /// `group/version`, or just `version` for the core group
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.to_string()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }

    pub fn type_meta(&self) -> TypeMeta {
        TypeMeta::new(self.api_version(), self.kind)
    }

    /// Resource types from the core API group are always served
    pub fn is_core(&self) -> bool {
        self.group.is_empty()
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.group.is_empty() {
            write!(f, "{}", self.plural)
        } else {
            write!(f, "{}.{}", self.plural, self.group)
        }
    }
}

/// Standard object metadata (the subset checks care about)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

/// Common accessors over both object shapes
pub trait KubeObject {
    fn name(&self) -> &str;

    fn namespace(&self) -> Option<&str>;

    fn annotation(&self, key: &str) -> Option<&str>;

    fn label(&self, key: &str) -> Option<&str>;

    /// Minimal reference used for impacted-object lists
    fn object_ref(&self) -> ObjectRef {
        ObjectRef {
            namespace: self.namespace().map(str::to_string),
            name: self.name().to_string(),
            annotations: BTreeMap::new(),
        }
    }
}

/// A full object with an untyped body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Unstructured {
    data: Value,
}

impl Unstructured {
    /// Create an empty object of the given type
    pub fn new(resource: &ResourceType, namespace: Option<&str>, name: &str) -> Self {
        let mut metadata = serde_json::Map::new();
        metadata.insert("name".to_string(), Value::String(name.to_string()));
        if let Some(ns) = namespace {
            metadata.insert("namespace".to_string(), Value::String(ns.to_string()));
        }

        let mut data = serde_json::Map::new();
        data.insert("apiVersion".to_string(), Value::String(resource.api_version()));
        data.insert("kind".to_string(), Value::String(resource.kind.to_string()));
        data.insert("metadata".to_string(), Value::Object(metadata));

        Self {
            data: Value::Object(data),
        }
    }

    /// Wrap a raw JSON object
    pub fn from_value(data: Value) -> Self {
        Self { data }
    }

    /// Set a top-level field (e.g. `spec`, `status`)
    pub fn with_field(mut self, key: &str, value: Value) -> Self {
        if let Value::Object(map) = &mut self.data {
            map.insert(key.to_string(), value);
        }
        self
    }

    /// Set a metadata annotation
    pub fn with_annotation(mut self, key: &str, value: &str) -> Self {
        self.insert_metadata_entry("annotations", key, value);
        self
    }

    /// Set a metadata label
    pub fn with_label(mut self, key: &str, value: &str) -> Self {
        self.insert_metadata_entry("labels", key, value);
        self
    }

    fn insert_metadata_entry(&mut self, section: &str, key: &str, value: &str) {
        let Some(metadata) = self.data.get_mut("metadata").and_then(Value::as_object_mut) else {
            return;
        };
        let entries = metadata
            .entry(section.to_string())
            .or_insert_with(|| Value::Object(serde_json::Map::new()));
        if let Value::Object(map) = entries {
            map.insert(key.to_string(), Value::String(value.to_string()));
        }
    }

    pub fn value(&self) -> &Value {
        &self.data
    }

    pub fn into_value(self) -> Value {
        self.data
    }

    /// Resolve a field path
    pub fn get(&self, path: &FieldPath) -> Option<&Value> {
        path.lookup(&self.data)
    }

    /// Decode the whole object into a typed struct
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.data)
    }

    /// Decoded metadata (empty when absent or malformed)
    pub fn metadata(&self) -> ObjectMeta {
        self.data
            .get("metadata")
            .and_then(|m| ObjectMeta::deserialize(m).ok())
            .unwrap_or_default()
    }

    /// Project to the metadata-only shape
    pub fn to_partial(&self, resource: &ResourceType) -> PartialObjectMetadata {
        PartialObjectMetadata {
            type_meta: resource.type_meta(),
            metadata: self.metadata(),
        }
    }

    fn metadata_str(&self, pointer: &str) -> Option<&str> {
        self.data.pointer(pointer).and_then(Value::as_str)
    }

    fn metadata_map_entry(&self, section: &str, key: &str) -> Option<&str> {
        self.data
            .get("metadata")?
            .get(section)?
            .get(key)?
            .as_str()
    }
}

impl KubeObject for Unstructured {
    fn name(&self) -> &str {
        self.metadata_str("/metadata/name").unwrap_or_default()
    }

    fn namespace(&self) -> Option<&str> {
        self.metadata_str("/metadata/namespace")
    }

    fn annotation(&self, key: &str) -> Option<&str> {
        self.metadata_map_entry("annotations", key)
    }

    fn label(&self, key: &str) -> Option<&str> {
        self.metadata_map_entry("labels", key)
    }
}

/// Metadata-only projection of an object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialObjectMetadata {
    #[serde(flatten)]
    pub type_meta: TypeMeta,

    #[serde(default)]
    pub metadata: ObjectMeta,
}

impl KubeObject for PartialObjectMetadata {
    fn name(&self) -> &str {
        &self.metadata.name
    }

    fn namespace(&self) -> Option<&str> {
        self.metadata.namespace.as_deref()
    }

    fn annotation(&self, key: &str) -> Option<&str> {
        self.metadata.annotations.get(key).map(String::as_str)
    }

    fn label(&self, key: &str) -> Option<&str> {
        self.metadata.labels.get(key).map(String::as_str)
    }
}
