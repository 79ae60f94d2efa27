//! Resource reader trait and absence-normalizing glue

use crate::olm::OlmReader;
use crate::resource::{KubeObject, PartialObjectMetadata, ResourceType, Unstructured};

/// Options for fetching one object
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetOptions {
    /// Namespace (None for cluster-scoped objects)
    pub namespace: Option<String>,
}

impl GetOptions {
    pub fn namespaced(namespace: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
        }
    }
}

/// Options for listing objects
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Restrict to one namespace (None lists across all namespaces)
    pub namespace: Option<String>,

    /// Equality-based label selector, e.g. `app=nb,tier=gold`
    pub label_selector: Option<String>,
}

impl ListOptions {
    pub fn in_namespace(namespace: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            label_selector: None,
        }
    }

    pub fn with_label_selector(mut self, selector: impl Into<String>) -> Self {
        self.label_selector = Some(selector.into());
        self
    }
}

/// Errors that can occur when reading cluster state
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReadError {
    #[error("{resource} '{name}' not found")]
    NotFound { resource: String, name: String },

    #[error("resource type {0} is not installed on the cluster")]
    ResourceTypeNotFound(String),

    #[error("permission denied: {0}")]
    Forbidden(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid response: {0}")]
    Decode(String),

    #[error("expected at most one {resource}, found {count}")]
    Ambiguous { resource: String, count: usize },
}

impl ReadError {
    /// The named object does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// The resource kind itself is not served (CRD absent)
    pub fn is_resource_type_not_found(&self) -> bool {
        matches!(self, Self::ResourceTypeNotFound(_))
    }
}

/// Read-only access to cluster state
///
/// Implementations must never mutate the cluster. Retries, if any, belong
/// to the implementation.
#[async_trait::async_trait]
pub trait ResourceReader: Send + Sync {
    /// Reader name for logs (e.g. "kube", "Mock")
    fn name(&self) -> &'static str;

    /// Fetch one object by name
    async fn get(
        &self,
        resource: &ResourceType,
        name: &str,
        opts: &GetOptions,
    ) -> Result<Unstructured, ReadError>;

    /// List full objects
    async fn list(
        &self,
        resource: &ResourceType,
        opts: &ListOptions,
    ) -> Result<Vec<Unstructured>, ReadError>;

    /// List metadata-only projections
    async fn list_metadata(
        &self,
        resource: &ResourceType,
        opts: &ListOptions,
    ) -> Result<Vec<PartialObjectMetadata>, ReadError>;

    /// OLM access for this cluster
    fn olm(&self) -> &dyn OlmReader;
}

/// Object shapes that can be listed from a reader
#[async_trait::async_trait]
pub trait Listable: KubeObject + Send + Sync + Sized + 'static {
    async fn list_from(
        reader: &dyn ResourceReader,
        resource: &ResourceType,
        opts: &ListOptions,
    ) -> Result<Vec<Self>, ReadError>;
}

#[async_trait::async_trait]
impl Listable for Unstructured {
    async fn list_from(
        reader: &dyn ResourceReader,
        resource: &ResourceType,
        opts: &ListOptions,
    ) -> Result<Vec<Self>, ReadError> {
        reader.list(resource, opts).await
    }
}

#[async_trait::async_trait]
impl Listable for PartialObjectMetadata {
    async fn list_from(
        reader: &dyn ResourceReader,
        resource: &ResourceType,
        opts: &ListOptions,
    ) -> Result<Vec<Self>, ReadError> {
        reader.list_metadata(resource, opts).await
    }
}

/// List objects, treating an uninstalled resource type as an empty list
pub async fn list_or_empty<T: Listable>(
    reader: &dyn ResourceReader,
    resource: &ResourceType,
    opts: &ListOptions,
) -> Result<Vec<T>, ReadError> {
    match T::list_from(reader, resource, opts).await {
        Ok(items) => Ok(items),
        Err(e) if e.is_resource_type_not_found() => Ok(Vec::new()),
        Err(e) => Err(e),
    }
}

/// Fetch the single instance of a cluster-scoped resource
///
/// Returns `Ok(None)` when no instance exists or the resource type is not
/// installed. More than one instance is an error.
pub async fn get_singleton(
    reader: &dyn ResourceReader,
    resource: &ResourceType,
) -> Result<Option<Unstructured>, ReadError> {
    let mut items: Vec<Unstructured> =
        list_or_empty(reader, resource, &ListOptions::default()).await?;

    match items.len() {
        0 => Ok(None),
        1 => Ok(items.pop()),
        count => Err(ReadError::Ambiguous {
            resource: resource.to_string(),
            count,
        }),
    }
}

/// Evaluate an equality-based label selector against an object
pub fn matches_label_selector<T: KubeObject + ?Sized>(object: &T, selector: &str) -> bool {
    selector
        .split(',')
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .all(|term| match term.split_once('=') {
            Some((key, value)) => object.label(key.trim()) == Some(value.trim()),
            None => object.label(term).is_some(),
        })
}
