//! Mock resource reader for testing
//!
//! This reader serves predefined objects and subscriptions from memory
//! without connecting to any cluster. It's useful for:
//! - Unit testing check protocols
//! - Simulating absent CRDs, missing singletons and transport failures
//! - Demos without cluster credentials
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kompat_cluster::{resources, MockReaderBuilder, Subscription, Unstructured};
//!
//! let reader = MockReaderBuilder::new()
//!     .with_object(&resources::NOTEBOOK, Unstructured::new(&resources::NOTEBOOK, Some("ns"), "nb"))
//!     .with_subscription(Subscription::new("openshift-operators", "authorino-operator"))
//!     .build();
//! ```

use crate::olm::{OlmReader, Subscription, OLM_UNAVAILABLE_MESSAGE};
use crate::reader::{matches_label_selector, GetOptions, ListOptions, ReadError, ResourceReader};
use crate::resource::{KubeObject, PartialObjectMetadata, ResourceType, Unstructured};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Mock resource reader for testing
///
/// Objects are keyed by resource type. A resource type is "installed" once
/// it has been registered with [`MockReader::install`] or has had an object
/// added; listing any other non-core type yields
/// [`ReadError::ResourceTypeNotFound`].
pub struct MockReader {
    /// Objects by resource type
    objects: Arc<RwLock<HashMap<ResourceType, Vec<Unstructured>>>>,

    /// Installed (served) resource types
    installed: Arc<RwLock<HashSet<ResourceType>>>,

    /// Errors to return for specific resource types
    errors: Arc<RwLock<HashMap<ResourceType, ReadError>>>,

    /// Subscriptions served through OLM
    subscriptions: Arc<RwLock<Vec<Subscription>>>,

    /// Error returned when listing subscriptions
    subscription_error: Option<ReadError>,

    /// Whether OLM is reachable
    olm_available: bool,

    /// Simulate read latency (milliseconds)
    latency_ms: u64,

    /// Number of reads served
    reads: Arc<AtomicUsize>,
}

impl MockReader {
    /// Create a new mock reader with no objects and OLM available
    pub fn new() -> Self {
        Self {
            objects: Arc::new(RwLock::new(HashMap::new())),
            installed: Arc::new(RwLock::new(HashSet::new())),
            errors: Arc::new(RwLock::new(HashMap::new())),
            subscriptions: Arc::new(RwLock::new(Vec::new())),
            subscription_error: None,
            olm_available: true,
            latency_ms: 0,
            reads: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Mark a resource type as installed without adding objects
    pub async fn install(&self, resource: ResourceType) {
        self.installed.write().await.insert(resource);
    }

    /// Add an object (installs its resource type)
    pub async fn add_object(&self, resource: ResourceType, object: Unstructured) {
        self.installed.write().await.insert(resource);
        self.objects
            .write()
            .await
            .entry(resource)
            .or_default()
            .push(object);
    }

    /// Add an OLM subscription
    pub async fn add_subscription(&self, subscription: Subscription) {
        self.subscriptions.write().await.push(subscription);
    }

    /// Configure an error to be returned for every read of a resource type
    pub async fn add_error_for(&self, resource: ResourceType, error: ReadError) {
        self.errors.write().await.insert(resource, error);
    }

    /// Remove all objects and errors
    pub async fn clear(&self) {
        self.objects.write().await.clear();
        self.errors.write().await.clear();
    }

    /// Configure OLM as unreachable
    pub fn without_olm(mut self) -> Self {
        self.olm_available = false;
        self
    }

    /// Configure simulated latency for every read
    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    /// Number of reads served so far
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Simulate latency if configured
    async fn simulate_latency(&self) {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.latency_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.latency_ms)).await;
        }
    }

    /// Shared path for every object read: latency, configured errors, CRD presence
    async fn objects_of(
        &self,
        resource: &ResourceType,
        opts: &ListOptions,
    ) -> Result<Vec<Unstructured>, ReadError> {
        self.simulate_latency().await;

        if let Some(error) = self.errors.read().await.get(resource) {
            return Err(error.clone());
        }

        if !resource.is_core() && !self.installed.read().await.contains(resource) {
            return Err(ReadError::ResourceTypeNotFound(resource.to_string()));
        }

        let objects = self.objects.read().await;
        let items = objects
            .get(resource)
            .map(|items| {
                items
                    .iter()
                    .filter(|o| match &opts.namespace {
                        Some(ns) => o.namespace() == Some(ns.as_str()),
                        None => true,
                    })
                    .filter(|o| match &opts.label_selector {
                        Some(selector) => matches_label_selector(*o, selector),
                        None => true,
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        Ok(items)
    }
}

impl Default for MockReader {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MockReader {
    fn clone(&self) -> Self {
        Self {
            objects: Arc::clone(&self.objects),
            installed: Arc::clone(&self.installed),
            errors: Arc::clone(&self.errors),
            subscriptions: Arc::clone(&self.subscriptions),
            subscription_error: self.subscription_error.clone(),
            olm_available: self.olm_available,
            latency_ms: self.latency_ms,
            reads: Arc::clone(&self.reads),
        }
    }
}

#[async_trait::async_trait]
impl ResourceReader for MockReader {
    fn name(&self) -> &'static str {
        "Mock"
    }

    async fn get(
        &self,
        resource: &ResourceType,
        name: &str,
        opts: &GetOptions,
    ) -> Result<Unstructured, ReadError> {
        let list_opts = ListOptions {
            namespace: opts.namespace.clone(),
            label_selector: None,
        };

        self.objects_of(resource, &list_opts)
            .await?
            .into_iter()
            .find(|o| o.name() == name)
            .ok_or_else(|| ReadError::NotFound {
                resource: resource.to_string(),
                name: name.to_string(),
            })
    }

    async fn list(
        &self,
        resource: &ResourceType,
        opts: &ListOptions,
    ) -> Result<Vec<Unstructured>, ReadError> {
        self.objects_of(resource, opts).await
    }

    async fn list_metadata(
        &self,
        resource: &ResourceType,
        opts: &ListOptions,
    ) -> Result<Vec<PartialObjectMetadata>, ReadError> {
        let items = self.objects_of(resource, opts).await?;
        Ok(items.iter().map(|o| o.to_partial(resource)).collect())
    }

    fn olm(&self) -> &dyn OlmReader {
        self
    }
}

#[async_trait::async_trait]
impl OlmReader for MockReader {
    fn available(&self) -> bool {
        self.olm_available
    }

    async fn list_subscriptions(&self) -> Result<Vec<Subscription>, ReadError> {
        self.simulate_latency().await;

        if !self.olm_available {
            return Err(ReadError::Transport(OLM_UNAVAILABLE_MESSAGE.to_string()));
        }
        if let Some(error) = &self.subscription_error {
            return Err(error.clone());
        }
        Ok(self.subscriptions.read().await.clone())
    }
}

/// Builder for creating MockReader with predefined state
///
/// # Example
///
/// ```rust,ignore
/// let reader = MockReaderBuilder::new()
///     .with_installed(resources::INFERENCE_SERVICE)
///     .with_error(resources::NOTEBOOK, ReadError::Forbidden("notebooks".into()))
///     .without_olm()
///     .build();
/// ```
pub struct MockReaderBuilder {
    objects: HashMap<ResourceType, Vec<Unstructured>>,
    installed: HashSet<ResourceType>,
    errors: HashMap<ResourceType, ReadError>,
    subscriptions: Vec<Subscription>,
    subscription_error: Option<ReadError>,
    olm_available: bool,
    latency_ms: u64,
}

impl MockReaderBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            objects: HashMap::new(),
            installed: HashSet::new(),
            errors: HashMap::new(),
            subscriptions: Vec::new(),
            subscription_error: None,
            olm_available: true,
            latency_ms: 0,
        }
    }

    /// Add an object (installs its resource type)
    pub fn with_object(mut self, resource: &ResourceType, object: Unstructured) -> Self {
        self.installed.insert(*resource);
        self.objects.entry(*resource).or_default().push(object);
        self
    }

    /// Mark a resource type as installed
    pub fn with_installed(mut self, resource: ResourceType) -> Self {
        self.installed.insert(resource);
        self
    }

    /// Return an error for every read of a resource type
    pub fn with_error(mut self, resource: ResourceType, error: ReadError) -> Self {
        self.errors.insert(resource, error);
        self
    }

    /// Add an OLM subscription
    pub fn with_subscription(mut self, subscription: Subscription) -> Self {
        self.subscriptions.push(subscription);
        self
    }

    /// Fail subscription listing with an error
    pub fn with_subscription_error(mut self, error: ReadError) -> Self {
        self.subscription_error = Some(error);
        self
    }

    /// Configure OLM as unreachable
    pub fn without_olm(mut self) -> Self {
        self.olm_available = false;
        self
    }

    /// Configure latency
    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    /// Build the MockReader
    pub fn build(self) -> MockReader {
        MockReader {
            objects: Arc::new(RwLock::new(self.objects)),
            installed: Arc::new(RwLock::new(self.installed)),
            errors: Arc::new(RwLock::new(self.errors)),
            subscriptions: Arc::new(RwLock::new(self.subscriptions)),
            subscription_error: self.subscription_error,
            olm_available: self.olm_available,
            latency_ms: self.latency_ms,
            reads: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl Default for MockReaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}
