//! Read-only access to live cluster state
//!
//! This crate defines the contract the check engine consumes to read
//! Kubernetes resources and OLM subscriptions, plus the glue that normalizes
//! absence (missing singletons, uninstalled CRDs) into empty results.
//!
//! ## Example
//!
//! ```rust,ignore
//! use kompat_cluster::{resources, get_singleton, MockReader};
//!
//! let reader = MockReader::new();
//! let dsc = get_singleton(&reader, &resources::DATA_SCIENCE_CLUSTER).await?;
//! ```

pub mod field_path;
pub mod resource;
pub mod resources;
pub mod reader;
pub mod olm;
pub mod mock;

pub use field_path::{FieldPath, FieldPathError};
pub use resource::{KubeObject, ObjectMeta, PartialObjectMetadata, ResourceType, Unstructured};
pub use reader::{
    get_singleton, list_or_empty, matches_label_selector, GetOptions, Listable, ListOptions,
    ReadError, ResourceReader,
};
pub use olm::{OlmReader, Subscription, UnavailableOlm, OLM_UNAVAILABLE_MESSAGE};
pub use mock::{MockReader, MockReaderBuilder};
