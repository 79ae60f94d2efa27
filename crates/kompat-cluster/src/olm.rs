//! Operator Lifecycle Manager access

use crate::reader::ReadError;
use serde::{Deserialize, Serialize};

/// Message used whenever OLM cannot be queried
pub const OLM_UNAVAILABLE_MESSAGE: &str = "OLM client not available";

/// An OLM Subscription, reduced to the fields checks match on
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    /// Subscription name
    pub name: String,

    /// Namespace the subscription lives in
    pub namespace: String,

    /// Package name in the catalog
    #[serde(default)]
    pub package: String,

    /// Update channel ("" when not set)
    #[serde(default)]
    pub channel: String,

    /// Installed ClusterServiceVersion, e.g. `servicemeshoperator.v2.6.1`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installed_csv: Option<String>,
}

impl Subscription {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            ..Self::default()
        }
    }

    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = channel.into();
        self
    }

    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = package.into();
        self
    }

    pub fn with_installed_csv(mut self, csv: impl Into<String>) -> Self {
        self.installed_csv = Some(csv.into());
        self
    }

    /// Installed version parsed from the CSV name ("" when unknown)
    ///
    /// The version starts after the first dot that is followed by a digit,
    /// optionally behind a `v`: `servicemeshoperator.v2.6.1` and
    /// `rhods-operator.2.17.0` both yield the trailing version, and dots
    /// inside the package name (`openshift.vertical-operator.v1.4.0`) are
    /// skipped. A CSV without a version suffix is returned whole.
    pub fn installed_version(&self) -> String {
        let Some(csv) = self.installed_csv.as_deref() else {
            return String::new();
        };

        csv.match_indices('.')
            .map(|(idx, _)| &csv[idx + 1..])
            .map(|rest| rest.strip_prefix('v').unwrap_or(rest))
            .find(|rest| rest.starts_with(|c: char| c.is_ascii_digit()))
            .unwrap_or(csv)
            .to_string()
    }
}

/// Subscription enumeration
#[async_trait::async_trait]
pub trait OlmReader: Send + Sync {
    /// Whether OLM can be queried at all
    fn available(&self) -> bool;

    /// All subscriptions across namespaces
    async fn list_subscriptions(&self) -> Result<Vec<Subscription>, ReadError>;
}

/// OLM access for clusters (or readers) without OLM
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableOlm;

#[async_trait::async_trait]
impl OlmReader for UnavailableOlm {
    fn available(&self) -> bool {
        false
    }

    async fn list_subscriptions(&self) -> Result<Vec<Subscription>, ReadError> {
        Err(ReadError::Transport(OLM_UNAVAILABLE_MESSAGE.to_string()))
    }
}
