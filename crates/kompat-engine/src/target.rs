//! The cluster and versions one run is evaluated against

use kompat_cluster::ResourceReader;
use semver::Version;
use std::fmt;
use std::sync::Arc;

/// Immutable per-run input handed to every check
#[derive(Clone)]
pub struct Target {
    /// Read access to the cluster
    pub client: Arc<dyn ResourceReader>,

    /// Platform version currently installed
    pub current_version: Option<Version>,

    /// Version being upgraded to
    pub target_version: Option<Version>,

    /// Emit debug-level diagnostics
    pub debug: bool,
}

impl Target {
    pub fn new(client: Arc<dyn ResourceReader>) -> Self {
        Self {
            client,
            current_version: None,
            target_version: None,
            debug: false,
        }
    }

    pub fn with_current_version(mut self, version: Version) -> Self {
        self.current_version = Some(version);
        self
    }

    pub fn with_target_version(mut self, version: Version) -> Self {
        self.target_version = Some(version);
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn reader(&self) -> &dyn ResourceReader {
        self.client.as_ref()
    }

    /// Upgrading from 2.x to 3.x. False when either version is unknown.
    pub fn is_upgrade_2x_to_3x(&self) -> bool {
        kompat_core::upgrade_from_2x_to_3x(
            self.current_version.as_ref(),
            self.target_version.as_ref(),
        )
    }

    /// Target version string for annotations ("unknown" when not set)
    pub fn target_version_label(&self) -> String {
        self.target_version
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "unknown".to_string())
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Target")
            .field("client", &self.client.name())
            .field("current_version", &self.current_version)
            .field("target_version", &self.target_version)
            .field("debug", &self.debug)
            .finish()
    }
}
