//! Built-in checks
//!
//! Registration order here is the order checks appear in a report.

pub mod components;
pub mod workloads;
pub mod dependencies;

use crate::error::CheckError;
use crate::registry::CheckRegistry;

/// Registry holding every built-in check
pub fn default_registry() -> Result<CheckRegistry, CheckError> {
    let mut registry = CheckRegistry::new();

    registry.register(components::kserve_serverless_removal()?)?;
    registry.register(components::codeflare_removal()?)?;
    registry.register(workloads::modelmesh_inference_services())?;
    registry.register(workloads::notebook_inventory())?;
    registry.register(dependencies::servicemesh_v2())?;
    registry.register(dependencies::authorino_presence())?;

    Ok(registry)
}
