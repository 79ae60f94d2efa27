//! Platform version detection and target construction

use crate::context::RunContext;
use crate::error::CheckError;
use crate::target::Target;
use kompat_cluster::{get_singleton, resources, FieldPath, ResourceReader};
use kompat_core::{parse_version, Config};
use semver::Version;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

/// Where the initialization singleton records the installed release
const RELEASE_VERSION_PATH: &str = ".status.release.version";

/// Installed platform version, read off the initialization singleton
///
/// A missing singleton, a missing field or an unparsable value all yield
/// `None`; only read failures are errors.
pub async fn detect_current_version(
    ctx: &RunContext,
    reader: &dyn ResourceReader,
) -> Result<Option<Version>, CheckError> {
    let initialization = ctx
        .guard(get_singleton(reader, &resources::DSC_INITIALIZATION))
        .await?
        .map_err(|e| CheckError::read(format!("fetching {}", resources::DSC_INITIALIZATION.kind), e))?;

    let Some(initialization) = initialization else {
        debug!("platform initialization singleton not found");
        return Ok(None);
    };

    let path = FieldPath::parse(RELEASE_VERSION_PATH)?;
    let raw = initialization.get(&path).and_then(Value::as_str);
    let version = raw.and_then(parse_version);

    if version.is_none() {
        debug!(raw = ?raw, "installed release version unavailable");
    }
    Ok(version)
}

/// Target for `reader`, with the installed version detected and the target
/// version taken from `config`
pub async fn build_target(
    ctx: &RunContext,
    reader: Arc<dyn ResourceReader>,
    config: &Config,
) -> Result<Target, CheckError> {
    let mut target = Target::new(reader);
    target.current_version = detect_current_version(ctx, target.reader()).await?;
    target.target_version = config.target_version.clone();

    info!(
        reader = target.reader().name(),
        current = %target.current_version.as_ref().map(ToString::to_string).unwrap_or_else(|| "unknown".into()),
        target = %target.target_version_label(),
        "built run target"
    );
    Ok(target)
}
