//! Version gate
//!
//! Pure predicates answering "does this check apply to this upgrade".
//! Missing version information always means "skip", never an error.

use semver::Version;

/// True when upgrading from any 2.x release to any 3.x release.
pub fn upgrade_from_2x_to_3x(from: Option<&Version>, to: Option<&Version>) -> bool {
    upgrade_between(from, to, 2, 3)
}

/// True when `from` is on major `from_major` and `to` is on major `to_major`.
pub fn upgrade_between(
    from: Option<&Version>,
    to: Option<&Version>,
    from_major: u64,
    to_major: u64,
) -> bool {
    match (from, to) {
        (Some(from), Some(to)) => from.major == from_major && to.major == to_major,
        _ => false,
    }
}

/// True when `version` is present and orders at or above `major.minor.0`.
pub fn at_least(version: Option<&Version>, major: u64, minor: u64) -> bool {
    version.is_some_and(|v| *v >= Version::new(major, minor, 0))
}

/// Lenient version parsing for values read off the cluster.
///
/// Accepts a leading `v` and surrounding whitespace. Returns `None` for
/// anything that is not a valid semantic version.
pub fn parse_version(raw: &str) -> Option<Version> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);
    Version::parse(trimmed).ok()
}
