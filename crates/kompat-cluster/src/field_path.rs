//! Dotted field-path queries over unstructured objects
//!
//! Paths look like `.spec.components.kserve.managementState`. Numeric
//! segments index into arrays (`.spec.containers.0.image`).

use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Errors for malformed field paths
///
/// A malformed path is a bug in the check that wrote it, never a property
/// of the cluster being inspected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldPathError {
    #[error("field path '{0}' must start with '.'")]
    MissingLeadingDot(String),

    #[error("field path '{path}' has an empty segment at position {position}")]
    EmptySegment { path: String, position: usize },

    #[error("field path '{path}' contains invalid character '{ch}'")]
    InvalidCharacter { path: String, ch: char },
}

/// A parsed field path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    raw: String,
    segments: Vec<String>,
}

impl FieldPath {
    /// Parse a dotted path
    pub fn parse(raw: &str) -> Result<Self, FieldPathError> {
        let rest = raw
            .strip_prefix('.')
            .ok_or_else(|| FieldPathError::MissingLeadingDot(raw.to_string()))?;

        // "." alone addresses the whole object
        if rest.is_empty() {
            return Ok(Self {
                raw: raw.to_string(),
                segments: Vec::new(),
            });
        }

        let mut segments = Vec::new();
        for (position, segment) in rest.split('.').enumerate() {
            if segment.is_empty() {
                return Err(FieldPathError::EmptySegment {
                    path: raw.to_string(),
                    position,
                });
            }
            if let Some(ch) = segment
                .chars()
                .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
            {
                return Err(FieldPathError::InvalidCharacter {
                    path: raw.to_string(),
                    ch,
                });
            }
            segments.push(segment.to_string());
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// Build a path from already-validated segments
    pub fn from_segments<I, S>(segments: I) -> Result<Self, FieldPathError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut raw = String::new();
        for segment in segments {
            raw.push('.');
            raw.push_str(segment.as_ref());
        }
        if raw.is_empty() {
            raw.push('.');
        }
        Self::parse(&raw)
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Resolve the path. `None` when any segment is missing or null.
    pub fn lookup<'a>(&self, value: &'a Value) -> Option<&'a Value> {
        let mut current = value;
        for segment in &self.segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        if current.is_null() {
            None
        } else {
            Some(current)
        }
    }
}

impl FromStr for FieldPath {
    type Err = FieldPathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}
