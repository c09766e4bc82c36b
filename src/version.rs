//! Build metadata packaged with the binary.
//!
//! The values are read once at startup and shared, read-only, by the logger
//! and the response header middleware.

use axum::http::HeaderValue;
use serde::Deserialize;

/// Raw contents of the packaged version resource.
const VERSION_JSON: &str = include_str!("version.json");

/// Error type for loading build metadata.
#[derive(Debug, thiserror::Error)]
pub enum VersionError {
    #[error("malformed version resource: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("version field `{0}` is empty")]
    Empty(&'static str),

    #[error("version field `{0}` is not a valid header value")]
    InvalidHeader(&'static str),
}

/// Immutable build identifier and branch name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Version {
    pub build: String,
    pub branch: String,
}

impl Version {
    /// Build a version from explicit values. Used by tests and tooling.
    pub fn new(build: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            build: build.into(),
            branch: branch.into(),
        }
    }

    /// Load the version resource embedded at compile time.
    pub fn load() -> Result<Self, VersionError> {
        Self::parse(VERSION_JSON)
    }

    /// Parse and validate a version document.
    pub fn parse(json: &str) -> Result<Self, VersionError> {
        let version: Version = serde_json::from_str(json)?;
        version.validate()?;
        Ok(version)
    }

    fn validate(&self) -> Result<(), VersionError> {
        for (field, value) in [("build", &self.build), ("branch", &self.branch)] {
            if value.is_empty() {
                return Err(VersionError::Empty(field));
            }
            if HeaderValue::from_str(value).is_err() {
                return Err(VersionError::InvalidHeader(field));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_packaged_resource() {
        let version = Version::load().expect("packaged version.json must parse");
        assert!(!version.build.is_empty());
        assert!(!version.branch.is_empty());
    }

    #[test]
    fn test_parse_valid() {
        let version = Version::parse(r#"{"build":"abc123","branch":"feature/x"}"#).unwrap();
        assert_eq!(version, Version::new("abc123", "feature/x"));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        let err = Version::parse("{not json").unwrap_err();
        assert!(matches!(err, VersionError::Malformed(_)));
    }

    #[test]
    fn test_parse_rejects_missing_field() {
        let err = Version::parse(r#"{"build":"abc"}"#).unwrap_err();
        assert!(matches!(err, VersionError::Malformed(_)));
    }

    #[test]
    fn test_parse_rejects_empty_field() {
        let err = Version::parse(r#"{"build":"","branch":"main"}"#).unwrap_err();
        assert!(matches!(err, VersionError::Empty("build")));
    }

    #[test]
    fn test_parse_rejects_header_unsafe_value() {
        let err = Version::parse(r#"{"build":"abc","branch":"line\nbreak"}"#).unwrap_err();
        assert!(matches!(err, VersionError::InvalidHeader("branch")));
    }
}
