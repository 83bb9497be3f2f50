//! # Parser Configuration
//!
//! The parsing configuration for one `(scope, identifier kind)` pair: a
//! token separator, an optional suffix marker, and the ordered token
//! specifications. Configurations are stored in the archive's `_parsers`
//! directory (`<kind>__<authority>__<scope>.json`) and loaded lazily,
//! memoized per parsing session.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use cvoc_core::NamespaceError;

use crate::spec::{RawTokenSpec, TokenSpec};

/// The kinds of structured identifier the parser understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdentifierKind {
    /// A dataset identifier (e.g. `CMIP6.ScenarioMIP.ipsl.historical`).
    DatasetId,
    /// A file name; the final separator token is additionally split on `.`
    /// so that extension segments become identifier elements of their own.
    Filename,
    /// A directory path.
    DirectoryPath,
}

impl IdentifierKind {
    /// Canonical kebab-case name, as used in parser-config file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            IdentifierKind::DatasetId => "dataset-id",
            IdentifierKind::Filename => "filename",
            IdentifierKind::DirectoryPath => "directory",
        }
    }
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error raised while building a parser configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration record was not valid JSON for the expected shape.
    #[error("malformed parser configuration: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A regex specification carried an uncompilable pattern.
    #[error("invalid pattern {pattern:?} in parser configuration")]
    InvalidPattern {
        /// The pattern as written.
        pattern: String,
        /// The compilation failure.
        #[source]
        source: regex::Error,
    },

    /// A collection specification carried a malformed namespace.
    #[error("invalid collection namespace in parser configuration: {0}")]
    Namespace(#[from] NamespaceError),
}

/// Parsing configuration for one `(scope, identifier kind)` pair.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Token separator.
    pub separator: String,
    /// Optional suffix marker; when the final token contains it, the token
    /// is truncated at its first occurrence before specification
    /// evaluation.
    pub suffix: Option<String>,
    /// Ordered token specifications.
    pub specs: Vec<TokenSpec>,
}

/// Wire form of [`ParserConfig`]. Meta attributes injected by the archive
/// writer (`parser_type`, `scope`) are accepted and ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawParserConfig {
    separator: String,
    #[serde(default)]
    suffix: Option<String>,
    specs: Vec<RawTokenSpec>,
    #[serde(default)]
    #[allow(dead_code)]
    parser_type: Option<String>,
    #[serde(default)]
    #[allow(dead_code)]
    scope: Option<String>,
}

impl ParserConfig {
    /// Build a configuration from its structured-mapping form, compiling
    /// every regex specification.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ConfigError> {
        let raw: RawParserConfig = serde_json::from_value(value)?;
        let specs = raw
            .specs
            .into_iter()
            .map(TokenSpec::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            separator: raw.separator,
            suffix: raw.suffix,
            specs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kind_names_match_config_files() {
        assert_eq!(IdentifierKind::DatasetId.as_str(), "dataset-id");
        assert_eq!(IdentifierKind::Filename.as_str(), "filename");
        assert_eq!(IdentifierKind::DirectoryPath.as_str(), "directory");
    }

    #[test]
    fn config_builds_from_value() {
        let config = ParserConfig::from_value(json!({
            "parser_type": "dataset-id",
            "scope": "wcrp:cmip6",
            "separator": ".",
            "specs": [
                {"type": "const", "value": "CMIP6"},
                {"type": "regex", "pattern": "^r[0-9]+i[0-9]+p[0-9]+f[0-9]+$"},
                {"type": "collection", "namespace": "wcrp:cmip6:institution_id"},
            ],
        }))
        .unwrap();
        assert_eq!(config.separator, ".");
        assert_eq!(config.suffix, None);
        assert_eq!(config.specs.len(), 3);
    }

    #[test]
    fn suffix_is_optional() {
        let config = ParserConfig::from_value(json!({
            "separator": "/",
            "suffix": ".",
            "specs": [],
        }))
        .unwrap();
        assert_eq!(config.suffix.as_deref(), Some("."));
    }

    #[test]
    fn missing_separator_is_malformed() {
        let err = ParserConfig::from_value(json!({"specs": []})).unwrap_err();
        assert!(matches!(err, ConfigError::Malformed(_)));
    }

    #[test]
    fn bad_pattern_fails_the_whole_config() {
        let err = ParserConfig::from_value(json!({
            "separator": ".",
            "specs": [{"type": "regex", "pattern": "[unclosed"}],
        }))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern { .. }));
    }
}
