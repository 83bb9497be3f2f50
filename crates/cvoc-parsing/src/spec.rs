//! # Token Specifications
//!
//! A parser configuration is an ordered list of [`TokenSpec`]s, one per
//! identifier token. The three variants form a closed sum with a single
//! match point in the parser, so specification handling stays exhaustive
//! at compile time:
//!
//! - `Constant` — the token must equal a fixed value; strictness never
//!   relaxes this.
//! - `Regex` — the token must match a pattern, compiled once when the
//!   configuration is built.
//! - `Collection` — the token is resolved against a vocabulary collection
//!   via the term matcher.

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use cvoc_core::Namespace;

use crate::config::ConfigError;

/// How one identifier token must be checked.
#[derive(Debug, Clone)]
pub enum TokenSpec {
    /// The token must equal `value` exactly, at every strictness level.
    Constant {
        /// The expected token.
        value: String,
        /// Whether the identifier element must exist.
        is_required: bool,
    },
    /// The token must match `pattern`.
    Regex {
        /// The compiled pattern.
        pattern: Regex,
        /// Whether the identifier element must exist.
        is_required: bool,
    },
    /// The token must resolve to a term of the collection at `namespace`.
    Collection {
        /// The collection's fully-qualified namespace.
        namespace: Namespace,
        /// Whether the identifier element must exist.
        is_required: bool,
    },
}

impl TokenSpec {
    /// Whether the identifier element must exist.
    pub fn is_required(&self) -> bool {
        match self {
            TokenSpec::Constant { is_required, .. }
            | TokenSpec::Regex { is_required, .. }
            | TokenSpec::Collection { is_required, .. } => *is_required,
        }
    }
}

impl fmt::Display for TokenSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenSpec::Constant { value, is_required } => {
                write!(f, "spec|const::{value}::{is_required}")
            }
            TokenSpec::Regex { pattern, is_required } => {
                write!(f, "spec|regex::{pattern}::{is_required}")
            }
            TokenSpec::Collection { namespace, is_required } => {
                write!(f, "spec|collection::{namespace}::{is_required}")
            }
        }
    }
}

fn default_required() -> bool {
    true
}

/// The wire form of a token specification, as stored in parser
/// configuration files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub(crate) enum RawTokenSpec {
    /// `{"type": "const", "value": "CMIP6"}`
    Const {
        value: String,
        #[serde(default = "default_required")]
        is_required: bool,
    },
    /// `{"type": "regex", "pattern": "^r[0-9]+i[0-9]+p[0-9]+f[0-9]+$"}`
    Regex {
        pattern: String,
        #[serde(default = "default_required")]
        is_required: bool,
    },
    /// `{"type": "collection", "namespace": "wcrp:cmip6:institution_id"}`
    Collection {
        namespace: String,
        #[serde(default = "default_required")]
        is_required: bool,
    },
}

impl TryFrom<RawTokenSpec> for TokenSpec {
    type Error = ConfigError;

    fn try_from(raw: RawTokenSpec) -> Result<Self, Self::Error> {
        Ok(match raw {
            RawTokenSpec::Const { value, is_required } => TokenSpec::Constant { value, is_required },
            RawTokenSpec::Regex { pattern, is_required } => TokenSpec::Regex {
                pattern: Regex::new(&pattern).map_err(|source| ConfigError::InvalidPattern {
                    pattern,
                    source,
                })?,
                is_required,
            },
            RawTokenSpec::Collection { namespace, is_required } => TokenSpec::Collection {
                namespace: Namespace::new(&namespace)?,
                is_required,
            },
        })
    }
}
