//! # Namespace — Validated Entity Addressing
//!
//! A [`Namespace`] is the fully-qualified, colon-separated path identifying
//! an entity inside an archive: `authority[:scope[:collection[:term]]]`.
//! It is globally unique archive-wide and derivable from the containment
//! path, so back-references between entities are stored as namespaces
//! rather than as pointers.
//!
//! Malformed paths — empty, deeper than four segments, or containing a
//! non-canonical segment — are **rejected at construction**. There is no
//! unchecked constructor.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Separator between namespace segments.
pub const NAMESPACE_SEPARATOR: char = ':';

/// Maximum namespace depth (`authority:scope:collection:term`).
pub const NAMESPACE_DEPTH_MAX: usize = 4;

/// Canonical segment shape: lower-case alphanumeric with interior
/// hyphens/underscores/dots (`cmip6`, `institution_id`, `r1i1p1f1`).
static CANONICAL_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9][a-z0-9._\-]*$").expect("static segment pattern"));

/// Error raised when constructing a [`Namespace`] from malformed input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NamespaceError {
    /// The path had no segments at all.
    #[error("empty namespace")]
    Empty,

    /// The path had more segments than the containment hierarchy allows.
    #[error("namespace too deep: {path:?} has {depth} segments (max {NAMESPACE_DEPTH_MAX})")]
    TooDeep {
        /// The offending path.
        path: String,
        /// Its segment count.
        depth: usize,
    },

    /// A segment was empty or not in canonical form.
    #[error("invalid namespace segment {segment:?} in {path:?}")]
    InvalidSegment {
        /// The offending segment.
        segment: String,
        /// The full path it appeared in.
        path: String,
    },
}

/// A validated colon-separated entity path of depth 1 to 4.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Namespace(String);

impl Namespace {
    /// Whether `segment` is a single canonical namespace segment.
    pub fn is_canonical_segment(segment: &str) -> bool {
        CANONICAL_SEGMENT.is_match(segment)
    }

    /// Parse and validate a namespace path.
    ///
    /// # Errors
    ///
    /// Returns a [`NamespaceError`] if the path is empty, deeper than
    /// [`NAMESPACE_DEPTH_MAX`], or contains a non-canonical segment.
    pub fn new(path: &str) -> Result<Self, NamespaceError> {
        if path.is_empty() {
            return Err(NamespaceError::Empty);
        }
        let segments: Vec<&str> = path.split(NAMESPACE_SEPARATOR).collect();
        if segments.len() > NAMESPACE_DEPTH_MAX {
            return Err(NamespaceError::TooDeep {
                path: path.to_string(),
                depth: segments.len(),
            });
        }
        for segment in &segments {
            if !CANONICAL_SEGMENT.is_match(segment) {
                return Err(NamespaceError::InvalidSegment {
                    segment: (*segment).to_string(),
                    path: path.to_string(),
                });
            }
        }
        Ok(Self(path.to_string()))
    }

    /// Build a namespace from individual segments.
    pub fn from_segments<'a>(segments: impl IntoIterator<Item = &'a str>) -> Result<Self, NamespaceError> {
        let path: Vec<&str> = segments.into_iter().collect();
        if path.is_empty() {
            return Err(NamespaceError::Empty);
        }
        Self::new(&path.join(&NAMESPACE_SEPARATOR.to_string()))
    }

    /// Extend this namespace with one more segment.
    pub fn join(&self, segment: &str) -> Result<Self, NamespaceError> {
        Self::new(&format!("{}{}{}", self.0, NAMESPACE_SEPARATOR, segment))
    }

    /// The path as written.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of segments (1 = authority, 4 = term).
    pub fn depth(&self) -> usize {
        self.0.split(NAMESPACE_SEPARATOR).count()
    }

    /// All segments in order.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(NAMESPACE_SEPARATOR)
    }

    fn segment(&self, idx: usize) -> Option<&str> {
        self.segments().nth(idx)
    }

    /// The authority segment (always present).
    pub fn authority(&self) -> &str {
        // A namespace has at least one segment by construction.
        self.segment(0).unwrap_or_default()
    }

    /// The scope segment, if the path is at least scope-deep.
    pub fn scope(&self) -> Option<&str> {
        self.segment(1)
    }

    /// The collection segment, if the path is at least collection-deep.
    pub fn collection(&self) -> Option<&str> {
        self.segment(2)
    }

    /// The term segment, if the path is term-deep.
    pub fn term(&self) -> Option<&str> {
        self.segment(3)
    }

    /// The final segment.
    pub fn leaf(&self) -> &str {
        self.segments().last().unwrap_or_default()
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Namespace {
    type Err = NamespaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Namespace {
    type Error = NamespaceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Namespace> for String {
    fn from(ns: Namespace) -> Self {
        ns.0
    }
}

impl AsRef<str> for Namespace {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_all_depths() {
        for path in ["wcrp", "wcrp:cmip6", "wcrp:cmip6:institution_id", "wcrp:cmip6:institution_id:ipsl"] {
            let ns = Namespace::new(path).unwrap();
            assert_eq!(ns.as_str(), path);
        }
    }

    #[test]
    fn depth_accessors() {
        let ns = Namespace::new("wcrp:cmip6:institution_id:ipsl").unwrap();
        assert_eq!(ns.depth(), 4);
        assert_eq!(ns.authority(), "wcrp");
        assert_eq!(ns.scope(), Some("cmip6"));
        assert_eq!(ns.collection(), Some("institution_id"));
        assert_eq!(ns.term(), Some("ipsl"));
        assert_eq!(ns.leaf(), "ipsl");
    }

    #[test]
    fn shallow_accessors_are_none() {
        let ns = Namespace::new("wcrp:cmip6").unwrap();
        assert_eq!(ns.collection(), None);
        assert_eq!(ns.term(), None);
        assert_eq!(ns.leaf(), "cmip6");
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(Namespace::new(""), Err(NamespaceError::Empty));
    }

    #[test]
    fn rejects_too_deep() {
        let err = Namespace::new("a:b:c:d:e").unwrap_err();
        assert!(matches!(err, NamespaceError::TooDeep { depth: 5, .. }));
    }

    #[test]
    fn rejects_empty_segment() {
        let err = Namespace::new("wcrp::institution_id").unwrap_err();
        assert!(matches!(err, NamespaceError::InvalidSegment { .. }));
    }

    #[test]
    fn rejects_non_canonical_segment() {
        for path in ["WCRP", "wcrp:CMIP6", "wcrp:has space", "-leading"] {
            assert!(Namespace::new(path).is_err(), "accepted {path:?}");
        }
    }

    #[test]
    fn accepts_underscores_dots_and_hyphens() {
        assert!(Namespace::new("wcrp:cmip6:institution_id:ipsl-cm6a.lr").is_ok());
    }

    #[test]
    fn join_extends() {
        let ns = Namespace::new("wcrp:cmip6").unwrap();
        let joined = ns.join("institution_id").unwrap();
        assert_eq!(joined.as_str(), "wcrp:cmip6:institution_id");
    }

    #[test]
    fn join_rejects_past_max_depth() {
        let ns = Namespace::new("wcrp:cmip6:institution_id:ipsl").unwrap();
        assert!(ns.join("deeper").is_err());
    }

    #[test]
    fn from_segments_round_trips() {
        let ns = Namespace::from_segments(["wcrp", "cmip6"]).unwrap();
        assert_eq!(ns.as_str(), "wcrp:cmip6");
    }

    #[test]
    fn serde_as_plain_string() {
        let ns = Namespace::new("wcrp:cmip6").unwrap();
        let json = serde_json::to_string(&ns).unwrap();
        assert_eq!(json, "\"wcrp:cmip6\"");
        let back: Namespace = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ns);
    }

    #[test]
    fn serde_rejects_malformed() {
        let result: Result<Namespace, _> = serde_json::from_str("\"Not Canonical\"");
        assert!(result.is_err());
    }

    #[test]
    fn ordering_is_lexicographic() {
        let a = Namespace::new("wcrp:cmip5").unwrap();
        let b = Namespace::new("wcrp:cmip6").unwrap();
        assert!(a < b);
    }
}
