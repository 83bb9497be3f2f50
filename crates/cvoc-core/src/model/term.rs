//! # Term — Leaf Vocabulary Entry
//!
//! A [`Term`] is the leaf of the containment hierarchy. Besides its own
//! attributes it may reference a parent term (same- or cross-collection
//! hierarchy link) and any number of associated terms. Both kinds of
//! reference are [`TermRef`]s: freshly decoded they hold the raw namespace
//! string as written in the archive; the loader's resolution pass rewrites
//! every reference whose target exists in the same load session to the
//! validated, resolved form. References that do not resolve locally are
//! left raw — they may legitimately point into another archive.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::namespace::Namespace;

/// Governance status of a term within its collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TermStatus {
    /// Proposed, awaiting community review.
    #[default]
    Pending,
    /// Approved by the governing authority.
    Accepted,
    /// Approved in the past, retained for old data only.
    Deprecated,
    /// Reviewed and refused.
    Rejected,
}

impl TermStatus {
    /// Canonical lower-case name, as written in term files.
    pub fn as_str(&self) -> &'static str {
        match self {
            TermStatus::Pending => "pending",
            TermStatus::Accepted => "accepted",
            TermStatus::Deprecated => "deprecated",
            TermStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for TermStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A reference from one term to another.
///
/// Serialized as the bare namespace string in both states; deserialization
/// always yields [`TermRef::Unresolved`] because resolution is a property
/// of a load session, not of the wire form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TermRef {
    /// Validated against the load session: the target namespace is known to
    /// exist, and the owning graph's lookup returns the term it names.
    Resolved(Namespace),
    /// As written in the archive; the target was not present in the load
    /// session (possibly a cross-archive reference).
    Unresolved(String),
}

impl TermRef {
    /// The referenced path as written.
    pub fn as_str(&self) -> &str {
        match self {
            TermRef::Resolved(ns) => ns.as_str(),
            TermRef::Unresolved(raw) => raw,
        }
    }

    /// Whether the reference resolved within its load session.
    pub fn is_resolved(&self) -> bool {
        matches!(self, TermRef::Resolved(_))
    }

    /// The resolved namespace, if any.
    pub fn resolved(&self) -> Option<&Namespace> {
        match self {
            TermRef::Resolved(ns) => Some(ns),
            TermRef::Unresolved(_) => None,
        }
    }
}

impl fmt::Display for TermRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for TermRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TermRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(TermRef::Unresolved(String::deserialize(deserializer)?))
    }
}

/// Leaf vocabulary entry.
///
/// Term identity is the namespace: equality, ordering and hashing all
/// compare namespaces only, matching the archive-wide uniqueness invariant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Term {
    /// Canonical name, unique among siblings.
    pub canonical_name: String,
    /// Display label (the raw name as submitted).
    pub label: String,
    /// Informative description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Further-information URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Fully-qualified path, unique archive-wide.
    pub namespace: Namespace,
    /// Governance status.
    #[serde(default)]
    pub status: TermStatus,
    /// Hierarchy link to a parent term.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<TermRef>,
    /// Cross-links to associated terms.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub associations: Vec<TermRef>,
    /// Additional names the term is known by, consumed at looser matching
    /// strictness.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternative_names: Vec<String>,
    /// Arbitrary payload data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    /// Stable unique identifier.
    #[serde(default = "Uuid::new_v4")]
    pub uid: Uuid,
    /// Creation date.
    #[serde(default = "Utc::now")]
    pub create_date: DateTime<Utc>,
}

impl PartialEq for Term {
    fn eq(&self, other: &Self) -> bool {
        self.namespace == other.namespace
    }
}

impl Eq for Term {}

impl Hash for Term {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.namespace.hash(state);
    }
}

impl PartialOrd for Term {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Term {
    fn cmp(&self, other: &Self) -> Ordering {
        self.namespace.cmp(&other.namespace)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.namespace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn term(ns: &str) -> Term {
        let namespace = Namespace::new(ns).unwrap();
        Term {
            canonical_name: namespace.leaf().to_string(),
            label: namespace.leaf().to_uppercase(),
            description: None,
            url: None,
            namespace,
            status: TermStatus::Accepted,
            parent: None,
            associations: Vec::new(),
            alternative_names: Vec::new(),
            data: None,
            uid: Uuid::new_v4(),
            create_date: Utc::now(),
        }
    }

    #[test]
    fn identity_is_the_namespace() {
        let a = term("wcrp:cmip6:institution_id:ipsl");
        let mut b = term("wcrp:cmip6:institution_id:ipsl");
        b.label = "something else".to_string();
        assert_eq!(a, b);

        let c = term("wcrp:cmip6:institution_id:mohc");
        assert_ne!(a, c);
        assert!(a < c);
    }

    #[test]
    fn term_ref_serializes_as_bare_string() {
        let resolved = TermRef::Resolved(Namespace::new("wcrp:cmip6:institution_id:ipsl").unwrap());
        let raw = TermRef::Unresolved("other:archive:collection:term".to_string());
        assert_eq!(serde_json::to_string(&resolved).unwrap(), "\"wcrp:cmip6:institution_id:ipsl\"");
        assert_eq!(serde_json::to_string(&raw).unwrap(), "\"other:archive:collection:term\"");
    }

    #[test]
    fn term_ref_deserializes_unresolved() {
        let r: TermRef = serde_json::from_str("\"wcrp:cmip6:institution_id:ipsl\"").unwrap();
        assert!(!r.is_resolved());
        assert_eq!(r.as_str(), "wcrp:cmip6:institution_id:ipsl");
    }

    #[test]
    fn status_round_trips() {
        let json = serde_json::to_string(&TermStatus::Accepted).unwrap();
        assert_eq!(json, "\"accepted\"");
        let back: TermStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, TermStatus::Accepted);
    }

    #[test]
    fn decoded_term_defaults() {
        let json = r#"{
            "canonical_name": "ipsl",
            "label": "IPSL",
            "namespace": "wcrp:cmip6:institution_id:ipsl"
        }"#;
        let t: Term = serde_json::from_str(json).unwrap();
        assert_eq!(t.status, TermStatus::Pending);
        assert!(t.parent.is_none());
        assert!(t.associations.is_empty());
    }
}
