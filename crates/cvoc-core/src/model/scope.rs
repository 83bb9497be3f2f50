//! # Scope — Named Grouping Within an Authority
//!
//! A scope groups the collections of one project or activity (e.g. `cmip6`
//! within `wcrp`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::canonicalize;
use super::collection::Collection;
use super::namespace::{Namespace, NamespaceError};

/// Named grouping of collections within an authority.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scope {
    /// Canonical name, unique among the owning authority's scopes.
    pub canonical_name: String,
    /// Display label.
    pub label: String,
    /// Informative description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Further-information URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Fully-qualified path (`authority:scope`). The owning authority is
    /// the path's first segment — back-references are derived, not stored.
    pub namespace: Namespace,
    /// Stable unique identifier.
    #[serde(default = "Uuid::new_v4")]
    pub uid: Uuid,
    /// Creation date.
    #[serde(default = "Utc::now")]
    pub create_date: DateTime<Utc>,
    /// Member collections, in insertion order.
    #[serde(default)]
    pub collections: Vec<Collection>,
}

impl Scope {
    /// Look up a member collection by canonical name.
    pub fn collection(&self, canonical_name: &str) -> Option<&Collection> {
        self.collections.iter().find(|c| c.canonical_name == canonical_name)
    }

    /// Mutable variant of [`Scope::collection`].
    pub fn collection_mut(&mut self, canonical_name: &str) -> Option<&mut Collection> {
        self.collections.iter_mut().find(|c| c.canonical_name == canonical_name)
    }

    /// Create a collection, attach it to this scope and return it for
    /// further initialisation.
    pub fn add_collection(&mut self, name: &str) -> Result<&mut Collection, NamespaceError> {
        let canonical = canonicalize(name);
        let namespace = self.namespace.join(&canonical)?;
        self.collections.push(Collection {
            canonical_name: canonical,
            label: name.trim().to_string(),
            description: None,
            url: None,
            namespace,
            term_regex: None,
            uid: Uuid::new_v4(),
            create_date: Utc::now(),
            terms: Vec::new(),
        });
        Ok(self.collections.last_mut().expect("push succeeded"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope() -> Scope {
        Scope {
            canonical_name: "cmip6".to_string(),
            label: "CMIP6".to_string(),
            description: None,
            url: None,
            namespace: Namespace::new("wcrp:cmip6").unwrap(),
            uid: Uuid::new_v4(),
            create_date: Utc::now(),
            collections: Vec::new(),
        }
    }

    #[test]
    fn add_collection_derives_namespace() {
        let mut s = scope();
        let coll = s.add_collection("Institution_ID").unwrap();
        assert_eq!(coll.canonical_name, "institution_id");
        assert_eq!(coll.namespace.as_str(), "wcrp:cmip6:institution_id");
    }

    #[test]
    fn collection_lookup() {
        let mut s = scope();
        s.add_collection("institution_id").unwrap();
        assert!(s.collection("institution_id").is_some());
        assert!(s.collection("source_id").is_none());
    }
}
