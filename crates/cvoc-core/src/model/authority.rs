//! # Authority — Root Namespace Owner
//!
//! The root of the containment hierarchy. An authority (e.g. `wcrp`) owns
//! its scopes, which own collections, which own terms. The authority is
//! also the unit of archive persistence: one manifest plus one file per
//! term.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::canonicalize;
use super::collection::Collection;
use super::namespace::{Namespace, NamespaceError};
use super::scope::Scope;
use super::term::Term;

/// Root governing organisation owning a vocabulary namespace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Authority {
    /// Canonical name; doubles as the root namespace segment.
    pub canonical_name: String,
    /// Display label.
    pub label: String,
    /// Informative description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Further-information URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Additional names the authority is known by.
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
    /// Owned scopes, in insertion order.
    #[serde(default)]
    pub scopes: Vec<Scope>,
}

impl Authority {
    /// Create an empty authority.
    ///
    /// # Errors
    ///
    /// Fails when the canonical form of `name` is not a valid namespace
    /// segment.
    pub fn new(name: &str) -> Result<Self, NamespaceError> {
        let canonical = canonicalize(name);
        // Reject names that cannot root a namespace.
        Namespace::new(&canonical)?;
        Ok(Self {
            canonical_name: canonical,
            label: name.trim().to_string(),
            description: None,
            url: None,
            alternative_names: Vec::new(),
            data: None,
            uid: Uuid::new_v4(),
            create_date: Utc::now(),
            scopes: Vec::new(),
        })
    }

    /// The authority's root namespace.
    ///
    /// # Errors
    ///
    /// Fails only when `canonical_name` was mutated into something that is
    /// not a valid namespace segment; the validation engine reports the same
    /// defect as a field error.
    pub fn namespace(&self) -> Result<Namespace, NamespaceError> {
        Namespace::new(&self.canonical_name)
    }

    /// Look up an owned scope by canonical name.
    pub fn scope(&self, canonical_name: &str) -> Option<&Scope> {
        self.scopes.iter().find(|s| s.canonical_name == canonical_name)
    }

    /// Mutable variant of [`Authority::scope`].
    pub fn scope_mut(&mut self, canonical_name: &str) -> Option<&mut Scope> {
        self.scopes.iter_mut().find(|s| s.canonical_name == canonical_name)
    }

    /// Create a scope, attach it to this authority and return it for
    /// further initialisation.
    pub fn add_scope(&mut self, name: &str) -> Result<&mut Scope, NamespaceError> {
        let canonical = canonicalize(name);
        let namespace = Namespace::new(&self.canonical_name)?.join(&canonical)?;
        self.scopes.push(Scope {
            canonical_name: canonical,
            label: name.trim().to_string(),
            description: None,
            url: None,
            namespace,
            uid: Uuid::new_v4(),
            create_date: Utc::now(),
            collections: Vec::new(),
        });
        Ok(self.scopes.last_mut().expect("push succeeded"))
    }

    /// Resolve a collection-deep namespace against this authority.
    pub fn find_collection(&self, namespace: &Namespace) -> Option<&Collection> {
        if namespace.authority() != self.canonical_name {
            return None;
        }
        let scope = self.scope(namespace.scope()?)?;
        scope.collection(namespace.collection()?)
    }

    /// Resolve a term-deep namespace against this authority.
    ///
    /// This is the graph lookup that turns a resolved [`super::TermRef`]
    /// back into the term it names.
    pub fn find_term(&self, namespace: &Namespace) -> Option<&Term> {
        let collection = self.find_collection(namespace)?;
        collection.term(namespace.term()?)
    }

    /// Iterate over every term owned by this authority, in containment
    /// order.
    pub fn terms(&self) -> impl Iterator<Item = &Term> {
        self.scopes
            .iter()
            .flat_map(|s| s.collections.iter())
            .flat_map(|c| c.terms.iter())
    }
}
