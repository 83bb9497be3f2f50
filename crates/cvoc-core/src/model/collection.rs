//! # Collection — One Controlled-Vocabulary Axis
//!
//! An ordered set of terms, unique by canonical name, addressing a single
//! facet of a naming convention (e.g. `institution_id`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::namespace::{Namespace, NamespaceError};
use super::term::Term;
use super::{canonicalize, term::TermStatus};

/// Ordered set of terms addressing one controlled-vocabulary axis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    /// Canonical name, unique among the owning scope's collections.
    pub canonical_name: String,
    /// Display label.
    pub label: String,
    /// Informative description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Further-information URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Fully-qualified path (`authority:scope:collection`).
    pub namespace: Namespace,
    /// Regular expression constraining member term names, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term_regex: Option<String>,
    /// Stable unique identifier.
    #[serde(default = "Uuid::new_v4")]
    pub uid: Uuid,
    /// Creation date.
    #[serde(default = "Utc::now")]
    pub create_date: DateTime<Utc>,
    /// Member terms, in insertion order. Not serialized into manifests —
    /// each term is persisted as its own archive file.
    #[serde(default, skip_serializing, skip_deserializing)]
    pub terms: Vec<Term>,
}

impl Collection {
    /// Look up a member term by canonical name.
    pub fn term(&self, canonical_name: &str) -> Option<&Term> {
        self.terms.iter().find(|t| t.canonical_name == canonical_name)
    }

    /// Create a term, attach it to this collection and return it for
    /// further initialisation.
    pub fn add_term(&mut self, name: &str) -> Result<&mut Term, NamespaceError> {
        let canonical = canonicalize(name);
        let namespace = self.namespace.join(&canonical)?;
        self.terms.push(Term {
            canonical_name: canonical,
            label: name.trim().to_string(),
            description: None,
            url: None,
            namespace,
            status: TermStatus::default(),
            parent: None,
            associations: Vec::new(),
            alternative_names: Vec::new(),
            data: None,
            uid: Uuid::new_v4(),
            create_date: Utc::now(),
        });
        // Just pushed, so last() is the new term.
        Ok(self.terms.last_mut().expect("push succeeded"))
    }
}
