//! # Vocabulary Data Model
//!
//! The four entity kinds of a controlled-vocabulary archive and their
//! containment relationships:
//!
//! - [`Authority`] — root namespace owner (e.g. `wcrp`).
//! - [`Scope`] — named grouping within an authority (e.g. `cmip6`).
//! - [`Collection`] — ordered set of terms addressing one vocabulary axis
//!   (e.g. `institution_id`).
//! - [`Term`] — leaf vocabulary entry (e.g. `ipsl`).
//!
//! Ownership is exclusively top-down. All back- and cross-references are
//! namespace-valued lookups, never owned objects.

mod authority;
mod collection;
mod namespace;
mod scope;
mod term;

pub use authority::Authority;
pub use collection::Collection;
pub use namespace::{Namespace, NamespaceError, NAMESPACE_DEPTH_MAX, NAMESPACE_SEPARATOR};
pub use scope::Scope;
pub use term::{Term, TermRef, TermStatus};

/// Derive the canonical form of a raw entity name.
///
/// Canonical names are lower-case and whitespace-free; interior whitespace
/// collapses to a single hyphen. Underscores and hyphens pass through
/// unchanged (`institution_id` stays `institution_id`).
pub fn canonicalize(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}
