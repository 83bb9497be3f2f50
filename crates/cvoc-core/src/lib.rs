//! # cvoc-core — Foundational Types for the Controlled-Vocabulary Stack
//!
//! This crate is the bedrock of the cvoc workspace. It defines the vocabulary
//! data model — authorities, scopes, collections and terms — together with the
//! validated [`Namespace`] addressing scheme and the declarative validation
//! engine. Every other crate in the workspace depends on `cvoc-core`; it
//! depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Validated newtype for addressing.** [`Namespace`] wraps a
//!    colon-separated path of one to four canonical segments
//!    (`authority:scope:collection:term`). Malformed paths are rejected at
//!    construction; no bare strings for entity addresses.
//!
//! 2. **Exclusively top-down ownership.** An [`Authority`] owns its
//!    [`Scope`]s, a scope owns its [`Collection`]s, a collection owns its
//!    [`Term`]s. Cross-links between terms ([`TermRef`]) carry namespaces,
//!    never owned objects — the graph lookup (`Authority::find_term`) turns a
//!    resolved reference back into the term it names.
//!
//! 3. **Declarative validation.** Each entity exposes a flat list of
//!    [`FieldCheck`]s evaluated uniformly by [`validate`]. There is no
//!    reflection and no per-entity validation code path.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `cvoc-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug` and `Clone` and implement
//!   `Serialize`/`Deserialize`.

pub mod model;
pub mod validation;

// Re-export primary types for ergonomic imports.
pub use model::{
    canonicalize, Authority, Collection, Namespace, NamespaceError, Scope, Term, TermRef,
    TermStatus, NAMESPACE_DEPTH_MAX, NAMESPACE_SEPARATOR,
};
pub use validation::{get_errors, is_valid, validate, validate_tree, EntityKind, FieldCheck, Validate};
