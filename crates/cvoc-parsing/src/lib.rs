//! # cvoc-parsing — Specification-Driven Identifier Parsing
//!
//! Parses structured identifiers (dataset ids, file names, directory
//! paths) against a scope's controlled vocabularies. An identifier is
//! split into tokens; each token is checked against one
//! [`TokenSpec`] — a constant, a regular expression, or a vocabulary
//! collection lookup — in order. Collection lookups resolve tokens to
//! [`Term`](cvoc_core::Term)s via the strictness-governed
//! [`match_term`]; only those resolutions contribute to the parse result.
//!
//! Parsing is fail-fast: a token-count mismatch or a first failing
//! specification aborts the parse with an error carrying the 1-based
//! element index, the offending token and what was expected. No partial
//! result set is ever returned.
//!
//! All caching — parser configurations and resolved collections — is
//! explicit state owned by a [`ParsingSession`], constructed per archive
//! and discarded with it. There are no process-wide caches.

pub mod config;
pub mod matcher;
pub mod parser;
pub mod spec;

pub use config::{ConfigError, IdentifierKind, ParserConfig};
pub use matcher::{match_term, Strictness};
pub use parser::{ParseError, ParsingSession};
pub use spec::TokenSpec;
