//! # cvoc-archive — Flat-File Vocabulary Archive I/O
//!
//! Reads and writes the on-disk representation of a vocabulary graph:
//!
//! ```text
//! root/{authority}/MANIFEST                          — authority + scope/collection shells
//! root/{authority}/{scope}/{collection}/{term}.json  — one file per term
//! root/_parsers/{kind}__{authority}__{scope}.json    — identifier parser configs
//! ```
//!
//! The [`Archive`] loader decodes an authority's manifest into a shell
//! graph, decodes every term file into its collection, and then runs a
//! reference-resolution pass: parent and association namespaces that exist
//! in the same load session are rewritten to resolved references, anything
//! else is left as written. Loads are fail-fast — a malformed manifest or
//! term file aborts the whole authority with no partial graph returned.
//!
//! Writing is gated on validation: an authority carrying any validation
//! error is refused before a single byte reaches disk.

pub mod codec;
pub mod io;

pub use codec::{decode, encode, CodecError, Encoding, Node, Representation};
pub use io::{Archive, ArchiveError, MANIFEST, PARSER_CONFIG_DIR};
