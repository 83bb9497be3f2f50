//! # Node Codecs
//!
//! Transcoding between in-memory vocabulary entities and their archive
//! representations. Two encodings are supported:
//!
//! - [`Encoding::Json`] — the textual serialized form used by archive
//!   files.
//! - [`Encoding::Value`] — the structured-mapping form
//!   (`serde_json::Value`), used when a caller already holds parsed data.
//!
//! A representation whose shape does not match the requested encoding is
//! rejected with [`CodecError::RepresentationMismatch`] rather than being
//! coerced.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use cvoc_core::{Authority, Collection, Scope, Term};

/// Supported archive encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Textual JSON, as stored in archive files.
    Json,
    /// Structured mapping (`serde_json::Value`).
    Value,
}

impl Encoding {
    /// Lower-case encoding name for diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Encoding::Json => "json",
            Encoding::Value => "value",
        }
    }
}

/// A representation handed to [`decode`] or produced by [`encode`].
#[derive(Debug, Clone)]
pub enum Representation {
    /// Textual JSON.
    Json(String),
    /// Structured mapping.
    Value(serde_json::Value),
}

impl Representation {
    fn encoding(&self) -> Encoding {
        match self {
            Representation::Json(_) => Encoding::Json,
            Representation::Value(_) => Encoding::Value,
        }
    }
}

/// A decoded vocabulary entity, tagged by kind on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
    /// An authority manifest (scope/collection shells, no terms).
    Authority(Authority),
    /// A standalone scope record.
    Scope(Scope),
    /// A standalone collection record.
    Collection(Collection),
    /// A term file.
    Term(Term),
}

impl Node {
    /// Lower-case node kind for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Authority(_) => "authority",
            Node::Scope(_) => "scope",
            Node::Collection(_) => "collection",
            Node::Term(_) => "term",
        }
    }
}

/// Error raised by [`decode`] and [`encode`].
#[derive(Error, Debug)]
pub enum CodecError {
    /// The representation's shape does not match the requested encoding.
    #[error("representation does not match encoding: expected {expected}, got {actual}")]
    RepresentationMismatch {
        /// The encoding the caller asked for.
        expected: &'static str,
        /// The shape actually supplied.
        actual: &'static str,
    },

    /// The record was malformed for the target type.
    #[error("malformed record: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A well-formed record decoded to the wrong node kind.
    #[error("unexpected node kind: expected {expected}, got {actual}")]
    UnexpectedNode {
        /// The node kind the caller needed.
        expected: &'static str,
        /// The kind actually decoded.
        actual: &'static str,
    },
}

/// Decode a representation into a vocabulary node.
///
/// # Errors
///
/// Returns [`CodecError::RepresentationMismatch`] when the representation's
/// shape does not match `encoding`, and [`CodecError::Malformed`] when the
/// record does not decode as a tagged node.
pub fn decode(representation: &Representation, encoding: Encoding) -> Result<Node, CodecError> {
    if representation.encoding() != encoding {
        return Err(CodecError::RepresentationMismatch {
            expected: encoding.as_str(),
            actual: representation.encoding().as_str(),
        });
    }
    let node = match representation {
        Representation::Json(text) => serde_json::from_str(text)?,
        Representation::Value(value) => serde_json::from_value(value.clone())?,
    };
    Ok(node)
}

/// Encode a vocabulary node into the requested representation.
///
/// # Errors
///
/// Returns [`CodecError::Malformed`] when the node cannot be serialized
/// (e.g. a `data` payload containing a non-finite float).
pub fn encode(node: &Node, encoding: Encoding) -> Result<Representation, CodecError> {
    Ok(match encoding {
        Encoding::Json => Representation::Json(serde_json::to_string_pretty(node)?),
        Encoding::Value => Representation::Value(serde_json::to_value(node)?),
    })
}

/// Decode a representation that must be an authority manifest.
pub fn decode_authority(
    representation: &Representation,
    encoding: Encoding,
) -> Result<Authority, CodecError> {
    match decode(representation, encoding)? {
        Node::Authority(authority) => Ok(authority),
        other => Err(CodecError::UnexpectedNode {
            expected: "authority",
            actual: other.kind(),
        }),
    }
}

/// Decode a representation that must be a term file.
pub fn decode_term(
    representation: &Representation,
    encoding: Encoding,
) -> Result<Term, CodecError> {
    match decode(representation, encoding)? {
        Node::Term(term) => Ok(term),
        other => Err(CodecError::UnexpectedNode {
            expected: "term",
            actual: other.kind(),
        }),
    }
}
