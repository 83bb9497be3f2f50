//! # Term Matcher
//!
//! Resolves an identifier token to a term of a collection under a
//! [`Strictness`] level. Strictness is an ordered enumeration from
//! exact-namespace matching through progressively more permissive
//! normalization; levels are evaluated cumulatively, so the matcher is
//! monotonic by construction — any match found at a stricter level is
//! also found at every looser level. Parser correctness depends on that
//! monotonicity and it is property-tested below.

use serde::{Deserialize, Serialize};

use cvoc_core::Term;

/// How loosely identifier tokens are matched against vocabulary terms.
///
/// Each level admits everything the previous level admits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strictness {
    /// Token must equal the term's full namespace.
    Namespace = 0,
    /// Plus the canonical name.
    Canonical = 1,
    /// Plus the display label. The customary default.
    #[default]
    Label = 2,
    /// Plus any alternative name.
    AltName = 3,
    /// All of the above, compared trimmed and case-folded.
    Permissive = 4,
}

/// Resolve `token` against `terms`, returning the first match in
/// collection order, or `None`.
pub fn match_term<'a>(terms: &'a [Term], token: &str, strictness: Strictness) -> Option<&'a Term> {
    terms.iter().find(|term| matches(term, token, strictness))
}

fn matches(term: &Term, token: &str, strictness: Strictness) -> bool {
    if token == term.namespace.as_str() {
        return true;
    }
    if strictness >= Strictness::Canonical && token == term.canonical_name {
        return true;
    }
    if strictness >= Strictness::Label && token == term.label {
        return true;
    }
    if strictness >= Strictness::AltName && term.alternative_names.iter().any(|n| n == token) {
        return true;
    }
    if strictness >= Strictness::Permissive {
        let folded = token.trim().to_lowercase();
        if folded == term.namespace.as_str()
            || folded == term.canonical_name.to_lowercase()
            || folded == term.label.trim().to_lowercase()
            || term
                .alternative_names
                .iter()
                .any(|n| n.trim().to_lowercase() == folded)
        {
            return true;
        }
    }
    false
}
