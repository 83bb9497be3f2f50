//! # Identifier Parser
//!
//! Parses a structured identifier against the parsing configuration of one
//! `(scope, identifier kind)` pair:
//!
//! 1. Resolve the configuration (ordered token specifications, separator,
//!    optional suffix marker), memoized per session.
//! 2. Split the identifier on the separator.
//! 3. For filename identifiers, split the final token on `.` and append
//!    each fragment as a further token — extension segments are identifier
//!    elements of their own.
//! 4. If a suffix marker is configured and the final token contains it,
//!    truncate that token at the marker's first occurrence.
//! 5. Require the token count to equal the specification count exactly.
//! 6. Evaluate tokens against specifications pairwise, in order, aborting
//!    on the first failure. Only collection resolutions contribute terms
//!    to the result.

use std::collections::BTreeSet;
use std::collections::HashMap;

use thiserror::Error;
use tracing::debug;

use cvoc_archive::{Archive, ArchiveError};
use cvoc_core::{Namespace, Term};

use crate::config::{ConfigError, IdentifierKind, ParserConfig};
use crate::matcher::{match_term, Strictness};
use crate::spec::TokenSpec;

/// Error raised while parsing an identifier.
#[derive(Error, Debug)]
pub enum ParseError {
    /// The identifier produced a different number of tokens than the
    /// configuration has specifications.
    #[error("invalid identifier {identifier:?}: expected {expected} elements, got {actual}")]
    ElementCountMismatch {
        /// Number of specifications in the configuration.
        expected: usize,
        /// Number of tokens the identifier split into.
        actual: usize,
        /// The identifier as given.
        identifier: String,
    },

    /// A token failed its constant specification.
    #[error(
        "invalid identifier {identifier:?}: element #{index} ({token:?}) failed constant check, expected {expected:?}"
    )]
    ConstantMismatch {
        /// 1-based element index.
        index: usize,
        /// The offending token.
        token: String,
        /// The constant the specification expects.
        expected: String,
        /// The identifier as given.
        identifier: String,
    },

    /// A token failed its regular-expression specification.
    #[error(
        "invalid identifier {identifier:?}: element #{index} ({token:?}) failed regex check against {pattern:?}"
    )]
    RegexMismatch {
        /// 1-based element index.
        index: usize,
        /// The offending token.
        token: String,
        /// The pattern the specification expects.
        pattern: String,
        /// The identifier as given.
        identifier: String,
    },

    /// A token resolved to no term of its collection.
    #[error(
        "invalid identifier {identifier:?}: element #{index} ({token:?}) matched no term of {namespace}"
    )]
    CollectionMismatch {
        /// 1-based element index.
        index: usize,
        /// The offending token.
        token: String,
        /// The collection the token was resolved against.
        namespace: Namespace,
        /// The identifier as given.
        identifier: String,
    },

    /// A collection specification named a collection the archive does not
    /// hold.
    #[error("unknown collection: {namespace}")]
    UnknownCollection {
        /// The namespace as configured.
        namespace: Namespace,
    },

    /// The parser configuration could not be built.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The archive could not be read.
    #[error(transparent)]
    Archive(#[from] ArchiveError),
}

/// One identifier-parsing session over an archive.
///
/// The session owns its caches: parser configurations keyed by
/// `(scope, kind)` and resolved collection terms keyed by collection
/// namespace. Both are filled lazily on first use and live exactly as long
/// as the session — there is no process-wide state, and independent
/// sessions never share anything.
#[derive(Debug)]
pub struct ParsingSession {
    archive: Archive,
    configs: HashMap<(Namespace, IdentifierKind), ParserConfig>,
    collections: HashMap<Namespace, Vec<Term>>,
}

impl ParsingSession {
    /// Start a session over `archive`. No I/O happens until a parse needs
    /// a configuration or a collection.
    pub fn new(archive: Archive) -> Self {
        Self {
            archive,
            configs: HashMap::new(),
            collections: HashMap::new(),
        }
    }

    /// Parse one identifier, returning the set of vocabulary terms its
    /// collection-specified tokens resolved to.
    ///
    /// Parsing is fail-fast: the first failing specification aborts with an
    /// error carrying the 1-based element index, the offending token and
    /// what was expected. No partial result set is ever returned.
    pub fn parse(
        &mut self,
        scope: &Namespace,
        kind: IdentifierKind,
        identifier: &str,
        strictness: Strictness,
    ) -> Result<BTreeSet<Term>, ParseError> {
        let config = self.config(scope, kind)?;
        let mut tokens = tokenize(kind, identifier, &config.separator);

        // Strip a trailing type artifact before the count check.
        if let (Some(suffix), Some(last)) = (&config.suffix, tokens.last_mut()) {
            if let Some(at) = last.find(suffix.as_str()) {
                last.truncate(at);
            }
        }

        if tokens.len() != config.specs.len() {
            return Err(ParseError::ElementCountMismatch {
                expected: config.specs.len(),
                actual: tokens.len(),
                identifier: identifier.to_string(),
            });
        }

        let mut result = BTreeSet::new();
        for (idx, (token, spec)) in tokens.iter().zip(&config.specs).enumerate() {
            match spec {
                TokenSpec::Constant { value, .. } => {
                    if token != value {
                        return Err(ParseError::ConstantMismatch {
                            index: idx + 1,
                            token: token.clone(),
                            expected: value.clone(),
                            identifier: identifier.to_string(),
                        });
                    }
                }
                TokenSpec::Regex { pattern, .. } => {
                    // Looser strictness additionally tries the trimmed,
                    // case-folded token; it never disqualifies a raw match.
                    let matched = pattern.is_match(token)
                        || (strictness >= Strictness::Permissive
                            && pattern.is_match(&token.trim().to_lowercase()));
                    if !matched {
                        return Err(ParseError::RegexMismatch {
                            index: idx + 1,
                            token: token.clone(),
                            pattern: pattern.as_str().to_string(),
                            identifier: identifier.to_string(),
                        });
                    }
                }
                TokenSpec::Collection { namespace, .. } => {
                    let terms = self.collection_terms(namespace)?;
                    match match_term(terms, token, strictness) {
                        Some(term) => {
                            result.insert(term.clone());
                        }
                        None => {
                            return Err(ParseError::CollectionMismatch {
                                index: idx + 1,
                                token: token.clone(),
                                namespace: namespace.clone(),
                                identifier: identifier.to_string(),
                            })
                        }
                    }
                }
            }
        }

        debug!(
            scope = %scope,
            kind = %kind,
            identifier,
            terms = result.len(),
            "parsed identifier"
        );
        Ok(result)
    }

    /// Parse a batch of identifiers and union the results.
    ///
    /// Any single failure aborts the whole batch; there is no best-effort
    /// skip-and-continue mode.
    pub fn parse_set<I, S>(
        &mut self,
        scope: &Namespace,
        kind: IdentifierKind,
        identifiers: I,
        strictness: Strictness,
    ) -> Result<BTreeSet<Term>, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut result = BTreeSet::new();
        for identifier in identifiers {
            result.extend(self.parse(scope, kind, identifier.as_ref(), strictness)?);
        }
        Ok(result)
    }

    /// The configuration for `(scope, kind)`, loaded from the archive on
    /// first use.
    fn config(
        &mut self,
        scope: &Namespace,
        kind: IdentifierKind,
    ) -> Result<ParserConfig, ParseError> {
        let key = (scope.clone(), kind);
        if let Some(config) = self.configs.get(&key) {
            return Ok(config.clone());
        }
        let value = self.archive.read_parser_config(scope, kind.as_str())?;
        let config = ParserConfig::from_value(value)?;
        self.configs.insert(key, config.clone());
        Ok(config)
    }

    /// The terms of the collection at `namespace`, loaded from the archive
    /// on first use.
    fn collection_terms(&mut self, namespace: &Namespace) -> Result<&[Term], ParseError> {
        if !self.collections.contains_key(namespace) {
            let terms = load_collection(&self.archive, namespace)?;
            self.collections.insert(namespace.clone(), terms);
        }
        Ok(self
            .collections
            .get(namespace)
            .map(Vec::as_slice)
            .expect("cached above"))
    }
}

/// Split an identifier into its tokens. Filename identifiers additionally
/// split the final token on `.` so that extension segments become tokens of
/// their own.
fn tokenize(kind: IdentifierKind, identifier: &str, separator: &str) -> Vec<String> {
    let mut tokens: Vec<String> = identifier.split(separator).map(str::to_string).collect();
    if kind == IdentifierKind::Filename {
        if let Some(last) = tokens.pop() {
            tokens.extend(last.split('.').map(str::to_string));
        }
    }
    tokens
}

/// Load one collection's terms by reading its authority with the owning
/// scope as filter.
fn load_collection(archive: &Archive, namespace: &Namespace) -> Result<Vec<Term>, ParseError> {
    let unknown = || ParseError::UnknownCollection {
        namespace: namespace.clone(),
    };
    let scope_name = namespace.scope().ok_or_else(unknown)?;
    if namespace.collection().is_none() || namespace.term().is_some() {
        return Err(unknown());
    }
    let authority = archive.read_authority(namespace.authority(), Some(scope_name))?;
    let collection = authority.find_collection(namespace).ok_or_else(unknown)?;
    Ok(collection.terms.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cvoc_core::{Authority, TermStatus};
    use serde_json::json;
    use tempfile::TempDir;

    const SCOPE: &str = "wcrp:cmip6";

    fn scope_ns() -> Namespace {
        Namespace::new(SCOPE).unwrap()
    }

    fn wcrp() -> Authority {
        let mut authority = Authority::new("wcrp").unwrap();
        let scope = authority.add_scope("cmip6").unwrap();

        let activities = scope.add_collection("activity_id").unwrap();
        activities.add_term("ScenarioMIP").unwrap().status = TermStatus::Accepted;
        activities.add_term("HighResMIP").unwrap();

        let institutions = scope.add_collection("institution_id").unwrap();
        let ipsl = institutions.add_term("IPSL").unwrap();
        ipsl.status = TermStatus::Accepted;
        ipsl.alternative_names = vec!["institut-pierre-simon-laplace".to_string()];
        institutions.add_term("MOHC").unwrap();

        let experiments = scope.add_collection("experiment_id").unwrap();
        experiments.add_term("historical").unwrap();
        experiments.add_term("ssp585").unwrap();

        authority
    }

    fn dataset_config() -> serde_json::Map<String, serde_json::Value> {
        let config = json!({
            "separator": ".",
            "specs": [
                {"type": "const", "value": "CMIP6"},
                {"type": "collection", "namespace": "wcrp:cmip6:activity_id"},
                {"type": "collection", "namespace": "wcrp:cmip6:institution_id"},
                {"type": "collection", "namespace": "wcrp:cmip6:experiment_id"},
                {"type": "regex", "pattern": "^r[0-9]+i[0-9]+p[0-9]+f[0-9]+$"},
            ],
        });
        let serde_json::Value::Object(map) = config else {
            panic!("fixture is an object");
        };
        map
    }

    fn session() -> (TempDir, ParsingSession) {
        let dir = TempDir::new().unwrap();
        let archive = Archive::new(dir.path());
        archive.write(&wcrp()).unwrap();
        archive
            .write_parser_config(&scope_ns(), "dataset-id", &dataset_config())
            .unwrap();
        (dir, ParsingSession::new(archive))
    }

    #[test]
    fn parse_resolves_collection_tokens_only() {
        let (_dir, mut session) = session();
        let terms = session
            .parse(
                &scope_ns(),
                IdentifierKind::DatasetId,
                "CMIP6.ScenarioMIP.IPSL.historical.r1i1p1f1",
                Strictness::Label,
            )
            .unwrap();
        // The constant and regex elements are structural checks; only the
        // three collection elements contribute.
        let namespaces: Vec<&str> = terms.iter().map(|t| t.namespace.as_str()).collect();
        assert_eq!(
            namespaces,
            [
                "wcrp:cmip6:activity_id:scenariomip",
                "wcrp:cmip6:experiment_id:historical",
                "wcrp:cmip6:institution_id:ipsl",
            ]
        );
    }

    #[test]
    fn parse_is_deterministic() {
        let (_dir, mut session) = session();
        let run = |session: &mut ParsingSession| {
            session
                .parse(
                    &scope_ns(),
                    IdentifierKind::DatasetId,
                    "CMIP6.ScenarioMIP.IPSL.historical.r1i1p1f1",
                    Strictness::Label,
                )
                .unwrap()
        };
        assert_eq!(run(&mut session), run(&mut session));
    }

    #[test]
    fn element_count_mismatch_names_both_counts() {
        let (_dir, mut session) = session();
        let err = session
            .parse(
                &scope_ns(),
                IdentifierKind::DatasetId,
                "CMIP6.ScenarioMIP.IPSL",
                Strictness::Label,
            )
            .unwrap_err();
        match err {
            ParseError::ElementCountMismatch {
                expected,
                actual,
                identifier,
            } => {
                assert_eq!(expected, 5);
                assert_eq!(actual, 3);
                assert_eq!(identifier, "CMIP6.ScenarioMIP.IPSL");
            }
            other => panic!("expected count mismatch, got {other}"),
        }
    }

    #[test]
    fn constant_mismatch_fails_at_every_strictness() {
        let (_dir, mut session) = session();
        for strictness in [
            Strictness::Namespace,
            Strictness::Canonical,
            Strictness::Label,
            Strictness::AltName,
            Strictness::Permissive,
        ] {
            let err = session
                .parse(
                    &scope_ns(),
                    IdentifierKind::DatasetId,
                    "cmip6.ScenarioMIP.IPSL.historical.r1i1p1f1",
                    strictness,
                )
                .unwrap_err();
            match err {
                ParseError::ConstantMismatch { index, token, expected, .. } => {
                    assert_eq!(index, 1);
                    assert_eq!(token, "cmip6");
                    assert_eq!(expected, "CMIP6");
                }
                other => panic!("expected constant mismatch, got {other}"),
            }
        }
    }

    #[test]
    fn raising_strictness_never_breaks_a_regex_match() {
        let (_dir, mut session) = session();
        // Upper-case variant realisation: fails below the case-folding
        // threshold, passes at it.
        let identifier = "CMIP6.ScenarioMIP.IPSL.historical.R1I1P1F1";
        let err = session
            .parse(&scope_ns(), IdentifierKind::DatasetId, identifier, Strictness::AltName)
            .unwrap_err();
        assert!(matches!(err, ParseError::RegexMismatch { index: 5, .. }), "got {err}");

        let terms = session
            .parse(&scope_ns(), IdentifierKind::DatasetId, identifier, Strictness::Permissive)
            .unwrap();
        assert_eq!(terms.len(), 3);
    }

    #[test]
    fn collection_mismatch_carries_index_and_token() {
        let (_dir, mut session) = session();
        let err = session
            .parse(
                &scope_ns(),
                IdentifierKind::DatasetId,
                "CMIP6.ScenarioMIP.NCAR.historical.r1i1p1f1",
                Strictness::Label,
            )
            .unwrap_err();
        match err {
            ParseError::CollectionMismatch { index, token, namespace, .. } => {
                assert_eq!(index, 3);
                assert_eq!(token, "NCAR");
                assert_eq!(namespace.as_str(), "wcrp:cmip6:institution_id");
            }
            other => panic!("expected collection mismatch, got {other}"),
        }
    }

    #[test]
    fn parse_set_unions_and_aborts_on_first_failure() {
        let (_dir, mut session) = session();
        let union = session
            .parse_set(
                &scope_ns(),
                IdentifierKind::DatasetId,
                [
                    "CMIP6.ScenarioMIP.IPSL.historical.r1i1p1f1",
                    "CMIP6.HighResMIP.MOHC.ssp585.r2i1p1f1",
                ],
                Strictness::Label,
            )
            .unwrap();
        assert_eq!(union.len(), 6);

        let err = session
            .parse_set(
                &scope_ns(),
                IdentifierKind::DatasetId,
                [
                    "CMIP6.ScenarioMIP.IPSL.historical.r1i1p1f1",
                    "CMIP6.ScenarioMIP.NCAR.historical.r1i1p1f1",
                ],
                Strictness::Label,
            )
            .unwrap_err();
        assert!(matches!(err, ParseError::CollectionMismatch { .. }));
    }

    #[test]
    fn missing_config_is_an_archive_error() {
        let (_dir, mut session) = session();
        let err = session
            .parse(
                &scope_ns(),
                IdentifierKind::DirectoryPath,
                "whatever",
                Strictness::Label,
            )
            .unwrap_err();
        assert!(matches!(err, ParseError::Archive(ArchiveError::Io { .. })), "got {err}");
    }

    #[test]
    fn unknown_collection_is_reported() {
        let (_dir, mut session) = session();
        let mut config = dataset_config();
        config.insert(
            "specs".to_string(),
            json!([{"type": "collection", "namespace": "wcrp:cmip6:source_id"}]),
        );
        let archive = Archive::new(session.archive.root());
        archive
            .write_parser_config(&scope_ns(), "directory", &config)
            .unwrap();

        let err = session
            .parse(&scope_ns(), IdentifierKind::DirectoryPath, "IPSL", Strictness::Label)
            .unwrap_err();
        match err {
            ParseError::UnknownCollection { namespace } => {
                assert_eq!(namespace.as_str(), "wcrp:cmip6:source_id");
            }
            other => panic!("expected unknown collection, got {other}"),
        }
    }

    #[test]
    fn configs_and_collections_are_memoized_per_session() {
        let (dir, mut session) = session();
        session
            .parse(
                &scope_ns(),
                IdentifierKind::DatasetId,
                "CMIP6.ScenarioMIP.IPSL.historical.r1i1p1f1",
                Strictness::Label,
            )
            .unwrap();

        // With config and collections cached, the archive itself can
        // disappear and the session keeps parsing.
        std::fs::remove_dir_all(dir.path().join("wcrp")).unwrap();
        std::fs::remove_dir_all(dir.path().join("_parsers")).unwrap();
        let terms = session
            .parse(
                &scope_ns(),
                IdentifierKind::DatasetId,
                "CMIP6.HighResMIP.MOHC.ssp585.r2i1p1f1",
                Strictness::Label,
            )
            .unwrap();
        assert_eq!(terms.len(), 3);

        // A fresh session shares nothing with the first one.
        let mut fresh = ParsingSession::new(Archive::new(dir.path()));
        assert!(fresh
            .parse(
                &scope_ns(),
                IdentifierKind::DatasetId,
                "CMIP6.ScenarioMIP.IPSL.historical.r1i1p1f1",
                Strictness::Label,
            )
            .is_err());
    }

    #[test]
    fn filename_kind_splits_extension_segments() {
        let (_dir, mut session) = session();
        let mut config = dataset_config();
        config.insert("suffix".to_string(), ".".into());
        config.insert(
            "specs".to_string(),
            json!([
                {"type": "const", "value": "CMIP6"},
                {"type": "collection", "namespace": "wcrp:cmip6:activity_id"},
                {"type": "collection", "namespace": "wcrp:cmip6:institution_id"},
                {"type": "collection", "namespace": "wcrp:cmip6:experiment_id"},
                {"type": "regex", "pattern": "^r[0-9]+i[0-9]+p[0-9]+f[0-9]+$"},
                {"type": "const", "value": "nc"},
            ]),
        );
        let archive = Archive::new(session.archive.root());
        archive
            .write_parser_config(&scope_ns(), "filename", &config)
            .unwrap();

        let terms = session
            .parse(
                &scope_ns(),
                IdentifierKind::Filename,
                "CMIP6.ScenarioMIP.IPSL.historical.r1i1p1f1.nc",
                Strictness::Label,
            )
            .unwrap();
        assert_eq!(terms.len(), 3);
    }
}
