//! # Archive I/O
//!
//! The [`Archive`] type owns the root directory of a flat-file vocabulary
//! archive and provides the load, persist and delete operations.
//!
//! ## Load Algorithm
//!
//! Per authority:
//!
//! 1. Decode `MANIFEST` into an authority shell (scopes and collections,
//!    no terms). A missing or unreadable manifest is fatal and names the
//!    expected path.
//! 2. Apply the scope filter, if any, before touching the file system
//!    further.
//! 3. For every remaining scope × collection, decode each term file and
//!    attach it in sorted file-name order, registering every term in a
//!    session-local cache keyed by namespace.
//! 4. Reference-resolution pass: parent and association namespaces present
//!    in the cache are rewritten to resolved references; anything else is
//!    left as written. The cache is dropped when the pass completes.
//!
//! A malformed term file aborts the whole authority load — no partial
//! graph is ever returned.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use cvoc_core::{validate_tree, Authority, Namespace, Term, TermRef};

use crate::codec::{self, CodecError, Encoding, Node, Representation};

/// Authority manifest file name.
pub const MANIFEST: &str = "MANIFEST";

/// Directory under the archive root holding identifier parser
/// configurations; skipped when enumerating authorities.
pub const PARSER_CONFIG_DIR: &str = "_parsers";

/// Error raised by archive operations.
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// The authority manifest was missing or unreadable.
    #[error("invalid authority manifest: {path}")]
    Manifest {
        /// The expected manifest path.
        path: PathBuf,
        /// The underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// An archive path could not be read or written.
    #[error("I/O error at {path}")]
    Io {
        /// The offending path.
        path: PathBuf,
        /// The underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// A record failed to decode or encode.
    #[error("codec error at {path}: {source}")]
    Codec {
        /// The offending file.
        path: PathBuf,
        /// The codec failure.
        #[source]
        source: CodecError,
    },

    /// The authority failed validation; nothing was written.
    #[error("invalid authority {name}: {errors:?}")]
    Validation {
        /// The authority's canonical name.
        name: String,
        /// The sorted validation error set.
        errors: Vec<String>,
    },

    /// A parser-config operation was given a namespace that is not
    /// scope-deep.
    #[error("expected a scope-deep namespace, got {namespace}")]
    NotScopeDeep {
        /// The namespace as written.
        namespace: String,
    },
}

/// A flat-file vocabulary archive rooted at one directory.
#[derive(Debug, Clone)]
pub struct Archive {
    root: PathBuf,
}

impl Archive {
    /// Create a handle on the archive rooted at `root`. No I/O happens
    /// until an operation is called.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The archive root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load authorities from the archive.
    ///
    /// With an `authority` filter only that authority is loaded, and a
    /// missing manifest is an error. Without one, every authority
    /// subdirectory is enumerated (in sorted name order, skipping
    /// [`PARSER_CONFIG_DIR`]). An optional `scope` filter drops every
    /// non-matching scope before any term file is read.
    pub fn read(
        &self,
        authority: Option<&str>,
        scope: Option<&str>,
    ) -> Result<Vec<Authority>, ArchiveError> {
        match authority {
            Some(name) => {
                let dir = self.root.join(name);
                Ok(vec![self.read_authority_dir(&dir, scope)?])
            }
            None => {
                let mut dirs = Vec::new();
                let entries = fs::read_dir(&self.root).map_err(|source| ArchiveError::Io {
                    path: self.root.clone(),
                    source,
                })?;
                for entry in entries {
                    let entry = entry.map_err(|source| ArchiveError::Io {
                        path: self.root.clone(),
                        source,
                    })?;
                    let path = entry.path();
                    if !path.is_dir() {
                        continue;
                    }
                    if entry.file_name() == PARSER_CONFIG_DIR {
                        continue;
                    }
                    dirs.push(path);
                }
                dirs.sort();
                dirs.iter()
                    .map(|dir| self.read_authority_dir(dir, scope))
                    .collect()
            }
        }
    }

    /// Load one authority by canonical name.
    pub fn read_authority(
        &self,
        name: &str,
        scope: Option<&str>,
    ) -> Result<Authority, ArchiveError> {
        self.read_authority_dir(&self.root.join(name), scope)
    }

    fn read_authority_dir(
        &self,
        dir: &Path,
        scope_filter: Option<&str>,
    ) -> Result<Authority, ArchiveError> {
        // 1. Manifest → authority shell.
        let manifest_path = dir.join(MANIFEST);
        let text = fs::read_to_string(&manifest_path).map_err(|source| ArchiveError::Manifest {
            path: manifest_path.clone(),
            source,
        })?;
        let mut authority = codec::decode_authority(&Representation::Json(text), Encoding::Json)
            .map_err(|source| ArchiveError::Codec {
                path: manifest_path,
                source,
            })?;

        // 2. Scope filter, before any further file-system traffic.
        if let Some(filter) = scope_filter {
            authority.scopes.retain(|s| s.canonical_name == filter);
        }

        // 3. Term files, registered in the session cache by namespace.
        let mut cache: HashSet<Namespace> = HashSet::new();
        for scope in &mut authority.scopes {
            for collection in &mut scope.collections {
                let cdir = dir.join(&scope.canonical_name).join(&collection.canonical_name);
                for path in sorted_term_files(&cdir)? {
                    let term = read_term_file(&path)?;
                    cache.insert(term.namespace.clone());
                    collection.terms.push(term);
                }
            }
        }

        // 4. Reference resolution.
        let mut resolved = 0usize;
        for scope in &mut authority.scopes {
            for collection in &mut scope.collections {
                for term in &mut collection.terms {
                    resolved += resolve_refs(term, &cache);
                }
            }
        }

        debug!(
            authority = %authority.canonical_name,
            terms = cache.len(),
            resolved,
            "loaded authority"
        );
        Ok(authority)
    }

    /// Persist an authority: manifest first, then one file per term.
    ///
    /// The authority is validated before anything is written; any
    /// validation error refuses the whole write. Existing directories are
    /// reused, existing files overwritten.
    pub fn write(&self, authority: &Authority) -> Result<(), ArchiveError> {
        let errors = validate_tree(authority);
        if !errors.is_empty() {
            return Err(ArchiveError::Validation {
                name: authority.canonical_name.clone(),
                errors: errors.into_iter().collect(),
            });
        }

        let adir = self.root.join(&authority.canonical_name);
        create_dir_all(&adir)?;

        // Manifest carries the scope/collection shells; term bodies are
        // excluded by the model's serialization shape.
        let manifest_path = adir.join(MANIFEST);
        write_node(&manifest_path, &Node::Authority(authority.clone()))?;

        for scope in &authority.scopes {
            for collection in &scope.collections {
                let cdir = adir.join(&scope.canonical_name).join(&collection.canonical_name);
                create_dir_all(&cdir)?;
                for term in &collection.terms {
                    let path = cdir.join(format!("{}.json", term.canonical_name));
                    write_node(&path, &Node::Term(term.clone()))?;
                }
            }
        }

        info!(
            authority = %authority.canonical_name,
            terms = authority.terms().count(),
            "wrote authority"
        );
        Ok(())
    }

    /// Delete the entity addressed by `namespace`.
    ///
    /// Authority, scope and collection namespaces remove their directory
    /// subtree; a term namespace removes its single file. A missing target
    /// is silently ignored.
    pub fn delete(&self, namespace: &Namespace) -> Result<(), ArchiveError> {
        let result = if namespace.depth() == 4 {
            let path = self.term_path(namespace);
            fs::remove_file(&path).map_err(|source| (path, source))
        } else {
            let mut path = self.root.clone();
            for segment in namespace.segments() {
                path.push(segment);
            }
            fs::remove_dir_all(&path).map_err(|source| (path, source))
        };
        match result {
            Ok(()) => Ok(()),
            Err((path, source)) if source.kind() == io::ErrorKind::NotFound => {
                debug!(namespace = %namespace, path = %path.display(), "delete target absent");
                Ok(())
            }
            Err((path, source)) => Err(ArchiveError::Io { path, source }),
        }
    }

    fn term_path(&self, namespace: &Namespace) -> PathBuf {
        let mut path = self.root.clone();
        let mut segments = namespace.segments().peekable();
        while let Some(segment) = segments.next() {
            if segments.peek().is_some() {
                path.push(segment);
            } else {
                path.push(format!("{segment}.json"));
            }
        }
        path
    }

    /// Path of the parser configuration for `(scope, parser_type)`.
    fn parser_config_path(
        &self,
        scope: &Namespace,
        parser_type: &str,
    ) -> Result<PathBuf, ArchiveError> {
        let scope_name = scope.scope().ok_or_else(|| ArchiveError::NotScopeDeep {
            namespace: scope.as_str().to_string(),
        })?;
        Ok(self.root.join(PARSER_CONFIG_DIR).join(format!(
            "{}__{}__{}.json",
            parser_type,
            scope.authority(),
            scope_name
        )))
    }

    /// Persist an identifier parser configuration for `(scope,
    /// parser_type)` under the archive's `_parsers` directory.
    ///
    /// The parser type and scope namespace are injected as meta attributes;
    /// keys already present in `config` win.
    pub fn write_parser_config(
        &self,
        scope: &Namespace,
        parser_type: &str,
        config: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<(), ArchiveError> {
        let path = self.parser_config_path(scope, parser_type)?;
        let dir = self.root.join(PARSER_CONFIG_DIR);
        create_dir_all(&dir)?;

        let mut merged = serde_json::Map::new();
        merged.insert("parser_type".to_string(), parser_type.into());
        merged.insert("scope".to_string(), scope.as_str().into());
        merged.extend(config.clone());

        let text = serde_json::to_string_pretty(&serde_json::Value::Object(merged))
            .map_err(|source| ArchiveError::Codec {
                path: path.clone(),
                source: CodecError::Malformed(source),
            })?;
        fs::write(&path, text).map_err(|source| ArchiveError::Io { path, source })
    }

    /// Load the parser configuration for `(scope, parser_type)`.
    ///
    /// A missing file surfaces as [`ArchiveError::Io`] naming the expected
    /// path.
    pub fn read_parser_config(
        &self,
        scope: &Namespace,
        parser_type: &str,
    ) -> Result<serde_json::Value, ArchiveError> {
        let path = self.parser_config_path(scope, parser_type)?;
        let text = fs::read_to_string(&path).map_err(|source| ArchiveError::Io {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ArchiveError::Codec {
            path,
            source: CodecError::Malformed(source),
        })
    }
}

/// Enumerate a collection directory's term files in sorted name order.
/// A missing directory is an empty collection, not an error.
fn sorted_term_files(dir: &Path) -> Result<Vec<PathBuf>, ArchiveError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(ArchiveError::Io {
                path: dir.to_path_buf(),
                source,
            })
        }
    };
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| ArchiveError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn read_term_file(path: &Path) -> Result<Term, ArchiveError> {
    let text = fs::read_to_string(path).map_err(|source| ArchiveError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    codec::decode_term(&Representation::Json(text), Encoding::Json).map_err(|source| {
        ArchiveError::Codec {
            path: path.to_path_buf(),
            source,
        }
    })
}

/// Rewrite `term`'s parent and association references that resolve in the
/// session cache; returns how many were rewritten.
fn resolve_refs(term: &mut Term, cache: &HashSet<Namespace>) -> usize {
    let mut resolved = 0;
    if let Some(TermRef::Unresolved(raw)) = &term.parent {
        if let Some(ns) = cached_namespace(raw, cache) {
            term.parent = Some(TermRef::Resolved(ns));
            resolved += 1;
        }
    }
    for reference in &mut term.associations {
        if let TermRef::Unresolved(raw) = reference {
            if let Some(ns) = cached_namespace(raw, cache) {
                *reference = TermRef::Resolved(ns);
                resolved += 1;
            }
        }
    }
    resolved
}

fn cached_namespace(raw: &str, cache: &HashSet<Namespace>) -> Option<Namespace> {
    let ns = Namespace::new(raw).ok()?;
    cache.contains(&ns).then_some(ns)
}

fn create_dir_all(dir: &Path) -> Result<(), ArchiveError> {
    fs::create_dir_all(dir).map_err(|source| ArchiveError::Io {
        path: dir.to_path_buf(),
        source,
    })
}

fn write_node(path: &Path, node: &Node) -> Result<(), ArchiveError> {
    let repr = codec::encode(node, Encoding::Json).map_err(|source| ArchiveError::Codec {
        path: path.to_path_buf(),
        source,
    })?;
    let Representation::Json(text) = repr else {
        // encode() with Encoding::Json always yields the textual form.
        return Ok(());
    };
    fs::write(path, text).map_err(|source| ArchiveError::Io {
        path: path.to_path_buf(),
        source,
    })
}
