//! # Validation Engine
//!
//! Generic per-entity rule checking. Every vocabulary entity exposes a flat,
//! declarative list of [`FieldCheck`]s — one per validated field — and the
//! engine evaluates them uniformly:
//!
//! - [`validate`] returns the set of formatted error strings
//!   (`{EntityKind}: invalid {field}: [{value}]`); duplicates collapse by
//!   set semantics.
//! - [`is_valid`] is `validate` being empty.
//! - [`get_errors`] returns the errors as a deterministically sorted list.
//!
//! A failed check is ordinary validation failure and is reported. A panic
//! inside check construction is a programming error and propagates — it is
//! deliberately *not* converted into a validation error.
//!
//! Validation is non-fatal by design: it gates archive writes but never
//! aborts a load.

use std::collections::BTreeSet;
use std::fmt;

use crate::model::{Authority, Collection, Namespace, Scope, Term};

/// The four vocabulary entity kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// Root namespace owner.
    Authority,
    /// Project-level grouping.
    Scope,
    /// One vocabulary axis.
    Collection,
    /// Leaf vocabulary entry.
    Term,
}

impl EntityKind {
    /// Canonical capitalised name, as used in error strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Authority => "Authority",
            EntityKind::Scope => "Scope",
            EntityKind::Collection => "Collection",
            EntityKind::Term => "Term",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One declarative field check: the field name, the value it held at
/// evaluation time, and whether the field's predicate passed.
#[derive(Debug, Clone)]
pub struct FieldCheck {
    /// Name of the checked field.
    pub field: &'static str,
    /// The field value, rendered for diagnostics.
    pub value: String,
    /// Outcome of the field's predicate.
    pub is_valid: bool,
}

impl FieldCheck {
    /// Build a check result.
    pub fn new(field: &'static str, value: impl Into<String>, is_valid: bool) -> Self {
        Self {
            field,
            value: value.into(),
            is_valid,
        }
    }
}

/// A vocabulary entity that exposes declarative validation checks.
pub trait Validate {
    /// Which entity kind this is, for error formatting.
    fn entity_kind(&self) -> EntityKind;

    /// The entity's field checks, evaluated eagerly.
    fn checks(&self) -> Vec<FieldCheck>;
}

/// Run every check of `entity` and collect the failures as formatted
/// error strings.
pub fn validate<T: Validate + ?Sized>(entity: &T) -> BTreeSet<String> {
    let kind = entity.entity_kind();
    entity
        .checks()
        .into_iter()
        .filter(|check| !check.is_valid)
        .map(|check| format!("{}: invalid {}: [{}]", kind, check.field, check.value))
        .collect()
}

/// Whether `entity` passes all of its checks.
pub fn is_valid<T: Validate + ?Sized>(entity: &T) -> bool {
    validate(entity).is_empty()
}

/// The entity's validation errors as a deterministically sorted list.
pub fn get_errors<T: Validate + ?Sized>(entity: &T) -> Vec<String> {
    validate(entity).into_iter().collect()
}

/// Validate an authority and everything it owns.
///
/// Used by the archive writer, which refuses to persist a graph carrying
/// any validation error.
pub fn validate_tree(authority: &Authority) -> BTreeSet<String> {
    let mut errors = validate(authority);
    for scope in &authority.scopes {
        errors.extend(validate(scope));
        for collection in &scope.collections {
            errors.extend(validate(collection));
            for term in &collection.terms {
                errors.extend(validate(term));
            }
        }
    }
    errors
}

fn check_canonical_name(name: &str) -> FieldCheck {
    FieldCheck::new("canonical_name", name, Namespace::is_canonical_segment(name))
}

fn check_label(label: &str) -> FieldCheck {
    FieldCheck::new("label", label, !label.trim().is_empty())
}

fn check_url(url: Option<&str>) -> FieldCheck {
    let ok = match url {
        None => true,
        Some(u) => u.starts_with("http://") || u.starts_with("https://"),
    };
    FieldCheck::new("url", url.unwrap_or(""), ok)
}

/// Check a containment namespace: right depth, leaf matching the entity's
/// canonical name.
fn check_namespace(namespace: &Namespace, depth: usize, canonical_name: &str) -> FieldCheck {
    FieldCheck::new(
        "namespace",
        namespace.as_str(),
        namespace.depth() == depth && namespace.leaf() == canonical_name,
    )
}

/// Check sibling-name uniqueness; the rendered value lists the duplicates.
fn check_unique_names<'a>(
    field: &'static str,
    names: impl Iterator<Item = &'a str>,
) -> FieldCheck {
    let mut seen = BTreeSet::new();
    let mut duplicates = BTreeSet::new();
    for name in names {
        if !seen.insert(name) {
            duplicates.insert(name);
        }
    }
    let rendered = duplicates.iter().copied().collect::<Vec<_>>().join(", ");
    FieldCheck::new(field, rendered, duplicates.is_empty())
}

impl Validate for Authority {
    fn entity_kind(&self) -> EntityKind {
        EntityKind::Authority
    }

    fn checks(&self) -> Vec<FieldCheck> {
        vec![
            check_canonical_name(&self.canonical_name),
            check_label(&self.label),
            check_url(self.url.as_deref()),
            check_unique_names("scopes", self.scopes.iter().map(|s| s.canonical_name.as_str())),
        ]
    }
}

impl Validate for Scope {
    fn entity_kind(&self) -> EntityKind {
        EntityKind::Scope
    }

    fn checks(&self) -> Vec<FieldCheck> {
        vec![
            check_canonical_name(&self.canonical_name),
            check_label(&self.label),
            check_url(self.url.as_deref()),
            check_namespace(&self.namespace, 2, &self.canonical_name),
            check_unique_names(
                "collections",
                self.collections.iter().map(|c| c.canonical_name.as_str()),
            ),
        ]
    }
}

impl Validate for Collection {
    fn entity_kind(&self) -> EntityKind {
        EntityKind::Collection
    }

    fn checks(&self) -> Vec<FieldCheck> {
        let term_regex_ok = match self.term_regex.as_deref() {
            None => true,
            Some(pattern) => regex::Regex::new(pattern).is_ok(),
        };
        vec![
            check_canonical_name(&self.canonical_name),
            check_label(&self.label),
            check_url(self.url.as_deref()),
            check_namespace(&self.namespace, 3, &self.canonical_name),
            FieldCheck::new(
                "term_regex",
                self.term_regex.as_deref().unwrap_or(""),
                term_regex_ok,
            ),
            check_unique_names("terms", self.terms.iter().map(|t| t.canonical_name.as_str())),
        ]
    }
}

impl Validate for Term {
    fn entity_kind(&self) -> EntityKind {
        EntityKind::Term
    }

    fn checks(&self) -> Vec<FieldCheck> {
        let parent_ok = self
            .parent
            .as_ref()
            .map(|p| p.as_str() != self.namespace.as_str())
            .unwrap_or(true);
        vec![
            check_canonical_name(&self.canonical_name),
            check_label(&self.label),
            check_url(self.url.as_deref()),
            check_namespace(&self.namespace, 4, &self.canonical_name),
            FieldCheck::new(
                "parent",
                self.parent.as_ref().map(|p| p.as_str()).unwrap_or(""),
                parent_ok,
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TermRef;

    fn wcrp() -> Authority {
        let mut authority = Authority::new("WCRP").unwrap();
        let scope = authority.add_scope("cmip6").unwrap();
        let coll = scope.add_collection("institution_id").unwrap();
        coll.add_term("ipsl").unwrap();
        authority
    }

    /// An entity with no validators at all.
    struct Unchecked;

    impl Validate for Unchecked {
        fn entity_kind(&self) -> EntityKind {
            EntityKind::Term
        }

        fn checks(&self) -> Vec<FieldCheck> {
            Vec::new()
        }
    }

    #[test]
    fn empty_validator_list_is_valid() {
        assert!(is_valid(&Unchecked));
        assert!(get_errors(&Unchecked).is_empty());
    }

    #[test]
    fn well_formed_tree_is_valid() {
        let authority = wcrp();
        assert!(validate_tree(&authority).is_empty());
    }

    #[test]
    fn error_format_names_kind_field_and_value() {
        let mut authority = wcrp();
        authority.canonical_name = "Not Canonical".to_string();
        let errors = get_errors(&authority);
        assert_eq!(errors, ["Authority: invalid canonical_name: [Not Canonical]"]);
    }

    #[test]
    fn duplicate_sibling_names_are_reported() {
        let mut authority = wcrp();
        authority.add_scope("cmip6").unwrap();
        let errors = get_errors(&authority);
        assert_eq!(errors, ["Authority: invalid scopes: [cmip6]"]);
    }

    #[test]
    fn duplicate_errors_collapse() {
        // Two scopes with the same broken label produce one error string.
        let mut authority = wcrp();
        authority.scope_mut("cmip6").unwrap().label = " ".to_string();
        let mut twin = authority.scope("cmip6").unwrap().clone();
        twin.canonical_name = "cmip5".to_string();
        twin.namespace = Namespace::new("wcrp:cmip5").unwrap();
        authority.scopes.push(twin);
        let errors: Vec<String> = validate_tree(&authority).into_iter().collect();
        assert_eq!(errors, ["Scope: invalid label: [ ]"]);
    }

    #[test]
    fn bad_url_is_reported() {
        let mut authority = wcrp();
        authority.url = Some("ftp://example.org".to_string());
        assert!(!is_valid(&authority));
    }

    #[test]
    fn namespace_must_match_containment() {
        let mut authority = wcrp();
        authority.scope_mut("cmip6").unwrap().namespace = Namespace::new("wcrp").unwrap();
        let errors = get_errors(authority.scope("cmip6").unwrap());
        assert_eq!(errors, ["Scope: invalid namespace: [wcrp]"]);
    }

    #[test]
    fn bad_term_regex_is_reported() {
        let mut authority = wcrp();
        let scope = authority.scope_mut("cmip6").unwrap();
        let coll = scope.collection_mut("institution_id").unwrap();
        coll.term_regex = Some("[unclosed".to_string());
        assert!(!is_valid(coll));
    }

    #[test]
    fn self_parent_is_reported() {
        let mut authority = wcrp();
        let scope = authority.scope_mut("cmip6").unwrap();
        let coll = scope.collection_mut("institution_id").unwrap();
        let term = &mut coll.terms[0];
        term.parent = Some(TermRef::Unresolved(term.namespace.as_str().to_string()));
        let errors = get_errors(&coll.terms[0]);
        assert_eq!(
            errors,
            ["Term: invalid parent: [wcrp:cmip6:institution_id:ipsl]"]
        );
    }

    #[test]
    fn get_errors_is_sorted() {
        let mut authority = wcrp();
        authority.canonical_name = "BAD".to_string();
        authority.label = String::new();
        authority.url = Some("not-a-url".to_string());
        let errors = get_errors(&authority);
        let mut sorted = errors.clone();
        sorted.sort();
        assert_eq!(errors, sorted);
        assert_eq!(errors.len(), 3);
    }
}
