//! Page naming policy.
//!
//! Maps each page-producing entity to a stable relative path, e.g.
//!
//! ```text
//! a                    → a.adoc
//! a::S                 → a/S.adoc
//! a::operator==        → a/operator_eq.adoc
//! a::f, a::f (overload) → a/f.adoc, a/f-2.adoc
//! ```

use super::Format;
use crate::catalog::{Catalog, Kind, Node, NodeId};
use crate::generator::{PageRole, page_role};
use rustc_hash::{FxHashMap, FxHashSet};

/// Operator spellings, longest first so `<<=` wins over `<<` and `<`.
const OPERATORS: &[(&str, &str)] = &[
    ("<=>", "3way_comp"),
    ("<<=", "lshift_eq"),
    (">>=", "rshift_eq"),
    ("->*", "ptrmem"),
    ("==", "eq"),
    ("!=", "not_eq"),
    ("<=", "le"),
    (">=", "ge"),
    ("<<", "lshift"),
    (">>", "rshift"),
    ("&&", "and"),
    ("||", "or"),
    ("++", "inc"),
    ("--", "dec"),
    ("+=", "plus_eq"),
    ("-=", "minus_eq"),
    ("*=", "star_eq"),
    ("/=", "slash_eq"),
    ("%=", "mod_eq"),
    ("&=", "and_eq"),
    ("|=", "or_eq"),
    ("^=", "xor_eq"),
    ("->", "arrow"),
    ("()", "call"),
    ("[]", "subs"),
    ("<", "lt"),
    (">", "gt"),
    ("+", "plus"),
    ("-", "minus"),
    ("*", "star"),
    ("/", "slash"),
    ("%", "mod"),
    ("&", "bitand"),
    ("|", "bitor"),
    ("^", "xor"),
    ("~", "bitnot"),
    ("!", "not"),
    ("=", "assign"),
    (",", "comma"),
];

/// Segment used for entities without a name.
const ANONYMOUS: &str = "_anonymous";

// ============================================================================
// Policy
// ============================================================================

/// Maps entities to output locations.
///
/// Implementations must be deterministic and must never return the same path
/// for two distinct entities of one catalog.
pub trait NamingPolicy: Send + Sync {
    /// Relative `/`-separated path of the entity's page.
    fn page_path(&self, node: &Node) -> String;
}

/// Default policy: readable paths derived from qualified names.
///
/// Paths are computed once, in pre-order, for every page-producing entity
/// below the global namespace.
/// Collisions (overloads, names differing only in case) are resolved with a
/// `-N` suffix in traversal order, so the result is pairwise distinct.
#[derive(Debug)]
pub struct LegibleNames {
    paths: FxHashMap<NodeId, String>,
    extension: &'static str,
}

impl LegibleNames {
    pub fn new(catalog: &Catalog, format: Format) -> Self {
        let extension = format.extension();
        let mut paths = FxHashMap::default();
        let mut taken = FxHashSet::default();

        for node in catalog.entities() {
            if page_role(node.kind) != PageRole::Page {
                continue;
            }
            let base = base_path(catalog, node);
            let mut candidate = base.clone();
            let mut n = 1;
            while !taken.insert(candidate.to_lowercase()) {
                n += 1;
                candidate = format!("{base}-{n}");
            }
            paths.insert(node.id, format!("{candidate}.{extension}"));
        }

        Self { paths, extension }
    }
}

impl NamingPolicy for LegibleNames {
    fn page_path(&self, node: &Node) -> String {
        if let Some(path) = self.paths.get(&node.id) {
            return path.clone();
        }
        // Not part of the catalog this policy was built from.
        let segments: Vec<String> = node.qualified_name.split("::").map(sanitize).collect();
        format!("{}.{}", segments.join("/"), self.extension)
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Path without extension: sanitized names from the root down to `node`.
///
/// The global namespace and overload sets contribute no segment.
fn base_path(catalog: &Catalog, node: &Node) -> String {
    let mut segments = vec![sanitize(&node.name)];
    let mut current = catalog.parent(node);
    while let Some(parent) = current {
        if !parent.is_root() && parent.kind != Kind::OverloadSet {
            segments.push(sanitize(&parent.name));
        }
        current = catalog.parent(parent);
    }
    segments.reverse();
    segments.join("/")
}

/// Turn an entity name into a portable file name segment.
fn sanitize(name: &str) -> String {
    if name.is_empty() {
        return ANONYMOUS.to_string();
    }

    if let Some(op) = name.strip_prefix("operator") {
        let op = op.trim();
        if let Some((_, word)) = OPERATORS.iter().find(|(symbol, _)| *symbol == op) {
            return format!("operator_{word}");
        }
    }

    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
