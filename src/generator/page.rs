//! Page roles and locators.
//!
//! Every entity kind maps to exactly one [`PageRole`]. Dispatchers match the
//! role exhaustively, so adding a [`Kind`] without deciding its role is a
//! compile error rather than a silently missing page.

use crate::catalog::{Catalog, Kind, NodeId};
use rustc_hash::FxHashMap;

// ============================================================================
// Roles
// ============================================================================

/// How a dispatcher treats an entity of a given kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRole {
    /// Produces a page of its own.
    Page,
    /// Produces nothing itself; its children are still visited.
    Container,
    /// Produces nothing and is documented on its parent's page.
    Silent,
}

/// Classify an entity kind.
pub const fn page_role(kind: Kind) -> PageRole {
    match kind {
        Kind::Namespace
        | Kind::Record
        | Kind::Function
        | Kind::Enum
        | Kind::Enumerator
        | Kind::Typedef
        | Kind::Alias
        | Kind::Using
        | Kind::Concept
        | Kind::Variable
        | Kind::Field
        | Kind::Guide => PageRole::Page,
        Kind::OverloadSet => PageRole::Container,
        Kind::Friend | Kind::Specialization => PageRole::Silent,
    }
}

/// Number of pages a catalog produces.
pub fn count_pages(catalog: &Catalog) -> usize {
    catalog
        .entities()
        .filter(|node| page_role(node.kind) == PageRole::Page)
        .count()
}

// ============================================================================
// Locators
// ============================================================================

/// Where an entity's page lands.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    /// Relative `/`-separated path of a standalone file (multi-page mode).
    File(String),
    /// Zero-based slot in the single output stream (single-page mode).
    Position(usize),
}

/// Locators assigned during one dispatch.
///
/// Consumed afterwards by the tag file writer, which needs to know where each
/// entity ended up.
#[derive(Debug, Default)]
pub struct PageAssignment {
    locators: FxHashMap<NodeId, Locator>,
    /// Output file name of the single stream, if any.
    stream: Option<String>,
}

impl PageAssignment {
    /// Assignment for multi-page output.
    pub fn multi() -> Self {
        Self::default()
    }

    /// Assignment for single-page output written to `stream`.
    pub fn single(stream: impl Into<String>) -> Self {
        Self {
            locators: FxHashMap::default(),
            stream: Some(stream.into()),
        }
    }

    /// Record the locator of an entity.
    ///
    /// # Panics
    ///
    /// If the entity already has a locator.
    pub fn assign(&mut self, id: NodeId, locator: Locator) {
        let previous = self.locators.insert(id, locator);
        assert!(previous.is_none(), "entity {id} assigned twice");
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&Locator> {
        self.locators.get(&id)
    }

    pub fn len(&self) -> usize {
        self.locators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locators.is_empty()
    }

    /// File a locator points into: its own file, or the single stream.
    pub fn filename<'a>(&'a self, locator: &'a Locator) -> &'a str {
        match locator {
            Locator::File(path) => path,
            Locator::Position(_) => self.stream.as_deref().unwrap_or_default(),
        }
    }

    /// In-file anchor of a locator (single-page mode only).
    pub const fn anchor(locator: &Locator) -> Option<usize> {
        match locator {
            Locator::File(_) => None,
            Locator::Position(position) => Some(*position),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogBuilder, Signature};

    #[test]
    fn test_every_kind_has_a_role() {
        let pages: Vec<_> = Kind::ALL
            .into_iter()
            .filter(|&kind| page_role(kind) == PageRole::Page)
            .collect();
        assert_eq!(pages.len(), 12);
        assert_eq!(page_role(Kind::OverloadSet), PageRole::Container);
        assert_eq!(page_role(Kind::Friend), PageRole::Silent);
        assert_eq!(page_role(Kind::Specialization), PageRole::Silent);
    }

    #[test]
    fn test_count_pages_skips_root_and_containers() {
        let mut b = CatalogBuilder::new();
        let a = b.add(b.root(), Kind::Namespace, "a");
        let set = b.add(a, Kind::OverloadSet, "f");
        b.function(set, "f", Signature::default());
        b.function(set, "f", Signature::default());
        b.add(a, Kind::Friend, "g");
        let catalog = b.build().unwrap();

        // a, f, f
        assert_eq!(count_pages(&catalog), 3);
    }

    #[test]
    fn test_filename_and_anchor() {
        let single = PageAssignment::single("reference.adoc");
        let position = Locator::Position(3);
        assert_eq!(single.filename(&position), "reference.adoc");
        assert_eq!(PageAssignment::anchor(&position), Some(3));

        let multi = PageAssignment::multi();
        let file = Locator::File("a/f.adoc".into());
        assert_eq!(multi.filename(&file), "a/f.adoc");
        assert_eq!(PageAssignment::anchor(&file), None);
    }

    #[test]
    #[should_panic(expected = "assigned twice")]
    fn test_assign_twice_panics() {
        let mut pages = PageAssignment::multi();
        pages.assign(NodeId(1), Locator::Position(0));
        pages.assign(NodeId(1), Locator::Position(1));
    }
}
