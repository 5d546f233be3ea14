//! The read-only catalog of documented entities.
//!
//! A [`Catalog`] is an immutable tree rooted at the global namespace. It is
//! assembled once (from a serialized JSON file or a [`CatalogBuilder`]),
//! validated, and then shared across worker threads behind an `Arc` without
//! any locking.
//!
//! # Input Format
//!
//! ```json
//! { "nodes": [
//!     { "id": 0, "kind": "namespace", "children": [1] },
//!     { "id": 1, "kind": "namespace", "name": "a", "parent": 0, "children": [2] },
//!     { "id": 2, "kind": "function", "name": "f", "parent": 1,
//!       "signature": { "return_type": "int", "params": [{ "type": "int", "name": "x" }] } }
//! ] }
//! ```

mod builder;
mod node;

pub use builder::CatalogBuilder;
pub use node::{Kind, Node, NodeId, Param, Signature};

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Deserialize;
use std::{fs, path::Path, path::PathBuf};
use thiserror::Error;

// ============================================================================
// Errors
// ============================================================================

/// Catalog loading and validation errors.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("catalog parsing error")]
    Json(#[from] serde_json::Error),

    #[error("catalog has no root node")]
    NoRoot,

    #[error("catalog has more than one root: {0} and {1}")]
    MultipleRoots(NodeId, NodeId),

    #[error("catalog root must be a namespace, found {0}")]
    RootNotNamespace(Kind),

    #[error("entity {0} appears more than once")]
    DuplicateId(NodeId),

    #[error("entity {parent} lists unknown child {child}")]
    UnknownChild { parent: NodeId, child: NodeId },

    #[error("entity {child} is listed by {parent} but names a different parent")]
    ParentMismatch { child: NodeId, parent: NodeId },

    #[error("entity {0} is listed as a child more than once")]
    ListedTwice(NodeId),

    #[error("entity {0} is not reachable from the root")]
    Unreachable(NodeId),
}

/// On-disk shape of a serialized catalog.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogFile {
    nodes: Vec<Node>,
}

// ============================================================================
// Catalog
// ============================================================================

/// Immutable tree of documented entities.
#[derive(Debug)]
pub struct Catalog {
    nodes: Vec<Node>,
    index: FxHashMap<NodeId, usize>,
    root: usize,
}

impl Catalog {
    /// Parse and validate a catalog from JSON text.
    pub fn from_json(content: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(content)?;
        Self::from_nodes(file.nodes)
    }

    /// Load a catalog from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let content =
            fs::read_to_string(path).map_err(|err| CatalogError::Io(path.to_path_buf(), err))?;
        Self::from_json(&content)
    }

    /// Validate the tree structure and derive qualified names.
    pub fn from_nodes(nodes: Vec<Node>) -> Result<Self, CatalogError> {
        let mut index = FxHashMap::with_capacity_and_hasher(nodes.len(), Default::default());
        let mut root = None;

        for (i, node) in nodes.iter().enumerate() {
            if index.insert(node.id, i).is_some() {
                return Err(CatalogError::DuplicateId(node.id));
            }
            if node.parent.is_none() {
                match root {
                    None => root = Some(i),
                    Some(first) => {
                        let first: &Node = &nodes[first];
                        return Err(CatalogError::MultipleRoots(first.id, node.id));
                    }
                }
            }
        }

        let root = root.ok_or(CatalogError::NoRoot)?;
        if nodes[root].kind != Kind::Namespace {
            return Err(CatalogError::RootNotNamespace(nodes[root].kind));
        }

        let mut listed = FxHashSet::default();
        for node in &nodes {
            for &child in &node.children {
                let Some(&child_idx) = index.get(&child) else {
                    return Err(CatalogError::UnknownChild {
                        parent: node.id,
                        child,
                    });
                };
                if nodes[child_idx].parent != Some(node.id) {
                    return Err(CatalogError::ParentMismatch {
                        child,
                        parent: node.id,
                    });
                }
                if !listed.insert(child) {
                    return Err(CatalogError::ListedTwice(child));
                }
            }
        }

        let mut catalog = Self { nodes, index, root };
        catalog.qualify()?;
        Ok(catalog)
    }

    /// Derive `qualified_name` for every node, top-down.
    ///
    /// Members of an overload set share the set's scope, so `a::f` stays
    /// `a::f` rather than becoming `a::f::f`.
    fn qualify(&mut self) -> Result<(), CatalogError> {
        let order: Vec<usize> = self
            .preorder()
            .map(|node| self.index[&node.id])
            .collect();

        if order.len() != self.nodes.len() {
            let reached: FxHashSet<usize> = order.iter().copied().collect();
            let orphan = (0..self.nodes.len())
                .find(|i| !reached.contains(i))
                .map_or(self.nodes[self.root].id, |i| self.nodes[i].id);
            return Err(CatalogError::Unreachable(orphan));
        }

        for idx in order {
            let Some(parent) = self.nodes[idx].parent else {
                continue;
            };
            let scope = self.scope_of(self.index[&parent]).to_owned();
            let node = &mut self.nodes[idx];
            node.qualified_name = if scope.is_empty() {
                node.name.clone()
            } else {
                format!("{scope}::{}", node.name)
            };
        }
        Ok(())
    }

    /// Qualified name a node contributes to its children.
    fn scope_of(&self, idx: usize) -> &str {
        let node = &self.nodes[idx];
        match (node.kind, node.parent) {
            (Kind::OverloadSet, Some(parent)) => &self.nodes[self.index[&parent]].qualified_name,
            _ => &node.qualified_name,
        }
    }

    // ------------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------------

    /// The global namespace.
    #[inline]
    pub fn root(&self) -> &Node {
        &self.nodes[self.root]
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.index.get(&id).map(|&i| &self.nodes[i])
    }

    /// Direct children of `node`, in declaration order.
    pub fn children<'a>(&'a self, node: &'a Node) -> impl Iterator<Item = &'a Node> + 'a {
        node.children.iter().filter_map(|&id| self.get(id))
    }

    #[inline]
    pub fn parent(&self, node: &Node) -> Option<&Node> {
        node.parent.and_then(|id| self.get(id))
    }

    /// Total number of entities, the root included.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A catalog is empty when the global namespace documents nothing.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root().children.is_empty()
    }

    // ------------------------------------------------------------------------
    // Traversal
    // ------------------------------------------------------------------------

    /// Deterministic pre-order walk over the whole catalog.
    pub fn preorder(&self) -> Preorder<'_> {
        self.subtree(self.root())
    }

    /// Pre-order walk over every documented entity.
    ///
    /// The global namespace is the catalog's container and is skipped: it
    /// never produces output of its own.
    pub fn entities(&self) -> impl Iterator<Item = &Node> {
        self.preorder().skip(1)
    }

    /// Pre-order walk over `node` and all of its descendants.
    pub fn subtree(&self, node: &Node) -> Preorder<'_> {
        Preorder {
            catalog: self,
            stack: vec![node.id],
        }
    }
}

/// Pre-order iterator returned by [`Catalog::preorder`].
pub struct Preorder<'a> {
    catalog: &'a Catalog,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(id) = self.stack.pop() {
            if let Some(node) = self.catalog.get(id) {
                self.stack.extend(node.children.iter().rev().copied());
                return Some(node);
            }
        }
        None
    }
}

// ============================================================================
// Tests
// ============================================================================
