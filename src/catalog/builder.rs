//! Programmatic catalog assembly.

use super::{Catalog, CatalogError, Kind, Node, NodeId, Signature};

/// Builds a [`Catalog`] one entity at a time.
///
/// Identifiers are assigned sequentially; the global namespace is always
/// `NodeId(0)`.
///
/// # Example
/// ```
/// use refgen::catalog::{CatalogBuilder, Kind, Param, Signature};
///
/// let mut b = CatalogBuilder::new();
/// let a = b.add(b.root(), Kind::Namespace, "a");
/// b.function(a, "f", Signature::new("int", vec![Param::new("int", "x")]));
/// let catalog = b.build().unwrap();
/// assert_eq!(catalog.len(), 3);
/// ```
#[derive(Debug)]
pub struct CatalogBuilder {
    nodes: Vec<Node>,
}

impl Default for CatalogBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeId(0), Kind::Namespace, "")],
        }
    }

    #[inline]
    pub const fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Append a child of `kind` under `parent`.
    pub fn add(&mut self, parent: NodeId, kind: Kind, name: &str) -> NodeId {
        let id = NodeId(self.nodes.len() as u64);
        let mut node = Node::new(id, kind, name);
        node.parent = Some(parent);
        if let Some(owner) = self.nodes.get_mut(parent.0 as usize) {
            owner.children.push(id);
        }
        self.nodes.push(node);
        id
    }

    /// Append a function with its signature.
    pub fn function(&mut self, parent: NodeId, name: &str, signature: Signature) -> NodeId {
        let id = self.add(parent, Kind::Function, name);
        if let Some(node) = self.nodes.last_mut() {
            node.signature = Some(signature);
        }
        id
    }

    pub fn build(self) -> Result<Catalog, CatalogError> {
        Catalog::from_nodes(self.nodes)
    }
}
