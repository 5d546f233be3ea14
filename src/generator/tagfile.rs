//! Doxygen-compatible tag file.
//!
//! Lets other documentation tools link into the generated reference.
//!
//! # Format
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8" standalone="yes"?>
//! <tagfile>
//!   <compound kind="namespace">
//!     <name>a</name>
//!     <filename>a.adoc</filename>
//!     <class kind="class">a::S</class>
//!     <member kind="function">
//!       <type>int</type>
//!       <name>f</name>
//!       <arglist>(int x)</arglist>
//!       <anchorfile>a/f.adoc</anchorfile>
//!       <anchor></anchor>
//!     </member>
//!   </compound>
//! </tagfile>
//! ```
//!
//! In single-page mode every `filename`/`anchorfile` is the single output
//! file and `anchor` holds the entity's position.

use super::error::GenerateError;
use super::page::PageAssignment;
use crate::catalog::{Catalog, Kind, Node, NodeId};
use anyhow::Result;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use rustc_hash::FxHashSet;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write the tag file for `catalog` to `path`.
pub fn write_tagfile(
    path: &Path,
    catalog: &Catalog,
    pages: &PageAssignment,
) -> Result<(), GenerateError> {
    let write = || -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = BufWriter::new(fs::File::create(path)?);
        TagfileWriter::new(file, catalog, pages).write()?;
        Ok(())
    };
    write().map_err(|err| GenerateError::Tagfile(path.to_path_buf(), err))
}

// ============================================================================
// Roles
// ============================================================================

/// How an entity kind appears in the tag file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagRole {
    /// `<compound kind="namespace">`, referenced from its parent.
    Namespace,
    /// `<compound kind="class">`, referenced from its parent.
    Class,
    /// `<member kind="function">` inside the owner's compound.
    Member,
    /// Emits nothing; its functions count as members of the parent.
    Container,
    /// Emits nothing and is not descended into.
    Silent,
}

const fn tag_role(kind: Kind) -> TagRole {
    match kind {
        Kind::Namespace => TagRole::Namespace,
        Kind::Record
        | Kind::Enum
        | Kind::Enumerator
        | Kind::Concept
        | Kind::Typedef
        | Kind::Alias
        | Kind::Using => TagRole::Class,
        Kind::Function => TagRole::Member,
        Kind::OverloadSet => TagRole::Container,
        Kind::Friend
        | Kind::Variable
        | Kind::Field
        | Kind::Specialization
        | Kind::Guide => TagRole::Silent,
    }
}

/// Namespaces whose whole subtree is namespaces.
///
/// Those add nothing to the tag file and are left out.
fn hollow_namespaces(catalog: &Catalog) -> FxHashSet<NodeId> {
    fn mark(catalog: &Catalog, node: &Node, hollow: &mut FxHashSet<NodeId>) -> bool {
        let mut only_namespaces = node.kind == Kind::Namespace;
        for child in catalog.children(node) {
            only_namespaces &= mark(catalog, child, hollow);
        }
        if only_namespaces {
            hollow.insert(node.id);
        }
        only_namespaces
    }

    let mut hollow = FxHashSet::default();
    mark(catalog, catalog.root(), &mut hollow);
    hollow
}

// ============================================================================
// Writer
// ============================================================================

/// Streams one tag file.
pub struct TagfileWriter<'a, W: Write> {
    xml: Writer<W>,
    catalog: &'a Catalog,
    pages: &'a PageAssignment,
    hollow: FxHashSet<NodeId>,
}

impl<'a, W: Write> TagfileWriter<'a, W> {
    pub fn new(out: W, catalog: &'a Catalog, pages: &'a PageAssignment) -> Self {
        Self {
            xml: Writer::new_with_indent(out, b' ', 2),
            catalog,
            pages,
            hollow: hollow_namespaces(catalog),
        }
    }

    /// Write the whole document and return the flushed sink.
    pub fn write(mut self) -> Result<W> {
        self.xml.write_event(Event::Decl(BytesDecl::new(
            "1.0",
            Some("UTF-8"),
            Some("yes"),
        )))?;
        self.xml.write_event(Event::Start(BytesStart::new("tagfile")))?;

        // The global namespace has no page; its functions become top-level
        // members.
        let catalog = self.catalog;
        let root = catalog.root();
        self.write_members(root)?;
        self.visit_children(root)?;

        self.xml.write_event(Event::End(BytesEnd::new("tagfile")))?;
        let mut out = self.xml.into_inner();
        out.write_all(b"\n")?;
        out.flush()?;
        Ok(out)
    }

    fn visit(&mut self, node: &'a Node) -> Result<()> {
        match tag_role(node.kind) {
            TagRole::Namespace => {
                if !self.hollow.contains(&node.id) {
                    self.write_compound(node, "namespace")?;
                }
                self.visit_children(node)
            }
            TagRole::Class => {
                self.write_compound(node, "class")?;
                self.visit_children(node)
            }
            TagRole::Member | TagRole::Container => self.visit_children(node),
            TagRole::Silent => Ok(()),
        }
    }

    fn visit_children(&mut self, node: &'a Node) -> Result<()> {
        let catalog = self.catalog;
        for child in catalog.children(node) {
            self.visit(child)?;
        }
        Ok(())
    }

    fn write_compound(&mut self, node: &'a Node, kind: &str) -> Result<()> {
        let pages = self.pages;
        let Some(locator) = pages.get(node.id) else {
            return Ok(());
        };

        let mut start = BytesStart::new("compound");
        start.push_attribute(("kind", kind));
        self.xml.write_event(Event::Start(start))?;
        self.text("name", &node.qualified_name)?;
        self.text("filename", pages.filename(locator))?;
        if let Some(anchor) = PageAssignment::anchor(locator) {
            self.text("anchor", &anchor.to_string())?;
        }

        // Nested scopes first, then functions.
        let catalog = self.catalog;
        for child in catalog.children(node) {
            if pages.get(child.id).is_none() {
                continue;
            }
            match tag_role(child.kind) {
                TagRole::Namespace => {
                    if !self.hollow.contains(&child.id) {
                        self.text("namespace", &child.qualified_name)?;
                    }
                }
                TagRole::Class => {
                    let mut class = BytesStart::new("class");
                    class.push_attribute(("kind", "class"));
                    self.xml.write_event(Event::Start(class))?;
                    self.xml
                        .write_event(Event::Text(BytesText::new(&child.qualified_name)))?;
                    self.xml.write_event(Event::End(BytesEnd::new("class")))?;
                }
                TagRole::Member | TagRole::Container | TagRole::Silent => {}
            }
        }
        self.write_members(node)?;

        self.xml.write_event(Event::End(BytesEnd::new("compound")))?;
        Ok(())
    }

    /// Functions of `node`, including those grouped in overload sets.
    fn write_members(&mut self, node: &'a Node) -> Result<()> {
        let catalog = self.catalog;
        for child in catalog.children(node) {
            match tag_role(child.kind) {
                TagRole::Member => self.write_member(child)?,
                TagRole::Container => {
                    for function in catalog.children(child) {
                        if tag_role(function.kind) == TagRole::Member {
                            self.write_member(function)?;
                        }
                    }
                }
                TagRole::Namespace | TagRole::Class | TagRole::Silent => {}
            }
        }
        Ok(())
    }

    fn write_member(&mut self, function: &'a Node) -> Result<()> {
        let pages = self.pages;
        let Some(locator) = pages.get(function.id) else {
            return Ok(());
        };
        let (return_type, arglist) = match &function.signature {
            Some(signature) => (signature.return_type.as_str(), signature.arglist()),
            None => ("", "()".to_string()),
        };

        let mut start = BytesStart::new("member");
        start.push_attribute(("kind", "function"));
        self.xml.write_event(Event::Start(start))?;
        self.text("type", return_type)?;
        self.text("name", &function.name)?;
        self.text("arglist", &arglist)?;
        self.text("anchorfile", pages.filename(locator))?;
        let anchor = PageAssignment::anchor(locator).map(|a| a.to_string());
        self.text("anchor", anchor.as_deref().unwrap_or_default())?;
        self.xml.write_event(Event::End(BytesEnd::new("member")))?;
        Ok(())
    }

    /// `<tag>text</tag>` on one line, even when `text` is empty.
    fn text(&mut self, tag: &str, text: &str) -> Result<()> {
        self.xml.write_event(Event::Start(BytesStart::new(tag)))?;
        self.xml.write_event(Event::Text(BytesText::new(text)))?;
        self.xml.write_event(Event::End(BytesEnd::new(tag)))?;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
