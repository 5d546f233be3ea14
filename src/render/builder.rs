//! Default page renderer.
//!
//! Produces a small, self-contained page per entity:
//!
//! ```text
//! [[3]]                      ← single-page mode only: numeric anchor
//! == a::f                    ← "=" in multi-page mode
//!
//! [.kind]#function#
//!
//! [source,cpp]
//! ----
//! int f(int x);
//! ----
//!
//! === Functions              ← one section per member kind
//! * `g`
//! ```
//!
//! Single-page header and footer layouts are loaded once per renderer, from
//! `<addons>/<format>/single-header.<ext>` and `single-footer.<ext>` when an
//! addons directory is configured, otherwise from the built-in defaults.

use super::{Format, RenderOptions, Renderer};
use crate::catalog::{Catalog, Kind, Node};
use crate::generator::Locator;
use anyhow::{Context, Result, bail};
use std::fmt::{self, Write};
use std::fs;
use std::path::Path;

const ADOC_HEADER: &str = "= Reference\n:toc: left\n:source-language: cpp\n\n";
const ADOC_FOOTER: &str = "\n// end of reference\n";

const HTML_HEADER: &str = "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>Reference</title>\n</head>\n<body>\n";
const HTML_FOOTER: &str = "</body>\n</html>\n";

// ============================================================================
// Layouts
// ============================================================================

/// Single-page header and footer text.
#[derive(Debug, Clone)]
struct Layouts {
    header: String,
    footer: String,
}

impl Layouts {
    fn builtin(format: Format) -> Self {
        let (header, footer) = match format {
            Format::Adoc => (ADOC_HEADER, ADOC_FOOTER),
            Format::Html => (HTML_HEADER, HTML_FOOTER),
        };
        Self {
            header: header.to_string(),
            footer: footer.to_string(),
        }
    }

    /// Load overrides from `dir`, falling back to built-ins per file.
    fn load(dir: &Path, format: Format) -> Result<Self> {
        if !dir.is_dir() {
            bail!("layout directory `{}` not found", dir.display());
        }

        let mut layouts = Self::builtin(format);
        let ext = format.extension();
        for (name, slot) in [
            ("single-header", &mut layouts.header),
            ("single-footer", &mut layouts.footer),
        ] {
            let path = dir.join(format!("{name}.{ext}"));
            if path.exists() {
                *slot = fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read layout {}", path.display()))?;
            }
        }
        Ok(layouts)
    }
}

// ============================================================================
// PageBuilder
// ============================================================================

/// Default [`Renderer`] for AsciiDoc and HTML output.
#[derive(Debug)]
pub struct PageBuilder {
    options: RenderOptions,
    layouts: Layouts,
}

impl PageBuilder {
    /// Create a renderer, loading layouts from the addons directory if set.
    ///
    /// Fails when the configured addons directory or one of its layouts
    /// cannot be read.
    pub fn new(options: &RenderOptions) -> Result<Self> {
        let layouts = match &options.addons {
            Some(addons) => Layouts::load(&addons.join(options.format.as_str()), options.format)?,
            None => Layouts::builtin(options.format),
        };
        Ok(Self {
            options: options.clone(),
            layouts,
        })
    }

    fn render_adoc(
        &self,
        catalog: &Catalog,
        node: &Node,
        locator: &Locator,
    ) -> Result<String, fmt::Error> {
        let mut out = String::with_capacity(512);

        if let Locator::Position(position) = locator {
            writeln!(out, "[[{position}]]")?;
        }
        let level = if self.options.multipage { "=" } else { "==" };
        writeln!(out, "{level} {}\n", node.qualified_name)?;
        writeln!(out, "[.kind]#{}#\n", node.kind)?;

        if let Some(declaration) = declaration(node) {
            writeln!(out, "[source,cpp]\n----\n{declaration}\n----\n")?;
        }

        for (kind, names) in member_groups(catalog, node) {
            writeln!(out, "={level} {}\n", kind.heading())?;
            for name in names {
                writeln!(out, "* `{name}`")?;
            }
            out.push('\n');
        }
        Ok(out)
    }

    fn render_html(
        &self,
        catalog: &Catalog,
        node: &Node,
        locator: &Locator,
    ) -> Result<String, fmt::Error> {
        let mut out = String::with_capacity(512);
        let title = escape_html(&node.qualified_name);

        match locator {
            Locator::Position(position) => {
                writeln!(out, "<section id=\"{position}\">\n<h2>{title}</h2>")?;
            }
            Locator::File(_) => {
                out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
                writeln!(out, "<title>{title}</title>\n</head>\n<body>\n<h1>{title}</h1>")?;
            }
        }
        writeln!(out, "<p class=\"kind\">{}</p>", node.kind)?;

        if let Some(declaration) = declaration(node) {
            writeln!(out, "<pre><code>{}</code></pre>", escape_html(&declaration))?;
        }

        for (kind, names) in member_groups(catalog, node) {
            writeln!(out, "<h3>{}</h3>\n<ul>", kind.heading())?;
            for name in names {
                writeln!(out, "<li><code>{}</code></li>", escape_html(name))?;
            }
            out.push_str("</ul>\n");
        }

        match locator {
            Locator::Position(_) => out.push_str("</section>\n"),
            Locator::File(_) => out.push_str("</body>\n</html>\n"),
        }
        Ok(out)
    }
}

impl Renderer for PageBuilder {
    fn render(&mut self, catalog: &Catalog, node: &Node, locator: &Locator) -> Result<String> {
        Ok(match self.options.format {
            Format::Adoc => self.render_adoc(catalog, node, locator)?,
            Format::Html => self.render_html(catalog, node, locator)?,
        })
    }

    fn render_header(&mut self) -> Result<String> {
        Ok(self.layouts.header.clone())
    }

    fn render_footer(&mut self) -> Result<String> {
        Ok(self.layouts.footer.clone())
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Source-like declaration for entities that have one.
fn declaration(node: &Node) -> Option<String> {
    let signature = node.signature.as_ref()?;
    Some(format!(
        "{} {}{};",
        signature.return_type,
        node.name,
        signature.arglist()
    ))
}

/// Children grouped by kind, in order of first appearance.
///
/// Overload sets are flattened into their functions.
fn member_groups<'a>(catalog: &'a Catalog, node: &'a Node) -> Vec<(Kind, Vec<&'a str>)> {
    let mut groups: Vec<(Kind, Vec<&'a str>)> = Vec::new();
    let mut push = |kind: Kind, name: &'a str| match groups.iter_mut().find(|(k, _)| *k == kind) {
        Some((_, names)) => names.push(name),
        None => groups.push((kind, vec![name])),
    };

    for child in catalog.children(node) {
        if child.kind == Kind::OverloadSet {
            for function in catalog.children(child) {
                push(function.kind, &function.name);
            }
        } else {
            push(child.kind, &child.name);
        }
    }
    groups
}

/// Escape special HTML characters.
fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogBuilder, NodeId, Param, Signature};

    fn sample() -> (Catalog, NodeId, NodeId) {
        let mut b = CatalogBuilder::new();
        let a = b.add(b.root(), Kind::Namespace, "a");
        b.add(a, Kind::Record, "S");
        let f = b.function(a, "f", Signature::new("int", vec![Param::new("int", "x")]));
        let set = b.add(a, Kind::OverloadSet, "g");
        b.function(set, "g", Signature::new("void", vec![]));
        b.function(set, "g", Signature::new("void", vec![Param::new("int", "")]));
        (b.build().unwrap(), a, f)
    }

    fn options(format: Format, multipage: bool) -> RenderOptions {
        RenderOptions {
            format,
            multipage,
            addons: None,
        }
    }

    #[test]
    fn test_adoc_function_page() {
        let (catalog, _, f) = sample();
        let mut builder = PageBuilder::new(&options(Format::Adoc, true)).unwrap();
        let node = catalog.get(f).unwrap();
        let page = builder
            .render(&catalog, node, &Locator::File("a/f.adoc".into()))
            .unwrap();

        assert!(page.starts_with("= a::f\n"));
        assert!(page.contains("[.kind]#function#"));
        assert!(page.contains("int f(int x);"));
        assert!(!page.contains("[[")); // no anchor in multi-page mode
    }

    #[test]
    fn test_adoc_page_layout() {
        let (catalog, _, f) = sample();
        let mut builder = PageBuilder::new(&options(Format::Adoc, false)).unwrap();
        let node = catalog.get(f).unwrap();
        let page = builder.render(&catalog, node, &Locator::Position(2)).unwrap();

        assert_eq!(
            page,
            "[[2]]\n== a::f\n\n[.kind]#function#\n\n[source,cpp]\n----\nint f(int x);\n----\n\n"
        );
    }

    #[test]
    fn test_adoc_single_page_anchor_and_members() {
        let (catalog, a, _) = sample();
        let mut builder = PageBuilder::new(&options(Format::Adoc, false)).unwrap();
        let node = catalog.get(a).unwrap();
        let page = builder.render(&catalog, node, &Locator::Position(1)).unwrap();

        assert!(page.starts_with("[[1]]\n== a\n"));
        assert!(page.contains("=== Types\n\n* `S`\n"));
        // overload members are listed under the function heading
        assert!(page.contains("=== Functions\n\n* `f`\n* `g`\n* `g`\n"));
    }

    #[test]
    fn test_html_escapes_and_wraps() {
        let mut b = CatalogBuilder::new();
        let op = b.function(
            b.root(),
            "operator<",
            Signature::new("bool", vec![Param::new("T const&", "rhs")]),
        );
        let catalog = b.build().unwrap();
        let node = catalog.get(op).unwrap();

        let mut single = PageBuilder::new(&options(Format::Html, false)).unwrap();
        let page = single.render(&catalog, node, &Locator::Position(4)).unwrap();
        assert!(page.starts_with("<section id=\"4\">\n<h2>operator&lt;</h2>"));
        assert!(page.contains("bool operator&lt;(T const&amp; rhs);"));
        assert!(page.ends_with("</section>\n"));

        let mut multi = PageBuilder::new(&options(Format::Html, true)).unwrap();
        let page = multi
            .render(&catalog, node, &Locator::File("operator_lt.html".into()))
            .unwrap();
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.ends_with("</html>\n"));
    }

    #[test]
    fn test_builtin_layouts() {
        let mut builder = PageBuilder::new(&options(Format::Adoc, false)).unwrap();
        assert_eq!(builder.render_header().unwrap(), ADOC_HEADER);
        assert_eq!(builder.render_footer().unwrap(), ADOC_FOOTER);
    }

    #[test]
    fn test_layout_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let layouts = dir.path().join("html");
        fs::create_dir_all(&layouts).unwrap();
        fs::write(layouts.join("single-header.html"), "<custom>").unwrap();

        let opts = RenderOptions {
            format: Format::Html,
            multipage: false,
            addons: Some(dir.path().to_path_buf()),
        };
        let mut builder = PageBuilder::new(&opts).unwrap();
        assert_eq!(builder.render_header().unwrap(), "<custom>");
        assert_eq!(builder.render_footer().unwrap(), HTML_FOOTER);
    }

    #[test]
    fn test_missing_addons_fails_construction() {
        let dir = tempfile::tempdir().unwrap();
        let opts = RenderOptions {
            format: Format::Adoc,
            multipage: true,
            addons: Some(dir.path().join("missing")),
        };
        let err = PageBuilder::new(&opts).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
