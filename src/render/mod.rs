//! Page rendering.
//!
//! The engine treats rendering as a black box: a [`Renderer`] turns one
//! catalog entity into page text or an error. Renderers are stateful and
//! expensive to construct, so the worker pool creates exactly one per worker
//! slot and reuses it for every task that slot runs.
//!
//! - **builder**: [`PageBuilder`], the default AsciiDoc/HTML renderer
//! - **names**: [`LegibleNames`], the default page naming policy

mod builder;
mod names;

pub use builder::PageBuilder;
pub use names::{LegibleNames, NamingPolicy};

use crate::catalog::{Catalog, Node};
use crate::generator::Locator;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================================
// Renderer
// ============================================================================

/// Stateful per-worker page renderer.
///
/// A renderer is only ever driven by one task at a time, so implementations
/// may keep mutable caches without synchronization.
pub trait Renderer: Send + 'static {
    /// Render the page of one entity.
    ///
    /// `locator` is where the page lands: its own file in multi-page mode, or
    /// its position in single-page mode.
    fn render(&mut self, catalog: &Catalog, node: &Node, locator: &Locator)
    -> anyhow::Result<String>;

    /// Text written once before all pages of a single-page document.
    fn render_header(&mut self) -> anyhow::Result<String>;

    /// Text written once after all pages of a single-page document.
    fn render_footer(&mut self) -> anyhow::Result<String>;
}

// ============================================================================
// Options
// ============================================================================

/// Output markup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// AsciiDoc (default).
    #[default]
    Adoc,
    Html,
}

impl Format {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Adoc => "adoc",
            Self::Html => "html",
        }
    }

    /// File extension of generated pages, without the dot.
    pub const fn extension(self) -> &'static str {
        self.as_str()
    }
}

/// Options shared by every renderer of one run.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub format: Format,
    pub multipage: bool,
    /// Directory holding layout overrides (`<addons>/<format>/...`).
    pub addons: Option<PathBuf>,
}
