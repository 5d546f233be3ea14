//! Multi-page dispatch: one file per page.
//!
//! Paths come from the [`NamingPolicy`]; each task renders its entity and
//! writes the result to `<output>/<path>`, creating directories as needed.
//! There is no ordering between tasks.

use super::error::GenerateError;
use super::page::{Locator, PageAssignment, PageRole, page_role};
use super::pool::WorkerPool;
use super::Outcome;
use crate::catalog::{Catalog, NodeId};
use crate::logger::PageProgress;
use crate::render::{NamingPolicy, Renderer};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Render every page into its own file below `output` and wait for all of
/// them.
pub fn build_multi_page<R: Renderer>(
    pool: &WorkerPool<R>,
    catalog: &Arc<Catalog>,
    names: &dyn NamingPolicy,
    output: &Path,
    progress: Option<Arc<PageProgress>>,
) -> Outcome {
    let visitor = MultiPageVisitor {
        pool,
        catalog: Arc::clone(catalog),
        names,
        output,
        progress,
    };
    let pages = visitor.visit();
    let failures = pool.wait();
    Outcome { pages, failures }
}

struct MultiPageVisitor<'p, R: Renderer> {
    pool: &'p WorkerPool<R>,
    catalog: Arc<Catalog>,
    names: &'p dyn NamingPolicy,
    output: &'p Path,
    progress: Option<Arc<PageProgress>>,
}

impl<R: Renderer> MultiPageVisitor<'_, R> {
    fn visit(&self) -> PageAssignment {
        let mut pages = PageAssignment::multi();
        for node in self.catalog.entities() {
            match page_role(node.kind) {
                PageRole::Page => {}
                PageRole::Container | PageRole::Silent => continue,
            }
            let path = self.names.page_path(node);
            pages.assign(node.id, Locator::File(path.clone()));
            self.submit(node.id, path);
        }
        pages
    }

    fn submit(&self, id: NodeId, path: String) {
        let catalog = Arc::clone(&self.catalog);
        let target = self.output.join(&path);
        let progress = self.progress.clone();

        self.pool.submit(move |renderer: &mut R| {
            let node = catalog.get(id).ok_or(GenerateError::UnknownNode(id))?;
            let result = renderer.render(&catalog, node, &Locator::File(path));
            if let Some(progress) = &progress {
                progress.tick();
            }
            let text = result.map_err(|source| GenerateError::render(node, source))?;
            write_page(&target, &text)
        });
    }
}

/// Create or truncate `path` with `text`.
fn write_page(path: &Path, text: &str) -> Result<(), GenerateError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| GenerateError::Io(parent.to_path_buf(), err))?;
    }
    fs::write(path, text).map_err(|err| GenerateError::Io(PathBuf::from(path), err))
}

// ============================================================================
// Tests
// ============================================================================
