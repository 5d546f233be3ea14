//! Single-page dispatch: every page into one ordered stream.
//!
//! # Phases
//!
//! 1. Header task, then wait. A failed header aborts the run.
//! 2. Pre-order traversal assigns positions 0, 1, 2, ... and submits one task
//!    per page; each task fills its slot in the [`Aggregator`]. Wait.
//! 3. Footer task, then wait. Skipped when any page failed.
//!
//! Header, pages and footer never interleave: each phase is drained before
//! the next one starts.

use super::aggregator::{Aggregator, Slot};
use super::error::{Failures, GenerateError};
use super::page::{Locator, PageAssignment, PageRole, page_role};
use super::pool::WorkerPool;
use super::Outcome;
use crate::catalog::{Catalog, NodeId};
use crate::log;
use crate::logger::PageProgress;
use crate::render::Renderer;
use parking_lot::Mutex;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, Copy)]
enum Layout {
    Header,
    Footer,
}

impl Layout {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::Footer => "footer",
        }
    }
}

/// Write header, all pages in position order, then footer, to `stream`.
///
/// `label` names the stream in I/O errors; `stream_name` is the file name the
/// tag file points at. Returns `Err` only when the header fails; page and
/// footer failures are reported in the [`Outcome`].
pub fn build_single_page<R, W>(
    pool: &WorkerPool<R>,
    catalog: &Arc<Catalog>,
    stream: Arc<Mutex<W>>,
    label: &Path,
    stream_name: &str,
    progress: Option<Arc<PageProgress>>,
) -> Result<Outcome, Failures>
where
    R: Renderer,
    W: Write + Send + 'static,
{
    submit_layout(pool, &stream, label, Layout::Header);
    pool.wait().into_result()?;

    let aggregator = Arc::new(Aggregator::new(Arc::clone(&stream)));
    let visitor = SinglePageVisitor {
        pool,
        catalog: Arc::clone(catalog),
        aggregator: Arc::clone(&aggregator),
        progress,
    };
    let mut pages = PageAssignment::single(stream_name);
    let assigned = visitor.visit(&mut pages);

    let mut failures = pool.wait();
    if let Err(err) = aggregator.finish(assigned) {
        failures.push(GenerateError::Io(label.to_path_buf(), err));
    }
    log!("generate"; "{assigned} pages in order, at most {} held back", aggregator.peak());

    if failures.is_empty() {
        submit_layout(pool, &stream, label, Layout::Footer);
        failures = pool.wait();
    }

    if let Err(err) = stream.lock().flush() {
        failures.push(GenerateError::Io(label.to_path_buf(), err));
    }

    Ok(Outcome { pages, failures })
}

fn submit_layout<R, W>(pool: &WorkerPool<R>, stream: &Arc<Mutex<W>>, label: &Path, layout: Layout)
where
    R: Renderer,
    W: Write + Send + 'static,
{
    let stream = Arc::clone(stream);
    let label = label.to_path_buf();
    pool.submit(move |renderer: &mut R| {
        let text = match layout {
            Layout::Header => renderer.render_header(),
            Layout::Footer => renderer.render_footer(),
        }
        .map_err(|source| GenerateError::Layout {
            layout: layout.as_str(),
            source,
        })?;
        stream
            .lock()
            .write_all(text.as_bytes())
            .map_err(|err| GenerateError::Io(label, err))
    });
}

// ============================================================================
// Visitor
// ============================================================================

/// Assigns positions in pre-order and submits one task per page.
struct SinglePageVisitor<'p, R: Renderer, W: Write> {
    pool: &'p WorkerPool<R>,
    catalog: Arc<Catalog>,
    aggregator: Arc<Aggregator<W>>,
    progress: Option<Arc<PageProgress>>,
}

impl<R, W> SinglePageVisitor<'_, R, W>
where
    R: Renderer,
    W: Write + Send + 'static,
{
    /// Returns the number of positions assigned.
    fn visit(&self, pages: &mut PageAssignment) -> usize {
        let mut position = 0;
        for node in self.catalog.entities() {
            match page_role(node.kind) {
                PageRole::Page => {}
                PageRole::Container | PageRole::Silent => continue,
            }
            pages.assign(node.id, Locator::Position(position));
            self.submit(node.id, position);
            position += 1;
        }
        position
    }

    fn submit(&self, id: NodeId, position: usize) {
        let catalog = Arc::clone(&self.catalog);
        let slot = Slot::new(Arc::clone(&self.aggregator), position);
        let progress = self.progress.clone();

        self.pool.submit(move |renderer: &mut R| {
            let node = catalog.get(id).ok_or(GenerateError::UnknownNode(id))?;
            let result = renderer.render(&catalog, node, &Locator::Position(position));
            if let Some(progress) = &progress {
                progress.tick();
            }
            // A failed render leaves the slot to its drop guard.
            slot.fill(result.map_err(|source| GenerateError::render(node, source))?);
            Ok(())
        });
    }
}

// ============================================================================
// Tests
// ============================================================================
