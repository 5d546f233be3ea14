//! Parallel page generation.
//!
//! Turns a [`Catalog`] into rendered pages using a fixed pool of workers, each
//! owning one [`Renderer`]:
//!
//! ```text
//! Catalog ──► WorkerPool (N renderers)
//!               │
//!               ├─ multi-page:  one task per page ──► <output>/<path>
//!               └─ single-page: header ─► pages ─► Aggregator ─► footer ──► <output>.<ext>
//!               │
//!               ▼
//!        PageAssignment ──► tag file (reference.tag.xml)
//! ```
//!
//! - **pool**: worker pool, per-slot renderers, completion barrier
//! - **multipage**: one file per page
//! - **single**: one ordered stream, via the aggregator
//! - **aggregator**: reorders out-of-order completions by position
//! - **tagfile**: Doxygen tag file writer
//! - **page**: page roles and locators

mod aggregator;
mod error;
mod multipage;
mod page;
mod pool;
mod single;
mod tagfile;

pub use error::{Failures, GenerateError};
pub use page::{Locator, PageAssignment, PageRole, count_pages, page_role};
pub use pool::WorkerPool;
pub use tagfile::{TagfileWriter, write_tagfile};

use crate::catalog::Catalog;
use crate::config::GenerateConfig;
use crate::log;
use crate::logger::PageProgress;
use crate::render::{LegibleNames, PageBuilder, Renderer};
use parking_lot::Mutex;
use std::fs;
use std::io::{BufWriter, IsTerminal};
use std::path::PathBuf;
use std::sync::Arc;

/// Result of one dispatch: where each page went and what failed.
#[derive(Debug)]
pub struct Outcome {
    pub pages: PageAssignment,
    pub failures: Failures,
}

/// Summary of a successful run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Report {
    /// Number of pages written.
    pub pages: usize,
    /// Output directory or single-page file; empty when nothing was written.
    pub output: PathBuf,
    pub tagfile: Option<PathBuf>,
}

/// Generate the reference with the built-in [`PageBuilder`].
pub fn generate(catalog: Arc<Catalog>, config: &GenerateConfig) -> Result<Report, Failures> {
    let options = config.render_options();
    generate_with(catalog, config, |_| PageBuilder::new(&options))
}

/// Generate the reference with renderers built by `make`, one per worker.
///
/// Every page is attempted even when some fail; all failures are returned
/// together once the run has drained.
pub fn generate_with<R, F>(
    catalog: Arc<Catalog>,
    config: &GenerateConfig,
    make: F,
) -> Result<Report, Failures>
where
    R: Renderer,
    F: FnMut(usize) -> anyhow::Result<R>,
{
    if catalog.is_empty() {
        log!("warn"; "catalog is empty, nothing to generate");
        return Ok(Report::default());
    }

    let pool = WorkerPool::new(config.concurrency, make)?;
    let total = count_pages(&catalog);
    log!("generate"; "{} pages, {} workers", total, pool.size());

    let progress = page_progress(total);
    let output = config.output_path();
    let outcome = if config.multipage {
        let names = LegibleNames::new(&catalog, config.format);
        multipage::build_multi_page(&pool, &catalog, &names, &output, progress.clone())
    } else {
        let stream = create_stream(&output)?;
        single::build_single_page(
            &pool,
            &catalog,
            stream,
            &output,
            &config.single_page_name(),
            progress.clone(),
        )?
    };
    if let Some(progress) = &progress {
        progress.finish();
    }

    let Outcome {
        pages,
        mut failures,
    } = outcome;

    let tagfile = if config.tagfile {
        let path = config.tagfile_path();
        match write_tagfile(&path, &catalog, &pages) {
            Ok(()) => {
                log!("tagfile"; "{}", path.display());
                Some(path)
            }
            Err(err) => {
                failures.push(err);
                None
            }
        }
    } else {
        None
    };

    failures.into_result()?;
    log!("generate"; "{} pages → {}", pages.len(), output.display());
    Ok(Report {
        pages: pages.len(),
        output,
        tagfile,
    })
}

/// Open the single-page output file, creating its directory.
fn create_stream(path: &std::path::Path) -> Result<Arc<Mutex<BufWriter<fs::File>>>, Failures> {
    let io = |err| GenerateError::Io(path.to_path_buf(), err);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io)?;
    }
    let file = fs::File::create(path).map_err(io)?;
    Ok(Arc::new(Mutex::new(BufWriter::new(file))))
}

/// Page progress bar, only on an interactive terminal.
fn page_progress(total: usize) -> Option<Arc<PageProgress>> {
    if !std::io::stdout().is_terminal() {
        return None;
    }
    PageProgress::new(total).map(Arc::new)
}

// ============================================================================
// Tests
// ============================================================================
