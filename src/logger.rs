//! Terminal output: colored log lines and the page progress bar.
//!
//! ```ignore
//! log!("generate"; "{} pages, {} workers", pages, workers);
//!
//! if let Some(progress) = PageProgress::new(pages) {
//!     progress.tick(); // from any worker
//!     progress.finish();
//! }
//! ```
//!
//! While the bar is on screen it owns the last terminal line; log lines are
//! printed above it.

use colored::{ColoredString, Colorize};
use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType, size},
};
use parking_lot::Mutex;
use std::{
    io::{Write, stdout},
    sync::{
        OnceLock,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

/// Terminal width, detected once; 120 columns when unknown.
static WIDTH: OnceLock<usize> = OnceLock::new();

/// A progress bar currently occupies the last line.
static BAR_SHOWN: AtomicBool = AtomicBool::new(false);

const MIN_BAR_CELLS: usize = 10;
const MAX_BAR_CELLS: usize = 40;

fn width() -> usize {
    *WIDTH.get_or_init(|| size().map_or(120, |(w, _)| usize::from(w)))
}

/// Display width of `[module] `.
const fn prefix_width(module: &str) -> usize {
    module.len() + 3
}

// ============================================================================
// Log Macro
// ============================================================================

/// Log a message with a colored module prefix.
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Print `[module] message`, truncated to the terminal width.
///
/// Multi-line messages (error chains) are printed whole.
pub fn log(module: &str, message: &str) {
    let prefix = colorize_prefix(module);
    let mut out = stdout().lock();

    let bar = BAR_SHOWN.load(Ordering::SeqCst);
    if bar {
        execute!(out, cursor::MoveUp(1), Clear(ClearType::FromCursorDown)).ok();
    } else {
        execute!(out, Clear(ClearType::UntilNewLine)).ok();
    }

    if message.contains('\n') {
        writeln!(out, "{prefix} {message}").ok();
    } else {
        let room = width().saturating_sub(prefix_width(module));
        writeln!(out, "{prefix} {}", truncate_str(message, room)).ok();
    }

    // give the bar its line back; the next tick redraws it
    if bar {
        writeln!(out).ok();
    }
    out.flush().ok();
}

// ============================================================================
// Progress
// ============================================================================

/// `[pages] [████░░░░] 42/100`, shared by all workers.
pub struct PageProgress {
    label: ColoredString,
    total: usize,
    done: AtomicUsize,
    /// Serializes redraws; `true` once the bar is cleared.
    finished: Mutex<bool>,
}

impl PageProgress {
    const LABEL: &'static str = "pages";

    /// Reserve a line for a bar over `total` pages.
    ///
    /// Returns `None` for one page or fewer.
    pub fn new(total: usize) -> Option<Self> {
        if total <= 1 {
            return None;
        }
        let mut out = stdout().lock();
        writeln!(out).ok();
        out.flush().ok();
        BAR_SHOWN.store(true, Ordering::SeqCst);

        Some(Self {
            label: colorize_prefix(Self::LABEL),
            total,
            done: AtomicUsize::new(0),
            finished: Mutex::new(false),
        })
    }

    /// Count one more finished page and redraw.
    pub fn tick(&self) {
        let done = self.done.fetch_add(1, Ordering::Relaxed) + 1;
        let finished = self.finished.lock();
        if *finished {
            return;
        }

        let count = format!("{done}/{}", self.total);
        // "[pages] " + "[" + cells + "] " + count
        let overhead = prefix_width(Self::LABEL) + 3 + count.len();
        let cells = width()
            .saturating_sub(overhead)
            .clamp(MIN_BAR_CELLS, MAX_BAR_CELLS);
        let (filled, empty) = bar_split(done, self.total, cells);

        let mut out = stdout().lock();
        execute!(out, cursor::MoveUp(1), Clear(ClearType::CurrentLine)).ok();
        write!(
            out,
            "{} [{}{}] {count}",
            self.label,
            "█".repeat(filled),
            "░".repeat(empty)
        )
        .ok();
        execute!(out, cursor::MoveDown(1)).ok();
        write!(out, "\r").ok();
        out.flush().ok();
    }

    /// Clear the bar. Only the first call has an effect.
    pub fn finish(&self) {
        let mut finished = self.finished.lock();
        if std::mem::replace(&mut *finished, true) {
            return;
        }
        BAR_SHOWN.store(false, Ordering::SeqCst);

        let mut out = stdout().lock();
        execute!(out, cursor::MoveUp(1), Clear(ClearType::CurrentLine)).ok();
        out.flush().ok();
    }
}

impl Drop for PageProgress {
    fn drop(&mut self) {
        self.finish();
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Filled and empty cell counts for `done` of `total` in `cells`.
const fn bar_split(done: usize, total: usize, cells: usize) -> (usize, usize) {
    let filled = if total == 0 {
        0
    } else if done >= total {
        cells
    } else {
        done * cells / total
    };
    (filled, cells - filled)
}

fn colorize_prefix(module: &str) -> ColoredString {
    let prefix = format!("[{module}]");
    match module.to_ascii_lowercase().as_str() {
        "generate" => prefix.bright_blue().bold(),
        "tagfile" => prefix.bright_green().bold(),
        "error" => prefix.bright_red().bold(),
        "warn" => prefix.bright_magenta().bold(),
        _ => prefix.bright_yellow().bold(),
    }
}

/// Longest prefix of `s` within `max_len` bytes, cut on a char boundary.
fn truncate_str(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }
    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_width() {
        assert_eq!(prefix_width("a"), 4);
        assert_eq!(prefix_width("generate"), "[generate] ".len());
        assert_eq!(prefix_width(""), 3);
    }

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 5), "hello");
        assert_eq!(truncate_str("hello world", 5), "hello");
        assert_eq!(truncate_str("hello", 0), "");
        // "€" is 3 bytes
        assert_eq!(truncate_str("€€", 4), "€");
        assert_eq!(truncate_str("a€b", 2), "a");
    }

    #[test]
    fn test_bar_split() {
        assert_eq!(bar_split(0, 100, 10), (0, 10));
        assert_eq!(bar_split(50, 100, 10), (5, 5));
        assert_eq!(bar_split(100, 100, 10), (10, 0));
        assert_eq!(bar_split(120, 100, 10), (10, 0));
        assert_eq!(bar_split(3, 0, 10), (0, 10));
    }

    #[test]
    fn test_no_bar_for_trivial_runs() {
        assert!(PageProgress::new(0).is_none());
        assert!(PageProgress::new(1).is_none());
    }
}
