//! Ordered output for single-page mode.
//!
//! Pages are rendered in any order but must reach the stream in position
//! order. Each finished page [`fill`](Aggregator::fill)s its slot; the longest
//! run of consecutive filled slots starting at the cursor is written out at
//! once.
//!
//! ```text
//! cursor=2   pending: {3: "..", 5: ".."}
//! fill(2)  → writes 2, 3        cursor=4   pending: {5}
//! fill(4)  → writes 4, 5        cursor=6   pending: {}
//! ```
//!
//! Exactly one filler at a time acts as the writer. Any other filler that
//! completes a run queues it and returns at once; the writer keeps draining
//! the queue until it is empty. The reorder state is released around every
//! write, so no fill ever waits on stream I/O.

use parking_lot::{Mutex, MutexGuard};
use rustc_hash::FxHashMap;
use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::Arc;

#[derive(Debug, Default)]
struct Reorder {
    /// Next position to release.
    cursor: usize,
    /// Filled slots after the cursor, not yet released.
    pending: FxHashMap<usize, String>,
    /// Released text waiting for the writer, in position order.
    ready: VecDeque<String>,
    /// Some filler is writing `ready` to the stream.
    writing: bool,
    /// Largest number of slots ever buffered at once.
    peak: usize,
}

/// Reorders page text into position order before writing it to `W`.
pub struct Aggregator<W: Write> {
    state: Mutex<Reorder>,
    stream: Arc<Mutex<W>>,
    /// First stream error; later writes keep being attempted.
    error: Mutex<Option<io::Error>>,
}

impl<W: Write> Aggregator<W> {
    pub fn new(stream: Arc<Mutex<W>>) -> Self {
        Self {
            state: Mutex::default(),
            stream,
            error: Mutex::new(None),
        }
    }

    /// Fill slot `position` with `text` and flush whatever became contiguous.
    ///
    /// # Panics
    ///
    /// If the slot was already filled.
    pub fn fill(&self, position: usize, text: String) {
        let mut state = self.state.lock();
        let reorder = &mut *state;
        assert!(
            position >= reorder.cursor && !reorder.pending.contains_key(&position),
            "page {position} filled twice"
        );
        reorder.pending.insert(position, text);
        reorder.peak = reorder.peak.max(reorder.pending.len());

        while let Some(text) = reorder.pending.remove(&reorder.cursor) {
            reorder.ready.push_back(text);
            reorder.cursor += 1;
        }
        if reorder.writing || reorder.ready.is_empty() {
            return;
        }

        state.writing = true;
        while !state.ready.is_empty() {
            let run = std::mem::take(&mut state.ready);
            MutexGuard::unlocked(&mut state, || self.write_run(run));
        }
        state.writing = false;
    }

    fn write_run(&self, run: VecDeque<String>) {
        let mut stream = self.stream.lock();
        for text in run {
            if let Err(err) = stream.write_all(text.as_bytes()) {
                self.record(err);
                break;
            }
        }
    }

    fn record(&self, err: io::Error) {
        let mut error = self.error.lock();
        if error.is_none() {
            *error = Some(err);
        }
    }

    /// Largest number of slots buffered at once.
    pub fn peak(&self) -> usize {
        self.state.lock().peak
    }

    /// Check that all `assigned` slots were written and report the first
    /// stream error, if any.
    ///
    /// # Panics
    ///
    /// If a slot is still missing: every assigned position must be filled
    /// before the stream is closed.
    pub fn finish(&self, assigned: usize) -> io::Result<()> {
        {
            let state = self.state.lock();
            assert!(
                state.cursor == assigned
                    && state.pending.is_empty()
                    && state.ready.is_empty()
                    && !state.writing,
                "{} of {assigned} pages released, {} still buffered",
                state.cursor,
                state.pending.len() + state.ready.len()
            );
        }
        match self.error.lock().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

// ============================================================================
// Slot guard
// ============================================================================

/// Obligation to fill one position.
///
/// Dropping the guard unfilled (render error, panic) fills the slot with empty
/// text, so the pages after it are never stalled.
pub struct Slot<W: Write> {
    aggregator: Arc<Aggregator<W>>,
    position: usize,
    filled: bool,
}

impl<W: Write> Slot<W> {
    pub fn new(aggregator: Arc<Aggregator<W>>, position: usize) -> Self {
        Self {
            aggregator,
            position,
            filled: false,
        }
    }

    pub fn fill(mut self, text: String) {
        self.filled = true;
        self.aggregator.fill(self.position, text);
    }
}

impl<W: Write> Drop for Slot<W> {
    fn drop(&mut self) {
        if !self.filled {
            self.aggregator.fill(self.position, String::new());
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::{Duration, Instant};

    type Buffer = Arc<Mutex<Vec<u8>>>;

    fn aggregator() -> (Arc<Aggregator<Vec<u8>>>, Buffer) {
        let buffer = Buffer::default();
        (Arc::new(Aggregator::new(Arc::clone(&buffer))), buffer)
    }

    fn contents(buffer: &Buffer) -> String {
        String::from_utf8(buffer.lock().clone()).unwrap()
    }

    /// Deterministic permutation of `0..n`.
    fn shuffled(n: usize, seed: u64) -> Vec<usize> {
        let mut order: Vec<usize> = (0..n).collect();
        let mut state = seed;
        for i in (1..n).rev() {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let j = (state >> 33) as usize % (i + 1);
            order.swap(i, j);
        }
        order
    }

    #[test]
    fn test_in_order_fill_writes_immediately() {
        let (agg, buffer) = aggregator();
        agg.fill(0, "a".into());
        assert_eq!(contents(&buffer), "a");
        agg.fill(1, "b".into());
        assert_eq!(contents(&buffer), "ab");
        assert_eq!(agg.peak(), 1);
        agg.finish(2).unwrap();
    }

    #[test]
    fn test_reverse_fill_buffers_until_first() {
        let (agg, buffer) = aggregator();
        for i in (1..5).rev() {
            agg.fill(i, i.to_string());
            assert_eq!(contents(&buffer), "");
        }

        agg.fill(0, "0".into());
        assert_eq!(contents(&buffer), "01234");
        assert_eq!(agg.peak(), 5);
        agg.finish(5).unwrap();
    }

    #[test]
    fn test_any_order_gives_same_output() {
        let expected: String = (0..40).map(|i| format!("<{i}>")).collect();
        for seed in 0..8 {
            let (agg, buffer) = aggregator();
            for i in shuffled(40, seed) {
                agg.fill(i, format!("<{i}>"));
            }
            agg.finish(40).unwrap();
            assert_eq!(contents(&buffer), expected, "seed {seed}");
        }
    }

    #[test]
    fn test_concurrent_fills() {
        let (agg, buffer) = aggregator();
        let order = shuffled(200, 42);
        std::thread::scope(|s| {
            for chunk in order.chunks(25) {
                let agg = &agg;
                s.spawn(move || {
                    for &i in chunk {
                        agg.fill(i, format!("{i},"));
                    }
                });
            }
        });
        agg.finish(200).unwrap();

        let expected: String = (0..200).map(|i| format!("{i},")).collect();
        assert_eq!(contents(&buffer), expected);
    }

    #[test]
    fn test_empty_text_advances_cursor() {
        let (agg, buffer) = aggregator();
        agg.fill(1, "b".into());
        agg.fill(0, String::new());
        assert_eq!(contents(&buffer), "b");
        agg.finish(2).unwrap();
    }

    #[test]
    fn test_dropped_slot_fills_empty() {
        let (agg, buffer) = aggregator();
        let first = Slot::new(Arc::clone(&agg), 0);
        Slot::new(Arc::clone(&agg), 1).fill("b".into());
        assert_eq!(contents(&buffer), "");

        drop(first);
        assert_eq!(contents(&buffer), "b");
        agg.finish(2).unwrap();
    }

    #[test]
    #[should_panic(expected = "filled twice")]
    fn test_double_fill_panics() {
        let (agg, _) = aggregator();
        agg.fill(0, "a".into());
        agg.fill(0, "again".into());
    }

    #[test]
    #[should_panic(expected = "still buffered")]
    fn test_finish_with_gap_panics() {
        let (agg, _) = aggregator();
        agg.fill(0, "a".into());
        agg.fill(2, "c".into());
        let _ = agg.finish(3);
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("disk full"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Sink that announces each write, then takes `delay` to complete it.
    struct Slow {
        started: mpsc::Sender<()>,
        delay: Duration,
        out: Vec<u8>,
    }

    impl Write for Slow {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let _ = self.started.send(());
            std::thread::sleep(self.delay);
            self.out.extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_fill_never_waits_for_stream_io() {
        let (started, writing) = mpsc::channel();
        let stream = Arc::new(Mutex::new(Slow {
            started,
            delay: Duration::from_millis(200),
            out: Vec::new(),
        }));
        let agg = Aggregator::new(Arc::clone(&stream));

        std::thread::scope(|s| {
            s.spawn(|| agg.fill(0, "a".into()));
            writing.recv().unwrap();

            // Page 0 is being written: the next run is queued for that
            // writer and a later page is only buffered.
            let begin = Instant::now();
            agg.fill(1, "b".into());
            agg.fill(10, "k".into());
            let waited = begin.elapsed();
            assert!(waited < Duration::from_millis(100), "fills waited {waited:?}");

            for i in 2..10 {
                agg.fill(i, char::from(b'a' + i as u8).to_string());
            }
        });

        agg.finish(11).unwrap();
        assert_eq!(stream.lock().out, b"abcdefghijk");
    }

    #[test]
    fn test_stream_error_reported_once() {
        let agg = Aggregator::new(Arc::new(Mutex::new(Broken)));
        for i in 0..3 {
            agg.fill(i, "x".into());
        }
        let err = agg.finish(3).unwrap_err();
        assert_eq!(err.to_string(), "disk full");
        assert!(agg.finish(3).is_ok());
    }
}
