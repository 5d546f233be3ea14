//! Fixed-size worker pool with one renderer per worker.
//!
//! Tasks are fire-and-forget closures that borrow the renderer of whichever
//! worker runs them. [`WorkerPool::wait`] blocks until every task submitted
//! so far has finished and hands back the failures recorded since the last
//! wait.
//!
//! ```text
//! submit ──► rayon pool (N threads) ──► slot[current_thread_index] ──► task(&mut R)
//!                                                   │
//!                                      outstanding -= 1, failures.push(..)
//!                                                   │
//! wait  ◄──────────────── Condvar (outstanding == 0)
//! ```

use super::error::{Failures, GenerateError};
use crate::render::Renderer;
use parking_lot::{Condvar, Mutex};
use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

type Task<R> = Box<dyn FnOnce(&mut R) -> Result<(), GenerateError> + Send + 'static>;

/// Completion bookkeeping shared with every task.
#[derive(Default)]
struct Completion {
    state: Mutex<Progress>,
    done: Condvar,
}

#[derive(Default)]
struct Progress {
    outstanding: usize,
    failures: Failures,
}

impl Completion {
    fn begin(&self) {
        self.state.lock().outstanding += 1;
    }

    fn end(&self, result: Result<(), GenerateError>) {
        let mut state = self.state.lock();
        if let Err(err) = result {
            state.failures.push(err);
        }
        state.outstanding -= 1;
        if state.outstanding == 0 {
            self.done.notify_all();
        }
    }
}

/// Pool of `size` workers, each owning one renderer.
pub struct WorkerPool<R: Renderer> {
    threads: rayon::ThreadPool,
    slots: Arc<[Mutex<R>]>,
    completion: Arc<Completion>,
}

impl<R: Renderer> WorkerPool<R> {
    /// Build a pool and one renderer per worker.
    ///
    /// `size == 0` means one worker per available core. Renderers are created
    /// up front; the first construction failure aborts the pool.
    pub fn new<F>(size: usize, mut make: F) -> Result<Self, GenerateError>
    where
        F: FnMut(usize) -> anyhow::Result<R>,
    {
        let size = if size == 0 { default_size() } else { size };

        let slots = (0..size)
            .map(|slot| {
                make(slot)
                    .map(Mutex::new)
                    .map_err(|source| GenerateError::Construction { slot, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let threads = rayon::ThreadPoolBuilder::new()
            .num_threads(size)
            .thread_name(|i| format!("refgen-worker-{i}"))
            .build()?;

        Ok(Self {
            threads,
            slots: slots.into(),
            completion: Arc::default(),
        })
    }

    /// Number of workers.
    pub fn size(&self) -> usize {
        self.slots.len()
    }

    /// Queue a task. Returns immediately.
    ///
    /// A task that returns an error or panics is recorded as a failure; it
    /// never takes the pool down.
    pub fn submit<F>(&self, task: F)
    where
        F: FnOnce(&mut R) -> Result<(), GenerateError> + Send + 'static,
    {
        let task: Task<R> = Box::new(task);
        let slots = Arc::clone(&self.slots);
        let completion = Arc::clone(&self.completion);

        completion.begin();
        self.threads.spawn(move || {
            let slot = rayon::current_thread_index().unwrap_or_default() % slots.len();
            let result = catch_unwind(AssertUnwindSafe(|| {
                let mut renderer = slots[slot].lock();
                task(&mut *renderer)
            }))
            .unwrap_or_else(|payload| Err(GenerateError::Panicked(panic_message(&*payload))));
            completion.end(result);
        });
    }

    /// Block until all submitted tasks have finished.
    ///
    /// Returns the failures recorded since the previous call. Each failure is
    /// returned exactly once.
    pub fn wait(&self) -> Failures {
        let mut state = self.completion.state.lock();
        while state.outstanding > 0 {
            self.completion.done.wait(&mut state);
        }
        std::mem::take(&mut state.failures)
    }
}

/// One worker per available core.
fn default_size() -> usize {
    std::thread::available_parallelism().map_or(1, |n| n.get())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

// ============================================================================
// Tests
// ============================================================================
