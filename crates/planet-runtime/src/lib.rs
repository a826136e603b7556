//! Background mesh worker: one thread, FIFO, nothing queued is ever dropped (engine-only).
#![forbid(unsafe_code)]

use std::io;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};

/// How long the worker blocks on the channel before re-checking for shutdown.
pub const POLL_INTERVAL: Duration = Duration::from_millis(10);

pub const DEFAULT_WORKER_NAME: &str = "planet-mesh";

/// A unit of background work. Runs exactly once, on the worker or, after
/// shutdown, on the thread that released the last queue handle.
pub trait Task: Send + 'static {
    fn execute(self);
}

impl<F: FnOnce() + Send + 'static> Task for F {
    fn execute(self) {
        self()
    }
}

#[derive(Default)]
struct Counters {
    enqueued: AtomicUsize,
    started: AtomicUsize,
    executed: AtomicUsize,
}

fn run_task<T: Task>(task: T, counters: &Counters) {
    counters.started.fetch_add(1, Ordering::AcqRel);
    if catch_unwind(AssertUnwindSafe(|| task.execute())).is_err() {
        log::error!("mesh task panicked; worker continues");
    }
    counters.executed.fetch_add(1, Ordering::AcqRel);
}

struct Inner<T: Task> {
    tx: Sender<T>,
    rx: Receiver<T>,
    counters: Arc<Counters>,
    shutdown: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
    name: String,
}

impl<T: Task> Drop for Inner<T> {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Release);
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                log::error!("{}: worker thread panicked", self.name);
            }
        }
        let mut leftover = 0usize;
        for task in self.rx.try_iter() {
            run_task(task, &self.counters);
            leftover += 1;
        }
        log::debug!(
            "{}: stopped after {} tasks ({} run at shutdown)",
            self.name,
            self.counters.executed.load(Ordering::Acquire),
            leftover
        );
    }
}

/// Handle to the background worker. Clones share one worker; the last handle
/// to go away stops it and runs whatever is still queued.
pub struct MeshQueue<T: Task> {
    inner: Arc<Inner<T>>,
}

impl<T: Task> Clone for MeshQueue<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Task> MeshQueue<T> {
    pub fn start() -> io::Result<Self> {
        Self::start_named(DEFAULT_WORKER_NAME)
    }

    pub fn start_named(name: &str) -> io::Result<Self> {
        let (tx, rx) = unbounded::<T>();
        let counters = Arc::new(Counters::default());
        let shutdown = Arc::new(AtomicBool::new(false));

        let worker = {
            let rx = rx.clone();
            let counters = Arc::clone(&counters);
            let shutdown = Arc::clone(&shutdown);
            thread::Builder::new().name(name.to_string()).spawn(move || {
                while !shutdown.load(Ordering::Acquire) {
                    match rx.recv_timeout(POLL_INTERVAL) {
                        Ok(task) => run_task(task, &counters),
                        Err(RecvTimeoutError::Timeout) => {}
                        Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
            })?
        };
        log::debug!("{name}: worker started");

        Ok(Self {
            inner: Arc::new(Inner {
                tx,
                rx,
                counters,
                shutdown,
                worker: Some(worker),
                name: name.to_string(),
            }),
        })
    }

    pub fn enqueue(&self, task: T) {
        self.inner.counters.enqueued.fetch_add(1, Ordering::AcqRel);
        if self.inner.tx.send(task).is_err() {
            self.inner.counters.enqueued.fetch_sub(1, Ordering::AcqRel);
            log::error!("{}: dropping task, channel closed", self.inner.name);
        }
    }

    /// Tasks enqueued but not yet started.
    pub fn pending(&self) -> usize {
        let c = &self.inner.counters;
        c.enqueued
            .load(Ordering::Acquire)
            .saturating_sub(c.started.load(Ordering::Acquire))
    }

    pub fn executed(&self) -> usize {
        self.inner.counters.executed.load(Ordering::Acquire)
    }

    pub fn is_idle(&self) -> bool {
        let c = &self.inner.counters;
        c.executed.load(Ordering::Acquire) == c.enqueued.load(Ordering::Acquire)
    }

    /// Blocks until every task enqueued so far has finished, or `timeout` elapses.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while !self.is_idle() {
            if Instant::now() >= deadline {
                return false;
            }
            thread::sleep(Duration::from_millis(1));
        }
        true
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Releases this handle. When it is the last one, blocks until the worker
    /// has stopped and all remaining tasks have run on this thread.
    pub fn release(self) {
        drop(self);
    }
}
