//! The batch driver: resize a list of files one at a time, in order.
//!
//! For each file the driver runs load → qualify → scale → encode to scratch →
//! size-gated replace, then reports progress. A file that fails is counted
//! and logged; the batch moves on. The only way a run stops early is
//! cancellation, which is polled between files and never interrupts a file
//! already in flight. Files committed before a cancel stay committed.
//!
//! ```text
//! Idle ──run──▶ Running ──list exhausted──▶ Completed
//!                  │
//!                  └────cancel observed────▶ Canceled
//! ```
//!
//! [`run_batch`] does the work on the calling thread. [`spawn_batch`] runs it
//! on a dedicated worker and delivers the completion callback through a
//! caller-supplied [`Dispatcher`], so a caller with thread affinity (a UI
//! loop, the CLI's main thread) gets the report on its own thread.

use crate::imaging::{
    BackendError, ImageBackend, Quality, qualifies, rescale_to_file, resize_one, scale_factor,
};
use crate::output::{format_size, progress_note};
use crate::replace::{Replacement, safe_replace, scratch_for};
use crate::report::{BatchReport, ResizeOutcome, SkipReason, Tally};
use crate::types::ResizeRequest;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use thiserror::Error;

/// Why a single file could not be resized.
#[derive(Error, Debug)]
pub enum ResizeError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Lifecycle of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Idle,
    Running,
    Completed,
    Canceled,
}

/// Progress and cancellation collaborator.
///
/// The driver calls `set_note` before each file, `set_progress` after it
/// (whatever the outcome), `is_canceled` before starting the next one, and
/// `close` exactly once at the end. Nothing here assumes a screen exists.
pub trait ProgressMonitor {
    fn set_note(&mut self, note: &str);
    /// Number of files finished so far.
    fn set_progress(&mut self, done: usize);
    fn is_canceled(&self) -> bool;
    fn close(&mut self);
}

/// Shared cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_canceled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Monitor that reports nothing and cancels when its token is tripped.
#[derive(Debug, Clone, Default)]
pub struct NullMonitor {
    pub token: CancelToken,
}

impl NullMonitor {
    pub fn new(token: CancelToken) -> Self {
        Self { token }
    }
}

impl ProgressMonitor for NullMonitor {
    fn set_note(&mut self, _note: &str) {}
    fn set_progress(&mut self, _done: usize) {}
    fn is_canceled(&self) -> bool {
        self.token.is_canceled()
    }
    fn close(&mut self) {}
}

// ============================================================================
// Completion dispatch
// ============================================================================

/// A unit of work handed to a [`Dispatcher`].
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Decides which thread runs the completion callback.
pub trait Dispatcher: Send + 'static {
    fn dispatch(&self, task: Task);
}

/// Runs tasks right away on the worker thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct Immediate;

impl Dispatcher for Immediate {
    fn dispatch(&self, task: Task) {
        task();
    }
}

/// Sending half of a [`task_queue`].
#[derive(Clone)]
pub struct QueueDispatcher(mpsc::Sender<Task>);

impl Dispatcher for QueueDispatcher {
    fn dispatch(&self, task: Task) {
        // A dropped queue means the caller stopped listening.
        if self.0.send(task).is_err() {
            tracing::debug!("completion dropped: task queue closed");
        }
    }
}

/// Receiving half of a [`task_queue`], pumped by the thread that owns it.
pub struct TaskQueue(mpsc::Receiver<Task>);

impl TaskQueue {
    /// Block for the next task and run it. Returns `false` once every
    /// dispatcher is gone and the queue is empty.
    pub fn run_next(&self) -> bool {
        match self.0.recv() {
            Ok(task) => {
                task();
                true
            }
            Err(_) => false,
        }
    }

    /// Run whatever is queued without blocking. Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        while let Ok(task) = self.0.try_recv() {
            task();
            ran += 1;
        }
        ran
    }
}

/// A dispatcher plus the queue its tasks land in.
pub fn task_queue() -> (QueueDispatcher, TaskQueue) {
    let (tx, rx) = mpsc::channel();
    (QueueDispatcher(tx), TaskQueue(rx))
}

// ============================================================================
// Driver
// ============================================================================

/// Run the whole request on the current thread and return the final report.
///
/// Outcomes are logged through `tracing`; failures carry the full error.
pub fn run_batch<B, M>(backend: &B, request: &ResizeRequest, monitor: &mut M) -> BatchReport
where
    B: ImageBackend,
    M: ProgressMonitor + ?Sized,
{
    let mut state = BatchState::Idle;
    let mut tally = Tally::default();
    tracing::info!("resizing up to {} files", request.files().len());

    state = transition(state, BatchState::Running);
    for (index, file) in request.files().iter().enumerate() {
        if monitor.is_canceled() {
            state = transition(state, BatchState::Canceled);
            break;
        }

        monitor.set_note(&progress_note(file));
        let outcome = process_file(backend, request, file);
        log_outcome(file, &outcome);
        tally.record(&outcome);
        monitor.set_progress(index + 1);
    }
    if state == BatchState::Running {
        state = transition(state, BatchState::Completed);
    }

    monitor.close();
    tally.freeze(state == BatchState::Canceled)
}

fn transition(from: BatchState, to: BatchState) -> BatchState {
    tracing::debug!("batch {:?} -> {:?}", from, to);
    to
}

/// Run one file through the pipeline, containing any error as `Failed`.
pub fn process_file<B: ImageBackend>(
    backend: &B,
    request: &ResizeRequest,
    file: &Path,
) -> ResizeOutcome {
    match try_resize(backend, request, file) {
        Ok(outcome) => outcome,
        Err(err) => ResizeOutcome::Failed(err),
    }
}

fn try_resize<B: ImageBackend>(
    backend: &B,
    request: &ResizeRequest,
    file: &Path,
) -> Result<ResizeOutcome, ResizeError> {
    let image = backend.load(file)?;
    let dims = backend.dimensions(&image);

    let trigger = request.trigger();
    if !qualifies(dims, trigger.spec, trigger.value) {
        return Ok(ResizeOutcome::Skipped(SkipReason::BelowThreshold));
    }

    let target = request.target();
    let factor = scale_factor(dims, target.spec, target.value);
    let scratch = scratch_for(file)?;
    let savings = rescale_to_file(backend, &image, file, &scratch, factor, request.quality())?;
    drop(image);

    Ok(match safe_replace(file, scratch, savings, request.force())? {
        Replacement::Committed => ResizeOutcome::Resized {
            bytes_saved: savings,
        },
        Replacement::Discarded => ResizeOutcome::Skipped(SkipReason::NegativeSavings),
    })
}

/// Resize `file` by `factor` and commit the result over it, larger or not.
///
/// The encode goes to a scratch file first, so a failed encode leaves `file`
/// as it was. Returns the savings.
pub fn resize_in_place<B: ImageBackend>(
    backend: &B,
    file: &Path,
    factor: f64,
    quality: Quality,
) -> Result<i64, ResizeError> {
    let scratch = scratch_for(file)?;
    let savings = resize_one(backend, file, &scratch, factor, quality)?;
    safe_replace(file, scratch, savings, true)?;
    Ok(savings)
}

fn log_outcome(file: &Path, outcome: &ResizeOutcome) {
    match outcome {
        ResizeOutcome::Resized { bytes_saved } => tracing::info!(
            "resized {} (saved {})",
            file.display(),
            format_size(*bytes_saved)
        ),
        ResizeOutcome::Skipped(reason) => {
            tracing::info!("skipped {}: {}", file.display(), reason)
        }
        ResizeOutcome::Failed(err) => tracing::warn!("failed {}: {}", file.display(), err),
    }
}

// ============================================================================
// Background worker
// ============================================================================

/// Handle to a batch running on its worker thread.
pub struct BatchHandle<M> {
    worker: JoinHandle<(BatchReport, M)>,
}

impl<M> BatchHandle<M> {
    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }

    /// Wait for the worker and take back the report and the monitor.
    ///
    /// A panic on the worker is re-raised here.
    pub fn join(self) -> (BatchReport, M) {
        match self.worker.join() {
            Ok(done) => done,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}

/// Start the batch on a dedicated worker thread.
///
/// When the run reaches a terminal state, `on_complete` is handed to
/// `dispatcher` exactly once with the frozen report. The monitor is moved in
/// and comes back out of [`BatchHandle::join`].
pub fn spawn_batch<B, M, D, F>(
    backend: B,
    request: ResizeRequest,
    mut monitor: M,
    dispatcher: D,
    on_complete: F,
) -> std::io::Result<BatchHandle<M>>
where
    B: ImageBackend + Send + 'static,
    M: ProgressMonitor + Send + 'static,
    D: Dispatcher,
    F: FnOnce(BatchReport) + Send + 'static,
{
    let worker = thread::Builder::new()
        .name("bulk-resize".to_string())
        .spawn(move || {
            let report = run_batch(&backend, &request, &mut monitor);
            dispatcher.dispatch(Box::new(move || on_complete(report)));
            (report, monitor)
        })?;
    Ok(BatchHandle { worker })
}
