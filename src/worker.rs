//! Render worker thread and startup signaling.
//!
//! Exactly one dedicated, long-lived worker thread owns the rendering
//! engine and all mutable rendering state, behaving as a single-threaded
//! actor. Caller threads talk to it only by posting [`Job`]s over an mpsc
//! channel and blocking on per-request [`PendingCapture`] latches written by
//! the worker.
//!
//! Startup is a one-time latch: the worker creates the engine via the
//! factory (honoring the headless policy), then signals readiness or a
//! creation failure; `initialize()` blocks on that signal with a fixed
//! timeout.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::config::RendererConfig;
use crate::engine::EngineFactory;
use crate::error::{CaptureError, Result};
use crate::observer::CaptureObserver;
use crate::pending::PendingCapture;
use crate::request::CaptureRequest;
use crate::stats::RendererCounters;

/// Lifecycle state of the engine worker.
///
/// Monotonic: the state only ever advances, and once `Ready` it never
/// regresses (a dead worker surfaces as capture failures, not as a state
/// rollback).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EngineState {
    NotStarted,
    Starting,
    Ready,
}

/// Work posted to the render worker.
pub(crate) enum Job {
    /// One capture request plus the record its outcome is posted to.
    Capture {
        request: CaptureRequest,
        pending: Arc<PendingCapture>,
    },

    /// Drain and exit the worker loop.
    Shutdown,
}

/// One-time startup latch carrying the engine-creation outcome.
struct StartupSignal {
    outcome: Mutex<Option<Result<()>>>,
    signal: Condvar,
}

impl StartupSignal {
    fn new() -> Self {
        Self {
            outcome: Mutex::new(None),
            signal: Condvar::new(),
        }
    }

    fn post(&self, outcome: Result<()>) {
        let mut slot = self.outcome.lock().unwrap();
        *slot = Some(outcome);
        self.signal.notify_all();
    }

    /// Block until the worker posts, or the deadline lapses.
    fn wait(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        let mut slot = self.outcome.lock().unwrap();
        loop {
            if let Some(outcome) = slot.as_ref() {
                return outcome.clone();
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(CaptureError::StartupTimeout(timeout));
            }
            let (guard, _) = self.signal.wait_timeout(slot, remaining).unwrap();
            slot = guard;
        }
    }
}

/// Handle to the persistent render worker thread.
pub(crate) struct RenderWorker {
    sender: Sender<Job>,
    handle: Option<JoinHandle<()>>,
    startup: Arc<StartupSignal>,
    startup_timeout: Duration,
}

impl RenderWorker {
    /// Spawn the worker thread. The engine is created inside the thread so
    /// it never has to cross a thread boundary.
    pub(crate) fn spawn(
        factory: Box<dyn EngineFactory>,
        config: RendererConfig,
        counters: Arc<RendererCounters>,
    ) -> Self {
        let (sender, receiver) = mpsc::channel();
        let startup = Arc::new(StartupSignal::new());
        let startup_timeout = config.startup_timeout;

        let thread_startup = Arc::clone(&startup);
        let handle =
            thread::spawn(move || run_worker(factory, config, thread_startup, receiver, counters));

        Self {
            sender,
            handle: Some(handle),
            startup,
            startup_timeout,
        }
    }

    /// Block until the worker signals readiness.
    ///
    /// # Errors
    ///
    /// - [`CaptureError::StartupTimeout`] when the deadline lapses with no
    ///   signal.
    /// - The factory's own error when engine creation failed outright
    ///   (surfaced immediately instead of burning the full deadline).
    pub(crate) fn wait_ready(&self) -> Result<()> {
        log::trace!(
            "Waiting up to {:?} for the render worker...",
            self.startup_timeout
        );
        self.startup.wait(self.startup_timeout)
    }

    /// Post a job to the worker (asynchronous, never blocks on the render).
    pub(crate) fn submit(&self, job: Job) -> Result<()> {
        self.sender
            .send(job)
            .map_err(|_| CaptureError::ShuttingDown)
    }

    /// Ask the worker to exit and join it.
    pub(crate) fn shutdown(&mut self) {
        if let Some(handle) = self.handle.take() {
            // Send failure just means the worker already exited.
            let _ = self.sender.send(Job::Shutdown);
            match handle.join() {
                Ok(()) => log::debug!("Render worker stopped cleanly"),
                Err(_) => log::error!("Render worker panicked during shutdown"),
            }
        }
    }
}

impl Drop for RenderWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Worker thread body: create the engine, signal startup, then serve jobs
/// until shutdown.
fn run_worker(
    factory: Box<dyn EngineFactory>,
    config: RendererConfig,
    startup: Arc<StartupSignal>,
    receiver: Receiver<Job>,
    counters: Arc<RendererCounters>,
) {
    log::debug!(
        "Render worker starting (headless: {}, settle frames: {})",
        config.headless,
        config.settle_frames
    );

    let mut engine = match factory.create(config.headless) {
        Ok(engine) => {
            startup.post(Ok(()));
            engine
        }
        Err(e) => {
            log::error!("Engine creation failed: {}", e);
            startup.post(Err(e));
            return;
        }
    };

    log::debug!("Render engine started");

    while let Ok(job) = receiver.recv() {
        match job {
            Job::Capture { request, pending } => {
                let mut observer = CaptureObserver::new(
                    config.settle_frames,
                    config.memory_limit,
                    config.memory_threshold,
                    config.headless,
                );

                observer.begin(engine.as_mut(), &request);
                let outcome = loop {
                    if let Some(outcome) = observer.step(engine.as_mut()) {
                        break outcome;
                    }
                };

                // Hide the surface again before the caller wakes; it is
                // only meant to be visible while a capture is in flight.
                engine.set_visible(false);

                if observer.zoom_reduced() {
                    counters.record_zoom_reduction();
                }
                match outcome {
                    Ok(image) => {
                        counters.record_completed();
                        pending.complete(image);
                    }
                    Err(e) => {
                        counters.record_failed();
                        pending.fail(e);
                    }
                }
            }
            Job::Shutdown => {
                log::debug!("Render worker received shutdown job");
                break;
            }
        }
    }

    log::debug!("Render worker exiting");
}

// ============================================================================
// Unit Tests
// ============================================================================
