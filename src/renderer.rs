//! Renderer coordinator with lifecycle management.
//!
//! This module provides [`HtmlRenderer`], the main entry point: it owns the
//! persistent render worker, serializes capture requests from arbitrary
//! caller threads, and exposes the blocking capture API.
//!
//! # Architecture
//!
//! ```text
//! caller threads                    render worker thread
//! ──────────────                    ────────────────────
//! initialize() ──── startup latch ──▶ create engine, signal ready
//! capture() ─┐
//! capture() ─┼─ capture mutex ─ job ─▶ viewport ▸ load ▸ observer FSM
//! capture() ─┘   (one at a time)        ▸ settle ▸ snapshot
//!      ▲                                   │
//!      └────── per-request latch ◀─────────┘ result or error
//! ```
//!
//! `capture()` is synchronous from the caller's point of view but
//! asynchronous internally: the underlying engine is event-driven and
//! single-threaded, so the caller's request is marshalled onto the worker
//! as a job and the caller blocks on a completion latch. The capture mutex
//! is the explicit mutual-exclusion boundary that keeps two in-flight loads
//! from corrupting shared viewport state; it is part of the contract, not
//! an implementation detail.
//!
//! # Example
//!
//! ```rust,ignore
//! use htmlsnap::{CaptureRequest, HtmlRenderer};
//!
//! let renderer = HtmlRenderer::builder()
//!     .factory(Box::new(MyEngineFactory))
//!     .build()?
//!     .into_shared();
//!
//! renderer.initialize()?;
//!
//! let image = renderer.capture(
//!     &CaptureRequest::plain_text("<h1>Invoice #42</h1>", 288.0),
//! )?;
//! println!("captured {}x{}", image.width(), image.height());
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use image::RgbaImage;

use crate::config::RendererConfig;
use crate::engine::EngineFactory;
use crate::error::{CaptureError, Result};
use crate::pending::PendingCapture;
use crate::request::CaptureRequest;
use crate::stats::{CaptureStats, RendererCounters};
use crate::worker::{EngineState, Job, RenderWorker};

/// Fixed trivial content for the post-startup warm-up capture.
///
/// The engine's very first capture misbehaves (missed or offset snapshots),
/// so one internal capture runs before the renderer declares itself ready.
const WARMUP_MARKUP: &str = "<h1>startup</h1>";

/// Coordinates captures against a single persistent render worker.
///
/// # Thread Safety
///
/// All methods take `&self`; wrap the renderer in an `Arc` (see
/// [`into_shared`](Self::into_shared)) and call [`capture`](Self::capture)
/// from any thread. Concurrent captures serialize and execute strictly one
/// after another, in undefined order.
pub struct HtmlRenderer {
    config: RendererConfig,

    /// Consumed by the first `initialize()`; the engine is created on the
    /// worker thread, never here.
    factory: Mutex<Option<Box<dyn EngineFactory>>>,

    /// Lifecycle state. The guard also serializes concurrent initializers.
    state: Mutex<EngineState>,

    worker: Mutex<Option<RenderWorker>>,

    /// Global capture serialization: at most one pending capture exists at
    /// any instant.
    capture_lock: Mutex<()>,

    /// Most recent pending record, kept so `clear()` can discard stale
    /// result/error state before a new capture begins.
    current: Mutex<Option<Arc<PendingCapture>>>,

    counters: Arc<RendererCounters>,
    warmup_enabled: bool,
    shutting_down: AtomicBool,
}

impl HtmlRenderer {
    /// Create a new builder for constructing a renderer.
    pub fn builder() -> HtmlRendererBuilder {
        HtmlRendererBuilder::new()
    }

    /// Convert into a shared `Arc` for cross-thread use.
    pub fn into_shared(self) -> Arc<HtmlRenderer> {
        Arc::new(self)
    }

    /// Start the render worker if not already running.
    ///
    /// Idempotent and thread-safe: concurrent callers serialize on startup
    /// rather than duplicating it. The first call spawns the worker
    /// (selecting the headless backend per
    /// [`RendererConfig::headless`](crate::RendererConfig::headless)),
    /// blocks up to
    /// [`startup_timeout`](crate::RendererConfig::startup_timeout) for
    /// readiness, then runs one internal warm-up capture before declaring
    /// the renderer ready.
    ///
    /// # Errors
    ///
    /// - [`CaptureError::StartupTimeout`] - the worker did not signal
    ///   readiness in time. Fatal, not retried automatically.
    /// - [`CaptureError::ShuttingDown`] - called after shutdown began.
    /// - Engine-creation errors from the factory, surfaced directly.
    pub fn initialize(&self) -> Result<()> {
        if self.shutting_down.load(Ordering::Acquire) {
            return Err(CaptureError::ShuttingDown);
        }

        let mut state = self.state.lock().unwrap();
        if *state == EngineState::Ready {
            log::trace!("Render worker already initialized");
            return Ok(());
        }

        if *state == EngineState::NotStarted {
            let factory = self
                .factory
                .lock()
                .unwrap()
                .take()
                .ok_or(CaptureError::NotReady)?;

            log::info!(
                "Starting render worker (headless: {})",
                self.config.headless
            );
            *state = EngineState::Starting;
            let worker = RenderWorker::spawn(
                factory,
                self.config.clone(),
                Arc::clone(&self.counters),
            );
            *self.worker.lock().unwrap() = Some(worker);
        }

        // Still `Starting`: either we just spawned the worker, or an
        // earlier call timed out waiting and we wait again.
        {
            let worker = self.worker.lock().unwrap();
            worker
                .as_ref()
                .ok_or(CaptureError::NotReady)?
                .wait_ready()?;
        }

        if self.warmup_enabled {
            log::debug!("Running a warm-up capture to stabilize the worker...");
            let warmup = CaptureRequest::plain_text(WARMUP_MARKUP, 72.0);
            self.capture_on_worker(&warmup).map_err(|e| {
                log::error!("Warm-up capture failed: {}", e);
                e
            })?;
        }

        *state = EngineState::Ready;
        log::info!("Render worker ready");
        Ok(())
    }

    /// Rasterize one document, blocking until the result is available.
    ///
    /// Only one invocation executes at a time process-wide; concurrent
    /// invocations queue in undefined order. Each call resets stale
    /// result/error state ([`clear`](Self::clear)), verifies readiness,
    /// validates the request, posts a job to the worker, and blocks on the
    /// per-request latch with no timeout. There is no cancellation: once
    /// submitted, a capture runs to completion or failure.
    ///
    /// # Errors
    ///
    /// - [`CaptureError::NotReady`] - `initialize()` has not completed.
    /// - [`CaptureError::InvalidRequest`] - request failed validation.
    /// - [`CaptureError::RenderFailure`] - the engine failed to load the
    ///   document; the cause is surfaced verbatim.
    /// - [`CaptureError::CaptureFailure`] - pixel extraction failed after a
    ///   successful load.
    /// - [`CaptureError::ShuttingDown`] - shutdown began.
    ///
    /// A zoom reduction by the memory governor is not an error: the capture
    /// proceeds at reduced zoom with a logged warning, visible in
    /// [`stats()`](Self::stats).
    pub fn capture(&self, request: &CaptureRequest) -> Result<RgbaImage> {
        let _serialized = self.capture_lock.lock().unwrap();

        self.clear();

        if self.shutting_down.load(Ordering::Acquire) {
            return Err(CaptureError::ShuttingDown);
        }
        {
            let state = self.state.lock().unwrap();
            if *state != EngineState::Ready {
                return Err(CaptureError::NotReady);
            }
        }

        request.validate()?;
        self.capture_on_worker(request)
    }

    /// Submit a job and block on its latch. Shared by `capture()` and the
    /// warm-up path (which runs before the state turns `Ready`).
    fn capture_on_worker(&self, request: &CaptureRequest) -> Result<RgbaImage> {
        let pending = Arc::new(PendingCapture::new());
        *self.current.lock().unwrap() = Some(Arc::clone(&pending));

        {
            let worker = self.worker.lock().unwrap();
            // An empty slot here means shutdown already took the worker.
            worker
                .as_ref()
                .ok_or(CaptureError::ShuttingDown)?
                .submit(Job::Capture {
                    request: request.clone(),
                    pending: Arc::clone(&pending),
                })?;
        } // worker lock released before blocking

        log::trace!("Waiting on capture...");
        let outcome = pending.wait();

        self.current.lock().unwrap().take();
        outcome
    }

    /// Discard transient result/error state from the previous capture.
    ///
    /// Invoked automatically at the start of each [`capture`](Self::capture);
    /// exposed for callers that want deterministic cleanup between uses.
    pub fn clear(&self) {
        if let Some(stale) = self.current.lock().unwrap().take() {
            log::trace!(
                "Discarding stale pending capture (completed: {})",
                stale.is_done()
            );
        }
    }

    /// Point-in-time capture statistics.
    pub fn stats(&self) -> CaptureStats {
        self.counters.snapshot()
    }

    /// Stop the render worker and reject further operations.
    ///
    /// Blocks until the worker thread has joined. An in-flight capture
    /// finishes first (jobs already queued are drained before the shutdown
    /// job is reached).
    pub fn shutdown(&self) {
        if self.shutting_down.swap(true, Ordering::AcqRel) {
            log::debug!("Renderer already shutting down");
            return;
        }

        log::info!("Shutting down renderer...");
        // Wait out any in-flight capture and in-flight initialize. Holding
        // both locks (in the same order capture() takes them) guarantees no
        // job can be queued behind the worker's shutdown request, which
        // would strand its caller on an unreleased latch.
        let _serialized = self.capture_lock.lock().unwrap();
        let _state = self.state.lock().unwrap();
        if let Some(mut worker) = self.worker.lock().unwrap().take() {
            worker.shutdown();
        }
        self.clear();

        let stats = self.stats();
        log::info!(
            "Shutdown complete - completed: {}, failed: {}, zoom reductions: {}",
            stats.completed,
            stats.failed,
            stats.zoom_reductions
        );
    }
}

impl Drop for HtmlRenderer {
    /// Ensures the worker thread is joined even if `shutdown()` was never
    /// called explicitly.
    fn drop(&mut self) {
        if !self.shutting_down.load(Ordering::Acquire) {
            log::debug!("HtmlRenderer dropped without explicit shutdown - cleaning up");
            self.shutdown();
        }
    }
}

// ============================================================================
// HtmlRendererBuilder
// ============================================================================

/// Builder for constructing an [`HtmlRenderer`] with validation.
///
/// # Example
///
/// ```rust,ignore
/// use htmlsnap::{HtmlRenderer, RendererConfigBuilder};
///
/// let renderer = HtmlRenderer::builder()
///     .config(
///         RendererConfigBuilder::new()
///             .headless(true)
///             .settle_frames(2)
///             .build()?,
///     )
///     .factory(Box::new(MyEngineFactory))
///     .build()?;
/// ```
pub struct HtmlRendererBuilder {
    config: Option<RendererConfig>,
    factory: Option<Box<dyn EngineFactory>>,
    enable_warmup: bool,
}

impl HtmlRendererBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            config: None,
            factory: None,
            enable_warmup: true,
        }
    }

    /// Set custom configuration (defaults to [`RendererConfig::default`]).
    pub fn config(mut self, config: RendererConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the engine factory (required).
    pub fn factory(mut self, factory: Box<dyn EngineFactory>) -> Self {
        self.factory = Some(factory);
        self
    }

    /// Enable or disable the post-startup warm-up capture.
    ///
    /// Disabling is intended for tests that count engine calls; production
    /// use should leave it enabled.
    pub fn enable_warmup(mut self, enable: bool) -> Self {
        self.enable_warmup = enable;
        self
    }

    /// Build the renderer.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::Configuration`] if no factory was provided.
    pub fn build(self) -> Result<HtmlRenderer> {
        let config = self.config.unwrap_or_default();
        let factory = self
            .factory
            .ok_or_else(|| CaptureError::Configuration("No engine factory provided".to_string()))?;

        log::debug!("Building renderer with config: {:?}", config);

        Ok(HtmlRenderer {
            config,
            factory: Mutex::new(Some(factory)),
            state: Mutex::new(EngineState::NotStarted),
            worker: Mutex::new(None),
            capture_lock: Mutex::new(()),
            current: Mutex::new(None),
            counters: Arc::new(RendererCounters::default()),
            warmup_enabled: self.enable_warmup,
            shutting_down: AtomicBool::new(false),
        })
    }
}

impl Default for HtmlRendererBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Build and initialize a shared renderer from environment configuration.
///
/// Loads `app.env` (if present), reads the `HTMLSNAP_*` variables, builds a
/// renderer around the given factory, and runs [`HtmlRenderer::initialize`]
/// before returning. The result is ready for immediate use from any thread.
///
/// # Errors
///
/// Propagates configuration, startup, and warm-up errors.
///
/// # Example
///
/// ```rust,ignore
/// let renderer = htmlsnap::init_renderer(Box::new(MyEngineFactory))?;
/// let image = renderer.capture(&request)?;
/// ```
#[cfg(feature = "env-config")]
pub fn init_renderer(factory: Box<dyn EngineFactory>) -> Result<Arc<HtmlRenderer>> {
    let config = crate::config::env::from_env()?;

    let renderer = HtmlRenderer::builder()
        .config(config)
        .factory(factory)
        .build()?
        .into_shared();

    renderer.initialize()?;
    Ok(renderer)
}

// ============================================================================
// Unit Tests
// ============================================================================
