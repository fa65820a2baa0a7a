//! Mock rendering engine for testing.
//!
//! This module provides a deterministic, in-process implementation of
//! [`RenderEngine`] and [`EngineFactory`] so the coordinator, observer, and
//! worker can be exercised without an embedded engine.
//!
//! # Feature Flag
//!
//! Available when the `test-utils` feature is enabled, or during testing
//! (`#[cfg(test)]`).
//!
//! # Determinism
//!
//! The mock renders a solid fill whose color is a hash of the source text,
//! sized to the current viewport, and reports a content height that is a
//! pure function of (source length, viewport width). Identical
//! content+width+zoom inputs therefore always produce identical buffers,
//! which is what the auto-fit stability tests rely on.
//!
//! # Example
//!
//! ```rust,ignore
//! use htmlsnap::engine::mock::MockEngineFactory;
//!
//! // Engine whose loads always fail
//! let factory = MockEngineFactory::new().fail_load("no network");
//!
//! // Factory that cannot create an engine at all (startup tests)
//! let factory = MockEngineFactory::create_fails("backend missing");
//! ```

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use image::{Rgba, RgbaImage};

use super::{EngineFactory, LoadEvent, RenderEngine, ZoomUnsupported};
use crate::error::{CaptureError, Result};

/// Behavior knobs shared between the factory and the engines it creates.
#[derive(Debug, Default, Clone)]
struct MockBehavior {
    /// Fail every load with this message.
    fail_load: Option<String>,

    /// Fail every snapshot with this message.
    fail_snapshot: Option<String>,

    /// Report the zoom capability as unsupported.
    zoom_unsupported: bool,

    /// Extra empty pulses between `Started` and `Finished`.
    load_pulses: u32,

    /// Fixed content height override, bypassing the text-flow model.
    content_height: Option<f64>,
}

/// Observable call counters, shared across threads via `Arc`.
///
/// The factory hands clones of these to test code so behavior can be
/// verified after the factory has been moved into a renderer.
#[derive(Debug, Default)]
pub struct MockCounters {
    /// Engines created by the factory.
    pub engines_created: AtomicUsize,

    /// `begin_load` calls across all engines.
    pub loads: AtomicUsize,

    /// Successful `snapshot` calls across all engines.
    pub snapshots: AtomicUsize,

    /// `set_visible(true)` calls across all engines.
    pub shows: AtomicUsize,

    /// `set_visible(false)` calls across all engines.
    pub hides: AtomicUsize,
}

/// Deterministic scripted [`RenderEngine`].
///
/// Created by [`MockEngineFactory`]; not constructed directly.
pub struct MockRenderEngine {
    behavior: MockBehavior,
    counters: Arc<MockCounters>,

    /// Scripted `poll` outcomes for the in-flight load.
    script: VecDeque<Option<LoadEvent>>,

    /// Current viewport (CSS px) as last set by the observer.
    viewport: (f64, f64),

    /// Source of the in-flight load, used for deterministic pixels/height.
    source: String,

    visible: bool,
    zoom: f64,
}

impl MockRenderEngine {
    fn new(behavior: MockBehavior, counters: Arc<MockCounters>) -> Self {
        Self {
            behavior,
            counters,
            script: VecDeque::new(),
            viewport: (1.0, 1.0),
            source: String::new(),
            visible: false,
            zoom: 1.0,
        }
    }

    /// Zoom factor most recently applied through `set_zoom`.
    pub fn last_zoom(&self) -> f64 {
        self.zoom
    }

    /// FNV-1a over the source, folded into an opaque fill color.
    fn fill_color(&self) -> Rgba<u8> {
        let mut hash: u64 = 0xcbf29ce484222325;
        for byte in self.source.bytes() {
            hash ^= byte as u64;
            hash = hash.wrapping_mul(0x100000001b3);
        }
        Rgba([hash as u8, (hash >> 8) as u8, (hash >> 16) as u8, 255])
    }
}

impl RenderEngine for MockRenderEngine {
    fn poll(&mut self) -> Option<LoadEvent> {
        // Empty script = idle pulses after the load settled.
        self.script.pop_front().unwrap_or(None)
    }

    fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport = (width, height);
    }

    fn set_visible(&mut self, visible: bool) {
        if visible {
            self.counters.shows.fetch_add(1, Ordering::SeqCst);
        } else {
            self.counters.hides.fetch_add(1, Ordering::SeqCst);
        }
        self.visible = visible;
    }

    fn begin_load(&mut self, source: &str, _plain_text: bool) {
        self.counters.loads.fetch_add(1, Ordering::SeqCst);
        self.source = source.to_string();

        self.script.clear();
        self.script.push_back(Some(LoadEvent::Started));
        for _ in 0..self.behavior.load_pulses {
            self.script.push_back(None);
        }
        match &self.behavior.fail_load {
            Some(msg) => self.script.push_back(Some(LoadEvent::Failed(msg.clone()))),
            None => self.script.push_back(Some(LoadEvent::Finished)),
        }
    }

    fn suppress_root_scrollbars(&mut self) {
        // Nothing to clip in a solid fill.
    }

    fn content_height(&mut self) -> Result<f64> {
        if let Some(height) = self.behavior.content_height {
            return Ok(height);
        }
        // Rough text-flow model: total glyph area divided by line width.
        // Depends only on (source, viewport width), so auto-fit results are
        // stable for identical inputs.
        let width = self.viewport.0.max(1.0);
        Ok((self.source.len() as f64 * 900.0 / width).ceil().max(24.0))
    }

    fn set_zoom(&mut self, zoom: f64) -> std::result::Result<(), ZoomUnsupported> {
        if self.behavior.zoom_unsupported {
            return Err(ZoomUnsupported);
        }
        self.zoom = zoom;
        Ok(())
    }

    fn snapshot(&mut self) -> Result<RgbaImage> {
        if let Some(msg) = &self.behavior.fail_snapshot {
            return Err(CaptureError::CaptureFailure(msg.clone()));
        }
        if !self.visible {
            return Err(CaptureError::CaptureFailure(
                "surface is hidden".to_string(),
            ));
        }

        let width = self.viewport.0.round().max(1.0) as u32;
        let height = self.viewport.1.round().max(1.0) as u32;

        self.counters.snapshots.fetch_add(1, Ordering::SeqCst);
        Ok(RgbaImage::from_pixel(width, height, self.fill_color()))
    }
}

/// Mock implementation of [`EngineFactory`].
///
/// # Example
///
/// ```rust,ignore
/// use htmlsnap::engine::mock::MockEngineFactory;
///
/// let factory = MockEngineFactory::new();
/// let counters = factory.counters();
///
/// let renderer = HtmlRenderer::builder()
///     .factory(Box::new(factory))
///     .build()?;
/// // counters stays observable after the move
/// ```
pub struct MockEngineFactory {
    behavior: MockBehavior,
    counters: Arc<MockCounters>,

    /// When set, `create` fails with this message instead of producing an
    /// engine (drives startup-timeout paths).
    create_error: Option<String>,
}

impl MockEngineFactory {
    /// Factory producing well-behaved engines.
    pub fn new() -> Self {
        Self {
            behavior: MockBehavior::default(),
            counters: Arc::new(MockCounters::default()),
            create_error: None,
        }
    }

    /// Factory whose `create` always fails, so the worker never signals
    /// readiness.
    pub fn create_fails<S: Into<String>>(message: S) -> Self {
        Self {
            create_error: Some(message.into()),
            ..Self::new()
        }
    }

    /// Engines report every load as failed with this message.
    pub fn fail_load<S: Into<String>>(mut self, message: S) -> Self {
        self.behavior.fail_load = Some(message.into());
        self
    }

    /// Engines fail every snapshot with this message.
    pub fn fail_snapshot<S: Into<String>>(mut self, message: S) -> Self {
        self.behavior.fail_snapshot = Some(message.into());
        self
    }

    /// Engines report the zoom capability as unsupported.
    pub fn without_zoom_capability(mut self) -> Self {
        self.behavior.zoom_unsupported = true;
        self
    }

    /// Insert extra empty pulses between load start and completion.
    pub fn load_pulses(mut self, pulses: u32) -> Self {
        self.behavior.load_pulses = pulses;
        self
    }

    /// Engines report this fixed content height instead of the text-flow
    /// model. Useful for exercising degenerate heights.
    pub fn content_height(mut self, height: f64) -> Self {
        self.behavior.content_height = Some(height);
        self
    }

    /// Shared counters for post-hoc verification.
    pub fn counters(&self) -> Arc<MockCounters> {
        Arc::clone(&self.counters)
    }
}

impl Default for MockEngineFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineFactory for MockEngineFactory {
    fn create(&self, headless: bool) -> Result<Box<dyn RenderEngine>> {
        if let Some(msg) = &self.create_error {
            log::debug!("MockEngineFactory: returning configured failure");
            return Err(CaptureError::RenderFailure(msg.clone()));
        }

        let n = self.counters.engines_created.fetch_add(1, Ordering::SeqCst);
        log::debug!(
            "MockEngineFactory: creating engine #{} (headless: {})",
            n + 1,
            headless
        );

        Ok(Box::new(MockRenderEngine::new(
            self.behavior.clone(),
            Arc::clone(&self.counters),
        )))
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
