//! Render-completion observer.
//!
//! Consumes load-state transitions from the engine and walks one capture
//! through an explicit state machine:
//!
//! ```text
//! Idle -> Loading -> LoadSucceeded -> FrameSettling -> Captured
//!            |             |                |
//!            +-------------+----------------+--------> Failed
//! ```
//!
//! On load success the observer performs the post-load sequence in strict
//! order: root-style fixup, auto-height resolution, zoom finalization
//! (memory clamp, then capability probe), viewport resize, and finally a
//! fixed-count frame-settle wait before triggering the snapshot. Height is
//! always resolved before the zoom is finalized and before the viewport is
//! resized; the zoom governor only ever reduces the requested zoom.
//!
//! Everything here runs on the render worker thread; the observer owns the
//! [`ViewportState`] exclusively.

use image::RgbaImage;

use crate::engine::{LoadEvent, RenderEngine};
use crate::error::{CaptureError, Result};
use crate::request::CaptureRequest;
use crate::zoom;

/// Phase of the in-flight capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoadPhase {
    Idle,
    Loading,
    LoadSucceeded,
    FrameSettling,
    Captured,
    Failed,
}

/// Mutable viewport fields for the in-flight capture, CSS px.
///
/// Owned exclusively by the worker thread through the observer; caller
/// threads never touch it.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ViewportState {
    pub page_width: f64,
    pub page_height: f64,
    pub page_zoom: f64,
}

/// Drives one capture from load begin to snapshot or failure.
pub(crate) struct CaptureObserver {
    settle_frames: u32,
    memory_limit: u64,
    memory_threshold: u64,
    headless: bool,

    phase: LoadPhase,
    viewport: ViewportState,

    /// Pulses observed since entering `FrameSettling`.
    frames_seen: u32,

    /// Whether the governor reduced the requested zoom for this capture.
    zoom_reduced: bool,
}

impl CaptureObserver {
    pub(crate) fn new(
        settle_frames: u32,
        memory_limit: u64,
        memory_threshold: u64,
        headless: bool,
    ) -> Self {
        Self {
            settle_frames,
            memory_limit,
            memory_threshold,
            headless,
            phase: LoadPhase::Idle,
            viewport: ViewportState {
                page_width: 0.0,
                page_height: 0.0,
                page_zoom: 1.0,
            },
            frames_seen: 0,
            zoom_reduced: false,
        }
    }

    pub(crate) fn phase(&self) -> LoadPhase {
        self.phase
    }

    pub(crate) fn zoom_reduced(&self) -> bool {
        self.zoom_reduced
    }

    /// Configure the viewport from the request and begin loading.
    ///
    /// The surface is made visible here; the worker hides it again once the
    /// result has been posted.
    pub(crate) fn begin(&mut self, engine: &mut dyn RenderEngine, request: &CaptureRequest) {
        self.viewport = ViewportState {
            page_width: request.page_width_px(),
            page_height: request.page_height_px(),
            page_zoom: request.zoom,
        };
        self.phase = LoadPhase::Loading;
        self.frames_seen = 0;
        self.zoom_reduced = false;

        // Height 0 (auto) gets an initial 1px viewport so engines that
        // substitute a default height for exactly 0 don't inflate the page.
        engine.set_viewport(
            self.viewport.page_width * self.viewport.page_zoom,
            (self.viewport.page_height * self.viewport.page_zoom).max(1.0),
        );
        engine.set_visible(true);

        log::trace!(
            "Loading {} source ({} chars) at {}x{} px, zoom {}",
            if request.is_plain_text { "markup" } else { "URL" },
            request.source.len(),
            self.viewport.page_width,
            self.viewport.page_height,
            self.viewport.page_zoom
        );
        engine.begin_load(&request.source, request.is_plain_text);
    }

    /// Pump one render pulse and advance the state machine.
    ///
    /// Returns `Some(outcome)` once the capture reaches a terminal phase.
    pub(crate) fn step(&mut self, engine: &mut dyn RenderEngine) -> Option<Result<RgbaImage>> {
        let event = engine.poll();

        if let Some(LoadEvent::Failed(cause)) = event {
            // Reachable from any phase; release the caller immediately.
            log::warn!("Engine reported rendering exception: {}", cause);
            self.phase = LoadPhase::Failed;
            return Some(Err(CaptureError::RenderFailure(cause)));
        }

        match (self.phase, event) {
            (LoadPhase::Loading, Some(LoadEvent::Started)) => {
                log::trace!("Load state: Loading (engine started)");
                None
            }
            (LoadPhase::Loading, Some(LoadEvent::Finished)) => {
                self.phase = LoadPhase::LoadSucceeded;
                if let Err(e) = self.finalize_layout(engine) {
                    self.phase = LoadPhase::Failed;
                    return Some(Err(e));
                }
                self.phase = LoadPhase::FrameSettling;
                self.frames_seen = 0;
                None
            }
            (LoadPhase::FrameSettling, _) => {
                self.frames_seen += 1;
                if self.frames_seen < self.settle_frames.max(1) {
                    return None;
                }
                log::debug!(
                    "Frame settled after {} pulses, attempting image capture",
                    self.frames_seen
                );
                Some(self.extract(engine))
            }
            // Idle pulses while loading, and any leftover events.
            _ => None,
        }
    }

    /// Post-load fixups, height resolution, and zoom finalization.
    ///
    /// Order matters: the content height must be known before the zoom is
    /// clamped (the budget depends on the page area) and before the
    /// viewport is resized.
    fn finalize_layout(&mut self, engine: &mut dyn RenderEngine) -> Result<()> {
        // Keep the root from painting scrollbars into the capture.
        engine.suppress_root_scrollbars();

        // Width was sized before the load (for responsive layouts); now
        // resolve the best-fit height if the caller asked for auto.
        if self.viewport.page_height <= 0.0 {
            self.viewport.page_height = engine.content_height()?;
            log::trace!("Resolved content height: {} px", self.viewport.page_height);

            // A page with no height would zero the zoom bound and collapse
            // the viewport; fail the capture instead.
            if self.viewport.page_height <= 0.0 {
                return Err(CaptureError::RenderFailure(format!(
                    "engine reported non-positive content height: {}",
                    self.viewport.page_height
                )));
            }
        }

        let usable_zoom = zoom::max_supported_zoom(
            self.viewport.page_width,
            self.viewport.page_height,
            self.memory_limit,
            self.memory_threshold,
            self.headless,
        );
        if usable_zoom < self.viewport.page_zoom {
            log::warn!(
                "Zoom level {} decreased to {} due to memory limitations",
                self.viewport.page_zoom,
                usable_zoom
            );
            self.viewport.page_zoom = usable_zoom;
            self.zoom_reduced = true;
        }

        // Zoom is cosmetic only. If this engine build can't scale, capture
        // at default quality rather than failing.
        match engine.set_zoom(self.viewport.page_zoom) {
            Ok(()) => {
                log::trace!("Zooming by x{} for increased quality", self.viewport.page_zoom);
            }
            Err(_) => {
                log::warn!("Engine lacks zoom capability, using default quality");
                self.viewport.page_zoom = 1.0;
            }
        }

        log::trace!(
            "Setting page size to {}x{}",
            self.viewport.page_width * self.viewport.page_zoom,
            self.viewport.page_height * self.viewport.page_zoom
        );
        engine.set_viewport(
            self.viewport.page_width * self.viewport.page_zoom,
            self.viewport.page_height * self.viewport.page_zoom,
        );

        Ok(())
    }

    /// Terminal step: rasterize the settled surface.
    fn extract(&mut self, engine: &mut dyn RenderEngine) -> Result<RgbaImage> {
        match engine.snapshot() {
            Ok(image) => {
                self.phase = LoadPhase::Captured;
                log::debug!("Captured {}x{} px", image.width(), image.height());
                Ok(image)
            }
            Err(e) => {
                self.phase = LoadPhase::Failed;
                Err(e)
            }
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineFactory;
    use crate::engine::mock::MockEngineFactory;

    const MIB: u64 = 1024 * 1024;

    fn run_capture(
        factory: MockEngineFactory,
        request: &CaptureRequest,
        observer: &mut CaptureObserver,
    ) -> Result<RgbaImage> {
        let mut engine = factory.create(true).unwrap();
        observer.begin(engine.as_mut(), request);
        loop {
            if let Some(outcome) = observer.step(engine.as_mut()) {
                return outcome;
            }
        }
    }

    fn default_observer() -> CaptureObserver {
        CaptureObserver::new(2, 512 * MIB, 1024 * MIB, true)
    }

    /// Fixed-height request: dimensions follow the pt -> px formula.
    #[test]
    fn test_fixed_height_dimensions() {
        let request = CaptureRequest::plain_text("<h1>doc</h1>", 720.0).with_height(360.0);
        let mut observer = default_observer();

        let image = run_capture(MockEngineFactory::new(), &request, &mut observer).unwrap();
        assert_eq!(image.width(), 960);
        assert_eq!(image.height(), 480);
        assert_eq!(observer.phase(), LoadPhase::Captured);
        assert!(!observer.zoom_reduced());
    }

    /// Auto-height request: height comes from the content query, scaled by
    /// zoom, and is stable across identical runs.
    #[test]
    fn test_auto_height_resolution() {
        let request = CaptureRequest::plain_text("<h1>hi</h1>", 144.0).with_zoom(2.0);

        let mut first = default_observer();
        let a = run_capture(MockEngineFactory::new(), &request, &mut first).unwrap();
        let mut second = default_observer();
        let b = run_capture(MockEngineFactory::new(), &request, &mut second).unwrap();

        assert_eq!(a.width(), 384);
        assert!(a.height() > 0);
        assert_eq!((a.width(), a.height()), (b.width(), b.height()));
    }

    /// A page bigger than the memory budget gets its zoom clamped; the
    /// capture still succeeds.
    #[test]
    fn test_zoom_clamped_by_memory() {
        let request = CaptureRequest::plain_text("big", 720.0)
            .with_height(360.0)
            .with_zoom(8.0);
        // 1 MiB budget makes the bound fall well under the requested 8x.
        let mut observer = CaptureObserver::new(2, MIB, 1024 * MIB, true);

        let image = run_capture(MockEngineFactory::new(), &request, &mut observer).unwrap();
        assert!(observer.zoom_reduced());
        // Effective zoom below request: output smaller than 8x the page.
        assert!(image.width() < 960 * 8);
        assert!(image.width() > 0);
    }

    /// Engines without a zoom capability fall back to zoom 1 and still
    /// capture.
    #[test]
    fn test_zoom_capability_fallback() {
        let request = CaptureRequest::plain_text("doc", 720.0)
            .with_height(360.0)
            .with_zoom(2.0);
        let mut observer = default_observer();

        let image = run_capture(
            MockEngineFactory::new().without_zoom_capability(),
            &request,
            &mut observer,
        )
        .unwrap();
        // Fallback zoom 1: plain page dimensions.
        assert_eq!(image.width(), 960);
        assert_eq!(image.height(), 480);
    }

    /// A load failure is surfaced verbatim and terminal.
    #[test]
    fn test_load_failure() {
        let request = CaptureRequest::plain_text("doc", 144.0);
        let mut observer = default_observer();

        let result = run_capture(
            MockEngineFactory::new().fail_load("no such host"),
            &request,
            &mut observer,
        );
        match result {
            Err(CaptureError::RenderFailure(msg)) => assert_eq!(msg, "no such host"),
            other => panic!("Expected RenderFailure, got {:?}", other),
        }
        assert_eq!(observer.phase(), LoadPhase::Failed);
    }

    /// An engine reporting no content for an auto-height request fails the
    /// capture instead of zeroing the zoom bound and collapsing the
    /// viewport to 0x0.
    #[test]
    fn test_zero_content_height_fails() {
        let request = CaptureRequest::plain_text("doc", 144.0);
        let mut observer = default_observer();

        let result = run_capture(
            MockEngineFactory::new().content_height(0.0),
            &request,
            &mut observer,
        );
        match result {
            Err(CaptureError::RenderFailure(msg)) => {
                assert!(msg.contains("content height"));
            }
            other => panic!("Expected RenderFailure, got {:?}", other),
        }
        assert_eq!(observer.phase(), LoadPhase::Failed);
    }

    /// A snapshot failure after a successful load is a CaptureFailure.
    #[test]
    fn test_snapshot_failure() {
        let request = CaptureRequest::plain_text("doc", 144.0);
        let mut observer = default_observer();

        let result = run_capture(
            MockEngineFactory::new().fail_snapshot("surface lost"),
            &request,
            &mut observer,
        );
        assert!(matches!(result, Err(CaptureError::CaptureFailure(_))));
        assert_eq!(observer.phase(), LoadPhase::Failed);
    }

    /// The snapshot waits for the configured number of settle pulses after
    /// the load completes.
    #[test]
    fn test_settle_frame_counting() {
        let request = CaptureRequest::plain_text("doc", 144.0).with_height(72.0);
        let factory = MockEngineFactory::new();
        let mut engine = factory.create(true).unwrap();
        let mut observer = CaptureObserver::new(3, 512 * MIB, 1024 * MIB, true);

        observer.begin(engine.as_mut(), &request);
        assert!(observer.step(engine.as_mut()).is_none()); // Started
        assert!(observer.step(engine.as_mut()).is_none()); // Finished -> settling
        assert_eq!(observer.phase(), LoadPhase::FrameSettling);
        assert!(observer.step(engine.as_mut()).is_none()); // pulse 1
        assert!(observer.step(engine.as_mut()).is_none()); // pulse 2
        let outcome = observer.step(engine.as_mut()); // pulse 3 -> snapshot
        assert!(matches!(outcome, Some(Ok(_))));
        assert_eq!(observer.phase(), LoadPhase::Captured);
    }
}
