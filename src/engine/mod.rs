//! Rendering-engine boundary.
//!
//! This module defines the seam between the capture coordinator and the
//! embedded document-rendering engine. The engine itself (HTML parsing,
//! layout, painting) is an external collaborator; this crate only drives it
//! through [`RenderEngine`] and obtains instances through [`EngineFactory`].
//!
//! # Threading Contract
//!
//! Engines are event-driven and single-threaded: an engine instance is
//! created on the render worker thread by the factory and never leaves it.
//! That is why [`RenderEngine`] does not require `Send` while
//! [`EngineFactory`] does: the factory crosses threads, the engine does not.
//! Snapshots in particular are only valid from the owning thread.
//!
//! # Implementing an Engine
//!
//! ```rust,ignore
//! use htmlsnap::engine::{EngineFactory, LoadEvent, RenderEngine, ZoomUnsupported};
//!
//! struct WebViewEngine { /* handles into the embedded engine */ }
//!
//! impl RenderEngine for WebViewEngine {
//!     fn poll(&mut self) -> Option<LoadEvent> {
//!         // Pump the engine's event loop for one pulse and translate any
//!         // load-state transition that occurred.
//!         todo!()
//!     }
//!     // ...
//! }
//! ```

mod factory;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use factory::EngineFactory;

use image::RgbaImage;

use crate::error::Result;

/// Load-state transition reported by the engine.
///
/// Mirrors the not-started/loading/succeeded/failed worker states that
/// embedded engines expose, reduced to the transitions the capture observer
/// acts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadEvent {
    /// The engine began loading the document.
    Started,

    /// The document finished loading successfully.
    Finished,

    /// The engine reported a rendering exception. The description is
    /// surfaced to the caller verbatim.
    Failed(String),
}

/// Marker error returned by [`RenderEngine::set_zoom`] when the engine build
/// lacks a zoom capability.
///
/// Zoom is cosmetic (it buys output quality, never correctness), so the
/// observer falls back to zoom 1 and warns instead of failing the capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoomUnsupported;

/// Driver interface over the embedded rendering engine.
///
/// All methods are called from the render worker thread only. The engine is
/// free to assume single-threaded access.
pub trait RenderEngine {
    /// Pump the engine's event loop for one render pulse.
    ///
    /// Blocks until the engine has produced one frame's worth of work, then
    /// returns the load-state transition that occurred during the pulse, if
    /// any. The capture observer counts calls to this method as its
    /// frame-settle clock, so implementations should pace it to the engine's
    /// actual pulse rate rather than returning immediately in a tight loop.
    ///
    /// Engines that expose a genuine quiescence/idle notification should
    /// surface it by delaying the pulse until idle, which turns the settle
    /// heuristic into a real content-ready signal.
    fn poll(&mut self) -> Option<LoadEvent>;

    /// Resize the render viewport (CSS px) and let content re-fit.
    fn set_viewport(&mut self, width: f64, height: f64);

    /// Show or hide the render surface.
    ///
    /// Some engines cannot produce a valid snapshot from a hidden surface,
    /// so the worker shows it for the duration of a capture and hides it
    /// again once the result is posted.
    fn set_visible(&mut self, visible: bool);

    /// Begin loading the document. `plain_text` selects inline-markup
    /// loading versus URL navigation. Completion is reported through
    /// [`poll`](Self::poll).
    fn begin_load(&mut self, source: &str, plain_text: bool);

    /// Append `overflow: hidden` styling to the document root so scrollbars
    /// clip instead of painting into the capture. Called once per capture
    /// after a successful load.
    fn suppress_root_scrollbars(&mut self);

    /// Height (CSS px) of the rendered content, for auto-fit requests.
    ///
    /// Only meaningful after a successful load.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::CaptureFailure`](crate::CaptureError::CaptureFailure)
    /// if the engine cannot evaluate the query.
    fn content_height(&mut self) -> Result<f64>;

    /// Best-effort scale-factor setter.
    ///
    /// # Errors
    ///
    /// Returns [`ZoomUnsupported`] when this engine build has no zoom
    /// capability; the capture proceeds at zoom 1.
    fn set_zoom(&mut self, zoom: f64) -> std::result::Result<(), ZoomUnsupported>;

    /// Rasterize the current visual surface into an RGBA buffer.
    ///
    /// Only valid on the owning worker thread, after the frame has settled.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::CaptureFailure`](crate::CaptureError::CaptureFailure)
    /// if pixel extraction fails.
    fn snapshot(&mut self) -> Result<RgbaImage>;
}
