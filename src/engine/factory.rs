//! Engine factory trait.

use super::RenderEngine;
use crate::error::Result;

/// Creates the rendering engine on the worker thread.
///
/// The factory is handed to
/// [`HtmlRendererBuilder::factory`](crate::HtmlRendererBuilder::factory) and
/// invoked exactly once, from inside the render worker thread, during
/// `initialize()`. The returned engine stays on that thread for its whole
/// life, which is why the engine type itself does not need to be `Send`.
///
/// # Parameters
///
/// * `headless` - backend-selection policy from
///   [`RendererConfig::headless`](crate::RendererConfig::headless). When
///   true the factory must select a backend that renders without a display
///   surface (software rasterization).
///
/// # Example
///
/// ```rust,ignore
/// use htmlsnap::engine::{EngineFactory, RenderEngine};
/// use htmlsnap::Result;
///
/// struct WebViewEngineFactory;
///
/// impl EngineFactory for WebViewEngineFactory {
///     fn create(&self, headless: bool) -> Result<Box<dyn RenderEngine>> {
///         Ok(Box::new(WebViewEngine::launch(headless)?))
///     }
/// }
/// ```
pub trait EngineFactory: Send + Sync {
    /// Create the engine instance, honoring the headless policy.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::RenderFailure`](crate::CaptureError::RenderFailure)
    /// (or `Configuration`) when the engine backend cannot be brought up.
    /// The worker logs the failure and posts it through the startup latch,
    /// so `initialize()` surfaces it immediately instead of burning the
    /// whole startup deadline.
    fn create(&self, headless: bool) -> Result<Box<dyn RenderEngine>>;
}
