//! # htmlsnap
//!
//! Blocking HTML-to-raster capture coordinator over a single persistent
//! render worker.
//!
//! This crate turns an inherently event-driven, single-threaded HTML render
//! engine into a thread-safe, synchronous capture service: callers on any
//! thread submit a document plus layout parameters and block until a pixel
//! buffer (or a typed error) comes back.
//!
//! ## Features
//!
//! - **Single Persistent Worker**: One long-lived engine instance serves all
//!   captures, avoiding per-request startup costs
//! - **Strict Serialization**: Captures execute one at a time; concurrent
//!   callers queue on an explicit mutual-exclusion boundary
//! - **Load/Settle State Machine**: Each capture walks an explicit phase
//!   progression from load through frame settling to snapshot
//! - **Memory-Aware Zoom Governor**: Requested zoom is clamped to what the
//!   configured memory ceiling can back, never failing the capture
//! - **Point-Based Layout**: Page dimensions are given in points and
//!   converted to CSS pixels at 96/72
//! - **Graceful Shutdown**: In-flight work drains before the worker joins
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │            Caller Threads                   │
//! │   capture() ─ capture() ─ capture()         │
//! └─────────────────┬───────────────────────────┘
//!                   │ serialize, block on latch
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │              HtmlRenderer                   │
//! │ ┌─────────────────────────────────────────┐ │
//! │ │   Capture Mutex (one job at a time)     │ │
//! │ └─────────────────────────────────────────┘ │
//! │ ┌─────────────────────────────────────────┐ │
//! │ │   Render Worker Thread                  │ │
//! │ │   viewport ▸ load ▸ zoom ▸ settle       │ │
//! │ │   ▸ snapshot ▸ release latch            │ │
//! │ └─────────────────────────────────────────┘ │
//! └─────────────────┬───────────────────────────┘
//!                   │
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │        RenderEngine (your backend)          │
//! │     (supplied through EngineFactory)        │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use htmlsnap::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let renderer = HtmlRenderer::builder()
//!         .config(
//!             RendererConfigBuilder::new()
//!                 .headless(true)
//!                 .settle_frames(2)
//!                 .build()?,
//!         )
//!         .factory(Box::new(MyEngineFactory))
//!         .build()?
//!         .into_shared();
//!
//!     renderer.initialize()?;
//!
//!     // Plain markup, 4 inch wide page, height determined by content
//!     let request = CaptureRequest::plain_text("<h1>Receipt</h1>", 288.0);
//!     let image = renderer.capture(&request)?;
//!     println!("captured {}x{} pixels", image.width(), image.height());
//!
//!     renderer.shutdown();
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Configuration
//!
//! When the `env-config` feature is enabled, configuration can be loaded
//! from environment variables (and an optional `app.env` file):
//!
//! ```rust,ignore
//! let renderer = htmlsnap::init_renderer(Box::new(MyEngineFactory))?;
//! ```
//!
//! | Variable | Type | Default | Description |
//! |----------|------|---------|-------------|
//! | `HTMLSNAP_HEADLESS` | bool | true | Select headless backend |
//! | `HTMLSNAP_STARTUP_TIMEOUT_SECONDS` | u64 | 60 | Worker startup deadline |
//! | `HTMLSNAP_SETTLE_FRAMES` | u32 | 2 | Frames to wait before snapshot |
//! | `HTMLSNAP_MEMORY_LIMIT_MB` | u64 | 512 | Zoom governor memory ceiling |
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `env-config` | Enable environment-based configuration |
//! | `serde` | Serialize/deserialize requests and stats |
//! | `test-utils` | Enable the mock engine for testing |
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T, CaptureError>`](Result):
//!
//! ```rust,ignore
//! match renderer.capture(&request) {
//!     Ok(image) => { /* use pixels */ }
//!     Err(CaptureError::NotReady) => {
//!         // initialize() has not completed
//!     }
//!     Err(CaptureError::RenderFailure(msg)) => {
//!         eprintln!("document failed to load: {}", msg);
//!     }
//!     Err(e) => eprintln!("capture error: {}", e),
//! }
//! ```
//!
//! ## Testing
//!
//! For testing without a real engine, enable the `test-utils` feature and
//! use [`MockEngineFactory`](engine::mock::MockEngineFactory):
//!
//! ```rust,ignore
//! use htmlsnap::engine::mock::MockEngineFactory;
//!
//! let renderer = HtmlRenderer::builder()
//!     .factory(Box::new(MockEngineFactory::new()))
//!     .enable_warmup(false)
//!     .build()?;
//! ```

#![doc(html_root_url = "https://docs.rs/htmlsnap/0.1.0")]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// Modules
// ============================================================================

pub mod config;
pub mod engine;
pub mod error;
pub mod prelude;
pub mod renderer;
pub mod request;
pub mod stats;
pub mod zoom;

// Internal modules (not publicly exposed)
pub(crate) mod observer;
pub(crate) mod pending;
pub(crate) mod worker;

// ============================================================================
// Re-exports (Public API)
// ============================================================================

// Core types
pub use config::{RendererConfig, RendererConfigBuilder};
pub use engine::{EngineFactory, LoadEvent, RenderEngine, ZoomUnsupported};
pub use error::{CaptureError, Result};
pub use renderer::{HtmlRenderer, HtmlRendererBuilder};
pub use request::{CSS_PX_PER_PT, CaptureRequest};
pub use stats::CaptureStats;
pub use zoom::max_supported_zoom;

// Feature-gated re-exports
#[cfg(feature = "env-config")]
pub use config::env::from_env;

#[cfg(feature = "env-config")]
pub use renderer::init_renderer;

// ============================================================================
// Convenience type aliases
// ============================================================================

/// Shared renderer type for cross-thread use.
///
/// All renderer methods take `&self`, so a plain `Arc` is enough; no outer
/// mutex is needed.
///
/// # Example
///
/// ```rust,ignore
/// use htmlsnap::SharedRenderer;
///
/// let renderer: SharedRenderer = renderer.into_shared();
/// ```
pub type SharedRenderer = std::sync::Arc<HtmlRenderer>;
