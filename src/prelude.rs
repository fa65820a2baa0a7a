//! Convenient imports for common usage patterns.
//!
//! This module re-exports the most commonly used types from `htmlsnap`,
//! allowing you to quickly get started with a single import.
//!
//! # Usage
//!
//! ```rust,ignore
//! use htmlsnap::prelude::*;
//! ```
//!
//! This imports:
//!
//! - [`HtmlRenderer`] - Main renderer type
//! - [`HtmlRendererBuilder`] - Renderer builder
//! - [`RendererConfig`] - Configuration struct
//! - [`RendererConfigBuilder`] - Configuration builder
//! - [`CaptureRequest`] - One capture's parameters
//! - [`CaptureError`] - Error type
//! - [`Result`] - Result type alias
//! - [`CaptureStats`] - Capture statistics
//! - [`RenderEngine`] - Engine trait
//! - [`EngineFactory`] - Factory trait
//! - [`LoadEvent`] - Engine load notifications
//! - [`SharedRenderer`] - Type alias for a shared renderer
//!
//! # Example
//!
//! ```rust,ignore
//! use htmlsnap::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RendererConfigBuilder::new()
//!         .headless(true)
//!         .settle_frames(2)
//!         .build()?;
//!
//!     let renderer = HtmlRenderer::builder()
//!         .config(config)
//!         .factory(Box::new(MyEngineFactory))
//!         .build()?;
//!
//!     renderer.initialize()?;
//!     let image = renderer.capture(&CaptureRequest::plain_text("<p>hi</p>", 144.0))?;
//!
//!     Ok(())
//! }
//! ```

// Core types
pub use crate::SharedRenderer;
pub use crate::config::{RendererConfig, RendererConfigBuilder};
pub use crate::engine::{EngineFactory, LoadEvent, RenderEngine, ZoomUnsupported};
pub use crate::error::{CaptureError, Result};
pub use crate::renderer::{HtmlRenderer, HtmlRendererBuilder};
pub use crate::request::{CSS_PX_PER_PT, CaptureRequest};
pub use crate::stats::CaptureStats;

// Feature-gated exports
#[cfg(feature = "env-config")]
pub use crate::config::env::from_env;

#[cfg(feature = "env-config")]
pub use crate::renderer::init_renderer;

// Re-export Arc for convenience (commonly needed with SharedRenderer)
pub use std::sync::Arc;
