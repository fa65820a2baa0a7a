//! Error types for capture operations.
//!
//! This module provides [`CaptureError`], a unified error type for all
//! renderer operations, and a convenient [`Result`] type alias.
//!
//! # Example
//!
//! ```rust
//! use htmlsnap::{CaptureError, Result};
//!
//! fn render_label() -> Result<Vec<u8>> {
//!     Err(CaptureError::NotReady)
//! }
//!
//! match render_label() {
//!     Ok(png) => println!("Rendered {} bytes", png.len()),
//!     Err(CaptureError::NotReady) => println!("Call initialize() first"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::time::Duration;

/// Errors that can occur while starting the render worker or capturing.
///
/// Worker-side failures (`RenderFailure`, `CaptureFailure`) are written to the
/// pending capture's error slot by the worker thread and surfaced on the
/// blocked caller's stack. Nothing in this crate retries internally; callers
/// decide whether to resubmit a request.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CaptureError {
    /// The render worker did not signal readiness within the startup deadline.
    ///
    /// Fatal for the calling sequence and never retried automatically.
    /// Typically means the engine backend failed to come up at all
    /// (missing display surface without the headless policy, broken
    /// engine installation, resource exhaustion).
    #[error("render worker did not start within {0:?}")]
    StartupTimeout(Duration),

    /// A capture was attempted before `initialize()` completed successfully.
    #[error("render worker has not been started")]
    NotReady,

    /// The engine reported an exception while loading the document.
    ///
    /// The engine's failure description is carried verbatim.
    #[error("render failed: {0}")]
    RenderFailure(String),

    /// The snapshot/pixel-extraction step failed after a successful load.
    #[error("snapshot capture failed: {0}")]
    CaptureFailure(String),

    /// The request itself was rejected before being submitted to the worker.
    ///
    /// # Common Causes
    ///
    /// - `width_pt` or `zoom` not strictly positive
    /// - a URL source that does not parse as an absolute URL
    #[error("invalid capture request: {0}")]
    InvalidRequest(String),

    /// Invalid configuration provided to a builder or the env loader.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Operation attempted after the renderer began shutting down.
    ///
    /// Typically occurs during application shutdown. Handle it by stopping
    /// pending work rather than retrying.
    #[error("renderer is shutting down")]
    ShuttingDown,
}

impl From<String> for CaptureError {
    fn from(msg: String) -> Self {
        CaptureError::Configuration(msg)
    }
}

impl From<&str> for CaptureError {
    fn from(msg: &str) -> Self {
        CaptureError::Configuration(msg.to_string())
    }
}

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CaptureError>;

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Verifies error type conversions from String and &str.
    #[test]
    fn test_error_conversion() {
        let error: CaptureError = "test error".into();
        match error {
            CaptureError::Configuration(msg) => {
                assert_eq!(msg, "test error", "Error message should be preserved");
            }
            _ => panic!("Expected Configuration error variant"),
        }

        let error: CaptureError = "another error".to_string().into();
        assert!(matches!(error, CaptureError::Configuration(_)));
    }

    /// Verifies that error Display formatting works correctly.
    #[test]
    fn test_error_display() {
        let error = CaptureError::RenderFailure("bad markup".to_string());
        assert_eq!(error.to_string(), "render failed: bad markup");

        let error = CaptureError::CaptureFailure("surface gone".to_string());
        assert_eq!(error.to_string(), "snapshot capture failed: surface gone");

        let error = CaptureError::NotReady;
        assert_eq!(error.to_string(), "render worker has not been started");

        let error = CaptureError::StartupTimeout(Duration::from_secs(60));
        assert!(error.to_string().contains("60s"));
    }

    /// Verifies that CaptureError implements std::error::Error.
    #[test]
    fn test_error_is_std_error() {
        fn assert_std_error<T: std::error::Error>() {}
        assert_std_error::<CaptureError>();
    }

    /// Verifies that CaptureError is Send + Sync for cross-thread propagation.
    ///
    /// Errors are produced on the worker thread and consumed on caller
    /// threads, so this is load-bearing.
    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CaptureError>();
    }
}
