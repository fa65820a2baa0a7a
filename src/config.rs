//! Configuration for the render worker and capture behavior.
//!
//! This module provides [`RendererConfig`] and [`RendererConfigBuilder`]
//! for configuring startup, frame settling, and the memory budget used by
//! the zoom governor.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use htmlsnap::RendererConfigBuilder;
//!
//! let config = RendererConfigBuilder::new()
//!     .headless(true)
//!     .startup_timeout(Duration::from_secs(30))
//!     .settle_frames(2)
//!     .build()
//!     .expect("Invalid configuration");
//!
//! assert!(config.headless);
//! assert_eq!(config.settle_frames, 2);
//! ```
//!
//! # Environment Configuration
//!
//! When the `env-config` feature is enabled, configuration can be loaded
//! from environment variables and an optional `app.env` file:
//!
//! ```rust,ignore
//! use htmlsnap::config::env::from_env;
//!
//! let config = from_env()?;
//! ```
//!
//! See [`mod@env`] for available environment variables.

use std::time::Duration;

/// One mebibyte, used for memory limit defaults and env parsing.
const MIB: u64 = 1024 * 1024;

/// Configuration for the render worker and capture behavior.
///
/// Use [`RendererConfigBuilder`] for validation and convenience.
///
/// # Fields Overview
///
/// | Field | Default | Description |
/// |-------|---------|-------------|
/// | `headless` | `true` | Select the headless engine backend |
/// | `startup_timeout` | 60s | Deadline for worker readiness |
/// | `settle_frames` | 2 | Render pulses to wait before snapshot |
/// | `memory_limit` | 512 MiB | Memory ceiling for the zoom governor |
/// | `memory_threshold` | 1 GiB | Limit above which the zoom budget widens |
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Whether to select a headless-capable engine backend.
    ///
    /// This is a deployment policy, supplied by whoever owns process/display
    /// management, and must be decided before `initialize()` is called.
    /// When no display surface is available this must be `true`.
    pub headless: bool,

    /// Maximum time to wait for the render worker to signal readiness.
    ///
    /// Exceeding it fails `initialize()` with
    /// [`StartupTimeout`](crate::CaptureError::StartupTimeout). Fatal, never
    /// retried automatically.
    ///
    /// # Default
    ///
    /// 60 seconds
    pub startup_timeout: Duration,

    /// Number of render pulses to wait after a load succeeds before the
    /// snapshot is taken.
    ///
    /// This is a timing heuristic, not a content-ready signal: most embedded
    /// engines offer no quiescence notification, so we wait a fixed number
    /// of pulses for layout and zoom changes to visually stabilize. Under
    /// heavy load this can be a source of flakiness. If your engine exposes
    /// a genuine idle signal, prefer folding it into
    /// [`RenderEngine::poll`](crate::engine::RenderEngine::poll) and keeping
    /// this at its default.
    ///
    /// # Default
    ///
    /// 2 pulses
    pub settle_frames: u32,

    /// Memory ceiling (bytes) fed to the zoom governor.
    ///
    /// There is no portable way to ask the runtime for a usable-heap
    /// ceiling, so the budget is configuration. The governor only ever
    /// reduces zoom, so an overly generous value degrades to the requested
    /// zoom being honored.
    ///
    /// # Default
    ///
    /// 512 MiB
    pub memory_limit: u64,

    /// Memory limit above which the zoom governor widens its budget.
    ///
    /// # Default
    ///
    /// 1 GiB
    pub memory_threshold: u64,
}

impl Default for RendererConfig {
    /// Production-ready default configuration.
    ///
    /// - Headless backend selected
    /// - Startup timeout: 60 seconds
    /// - Settle frames: 2 pulses
    /// - Memory limit: 512 MiB, threshold 1 GiB
    fn default() -> Self {
        Self {
            headless: true,
            startup_timeout: Duration::from_secs(60),
            settle_frames: 2,
            memory_limit: 512 * MIB,
            memory_threshold: 1024 * MIB,
        }
    }
}

/// Builder for [`RendererConfig`] with validation.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use htmlsnap::RendererConfigBuilder;
///
/// let config = RendererConfigBuilder::new()
///     .headless(false)
///     .settle_frames(3)
///     .memory_limit(1024 * 1024 * 1024)
///     .build()
///     .expect("Invalid configuration");
/// ```
///
/// # Validation
///
/// The [`build()`](Self::build) method validates:
/// - `startup_timeout` must be non-zero
/// - `memory_limit` must be greater than 0
pub struct RendererConfigBuilder {
    config: RendererConfig,
}

impl RendererConfigBuilder {
    /// Create a new builder with default values.
    pub fn new() -> Self {
        Self {
            config: RendererConfig::default(),
        }
    }

    /// Select a headless-capable engine backend.
    pub fn headless(mut self, headless: bool) -> Self {
        self.config.headless = headless;
        self
    }

    /// Set the worker startup deadline.
    pub fn startup_timeout(mut self, timeout: Duration) -> Self {
        self.config.startup_timeout = timeout;
        self
    }

    /// Set the number of render pulses to wait before snapshotting.
    ///
    /// See [`RendererConfig::settle_frames`] for why this exists and why
    /// you should treat it as a heuristic.
    pub fn settle_frames(mut self, frames: u32) -> Self {
        self.config.settle_frames = frames;
        self
    }

    /// Set the memory ceiling (bytes) for the zoom governor.
    pub fn memory_limit(mut self, bytes: u64) -> Self {
        self.config.memory_limit = bytes;
        self
    }

    /// Set the memory limit above which the zoom budget widens.
    pub fn memory_threshold(mut self, bytes: u64) -> Self {
        self.config.memory_threshold = bytes;
        self
    }

    /// Build the configuration, validating constraints.
    ///
    /// # Errors
    ///
    /// Returns a message describing the first violated constraint.
    pub fn build(self) -> Result<RendererConfig, String> {
        if self.config.startup_timeout.is_zero() {
            return Err("startup_timeout must be non-zero".to_string());
        }
        if self.config.memory_limit == 0 {
            return Err("memory_limit must be greater than 0".to_string());
        }
        Ok(self.config)
    }
}

impl Default for RendererConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Environment Configuration (feature-gated)
// ============================================================================

/// Environment-based configuration loading.
///
/// # Environment Variables
///
/// | Variable | Type | Default | Description |
/// |----------|------|---------|-------------|
/// | `HTMLSNAP_HEADLESS` | bool | true | Select headless backend |
/// | `HTMLSNAP_STARTUP_TIMEOUT_SECONDS` | u64 | 60 | Worker startup deadline |
/// | `HTMLSNAP_SETTLE_FRAMES` | u32 | 2 | Pulses to wait before snapshot |
/// | `HTMLSNAP_MEMORY_LIMIT_MB` | u64 | 512 | Zoom governor memory ceiling |
#[cfg(feature = "env-config")]
pub mod env {
    use super::*;
    use crate::error::CaptureError;

    /// Default environment file name.
    pub const ENV_FILE_NAME: &str = "app.env";

    /// Load environment variables from the `app.env` file.
    ///
    /// Automatically called by [`from_env`]; call it explicitly if you need
    /// the file loaded earlier or want to observe load errors.
    pub fn load_env_file() -> Result<std::path::PathBuf, dotenvy::Error> {
        dotenvy::from_filename(ENV_FILE_NAME)
    }

    /// Load configuration from environment variables.
    ///
    /// Also loads the `app.env` file if present (via `dotenvy`); the file is
    /// optional and silently skipped when absent.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::Configuration`] if the resulting values fail
    /// builder validation.
    pub fn from_env() -> Result<RendererConfig, CaptureError> {
        match load_env_file() {
            Ok(path) => {
                log::info!("Loaded configuration from: {:?}", path);
            }
            Err(e) => {
                log::debug!(
                    "No {} file found or failed to load: {} (using environment variables and defaults)",
                    ENV_FILE_NAME,
                    e
                );
            }
        }

        let headless = std::env::var("HTMLSNAP_HEADLESS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(true);

        let startup_timeout_seconds = std::env::var("HTMLSNAP_STARTUP_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(60u64);

        let settle_frames = std::env::var("HTMLSNAP_SETTLE_FRAMES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(2u32);

        let memory_limit_mb = std::env::var("HTMLSNAP_MEMORY_LIMIT_MB")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(512u64);

        log::info!("Loading renderer configuration from environment:");
        log::info!("   - Headless: {}", headless);
        log::info!("   - Startup timeout: {}s", startup_timeout_seconds);
        log::info!("   - Settle frames: {}", settle_frames);
        log::info!("   - Memory limit: {}MB", memory_limit_mb);

        RendererConfigBuilder::new()
            .headless(headless)
            .startup_timeout(Duration::from_secs(startup_timeout_seconds))
            .settle_frames(settle_frames)
            .memory_limit(memory_limit_mb * MIB)
            .build()
            .map_err(CaptureError::Configuration)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
