//! Capture statistics.
//!
//! [`CaptureStats`] is a point-in-time snapshot of the renderer's counters,
//! useful for logging and health endpoints. Counters are written by the
//! render worker and read from any thread.

use std::sync::atomic::{AtomicU64, Ordering};

/// Internal atomic counters, shared between the renderer and its worker.
#[derive(Debug, Default)]
pub(crate) struct RendererCounters {
    completed: AtomicU64,
    failed: AtomicU64,
    zoom_reductions: AtomicU64,
}

impl RendererCounters {
    pub(crate) fn record_completed(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_zoom_reduction(&self) {
        self.zoom_reductions.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> CaptureStats {
        CaptureStats {
            completed: self.completed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            zoom_reductions: self.zoom_reductions.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time capture statistics snapshot.
///
/// # Example
///
/// ```rust,ignore
/// let stats = renderer.stats();
/// println!(
///     "completed: {}, failed: {}, zoom reductions: {}",
///     stats.completed, stats.failed, stats.zoom_reductions
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CaptureStats {
    /// Captures that completed successfully (warm-up included).
    pub completed: u64,

    /// Captures that failed with a render or snapshot error.
    pub failed: u64,

    /// Captures whose zoom was reduced by the memory governor.
    ///
    /// Zoom reduction is non-fatal; these captures also count under
    /// `completed` or `failed`.
    pub zoom_reductions: u64,
}

// ============================================================================
// Unit Tests
// ============================================================================
