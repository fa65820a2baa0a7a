//! Memory-aware zoom governor.
//!
//! Zooming multiplies the pixel area of the capture surface, and the engine
//! keeps the whole surface in memory. This module computes the maximum scale
//! factor that fits a given page into a memory budget, so captures degrade to
//! a lower zoom instead of exhausting memory.
//!
//! The functions here are pure: deterministic given the memory ceiling, the
//! headless policy, and the requested dimensions. The ceiling itself comes
//! from [`RendererConfig::memory_limit`](crate::RendererConfig::memory_limit).

/// Memory budget allowance exponent when the ceiling is at most the
/// configured threshold.
const BASE_ALLOWANCE: u32 = 2;

/// Allowance exponent when the ceiling exceeds the threshold.
const WIDE_ALLOWANCE: u32 = 3;

/// Divisor folding bytes-per-pixel overhead into the usable-area estimate.
const AREA_DIVISOR: f64 = 72.0;

/// Maximum zoom that keeps a `width` x `height` (CSS px) page within the
/// memory budget.
///
/// The budget widens (one more doubling) when `memory_limit` exceeds
/// `memory_threshold`, and narrows (one less doubling) under the headless
/// backend, which renders in software and pays for surfaces twice.
///
/// The result is unbounded above; callers compare it against the requested
/// zoom and only ever reduce. Degenerate dimensions (zero or negative area)
/// return 0.0.
pub fn max_supported_zoom(
    width: f64,
    height: f64,
    memory_limit: u64,
    memory_threshold: u64,
    headless: bool,
) -> f64 {
    let area = width * height;
    if !area.is_finite() || area <= 0.0 {
        return 0.0;
    }

    let mut allowance = if memory_limit > memory_threshold {
        WIDE_ALLOWANCE
    } else {
        BASE_ALLOWANCE
    };
    if headless {
        allowance -= 1;
    }

    let avail_space = (memory_limit << allowance) as f64 / AREA_DIVISOR;

    (avail_space / area).sqrt()
}

// ============================================================================
// Unit Tests
// ============================================================================
