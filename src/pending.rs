//! Per-request synchronization record.
//!
//! A [`PendingCapture`] links one in-flight capture request to its eventual
//! result or error: the caller blocks on the completion latch while the
//! worker thread fills exactly one of the two slots and releases it.
//!
//! Ownership flow: created by the coordinator, shared with the worker via
//! `Arc`, written once by the worker, consumed once by the unblocked caller,
//! then dropped. The coordinator's capture mutex guarantees at most one
//! record is active at any instant.

use std::sync::{Condvar, Mutex};

use image::RgbaImage;

use crate::error::{CaptureError, Result};

/// Completion latch plus result/error slots for one capture.
pub(crate) struct PendingCapture {
    /// Latch state guarded for the condvar. False until the worker posts.
    done: Mutex<bool>,
    signal: Condvar,

    /// Result slot, written by the worker on success.
    image: Mutex<Option<RgbaImage>>,

    /// Error slot, written by the worker on failure.
    error: Mutex<Option<CaptureError>>,
}

impl PendingCapture {
    pub(crate) fn new() -> Self {
        Self {
            done: Mutex::new(false),
            signal: Condvar::new(),
            image: Mutex::new(None),
            error: Mutex::new(None),
        }
    }

    /// Post a successful capture and release the waiting caller.
    pub(crate) fn complete(&self, image: RgbaImage) {
        *self.image.lock().unwrap() = Some(image);
        self.release();
    }

    /// Post a failure and release the waiting caller.
    pub(crate) fn fail(&self, error: CaptureError) {
        *self.error.lock().unwrap() = Some(error);
        self.release();
    }

    fn release(&self) {
        let mut done = self.done.lock().unwrap();
        *done = true;
        self.signal.notify_all();
    }

    /// Block until the worker posts, then consume the outcome.
    ///
    /// No timeout: a capture that never completes hangs its caller. That is
    /// deliberate, as there is no watchdog and no cancellation once a job is
    /// submitted to the worker.
    pub(crate) fn wait(&self) -> Result<RgbaImage> {
        let mut done = self.done.lock().unwrap();
        while !*done {
            done = self.signal.wait(done).unwrap();
        }
        drop(done);

        if let Some(error) = self.error.lock().unwrap().take() {
            return Err(error);
        }
        self.image
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| CaptureError::CaptureFailure("worker posted no result".to_string()))
    }

    /// Whether either slot has been written yet. Used by `clear()` checks.
    pub(crate) fn is_done(&self) -> bool {
        *self.done.lock().unwrap()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
