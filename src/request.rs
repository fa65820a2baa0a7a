//! Capture request type and validation.
//!
//! A [`CaptureRequest`] describes one document to rasterize: the source
//! (markup text or a URL), target dimensions in points, and a requested zoom
//! factor. Requests are immutable and caller-owned until submitted to
//! [`HtmlRenderer::capture`](crate::HtmlRenderer::capture).
//!
//! # Dimensions
//!
//! Widths and heights are given in typographic points (1/72 inch) and are
//! converted to CSS pixels at 96 DPI before the viewport is sized, so a
//! 720 pt wide request at zoom 1 produces a buffer about 960 px wide.
//! A `height_pt` of 0 means "auto": the height is resolved from the rendered
//! content after the document loads.
//!
//! # Example
//!
//! ```rust
//! use htmlsnap::CaptureRequest;
//!
//! let request = CaptureRequest::plain_text("<h1>Packing slip</h1>", 288.0)
//!     .with_zoom(2.0);
//!
//! assert!(request.is_plain_text);
//! assert_eq!(request.height_pt, 0.0);
//! assert!(request.validate().is_ok());
//! ```

use crate::error::{CaptureError, Result};

/// CSS pixels per typographic point (96 DPI / 72 pt-per-inch).
pub const CSS_PX_PER_PT: f64 = 96.0 / 72.0;

/// One document to rasterize.
///
/// Construct with [`plain_text`](Self::plain_text) /
/// [`from_url`](Self::from_url) and the `with_*` modifiers, or fill the
/// fields directly.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CaptureRequest {
    /// Markup text, or a URL when `is_plain_text` is false.
    pub source: String,

    /// Whether `source` is inline markup (`true`) or a URL (`false`).
    pub is_plain_text: bool,

    /// Target width in points. Must be strictly positive.
    pub width_pt: f64,

    /// Target height in points. 0 means auto-fit to rendered content.
    pub height_pt: f64,

    /// Requested scale factor. Must be strictly positive. The effective zoom
    /// may be reduced (never increased) by the memory-aware zoom governor.
    pub zoom: f64,
}

impl CaptureRequest {
    /// Request for inline markup with auto-fit height and zoom 1.
    pub fn plain_text<S: Into<String>>(markup: S, width_pt: f64) -> Self {
        Self {
            source: markup.into(),
            is_plain_text: true,
            width_pt,
            height_pt: 0.0,
            zoom: 1.0,
        }
    }

    /// Request loading from a URL with auto-fit height and zoom 1.
    pub fn from_url<S: Into<String>>(url: S, width_pt: f64) -> Self {
        Self {
            source: url.into(),
            is_plain_text: false,
            width_pt,
            height_pt: 0.0,
            zoom: 1.0,
        }
    }

    /// Set a fixed height in points (0 restores auto-fit).
    pub fn with_height(mut self, height_pt: f64) -> Self {
        self.height_pt = height_pt;
        self
    }

    /// Set the requested zoom factor.
    pub fn with_zoom(mut self, zoom: f64) -> Self {
        self.zoom = zoom;
        self
    }

    /// Target width in CSS pixels (before zoom).
    pub fn page_width_px(&self) -> f64 {
        self.width_pt * CSS_PX_PER_PT
    }

    /// Target height in CSS pixels (before zoom); 0 when auto-fit.
    pub fn page_height_px(&self) -> f64 {
        self.height_pt * CSS_PX_PER_PT
    }

    /// Validate the request before submission.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::InvalidRequest`] when:
    /// - `width_pt` is not strictly positive or not finite
    /// - `height_pt` is negative or not finite
    /// - `zoom` is not strictly positive or not finite
    /// - `source` is empty
    /// - `is_plain_text` is false and `source` does not parse as an
    ///   absolute URL
    pub fn validate(&self) -> Result<()> {
        if !self.width_pt.is_finite() || self.width_pt <= 0.0 {
            return Err(CaptureError::InvalidRequest(format!(
                "width_pt must be positive, got {}",
                self.width_pt
            )));
        }
        if !self.height_pt.is_finite() || self.height_pt < 0.0 {
            return Err(CaptureError::InvalidRequest(format!(
                "height_pt must be zero (auto) or positive, got {}",
                self.height_pt
            )));
        }
        if !self.zoom.is_finite() || self.zoom <= 0.0 {
            return Err(CaptureError::InvalidRequest(format!(
                "zoom must be positive, got {}",
                self.zoom
            )));
        }
        if self.source.is_empty() {
            return Err(CaptureError::InvalidRequest(
                "source must not be empty".to_string(),
            ));
        }
        if !self.is_plain_text {
            url::Url::parse(&self.source).map_err(|e| {
                CaptureError::InvalidRequest(format!("source is not a valid URL: {}", e))
            })?;
        }
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Verifies constructor defaults: auto height, zoom 1.
    #[test]
    fn test_plain_text_defaults() {
        let request = CaptureRequest::plain_text("<p>hi</p>", 144.0);

        assert!(request.is_plain_text);
        assert_eq!(request.width_pt, 144.0);
        assert_eq!(request.height_pt, 0.0);
        assert_eq!(request.zoom, 1.0);
        assert!(request.validate().is_ok());
    }

    /// Verifies the point to CSS pixel conversion (96/72).
    #[test]
    fn test_page_dimensions_px() {
        let request = CaptureRequest::plain_text("x", 720.0).with_height(360.0);

        assert_eq!(request.page_width_px(), 960.0);
        assert_eq!(request.page_height_px(), 480.0);
    }

    /// Verifies that non-positive width and zoom are rejected.
    #[test]
    fn test_validation_rejects_bad_numbers() {
        let request = CaptureRequest::plain_text("x", 0.0);
        assert!(matches!(
            request.validate(),
            Err(CaptureError::InvalidRequest(_))
        ));

        let request = CaptureRequest::plain_text("x", 100.0).with_zoom(0.0);
        assert!(matches!(
            request.validate(),
            Err(CaptureError::InvalidRequest(_))
        ));

        let request = CaptureRequest::plain_text("x", 100.0).with_height(-5.0);
        assert!(matches!(
            request.validate(),
            Err(CaptureError::InvalidRequest(_))
        ));

        let request = CaptureRequest::plain_text("x", f64::NAN);
        assert!(request.validate().is_err());
    }

    /// Verifies URL validation for non-plain-text sources.
    #[test]
    fn test_validation_url_sources() {
        let request = CaptureRequest::from_url("https://example.com/label", 288.0);
        assert!(request.validate().is_ok());

        let request = CaptureRequest::from_url("not a url", 288.0);
        assert!(matches!(
            request.validate(),
            Err(CaptureError::InvalidRequest(_))
        ));
    }

    /// Verifies that empty sources are rejected.
    #[test]
    fn test_validation_empty_source() {
        let request = CaptureRequest::plain_text("", 100.0);
        assert!(request.validate().is_err());
    }
}
