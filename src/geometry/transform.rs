//! Affine mapping from an extraction engine's coordinate space into canonical space.
//!
//! Extraction engines report boxes with a top-left origin; canonical space is
//! bottom-left-up, like PDF user space. A [`CanvasTransform`] is persisted per
//! document and can be re-calibrated by the user.

use serde::{Deserialize, Serialize};

use crate::geometry::BBox;

/// Default canonical canvas width (business-model poster profile).
pub const DEFAULT_CANONICAL_WIDTH: f64 = 1000.0;

/// Default canonical canvas height (business-model poster profile).
pub const DEFAULT_CANONICAL_HEIGHT: f64 = 1400.0;

/// Per-document calibration from source coordinates into canonical space.
///
/// Scales are not validated: zero collapses all geometry onto the offset point
/// and negative values mirror it. Both are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasTransform {
    /// Horizontal scale factor
    pub scale_x: f64,
    /// Vertical scale factor
    pub scale_y: f64,
    /// Horizontal offset applied after scaling
    #[serde(default)]
    pub offset_x: f64,
    /// Vertical offset applied after scaling
    #[serde(default)]
    pub offset_y: f64,
    /// Reflect the vertical axis before scaling (needs the page height)
    #[serde(default)]
    pub flip_y: bool,
}

impl Default for CanvasTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl CanvasTransform {
    /// Identity mapping without a flip.
    pub fn identity() -> Self {
        Self {
            scale_x: 1.0,
            scale_y: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
            flip_y: false,
        }
    }

    /// Fit a page uniformly into a canonical box.
    ///
    /// The scale is `min(canonical_w / page_w, canonical_h / page_h)` on both axes,
    /// offsets are zero and `flip_y` is on.
    ///
    /// # Examples
    ///
    /// ```
    /// use canvas_oxide::geometry::CanvasTransform;
    ///
    /// let t = CanvasTransform::fit_to_canonical(500.0, 1000.0, 1000.0, 1400.0);
    /// assert_eq!(t.scale_x, 1.4);
    /// assert_eq!(t.scale_y, 1.4);
    /// assert!(t.flip_y);
    /// ```
    pub fn fit_to_canonical(
        page_width: f64,
        page_height: f64,
        canonical_width: f64,
        canonical_height: f64,
    ) -> Self {
        let k = (canonical_width / page_width).min(canonical_height / page_height);
        Self {
            scale_x: k,
            scale_y: k,
            offset_x: 0.0,
            offset_y: 0.0,
            flip_y: true,
        }
    }

    /// Set the scale factors.
    pub fn with_scale(mut self, scale_x: f64, scale_y: f64) -> Self {
        self.scale_x = scale_x;
        self.scale_y = scale_y;
        self
    }

    /// Set the offsets.
    pub fn with_offset(mut self, offset_x: f64, offset_y: f64) -> Self {
        self.offset_x = offset_x;
        self.offset_y = offset_y;
        self
    }

    /// Enable or disable the vertical flip.
    pub fn with_flip_y(mut self, flip_y: bool) -> Self {
        self.flip_y = flip_y;
        self
    }

    /// Map a source box into canonical space.
    ///
    /// With `flip_y` set and a known `page_height`, the box is first reflected:
    /// `y0' = h - y1`, `y1' = h - y0`. Without a page height the flip is skipped
    /// and only scale and offset apply.
    ///
    /// # Examples
    ///
    /// ```
    /// use canvas_oxide::geometry::{BBox, CanvasTransform};
    ///
    /// let t = CanvasTransform::identity().with_flip_y(true);
    /// let out = t.to_canonical(&BBox::new(0.0, 0.0, 10.0, 20.0), Some(100.0));
    /// assert_eq!(out, BBox::new(0.0, 80.0, 10.0, 100.0));
    /// ```
    pub fn to_canonical(&self, bbox: &BBox, page_height: Option<f64>) -> BBox {
        let (mut y0, mut y1) = (bbox.y0, bbox.y1);
        if self.flip_y {
            match page_height {
                Some(h) => {
                    let flipped_y0 = h - y1;
                    let flipped_y1 = h - y0;
                    y0 = flipped_y0;
                    y1 = flipped_y1;
                },
                None => log::debug!("flipY requested without page height; flip skipped"),
            }
        }

        BBox::new(
            bbox.x0 * self.scale_x + self.offset_x,
            y0 * self.scale_y + self.offset_y,
            bbox.x1 * self.scale_x + self.offset_x,
            y1 * self.scale_y + self.offset_y,
        )
    }

    /// Map a canonical box back into source space.
    ///
    /// Returns `None` when a scale is zero and the mapping cannot be undone.
    pub fn from_canonical(&self, bbox: &BBox, page_height: Option<f64>) -> Option<BBox> {
        if self.scale_x == 0.0 || self.scale_y == 0.0 {
            return None;
        }

        let x0 = (bbox.x0 - self.offset_x) / self.scale_x;
        let x1 = (bbox.x1 - self.offset_x) / self.scale_x;
        let mut y0 = (bbox.y0 - self.offset_y) / self.scale_y;
        let mut y1 = (bbox.y1 - self.offset_y) / self.scale_y;
        if self.flip_y {
            if let Some(h) = page_height {
                let unflipped_y0 = h - y1;
                let unflipped_y1 = h - y0;
                y0 = unflipped_y0;
                y1 = unflipped_y1;
            }
        }
        Some(BBox::new(x0, y0, x1, y1))
    }
}
