//! Page dimensions observed from block extents.
//!
//! Extraction payloads do not always carry page sizes. The zone mapper only
//! needs a consistent per-page scale, so the page is taken to be as large as
//! the furthest block edge seen on it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::layout::Block;

/// Width and height of one page in source units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageDims {
    /// Page width
    pub w: f64,
    /// Page height
    pub h: f64,
}

impl PageDims {
    /// Create page dimensions.
    pub fn new(w: f64, h: f64) -> Self {
        Self { w, h }
    }

    /// Fallback used when a page has no known dimensions.
    pub fn unit() -> Self {
        Self { w: 1.0, h: 1.0 }
    }
}

/// Derive per-page dimensions as the maximum `x1` / `y1` over the page's blocks.
///
/// # Examples
///
/// ```
/// use canvas_oxide::geometry::BBox;
/// use canvas_oxide::layout::{observe_page_dims, Block, PageDims};
///
/// let blocks = vec![
///     Block::new(0, 0, BBox::new(0.0, 0.0, 300.0, 40.0)),
///     Block::new(1, 0, BBox::new(10.0, 500.0, 120.0, 780.0)),
/// ];
/// let dims = observe_page_dims(&blocks);
/// assert_eq!(dims[&0], PageDims::new(300.0, 780.0));
/// ```
pub fn observe_page_dims(blocks: &[Block]) -> BTreeMap<u32, PageDims> {
    let mut dims: BTreeMap<u32, PageDims> = BTreeMap::new();
    for block in blocks {
        let d = dims.entry(block.page).or_insert(PageDims::new(0.0, 0.0));
        d.w = d.w.max(block.bbox.x1);
        d.h = d.h.max(block.bbox.y1);
    }
    dims
}
