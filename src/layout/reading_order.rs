//! Page grouping and approximate reading order for extracted blocks.
//!
//! Pages are always visited in ascending page number (a `BTreeMap`), never in
//! container insertion order, so results are deterministic.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::layout::Block;

/// Group blocks by page, keeping extraction order within each page.
///
/// # Examples
///
/// ```
/// use canvas_oxide::geometry::BBox;
/// use canvas_oxide::layout::{group_by_page, Block};
///
/// let blocks = vec![
///     Block::new(0, 1, BBox::new(0.0, 0.0, 1.0, 1.0)),
///     Block::new(1, 0, BBox::new(0.0, 0.0, 1.0, 1.0)),
/// ];
/// let pages = group_by_page(&blocks);
/// assert_eq!(pages.keys().copied().collect::<Vec<_>>(), vec![0, 1]);
/// ```
pub fn group_by_page(blocks: &[Block]) -> BTreeMap<u32, Vec<&Block>> {
    let mut pages: BTreeMap<u32, Vec<&Block>> = BTreeMap::new();
    for block in blocks {
        pages.entry(block.page).or_default().push(block);
    }
    pages
}

/// Group blocks by page and sort each page top-down.
///
/// The sort key is the smaller vertical coordinate of the box, tie-broken by
/// block id. This is the source-space order (top-left origin), not canonical.
pub fn reading_order(blocks: &[Block]) -> BTreeMap<u32, Vec<&Block>> {
    let mut pages = group_by_page(blocks);
    for page in pages.values_mut() {
        page.sort_by(|a, b| compare_reading_order(a, b));
    }
    pages
}

/// Ordering used by [`reading_order`].
pub fn compare_reading_order(a: &Block, b: &Block) -> Ordering {
    a.bbox
        .min_y()
        .total_cmp(&b.bbox.min_y())
        .then_with(|| a.id.cmp(&b.id))
}
