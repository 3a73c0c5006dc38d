//! Extracted blocks and their page-level organisation.
//!
//! This module provides:
//! - [`Block`] / [`BlockRole`]: the text regions produced by extraction engines
//! - Page grouping and top-down reading order
//! - Observed page dimensions derived from block extents

pub mod block;
pub mod page_dims;
pub mod reading_order;

// Re-export main types
pub use block::{Block, BlockRole};
pub use page_dims::{observe_page_dims, PageDims};
pub use reading_order::{compare_reading_order, group_by_page, reading_order};
