//! Heading-driven auto-fill of frame fields with traceable evidence.
//!
//! For every field of a [`FrameTemplate`] the assigner looks for text that
//! lexically matches the field name:
//!
//! 1. **Heading strategy**: scan pages in order (blocks sorted top-down) for
//!    the first heading whose normalized text contains every token of the
//!    field name. Up to three following blocks with text on the same page,
//!    stopping at the next section break, become the value. A heading with no
//!    followers contributes its own text (≤120 chars).
//! 2. **Fallback strategy**: the first block anywhere (extraction order) whose
//!    text contains every field token; its text (≤160 chars) is the value.
//! 3. Otherwise the field stays empty. Not finding a value is not an error.
//!
//! Each value carries [`Evidence`] pointing back at the blocks it came from.

pub mod catalog;
pub mod heading;

pub use catalog::{builtin_frames, find_frame, target_frames, FrameTemplate, DEFAULT_TARGET_SLUGS};
pub use heading::{HeadingClassifier, HeadingSignal, RuleBasedHeadingClassifier};

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::geometry::BBox;
use crate::layout::{compare_reading_order, Block};
use crate::text::{truncate_chars, StrippingNormalizer, TextNormalizer};

/// Reference from a derived value back to a source block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evidence {
    /// Id of the source block
    pub block_id: u64,
    /// Page of the source block (0-based)
    pub page: u32,
    /// Box of the source block, exactly as extracted
    pub bbox: BBox,
    /// Leading part of the block text
    pub text_snippet: String,
}

/// One auto-filled field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameField {
    /// Field name from the template
    pub name: String,
    /// Derived value, `None` when nothing matched
    pub value: Option<String>,
    /// Blocks the value was taken from
    pub evidence: Vec<Evidence>,
}

impl FrameField {
    fn empty(name: &str) -> Self {
        Self {
            name: name.to_string(),
            value: None,
            evidence: Vec::new(),
        }
    }
}

/// All fields of one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameAssignment {
    /// Frame slug
    pub slug: String,
    /// Frame display name
    pub name: String,
    /// One entry per template field, in template order
    pub fields: Vec<FrameField>,
}

/// Limits applied while collecting values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameAssignConfig {
    /// Maximum number of body blocks collected under a heading
    pub max_followers: usize,
    /// Maximum chars of a heading used as its own value
    pub heading_value_chars: usize,
    /// Maximum chars of a fallback-strategy value
    pub fallback_value_chars: usize,
    /// Maximum chars of an evidence snippet
    pub snippet_chars: usize,
}

impl Default for FrameAssignConfig {
    fn default() -> Self {
        Self {
            max_followers: 3,
            heading_value_chars: 120,
            fallback_value_chars: 160,
            snippet_chars: 200,
        }
    }
}

/// Per-block data computed once per assignment run.
struct PreparedBlock<'b> {
    block: &'b Block,
    tokens: HashSet<String>,
    signal: HeadingSignal,
}

impl PreparedBlock<'_> {
    fn matches(&self, needle: &[String]) -> bool {
        !self.tokens.is_empty() && needle.iter().all(|t| self.tokens.contains(t))
    }
}

/// Auto-fills frame fields from the blocks of one document.
///
/// Works in source coordinates; no canvas transform is needed.
pub struct FrameAutoAssigner {
    classifier: Box<dyn HeadingClassifier>,
    normalizer: Box<dyn TextNormalizer>,
    config: FrameAssignConfig,
}

impl Default for FrameAutoAssigner {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameAutoAssigner {
    /// Rule-based headings, punctuation-stripping normalization, default limits.
    pub fn new() -> Self {
        Self {
            classifier: Box::new(RuleBasedHeadingClassifier),
            normalizer: Box::new(StrippingNormalizer),
            config: FrameAssignConfig::default(),
        }
    }

    /// Replace the heading classifier.
    pub fn with_classifier(mut self, classifier: Box<dyn HeadingClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Replace the text normalizer.
    pub fn with_normalizer(mut self, normalizer: Box<dyn TextNormalizer>) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Replace the collection limits.
    pub fn with_config(mut self, config: FrameAssignConfig) -> Self {
        self.config = config;
        self
    }

    /// Fill every field of `template` from `blocks`.
    pub fn assign(&self, template: &FrameTemplate, blocks: &[Block]) -> Vec<FrameField> {
        let prepared = self.prepare(blocks);
        let pages = Self::pages_in_reading_order(&prepared);
        template
            .fields
            .iter()
            .map(|name| self.assign_field(name, &prepared, &pages))
            .collect()
    }

    /// Fill several frames from the same blocks.
    pub fn assign_frames(&self, templates: &[FrameTemplate], blocks: &[Block]) -> Vec<FrameAssignment> {
        let prepared = self.prepare(blocks);
        let pages = Self::pages_in_reading_order(&prepared);
        templates
            .iter()
            .map(|template| {
                let fields: Vec<FrameField> = template
                    .fields
                    .iter()
                    .map(|name| self.assign_field(name, &prepared, &pages))
                    .collect();
                log::debug!(
                    "Frame {}: {} of {} fields filled",
                    template.slug,
                    fields.iter().filter(|f| f.value.is_some()).count(),
                    fields.len()
                );
                FrameAssignment {
                    slug: template.slug.clone(),
                    name: template.name.clone(),
                    fields,
                }
            })
            .collect()
    }

    fn prepare<'b>(&self, blocks: &'b [Block]) -> Vec<PreparedBlock<'b>> {
        blocks
            .iter()
            .map(|block| PreparedBlock {
                block,
                tokens: block
                    .text
                    .as_deref()
                    .map(|t| self.normalizer.token_set(t))
                    .unwrap_or_default(),
                signal: self.classifier.classify(block),
            })
            .collect()
    }

    /// Indices into `prepared`, grouped by page (ascending) and sorted top-down.
    fn pages_in_reading_order(prepared: &[PreparedBlock<'_>]) -> BTreeMap<u32, Vec<usize>> {
        let mut pages: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
        for (i, p) in prepared.iter().enumerate() {
            pages.entry(p.block.page).or_default().push(i);
        }
        for indices in pages.values_mut() {
            indices.sort_by(|&a, &b| compare_reading_order(prepared[a].block, prepared[b].block));
        }
        pages
    }

    fn assign_field(
        &self,
        name: &str,
        prepared: &[PreparedBlock<'_>],
        pages: &BTreeMap<u32, Vec<usize>>,
    ) -> FrameField {
        let needle = self.normalizer.tokens(name);
        if needle.is_empty() {
            log::debug!("Field {:?} has no matchable tokens", name);
            return FrameField::empty(name);
        }

        self.from_heading(name, &needle, prepared, pages)
            .or_else(|| self.from_any_block(name, &needle, prepared))
            .unwrap_or_else(|| FrameField::empty(name))
    }

    fn from_heading(
        &self,
        name: &str,
        needle: &[String],
        prepared: &[PreparedBlock<'_>],
        pages: &BTreeMap<u32, Vec<usize>>,
    ) -> Option<FrameField> {
        let (page_order, pos) = pages.values().find_map(|order| {
            order
                .iter()
                .position(|&i| prepared[i].signal.is_heading() && prepared[i].matches(needle))
                .map(|pos| (order, pos))
        })?;
        let heading = prepared[page_order[pos]].block;

        let mut followers: Vec<&Block> = Vec::new();
        for &i in &page_order[pos + 1..] {
            if followers.len() >= self.config.max_followers {
                break;
            }
            if prepared[i].signal.is_section_break() {
                break;
            }
            if prepared[i].block.has_text() {
                followers.push(prepared[i].block);
            }
        }

        if followers.is_empty() {
            let text = heading.text_or_empty();
            return Some(FrameField {
                name: name.to_string(),
                value: Some(truncate_chars(text, self.config.heading_value_chars)),
                evidence: vec![self.evidence(heading)],
            });
        }

        let value = followers
            .iter()
            .map(|b| b.text_or_empty().trim())
            .collect::<Vec<_>>()
            .join(" ");
        Some(FrameField {
            name: name.to_string(),
            value: Some(value),
            evidence: followers.iter().map(|b| self.evidence(b)).collect(),
        })
    }

    fn from_any_block(&self, name: &str, needle: &[String], prepared: &[PreparedBlock<'_>]) -> Option<FrameField> {
        let hit = prepared.iter().find(|p| p.matches(needle))?.block;
        Some(FrameField {
            name: name.to_string(),
            value: Some(truncate_chars(hit.text_or_empty(), self.config.fallback_value_chars)),
            evidence: vec![self.evidence(hit)],
        })
    }

    fn evidence(&self, block: &Block) -> Evidence {
        Evidence {
            block_id: block.id,
            page: block.page,
            bbox: block.bbox,
            text_snippet: truncate_chars(block.text_or_empty(), self.config.snippet_chars),
        }
    }
}

/// Fill every field of `template` with the default assigner.
pub fn auto_assign(template: &FrameTemplate, blocks: &[Block]) -> Vec<FrameField> {
    FrameAutoAssigner::new().assign(template, blocks)
}
