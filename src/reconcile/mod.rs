//! Spatial reconciliation: back-fill geometry onto external text records.
//!
//! An external store holds the text of a document without bounding boxes. A
//! fresh extraction of the same source yields boxes but new, unstable block
//! identities. [`SpatialReconciler`] pairs the two by text similarity, page by
//! page, and merge-writes `{bbox, page}` onto every record it can pair.
//!
//! Re-running is safe: a record matched again simply receives the same (or a
//! re-derived) box. Every write carries a `geometryUpdatedAt` timestamp so
//! that readers can pick the latest of two divergent runs.

pub mod similarity;
pub mod source;
pub mod store;

pub use similarity::{overlap_coefficient, Similarity, TokenOverlap};
pub use source::{ChainedResolver, LocalSourceResolver, SourceLocator, SourceResolver};
pub use store::{ExternalTextRecord, MemoryTextStore, RecordFilter, RecordId, TextStore};

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, RecvTimeoutError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::{Error, Result};
use crate::extract::{Extraction, Extractor};
use crate::geometry::BBox;
use crate::layout::Block;

/// Default minimum similarity for a match.
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.6;

/// Default maximum number of records fetched per document.
pub const DEFAULT_RECORD_LIMIT: usize = 100;

/// Tuning knobs for [`SpatialReconciler`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconcilerConfig {
    /// Minimum score for a candidate to be accepted
    pub match_threshold: f64,
    /// Maximum number of records fetched per document
    pub record_limit: usize,
    /// Upper bound on one extraction run (`None` = unbounded)
    pub extraction_timeout: Option<Duration>,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            record_limit: DEFAULT_RECORD_LIMIT,
            extraction_timeout: None,
        }
    }
}

impl ReconcilerConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the match threshold.
    pub fn with_match_threshold(mut self, threshold: f64) -> Self {
        self.match_threshold = threshold;
        self
    }

    /// Set the record limit.
    pub fn with_record_limit(mut self, limit: usize) -> Self {
        self.record_limit = limit;
        self
    }

    /// Bound extraction time.
    pub fn with_extraction_timeout(mut self, timeout: Duration) -> Self {
        self.extraction_timeout = Some(timeout);
        self
    }
}

/// One document to reconcile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileRequest {
    /// Remote id of the source file
    pub file_id: Option<String>,
    /// Name of the source file; when given, records are selected by name only
    pub filename: Option<String>,
    /// Overrides [`ReconcilerConfig::record_limit`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl ReconcileRequest {
    /// Request by file name.
    pub fn by_filename(filename: impl Into<String>) -> Self {
        Self {
            filename: Some(filename.into()),
            ..Self::default()
        }
    }

    /// Request by remote file id.
    pub fn by_file_id(file_id: impl Into<String>) -> Self {
        Self {
            file_id: Some(file_id.into()),
            ..Self::default()
        }
    }
}

/// Geometry written onto a record, in source units (top-left origin).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecordBox {
    /// Left edge
    pub x: f64,
    /// Top edge
    pub y: f64,
    /// Width (never negative)
    pub w: f64,
    /// Height (never negative)
    pub h: f64,
}

impl From<&BBox> for RecordBox {
    fn from(b: &BBox) -> Self {
        Self {
            x: b.x0,
            y: b.y0,
            w: (b.x1 - b.x0).max(0.0),
            h: (b.y1 - b.y0).max(0.0),
        }
    }
}

/// What happened to one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum RecordOutcome {
    /// Paired with a block and written back
    Matched {
        /// Record id
        id: RecordId,
        /// Id of the block in the fresh extraction
        block_id: u64,
        /// Similarity of the pair
        score: f64,
        /// 0-based page written
        page: u32,
        /// Box written
        bbox: RecordBox,
    },
    /// No candidate reached the threshold
    Unmatched {
        /// Record id
        id: RecordId,
        /// Best score seen (0 when the page had no candidates)
        best_score: f64,
    },
    /// Paired, but the store rejected the write
    WriteFailed {
        /// Record id
        id: RecordId,
        /// Store error message
        error: String,
    },
}

impl RecordOutcome {
    /// Whether geometry was written for the record.
    pub fn is_matched(&self) -> bool {
        matches!(self, RecordOutcome::Matched { .. })
    }
}

/// Result of reconciling one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    /// Resolved source file, if extraction ran
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
    /// Records written back
    pub matched: usize,
    /// Records considered
    pub total: usize,
    /// Per-record outcome, in fetch order
    pub outcomes: Vec<RecordOutcome>,
}

/// Outcome of one document in a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItem {
    /// The request as given
    pub request: ReconcileRequest,
    /// Whether the document was reconciled
    pub ok: bool,
    /// Report when `ok`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<ReconcileReport>,
    /// Error message when not `ok`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of [`SpatialReconciler::reconcile_batch`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    /// Records matched across all documents
    pub matched: usize,
    /// One entry per request, in request order
    pub items: Vec<BatchItem>,
}

/// Pairs external text records with freshly extracted blocks.
pub struct SpatialReconciler {
    extractor: Arc<dyn Extractor>,
    store: Arc<dyn TextStore>,
    resolver: Arc<dyn SourceResolver>,
    similarity: Box<dyn Similarity>,
    config: ReconcilerConfig,
}

impl SpatialReconciler {
    /// Create a reconciler with [`TokenOverlap`] similarity and default config.
    pub fn new(extractor: Arc<dyn Extractor>, store: Arc<dyn TextStore>, resolver: Arc<dyn SourceResolver>) -> Self {
        Self {
            extractor,
            store,
            resolver,
            similarity: Box::new(TokenOverlap::default()),
            config: ReconcilerConfig::default(),
        }
    }

    /// Replace the similarity strategy.
    pub fn with_similarity(mut self, similarity: Box<dyn Similarity>) -> Self {
        self.similarity = similarity;
        self
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: ReconcilerConfig) -> Self {
        self.config = config;
        self
    }

    /// Current configuration.
    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// Reconcile one document.
    ///
    /// Fails (without writing anything) when the source cannot be resolved,
    /// extraction fails or times out, or the store cannot be read. Records
    /// that match nothing, or whose write is rejected, are reported per
    /// record and do not fail the run.
    pub fn reconcile(&self, request: &ReconcileRequest) -> Result<ReconcileReport> {
        // a filename selects records on its own
        let filter = RecordFilter {
            file_id: if request.filename.is_some() {
                None
            } else {
                request.file_id.clone()
            },
            filename: request.filename.clone(),
            limit: request.limit.unwrap_or(self.config.record_limit),
        };
        let records = self.store.fetch_records(&filter)?;
        if records.is_empty() {
            log::info!("No records to reconcile for {:?}", filter);
            return Ok(ReconcileReport::default());
        }

        let locator = Self::locator_for(request, &records);
        let source = self
            .resolver
            .resolve(&locator)?
            .ok_or_else(|| Error::UnresolvableSource(locator.describe()))?;
        let extraction = self.extract_bounded(source.clone())?;
        let pages = group_by_page0(&extraction.blocks);

        let mut report = ReconcileReport {
            source: Some(source),
            total: records.len(),
            ..ReconcileReport::default()
        };
        for record in &records {
            let outcome = self.reconcile_record(record, &pages);
            if outcome.is_matched() {
                report.matched += 1;
            }
            report.outcomes.push(outcome);
        }

        log::info!(
            "Reconciled {}: {} of {} records matched",
            locator.describe(),
            report.matched,
            report.total
        );
        Ok(report)
    }

    /// Reconcile several documents; one failing document does not stop the rest.
    pub fn reconcile_batch(&self, requests: &[ReconcileRequest]) -> BatchReport {
        let mut batch = BatchReport::default();
        for request in requests {
            let item = match self.reconcile(request) {
                Ok(report) => {
                    batch.matched += report.matched;
                    BatchItem {
                        request: request.clone(),
                        ok: true,
                        report: Some(report),
                        error: None,
                    }
                },
                Err(e) => {
                    log::warn!("Reconciliation failed for {:?}: {}", request, e);
                    BatchItem {
                        request: request.clone(),
                        ok: false,
                        report: None,
                        error: Some(e.to_string()),
                    }
                },
            };
            batch.items.push(item);
        }
        batch
    }

    /// File id from the request, else from the first record; file name likewise.
    ///
    /// A request file name overrides its file id, so the id then comes from
    /// the first record only.
    fn locator_for(request: &ReconcileRequest, records: &[ExternalTextRecord]) -> SourceLocator {
        let first = records.first();
        let request_file_id = match request.filename {
            Some(_) => None,
            None => request.file_id.clone(),
        };
        SourceLocator {
            file_id: request_file_id.or_else(|| first.and_then(|r| r.file_id.clone())),
            filename: request
                .filename
                .clone()
                .or_else(|| first.and_then(|r| r.filename.clone())),
        }
    }

    fn extract_bounded(&self, source: PathBuf) -> Result<Extraction> {
        let Some(limit) = self.config.extraction_timeout else {
            return self.extractor.extract(&source);
        };

        let extractor = Arc::clone(&self.extractor);
        let name = extractor.name();
        let (tx, rx) = bounded(1);
        let worker_source = source.clone();
        thread::spawn(move || {
            // receiver may be gone after a timeout
            let _ = tx.send(extractor.extract(&worker_source));
        });

        match rx.recv_timeout(limit) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(Error::Timeout {
                operation: format!("{} extraction of {}", name, source.display()),
                millis: limit.as_millis(),
            }),
            Err(RecvTimeoutError::Disconnected) => Err(Error::extraction(name, "extraction worker terminated")),
        }
    }

    fn reconcile_record(&self, record: &ExternalTextRecord, pages: &BTreeMap<u32, Vec<&Block>>) -> RecordOutcome {
        let page0 = record.page0();
        let candidates = pages.get(&page0).map(Vec::as_slice).unwrap_or(&[]);

        let mut best: Option<(&Block, f64)> = None;
        let mut best_score = 0.0_f64;
        for block in candidates {
            let score = self.similarity.score(&record.text, block.text_or_empty());
            best_score = best_score.max(score);
            // strict comparison keeps the first of equal candidates
            if score >= self.config.match_threshold && best.map_or(true, |(_, s)| score > s) {
                best = Some((block, score));
            }
        }

        let Some((block, score)) = best else {
            log::debug!("Record {} on page {} unmatched (best {:.2})", record.id, page0, best_score);
            return RecordOutcome::Unmatched {
                id: record.id.clone(),
                best_score,
            };
        };

        let bbox = RecordBox::from(&block.bbox);
        let patch = geometry_patch(&bbox, page0);
        match self.store.merge_payload(std::slice::from_ref(&record.id), &patch) {
            Ok(()) => RecordOutcome::Matched {
                id: record.id.clone(),
                block_id: block.id,
                score,
                page: page0,
                bbox,
            },
            Err(e) => {
                log::warn!("Writing geometry for record {} failed: {}", record.id, e);
                RecordOutcome::WriteFailed {
                    id: record.id.clone(),
                    error: e.to_string(),
                }
            },
        }
    }
}

/// Blocks keyed by their (0-based) page, in extraction order within a page.
fn group_by_page0(blocks: &[Block]) -> BTreeMap<u32, Vec<&Block>> {
    let mut pages: BTreeMap<u32, Vec<&Block>> = BTreeMap::new();
    for block in blocks {
        pages.entry(block.page).or_default().push(block);
    }
    pages
}

/// Merge patch written onto a matched record.
fn geometry_patch(bbox: &RecordBox, page0: u32) -> Map<String, Value> {
    let mut patch = Map::new();
    patch.insert("bbox".into(), json!({ "x": bbox.x, "y": bbox.y, "w": bbox.w, "h": bbox.h }));
    patch.insert("page".into(), json!(page0));
    patch.insert("geometryUpdatedAt".into(), json!(chrono::Utc::now().to_rfc3339()));
    patch
}
