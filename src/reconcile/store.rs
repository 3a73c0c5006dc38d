//! External text records and the store that holds them.
//!
//! The store (typically a vector database) keeps text chunks of a document
//! with metadata but without geometry. Geometry is back-filled through
//! [`TextStore::merge_payload`], which must merge rather than replace.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Record identifier as issued by the store.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    /// Numeric id
    Integer(u64),
    /// UUID or other string id
    String(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Integer(n) => write!(f, "{}", n),
            RecordId::String(s) => f.write_str(s),
        }
    }
}

impl From<u64> for RecordId {
    fn from(n: u64) -> Self {
        RecordId::Integer(n)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId::String(s.to_string())
    }
}

/// A text chunk held by the external store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalTextRecord {
    /// Store-issued id
    pub id: RecordId,
    /// Page number, 1-based (0 when unknown)
    #[serde(default)]
    pub page: u32,
    /// Chunk text
    #[serde(default)]
    pub text: String,
    /// Remote identifier of the source file, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
    /// Name of the source file, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Everything else the store keeps for this record
    #[serde(default)]
    pub payload: Map<String, Value>,
}

impl ExternalTextRecord {
    /// Create a record without file metadata.
    pub fn new(id: impl Into<RecordId>, page: u32, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            page,
            text: text.into(),
            file_id: None,
            filename: None,
            payload: Map::new(),
        }
    }

    /// Set the remote file id.
    pub fn with_file_id(mut self, file_id: impl Into<String>) -> Self {
        self.file_id = Some(file_id.into());
        self
    }

    /// Set the file name.
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// 0-based page (`page - 1`, floored at 0).
    pub fn page0(&self) -> u32 {
        self.page.saturating_sub(1)
    }
}

/// Which records to fetch.
///
/// A filename, when given, takes precedence and the file id is not used for
/// filtering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordFilter {
    /// Remote file id
    pub file_id: Option<String>,
    /// File name
    pub filename: Option<String>,
    /// Maximum number of records to return
    pub limit: usize,
}

impl RecordFilter {
    /// Whether `record` passes this filter (ignoring `limit`).
    pub fn matches(&self, record: &ExternalTextRecord) -> bool {
        if let Some(name) = &self.filename {
            return record.filename.as_ref() == Some(name);
        }
        match &self.file_id {
            Some(id) => record.file_id.as_ref() == Some(id),
            None => true,
        }
    }
}

/// Store of external text records.
pub trait TextStore: Send + Sync {
    /// Fetch up to `filter.limit` records passing `filter`.
    fn fetch_records(&self, filter: &RecordFilter) -> Result<Vec<ExternalTextRecord>>;

    /// Merge `patch` into the payload of every record in `ids`.
    ///
    /// Keys present in `patch` overwrite, all other payload keys are kept.
    fn merge_payload(&self, ids: &[RecordId], patch: &Map<String, Value>) -> Result<()>;
}

/// In-memory [`TextStore`] with merge semantics.
#[derive(Debug, Default)]
pub struct MemoryTextStore {
    records: RwLock<BTreeMap<RecordId, ExternalTextRecord>>,
}

impl MemoryTextStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `records`.
    pub fn with_records(records: impl IntoIterator<Item = ExternalTextRecord>) -> Self {
        let map = records.into_iter().map(|r| (r.id.clone(), r)).collect();
        Self {
            records: RwLock::new(map),
        }
    }

    /// Insert or replace a record.
    pub fn insert(&self, record: ExternalTextRecord) {
        let mut records = self.records.write().unwrap_or_else(|e| e.into_inner());
        records.insert(record.id.clone(), record);
    }

    /// Current state of a record.
    pub fn get(&self, id: &RecordId) -> Option<ExternalTextRecord> {
        let records = self.records.read().unwrap_or_else(|e| e.into_inner());
        records.get(id).cloned()
    }
}

impl TextStore for MemoryTextStore {
    fn fetch_records(&self, filter: &RecordFilter) -> Result<Vec<ExternalTextRecord>> {
        let records = self.records.read().unwrap_or_else(|e| e.into_inner());
        Ok(records
            .values()
            .filter(|r| filter.matches(r))
            .take(filter.limit)
            .cloned()
            .collect())
    }

    fn merge_payload(&self, ids: &[RecordId], patch: &Map<String, Value>) -> Result<()> {
        let mut records = self.records.write().unwrap_or_else(|e| e.into_inner());
        if let Some(missing) = ids.iter().find(|id| !records.contains_key(*id)) {
            return Err(Error::Store(format!("unknown record {}", missing)));
        }
        for id in ids {
            if let Some(record) = records.get_mut(id) {
                for (key, value) in patch {
                    record.payload.insert(key.clone(), value.clone());
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> MemoryTextStore {
        MemoryTextStore::with_records(vec![
            ExternalTextRecord::new(1, 1, "alpha").with_filename("a.pdf").with_file_id("f-a"),
            ExternalTextRecord::new(2, 2, "beta").with_filename("b.pdf").with_file_id("f-b"),
            ExternalTextRecord::new("c", 1, "gamma").with_filename("a.pdf").with_file_id("f-a"),
        ])
    }

    #[test]
    fn test_filename_takes_precedence() {
        let filter = RecordFilter {
            file_id: Some("f-b".into()),
            filename: Some("a.pdf".into()),
            limit: 100,
        };
        let records = store().fetch_records(&filter).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.filename.as_deref() == Some("a.pdf")));
    }

    #[test]
    fn test_filter_by_file_id_and_limit() {
        let filter = RecordFilter {
            file_id: Some("f-a".into()),
            filename: None,
            limit: 1,
        };
        assert_eq!(store().fetch_records(&filter).unwrap().len(), 1);
    }

    #[test]
    fn test_merge_preserves_other_keys() {
        let s = store();
        let id = RecordId::from(1);
        let mut first = Map::new();
        first.insert("source".into(), json!("ocr"));
        first.insert("page".into(), json!(7));
        s.merge_payload(&[id.clone()], &first).unwrap();

        let mut second = Map::new();
        second.insert("page".into(), json!(0));
        s.merge_payload(&[id.clone()], &second).unwrap();

        let payload = s.get(&id).unwrap().payload;
        assert_eq!(payload["source"], json!("ocr"));
        assert_eq!(payload["page"], json!(0));
    }

    #[test]
    fn test_merge_unknown_record_fails() {
        let err = store().merge_payload(&[RecordId::from(99)], &Map::new()).unwrap_err();
        assert!(matches!(err, Error::Store(_)));
    }

    #[test]
    fn test_record_id_json_forms() {
        let ids: Vec<RecordId> = serde_json::from_value(json!([5, "uuid-1"])).unwrap();
        assert_eq!(ids, vec![RecordId::Integer(5), RecordId::String("uuid-1".into())]);
        assert_eq!(ids[1].to_string(), "uuid-1");
    }

    #[test]
    fn test_page0() {
        assert_eq!(ExternalTextRecord::new(1, 3, "").page0(), 2);
        assert_eq!(ExternalTextRecord::new(1, 0, "").page0(), 0);
    }
}
