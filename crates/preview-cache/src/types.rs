//! Cache types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Length of a handle in its string form (a hyphenated UUID).
pub const HANDLE_LEN: usize = 36;

/// Opaque identifier of a cached artifact
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Handle(String);

impl Handle {
    /// Generate a fresh random handle
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Accept a caller-supplied handle if it has the expected length.
    ///
    /// Anything else is not a handle at all, so callers fall back to
    /// rendering from inline input instead of reporting a malformed key.
    pub fn parse(value: &str) -> Option<Self> {
        (value.len() == HANDLE_LEN).then(|| Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One stored preview submission.
///
/// Rows are write-once: fields are only readable after construction.
#[derive(Debug, Clone)]
pub struct CacheRow {
    definition: String,
    data: String,
    is_sample: bool,
    pdf: Option<Vec<u8>>,
    pdf_size: u64,
    created_at: DateTime<Utc>,
}

impl CacheRow {
    /// Build a row from the serialized definition and data of a submission
    pub fn new(
        definition: String,
        data: String,
        is_sample: bool,
        pdf: Option<Vec<u8>>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let pdf_size = pdf.as_ref().map_or(0, |bytes| bytes.len() as u64);
        Self {
            definition,
            data,
            is_sample,
            pdf,
            pdf_size,
            created_at,
        }
    }

    pub fn definition(&self) -> &str {
        &self.definition
    }

    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn is_sample(&self) -> bool {
        self.is_sample
    }

    pub fn pdf(&self) -> Option<&[u8]> {
        self.pdf.as_deref()
    }

    pub fn pdf_size(&self) -> u64 {
        self.pdf_size
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub(crate) fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }
}

/// Statistics about the cache
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: usize,
    pub total_size: u64,
    pub hits: u64,
    pub misses: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_handle_has_fixed_length() {
        let handle = Handle::generate();
        assert_eq!(handle.as_str().len(), HANDLE_LEN);
        assert_ne!(handle, Handle::generate());
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        assert!(Handle::parse("").is_none());
        assert!(Handle::parse("abc").is_none());
        assert!(Handle::parse(&"x".repeat(37)).is_none());

        let generated = Handle::generate();
        assert_eq!(Handle::parse(generated.as_str()), Some(generated));
    }

    #[test]
    fn test_row_pdf_size_tracks_bytes() {
        let row = CacheRow::new(
            "{}".to_string(),
            "{}".to_string(),
            true,
            Some(vec![0u8; 42]),
            Utc::now(),
        );
        assert_eq!(row.pdf_size(), 42);
        assert_eq!(row.pdf().map(<[u8]>::len), Some(42));

        let row = CacheRow::new("{}".to_string(), "{}".to_string(), false, None, Utc::now());
        assert_eq!(row.pdf_size(), 0);
        assert!(row.pdf().is_none());
    }

    #[test]
    fn test_cache_stats_default() {
        let stats = CacheStats::default();
        assert_eq!(stats.entries, 0);
        assert_eq!(stats.total_size, 0);
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
    }

    #[test]
    fn test_handle_serializes_as_string() {
        let handle = Handle::generate();
        let json = serde_json::to_string(&handle).unwrap();
        assert_eq!(json, format!("\"{}\"", handle));
    }
}
