//! In-memory feedback source for testing and development.

use async_trait::async_trait;
use std::sync::RwLock;

use crate::error::SourceError;
use crate::traits::source::FeedbackSource;
use crate::types::bulk::FeedbackRecord;

/// In-memory feedback records.
///
/// Useful for testing and development. Not suitable for production
/// as data is lost on restart.
#[derive(Default)]
pub struct MemoryFeedbackSource {
    records: RwLock<Vec<FeedbackRecord>>,
}

impl MemoryFeedbackSource {
    /// Create a new empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a source holding `records`.
    pub fn with_records(records: Vec<FeedbackRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    /// Add one record.
    pub fn push(&self, record: FeedbackRecord) -> Result<(), SourceError> {
        self.records
            .write()
            .map_err(|e| SourceError::Unavailable(e.to_string().into()))?
            .push(record);
        Ok(())
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl FeedbackSource for MemoryFeedbackSource {
    async fn recent_feedback(&self, limit: usize) -> Result<Vec<FeedbackRecord>, SourceError> {
        let records = self
            .records
            .read()
            .map_err(|e| SourceError::Unavailable(e.to_string().into()))?;

        let mut recent = records.clone();
        recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        recent.truncate(limit);
        Ok(recent)
    }
}
