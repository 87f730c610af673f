//! Feedback source trait.
//!
//! The analysis pipeline never writes to storage. The application supplies
//! stored feedback through this trait for bulk summarization.

use async_trait::async_trait;

use crate::error::SourceError;
use crate::types::bulk::FeedbackRecord;

/// Read-only access to stored feedback.
#[async_trait]
pub trait FeedbackSource: Send + Sync {
    /// Most recent feedback first, at most `limit` records.
    async fn recent_feedback(&self, limit: usize) -> Result<Vec<FeedbackRecord>, SourceError>;
}
