//! Commit marker closing a change-set

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::Revision;

/// Marks the end of a change-set and carries the commit metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitEvent {
    /// Revision created by this commit
    pub revision: Revision,
    /// Who committed
    pub author: String,
    /// When the commit happened in the source store
    pub timestamp: DateTime<Utc>,
    /// Free-form commit message
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
}

impl CommitEvent {
    /// Create a commit event.
    pub fn new(revision: Revision, author: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            revision,
            author: author.into(),
            timestamp,
            message: String::new(),
        }
    }

    /// Builder-style setter for the commit message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}
