use serde::Serialize;

use crate::error::ItemError;
use crate::notes::NoteRecord;

/// One input that did not produce a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedItem {
    /// The post URL or listing position that failed.
    pub identifier: String,
    pub error: ItemError,
}

impl FailedItem {
    pub fn new(identifier: impl Into<String>, error: ItemError) -> Self {
        Self {
            identifier: identifier.into(),
            error,
        }
    }

    /// Short user-facing reason, e.g. `"NotFound"`.
    #[must_use]
    pub fn reason(&self) -> String {
        self.error.to_string()
    }
}

/// Outcome of one pipeline invocation, in input order.
///
/// Every considered input lands in exactly one of `successful` or `failed`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchResult {
    pub total: usize,
    pub successful: Vec<NoteRecord>,
    pub failed: Vec<FailedItem>,
}

impl BatchResult {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn succeeded_count(&self) -> usize {
        self.successful.len()
    }

    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    /// `true` when no input was lost between `total` and the two partitions.
    #[must_use]
    pub fn is_accounted(&self) -> bool {
        self.successful.len() + self.failed.len() == self.total
    }

    /// One-line `total/succeeded/failed` summary.
    #[must_use]
    pub fn summary_line(&self) -> String {
        format!(
            "total {} / succeeded {} / failed {}",
            self.total,
            self.succeeded_count(),
            self.failed_count()
        )
    }
}
