//! Caller-supplied pagination hints
//!
//! `BatchCursorOptions` travels with every `execute` call. The options
//! supplied when a producer is opened are the *first-batch options*; they
//! drive extractable-limit accounting and tie-aware pagination for the whole
//! cursor.

use serde::{Deserialize, Serialize};

/// Pagination hints for one batch request
///
/// # Examples
///
/// ```
/// use shardcursor_core::BatchCursorOptions;
///
/// let opts = BatchCursorOptions::empty().with_docs_requested(25);
/// assert_eq!(opts.docs_requested, Some(25));
/// assert!(!opts.needs_tie_aware_pagination);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BatchCursorOptions {
    /// Number of documents the caller still needs, if it knows
    pub docs_requested: Option<usize>,

    /// Preferred batch size, if the caller has one
    pub batch_size_hint: Option<usize>,

    /// Whether results must carry sequence tokens for tie-aware pagination
    pub needs_tie_aware_pagination: bool,
}

impl BatchCursorOptions {
    /// Options with no hints
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builder: set docs requested
    pub fn with_docs_requested(mut self, docs: usize) -> Self {
        self.docs_requested = Some(docs);
        self
    }

    /// Builder: set batch size hint
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size_hint = Some(batch_size);
        self
    }

    /// Builder: request tie-aware pagination
    pub fn with_tie_aware_pagination(mut self, enabled: bool) -> Self {
        self.needs_tie_aware_pagination = enabled;
        self
    }
}
