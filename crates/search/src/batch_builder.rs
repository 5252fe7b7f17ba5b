//! Byte-bounded batch assembly
//!
//! `ResultBatchBuilder` accumulates documents while their cumulative encoded
//! size stays strictly below the limit. A document is never split: the first
//! one that would reach the limit is refused and stays pending for the next
//! batch. If not even the first document fits, no progress is possible and
//! `append` fails with `BatchTooSmall`.

use shardcursor_core::{ByteSize, Error, Result, ResultDocument};

/// Accumulates one batch of documents under a byte limit
#[derive(Debug)]
pub struct ResultBatchBuilder {
    limit: ByteSize,
    data_size: ByteSize,
    documents: Vec<ResultDocument>,
}

impl ResultBatchBuilder {
    /// Create an empty builder
    pub fn with_limit(limit: ByteSize) -> Self {
        ResultBatchBuilder {
            limit,
            data_size: ByteSize::ZERO,
            documents: Vec::new(),
        }
    }

    /// Append a document if it fits
    ///
    /// Returns `Ok(false)` when the document would reach the limit.
    ///
    /// # Errors
    ///
    /// `BatchTooSmall` when the builder is empty and the document alone does
    /// not fit.
    pub fn append(&mut self, document: &ResultDocument) -> Result<bool> {
        let size = document.encoded_size()?;
        self.append_sized(document, size)
    }

    /// Append a document whose encoded size is already known
    ///
    /// # Errors
    ///
    /// Same as [`append`](Self::append).
    pub fn append_sized(&mut self, document: &ResultDocument, size: ByteSize) -> Result<bool> {
        let total = self.data_size.saturating_add(size);
        if total >= self.limit {
            if self.documents.is_empty() {
                return Err(Error::BatchTooSmall {
                    document_bytes: size.as_u64(),
                    limit: self.limit.as_u64(),
                });
            }
            return Ok(false);
        }
        self.data_size = total;
        self.documents.push(document.clone());
        Ok(true)
    }

    /// Number of documents appended
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Cumulative encoded size
    pub fn data_size(&self) -> ByteSize {
        self.data_size
    }

    /// Finish the batch
    pub fn build(self) -> Vec<ResultDocument> {
        self.documents
    }
}
