//! Multi-partition merging producer
//!
//! `SearchMergingBatchProducer` composes the producers of all partitions into
//! one ordered stream with a lazy k-way merge:
//!
//! 1. every child with a pending hit has its head in a binary heap, ordered by
//!    the children's `HitOrdering` (score descending, then partition id, then
//!    internal id, for relevance queries)
//! 2. accepting the smallest head advances that child
//! 3. a child whose window drains and is not exhausted becomes *pending* and
//!    ends the batch; the next `execute` refills it with one retrieval
//!
//! No child is asked for more hits than the merge consumes from it. Like a
//! single producer, a merged batch never crosses a child's window boundary,
//! and each child caps its refills by the average size of the documents it
//! contributed to the last batch. Wrapping a single child therefore yields
//! exactly the batches that child produces on its own, under any byte limit.
//! The merge only sequences hits: explain diagnostics and retrieval telemetry
//! are recorded by the children.

use crate::batch_builder::ResultBatchBuilder;
use crate::producer::{BatchProducer, HydratedHit, SearchBatchProducer};
use shardcursor_core::{
    BatchCursorOptions, ByteSize, Error, HitKey, HitOrdering, ResultDocument, Result,
};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use tracing::{debug, warn};

// ============================================================================
// MergedSearchResultIter
// ============================================================================

#[derive(Debug)]
struct HeadEntry {
    key: HitKey,
    child: usize,
}

impl PartialEq for HeadEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeadEntry {}

impl PartialOrd for HeadEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeadEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key
            .cmp(&other.key)
            .then_with(|| self.child.cmp(&other.child))
    }
}

/// Lazy k-way merge over child producers
///
/// The iterator holds child indices only; every call borrows the children.
/// `refill_pending` and `peek` may refill one pending child,
/// `accept_and_advance` never retrieves.
#[derive(Debug)]
pub struct MergedSearchResultIter {
    heap: BinaryHeap<Reverse<HeadEntry>>,
    pending: Option<usize>,
    options: BatchCursorOptions,
    ordering: HitOrdering,
}

impl MergedSearchResultIter {
    /// Build the merge from children that have been executed once
    pub fn new(
        children: &[SearchBatchProducer],
        ordering: HitOrdering,
        options: BatchCursorOptions,
    ) -> Self {
        let mut iter = MergedSearchResultIter {
            heap: BinaryHeap::with_capacity(children.len()),
            pending: None,
            options,
            ordering,
        };
        for (index, child) in children.iter().enumerate() {
            iter.push_head(index, child);
        }
        iter
    }

    fn push_head(&mut self, index: usize, child: &SearchBatchProducer) {
        if let Some(head) = child.current_head() {
            self.heap.push(Reverse(HeadEntry {
                key: self.ordering.key(&head.hit),
                child: index,
            }));
        }
    }

    /// Options used for lazy refills
    pub fn set_options(&mut self, options: BatchCursorOptions) {
        self.options = options;
    }

    /// Whether a drained child waits for a refill
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Refill the pending child, if any, with one `execute`
    pub fn refill_pending(
        &mut self,
        byte_limit: ByteSize,
        children: &mut [SearchBatchProducer],
    ) -> Result<()> {
        if let Some(index) = self.pending.take() {
            let child = children.get_mut(index).ok_or_else(|| {
                Error::invalid_operation(format!("no child producer at index {}", index))
            })?;
            debug!(
                target: "shardcursor::merge",
                partition_id = child.partition_id(),
                "Refilling pending partition"
            );
            child.execute(byte_limit, &self.options)?;
            self.push_head(index, child);
        }
        Ok(())
    }

    /// The next hit of the merged stream
    ///
    /// Refills the pending child first, if any.
    pub fn peek<'c>(
        &mut self,
        byte_limit: ByteSize,
        children: &'c mut [SearchBatchProducer],
    ) -> Result<Option<&'c HydratedHit>> {
        self.refill_pending(byte_limit, children)?;
        let children: &'c [SearchBatchProducer] = children;
        Ok(self
            .heap
            .peek()
            .and_then(|Reverse(entry)| children.get(entry.child))
            .and_then(SearchBatchProducer::current_head))
    }

    /// Consume the hit returned by the last `peek`
    ///
    /// # Errors
    ///
    /// `InvalidOperation` when the stream is exhausted or a pending child has
    /// not been refilled by `peek`.
    pub fn accept_and_advance(&mut self, children: &mut [SearchBatchProducer]) -> Result<()> {
        if self.pending.is_some() {
            return Err(Error::invalid_operation(
                "peek() must be called before accept_and_advance()",
            ));
        }
        let Reverse(entry) = self
            .heap
            .pop()
            .ok_or_else(|| Error::invalid_operation("the merged iterator has been exhausted"))?;
        let child = children.get_mut(entry.child).ok_or_else(|| {
            Error::invalid_operation(format!("no child producer at index {}", entry.child))
        })?;
        child.accept_head()?;
        if child.current_head().is_some() {
            self.push_head(entry.child, child);
        } else if !child.is_exhausted() {
            self.pending = Some(entry.child);
        }
        Ok(())
    }

    /// No pending child and no buffered head
    pub fn is_exhausted(&self) -> bool {
        self.pending.is_none() && self.heap.is_empty()
    }
}

// ============================================================================
// SearchMergingBatchProducer
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MergeState {
    Open,
    Failed,
    Closed,
}

/// Batch producer merging several partitions
#[derive(Debug)]
pub struct SearchMergingBatchProducer {
    children: Vec<SearchBatchProducer>,
    iter: Option<MergedSearchResultIter>,
    state: MergeState,
}

impl SearchMergingBatchProducer {
    /// Merge the given partition producers
    ///
    /// # Errors
    ///
    /// `InvalidOperation` when `children` is empty.
    pub fn new(children: Vec<SearchBatchProducer>) -> Result<Self> {
        if children.is_empty() {
            return Err(Error::invalid_operation(
                "merging producer needs at least one partition producer",
            ));
        }
        Ok(SearchMergingBatchProducer {
            children,
            iter: None,
            state: MergeState::Open,
        })
    }

    /// The wrapped producers, in input order
    pub fn children(&self) -> &[SearchBatchProducer] {
        &self.children
    }

    /// Peek/accept view over the merged stream
    ///
    /// # Errors
    ///
    /// `InvalidOperation` before the first `execute` or after `close`.
    pub fn search_results_iter(&mut self) -> Result<MergedResultsView<'_>> {
        self.check_usable("search_results_iter")?;
        match self.iter.as_mut() {
            Some(iter) => Ok(MergedResultsView {
                iter,
                children: self.children.as_mut_slice(),
            }),
            None => Err(Error::invalid_operation(
                "execute() must be called before search_results_iter()",
            )),
        }
    }

    fn check_usable(&self, operation: &str) -> Result<()> {
        match self.state {
            MergeState::Open => Ok(()),
            MergeState::Failed => Err(Error::invalid_operation(format!(
                "cannot call {}() after a failed retrieval",
                operation
            ))),
            MergeState::Closed => Err(Error::invalid_operation(format!(
                "cannot call {}() after close()",
                operation
            ))),
        }
    }
}

/// Fill `builder` from the merged stream
///
/// The count limit is the first child's advice, read after the first peek so
/// that a refill's adjustment is reflected. The batch also ends when a child's
/// window drains, so filling never retrieves once `execute` refilled the
/// pending child.
fn fill_merged_batch(
    iter: &mut MergedSearchResultIter,
    children: &mut [SearchBatchProducer],
    builder: &mut ResultBatchBuilder,
    byte_limit: ByteSize,
) -> Result<()> {
    let mut count_limit: Option<usize> = None;
    loop {
        if let Some(limit) = count_limit {
            if builder.document_count() >= limit {
                return Ok(());
            }
        }
        let fits = match iter.peek(byte_limit, children)? {
            Some(head) => builder.append_sized(&head.document, head.encoded_size)?,
            None => return Ok(()),
        };
        if count_limit.is_none() {
            count_limit = children
                .first()
                .map(|c| c.batch_size_strategy().advise_next_batch_size());
        }
        if !fits {
            return Ok(());
        }
        iter.accept_and_advance(children)?;
        if iter.has_pending() {
            return Ok(());
        }
    }
}

impl BatchProducer for SearchMergingBatchProducer {
    fn execute(&mut self, byte_limit: ByteSize, options: &BatchCursorOptions) -> Result<()> {
        self.check_usable("execute")?;
        if let Some(iter) = self.iter.as_mut() {
            iter.set_options(*options);
            if let Err(e) = iter.refill_pending(byte_limit, &mut self.children) {
                self.state = MergeState::Failed;
                return Err(e);
            }
            return Ok(());
        }

        for child in &mut self.children {
            if let Err(e) = child.execute(byte_limit, options) {
                self.state = MergeState::Failed;
                return Err(e);
            }
        }
        let ordering = self.children[0].ordering().clone();
        let iter = MergedSearchResultIter::new(&self.children, ordering, *options);
        debug!(
            target: "shardcursor::merge",
            partitions = self.children.len(),
            heads = iter.heap.len(),
            "Merged search results iterator created"
        );
        self.iter = Some(iter);
        Ok(())
    }

    fn get_next_batch(&mut self, byte_limit: ByteSize) -> Result<Vec<ResultDocument>> {
        self.check_usable("get_next_batch")?;
        let iter = self.iter.as_mut().ok_or_else(|| {
            Error::invalid_operation("execute() must be called before get_next_batch()")
        })?;

        let mut builder = ResultBatchBuilder::with_limit(byte_limit);
        match fill_merged_batch(iter, &mut self.children, &mut builder, byte_limit) {
            Ok(()) => {}
            Err(e @ Error::BatchTooSmall { .. }) => return Err(e),
            Err(e) => {
                self.state = MergeState::Failed;
                return Err(e);
            }
        }
        for child in &mut self.children {
            child.end_batch();
        }

        debug!(
            target: "shardcursor::merge",
            documents = builder.document_count(),
            bytes = builder.data_size().as_u64(),
            "Prepared merged search results"
        );
        Ok(builder.build())
    }

    fn is_exhausted(&self) -> bool {
        self.iter.as_ref().map_or(false, MergedSearchResultIter::is_exhausted)
    }

    fn close(&mut self) -> Result<()> {
        if self.state == MergeState::Closed {
            return Ok(());
        }
        self.state = MergeState::Closed;
        self.iter = None;

        let mut first_error = None;
        for child in &mut self.children {
            if let Err(e) = child.close() {
                warn!(
                    target: "shardcursor::merge",
                    partition_id = child.partition_id(),
                    error = %e,
                    "Failed to close partition producer"
                );
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

// ============================================================================
// MergedResultsView
// ============================================================================

/// Peek/accept view over a merging producer's stream
pub struct MergedResultsView<'a> {
    iter: &'a mut MergedSearchResultIter,
    children: &'a mut [SearchBatchProducer],
}

impl MergedResultsView<'_> {
    /// The next hit of the merged stream, refilling a pending child if needed
    pub fn peek(&mut self, byte_limit: ByteSize) -> Result<Option<&HydratedHit>> {
        self.iter.peek(byte_limit, self.children)
    }

    /// Consume the hit returned by the last `peek`
    pub fn accept_and_advance(&mut self) -> Result<()> {
        self.iter.accept_and_advance(self.children)
    }

    /// Whether the merged stream is exhausted
    pub fn is_exhausted(&self) -> bool {
        self.iter.is_exhausted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_children_rejected() {
        assert!(matches!(
            SearchMergingBatchProducer::new(Vec::new()),
            Err(Error::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_head_entries_pop_smallest_key_first() {
        use shardcursor_core::ScoredHit;
        let ordering = HitOrdering::Relevance;
        let mut heap = BinaryHeap::new();
        for (child, (partition, score)) in [(2u32, 0.5f32), (0, 0.5), (1, 0.9)].iter().enumerate() {
            let hit = ScoredHit::new(0, *score).with_partition(*partition);
            heap.push(Reverse(HeadEntry {
                key: ordering.key(&hit),
                child,
            }));
        }
        let order: Vec<usize> = std::iter::from_fn(|| heap.pop().map(|Reverse(e)| e.child)).collect();
        // 0.9 first, then the 0.5 tie broken by partition id 0 before 2
        assert_eq!(order, vec![2, 1, 0]);
    }
}
