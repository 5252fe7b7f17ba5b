//! Partition search collaborators
//!
//! A producer never searches on its own. It drives a `PartitionSearchExecutor`
//! against a leased `SearcherReference`:
//! - `initial_search` runs once, when the producer is opened
//! - `get_more` continues after the last hit the caller accepted
//!
//! Both return a `RetrievalWindow` whose `exhausted` flag tells the producer
//! whether the partition has anything beyond that window.

use shardcursor_core::{Result, RetrievalWindow, ScoredHit};

/// A leased reader handle that pins one partition's index open
///
/// The producer that owns the reference releases it exactly once.
pub trait SearcherReference: Send {
    /// Release the reference
    fn release(&mut self) -> Result<()>;
}

/// Ranked retrieval over one partition
///
/// Implementations decide what matches and how hits are scored. Hits must be
/// returned in the partition's result order.
pub trait PartitionSearchExecutor: Send {
    /// Run the query and return up to `requested` top hits
    fn initial_search(
        &mut self,
        reference: &dyn SearcherReference,
        requested: usize,
    ) -> Result<RetrievalWindow>;

    /// Return up to `requested` hits that rank after `after`
    fn get_more(
        &mut self,
        reference: &dyn SearcherReference,
        after: &ScoredHit,
        requested: usize,
    ) -> Result<RetrievalWindow>;
}

/// A reference with nothing to release
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSearcherReference;

impl SearcherReference for NoopSearcherReference {
    fn release(&mut self) -> Result<()> {
        Ok(())
    }
}
