//! Querying metrics
//!
//! Producers record telemetry into a shared `QueryingMetrics`:
//! - Counters: extractable-limit queries, second batches, no-progress
//!   batches, batches with ties
//! - Distributions: orphaned/deleted docs ratio, batch document count,
//!   batch data size
//!
//! Counters use `Relaxed` atomics. The values are purely observational and
//! approximate reads are acceptable. `snapshot()` returns a plain copy.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

// ============================================================================
// Counter
// ============================================================================

/// Monotonic counter
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    /// Create a zeroed counter
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment by one
    pub fn increment(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    /// Current value
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

// ============================================================================
// Distribution
// ============================================================================

/// Summary of recorded samples
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DistributionSnapshot {
    /// Number of samples
    pub count: u64,
    /// Sum of samples
    pub sum: f64,
    /// Smallest sample (0.0 when empty)
    pub min: f64,
    /// Largest sample (0.0 when empty)
    pub max: f64,
}

impl DistributionSnapshot {
    /// Mean of the samples (0.0 when empty)
    pub fn mean(&self) -> f64 {
        if self.count > 0 {
            self.sum / self.count as f64
        } else {
            0.0
        }
    }
}

/// Sample distribution
#[derive(Debug, Default)]
pub struct Distribution {
    inner: Mutex<DistributionSnapshot>,
}

impl Distribution {
    /// Create an empty distribution
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one sample
    pub fn record(&self, value: f64) {
        let mut d = self.inner.lock();
        if d.count == 0 {
            d.min = value;
            d.max = value;
        } else {
            d.min = d.min.min(value);
            d.max = d.max.max(value);
        }
        d.count += 1;
        d.sum += value;
    }

    /// Copy of the current summary
    pub fn snapshot(&self) -> DistributionSnapshot {
        *self.inner.lock()
    }
}

// ============================================================================
// QueryingMetrics
// ============================================================================

/// Telemetry shared by all producers of a query
#[derive(Debug, Default)]
pub struct QueryingMetrics {
    /// First batches whose options requested a document count
    pub extractable_limit_query: Counter,
    /// Follow-up batches needed after an extractable-limit first batch
    pub extractable_limit_second_batch: Counter,
    /// Non-empty batches that did not advance past the previous batch
    pub no_progress_batch: Counter,
    /// Tie-aware batches containing consecutive hits with equal ordering values
    pub batch_with_ties: Counter,
    /// Share of first-batch hits that turned out unusable
    pub orphaned_deleted_docs_ratio: Distribution,
    /// Documents per returned batch
    pub batch_document_count: Distribution,
    /// Encoded bytes per returned batch
    pub batch_data_size: Distribution,
}

impl QueryingMetrics {
    /// Create zeroed metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Get current metrics
    ///
    /// Returns a snapshot of every counter and distribution.
    pub fn snapshot(&self) -> QueryingMetricsSnapshot {
        QueryingMetricsSnapshot {
            extractable_limit_query: self.extractable_limit_query.get(),
            extractable_limit_second_batch: self.extractable_limit_second_batch.get(),
            no_progress_batch: self.no_progress_batch.get(),
            batch_with_ties: self.batch_with_ties.get(),
            orphaned_deleted_docs_ratio: self.orphaned_deleted_docs_ratio.snapshot(),
            batch_document_count: self.batch_document_count.snapshot(),
            batch_data_size: self.batch_data_size.snapshot(),
        }
    }
}

/// Querying metrics snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct QueryingMetricsSnapshot {
    /// See [`QueryingMetrics::extractable_limit_query`]
    pub extractable_limit_query: u64,
    /// See [`QueryingMetrics::extractable_limit_second_batch`]
    pub extractable_limit_second_batch: u64,
    /// See [`QueryingMetrics::no_progress_batch`]
    pub no_progress_batch: u64,
    /// See [`QueryingMetrics::batch_with_ties`]
    pub batch_with_ties: u64,
    /// See [`QueryingMetrics::orphaned_deleted_docs_ratio`]
    pub orphaned_deleted_docs_ratio: DistributionSnapshot,
    /// See [`QueryingMetrics::batch_document_count`]
    pub batch_document_count: DistributionSnapshot,
    /// See [`QueryingMetrics::batch_data_size`]
    pub batch_data_size: DistributionSnapshot,
}

impl QueryingMetricsSnapshot {
    /// Total documents returned across all recorded batches
    pub fn total_documents(&self) -> u64 {
        self.batch_document_count.sum as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_new_metrics_are_zero() {
        let snap = QueryingMetrics::new().snapshot();
        assert_eq!(snap.extractable_limit_query, 0);
        assert_eq!(snap.no_progress_batch, 0);
        assert_eq!(snap.batch_with_ties, 0);
        assert_eq!(snap.orphaned_deleted_docs_ratio.count, 0);
        assert_eq!(snap.batch_document_count.mean(), 0.0);
    }

    #[test]
    fn test_counter_increments() {
        let c = Counter::new();
        for _ in 0..5 {
            c.increment();
        }
        assert_eq!(c.get(), 5);
    }

    #[test]
    fn test_distribution_summary() {
        let d = Distribution::new();
        d.record(3.0);
        d.record(1.0);
        d.record(5.0);
        let s = d.snapshot();
        assert_eq!(s.count, 3);
        assert_eq!(s.sum, 9.0);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 5.0);
        assert_eq!(s.mean(), 3.0);
    }

    #[test]
    fn test_total_documents() {
        let m = QueryingMetrics::new();
        m.batch_document_count.record(25.0);
        m.batch_document_count.record(10.0);
        assert_eq!(m.snapshot().total_documents(), 35);
    }

    #[test]
    fn test_concurrent_increments() {
        let m = Arc::new(QueryingMetrics::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let m = Arc::clone(&m);
                thread::spawn(move || {
                    for _ in 0..1000 {
                        m.no_progress_batch.increment();
                        m.batch_data_size.record(1.0);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        let snap = m.snapshot();
        assert_eq!(snap.no_progress_batch, 4000);
        assert_eq!(snap.batch_data_size.count, 4000);
    }
}
