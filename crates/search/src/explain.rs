//! Per-partition explain diagnostics
//!
//! When a query runs with explain enabled, every single-partition producer
//! records its retrieval activity into a shared `ExplainCollector`, keyed by
//! partition id. The merging producer only sequences hits and records nothing.

use parking_lot::Mutex;
use serde::Serialize;
use shardcursor_core::{Error, PartitionId, Result};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Diagnostics for one partition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PartitionExplain {
    /// Initial retrievals run
    pub initial_searches: u64,
    /// Follow-up retrievals run
    pub get_more_calls: u64,
    /// Hits returned by all retrievals
    pub hits_retrieved: u64,
    /// Whole-batch materializations (`get_next_batch` calls)
    pub retrieve_and_serialize: u64,
}

/// Shared explain collector
///
/// Cloning yields another handle to the same collection.
#[derive(Debug, Clone, Default)]
pub struct ExplainCollector {
    partitions: Arc<Mutex<BTreeMap<PartitionId, PartitionExplain>>>,
}

impl ExplainCollector {
    /// Create an empty collector
    pub fn new() -> Self {
        Self::default()
    }

    fn update(&self, partition_id: PartitionId, f: impl FnOnce(&mut PartitionExplain)) {
        let mut partitions = self.partitions.lock();
        f(partitions.entry(partition_id).or_default());
    }

    /// Record an initial retrieval
    pub fn record_initial_search(&self, partition_id: PartitionId, hits: usize) {
        self.update(partition_id, |p| {
            p.initial_searches += 1;
            p.hits_retrieved += hits as u64;
        });
    }

    /// Record a follow-up retrieval
    pub fn record_get_more(&self, partition_id: PartitionId, hits: usize) {
        self.update(partition_id, |p| {
            p.get_more_calls += 1;
            p.hits_retrieved += hits as u64;
        });
    }

    /// Record a whole-batch materialization
    pub fn record_retrieve_and_serialize(&self, partition_id: PartitionId) {
        self.update(partition_id, |p| p.retrieve_and_serialize += 1);
    }

    /// Diagnostics of one partition, if it recorded anything
    pub fn partition(&self, partition_id: PartitionId) -> Option<PartitionExplain> {
        self.partitions.lock().get(&partition_id).copied()
    }

    /// Copy of all diagnostics, ordered by partition id
    pub fn snapshot(&self) -> BTreeMap<PartitionId, PartitionExplain> {
        self.partitions.lock().clone()
    }

    /// Diagnostics as a JSON object keyed by partition id
    pub fn to_json(&self) -> Result<serde_json::Value> {
        serde_json::to_value(self.snapshot()).map_err(|e| Error::Serialization(e.to_string()))
    }
}
