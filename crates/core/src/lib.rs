//! Core types for shardcursor
//!
//! This crate defines the foundational types used throughout the result
//! delivery layer:
//! - ScoredHit, RetrievalWindow: ranked hits as returned by a partition
//! - ResultDocument, StoredFields, SequenceToken: materialization inputs and outputs
//! - HitOrdering, SortSpec, SortKey: relevance and sort-key ordering of hits
//! - BatchCursorOptions: caller pagination hints
//! - ByteSize, PartitionId: value types
//! - CursorConfig: tunable constants loaded from `shardcursor.toml`
//! - QueryingMetrics: shared telemetry counters and distributions
//! - Error: error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod cursor_options;
pub mod error;
pub mod metrics;
pub mod search_types;
pub mod sort;
pub mod types;

pub use config::{CursorConfig, DEFAULT_BATCH_SIZE, DEFAULT_EXTRACTABLE_LIMIT_SLACK};
pub use cursor_options::BatchCursorOptions;
pub use error::{Error, Result};
pub use metrics::{
    Counter, Distribution, DistributionSnapshot, QueryingMetrics, QueryingMetricsSnapshot,
};
pub use search_types::{RetrievalWindow, ResultDocument, ScoredHit, SequenceToken, StoredFields};
pub use sort::{HitKey, HitOrdering, SortDirection, SortKey, SortSpec};
pub use types::{ByteSize, PartitionId};
