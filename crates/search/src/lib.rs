//! Result delivery for partitioned search
//!
//! This crate turns ranked per-partition hit streams into caller-visible
//! batches of result documents:
//! - BatchSizeStrategy and its constant, exponential and adjustable variants
//! - PartitionSearchExecutor, SearcherReference, ProjectionResolver: the
//!   collaborators a producer drives
//! - ResultMaterializer with search and vector search document shapes
//! - SearchBatchProducer: byte-bounded batches over one partition
//! - SearchMergingBatchProducer: lazy k-way merge over many partitions
//! - ExplainCollector for per-partition diagnostics
//!
//! # Usage
//!
//! ```ignore
//! use shardcursor_search::{BatchProducer, SearchBatchProducer, SearchMergingBatchProducer};
//!
//! let children = partitions
//!     .into_iter()
//!     .map(|p| SearchBatchProducer::builder(p.id, p.executor, p.reference, p.projection, materializer.clone()).open())
//!     .collect::<Result<Vec<_>>>()?;
//! let mut producer = SearchMergingBatchProducer::new(children)?;
//! producer.execute(limit, &options)?;
//! let batch = producer.get_next_batch(limit)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod batch_builder;
pub mod batch_size;
pub mod executor;
pub mod explain;
pub mod materializer;
pub mod merging;
pub mod producer;
pub mod projection;

// Re-export commonly used types
pub use batch_builder::ResultBatchBuilder;
pub use batch_size::{
    AdjustableBatchSizeStrategy, BatchSizeStrategy, ConstantBatchSizeStrategy,
    ExponentiallyIncreasingBatchSizeStrategy,
};
pub use executor::{NoopSearcherReference, PartitionSearchExecutor, SearcherReference};
pub use explain::{ExplainCollector, PartitionExplain};
pub use materializer::{ResultMaterializer, SearchResultMaterializer, VectorSearchResultMaterializer};
pub use merging::{MergedResultsView, MergedSearchResultIter, SearchMergingBatchProducer};
pub use producer::{
    BatchProducer, HydratedHit, SearchBatchProducer, SearchBatchProducerBuilder,
    SearchResultsIter,
};
pub use projection::ProjectionResolver;
