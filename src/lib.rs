//! Shardcursor - batched result delivery for partitioned search indexes
//!
//! A search query runs against every partition of an index. Each partition
//! yields a ranked stream of hits; shardcursor turns those streams into
//! caller-visible batches of result documents, each bounded by a byte budget.
//!
//! # Quick Start
//!
//! ```ignore
//! use shardcursor::{BatchProducer, BatchCursorOptions, ByteSize, SearchBatchProducer};
//!
//! let mut producer = SearchBatchProducer::builder(0, executor, reference, projection, materializer)
//!     .cursor_options(BatchCursorOptions::empty().with_docs_requested(25))
//!     .open()?;
//!
//! let limit = ByteSize::of_mebi(16);
//! while !producer.is_exhausted() {
//!     producer.execute(limit, &options)?;
//!     send(producer.get_next_batch(limit)?);
//! }
//! producer.close()?;
//! ```
//!
//! # Architecture
//!
//! - `shardcursor-core`: hits, result documents, ordering, errors, config, metrics
//! - `shardcursor-search`: batch size strategies and the single-partition and
//!   merging producers

pub use shardcursor_core::*;
pub use shardcursor_search::*;
