//! Stored-field projection
//!
//! Before a hit can be materialized the producer needs some of its stored
//! fields. `ProjectionResolver` fetches them one hit at a time; the producer
//! decides which of them a given document needs.

use serde_json::{Map, Value};
use shardcursor_core::{Result, ScoredHit};

/// Resolves stored fields for hits of one partition
pub trait ProjectionResolver: Send {
    /// Stored source of the hit, when the query returns stored source
    fn stored_source(&self, hit: &ScoredHit) -> Result<Option<Map<String, Value>>>;

    /// Document `_id` of the hit
    fn document_id(&self, hit: &ScoredHit) -> Result<Option<Value>>;

    /// `_id` of the root document containing the hit
    ///
    /// For hits that are not embedded documents this is the hit's own `_id`.
    fn root_document_id(&self, hit: &ScoredHit) -> Result<Value>;
}
