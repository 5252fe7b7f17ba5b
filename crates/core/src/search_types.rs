//! Core search types for result delivery
//!
//! This module defines the values that flow between a partition's search
//! executor and the caller:
//! - ScoredHit: one ranked match in one partition
//! - RetrievalWindow: the hits returned by one retrieval call
//! - StoredFields: the projected fields of a hit
//! - SequenceToken: opaque resumption marker for tie-aware pagination
//! - ResultDocument: the wire-format output unit

use crate::error::Result;
use crate::sort::SortKey;
use crate::types::{ByteSize, PartitionId};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

// ============================================================================
// ScoredHit
// ============================================================================

/// A single ranked match
///
/// Executors produce hits with a score and internal id. The producer stamps
/// `partition_id` and `sequence_ordinal` when it takes ownership of the hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredHit {
    /// Partition the hit came from
    pub partition_id: PartitionId,

    /// Position of the hit in the partition's index (cursor position)
    pub internal_id: u64,

    /// Relevance or similarity score
    pub score: f32,

    /// Position of the hit in its partition's result stream
    pub sequence_ordinal: u64,

    /// Sort values, present when the query is sorted
    pub sort_values: Option<Vec<SortKey>>,
}

impl ScoredHit {
    /// Create an unsorted hit in partition 0
    pub fn new(internal_id: u64, score: f32) -> Self {
        ScoredHit {
            partition_id: 0,
            internal_id,
            score,
            sequence_ordinal: 0,
            sort_values: None,
        }
    }

    /// Builder: set partition id
    pub fn with_partition(mut self, partition_id: PartitionId) -> Self {
        self.partition_id = partition_id;
        self
    }

    /// Builder: set sort values
    pub fn with_sort_values(mut self, sort_values: Vec<SortKey>) -> Self {
        self.sort_values = Some(sort_values);
        self
    }

    /// Builder: set sequence ordinal
    pub fn with_sequence_ordinal(mut self, ordinal: u64) -> Self {
        self.sequence_ordinal = ordinal;
        self
    }
}

// ============================================================================
// RetrievalWindow
// ============================================================================

/// Result of one retrieval call against a partition
///
/// `exhausted` means the partition has no hits beyond this window,
/// regardless of how many hits the window holds.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RetrievalWindow {
    /// Hits in rank order
    pub hits: Vec<ScoredHit>,

    /// Whether the partition is exhausted after this window
    pub exhausted: bool,
}

impl RetrievalWindow {
    /// Create a window
    pub fn new(hits: Vec<ScoredHit>, exhausted: bool) -> Self {
        RetrievalWindow { hits, exhausted }
    }

    /// An empty, exhausted window
    pub fn exhausted() -> Self {
        RetrievalWindow {
            hits: Vec::new(),
            exhausted: true,
        }
    }

    /// Number of hits
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    /// Check if the window holds no hits
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

// ============================================================================
// StoredFields
// ============================================================================

/// Fields projected for a hit before materialization
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StoredFields {
    /// Document `_id`
    pub id: Option<Value>,

    /// Stored source, when the query returns it
    pub stored_source: Option<Map<String, Value>>,

    /// `_id` of the root document when results are embedded documents
    pub root_document_id: Option<Value>,
}

// ============================================================================
// SequenceToken
// ============================================================================

/// Opaque resumption marker
///
/// A caller passes the token of the last document it saw back into a new
/// query to continue past that document even when scores tie. On the wire the
/// token is base64 encoded MessagePack.
///
/// # Examples
///
/// ```
/// use shardcursor_core::SequenceToken;
///
/// let token = SequenceToken::new(0.5, 12);
/// let wire = token.encode().unwrap();
/// assert_eq!(SequenceToken::decode(&wire).unwrap(), token);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceToken {
    /// Id of the last document seen, if known
    pub id: Option<Value>,

    /// Score of the last document seen
    pub score: f32,

    /// Sort values of the last document seen
    pub sort_values: Option<Vec<SortKey>>,

    /// Internal position of the last document seen
    pub position: u64,
}

impl SequenceToken {
    /// Create a token without id or sort values
    pub fn new(score: f32, position: u64) -> Self {
        SequenceToken {
            id: None,
            score,
            sort_values: None,
            position,
        }
    }

    /// Token describing a hit
    pub fn for_hit(hit: &ScoredHit, id: Option<Value>) -> Self {
        SequenceToken {
            id,
            score: hit.score,
            sort_values: hit.sort_values.clone(),
            position: hit.internal_id,
        }
    }

    /// Builder: set document id
    pub fn with_id(mut self, id: Value) -> Self {
        self.id = Some(id);
        self
    }

    /// Encode for the wire
    pub fn encode(&self) -> Result<String> {
        let bytes = rmp_serde::to_vec(self)?;
        Ok(STANDARD.encode(bytes))
    }

    /// Decode a wire token
    pub fn decode(encoded: &str) -> Result<Self> {
        let bytes = STANDARD.decode(encoded)?;
        Ok(rmp_serde::from_slice(&bytes)?)
    }
}

// ============================================================================
// ResultDocument
// ============================================================================

/// Wire-format output unit
///
/// An ordered field map. Field order is insertion order and is preserved
/// in the MessagePack encoding.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultDocument {
    fields: Vec<(String, Value)>,
}

impl ResultDocument {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: append a field
    pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.insert(name, value);
        self
    }

    /// Set a field, replacing an existing value in place
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Look up a field
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Field names in order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the document has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// MessagePack encoding
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(rmp_serde::to_vec(self)?)
    }

    /// Size of the MessagePack encoding
    pub fn encoded_size(&self) -> Result<ByteSize> {
        Ok(ByteSize::of_bytes(self.encode()?.len() as u64))
    }
}

impl Serialize for ResultDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
