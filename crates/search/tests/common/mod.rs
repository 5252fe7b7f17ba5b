//! Shared fakes for the producer integration suites.
//!
//! Import via `mod common;` from any test file in this directory.

#![allow(dead_code)]
#![allow(unused_imports)]

use parking_lot::Mutex;
use serde_json::{json, Map, Value};
pub use shardcursor_core::{
    BatchCursorOptions, ByteSize, Error, HitOrdering, PartitionId, QueryingMetrics, Result,
    ResultDocument, RetrievalWindow, ScoredHit, SequenceToken,
};
pub use shardcursor_search::{
    BatchProducer, BatchSizeStrategy, ConstantBatchSizeStrategy,
    ExponentiallyIncreasingBatchSizeStrategy, PartitionSearchExecutor, ProjectionResolver,
    ResultMaterializer, SearchBatchProducer, SearchBatchProducerBuilder,
    SearchMergingBatchProducer, SearchResultMaterializer, SearcherReference,
};
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Byte limit large enough that only count limits cut batches
pub const LARGE_LIMIT: ByteSize = ByteSize::of_mebi(16);

/// Route producer logs to the test harness output
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

// ============================================================================
// Executor
// ============================================================================

/// Call counters shared between a fake executor and the test body
#[derive(Debug, Default)]
pub struct ExecutorCalls {
    pub initial_searches: AtomicUsize,
    pub get_more: AtomicUsize,
    pub requested: Mutex<Vec<usize>>,
}

impl ExecutorCalls {
    pub fn initial_searches(&self) -> usize {
        self.initial_searches.load(Ordering::SeqCst)
    }

    pub fn get_more(&self) -> usize {
        self.get_more.load(Ordering::SeqCst)
    }

    pub fn requested(&self) -> Vec<usize> {
        self.requested.lock().clone()
    }
}

#[derive(Debug, Clone, Copy)]
enum Positioning {
    /// `get_more` continues right after the given hit
    AfterHit,
    /// `get_more` always restarts at the same offset
    StuckAt(usize),
}

/// In-memory partition: hit `i` has internal id `i` and `scores[i]`
pub struct FakeExecutor {
    scores: Vec<f32>,
    positioning: Positioning,
    fail_initial: bool,
    fail_get_more: bool,
    calls: Arc<ExecutorCalls>,
}

impl FakeExecutor {
    /// `n` hits with strictly decreasing scores
    pub fn decreasing(n: usize) -> Self {
        let scores = (0..n)
            .map(|i| 1.0 - (i as f32) * 0.5 / (n.max(1) as f32))
            .collect();
        Self::with_scores(scores)
    }

    /// `n` hits sharing one score
    pub fn constant_score(n: usize) -> Self {
        Self::with_scores(vec![1.0; n])
    }

    /// Hits with the given scores, which must already be in descending order
    pub fn with_scores(scores: Vec<f32>) -> Self {
        FakeExecutor {
            scores,
            positioning: Positioning::AfterHit,
            fail_initial: false,
            fail_get_more: false,
            calls: Arc::new(ExecutorCalls::default()),
        }
    }

    /// Every `get_more` returns hits from `offset` on, ignoring its position
    pub fn stuck_at(mut self, offset: usize) -> Self {
        self.positioning = Positioning::StuckAt(offset);
        self
    }

    pub fn failing_initial_search(mut self) -> Self {
        self.fail_initial = true;
        self
    }

    pub fn failing_get_more(mut self) -> Self {
        self.fail_get_more = true;
        self
    }

    pub fn calls(&self) -> Arc<ExecutorCalls> {
        Arc::clone(&self.calls)
    }

    fn window(&self, start: usize, requested: usize) -> RetrievalWindow {
        let start = start.min(self.scores.len());
        let end = start.saturating_add(requested).min(self.scores.len());
        let hits: Vec<_> = (start..end)
            .map(|i| ScoredHit::new(i as u64, self.scores[i]))
            .collect();
        let exhausted = hits.len() < requested;
        RetrievalWindow::new(hits, exhausted)
    }
}

impl PartitionSearchExecutor for FakeExecutor {
    fn initial_search(
        &mut self,
        _reference: &dyn SearcherReference,
        requested: usize,
    ) -> Result<RetrievalWindow> {
        self.calls.initial_searches.fetch_add(1, Ordering::SeqCst);
        self.calls.requested.lock().push(requested);
        if self.fail_initial {
            return Err(Error::retrieval("index unavailable"));
        }
        Ok(self.window(0, requested))
    }

    fn get_more(
        &mut self,
        _reference: &dyn SearcherReference,
        after: &ScoredHit,
        requested: usize,
    ) -> Result<RetrievalWindow> {
        self.calls.get_more.fetch_add(1, Ordering::SeqCst);
        self.calls.requested.lock().push(requested);
        if self.fail_get_more {
            return Err(Error::retrieval("searcher was closed"));
        }
        let start = match self.positioning {
            Positioning::AfterHit => after.internal_id as usize + 1,
            Positioning::StuckAt(offset) => offset,
        };
        Ok(self.window(start, requested))
    }
}

// ============================================================================
// Projection and reference
// ============================================================================

/// Document id of hit `internal_id` in `partition`
pub fn doc_id(partition: PartitionId, internal_id: u64) -> String {
    format!("p{}-doc-{}", partition, internal_id)
}

/// Length of the `body` stored for a hit's internal id
pub type BodyLength = Arc<dyn Fn(u64) -> usize + Send + Sync>;

/// Resolves ids as `p{partition}-doc-{internal_id}`
#[derive(Clone, Default)]
pub struct FakeProjection {
    partition: PartitionId,
    stored_source: bool,
    body_length: Option<BodyLength>,
    fail_at: Option<u64>,
}

impl FakeProjection {
    pub fn new(partition: PartitionId) -> Self {
        FakeProjection {
            partition,
            stored_source: false,
            body_length: None,
            fail_at: None,
        }
    }

    /// Return a stored source with `_id` and a `title`
    pub fn with_stored_source(mut self) -> Self {
        self.stored_source = true;
        self
    }

    /// Return a stored source whose `body` length depends on the hit
    pub fn with_body(mut self, body_length: impl Fn(u64) -> usize + Send + Sync + 'static) -> Self {
        self.stored_source = true;
        self.body_length = Some(Arc::new(body_length));
        self
    }

    /// Every lookup for hit `internal_id` fails
    pub fn failing_at(mut self, internal_id: u64) -> Self {
        self.fail_at = Some(internal_id);
        self
    }

    fn check(&self, hit: &ScoredHit) -> Result<()> {
        if self.fail_at == Some(hit.internal_id) {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::NotFound,
                "stored source missing",
            )));
        }
        Ok(())
    }
}

impl ProjectionResolver for FakeProjection {
    fn stored_source(&self, hit: &ScoredHit) -> Result<Option<Map<String, Value>>> {
        self.check(hit)?;
        if !self.stored_source {
            return Ok(None);
        }
        let mut source = Map::new();
        source.insert("_id".into(), json!(doc_id(self.partition, hit.internal_id)));
        source.insert("title".into(), json!(format!("title {}", hit.internal_id)));
        if let Some(body_length) = &self.body_length {
            let body = "x".repeat(body_length(hit.internal_id));
            source.insert("body".into(), json!(body));
        }
        Ok(Some(source))
    }

    fn document_id(&self, hit: &ScoredHit) -> Result<Option<Value>> {
        self.check(hit)?;
        Ok(Some(json!(doc_id(self.partition, hit.internal_id))))
    }

    fn root_document_id(&self, hit: &ScoredHit) -> Result<Value> {
        self.check(hit)?;
        Ok(json!(doc_id(self.partition, hit.internal_id)))
    }
}

/// Searcher reference counting its releases
#[derive(Debug, Default)]
pub struct FakeReference {
    releases: Arc<AtomicUsize>,
    fail: bool,
}

impl FakeReference {
    pub fn new() -> Self {
        Self::default()
    }

    /// Release counts but reports an error
    pub fn failing() -> Self {
        FakeReference {
            releases: Arc::new(AtomicUsize::new(0)),
            fail: true,
        }
    }

    pub fn releases(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.releases)
    }
}

impl SearcherReference for FakeReference {
    fn release(&mut self) -> Result<()> {
        self.releases.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::Other,
                "searcher already released",
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Fixtures
// ============================================================================

/// A producer together with handles on its fakes
pub struct Partition {
    pub producer: SearchBatchProducer,
    pub calls: Arc<ExecutorCalls>,
    pub releases: Arc<AtomicUsize>,
}

impl Partition {
    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

/// Builder for a producer over `executor` with fake projection and reference
pub fn builder(
    partition: PartitionId,
    executor: FakeExecutor,
) -> (SearchBatchProducerBuilder, Arc<ExecutorCalls>, Arc<AtomicUsize>) {
    builder_with_reference(partition, executor, FakeReference::new())
}

pub fn builder_with_reference(
    partition: PartitionId,
    executor: FakeExecutor,
    reference: FakeReference,
) -> (SearchBatchProducerBuilder, Arc<ExecutorCalls>, Arc<AtomicUsize>) {
    builder_with_parts(partition, executor, reference, FakeProjection::new(partition))
}

pub fn builder_with_projection(
    partition: PartitionId,
    executor: FakeExecutor,
    projection: FakeProjection,
) -> (SearchBatchProducerBuilder, Arc<ExecutorCalls>, Arc<AtomicUsize>) {
    builder_with_parts(partition, executor, FakeReference::new(), projection)
}

fn builder_with_parts(
    partition: PartitionId,
    executor: FakeExecutor,
    reference: FakeReference,
    projection: FakeProjection,
) -> (SearchBatchProducerBuilder, Arc<ExecutorCalls>, Arc<AtomicUsize>) {
    let calls = executor.calls();
    let releases = reference.releases();
    let builder = SearchBatchProducer::builder(
        partition,
        executor,
        reference,
        projection,
        Arc::new(SearchResultMaterializer),
    );
    (builder, calls, releases)
}

/// Open a producer with the given strategy
pub fn open(
    partition: PartitionId,
    executor: FakeExecutor,
    strategy: impl BatchSizeStrategy + 'static,
) -> Partition {
    let (builder, calls, releases) = builder(partition, executor);
    let producer = builder.batch_size_strategy(strategy).open().unwrap();
    Partition {
        producer,
        calls,
        releases,
    }
}

/// Follow the producer protocol until exhaustion, collecting every batch
pub fn drain(
    producer: &mut impl BatchProducer,
    limit: ByteSize,
    options: &BatchCursorOptions,
) -> Result<Vec<Vec<ResultDocument>>> {
    let mut batches = Vec::new();
    while !producer.is_exhausted() {
        assert!(batches.len() < 1_000_000, "producer never exhausted");
        producer.execute(limit, options)?;
        batches.push(producer.get_next_batch(limit)?);
    }
    Ok(batches)
}

pub fn batch_sizes(batches: &[Vec<ResultDocument>]) -> Vec<usize> {
    batches.iter().map(Vec::len).collect()
}

/// `_id` of every document, in emission order
pub fn ids(batches: &[Vec<ResultDocument>]) -> Vec<String> {
    batches
        .iter()
        .flatten()
        .map(|doc| {
            doc.get("_id")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        })
        .collect()
}

pub fn encoded_size(batch: &[ResultDocument]) -> u64 {
    batch
        .iter()
        .map(|doc| doc.encoded_size().unwrap().as_u64())
        .sum()
}

pub fn score(doc: &ResultDocument) -> f64 {
    doc.get("$searchScore").and_then(Value::as_f64).unwrap()
}
