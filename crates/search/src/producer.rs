//! Single-partition batch producer
//!
//! `SearchBatchProducer` owns the pull cursor over one partition's ranked
//! hits. It is opened with one initial retrieval and afterwards follows the
//! producer protocol:
//!
//! ```text
//! loop {
//!     producer.execute(limit, &options)?;     // adopt or refill the window
//!     let batch = producer.get_next_batch(limit)?;
//!     if producer.is_exhausted() { break; }
//! }
//! producer.close()?;
//! ```
//!
//! `execute` never prefetches: the first call adopts the window of the
//! initial retrieval and a later call issues one `get_more`, positioned
//! after the last accepted hit, only once the current window is drained.
//! A batch never crosses a window boundary. Hits a byte limit left behind
//! open the next batch.
//!
//! Retrieval sizes follow the strategy's advice, capped by how many
//! documents of the last batch's average encoded size fit in the byte limit.
//!
//! Telemetry recorded into `QueryingMetrics` never changes control flow:
//! oversubscription of the extractable limit, no-progress batches, batches
//! with ties, and batch shape.

use crate::batch_builder::ResultBatchBuilder;
use crate::batch_size::{AdjustableBatchSizeStrategy, BatchSizeStrategy};
use crate::executor::{PartitionSearchExecutor, SearcherReference};
use crate::explain::ExplainCollector;
use crate::materializer::ResultMaterializer;
use crate::projection::ProjectionResolver;
use serde_json::Value;
use shardcursor_core::{
    BatchCursorOptions, ByteSize, Error, HitOrdering, PartitionId, QueryingMetrics, Result,
    ResultDocument, RetrievalWindow, ScoredHit, SequenceToken, StoredFields,
};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

// ============================================================================
// BatchProducer Trait
// ============================================================================

/// The producer contract seen by the cursor layer
///
/// Callers invoke `execute` before every `get_next_batch`. Once
/// `is_exhausted` returns true every later batch is empty.
pub trait BatchProducer {
    /// Prepare the next batch
    fn execute(&mut self, byte_limit: ByteSize, options: &BatchCursorOptions) -> Result<()>;

    /// Materialize pending hits while their encoded size stays below `byte_limit`
    fn get_next_batch(&mut self, byte_limit: ByteSize) -> Result<Vec<ResultDocument>>;

    /// Whether the producer can never return another document
    fn is_exhausted(&self) -> bool;

    /// Release held resources; later calls are no-ops
    fn close(&mut self) -> Result<()>;
}

// ============================================================================
// HydratedHit
// ============================================================================

/// A hit together with its materialized document
#[derive(Debug, Clone, PartialEq)]
pub struct HydratedHit {
    /// The hit, stamped with partition id and sequence ordinal
    pub hit: ScoredHit,
    /// The wire document built for it
    pub document: ResultDocument,
    /// Encoded size of `document`
    pub encoded_size: ByteSize,
}

// ============================================================================
// Internal State
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProducerState {
    /// Opened; the initial window has not been adopted yet
    Initialized,
    /// `execute` refills a drained window after the last accepted hit
    GetMore,
    /// A retrieval or materialization failed; only `close` is allowed
    Failed,
    Closed,
}

/// Iteration over the current window
#[derive(Debug, Default)]
struct WindowCursor {
    hits: Vec<ScoredHit>,
    position: usize,
    partition_exhausted: bool,
    current: Option<HydratedHit>,
    skipped_head: bool,
}

impl WindowCursor {
    fn drained(&self) -> bool {
        self.position >= self.hits.len()
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`SearchBatchProducer`]
pub struct SearchBatchProducerBuilder {
    partition_id: PartitionId,
    executor: Box<dyn PartitionSearchExecutor>,
    reference: Box<dyn SearcherReference>,
    projection: Box<dyn ProjectionResolver>,
    materializer: Arc<dyn ResultMaterializer>,
    strategy: Option<Box<dyn BatchSizeStrategy>>,
    metrics: Option<Arc<QueryingMetrics>>,
    cursor_options: BatchCursorOptions,
    sequence_token: Option<SequenceToken>,
    ordering: HitOrdering,
    return_scope: bool,
    explain: Option<ExplainCollector>,
}

impl SearchBatchProducerBuilder {
    /// Strategy advising retrieval sizes
    ///
    /// Defaults to [`AdjustableBatchSizeStrategy::create`] over the cursor options.
    pub fn batch_size_strategy(mut self, strategy: impl BatchSizeStrategy + 'static) -> Self {
        self.strategy = Some(Box::new(strategy));
        self
    }

    /// Metrics shared with the other producers of the query
    pub fn metrics(mut self, metrics: Arc<QueryingMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// First-batch cursor options
    pub fn cursor_options(mut self, options: BatchCursorOptions) -> Self {
        self.cursor_options = options;
        self
    }

    /// Sequence token the query resumes from
    pub fn sequence_token(mut self, token: SequenceToken) -> Self {
        self.sequence_token = Some(token);
        self
    }

    /// Ordering of the partition's hits
    pub fn ordering(mut self, ordering: HitOrdering) -> Self {
        self.ordering = ordering;
        self
    }

    /// Whether stored source is returned under a return scope
    pub fn return_scope(mut self, present: bool) -> Self {
        self.return_scope = present;
        self
    }

    /// Collect explain diagnostics
    pub fn explain(mut self, explain: ExplainCollector) -> Self {
        self.explain = Some(explain);
        self
    }

    /// Run the initial retrieval and return the producer
    ///
    /// # Errors
    ///
    /// Propagates the executor's error. The searcher reference is released
    /// before returning it.
    pub fn open(self) -> Result<SearchBatchProducer> {
        let strategy = match self.strategy {
            Some(s) => s,
            None => Box::new(AdjustableBatchSizeStrategy::create(
                &self.cursor_options,
                false,
            )),
        };
        let mut producer = SearchBatchProducer {
            partition_id: self.partition_id,
            executor: self.executor,
            reference: self.reference,
            projection: self.projection,
            materializer: self.materializer,
            strategy,
            metrics: self.metrics.unwrap_or_default(),
            explain: self.explain,
            first_batch_options: self.cursor_options,
            sequence_token: self.sequence_token,
            ordering: self.ordering,
            return_scope: self.return_scope,
            state: ProducerState::Initialized,
            initial_window: RetrievalWindow::default(),
            cursor: None,
            last_accepted: None,
            exhausted: false,
            first_hit: true,
            first_batch: true,
            avg_doc_size: None,
            batch_bytes: 0,
            batch_docs: 0,
            batches_served: 0,
            should_report_oversubscription: true,
            first_batch_exceeds: false,
            first_batch_docs_returned: 0,
            next_ordinal: 0,
            total_served: 0,
        };

        let requested = producer.strategy.advise_next_batch_size();
        let window = match producer
            .executor
            .initial_search(producer.reference.as_ref(), requested)
        {
            Ok(window) => window,
            Err(e) => {
                if let Err(release_err) = producer.reference.release() {
                    warn!(
                        target: "shardcursor::producer",
                        partition_id = producer.partition_id,
                        error = %release_err,
                        "Failed to release searcher reference after initial search failure"
                    );
                }
                return Err(e);
            }
        };

        if let Some(explain) = &producer.explain {
            explain.record_initial_search(producer.partition_id, window.len());
        }
        debug!(
            target: "shardcursor::producer",
            partition_id = producer.partition_id,
            requested,
            hits = window.len(),
            partition_exhausted = window.exhausted,
            strategy = producer.strategy.name(),
            "Initial search"
        );

        producer.exhausted = window.is_empty();
        producer.initial_window = window;
        Ok(producer)
    }
}

// ============================================================================
// SearchBatchProducer
// ============================================================================

/// Batch producer over one partition
pub struct SearchBatchProducer {
    partition_id: PartitionId,
    executor: Box<dyn PartitionSearchExecutor>,
    reference: Box<dyn SearcherReference>,
    projection: Box<dyn ProjectionResolver>,
    materializer: Arc<dyn ResultMaterializer>,
    strategy: Box<dyn BatchSizeStrategy>,
    metrics: Arc<QueryingMetrics>,
    explain: Option<ExplainCollector>,
    first_batch_options: BatchCursorOptions,
    sequence_token: Option<SequenceToken>,
    ordering: HitOrdering,
    return_scope: bool,

    state: ProducerState,
    initial_window: RetrievalWindow,
    cursor: Option<WindowCursor>,
    last_accepted: Option<ScoredHit>,
    exhausted: bool,

    /// The first hydrated hit may repeat the sequence token's document
    first_hit: bool,
    /// No-progress checks start from the second batch
    first_batch: bool,
    avg_doc_size: Option<u64>,
    /// Bytes and documents accepted since the last `end_batch`
    batch_bytes: u64,
    batch_docs: u64,
    /// Batches built by this producer's own `get_next_batch`
    batches_served: u64,

    should_report_oversubscription: bool,
    first_batch_exceeds: bool,
    first_batch_docs_returned: usize,

    next_ordinal: u64,
    total_served: u64,
}

impl SearchBatchProducer {
    /// Start building a producer for one partition
    pub fn builder(
        partition_id: PartitionId,
        executor: impl PartitionSearchExecutor + 'static,
        reference: impl SearcherReference + 'static,
        projection: impl ProjectionResolver + 'static,
        materializer: Arc<dyn ResultMaterializer>,
    ) -> SearchBatchProducerBuilder {
        SearchBatchProducerBuilder {
            partition_id,
            executor: Box::new(executor),
            reference: Box::new(reference),
            projection: Box::new(projection),
            materializer,
            strategy: None,
            metrics: None,
            cursor_options: BatchCursorOptions::default(),
            sequence_token: None,
            ordering: HitOrdering::default(),
            return_scope: false,
            explain: None,
        }
    }

    /// Partition this producer reads
    pub fn partition_id(&self) -> PartitionId {
        self.partition_id
    }

    /// Current batch size strategy
    pub fn batch_size_strategy(&self) -> &dyn BatchSizeStrategy {
        self.strategy.as_ref()
    }

    /// Number of hits accepted and handed to the caller so far
    pub fn total_served(&self) -> u64 {
        self.total_served
    }

    /// Ordering of this partition's hits
    pub fn ordering(&self) -> &HitOrdering {
        &self.ordering
    }

    /// Metrics this producer records into
    pub fn metrics(&self) -> &Arc<QueryingMetrics> {
        &self.metrics
    }

    /// Whether `close` has been called
    pub fn is_closed(&self) -> bool {
        self.state == ProducerState::Closed
    }

    /// Peek/accept view over the current window
    ///
    /// # Errors
    ///
    /// `InvalidOperation` before the first `execute` or after `close`.
    pub fn search_results_iter(&mut self) -> Result<SearchResultsIter<'_>> {
        self.check_usable("search_results_iter")?;
        if self.cursor.is_none() {
            return Err(Error::invalid_operation(
                "execute() must be called before search_results_iter()",
            ));
        }
        Ok(SearchResultsIter { producer: self })
    }

    // ========================================================================
    // Cursor mechanics
    // ========================================================================

    fn check_usable(&self, operation: &str) -> Result<()> {
        match self.state {
            ProducerState::Closed => Err(Error::invalid_operation(format!(
                "cannot call {}() after close()",
                operation
            ))),
            ProducerState::Failed => Err(Error::invalid_operation(format!(
                "cannot call {}() after a failed retrieval",
                operation
            ))),
            _ => Ok(()),
        }
    }

    /// Mark the producer failed when `result` is an error
    fn poison<T>(&mut self, result: Result<T>) -> Result<T> {
        if result.is_err() {
            self.state = ProducerState::Failed;
        }
        result
    }

    pub(crate) fn current_head(&self) -> Option<&HydratedHit> {
        self.cursor.as_ref().and_then(|c| c.current.as_ref())
    }

    /// Accept the current head and hydrate the next hit
    pub(crate) fn accept_head(&mut self) -> Result<()> {
        self.check_usable("accept_and_advance")?;
        let accepted = match self.cursor.as_mut().and_then(|c| c.current.take()) {
            Some(h) => h,
            None => {
                return Err(Error::invalid_operation(
                    "the search results iterator has been exhausted",
                ))
            }
        };
        self.total_served += 1;
        self.batch_bytes += accepted.encoded_size.as_u64();
        self.batch_docs += 1;
        self.advance_past(accepted.hit);
        let result = self.hydrate_current();
        self.poison(result)
    }

    fn advance_past(&mut self, hit: ScoredHit) {
        if let Some(cursor) = self.cursor.as_mut() {
            cursor.current = None;
            cursor.position += 1;
        }
        self.last_accepted = Some(hit);
        self.next_ordinal += 1;
        self.update_exhausted();
    }

    fn update_exhausted(&mut self) {
        if let Some(cursor) = &self.cursor {
            self.exhausted = cursor.drained() && cursor.partition_exhausted;
        }
    }

    fn adopt(&mut self, window: RetrievalWindow) -> Result<()> {
        let partition_exhausted = window.exhausted || window.is_empty();
        let mut hits = window.hits;
        for hit in &mut hits {
            hit.partition_id = self.partition_id;
        }
        self.cursor = Some(WindowCursor {
            hits,
            position: 0,
            partition_exhausted,
            current: None,
            skipped_head: false,
        });
        self.update_exhausted();
        let result = self.hydrate_current();
        self.poison(result)
    }

    /// Hydrate the hit at the cursor position unless already hydrated
    fn hydrate_current(&mut self) -> Result<()> {
        loop {
            let mut hit = match &self.cursor {
                Some(c) if c.current.is_none() && !c.drained() => c.hits[c.position].clone(),
                _ => return Ok(()),
            };
            hit.sequence_ordinal = self.next_ordinal;
            let internal_id = hit.internal_id;

            let (hydrated, fetched_root_id) = self
                .hydrate(hit)
                .map_err(|e| self.materialization_error(internal_id, e))?;

            if self.first_hit {
                self.first_hit = false;
                let token_id = self.sequence_token.as_ref().and_then(|t| t.id.clone());
                if let Some(token_id) = token_id {
                    let root_id = match fetched_root_id {
                        Some(id) => id,
                        None => self
                            .projection
                            .root_document_id(&hydrated.hit)
                            .map_err(|e| self.materialization_error(internal_id, e))?,
                    };
                    // The previous page ended on this document
                    if root_id == token_id {
                        debug!(
                            target: "shardcursor::producer",
                            partition_id = self.partition_id,
                            "Skipping head hit repeated from sequence token"
                        );
                        if let Some(cursor) = self.cursor.as_mut() {
                            cursor.skipped_head = true;
                        }
                        self.advance_past(hydrated.hit);
                        continue;
                    }
                }
            }

            if let Some(cursor) = self.cursor.as_mut() {
                cursor.current = Some(hydrated);
            }
            return Ok(());
        }
    }

    fn hydrate(&self, hit: ScoredHit) -> Result<(HydratedHit, Option<Value>)> {
        let mut fetched_root_id = None;
        let mut token = None;
        if self.first_batch_options.needs_tie_aware_pagination {
            let root_id = self.projection.root_document_id(&hit)?;
            token = Some(SequenceToken::for_hit(&hit, Some(root_id.clone())));
            fetched_root_id = Some(root_id);
        }

        let stored_source = self.projection.stored_source(&hit)?;
        let id = match (&stored_source, &fetched_root_id) {
            (Some(_), _) => None,
            (None, Some(root_id)) => Some(root_id.clone()),
            (None, None) => self.projection.document_id(&hit)?,
        };
        let root_document_id = if stored_source.is_some() && self.return_scope {
            Some(self.projection.root_document_id(&hit)?)
        } else {
            None
        };

        let fields = StoredFields {
            id,
            stored_source,
            root_document_id,
        };
        let document = self.materializer.build(&hit, fields, token.as_ref())?;
        let encoded_size = document.encoded_size()?;
        Ok((
            HydratedHit {
                hit,
                document,
                encoded_size,
            },
            fetched_root_id,
        ))
    }

    /// Attribute a projection or materializer failure to the hit being hydrated
    fn materialization_error(&self, internal_id: u64, error: Error) -> Error {
        match error {
            Error::Materialization(_) => error,
            other => Error::materialization(format!(
                "partition {}, hit {}: {}",
                self.partition_id, internal_id, other
            )),
        }
    }

    /// Close the running batch
    ///
    /// Documents accepted since the previous call become the average used to
    /// cap the next retrieval. A batch without documents keeps the old average.
    pub(crate) fn end_batch(&mut self) {
        if self.batch_docs > 0 {
            self.avg_doc_size = Some(self.batch_bytes / self.batch_docs);
        }
        self.batch_bytes = 0;
        self.batch_docs = 0;
    }

    /// Retrieval size for the next `get_more`
    ///
    /// Capped by how many documents of average size fit in `byte_limit`.
    fn next_request_size(&self, byte_limit: ByteSize) -> usize {
        let advice = self.strategy.advise_next_batch_size();
        match self.avg_doc_size {
            Some(avg) if avg > 0 => {
                let fit = usize::try_from(byte_limit.as_u64() / avg).unwrap_or(usize::MAX);
                advice.min(fit).max(1)
            }
            _ => advice,
        }
    }

    // ========================================================================
    // Telemetry
    // ========================================================================

    fn report_oversubscription(&mut self, options: &BatchCursorOptions) {
        // Children of a merge never build batches of their own
        if !self.should_report_oversubscription || self.batches_served == 0 {
            return;
        }
        let (Some(first_requested), Some(requested_now)) =
            (self.first_batch_options.docs_requested, options.docs_requested)
        else {
            return;
        };
        self.should_report_oversubscription = false;
        if self.first_batch_exceeds {
            return;
        }

        self.metrics.extractable_limit_second_batch.increment();
        if self.first_batch_docs_returned == 0 {
            return;
        }
        // First-batch documents returned + documents still needed - documents first requested
        let unusable = self.first_batch_docs_returned as i64 + requested_now as i64
            - first_requested as i64;
        let ratio = unusable as f64 / self.first_batch_docs_returned as f64;
        self.metrics.orphaned_deleted_docs_ratio.record(ratio);
        debug!(
            target: "shardcursor::producer",
            partition_id = self.partition_id,
            used_extractable_limit = self.strategy.used_extractable_limit(),
            ratio,
            "Extractable limit needed a second batch"
        );
    }

    fn tie_aware(&self) -> bool {
        self.sequence_token.is_some() || self.first_batch_options.needs_tie_aware_pagination
    }

    /// Scores compare with `==`, so `-0.0` ties with `0.0` as it does in
    /// [`HitOrdering`].
    fn is_tie(&self, previous: &ScoredHit, current: &ScoredHit) -> bool {
        match (&previous.sort_values, &current.sort_values) {
            (None, None) => previous.score == current.score,
            (Some(a), Some(b)) => a.len() == b.len() && a.iter().rev().eq(b.iter().rev()),
            _ => false,
        }
    }

    fn check_progress(
        &self,
        previous_last: Option<&ScoredHit>,
        batch_first: Option<&ScoredHit>,
        batch_last: Option<&ScoredHit>,
    ) {
        let (Some(previous_last), Some(batch_first), Some(batch_last)) =
            (previous_last, batch_first, batch_last)
        else {
            return;
        };
        let order_wrong = self.ordering.compare(previous_last, batch_first) != Ordering::Less;
        let duplicated = previous_last.internal_id == batch_last.internal_id;
        if order_wrong || duplicated {
            self.metrics.no_progress_batch.increment();
            warn!(
                target: "shardcursor::producer",
                partition_id = self.partition_id,
                order_wrong,
                duplicated,
                "The batch has failed to make progress"
            );
        }
    }
}

impl BatchProducer for SearchBatchProducer {
    fn execute(&mut self, byte_limit: ByteSize, options: &BatchCursorOptions) -> Result<()> {
        self.check_usable("execute")?;
        match self.state {
            ProducerState::Initialized => {
                self.state = ProducerState::GetMore;
                if self.first_batch_options.docs_requested.is_some() {
                    self.metrics.extractable_limit_query.increment();
                }
                let window = std::mem::take(&mut self.initial_window);
                self.adopt(window)
            }
            ProducerState::GetMore => {
                if options.docs_requested.is_some() {
                    self.report_oversubscription(options);
                }
                if self.exhausted || self.current_head().is_some() {
                    return Ok(());
                }
                let after = match &self.last_accepted {
                    Some(hit) => hit.clone(),
                    None => return Ok(()),
                };

                self.strategy.adjust(options);
                let requested = self.next_request_size(byte_limit);
                let result = self
                    .executor
                    .get_more(self.reference.as_ref(), &after, requested);
                let window = self.poison(result)?;

                if let Some(explain) = &self.explain {
                    explain.record_get_more(self.partition_id, window.len());
                }
                debug!(
                    target: "shardcursor::producer",
                    partition_id = self.partition_id,
                    after = after.internal_id,
                    requested,
                    hits = window.len(),
                    partition_exhausted = window.exhausted,
                    "Get more"
                );
                self.adopt(window)
            }
            ProducerState::Failed | ProducerState::Closed => Ok(()),
        }
    }

    fn get_next_batch(&mut self, byte_limit: ByteSize) -> Result<Vec<ResultDocument>> {
        self.check_usable("get_next_batch")?;
        if self.cursor.is_none() {
            return Err(Error::invalid_operation(
                "execute() must be called before get_next_batch()",
            ));
        }
        if let Some(explain) = &self.explain {
            explain.record_retrieve_and_serialize(self.partition_id);
        }

        let previous_last = self.last_accepted.clone();
        let tie_aware = self.tie_aware();
        let mut builder = ResultBatchBuilder::with_limit(byte_limit);
        let mut tie_detected = false;
        let mut batch_first: Option<ScoredHit> = None;
        let mut batch_last: Option<ScoredHit> = None;

        loop {
            let (fits, hit) = match self.current_head() {
                Some(head) => (
                    builder.append_sized(&head.document, head.encoded_size)?,
                    head.hit.clone(),
                ),
                None => break,
            };
            if !fits {
                break;
            }
            if tie_aware && !tie_detected {
                if let Some(previous) = &batch_last {
                    tie_detected = self.is_tie(previous, &hit);
                }
            }
            if batch_first.is_none() {
                batch_first = Some(hit.clone());
            }
            batch_last = Some(hit);
            self.accept_head()?;
        }

        if tie_detected {
            self.metrics.batch_with_ties.increment();
        }

        if self.first_batch {
            self.first_batch = false;
        } else {
            self.check_progress(
                previous_last.as_ref(),
                batch_first.as_ref(),
                batch_last.as_ref(),
            );
        }

        let count = builder.document_count();
        let data_size = builder.data_size().as_u64();
        self.metrics.batch_document_count.record(count as f64);
        self.metrics.batch_data_size.record(data_size as f64);
        self.end_batch();

        let results = builder.build();

        if self.batches_served == 0 && self.first_batch_options.docs_requested.is_some() {
            let (window_len, skipped_head) = self
                .cursor
                .as_ref()
                .map(|c| (c.hits.len(), c.skipped_head))
                .unwrap_or_default();
            let all_fit = results.len() == window_len
                || (skipped_head && results.len() + 1 == window_len);
            self.first_batch_exceeds = !all_fit;
            self.first_batch_docs_returned = results.len();
        }
        self.batches_served += 1;

        debug!(
            target: "shardcursor::producer",
            partition_id = self.partition_id,
            documents = results.len(),
            bytes = data_size,
            exhausted = self.exhausted,
            "Prepared search results"
        );
        Ok(results)
    }

    fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    fn close(&mut self) -> Result<()> {
        if self.state == ProducerState::Closed {
            return Ok(());
        }
        self.state = ProducerState::Closed;
        self.cursor = None;
        debug!(
            target: "shardcursor::producer",
            partition_id = self.partition_id,
            total_served = self.total_served,
            "Closing producer"
        );
        self.reference.release()
    }
}

impl fmt::Debug for SearchBatchProducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchBatchProducer")
            .field("partition_id", &self.partition_id)
            .field("state", &self.state)
            .field("strategy", &self.strategy)
            .field("materializer", &self.materializer.name())
            .field("exhausted", &self.exhausted)
            .field("total_served", &self.total_served)
            .finish()
    }
}

// ============================================================================
// SearchResultsIter
// ============================================================================

/// Peek/accept view over a producer's current window
///
/// Lets a caller build its own stopping condition instead of a byte-bounded
/// batch. `peek` returns `None` once the window is drained; a fresh `execute`
/// is needed to continue.
pub struct SearchResultsIter<'a> {
    producer: &'a mut SearchBatchProducer,
}

impl SearchResultsIter<'_> {
    /// The next pending hit, if any
    pub fn peek(&self) -> Option<&HydratedHit> {
        self.producer.current_head()
    }

    /// Consume the pending hit
    ///
    /// # Errors
    ///
    /// `InvalidOperation` when nothing is pending.
    pub fn accept_and_advance(&mut self) -> Result<()> {
        self.producer.accept_head()
    }

    /// The producer behind this view
    pub fn producer(&self) -> &SearchBatchProducer {
        self.producer
    }
}
