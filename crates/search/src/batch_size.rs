//! Batch size strategies
//!
//! A strategy advises how many hits a producer should request from its
//! partition on the next retrieval. This module provides:
//! - BatchSizeStrategy trait
//! - ConstantBatchSizeStrategy: always the same size
//! - ExponentiallyIncreasingBatchSizeStrategy: grows geometrically on adjust
//! - AdjustableBatchSizeStrategy: follows the caller's `docs_requested`, with
//!   the extractable-limit optimization on the first batch

use shardcursor_core::{BatchCursorOptions, CursorConfig, DEFAULT_BATCH_SIZE};
use std::fmt;

// ============================================================================
// BatchSizeStrategy Trait
// ============================================================================

/// Advises retrieval sizes for a single-partition producer
///
/// Strategies are plain policy objects. The producer calls `adjust` with the
/// caller's options before each follow-up retrieval and then asks for advice.
pub trait BatchSizeStrategy: Send + fmt::Debug {
    /// Number of hits to request on the next retrieval (always at least 1)
    fn advise_next_batch_size(&self) -> usize;

    /// Update the advice for the next retrieval
    fn adjust(&mut self, options: &BatchCursorOptions);

    /// Whether the first retrieval was sized from the caller's document cap
    fn used_extractable_limit(&self) -> bool {
        false
    }

    /// Name for debugging and logging
    fn name(&self) -> &str;
}

// ============================================================================
// ConstantBatchSizeStrategy
// ============================================================================

/// Always advises the same size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstantBatchSizeStrategy {
    size: usize,
}

impl ConstantBatchSizeStrategy {
    /// Create a strategy advising `size` (clamped to at least 1)
    pub fn new(size: usize) -> Self {
        ConstantBatchSizeStrategy {
            size: size.max(1),
        }
    }
}

impl Default for ConstantBatchSizeStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE)
    }
}

impl BatchSizeStrategy for ConstantBatchSizeStrategy {
    fn advise_next_batch_size(&self) -> usize {
        self.size
    }

    fn adjust(&mut self, _options: &BatchCursorOptions) {}

    fn name(&self) -> &str {
        "constant"
    }
}

// ============================================================================
// ExponentiallyIncreasingBatchSizeStrategy
// ============================================================================

/// Multiplies its advice on every adjust, up to a maximum
///
/// Used when the caller has not bounded the number of documents it wants:
/// retrieval calls are amortized while the overshoot stays bounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExponentiallyIncreasingBatchSizeStrategy {
    current: usize,
    growth_factor: usize,
    max: usize,
}

impl ExponentiallyIncreasingBatchSizeStrategy {
    /// Create a strategy
    ///
    /// `initial` and `max` are clamped to at least 1, `growth_factor` to at least 2.
    pub fn new(initial: usize, growth_factor: usize, max: usize) -> Self {
        let max = max.max(1);
        ExponentiallyIncreasingBatchSizeStrategy {
            current: initial.clamp(1, max),
            growth_factor: growth_factor.max(2),
            max,
        }
    }

    /// Create a strategy from the configured constants
    pub fn with_config(config: &CursorConfig) -> Self {
        Self::new(
            config.exponential_initial_batch_size,
            config.exponential_growth_factor,
            config.max_batch_size,
        )
    }
}

impl Default for ExponentiallyIncreasingBatchSizeStrategy {
    fn default() -> Self {
        Self::with_config(&CursorConfig::default())
    }
}

impl BatchSizeStrategy for ExponentiallyIncreasingBatchSizeStrategy {
    fn advise_next_batch_size(&self) -> usize {
        self.current
    }

    fn adjust(&mut self, _options: &BatchCursorOptions) {
        self.current = self.current.saturating_mul(self.growth_factor).min(self.max);
    }

    fn name(&self) -> &str {
        "exponential"
    }
}

// ============================================================================
// AdjustableBatchSizeStrategy
// ============================================================================

/// Follows the caller's hints
///
/// On the first batch, when the caller declares how many documents it needs
/// and no full refetch is required, the strategy fetches exactly that many
/// plus a small slack in one shot (the *extractable limit*). Afterwards it
/// follows `docs_requested`, then the batch size hint, then the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdjustableBatchSizeStrategy {
    size: usize,
    default_size: usize,
    max: usize,
    used_extractable_limit: bool,
}

impl AdjustableBatchSizeStrategy {
    /// Create the first-batch strategy from the caller's options
    pub fn create(options: &BatchCursorOptions, requires_full_refetch: bool) -> Self {
        Self::create_with_config(options, requires_full_refetch, &CursorConfig::default())
    }

    /// Create the first-batch strategy using configured constants
    pub fn create_with_config(
        options: &BatchCursorOptions,
        requires_full_refetch: bool,
        config: &CursorConfig,
    ) -> Self {
        let mut strategy = AdjustableBatchSizeStrategy {
            size: config.default_batch_size,
            default_size: config.default_batch_size,
            max: config.max_batch_size,
            used_extractable_limit: false,
        };
        match options.docs_requested {
            Some(docs) if !requires_full_refetch => {
                strategy.size = docs.saturating_add(config.extractable_limit_slack);
                strategy.used_extractable_limit = true;
            }
            _ => {
                if let Some(hint) = options.batch_size_hint {
                    strategy.size = hint;
                }
            }
        }
        strategy.size = strategy.size.clamp(1, strategy.max.max(1));
        strategy
    }

    /// Create a strategy with a fixed initial size
    pub fn new(size: usize) -> Self {
        let config = CursorConfig::default();
        AdjustableBatchSizeStrategy {
            size: size.max(1),
            default_size: config.default_batch_size,
            max: usize::MAX,
            used_extractable_limit: false,
        }
    }
}

impl BatchSizeStrategy for AdjustableBatchSizeStrategy {
    fn advise_next_batch_size(&self) -> usize {
        self.size
    }

    fn adjust(&mut self, options: &BatchCursorOptions) {
        let next = options
            .docs_requested
            .or(options.batch_size_hint)
            .unwrap_or(self.default_size);
        self.size = next.clamp(1, self.max.max(1));
    }

    fn used_extractable_limit(&self) -> bool {
        self.used_extractable_limit
    }

    fn name(&self) -> &str {
        "adjustable"
    }
}
