//! Foundational value types
//!
//! - ByteSize: byte quantities for batch budgets
//! - PartitionId: identity of an index partition

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of an index partition, starting from 0
///
/// Used for tie breaking when merging results across partitions.
pub type PartitionId = u32;

// ============================================================================
// ByteSize
// ============================================================================

/// A byte quantity
///
/// Batch byte budgets are expressed with this type so that kibi/mebi
/// conversions happen in one place.
///
/// # Examples
///
/// ```
/// use shardcursor_core::ByteSize;
///
/// assert_eq!(ByteSize::of_kibi(1).as_u64(), 1024);
/// assert_eq!(ByteSize::of_mebi(16), ByteSize::of_kibi(16 * 1024));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ByteSize(u64);

impl ByteSize {
    /// Zero bytes
    pub const ZERO: ByteSize = ByteSize(0);

    /// Create from a raw byte count
    pub const fn of_bytes(bytes: u64) -> Self {
        ByteSize(bytes)
    }

    /// Create from kibibytes
    pub const fn of_kibi(kib: u64) -> Self {
        ByteSize(kib * 1024)
    }

    /// Create from mebibytes
    pub const fn of_mebi(mib: u64) -> Self {
        ByteSize(mib * 1024 * 1024)
    }

    /// Raw byte count
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Saturating addition
    pub fn saturating_add(self, other: ByteSize) -> ByteSize {
        ByteSize(self.0.saturating_add(other.0))
    }
}

impl fmt::Display for ByteSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}B", self.0)
    }
}

impl From<u64> for ByteSize {
    fn from(bytes: u64) -> Self {
        ByteSize(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_size_units() {
        assert_eq!(ByteSize::of_bytes(7).as_u64(), 7);
        assert_eq!(ByteSize::of_kibi(2).as_u64(), 2048);
        assert_eq!(ByteSize::of_mebi(1).as_u64(), 1_048_576);
    }

    #[test]
    fn test_byte_size_ordering_and_add() {
        let a = ByteSize::of_bytes(10);
        let b = ByteSize::of_bytes(20);
        assert!(a < b);
        assert_eq!(a.saturating_add(b), ByteSize::of_bytes(30));
        assert_eq!(
            ByteSize::of_bytes(u64::MAX).saturating_add(a),
            ByteSize::of_bytes(u64::MAX)
        );
    }

    #[test]
    fn test_byte_size_display() {
        assert_eq!(ByteSize::of_kibi(1).to_string(), "1024B");
    }
}
