//! Hit ordering
//!
//! Results are ordered either by relevance (score descending) or by
//! caller-supplied sort keys. In both cases ties are broken by ascending
//! partition id and then by ascending internal id, so that the merged order
//! never depends on the order in which partitions were listed.

use crate::search_types::ScoredHit;
use crate::types::PartitionId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;

// ============================================================================
// SortKey
// ============================================================================

/// One sort value carried by a hit
///
/// Values of different kinds order by kind first: null < bool < number < string.
/// Integers and floats compare numerically with each other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SortKey {
    /// Missing value
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Floating point value
    Float(f64),
    /// String value
    Str(String),
}

impl SortKey {
    fn kind_rank(&self) -> u8 {
        match self {
            SortKey::Null => 0,
            SortKey::Bool(_) => 1,
            SortKey::Int(_) | SortKey::Float(_) => 2,
            SortKey::Str(_) => 3,
        }
    }

    /// Total order over sort keys
    pub fn total_cmp(&self, other: &SortKey) -> Ordering {
        match (self, other) {
            (SortKey::Null, SortKey::Null) => Ordering::Equal,
            (SortKey::Bool(a), SortKey::Bool(b)) => a.cmp(b),
            (SortKey::Int(a), SortKey::Int(b)) => a.cmp(b),
            (SortKey::Float(a), SortKey::Float(b)) => {
                normalize_zero(*a).total_cmp(&normalize_zero(*b))
            }
            (SortKey::Int(a), SortKey::Float(b)) => (*a as f64).total_cmp(&normalize_zero(*b)),
            (SortKey::Float(a), SortKey::Int(b)) => normalize_zero(*a).total_cmp(&(*b as f64)),
            (SortKey::Str(a), SortKey::Str(b)) => a.cmp(b),
            _ => self.kind_rank().cmp(&other.kind_rank()),
        }
    }
}

// ============================================================================
// SortSpec
// ============================================================================

/// Direction of one sort field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirection {
    /// Smallest first
    #[default]
    Ascending,
    /// Largest first
    Descending,
}

impl SortDirection {
    fn apply(self, ord: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    }
}

/// Per-field directions of a sorted query
///
/// The i-th direction applies to the i-th sort key of every hit. Keys beyond
/// the declared directions sort ascending.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortSpec {
    /// Direction per sort field
    pub directions: Vec<SortDirection>,
}

impl SortSpec {
    /// Create a sort spec
    pub fn new(directions: Vec<SortDirection>) -> Self {
        SortSpec { directions }
    }

    fn direction(&self, index: usize) -> SortDirection {
        self.directions.get(index).copied().unwrap_or_default()
    }

    /// Compare two sort key lists field by field
    pub fn compare_keys(&self, a: &[SortKey], b: &[SortKey]) -> Ordering {
        for (i, (ka, kb)) in a.iter().zip(b.iter()).enumerate() {
            let ord = self.direction(i).apply(ka.total_cmp(kb));
            if ord != Ordering::Equal {
                return ord;
            }
        }
        a.len().cmp(&b.len())
    }
}

// ============================================================================
// HitOrdering
// ============================================================================

/// `-0.0` and `0.0` are the same value for ordering purposes
fn normalize_zero(value: f64) -> f64 {
    if value == 0.0 {
        0.0
    } else {
        value
    }
}

fn compare_scores(a: f32, b: f32) -> Ordering {
    normalize_zero(f64::from(b)).total_cmp(&normalize_zero(f64::from(a)))
}

/// How hits are ordered within and across partitions
///
/// Scores compare with `f32::total_cmp` after folding `-0.0` into `0.0`, so
/// hits whose scores are `==` always fall back to the tie breakers.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum HitOrdering {
    /// Score descending
    #[default]
    Relevance,
    /// Sort keys in field order; hits without keys sort as if all keys were null
    Sort(Arc<SortSpec>),
}

impl HitOrdering {
    /// Order by the given sort keys
    pub fn sorted(spec: SortSpec) -> Self {
        HitOrdering::Sort(Arc::new(spec))
    }

    /// Compare two hits; `Less` means `a` is emitted before `b`
    pub fn compare(&self, a: &ScoredHit, b: &ScoredHit) -> Ordering {
        self.compare_primary(a, b)
            .then_with(|| a.partition_id.cmp(&b.partition_id))
            .then_with(|| a.internal_id.cmp(&b.internal_id))
    }

    /// Compare only on score or sort keys, ignoring the tie breakers
    pub fn compare_primary(&self, a: &ScoredHit, b: &ScoredHit) -> Ordering {
        match self {
            HitOrdering::Relevance => compare_scores(a.score, b.score),
            HitOrdering::Sort(spec) => {
                let empty: &[SortKey] = &[];
                let ka = a.sort_values.as_deref().unwrap_or(empty);
                let kb = b.sort_values.as_deref().unwrap_or(empty);
                spec.compare_keys(ka, kb)
            }
        }
    }

    /// Owned ordering key of a hit, for use in heaps
    pub fn key(&self, hit: &ScoredHit) -> HitKey {
        let primary = match self {
            HitOrdering::Relevance => PrimaryKey::Score(hit.score),
            HitOrdering::Sort(spec) => PrimaryKey::Sort {
                spec: Arc::clone(spec),
                values: hit.sort_values.clone().unwrap_or_default(),
            },
        };
        HitKey {
            primary,
            partition_id: hit.partition_id,
            internal_id: hit.internal_id,
        }
    }
}

#[derive(Debug, Clone)]
enum PrimaryKey {
    Score(f32),
    Sort {
        spec: Arc<SortSpec>,
        values: Vec<SortKey>,
    },
}

impl PrimaryKey {
    fn compare(&self, other: &PrimaryKey) -> Ordering {
        match (self, other) {
            (PrimaryKey::Score(a), PrimaryKey::Score(b)) => compare_scores(*a, *b),
            (PrimaryKey::Sort { spec, values: a }, PrimaryKey::Sort { values: b, .. }) => {
                spec.compare_keys(a, b)
            }
            // Keys built by different orderings; only one ordering feeds a heap
            (PrimaryKey::Score(_), PrimaryKey::Sort { .. }) => Ordering::Less,
            (PrimaryKey::Sort { .. }, PrimaryKey::Score(_)) => Ordering::Greater,
        }
    }
}

/// Ordering key of a hit
///
/// `Ord` follows [`HitOrdering::compare`]: the smallest key is emitted first.
/// Comparisons read the stored fields in place.
#[derive(Debug, Clone)]
pub struct HitKey {
    primary: PrimaryKey,
    partition_id: PartitionId,
    internal_id: u64,
}

impl HitKey {
    /// Partition of the hit
    pub fn partition_id(&self) -> PartitionId {
        self.partition_id
    }

    /// Internal id of the hit
    pub fn internal_id(&self) -> u64 {
        self.internal_id
    }
}

impl PartialEq for HitKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HitKey {}

impl PartialOrd for HitKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HitKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.primary
            .compare(&other.primary)
            .then_with(|| self.partition_id.cmp(&other.partition_id))
            .then_with(|| self.internal_id.cmp(&other.internal_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(partition_id: PartitionId, internal_id: u64, score: f32) -> ScoredHit {
        ScoredHit::new(internal_id, score).with_partition(partition_id)
    }

    #[test]
    fn test_relevance_orders_by_score_descending() {
        let ord = HitOrdering::Relevance;
        assert_eq!(ord.compare(&hit(0, 0, 0.9), &hit(0, 1, 0.5)), Ordering::Less);
        assert_eq!(ord.compare(&hit(0, 1, 0.5), &hit(0, 0, 0.9)), Ordering::Greater);
    }

    #[test]
    fn test_relevance_ties_break_on_partition_then_internal_id() {
        let ord = HitOrdering::Relevance;
        assert_eq!(ord.compare(&hit(0, 9, 1.0), &hit(3, 0, 1.0)), Ordering::Less);
        assert_eq!(ord.compare(&hit(2, 4, 1.0), &hit(2, 5, 1.0)), Ordering::Less);
        assert_eq!(ord.compare(&hit(2, 5, 1.0), &hit(2, 5, 1.0)), Ordering::Equal);
    }

    #[test]
    fn test_sort_spec_directions() {
        let spec = SortSpec::new(vec![SortDirection::Descending, SortDirection::Ascending]);
        let a = vec![SortKey::Int(5), SortKey::Str("a".into())];
        let b = vec![SortKey::Int(5), SortKey::Str("b".into())];
        let c = vec![SortKey::Int(7), SortKey::Str("z".into())];
        assert_eq!(spec.compare_keys(&a, &b), Ordering::Less);
        assert_eq!(spec.compare_keys(&c, &a), Ordering::Less);
    }

    #[test]
    fn test_sort_key_cross_kind_ordering() {
        assert_eq!(SortKey::Null.total_cmp(&SortKey::Bool(false)), Ordering::Less);
        assert_eq!(SortKey::Int(2).total_cmp(&SortKey::Float(2.5)), Ordering::Less);
        assert_eq!(SortKey::Float(3.0).total_cmp(&SortKey::Int(3)), Ordering::Equal);
        assert_eq!(
            SortKey::Str("a".into()).total_cmp(&SortKey::Int(100)),
            Ordering::Greater
        );
    }

    #[test]
    fn test_sorted_hits_use_sort_keys_not_score() {
        let ord = HitOrdering::sorted(SortSpec::new(vec![SortDirection::Ascending]));
        let low = hit(1, 0, 0.1).with_sort_values(vec![SortKey::Int(1)]);
        let high = hit(0, 0, 0.9).with_sort_values(vec![SortKey::Int(2)]);
        assert_eq!(ord.compare(&low, &high), Ordering::Less);
    }

    #[test]
    fn test_hit_key_matches_compare() {
        let ord = HitOrdering::Relevance;
        let a = hit(1, 0, 0.7);
        let b = hit(0, 0, 0.7);
        let c = hit(0, 1, 0.8);
        let mut keys = vec![ord.key(&a), ord.key(&b), ord.key(&c)];
        keys.sort();
        let order: Vec<_> = keys.iter().map(HitKey::partition_id).collect();
        assert_eq!(order, vec![0, 0, 1]);
        assert_eq!(keys[0].internal_id(), 1);
    }

    #[test]
    fn test_sorted_hit_keys_match_compare() {
        let ord = HitOrdering::sorted(SortSpec::new(vec![SortDirection::Descending]));
        let hits = vec![
            hit(0, 0, 0.0).with_sort_values(vec![SortKey::Int(3)]),
            hit(1, 0, 0.0).with_sort_values(vec![SortKey::Int(9)]),
            hit(2, 0, 0.0),
            hit(0, 1, 0.0).with_sort_values(vec![SortKey::Int(9)]),
        ];
        let mut keys: Vec<_> = hits.iter().map(|h| ord.key(h)).collect();
        keys.sort();
        let mut expected = hits.clone();
        expected.sort_by(|a, b| ord.compare(a, b));
        let got: Vec<_> = keys.iter().map(|k| (k.partition_id(), k.internal_id())).collect();
        let want: Vec<_> = expected.iter().map(|h| (h.partition_id, h.internal_id)).collect();
        assert_eq!(got, want);
        assert_eq!(&got[1..3], &[(0, 1), (1, 0)]);
    }

    #[test]
    fn test_negative_zero_score_ties_with_zero() {
        let ord = HitOrdering::Relevance;
        let negative = hit(0, 0, -0.0);
        let positive = hit(1, 0, 0.0);
        assert_eq!(ord.compare_primary(&negative, &positive), Ordering::Equal);
        assert_eq!(ord.compare(&negative, &positive), Ordering::Less);
        assert!(ord.key(&negative) < ord.key(&positive));
        assert_eq!(
            SortKey::Float(-0.0).total_cmp(&SortKey::Float(0.0)),
            Ordering::Equal
        );
        assert_eq!(SortKey::Float(-0.0).total_cmp(&SortKey::Int(0)), Ordering::Equal);
    }
}
