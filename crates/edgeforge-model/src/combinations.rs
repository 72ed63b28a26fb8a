//! Activity-signature codes.
//!
//! Every non-empty subset of the observed event vocabulary gets a stable
//! positive code: subsets of size 1 first, then size 2 and so on, each size
//! enumerated in combinatorial order over the vocabulary as first observed.
//! A user's signature is the code of the sorted-unique set of kinds they
//! have produced, independent of counts.

use crate::event::EventKind;
use std::collections::HashMap;

/// Immutable mapping from canonical event-kind subsets to signature codes.
///
/// Built once per search run; codes start at 1 and the enumeration order is
/// deterministic, so two indexes built from the same vocabulary are
/// identical.
#[derive(Debug, Clone)]
pub struct CombinationIndex {
    vocabulary: Vec<EventKind>,
    codes: HashMap<Vec<EventKind>, u32>,
}

impl CombinationIndex {
    /// Build the index from the vocabulary in order of first observation.
    ///
    /// `Follow` is excluded from the vocabulary; duplicates are ignored.
    #[must_use]
    pub fn new(vocabulary: &[EventKind]) -> Self {
        let mut vocab: Vec<EventKind> = Vec::new();
        for &kind in vocabulary {
            if kind.is_interaction() && !vocab.contains(&kind) {
                vocab.push(kind);
            }
        }

        let mut codes = HashMap::new();
        let mut next = 1u32;
        for size in 1..=vocab.len() {
            for combination in combinations(&vocab, size) {
                let mut key = combination;
                key.sort_unstable();
                codes.insert(key, next);
                next += 1;
            }
        }

        Self {
            vocabulary: vocab,
            codes,
        }
    }

    /// The vocabulary this index was built over.
    #[inline]
    #[must_use]
    pub fn vocabulary(&self) -> &[EventKind] {
        &self.vocabulary
    }

    /// Code for a canonical (sorted, deduplicated) kind set.
    ///
    /// `None` for the empty set or for kinds outside the vocabulary; a user
    /// with zero interactions has no defined code and must not reach this
    /// lookup.
    #[inline]
    #[must_use]
    pub fn code_of(&self, kinds: &[EventKind]) -> Option<u32> {
        self.codes.get(kinds).copied()
    }

    /// Canonicalize an arbitrary kind collection, then look its code up.
    #[must_use]
    pub fn signature_of(&self, kinds: impl IntoIterator<Item = EventKind>) -> Option<u32> {
        let mut canonical: Vec<EventKind> =
            kinds.into_iter().filter(EventKind::is_interaction).collect();
        canonical.sort_unstable();
        canonical.dedup();
        self.code_of(&canonical)
    }

    /// Number of coded subsets, `2^n - 1` for a vocabulary of size `n`.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Whether the vocabulary was empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

/// All `size`-element combinations of `items`, in combinatorial generation
/// order (indices advance rightmost-first).
fn combinations(items: &[EventKind], size: usize) -> Vec<Vec<EventKind>> {
    let n = items.len();
    if size == 0 || size > n {
        return Vec::new();
    }

    let mut out = Vec::new();
    let mut indices: Vec<usize> = (0..size).collect();
    loop {
        out.push(indices.iter().map(|&i| items[i]).collect());

        // advance the rightmost index that still has room
        let mut pos = size;
        while pos > 0 {
            pos -= 1;
            if indices[pos] != pos + n - size {
                break;
            }
            if pos == 0 {
                return out;
            }
        }
        indices[pos] += 1;
        for later in pos + 1..size {
            indices[later] = indices[later - 1] + 1;
        }
    }
}
