//! # Hybrid sweep/heap [`SpanEncoder`].
//!
//! Short spans use an inline linear sweep (low overhead, O(m*n)).
//! Long spans switch to a min-heap + linked-list algorithm (O(m log n)).

use core::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::encoders::span_encoder::{PairMergeTable, SpanEncoder};
use crate::types::TokenType;

/// Spans with at most this many seed tokens use the linear sweep path.
pub const SWEEP_THRESHOLD: usize = 16;

/// Sentinel value for "no neighbor" in the linked list.
const SENTINEL: u32 = u32::MAX;

/// Per-position merge counter.
///
/// A merge bumps at most two positions, so counters stay below `2 * n` for a
/// span of `n` tokens. The head of a long merge chain passes any `u8` range.
type Generation = u32;

/// A heap entry: (merged_token, position, generation_at_push_time).
///
/// Wrapped in [`Reverse`] so the [`BinaryHeap`] acts as a min-heap by merged id,
/// with ties broken by position (leftmost first).
type HeapEntry<T> = Reverse<(T, u32, Generation)>;

/// A hybrid [`SpanEncoder`] that picks the merge strategy per span.
///
/// Short spans (up to [`SWEEP_THRESHOLD`] tokens) use a simple linear sweep
/// with `Vec::remove`.
///
/// Longer spans use a [`BinaryHeap`] for O(log n) min-finding and a
/// doubly-linked list for O(1) token removal, with lazy staleness detection
/// via per-position generation counters.
///
/// Both paths apply the same merge order, and produce the same tokens.
///
/// Working buffers are reused across calls to avoid repeated allocation.
#[derive(Default, Debug, Clone)]
pub struct HybridSpanEncoder<T: TokenType> {
    next: Vec<u32>,
    prev: Vec<u32>,
    generation: Vec<Generation>,
    heap: BinaryHeap<HeapEntry<T>>,
}

impl<T: TokenType> HybridSpanEncoder<T> {
    /// Linear sweep merge.
    pub fn sweep(
        pairs: &dyn PairMergeTable<T>,
        tokens: &mut Vec<T>,
        start: usize,
    ) {
        let stop = start + 2;
        while tokens.len() >= stop {
            if let Some((token, idx)) = tokens[start..]
                .windows(2)
                .enumerate()
                .filter_map(|(idx, w)| pairs.lookup_pair(&(w[0], w[1])).map(|token| (token, idx)))
                .min()
            {
                let idx = start + idx;
                tokens[idx] = token;
                tokens.remove(idx + 1);
            } else {
                break;
            }
        }
    }

    /// Heap-based merge for long spans.
    ///
    /// Spans of fewer than two tokens are left untouched, without resetting
    /// any working state.
    pub fn heap_merge(
        &mut self,
        pairs: &dyn PairMergeTable<T>,
        tokens: &mut Vec<T>,
        start: usize,
    ) {
        let n = tokens.len() - start;
        if n < 2 {
            return;
        }

        // Initialize linked-list arrays and generation counters.
        self.next.clear();
        self.next
            .extend((1..=n as u32).map(|i| if i < n as u32 { i } else { SENTINEL }));

        self.prev.clear();
        self.prev.push(SENTINEL);
        self.prev.extend(0..n as u32 - 1);

        self.generation.clear();
        self.generation.resize(n, 0);

        // Seed the heap with all adjacent pairs.
        self.heap.clear();
        let mut pos = 0u32;
        while self.next[pos as usize] != SENTINEL {
            let j = self.next[pos as usize];
            if let Some(merged) =
                pairs.lookup_pair(&(tokens[start + pos as usize], tokens[start + j as usize]))
            {
                self.heap.push(Reverse((merged, pos, 0)));
            }
            pos = j;
        }

        // Merge loop.
        while let Some(Reverse((merged, i, entry_gen))) = self.heap.pop() {
            let ii = i as usize;

            if entry_gen != self.generation[ii] {
                continue;
            }
            let j = self.next[ii];
            if j == SENTINEL {
                continue;
            }
            let jj = j as usize;

            tokens[start + ii] = merged;

            let k = self.next[jj];
            self.next[ii] = k;
            if k != SENTINEL {
                self.prev[k as usize] = i;
            }
            self.next[jj] = SENTINEL;

            self.generation[ii] = self.generation[ii].wrapping_add(1);

            let p = self.prev[ii];
            if p != SENTINEL {
                let pp = p as usize;
                self.generation[pp] = self.generation[pp].wrapping_add(1);
                if let Some(left) = pairs.lookup_pair(&(tokens[start + pp], tokens[start + ii])) {
                    self.heap.push(Reverse((left, p, self.generation[pp])));
                }
            }

            if k != SENTINEL {
                if let Some(right) =
                    pairs.lookup_pair(&(tokens[start + ii], tokens[start + k as usize]))
                {
                    self.heap.push(Reverse((right, i, self.generation[ii])));
                }
            }
        }

        // Compact live tokens in-place by walking the linked list.
        let mut write = start;
        let mut pos = 0u32;
        loop {
            tokens[write] = tokens[start + pos as usize];
            write += 1;
            let nxt = self.next[pos as usize];
            if nxt == SENTINEL {
                break;
            }
            pos = nxt;
        }
        tokens.truncate(write);
    }
}

impl<T: TokenType> SpanEncoder<T> for HybridSpanEncoder<T> {
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "trace", skip(self, pairs, tokens))
    )]
    fn merge_tokens(
        &mut self,
        pairs: &dyn PairMergeTable<T>,
        tokens: &mut Vec<T>,
        start: usize,
    ) {
        if tokens.len() - start <= SWEEP_THRESHOLD {
            Self::sweep(pairs, tokens, start);
        } else {
            self.heap_merge(pairs, tokens, start);
        }
    }
}
