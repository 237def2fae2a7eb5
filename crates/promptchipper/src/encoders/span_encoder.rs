//! # Span Encoder Traits

use crate::types::{PairTokenMap, TokenType};

/// A `(T, T) -> T` merge table.
///
/// Lower merged ids have priority: merges are applied lowest-id first.
pub trait PairMergeTable<T: TokenType> {
    /// Look up the token formed by merging `pair`.
    fn lookup_pair(
        &self,
        pair: &(T, T),
    ) -> Option<T>;
}

impl<T: TokenType> PairMergeTable<T> for PairTokenMap<T> {
    #[inline(always)]
    fn lookup_pair(
        &self,
        pair: &(T, T),
    ) -> Option<T> {
        self.get(pair).copied()
    }
}

/// Merges a seeded token buffer in place.
pub trait SpanEncoder<T: TokenType> {
    /// Merge `tokens[start..]` with `pairs` until no merge applies.
    ///
    /// ## Arguments
    /// * `pairs` - the merge table.
    /// * `tokens` - the token buffer; `tokens[..start]` is left untouched.
    /// * `start` - the first index of the working region.
    fn merge_tokens(
        &mut self,
        pairs: &dyn PairMergeTable<T>,
        tokens: &mut Vec<T>,
        start: usize,
    );
}
