//! # Common Types

use core::fmt::Debug;
use core::hash::Hash;

use num_traits::{FromPrimitive, PrimInt, ToPrimitive, Unsigned};

/// A type that can be used as a token id.
///
/// Implemented for all unsigned primitive integers; in practice `u16`, `u32`, and `u64`.
pub trait TokenType:
    'static + PrimInt + Unsigned + FromPrimitive + ToPrimitive + Hash + Default + Debug + Send + Sync
{
}

impl<T> TokenType for T where
    T: 'static
        + PrimInt
        + Unsigned
        + FromPrimitive
        + ToPrimitive
        + Hash
        + Default
        + Debug
        + Send
        + Sync
{
}

/// Convert an index into a token id, if it fits.
#[inline(always)]
pub fn token_from_usize<T: TokenType>(idx: usize) -> Option<T> {
    T::from_usize(idx)
}

/// Convert a token id into an index.
///
/// Every supported [`TokenType`] fits in a `u64`; ids that do not fit in a
/// `usize` saturate, which keeps them out of any real vocabulary range.
#[inline(always)]
pub fn token_to_usize<T: TokenType>(token: T) -> usize {
    token.to_usize().unwrap_or(usize::MAX)
}

/// Widen a token id for error reporting.
#[inline(always)]
pub fn token_to_u64<T: TokenType>(token: T) -> u64 {
    token.to_u64().unwrap_or(u64::MAX)
}

cfg_if::cfg_if! {
    if #[cfg(feature = "ahash")] {
        /// Type Alias for hash maps in this crate.
        pub type PCHashMap<K, V> = std::collections::HashMap<K, V, ahash::RandomState>;

        /// Type Alias for hash sets in this crate.
        pub type PCHashSet<V> = std::collections::HashSet<V, ahash::RandomState>;
    } else if #[cfg(feature = "foldhash")] {
        /// Type Alias for hash maps in this crate.
        pub type PCHashMap<K, V> = foldhash::HashMap<K, V>;

        /// Type Alias for hash sets in this crate.
        pub type PCHashSet<V> = foldhash::HashSet<V>;
    } else {
        /// Type Alias for hash maps in this crate.
        pub type PCHashMap<K, V> = std::collections::HashMap<K, V>;

        /// Type Alias for hash sets in this crate.
        pub type PCHashSet<V> = std::collections::HashSet<V>;
    }
}

/// Byte span to token map.
pub type SpanTokenMap<T> = PCHashMap<Vec<u8>, T>;

/// Token pair to merged token map.
pub type PairTokenMap<T> = PCHashMap<(T, T), T>;
