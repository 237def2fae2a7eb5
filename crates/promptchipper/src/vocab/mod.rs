//! # Vocabulary
//!
//! A [`TokenVocab`] is the immutable table behind a tokenizer:
//! * special tokens, which occupy the lowest ids;
//! * byte-span tokens, in rank order, which always include all 256 single bytes;
//! * a `(T, T) -> T` pair table, derived from the span ranks at load time.
//!
//! See [`io`] for loading vocabularies from model artifacts.

mod byte_vocab;
pub mod io;
mod special_tokens;
mod token_vocab;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

#[doc(inline)]
pub use byte_vocab::*;
#[doc(inline)]
pub use special_tokens::*;
#[doc(inline)]
pub use token_vocab::*;
