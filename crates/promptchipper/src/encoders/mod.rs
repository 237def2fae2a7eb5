//! # Span Encoders
//!
//! A span encoder turns one pre-tokenized byte span into token ids, using
//! the vocabulary's byte table to seed the span and its `(T, T) -> T`
//! pair table to merge it.

mod hybrid_span_encoder;
mod span_encoder;

#[doc(inline)]
pub use hybrid_span_encoder::*;
#[doc(inline)]
pub use span_encoder::*;
