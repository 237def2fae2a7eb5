//! # Text Spanning
//!
//! This module exists to factor out pre-tokenization scanning.
//!
//! Before BPE merging, text is split into spans; merges never cross a span
//! boundary. [`TextSpanner`] walks a [`SpanLexer`] over the text and labels
//! every byte as part of either a [`SpanRef::Word`] (a lexer match) or a
//! [`SpanRef::Gap`] (a region the lexer skipped).

mod span_lexer;
mod text_spanner;

#[doc(inline)]
pub use span_lexer::*;
#[doc(inline)]
pub use text_spanner::*;
