//! # Regex Utilities
//!
//! Pre-tokenization patterns are a mix of plain regular expressions and
//! patterns with look-around (which [`regex`] cannot compile).
//! [`RegexWrapper`] hides which engine is in use.

mod regex_wrapper;

#[doc(inline)]
pub use regex_wrapper::*;
