//! # Test Vocabularies
//!
//! A small, hand-built vocabulary for tests and benchmarks.

use crate::tokenizer::BpeTokenizer;
use crate::types::TokenType;
use crate::vocab::special_tokens::default_special_literals;
use crate::vocab::token_vocab::{DEFAULT_PATTERN, TokenVocab};

/// Multi-byte merges of the test vocabulary, in rank order.
///
/// Each entry splits into two lower-ranked entries (or bytes).
pub const TEST_MERGES: &[&[u8]] = &[
    b"He",
    b"ll",
    b"Hell",
    b"Hello",
    b"or",
    b" w",
    b" wor",
    b"ld",
    b" world",
    b"th",
    b"the",
    b" the",
    b"in",
    b"ing",
    b"ab",
    b"abab",
    b"abababab",
    "é".as_bytes(),
    &[0xE6, 0x9D],
    "東".as_bytes(),
];

/// The 256 single-byte spans, in byte order.
pub fn byte_spans() -> Vec<Vec<u8>> {
    (0..=255u8).map(|b| vec![b]).collect()
}

/// Build the test vocabulary.
///
/// Ids: 10 default control tokens, then the 256 bytes, then [`TEST_MERGES`].
pub fn build_test_vocab<T: TokenType>() -> TokenVocab<T> {
    let mut spans = byte_spans();
    spans.extend(TEST_MERGES.iter().map(|m| m.to_vec()));

    TokenVocab::new(DEFAULT_PATTERN, default_special_literals(), spans)
        .expect("test vocabulary is well-formed")
}

/// Build a tokenizer over the test vocabulary.
pub fn build_test_tokenizer<T: TokenType>() -> BpeTokenizer<T> {
    BpeTokenizer::from_vocab(build_test_vocab()).expect("test pattern compiles")
}
