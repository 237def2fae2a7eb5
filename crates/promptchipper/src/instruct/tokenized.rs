//! # Tokenized Output

use crate::types::TokenType;

/// The flattened form of an instruct request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tokenized<T: TokenType> {
    /// The token sequence.
    pub tokens: Vec<T>,

    /// The rendered text, with control tokens as their literals.
    pub text: Option<String>,
}

impl<T: TokenType> Tokenized<T> {
    /// The number of tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Are there no tokens?
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
