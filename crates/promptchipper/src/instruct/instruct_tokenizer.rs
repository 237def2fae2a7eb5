//! # Instruct Tokenizer Trait

use crate::errors::PCResult;
use crate::tokenizer::Tokenizer;
use crate::types::TokenType;

/// Flattens structured requests into token sequences.
///
/// The request and output shapes are fixed per implementation.
pub trait InstructTokenizer {
    /// The token type of the underlying engine.
    type Token: TokenType;

    /// The structured request type.
    type Request;

    /// The flattened output type.
    type Output;

    /// The underlying engine.
    fn tokenizer(&self) -> &dyn Tokenizer<Self::Token>;

    /// Flatten a request.
    fn encode_instruct(
        &self,
        request: &Self::Request,
    ) -> PCResult<Self::Output>;

    /// Decode tokens with the underlying engine.
    fn decode(
        &self,
        tokens: &[Self::Token],
    ) -> PCResult<String> {
        self.tokenizer().decode(tokens)
    }
}
