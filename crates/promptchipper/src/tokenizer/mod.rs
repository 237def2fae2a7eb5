//! # Tokenizer Engines
//!
//! [`Tokenizer`] is the capability set the instruct adapter needs from an
//! engine: vocabulary introspection, text <-> id conversion, and control
//! token lookup. [`BpeTokenizer`] is the byte-level BPE implementation.
//!
//! ## Loading A Tokenizer
//!
//! ```rust,no_run
//! use promptchipper::{Tokenizer, load_tokenizer_path};
//!
//! fn example() -> promptchipper::PCResult<()> {
//!     let tokenizer = load_tokenizer_path::<u32, _>("tekken.json")?;
//!
//!     let tokens = tokenizer.encode("hello world", true, true)?;
//!     assert_eq!(tokens[0], tokenizer.bos_id());
//!
//!     println!("{}", tokenizer.decode(&tokens)?);
//!     Ok(())
//! }
//! ```

mod bpe_tokenizer;

use std::path::Path;

#[doc(inline)]
pub use bpe_tokenizer::*;

use crate::errors::PCResult;
use crate::types::TokenType;

/// The capabilities of a tokenizer engine.
///
/// Engines are immutable once built; every method is a pure function of
/// the loaded vocabulary and its arguments.
pub trait Tokenizer<T: TokenType>: Send + Sync {
    /// The number of tokens in the vocabulary.
    fn n_words(&self) -> usize;

    /// The string form of every token, in id order.
    fn vocab(&self) -> Vec<String>;

    /// The beginning-of-sequence token.
    fn bos_id(&self) -> T;

    /// The end-of-sequence token.
    fn eos_id(&self) -> T;

    /// Encode text into tokens.
    ///
    /// ## Arguments
    /// * `text` - the text; any Unicode text is encodable.
    /// * `add_bos` - prefix [`Tokenizer::bos_id`].
    /// * `add_eos` - suffix [`Tokenizer::eos_id`].
    fn encode(
        &self,
        text: &str,
        add_bos: bool,
        add_eos: bool,
    ) -> PCResult<Vec<T>>;

    /// Decode tokens into text, dropping control tokens.
    ///
    /// ## Returns
    /// The text; or [`crate::PCError::InvalidTokenId`].
    fn decode(
        &self,
        tokens: &[T],
    ) -> PCResult<String>;

    /// Look up a control token by its literal form.
    ///
    /// ## Returns
    /// The token; or [`crate::PCError::UnknownControlToken`].
    fn get_control_token(
        &self,
        literal: &str,
    ) -> PCResult<T>;

    /// Render tokens as text, with control tokens as their literals.
    ///
    /// ## Returns
    /// The text; or [`crate::PCError::InvalidTokenId`].
    fn to_string(
        &self,
        tokens: &[T],
    ) -> PCResult<String>;

    /// Encode a batch of texts.
    fn encode_batch(
        &self,
        texts: &[&str],
        add_bos: bool,
        add_eos: bool,
    ) -> PCResult<Vec<Vec<T>>> {
        texts
            .iter()
            .map(|text| self.encode(text, add_bos, add_eos))
            .collect()
    }

    /// Decode a batch of token sequences.
    fn decode_batch(
        &self,
        batch: &[&[T]],
    ) -> PCResult<Vec<String>> {
        batch.iter().map(|tokens| self.decode(tokens)).collect()
    }
}

/// Load a [`BpeTokenizer`] from a model artifact.
///
/// See [`crate::vocab::io::load_vocab_path`] for the supported formats.
///
/// ## Returns
/// The tokenizer; or [`crate::PCError::ModelLoad`].
pub fn load_tokenizer_path<T, P>(path: P) -> PCResult<BpeTokenizer<T>>
where
    T: TokenType,
    P: AsRef<Path>,
{
    BpeTokenizer::from_path(path)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tempdir::TempDir;

    use super::*;
    use crate::PCError;
    use crate::vocab::io::TekkenModelFile;
    use crate::vocab::testing::{build_test_tokenizer, build_test_vocab};

    #[test]
    fn test_dyn_tokenizer() {
        let tokenizer: Arc<dyn Tokenizer<u32>> = Arc::new(build_test_tokenizer::<u32>());

        let batch = tokenizer
            .encode_batch(&["Hello world", "", "the thing"], false, true)
            .unwrap();
        assert_eq!(batch.len(), 3);
        assert_eq!(batch[1], vec![tokenizer.eos_id()]);

        let refs: Vec<&[u32]> = batch.iter().map(Vec::as_slice).collect();
        assert_eq!(
            tokenizer.decode_batch(&refs).unwrap(),
            vec!["Hello world", "", "the thing"]
        );

        assert!(matches!(
            tokenizer.decode_batch(&[&[u32::MAX]]),
            Err(PCError::InvalidTokenId { .. })
        ));
    }

    #[test]
    fn test_load_tokenizer_path() {
        let tmp_dir = TempDir::new("tokenizer").unwrap();
        let path = tmp_dir.path().join("model.json");
        TekkenModelFile::from_vocab(&build_test_vocab::<u32>())
            .save_path(&path)
            .unwrap();

        let loaded = load_tokenizer_path::<u16, _>(&path).unwrap();
        let expected = build_test_tokenizer::<u16>();

        assert_eq!(loaded.n_words(), expected.n_words());
        assert_eq!(
            loaded.encode("Hello world", true, false).unwrap(),
            expected.encode("Hello world", true, false).unwrap()
        );

        assert!(matches!(
            load_tokenizer_path::<u32, _>(tmp_dir.path().join("absent.json")),
            Err(PCError::ModelLoad(_))
        ));
    }
}
