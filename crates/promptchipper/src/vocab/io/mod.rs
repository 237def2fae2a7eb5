//! # Vocabulary IO
//!
//! Two model artifact formats are supported:
//! * `*.json` - a JSON document with a pattern, ranked base64 span tokens,
//!   and ranked special tokens; see [`TekkenModelFile`].
//! * anything else - a base64 rank file, one `base64(bytes) rank` pair per
//!   line; special tokens are then the default control table.
//!
//! ## Loading A Vocab
//!
//! ```rust,no_run
//! use promptchipper::{BpeTokenizer, Tokenizer, TokenVocab, vocab::io::load_vocab_path};
//!
//! fn example() -> promptchipper::PCResult<()> {
//!     let vocab: TokenVocab<u32> = load_vocab_path("tekken.json")?;
//!     let tokenizer = BpeTokenizer::from_vocab(vocab)?;
//!
//!     let tokens = tokenizer.encode("hello world", true, false)?;
//!     println!("{tokens:?}");
//!     Ok(())
//! }
//! ```

mod base64_vocab;
mod tekken_json;

use std::path::Path;

#[doc(inline)]
pub use base64_vocab::*;
#[doc(inline)]
pub use tekken_json::*;

use crate::errors::{PCError, PCResult};
use crate::types::TokenType;
use crate::vocab::special_tokens::default_special_literals;
use crate::vocab::token_vocab::{DEFAULT_PATTERN, TokenVocab};

/// Load a [`TokenVocab`] from a model artifact, selecting the format by extension.
///
/// ## Returns
/// The vocabulary; or [`PCError::ModelLoad`] if the artifact is missing or malformed.
pub fn load_vocab_path<T, P>(path: P) -> PCResult<TokenVocab<T>>
where
    T: TokenType,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if !path.is_file() {
        return Err(PCError::ModelLoad(format!(
            "model artifact not found: {}",
            path.display()
        )));
    }

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    log::debug!(
        "loading {} model artifact: {}",
        if is_json { "json" } else { "base64" },
        path.display()
    );

    if is_json {
        load_tekken_json_path(path)?.into_vocab()
    } else {
        let spans = load_base64_span_vocab_path(path)?;
        TokenVocab::new(DEFAULT_PATTERN, default_special_literals(), spans)
    }
}
