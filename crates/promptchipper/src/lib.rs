#![warn(missing_docs, unused)]
//! # `promptchipper` Instruct Tokenizer
//!
//! A byte-level BPE tokenizer engine, and an instruction-aware adapter
//! which flattens structured chat requests (user/assistant turns, tool
//! definitions, tool calls, tool results) into a single token sequence.
//!
//! See:
//! * [`tokenizer`] for the [`Tokenizer`] capability trait and the [`BpeTokenizer`] engine.
//! * [`instruct`] for the [`InstructAdapter`] and the request model.
//! * [`vocab`] to manage token vocabularies, vocab io, and control tokens.
//! * [`spanning`] and [`encoders`] for the pre-tokenization and merge machinery.
//!
//! ## Crate Features
#![doc = document_features::document_features!()]
//!
//! ## Loading A Model
//!
//! ```rust,no_run
//! use promptchipper::{
//!     InstructAdapter,
//!     InstructTokenizer,
//!     instruct::{ChatMessage, InstructRequest},
//! };
//!
//! fn example() -> promptchipper::PCResult<()> {
//!     let adapter: InstructAdapter<u32> = InstructAdapter::from_model_path("tekken.json")?;
//!
//!     let request = InstructRequest::new(vec![ChatMessage::user("Hello")]);
//!     let tokenized = adapter.encode_instruct(&request)?;
//!
//!     println!("{:?}", tokenized.tokens);
//!     println!("{}", tokenized.text.unwrap_or_default());
//!     Ok(())
//! }
//! ```

pub mod encoders;
pub mod errors;
pub mod instruct;
pub mod regex;
pub mod spanning;
pub mod tokenizer;
pub mod types;
pub mod vocab;

#[cfg(feature = "rayon")]
pub mod rayon;

#[doc(inline)]
pub use errors::{PCError, PCResult};
#[doc(inline)]
pub use instruct::{EosPolicy, InstructAdapter, InstructOptions, InstructTokenizer, Tokenized};
#[doc(inline)]
pub use tokenizer::{BpeTokenizer, Tokenizer, load_tokenizer_path};
#[doc(inline)]
pub use types::TokenType;
#[doc(inline)]
pub use vocab::{SpecialTokens, TokenVocab};
