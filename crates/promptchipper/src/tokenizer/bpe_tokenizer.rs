//! # Byte-Level BPE Tokenizer

use core::fmt::{Debug, Formatter};
use core::ops::Range;
use std::path::Path;

use crate::encoders::{HybridSpanEncoder, SpanEncoder};
use crate::errors::{PCError, PCResult};
use crate::spanning::TextSpanner;
use crate::tokenizer::Tokenizer;
use crate::types::TokenType;
use crate::vocab::io::load_vocab_path;
use crate::vocab::{SpecialTokens, TokenVocab};

/// A byte-level BPE [`Tokenizer`].
///
/// Text is split into spans by the vocabulary's pattern; each span is
/// either found whole in the vocabulary, or seeded with single-byte tokens
/// and merged with the pair table. Control literals appearing in text are
/// encoded as ordinary bytes.
#[derive(Clone)]
pub struct BpeTokenizer<T: TokenType> {
    vocab: TokenVocab<T>,
    spanner: TextSpanner,
    bos: T,
    eos: T,
}

impl<T: TokenType> Debug for BpeTokenizer<T> {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> core::fmt::Result {
        f.debug_struct("BpeTokenizer")
            .field("pattern", &self.vocab.pattern())
            .field("n_words", &self.vocab.n_words())
            .field("bos", &self.bos)
            .field("eos", &self.eos)
            .finish()
    }
}

impl<T: TokenType> BpeTokenizer<T> {
    /// Build a tokenizer over a vocabulary.
    ///
    /// ## Returns
    /// The tokenizer; or [`PCError::ModelLoad`] if the vocabulary's pattern
    /// does not compile.
    pub fn from_vocab(vocab: TokenVocab<T>) -> PCResult<Self> {
        let spanner = TextSpanner::from_pattern(vocab.pattern())?;

        let control = |token: SpecialTokens| {
            vocab.lookup_special(token.literal()).ok_or_else(|| {
                PCError::ModelLoad(format!("missing control token {:?}", token.literal()))
            })
        };
        let bos = control(SpecialTokens::Bos)?;
        let eos = control(SpecialTokens::Eos)?;

        Ok(Self {
            vocab,
            spanner,
            bos,
            eos,
        })
    }

    /// Load a tokenizer from a model artifact.
    pub fn from_path<P: AsRef<Path>>(path: P) -> PCResult<Self> {
        Self::from_vocab(load_vocab_path(path)?)
    }

    /// The underlying vocabulary.
    pub fn vocab_ref(&self) -> &TokenVocab<T> {
        &self.vocab
    }

    /// The text spanner.
    pub fn spanner(&self) -> &TextSpanner {
        &self.spanner
    }

    /// Encode a single span, appending to `tokens`.
    fn encode_append_span(
        &self,
        span: &[u8],
        tokens: &mut Vec<T>,
        encoder: &mut HybridSpanEncoder<T>,
    ) {
        if let Some(token) = self.vocab.lookup_span(span) {
            // Whole-span hits also cover spans with no pair path.
            tokens.push(token);
            return;
        }

        let start = tokens.len();
        self.vocab.byte_table().append_tokens(span, tokens);
        encoder.merge_tokens(&self.vocab, tokens, start);
    }

    /// Encode text, appending to `tokens`.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, text, tokens)))]
    pub fn encode_append(
        &self,
        text: &str,
        tokens: &mut Vec<T>,
    ) {
        let mut encoder = HybridSpanEncoder::<T>::default();
        self.spanner.for_each_split_span(text, &mut |span_ref| {
            let range: Range<usize> = span_ref.into();
            self.encode_append_span(text[range].as_bytes(), tokens, &mut encoder);
        });
    }
}

impl<T: TokenType> Tokenizer<T> for BpeTokenizer<T> {
    fn n_words(&self) -> usize {
        self.vocab.n_words()
    }

    fn vocab(&self) -> Vec<String> {
        self.vocab.token_strings()
    }

    fn bos_id(&self) -> T {
        self.bos
    }

    fn eos_id(&self) -> T {
        self.eos
    }

    fn encode(
        &self,
        text: &str,
        add_bos: bool,
        add_eos: bool,
    ) -> PCResult<Vec<T>> {
        let mut tokens = Vec::with_capacity(text.len() / 3 + 2);
        if add_bos {
            tokens.push(self.bos);
        }
        self.encode_append(text, &mut tokens);
        if add_eos {
            tokens.push(self.eos);
        }
        Ok(tokens)
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, tokens)))]
    fn decode(
        &self,
        tokens: &[T],
    ) -> PCResult<String> {
        let mut buf: Vec<u8> = Vec::with_capacity(tokens.len() * 4);
        for &token in tokens {
            self.vocab.check_token(token)?;
            if let Some(bytes) = self.vocab.span_bytes(token) {
                buf.extend_from_slice(bytes);
            }
        }
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    fn get_control_token(
        &self,
        literal: &str,
    ) -> PCResult<T> {
        self.vocab
            .lookup_special(literal)
            .ok_or_else(|| PCError::UnknownControlToken(literal.to_string()))
    }

    fn to_string(
        &self,
        tokens: &[T],
    ) -> PCResult<String> {
        let mut out = String::new();
        let mut pending: Vec<u8> = Vec::new();

        for &token in tokens {
            self.vocab.check_token(token)?;
            match self.vocab.special_literal(token) {
                Some(literal) => {
                    out.push_str(&String::from_utf8_lossy(&pending));
                    pending.clear();
                    out.push_str(literal);
                }
                None => {
                    if let Some(bytes) = self.vocab.span_bytes(token) {
                        pending.extend_from_slice(bytes);
                    }
                }
            }
        }
        out.push_str(&String::from_utf8_lossy(&pending));

        Ok(out)
    }
}
