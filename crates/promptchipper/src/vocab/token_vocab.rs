//! # Token Vocabulary

use crate::encoders::{HybridSpanEncoder, PairMergeTable, SpanEncoder};
use crate::errors::{PCError, PCResult};
use crate::types::{
    PCHashMap,
    PCHashSet,
    PairTokenMap,
    SpanTokenMap,
    TokenType,
    token_from_usize,
    token_to_u64,
    token_to_usize,
};
use crate::vocab::byte_vocab::ByteTokenTable;
use crate::vocab::special_tokens::SpecialTokens;

/// The default pre-tokenization pattern.
///
/// Requires look-ahead, so it compiles with [`fancy_regex`].
pub const DEFAULT_PATTERN: &str = r"[^\r\n\p{L}\p{N}]?[\p{Lu}\p{Lt}\p{Lm}\p{Lo}\p{M}]*[\p{Ll}\p{Lm}\p{Lo}\p{M}]+|[^\r\n\p{L}\p{N}]?[\p{Lu}\p{Lt}\p{Lm}\p{Lo}\p{M}]+[\p{Ll}\p{Lm}\p{Lo}\p{M}]*|\p{N}| ?[^\s\p{L}\p{N}]+[\r\n/]*|\s*[\r\n]+|\s+(?!\S)|\s+";

/// Render a span token's bytes as a string.
///
/// Valid UTF-8 renders as itself; anything else renders byte-by-byte as `<0xHH>`.
pub fn render_span_bytes(bytes: &[u8]) -> String {
    match core::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|b| format!("<0x{b:02X}>")).collect(),
    }
}

/// An immutable tokenizer vocabulary.
///
/// Ids `[0, num_special_tokens)` are special tokens; the remaining ids are
/// byte-span tokens, in rank order.
#[derive(Clone, Debug)]
pub struct TokenVocab<T: TokenType> {
    pattern: String,

    specials: Vec<String>,
    special_index: PCHashMap<String, T>,

    spans: Vec<Vec<u8>>,
    span_index: SpanTokenMap<T>,

    byte_table: ByteTokenTable<T>,
    pairs: PairTokenMap<T>,
}

impl<T: TokenType> TokenVocab<T> {
    /// Build and validate a vocabulary.
    ///
    /// ## Arguments
    /// * `pattern` - the pre-tokenization pattern.
    /// * `specials` - special token literals, in id order.
    /// * `spans` - span token bytes, in rank order.
    ///
    /// ## Returns
    /// The vocabulary; or [`PCError::ModelLoad`] if it is not well-formed.
    pub fn new<P: Into<String>>(
        pattern: P,
        specials: Vec<String>,
        spans: Vec<Vec<u8>>,
    ) -> PCResult<Self> {
        let pattern = pattern.into();
        let n_words = specials.len() + spans.len();

        if n_words == 0 || token_from_usize::<T>(n_words - 1).is_none() {
            return Err(PCError::ModelLoad(format!(
                "vocabulary size {n_words} does not fit the token type (max {:?})",
                T::max_value()
            )));
        }

        let mut special_index: PCHashMap<String, T> = Default::default();
        for (idx, literal) in specials.iter().enumerate() {
            if literal.is_empty() {
                return Err(PCError::ModelLoad(format!("special token {idx} is empty")));
            }
            let token = Self::id_at(idx);
            if special_index.insert(literal.clone(), token).is_some() {
                return Err(PCError::ModelLoad(format!(
                    "duplicate special token {literal:?}"
                )));
            }
        }

        for required in SpecialTokens::REQUIRED {
            if !special_index.contains_key(required.literal()) {
                return Err(PCError::ModelLoad(format!(
                    "missing control token {:?}",
                    required.literal()
                )));
            }
        }

        let offset = specials.len();
        let mut span_index: SpanTokenMap<T> = Default::default();
        span_index.reserve(spans.len());
        for (idx, span) in spans.iter().enumerate() {
            if span.is_empty() {
                return Err(PCError::ModelLoad(format!("span token rank {idx} is empty")));
            }
            if span_index
                .insert(span.clone(), Self::id_at(offset + idx))
                .is_some()
            {
                return Err(PCError::ModelLoad(format!(
                    "duplicate span token {}",
                    render_span_bytes(span)
                )));
            }
        }

        let byte_table = ByteTokenTable::try_from_fn(|b| span_index.get([b].as_slice()).copied())
            .map_err(|b| PCError::ModelLoad(format!("missing single-byte token <0x{b:02X}>")))?;

        // The id <-> string mapping must be a bijection.
        let mut seen: PCHashSet<String> = Default::default();
        seen.reserve(n_words);
        for literal in &specials {
            seen.insert(literal.clone());
        }
        for span in &spans {
            let rendered = render_span_bytes(span);
            if !seen.insert(rendered) {
                return Err(PCError::ModelLoad(format!(
                    "span token {} collides with another token string",
                    render_span_bytes(span)
                )));
            }
        }

        let (pairs, unreachable) = derive_pairs(&byte_table, &spans, offset);
        if unreachable > 0 {
            log::warn!("{unreachable} span tokens are not reachable by pair merges");
        }

        log::debug!(
            "loaded vocabulary: {} special, {} span, {} pair merges",
            specials.len(),
            spans.len(),
            pairs.len()
        );

        Ok(Self {
            pattern,
            specials,
            special_index,
            spans,
            span_index,
            byte_table,
            pairs,
        })
    }

    // Only valid after the size check in `new`.
    fn id_at(idx: usize) -> T {
        token_from_usize(idx).unwrap_or_else(T::max_value)
    }

    /// The pre-tokenization pattern.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The total number of tokens.
    pub fn n_words(&self) -> usize {
        self.specials.len() + self.spans.len()
    }

    /// The number of special tokens.
    pub fn num_special_tokens(&self) -> usize {
        self.specials.len()
    }

    /// The special token literals, in id order.
    pub fn special_literals(&self) -> &[String] {
        &self.specials
    }

    /// The span token bytes, in rank order.
    pub fn span_tokens(&self) -> &[Vec<u8>] {
        &self.spans
    }

    /// The byte seed table.
    pub fn byte_table(&self) -> &ByteTokenTable<T> {
        &self.byte_table
    }

    /// The derived pair merge table.
    pub fn pairs(&self) -> &PairTokenMap<T> {
        &self.pairs
    }

    /// Validate a token id.
    ///
    /// ## Returns
    /// The id as an index; or [`PCError::InvalidTokenId`].
    pub fn check_token(
        &self,
        token: T,
    ) -> PCResult<usize> {
        let idx = token_to_usize(token);
        if idx < self.n_words() {
            Ok(idx)
        } else {
            Err(PCError::InvalidTokenId {
                id: token_to_u64(token),
                n_words: self.n_words(),
            })
        }
    }

    /// Is this a special token id?
    pub fn is_special(
        &self,
        token: T,
    ) -> bool {
        token_to_usize(token) < self.specials.len()
    }

    /// The literal of a special token.
    pub fn special_literal(
        &self,
        token: T,
    ) -> Option<&str> {
        self.specials.get(token_to_usize(token)).map(String::as_str)
    }

    /// The bytes of a span token.
    pub fn span_bytes(
        &self,
        token: T,
    ) -> Option<&[u8]> {
        token_to_usize(token)
            .checked_sub(self.specials.len())
            .and_then(|idx| self.spans.get(idx))
            .map(Vec::as_slice)
    }

    /// Look up a special token by its literal.
    pub fn lookup_special(
        &self,
        literal: &str,
    ) -> Option<T> {
        self.special_index.get(literal).copied()
    }

    /// Look up a whole span.
    pub fn lookup_span(
        &self,
        span: &[u8],
    ) -> Option<T> {
        self.span_index.get(span).copied()
    }

    /// The string form of a token.
    pub fn token_string(
        &self,
        token: T,
    ) -> Option<String> {
        match self.special_literal(token) {
            Some(literal) => Some(literal.to_string()),
            None => self.span_bytes(token).map(render_span_bytes),
        }
    }

    /// All token strings, in id order.
    pub fn token_strings(&self) -> Vec<String> {
        self.specials
            .iter()
            .cloned()
            .chain(self.spans.iter().map(|span| render_span_bytes(span)))
            .collect()
    }
}

impl<T: TokenType> PairMergeTable<T> for TokenVocab<T> {
    #[inline(always)]
    fn lookup_pair(
        &self,
        pair: &(T, T),
    ) -> Option<T> {
        self.pairs.get(pair).copied()
    }
}

/// Derive the `(T, T) -> T` merge table from ranked spans.
///
/// Each multi-byte span is re-merged with the lower-ranked table;
/// when that leaves exactly two tokens, they become its pair.
///
/// ## Returns
/// `(pairs, unreachable)`: the table, and the count of spans with no pair.
fn derive_pairs<T: TokenType>(
    byte_table: &ByteTokenTable<T>,
    spans: &[Vec<u8>],
    offset: usize,
) -> (PairTokenMap<T>, usize) {
    let mut pairs: PairTokenMap<T> = Default::default();
    let mut encoder = HybridSpanEncoder::<T>::default();
    let mut buf: Vec<T> = Vec::with_capacity(32);
    let mut unreachable = 0;

    for (idx, span) in spans.iter().enumerate() {
        if span.len() < 2 {
            continue;
        }

        buf.clear();
        byte_table.append_tokens(span, &mut buf);
        encoder.merge_tokens(&pairs, &mut buf, 0);

        match buf.as_slice() {
            &[a, b] => {
                pairs.insert((a, b), TokenVocab::<T>::id_at(offset + idx));
            }
            _ => unreachable += 1,
        }
    }

    (pairs, unreachable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::special_tokens::default_special_literals;
    use crate::vocab::testing::{TEST_MERGES, byte_spans, build_test_vocab};

    fn check_test_vocab<T: TokenType>() {
        let vocab: TokenVocab<T> = build_test_vocab();

        assert_eq!(vocab.num_special_tokens(), 10);
        assert_eq!(vocab.n_words(), 10 + 256 + TEST_MERGES.len());
        assert_eq!(vocab.pattern(), DEFAULT_PATTERN);

        let t = |x: usize| T::from_usize(x).unwrap();

        assert_eq!(vocab.lookup_special("<s>"), Some(t(1)));
        assert_eq!(vocab.lookup_special("</s>"), Some(t(2)));
        assert_eq!(vocab.lookup_special("hello"), None);

        assert_eq!(vocab.byte_table().get(b'a'), t(10 + b'a' as usize));
        assert_eq!(vocab.lookup_span(b"a"), Some(t(10 + b'a' as usize)));

        // Every merge is reachable by pairs.
        assert_eq!(vocab.pairs().len(), TEST_MERGES.len());

        let he = vocab.lookup_span(b"He").unwrap();
        let ll = vocab.lookup_span(b"ll").unwrap();
        let hell = vocab.lookup_span(b"Hell").unwrap();
        assert_eq!(vocab.lookup_pair(&(he, ll)), Some(hell));

        assert!(vocab.is_special(t(9)));
        assert!(!vocab.is_special(t(10)));
        assert_eq!(vocab.special_literal(t(3)), Some("[INST]"));
        assert_eq!(vocab.special_literal(t(10)), None);
        assert_eq!(vocab.span_bytes(t(3)), None);
        assert_eq!(vocab.span_bytes(hell), Some(b"Hell".as_slice()));

        assert_eq!(vocab.token_string(t(4)), Some("[/INST]".to_string()));
        assert_eq!(vocab.token_string(hell), Some("Hell".to_string()));
        assert_eq!(
            vocab.token_string(t(10 + 0xE4)),
            Some("<0xE4>".to_string())
        );

        let n = vocab.n_words();
        assert_eq!(vocab.check_token(t(n - 1)), Ok(n - 1));
        assert_eq!(
            vocab.check_token(t(n)),
            Err(PCError::InvalidTokenId {
                id: n as u64,
                n_words: n
            })
        );

        let strings = vocab.token_strings();
        assert_eq!(strings.len(), n);
        let unique: PCHashSet<&String> = strings.iter().collect();
        assert_eq!(unique.len(), n);
        assert!(strings.iter().all(|s| !s.is_empty()));
    }

    #[test]
    fn test_vocab_u16() {
        check_test_vocab::<u16>();
    }

    #[test]
    fn test_vocab_u32() {
        check_test_vocab::<u32>();
    }

    #[test]
    fn test_render_span_bytes() {
        assert_eq!(render_span_bytes(b"abc"), "abc");
        assert_eq!(render_span_bytes("東".as_bytes()), "東");
        assert_eq!(render_span_bytes(&[0xE6, 0x9D]), "<0xE6><0x9D>");
        assert_eq!(render_span_bytes(&[0x00]), "\0");
    }

    #[test]
    fn test_missing_byte_token() {
        let mut spans = byte_spans();
        spans.remove(0x41);
        let err = TokenVocab::<u32>::new(DEFAULT_PATTERN, default_special_literals(), spans)
            .unwrap_err();
        assert_eq!(
            err,
            PCError::ModelLoad("missing single-byte token <0x41>".to_string())
        );
    }

    #[test]
    fn test_missing_control_token() {
        let specials: Vec<String> = default_special_literals()
            .into_iter()
            .filter(|s| s != "[TOOL_CALLS]")
            .collect();
        let err = TokenVocab::<u32>::new(DEFAULT_PATTERN, specials, byte_spans()).unwrap_err();
        assert_eq!(
            err,
            PCError::ModelLoad("missing control token \"[TOOL_CALLS]\"".to_string())
        );
    }

    #[test]
    fn test_duplicates() {
        let mut specials = default_special_literals();
        specials.push("<s>".to_string());
        assert!(matches!(
            TokenVocab::<u32>::new(DEFAULT_PATTERN, specials, byte_spans()),
            Err(PCError::ModelLoad(_))
        ));

        let mut spans = byte_spans();
        spans.push(b"a".to_vec());
        assert!(matches!(
            TokenVocab::<u32>::new(DEFAULT_PATTERN, default_special_literals(), spans),
            Err(PCError::ModelLoad(_))
        ));

        // A span token that renders the same as a control literal.
        let mut spans = byte_spans();
        spans.push(b"[INST]".to_vec());
        assert!(matches!(
            TokenVocab::<u32>::new(DEFAULT_PATTERN, default_special_literals(), spans),
            Err(PCError::ModelLoad(_))
        ));
    }

    #[test]
    fn test_too_large_for_token_type() {
        let mut spans = byte_spans();
        // 10 specials + 256 bytes + 65_271 = 65_537 tokens; one more than u16 can address.
        spans.extend((0..65_271u32).map(|i| format!("#{i}").into_bytes()));

        assert!(matches!(
            TokenVocab::<u16>::new(DEFAULT_PATTERN, default_special_literals(), spans.clone()),
            Err(PCError::ModelLoad(_))
        ));
        assert!(TokenVocab::<u32>::new(DEFAULT_PATTERN, default_special_literals(), spans).is_ok());
    }

    #[test]
    fn test_unreachable_spans_still_load() {
        let mut spans = byte_spans();
        // "xyz" with no "xy" or "yz" merge below it.
        spans.push(b"xyz".to_vec());
        let vocab =
            TokenVocab::<u32>::new(DEFAULT_PATTERN, default_special_literals(), spans).unwrap();
        assert!(vocab.pairs().is_empty());
        assert_eq!(vocab.lookup_span(b"xyz"), Some(10 + 256));
    }
}
