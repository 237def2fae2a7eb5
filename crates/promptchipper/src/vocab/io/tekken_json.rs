//! # JSON Model Files
//!
//! ```json
//! {
//!   "config": { "pattern": "...", "default_vocab_size": 131072, "default_num_special_tokens": 1000 },
//!   "vocab": [{ "rank": 0, "token_bytes": "AA==", "token_str": "\u0000" }],
//!   "special_tokens": [{ "rank": 0, "token_str": "<unk>", "is_control": true }]
//! }
//! ```
//!
//! Special tokens take the ids equal to their ranks. When
//! `default_num_special_tokens` exceeds the listed specials, the unlisted
//! ranks are filled with `<SPECIAL_{rank}>` placeholders. When
//! `default_vocab_size` is set, the span vocabulary is truncated so the total
//! vocabulary has exactly that many tokens.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::errors::{PCError, PCResult};
use crate::types::{TokenType, token_from_usize};
use crate::vocab::token_vocab::{DEFAULT_PATTERN, TokenVocab};

/// The `config` section of a [`TekkenModelFile`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TekkenConfig {
    /// The pre-tokenization pattern.
    #[serde(default = "default_pattern")]
    pub pattern: String,

    /// The number of entries in `vocab`, if recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_vocab_tokens: Option<usize>,

    /// The total vocabulary size (special + span tokens) to load.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_vocab_size: Option<usize>,

    /// The number of special token ids.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_num_special_tokens: Option<usize>,
}

/// The largest `default_num_special_tokens` a model file may declare.
pub const MAX_NUM_SPECIAL_TOKENS: usize = 1 << 16;

fn default_pattern() -> String {
    DEFAULT_PATTERN.to_string()
}

/// A ranked span token entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TekkenSpanEntry {
    /// The rank of the span.
    pub rank: usize,

    /// The base64 encoded span bytes.
    pub token_bytes: String,

    /// The UTF-8 text of the span, when it has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_str: Option<String>,
}

/// A ranked special token entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TekkenSpecialEntry {
    /// The rank (and id) of the token.
    pub rank: usize,

    /// The literal form of the token.
    pub token_str: String,

    /// Is this a control token.
    #[serde(default = "default_is_control")]
    pub is_control: bool,
}

fn default_is_control() -> bool {
    true
}

/// A JSON model file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TekkenModelFile {
    /// Model configuration.
    pub config: TekkenConfig,

    /// Ranked span tokens.
    pub vocab: Vec<TekkenSpanEntry>,

    /// Ranked special tokens.
    #[serde(default)]
    pub special_tokens: Vec<TekkenSpecialEntry>,
}

/// Load a [`TekkenModelFile`] from a path.
pub fn load_tekken_json_path<P: AsRef<Path>>(path: P) -> PCResult<TekkenModelFile> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| PCError::ModelLoad(format!("{}: {e}", path.display())))?;

    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| PCError::ModelLoad(format!("{}: {e}", path.display())))
}

impl TekkenModelFile {
    /// Build a model file describing a vocabulary.
    pub fn from_vocab<T: TokenType>(vocab: &TokenVocab<T>) -> Self {
        let special_tokens = vocab
            .special_literals()
            .iter()
            .enumerate()
            .map(|(rank, literal)| TekkenSpecialEntry {
                rank,
                token_str: literal.clone(),
                is_control: true,
            })
            .collect::<Vec<_>>();

        let spans = vocab
            .span_tokens()
            .iter()
            .enumerate()
            .map(|(rank, span)| TekkenSpanEntry {
                rank,
                token_bytes: STANDARD.encode(span),
                token_str: core::str::from_utf8(span).ok().map(str::to_string),
            })
            .collect::<Vec<_>>();

        Self {
            config: TekkenConfig {
                pattern: vocab.pattern().to_string(),
                num_vocab_tokens: Some(spans.len()),
                default_vocab_size: Some(vocab.n_words()),
                default_num_special_tokens: Some(special_tokens.len()),
            },
            vocab: spans,
            special_tokens,
        }
    }

    /// Write the model file as JSON.
    pub fn save_path<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> std::io::Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(&mut writer, self)?;
        writer.flush()
    }

    /// The special token literals, in id order.
    ///
    /// Fails when the declared special count exceeds [`MAX_NUM_SPECIAL_TOKENS`]
    /// or leaves no room for span ids in `T`.
    pub fn special_literals<T: TokenType>(&self) -> PCResult<Vec<String>> {
        let num_special = self
            .config
            .default_num_special_tokens
            .unwrap_or(self.special_tokens.len());

        if num_special > MAX_NUM_SPECIAL_TOKENS || token_from_usize::<T>(num_special).is_none() {
            return Err(PCError::ModelLoad(format!(
                "default_num_special_tokens {num_special} is out of range"
            )));
        }

        let mut literals: Vec<Option<String>> = vec![None; num_special];
        for entry in &self.special_tokens {
            let slot = literals.get_mut(entry.rank).ok_or_else(|| {
                PCError::ModelLoad(format!(
                    "special token {:?} has rank {} >= {num_special}",
                    entry.token_str, entry.rank
                ))
            })?;
            if slot.replace(entry.token_str.clone()).is_some() {
                return Err(PCError::ModelLoad(format!(
                    "duplicate special token rank {}",
                    entry.rank
                )));
            }
        }

        Ok(literals
            .into_iter()
            .enumerate()
            .map(|(rank, literal)| literal.unwrap_or_else(|| format!("<SPECIAL_{rank}>")))
            .collect())
    }

    /// The span token bytes, in rank order, truncated to the configured size.
    pub fn span_tokens(
        &self,
        num_special: usize,
    ) -> PCResult<Vec<Vec<u8>>> {
        if let Some(n) = self.config.num_vocab_tokens {
            if n != self.vocab.len() {
                return Err(PCError::ModelLoad(format!(
                    "num_vocab_tokens is {n}, but {} entries are present",
                    self.vocab.len()
                )));
            }
        }

        let mut ranked: Vec<Option<Vec<u8>>> = vec![None; self.vocab.len()];
        for entry in &self.vocab {
            let bytes = STANDARD.decode(&entry.token_bytes).map_err(|e| {
                PCError::ModelLoad(format!("span token rank {}: {e}", entry.rank))
            })?;
            let slot = ranked.get_mut(entry.rank).ok_or_else(|| {
                PCError::ModelLoad(format!("span token rank {} is out of range", entry.rank))
            })?;
            if slot.replace(bytes).is_some() {
                return Err(PCError::ModelLoad(format!(
                    "duplicate span token rank {}",
                    entry.rank
                )));
            }
        }

        let mut spans = ranked
            .into_iter()
            .enumerate()
            .map(|(rank, span)| {
                span.ok_or_else(|| PCError::ModelLoad(format!("missing span token rank {rank}")))
            })
            .collect::<PCResult<Vec<_>>>()?;

        if let Some(total) = self.config.default_vocab_size {
            let keep = total.checked_sub(num_special).ok_or_else(|| {
                PCError::ModelLoad(format!(
                    "default_vocab_size {total} is smaller than the {num_special} special tokens"
                ))
            })?;
            if keep > spans.len() {
                return Err(PCError::ModelLoad(format!(
                    "default_vocab_size {total} needs {keep} span tokens; {} are present",
                    spans.len()
                )));
            }
            spans.truncate(keep);
        }

        Ok(spans)
    }

    /// Build the [`TokenVocab`] this file describes.
    pub fn into_vocab<T: TokenType>(self) -> PCResult<TokenVocab<T>> {
        let specials = self.special_literals::<T>()?;
        let spans = self.span_tokens(specials.len())?;
        TokenVocab::new(self.config.pattern, specials, spans)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::vocab::testing::build_test_vocab;

    fn byte_entries() -> Vec<serde_json::Value> {
        (0..=255u8)
            .map(|b| json!({ "rank": b, "token_bytes": STANDARD.encode([b]) }))
            .collect()
    }

    fn control_entries() -> Vec<serde_json::Value> {
        crate::vocab::default_special_literals()
            .into_iter()
            .enumerate()
            .map(|(rank, s)| json!({ "rank": rank, "token_str": s, "is_control": true }))
            .collect()
    }

    #[test]
    fn test_from_vocab_round_trip() {
        let vocab = build_test_vocab::<u32>();
        let file = TekkenModelFile::from_vocab(&vocab);

        let text = serde_json::to_string(&file).unwrap();
        let parsed: TekkenModelFile = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, file);

        let rebuilt: TokenVocab<u32> = parsed.into_vocab().unwrap();
        assert_eq!(rebuilt.token_strings(), vocab.token_strings());
    }

    #[test]
    fn test_placeholder_specials_and_truncation() {
        let mut vocab = byte_entries();
        vocab.push(json!({ "rank": 256, "token_bytes": STANDARD.encode(b"ab"), "token_str": "ab" }));
        vocab.push(json!({ "rank": 257, "token_bytes": STANDARD.encode(b"cd"), "token_str": "cd" }));

        let doc = json!({
            "config": {
                "pattern": r"\w+|\s+",
                "num_vocab_tokens": 258,
                "default_vocab_size": 20 + 257,
                "default_num_special_tokens": 20,
                "version": "v3",
            },
            "vocab": vocab,
            "special_tokens": control_entries(),
        });

        let file: TekkenModelFile = serde_json::from_value(doc).unwrap();
        let vocab: TokenVocab<u32> = file.into_vocab().unwrap();

        assert_eq!(vocab.num_special_tokens(), 20);
        assert_eq!(vocab.n_words(), 277);
        assert_eq!(vocab.special_literal(12), Some("<SPECIAL_12>"));
        assert_eq!(vocab.lookup_span(b"ab"), Some(20 + 256));
        assert_eq!(vocab.lookup_span(b"cd"), None);
        assert_eq!(vocab.pattern(), r"\w+|\s+");
    }

    #[test]
    fn test_special_count_exceeds_token_type() {
        let doc = json!({
            "config": { "default_num_special_tokens": 65_536 },
            "vocab": byte_entries(),
            "special_tokens": control_entries(),
        });
        let file: TekkenModelFile = serde_json::from_value(doc).unwrap();

        assert!(matches!(
            file.special_literals::<u16>(),
            Err(PCError::ModelLoad(msg)) if msg.contains("65536")
        ));
        assert_eq!(file.special_literals::<u32>().unwrap().len(), 65_536);
    }

    #[test]
    fn test_default_pattern() {
        let doc = json!({
            "config": {},
            "vocab": byte_entries(),
            "special_tokens": control_entries(),
        });
        let file: TekkenModelFile = serde_json::from_value(doc).unwrap();
        assert_eq!(file.config.pattern, DEFAULT_PATTERN);
        assert!(file.into_vocab::<u16>().is_ok());
    }

    #[test]
    fn test_invalid_files() {
        let with = |config: serde_json::Value, vocab: Vec<serde_json::Value>, specials: Vec<serde_json::Value>| {
            let doc = json!({ "config": config, "vocab": vocab, "special_tokens": specials });
            serde_json::from_value::<TekkenModelFile>(doc)
                .unwrap()
                .into_vocab::<u32>()
        };

        // Special rank beyond the declared special count.
        let err = with(
            json!({ "default_num_special_tokens": 5 }),
            byte_entries(),
            control_entries(),
        )
        .unwrap_err();
        assert!(matches!(err, PCError::ModelLoad(msg) if msg.contains(">= 5")));

        // Missing span rank.
        let mut vocab = byte_entries();
        vocab.push(json!({ "rank": 300, "token_bytes": "YWI=" }));
        assert!(matches!(
            with(json!({}), vocab, control_entries()),
            Err(PCError::ModelLoad(_))
        ));

        // Bad base64.
        let mut vocab = byte_entries();
        vocab.push(json!({ "rank": 256, "token_bytes": "***" }));
        assert!(matches!(
            with(json!({}), vocab, control_entries()),
            Err(PCError::ModelLoad(_))
        ));

        // Vocab size larger than what is present.
        assert!(matches!(
            with(json!({ "default_vocab_size": 100_000 }), byte_entries(), control_entries()),
            Err(PCError::ModelLoad(_))
        ));

        // Mismatched entry count.
        assert!(matches!(
            with(json!({ "num_vocab_tokens": 3 }), byte_entries(), control_entries()),
            Err(PCError::ModelLoad(_))
        ));

        // Special counts that cannot be allocated or addressed.
        for num_special in [usize::MAX, 1 << 40, MAX_NUM_SPECIAL_TOKENS + 1] {
            let err = with(
                json!({ "default_num_special_tokens": num_special }),
                byte_entries(),
                control_entries(),
            )
            .unwrap_err();
            assert_eq!(
                err,
                PCError::ModelLoad(format!(
                    "default_num_special_tokens {num_special} is out of range"
                ))
            );
        }

        // No control tokens.
        assert!(matches!(
            with(json!({}), byte_entries(), vec![]),
            Err(PCError::ModelLoad(_))
        ));
    }
}
