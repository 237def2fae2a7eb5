//! # Control Tokens
//!
//! The literal forms of the control tokens are fixed, externally-agreed
//! strings; models which use them must reproduce them bit-exactly.

use strum_macros::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

/// The fixed control tokens, in their conventional id order.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, AsRefStr, Display, EnumIter, EnumString, IntoStaticStr,
)]
pub enum SpecialTokens {
    /// Unknown token.
    #[strum(serialize = "<unk>")]
    Unk,

    /// Beginning of sequence.
    #[strum(serialize = "<s>")]
    Bos,

    /// End of sequence.
    #[strum(serialize = "</s>")]
    Eos,

    /// Opens a user instruction.
    #[strum(serialize = "[INST]")]
    BeginInst,

    /// Closes a user instruction.
    #[strum(serialize = "[/INST]")]
    EndInst,

    /// Opens the available tool definitions.
    #[strum(serialize = "[AVAILABLE_TOOLS]")]
    BeginTools,

    /// Closes the available tool definitions.
    #[strum(serialize = "[/AVAILABLE_TOOLS]")]
    EndTools,

    /// Opens a tool result.
    #[strum(serialize = "[TOOL_RESULTS]")]
    BeginToolResults,

    /// Closes a tool result.
    #[strum(serialize = "[/TOOL_RESULTS]")]
    EndToolResults,

    /// Marks assistant tool calls.
    #[strum(serialize = "[TOOL_CALLS]")]
    ToolCalls,
}

impl SpecialTokens {
    /// The control tokens every loaded model must provide.
    pub const REQUIRED: [SpecialTokens; 9] = [
        SpecialTokens::Bos,
        SpecialTokens::Eos,
        SpecialTokens::BeginInst,
        SpecialTokens::EndInst,
        SpecialTokens::BeginTools,
        SpecialTokens::EndTools,
        SpecialTokens::BeginToolResults,
        SpecialTokens::EndToolResults,
        SpecialTokens::ToolCalls,
    ];

    /// The literal form of the token.
    pub fn literal(self) -> &'static str {
        self.into()
    }
}

/// The default special token table, in id order.
pub fn default_special_literals() -> Vec<String> {
    use strum::IntoEnumIterator;

    SpecialTokens::iter().map(|t| t.literal().to_string()).collect()
}
