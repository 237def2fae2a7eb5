//! # Error Types

/// Result type alias using [`PCError`].
pub type PCResult<T> = core::result::Result<T, PCError>;

/// Errors raised by tokenizers and instruct adapters.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PCError {
    /// The model artifact is missing, unreadable, or structurally invalid.
    #[error("model load error: {0}")]
    ModelLoad(String),

    /// A token id outside `[0, n_words)`.
    #[error("invalid token id {id}; vocabulary has {n_words} tokens")]
    InvalidTokenId {
        /// The offending id.
        id: u64,

        /// The vocabulary size.
        n_words: usize,
    },

    /// No control token has this literal form.
    #[error("unknown control token: {0:?}")]
    UnknownControlToken(String),

    /// The instruct request cannot be rendered.
    #[error("invalid instruct request: {0}")]
    InvalidRequest(String),
}

impl PCError {
    /// Build a [`PCError::ModelLoad`] from anything displayable.
    pub fn model_load<S: core::fmt::Display>(msg: S) -> Self {
        Self::ModelLoad(msg.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            PCError::InvalidTokenId { id: 12, n_words: 10 }.to_string(),
            "invalid token id 12; vocabulary has 10 tokens"
        );
        assert_eq!(
            PCError::UnknownControlToken("[FOO]".to_string()).to_string(),
            "unknown control token: \"[FOO]\""
        );
        assert_eq!(
            PCError::model_load("no such file").to_string(),
            "model load error: no such file"
        );
    }
}
