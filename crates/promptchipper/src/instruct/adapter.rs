//! # Instruct Adapter

use core::fmt::{Debug, Formatter};
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::errors::{PCError, PCResult};
use crate::instruct::instruct_tokenizer::InstructTokenizer;
use crate::instruct::request::{AssistantMessage, ChatMessage, InstructRequest, ToolCall, ToolMessage};
use crate::instruct::tokenized::Tokenized;
use crate::tokenizer::{BpeTokenizer, Tokenizer};
use crate::types::TokenType;
use crate::vocab::SpecialTokens;

/// When to close assistant turns with `</s>`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EosPolicy {
    /// Only after the last message, and only when it is an assistant turn.
    ///
    /// Requests ending on a user or tool turn are generation prompts.
    #[default]
    FinalAssistant,

    /// After every assistant turn.
    EveryAssistantTurn,

    /// Never.
    Never,
}

/// Options for an [`InstructAdapter`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct InstructOptions {
    /// See [`EosPolicy`].
    pub eos_policy: EosPolicy,

    /// Render [`Tokenized::text`].
    pub render_text: bool,
}

impl Default for InstructOptions {
    fn default() -> Self {
        Self {
            eos_policy: EosPolicy::default(),
            render_text: true,
        }
    }
}

impl InstructOptions {
    /// Set the eos policy.
    pub fn with_eos_policy(
        self,
        eos_policy: EosPolicy,
    ) -> Self {
        Self { eos_policy, ..self }
    }

    /// Set whether to render text.
    pub fn with_render_text(
        self,
        render_text: bool,
    ) -> Self {
        Self {
            render_text,
            ..self
        }
    }
}

#[derive(Serialize)]
struct RenderedToolCall<'a> {
    name: &'a str,
    arguments: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
}

impl<'a> From<&'a ToolCall> for RenderedToolCall<'a> {
    fn from(call: &'a ToolCall) -> Self {
        // Arguments given as a JSON string render as the parsed value.
        let arguments = match &call.function.arguments {
            Value::String(s) => serde_json::from_str(s).unwrap_or_else(|_| Value::String(s.clone())),
            other => other.clone(),
        };
        Self {
            name: &call.function.name,
            arguments,
            id: call.id.as_deref(),
        }
    }
}

#[derive(Serialize)]
struct RenderedToolResult<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    call_id: Option<&'a str>,
    name: &'a str,
    content: &'a str,
}

impl<'a> From<&'a ToolMessage> for RenderedToolResult<'a> {
    fn from(message: &'a ToolMessage) -> Self {
        Self {
            call_id: message.tool_call_id.as_deref(),
            name: &message.name,
            content: &message.content,
        }
    }
}

fn to_json<S: Serialize + ?Sized>(value: &S) -> PCResult<String> {
    serde_json::to_string(value).map_err(|e| PCError::InvalidRequest(e.to_string()))
}

/// An [`InstructTokenizer`] over a shared [`Tokenizer`] engine.
///
/// Many adapters may share one engine; the adapter adds no state beyond
/// its [`InstructOptions`].
#[derive(Clone)]
pub struct InstructAdapter<T: TokenType> {
    tokenizer: Arc<dyn Tokenizer<T>>,
    options: InstructOptions,
}

impl<T: TokenType> Debug for InstructAdapter<T> {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> core::fmt::Result {
        f.debug_struct("InstructAdapter")
            .field("n_words", &self.tokenizer.n_words())
            .field("options", &self.options)
            .finish()
    }
}

impl<T: TokenType> InstructAdapter<T> {
    /// Build an adapter over a shared engine, with default options.
    pub fn new(tokenizer: Arc<dyn Tokenizer<T>>) -> Self {
        Self {
            tokenizer,
            options: InstructOptions::default(),
        }
    }

    /// Build an adapter over a [`BpeTokenizer`] loaded from a model artifact.
    ///
    /// ## Returns
    /// The adapter; or [`PCError::ModelLoad`] if the artifact is missing or malformed.
    pub fn from_model_path<P: AsRef<Path>>(path: P) -> PCResult<Self> {
        let tokenizer = BpeTokenizer::<T>::from_path(path)?;
        Ok(Self::new(Arc::new(tokenizer)))
    }

    /// Replace the options.
    pub fn with_options(
        self,
        options: InstructOptions,
    ) -> Self {
        Self { options, ..self }
    }

    /// The options.
    pub fn options(&self) -> &InstructOptions {
        &self.options
    }

    /// The shared engine.
    pub fn shared_tokenizer(&self) -> Arc<dyn Tokenizer<T>> {
        self.tokenizer.clone()
    }

    fn push_control(
        &self,
        tokens: &mut Vec<T>,
        token: SpecialTokens,
    ) -> PCResult<()> {
        tokens.push(self.tokenizer.get_control_token(token.literal())?);
        Ok(())
    }

    fn push_text(
        &self,
        tokens: &mut Vec<T>,
        text: &str,
    ) -> PCResult<()> {
        tokens.extend(self.tokenizer.encode(text, false, false)?);
        Ok(())
    }

    /// The system prompt and system message contents, joined.
    fn system_text(request: &InstructRequest) -> Option<String> {
        let parts: Vec<&str> = request
            .system_prompt
            .iter()
            .map(String::as_str)
            .chain(request.messages.iter().filter_map(|m| match m {
                ChatMessage::System(s) => Some(s.content.as_str()),
                _ => None,
            }))
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join("\n\n"))
        }
    }

    fn push_assistant(
        &self,
        tokens: &mut Vec<T>,
        message: &AssistantMessage,
    ) -> PCResult<()> {
        match (&message.content, message.tool_calls.as_slice()) {
            (Some(content), []) => self.push_text(tokens, content),
            (None, calls) if !calls.is_empty() => {
                let calls: Vec<RenderedToolCall> = calls.iter().map(Into::into).collect();
                self.push_control(tokens, SpecialTokens::ToolCalls)?;
                self.push_text(tokens, &to_json(&calls)?)
            }
            (Some(_), _) => Err(PCError::InvalidRequest(
                "assistant message has both content and tool calls".to_string(),
            )),
            (None, _) => Err(PCError::InvalidRequest(
                "assistant message has neither content nor tool calls".to_string(),
            )),
        }
    }
}

impl<T: TokenType> InstructTokenizer for InstructAdapter<T> {
    type Token = T;
    type Request = InstructRequest;
    type Output = Tokenized<T>;

    fn tokenizer(&self) -> &dyn Tokenizer<T> {
        self.tokenizer.as_ref()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, request)))]
    fn encode_instruct(
        &self,
        request: &InstructRequest,
    ) -> PCResult<Tokenized<T>> {
        let messages = &request.messages;
        let system = Self::system_text(request);
        let last_user = messages
            .iter()
            .rposition(|m| matches!(m, ChatMessage::User(_)));

        if system.is_some() && last_user.is_none() {
            return Err(PCError::InvalidRequest(
                "system prompt with no user message".to_string(),
            ));
        }

        let mut tokens = vec![self.tokenizer.bos_id()];

        for (idx, message) in messages.iter().enumerate() {
            match message {
                ChatMessage::System(_) => (),
                ChatMessage::User(user) => {
                    let is_last_user = Some(idx) == last_user;

                    if is_last_user && !request.available_tools.is_empty() {
                        self.push_control(&mut tokens, SpecialTokens::BeginTools)?;
                        self.push_text(&mut tokens, &to_json(&request.available_tools)?)?;
                        self.push_control(&mut tokens, SpecialTokens::EndTools)?;
                    }

                    self.push_control(&mut tokens, SpecialTokens::BeginInst)?;
                    match (&system, is_last_user) {
                        (Some(system), true) => self.push_text(
                            &mut tokens,
                            &format!("{system}\n\n{}", user.content),
                        )?,
                        _ => self.push_text(&mut tokens, &user.content)?,
                    }
                    self.push_control(&mut tokens, SpecialTokens::EndInst)?;
                }
                ChatMessage::Assistant(assistant) => {
                    self.push_assistant(&mut tokens, assistant)?;

                    let close = match self.options.eos_policy {
                        EosPolicy::FinalAssistant => idx + 1 == messages.len(),
                        EosPolicy::EveryAssistantTurn => true,
                        EosPolicy::Never => false,
                    };
                    if close {
                        tokens.push(self.tokenizer.eos_id());
                    }
                }
                ChatMessage::Tool(result) => {
                    self.push_control(&mut tokens, SpecialTokens::BeginToolResults)?;
                    self.push_text(&mut tokens, &to_json(&RenderedToolResult::from(result))?)?;
                    self.push_control(&mut tokens, SpecialTokens::EndToolResults)?;
                }
            }
        }

        let text = if self.options.render_text {
            Some(self.tokenizer.to_string(&tokens)?)
        } else {
            None
        };

        Ok(Tokenized { tokens, text })
    }
}
