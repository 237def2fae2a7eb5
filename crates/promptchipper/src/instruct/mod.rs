//! # Instruct Adapters
//!
//! An [`InstructAdapter`] renders an [`InstructRequest`] into control-token
//! delimited segments and encodes them with a shared [`crate::Tokenizer`].
//!
//! ## Template
//! * user: `[INST] {content} [/INST]`, preceded by
//!   `[AVAILABLE_TOOLS] {tools json} [/AVAILABLE_TOOLS]` on the last user
//!   turn when tools are offered; the system prompt is prefixed to the last
//!   user turn's content.
//! * assistant: `{content}`, or `[TOOL_CALLS] {calls json}`.
//! * tool: `[TOOL_RESULTS] {result json} [/TOOL_RESULTS]`.
//!
//! The sequence starts with `<s>`; see [`EosPolicy`] for `</s>`.

mod adapter;
mod instruct_tokenizer;
pub mod request;
mod tokenized;

#[doc(inline)]
pub use adapter::*;
#[doc(inline)]
pub use instruct_tokenizer::*;
#[doc(inline)]
pub use request::{
    AssistantMessage,
    ChatMessage,
    Function,
    FunctionCall,
    InstructRequest,
    SystemMessage,
    Tool,
    ToolCall,
    ToolMessage,
    ToolType,
    UserMessage,
};
#[doc(inline)]
pub use tokenized::*;
