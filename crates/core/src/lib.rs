//! # Jamespot Core
//!
//! Domain types, traits, and error definitions shared by every crate of the
//! Jamespot agent. Nothing in here performs I/O: the backend client, the LLM
//! providers and the tools all implement traits declared here.
//!
//! ## Layout
//!
//! - [`message`]: the transcript and its messages
//! - [`provider`]: the chat-completion abstraction
//! - [`tool`]: tool descriptors and the ordered registry
//! - [`backend`]: the backend session contract and its result envelope

pub mod backend;
pub mod error;
pub mod message;
pub mod provider;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use backend::{BackendClient, Envelope, UserProfile};
pub use error::{AgentError, BackendError, Error, ProviderError, Result, ToolError};
pub use message::{Conversation, ConversationId, Message, MessageToolCall, Role};
pub use provider::{ChunkMode, ChunkReceiver, Provider, ProviderRequest, ProviderResponse, StreamChunk, ToolDefinition, Usage};
pub use tool::{Tool, ToolCall, ToolRegistry, ToolResult};
