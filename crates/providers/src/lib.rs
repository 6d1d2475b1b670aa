//! LLM Provider implementations for the Jamespot agent.
//!
//! All providers implement the `jamespot_core::Provider` trait.
//! [`factory::build_provider`] selects and validates one from configuration.

pub mod anthropic;
pub mod factory;
pub mod openai_compat;
pub mod retry;
mod sse;

pub use anthropic::AnthropicProvider;
pub use factory::{build_provider, describe, resolve_model};
pub use openai_compat::OpenAiCompatProvider;
pub use retry::RetryProvider;
