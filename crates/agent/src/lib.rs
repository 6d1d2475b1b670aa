//! The agent loop of the Jamespot assistant.
//!
//! One user turn runs as a small state machine:
//!
//! 1. **Awaiting LLM**: send the whole transcript plus the tool catalog
//! 2. **Executing tools**: run every requested call in order, append the
//!    results, go back to 1
//! 3. **Done**: the LLM answered with text only
//! 4. **Aborted**: the provider failed or the roundtrip ceiling was hit
//!
//! The transcript is borrowed for the duration of the turn and everything
//! appended to it stays there, whatever the outcome.

pub mod loop_runner;
pub mod stream_event;

#[cfg(test)]
mod testing;

pub use loop_runner::{AgentLoop, TurnOutcome, DEFAULT_MAX_ROUNDTRIPS};
pub use stream_event::{AgentStreamEvent, StreamMerger};
