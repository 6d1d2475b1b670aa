//! HTTP client for the Jamespot platform.
//!
//! [`JamespotClient`] implements [`jamespot_core::BackendClient`] on top of
//! `reqwest`. The session cookie handed out at sign-in is kept in a
//! [`SessionCookie`] cell and replayed on every request.

pub mod client;
pub mod cookie;

pub use client::JamespotClient;
pub use cookie::SessionCookie;
