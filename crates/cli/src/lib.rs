//! Terminal front end for the Jamespot assistant.
//!
//! [`startup::Session`] turns configuration into a logged-in agent;
//! [`driver::Driver`] runs the conversation in one of the [`driver::Mode`]s.

pub mod driver;
pub mod startup;

pub use driver::{Driver, Mode};
pub use startup::Session;
