//! Jamespot tools exposed to the LLM.
//!
//! Every tool wraps one platform capability (groups, articles, files,
//! messenger, calendar objects...) behind a JSON-schema typed interface.
//! Tools never fail the agent loop: backend, transport and argument errors
//! all come back as `Error: <message>` text for the model to read.
//!
//! [`catalog::build_catalog`] signs in once and assembles every group, in a
//! fixed order, into a single [`ToolRegistry`](jamespot_core::ToolRegistry).

pub mod applications;
pub mod backend_tool;
pub mod calendar;
pub mod catalog;
pub mod content;
pub mod datetime;
pub mod files;
pub mod groups;
pub mod image_search;
pub mod messenger;
pub mod network;
pub mod support;
pub mod users;

#[cfg(test)]
pub(crate) mod testing;

pub use backend_tool::BackendTool;
pub use catalog::{build_catalog, build_registry, Catalog, CatalogOptions};
pub use image_search::UnsplashClient;
pub use support::ToolContext;
