//! Shared domain types for Ember
//!
//! Holds the tool registry, task descriptors, and the text-generation seam
//! that the recommendation and provider crates build on. Everything here is
//! passed to consumers explicitly at construction; there are no process-wide
//! singletons.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod model;
pub mod task;
pub mod tool;

pub use model::{ModelError, TextModel};
pub use task::Task;
pub use tool::{Tool, ToolRegistry, ToolSelection};
