//! Building a parent's dependency graph during creation.

pub mod builder;
pub mod stack;

pub use builder::{DependencyGraphBuilder, DependencySource, ParentRef};
pub use stack::{TaskFrame, TaskStack, DEFAULT_MAX_DEPTH};
