#![allow(dead_code)]

pub mod builders;
pub mod harness;
pub mod interaction;

// Re-export commonly used test utilities
pub use harness::{CountingProvider, TestHarness};
pub use interaction::{Answer, RecordingRenderer, Rendered, ScriptedPrompter};
