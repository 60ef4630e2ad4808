//! Sandboxed plugin runs: discovery, isolation boundaries and the registry.

pub mod boundary;
pub mod manifest;
pub mod runtime;

pub use boundary::{IsolationBoundary, INIT_EXPORT, RUN_EXPORT};
pub use manifest::{PluginManifest, PluginManifestStore, PluginScan, SkippedPlugin, MANIFEST_FILE};
pub use runtime::{PluginHandleInfo, PluginRegistry, PluginRunReport, PluginRuntime, PluginStatus};
