//! Test data builders for entities and installed plugin folders.
//!
//! Provides fluent API for creating test fixtures with sensible defaults.

use std::path::{Path, PathBuf};
use uuid::Uuid;

use starnet::models::{EntityDraft, EntityKind};
use starnet::plugins::MANIFEST_FILE;

/// Builder for entity drafts.
pub struct EntityBuilder {
    kind: EntityKind,
    name: String,
    description: String,
    owner_id: Uuid,
}

impl EntityBuilder {
    pub fn new(kind: EntityKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            description: String::new(),
            owner_id: Uuid::new_v4(),
        }
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    pub fn owner(mut self, owner_id: Uuid) -> Self {
        self.owner_id = owner_id;
        self
    }

    pub fn build(self) -> EntityDraft {
        EntityDraft {
            kind: self.kind,
            name: self.name,
            description: self.description,
            owner_id: self.owner_id,
        }
    }
}

/// A plugin that does nothing but succeed.
pub const NOOP_WAT: &str = r#"
(module
  (func (export "plugin_init") (param i64 i64) (result i32) (i32.const 0))
  (func (export "plugin_run") (result i32) (i32.const 0)))
"#;

/// Logs "fresh" on its first run in an instance and "reused" afterwards.
pub const COUNTER_WAT: &str = r#"
(module
  (import "env" "log" (func $log (param i32 i32)))
  (memory (export "memory") 1)
  (global $runs (mut i32) (i32.const 0))
  (data (i32.const 0) "fresh")
  (data (i32.const 16) "reused")
  (func (export "plugin_init") (param i64 i64) (result i32) (i32.const 0))
  (func (export "plugin_run") (result i32)
    (global.set $runs (i32.add (global.get $runs) (i32.const 1)))
    (if (i32.eq (global.get $runs) (i32.const 1))
      (then (call $log (i32.const 0) (i32.const 5)))
      (else (call $log (i32.const 16) (i32.const 6))))
    (i32.const 0)))
"#;

/// Logs the shared configuration it was given.
pub const CONFIG_ECHO_WAT: &str = r#"
(module
  (import "env" "log" (func $log (param i32 i32)))
  (import "env" "config_len" (func $config_len (result i32)))
  (import "env" "config_read" (func $config_read (param i32) (result i32)))
  (memory (export "memory") 1)
  (func (export "plugin_init") (param i64 i64) (result i32) (i32.const 0))
  (func (export "plugin_run") (result i32)
    (local $n i32)
    (local.set $n (call $config_read (i32.const 1024)))
    (if (i32.ne (local.get $n) (call $config_len))
      (then (return (i32.const 2))))
    (call $log (i32.const 1024) (local.get $n))
    (i32.const 0)))
"#;

/// Refuses to start for the nil caller.
pub const CALLER_CHECK_WAT: &str = r#"
(module
  (func (export "plugin_init") (param $hi i64) (param $lo i64) (result i32)
    (if (result i32) (i64.eqz (i64.or (local.get $hi) (local.get $lo)))
      (then (i32.const 1))
      (else (i32.const 0))))
  (func (export "plugin_run") (result i32) (i32.const 0)))
"#;

/// Never returns from run.
pub const SPIN_WAT: &str = r#"
(module
  (func (export "plugin_init") (param i64 i64) (result i32) (i32.const 0))
  (func (export "plugin_run") (result i32)
    (loop $forever (br $forever))
    (i32.const 0)))
"#;

/// Exports something, but not the plugin contract.
pub const HELPER_WAT: &str = r#"
(module
  (func (export "helper") (result i32) (i32.const 7)))
"#;

/// Builder for an installed plugin folder.
pub struct PluginFolderBuilder {
    folder: String,
    manifest: Option<serde_json::Value>,
    modules: Vec<(String, String)>,
}

impl PluginFolderBuilder {
    /// A folder whose manifest names the plugin `name`, version 1.0.0.
    pub fn new(name: &str) -> Self {
        Self {
            folder: name.to_lowercase(),
            manifest: Some(serde_json::json!({ "Name": name, "Version": "1.0.0" })),
            modules: Vec::new(),
        }
    }

    pub fn folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = folder.into();
        self
    }

    pub fn version(mut self, version: &str) -> Self {
        if let Some(m) = self.manifest.as_mut() {
            m["Version"] = serde_json::json!(version);
        }
        self
    }

    pub fn entry_point(mut self, stem: &str) -> Self {
        if let Some(m) = self.manifest.as_mut() {
            m["EntryPoint"] = serde_json::json!(stem);
        }
        self
    }

    pub fn output_path(mut self, path: &str) -> Self {
        if let Some(m) = self.manifest.as_mut() {
            m["CompiledOutputPath"] = serde_json::json!(path);
        }
        self
    }

    /// Leave the manifest file out.
    pub fn without_manifest(mut self) -> Self {
        self.manifest = None;
        self
    }

    /// Add a module at `relative_path` (relative to the output path).
    pub fn module(mut self, relative_path: &str, wat: &str) -> Self {
        self.modules.push((relative_path.to_string(), wat.to_string()));
        self
    }

    /// Write the folder under `root`; returns its path.
    pub fn write(self, root: &Path) -> PathBuf {
        let dir = root.join(&self.folder);
        std::fs::create_dir_all(&dir).expect("Failed to create plugin folder");

        let output_dir = match self
            .manifest
            .as_ref()
            .and_then(|m| m.get("CompiledOutputPath"))
            .and_then(|p| p.as_str())
        {
            Some(p) => dir.join(p),
            None => dir.clone(),
        };

        if let Some(manifest) = &self.manifest {
            std::fs::write(
                dir.join(MANIFEST_FILE),
                serde_json::to_string_pretty(manifest).expect("manifest json"),
            )
            .expect("Failed to write manifest");
        }

        for (relative, wat) in &self.modules {
            let path = output_dir.join(relative);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).expect("Failed to create module directory");
            }
            std::fs::write(path, wat).expect("Failed to write module");
        }

        dir
    }
}
