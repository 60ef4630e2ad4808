//! Plugin registry and the load/run/unload lifecycle.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{info, warn};
use uuid::Uuid;
use wasmtime::{Config, Engine};

use super::boundary::IsolationBoundary;
use super::manifest::PluginManifest;
use crate::outcome::OpResult;
use crate::StarError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PluginStatus {
    /// Name reserved, boundary being built.
    Loading,
    Loaded,
    Running,
    Unloaded,
}

struct PluginHandle {
    version: String,
    status: PluginStatus,
    boundary: Option<IsolationBoundary>,
    loaded_at: DateTime<Utc>,
    generation: u64,
}

/// Read-only view of a registry entry.
#[derive(Debug, Clone, Serialize)]
pub struct PluginHandleInfo {
    pub name: String,
    pub version: String,
    pub status: PluginStatus,
    pub loaded_at: DateTime<Utc>,
    pub generation: u64,
}

/// Loaded plugins keyed by name. A name holds at most one live handle.
#[derive(Default)]
pub struct PluginRegistry {
    handles: Mutex<HashMap<String, PluginHandle>>,
    generations: AtomicU64,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `name` before loading. Fails if another load holds it.
    fn reserve(&self, name: &str, version: &str) -> Result<u64, StarError> {
        let mut handles = self.handles.lock();
        if handles
            .get(name)
            .is_some_and(|h| h.status != PluginStatus::Unloaded)
        {
            return Err(StarError::DuplicateLoad(name.to_string()));
        }

        let generation = self.generations.fetch_add(1, Ordering::SeqCst) + 1;
        handles.insert(
            name.to_string(),
            PluginHandle {
                version: version.to_string(),
                status: PluginStatus::Loading,
                boundary: None,
                loaded_at: Utc::now(),
                generation,
            },
        );
        Ok(generation)
    }

    fn set_status(&self, name: &str, generation: u64, status: PluginStatus) {
        if let Some(handle) = self.handles.lock().get_mut(name) {
            if handle.generation == generation {
                handle.status = status;
            }
        }
    }

    fn attach(&self, name: &str, generation: u64, boundary: IsolationBoundary) {
        if let Some(handle) = self.handles.lock().get_mut(name) {
            if handle.generation == generation {
                handle.boundary = Some(boundary);
                handle.status = PluginStatus::Loaded;
            }
        }
    }

    /// Drop a reservation that never reached `Loaded`.
    fn release(&self, name: &str, generation: u64) {
        let mut handles = self.handles.lock();
        if handles.get(name).is_some_and(|h| h.generation == generation) {
            handles.remove(name);
        }
    }

    fn remove(&self, name: &str) -> Option<PluginHandle> {
        self.handles.lock().remove(name)
    }

    pub fn status(&self, name: &str) -> Option<PluginStatus> {
        self.handles.lock().get(name).map(|h| h.status)
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.status(name) == Some(PluginStatus::Loaded)
    }

    pub fn len(&self) -> usize {
        self.handles.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.lock().is_empty()
    }

    /// Registered handles sorted by name.
    pub fn handles(&self) -> Vec<PluginHandleInfo> {
        let handles = self.handles.lock();
        let mut infos: Vec<_> = handles
            .iter()
            .map(|(name, h)| PluginHandleInfo {
                name: name.clone(),
                version: h.version.clone(),
                status: h.status,
                loaded_at: h.loaded_at,
                generation: h.generation,
            })
            .collect();
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        infos
    }
}

/// What a successful run produced.
#[derive(Debug, Clone, Serialize)]
pub struct PluginRunReport {
    pub name: String,
    pub version: String,
    pub entry_module: String,
    pub exit_code: i32,
    pub output: Vec<String>,
    pub generation: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuel_consumed: Option<u64>,
}

/// Builds boundaries and drives plugins through a registry.
pub struct PluginRuntime {
    engine: Engine,
    fuel: Option<u64>,
}

impl PluginRuntime {
    /// `fuel` bounds the instructions of one init+run cycle; `None` is unbounded.
    pub fn new(fuel: Option<u64>) -> Result<Self, StarError> {
        let mut config = Config::new();
        config.consume_fuel(fuel.is_some());
        let engine = Engine::new(&config)?;
        Ok(Self { engine, fuel })
    }

    /// Load `manifest` into a fresh boundary, run its entry module and keep it registered.
    ///
    /// Refused with `DuplicateLoad` while a handle for the same name is live.
    /// Any failure after the name was reserved releases the reservation.
    pub fn load_and_run(
        &self,
        registry: &PluginRegistry,
        manifest: &PluginManifest,
        caller_id: Uuid,
        config: &serde_json::Value,
    ) -> OpResult<PluginRunReport> {
        let generation = match registry.reserve(&manifest.name, &manifest.version) {
            Ok(generation) => generation,
            Err(e) => {
                warn!(plugin = %manifest.name, "plugin already loaded");
                return OpResult::error(&e);
            }
        };

        match self.start(registry, manifest, caller_id, config, generation) {
            Ok((report, boundary)) => {
                registry.attach(&manifest.name, generation, boundary);
                info!(
                    plugin = %manifest.name,
                    version = %manifest.version,
                    generation,
                    exit_code = report.exit_code,
                    "plugin run complete"
                );
                let message = format!("Plugin '{}' ran successfully", manifest.name);
                OpResult::ok(report).with_message(message)
            }
            Err(e) => {
                registry.release(&manifest.name, generation);
                warn!(plugin = %manifest.name, error = %e, "plugin load/run failed");
                OpResult::error(&e)
            }
        }
    }

    fn start(
        &self,
        registry: &PluginRegistry,
        manifest: &PluginManifest,
        caller_id: Uuid,
        config: &serde_json::Value,
        generation: u64,
    ) -> Result<(PluginRunReport, IsolationBoundary), StarError> {
        let config = serde_json::to_vec(config)?;
        let mut boundary = IsolationBoundary::load(
            &self.engine,
            &manifest.name,
            &manifest.compiled_output_path,
            caller_id,
            config,
            self.fuel,
        )?;

        let index = boundary.select_entry(&manifest.name, manifest.entry_point.as_deref())?;
        let entry_module = boundary.modules()[index].stem.clone();

        registry.set_status(&manifest.name, generation, PluginStatus::Running);
        let output = boundary.run(index)?;
        if output.exit_code != 0 {
            return Err(StarError::Backend(format!(
                "plugin '{}' exited with code {}",
                manifest.name, output.exit_code
            )));
        }

        let report = PluginRunReport {
            name: manifest.name.clone(),
            version: manifest.version.clone(),
            entry_module,
            exit_code: output.exit_code,
            output: output.output,
            generation,
            fuel_consumed: output.fuel_consumed,
        };
        Ok((report, boundary))
    }

    /// Release a plugin's boundary and forget it. Unknown names are a warning.
    pub fn unload(&self, registry: &PluginRegistry, name: &str) -> OpResult<bool> {
        match registry.remove(name) {
            Some(mut handle) => {
                handle.status = PluginStatus::Unloaded;
                drop(handle.boundary.take());
                info!(plugin = name, generation = handle.generation, "plugin unloaded");
                OpResult::ok(true).with_message(format!("Plugin '{}' unloaded", name))
            }
            None => OpResult::warning(false, format!("Plugin '{}' is not loaded", name)),
        }
    }

    /// Unload every registered plugin; returns how many were released.
    pub fn unload_all(&self, registry: &PluginRegistry) -> OpResult<usize> {
        let names: Vec<String> = registry.handles().into_iter().map(|h| h.name).collect();
        let count = names
            .iter()
            .filter(|name| self.unload(registry, name).value == Some(true))
            .count();
        OpResult::ok(count).with_message(format!("{} plugins unloaded", count))
    }
}
