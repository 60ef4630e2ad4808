//! One wasmtime store per loaded plugin.
//!
//! A boundary owns every module compiled from the plugin's output directory
//! and the store the entry module is instantiated in. Dropping it releases
//! all of them; nothing a plugin does outlives its boundary.
//!
//! Guest contract, exported by the entry module:
//! - `plugin_init(caller_hi: i64, caller_lo: i64) -> i32`, 0 on success
//! - `plugin_run() -> i32`, 0 on success
//! - `memory`, when the module uses the host imports
//!
//! Host imports, module `env`:
//! - `log(ptr: i32, len: i32)` records a UTF-8 line
//! - `config_len() -> i32` size of the shared JSON configuration
//! - `config_read(ptr: i32) -> i32` copies the configuration into guest memory

use anyhow::{anyhow, Context};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;
use wasmtime::{Caller, Engine, Linker, Memory, Module, Store};

use crate::StarError;

pub const INIT_EXPORT: &str = "plugin_init";
pub const RUN_EXPORT: &str = "plugin_run";

/// Host-side state visible to imports.
pub struct PluginState {
    plugin: String,
    caller_id: Uuid,
    config: Vec<u8>,
    output: Vec<String>,
}

/// A compiled module and where it came from.
pub struct LoadedModule {
    pub path: PathBuf,
    pub stem: String,
    module: Module,
}

impl LoadedModule {
    /// True when the module exports the init/run pair with the expected signatures.
    pub fn implements_contract(&self) -> bool {
        let mut init = false;
        let mut run = false;
        for export in self.module.exports() {
            let Some(func) = export.ty().func().cloned() else {
                continue;
            };
            let params: Vec<_> = func.params().collect();
            let results: Vec<_> = func.results().collect();
            let returns_i32 = results.len() == 1 && results[0].is_i32();
            match export.name() {
                INIT_EXPORT => {
                    init = returns_i32 && params.len() == 2 && params.iter().all(|p| p.is_i64())
                }
                RUN_EXPORT => run = returns_i32 && params.is_empty(),
                _ => {}
            }
        }
        init && run
    }
}

/// Outcome of one init+run cycle.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub exit_code: i32,
    pub output: Vec<String>,
    pub fuel_consumed: Option<u64>,
}

pub struct IsolationBoundary {
    store: Store<PluginState>,
    linker: Linker<PluginState>,
    modules: Vec<LoadedModule>,
    fuel: Option<u64>,
}

impl IsolationBoundary {
    /// Compile every `*.wasm`/`*.wat` file under `output_path` into a fresh store.
    ///
    /// Files that fail to compile are logged and skipped.
    pub fn load(
        engine: &Engine,
        plugin: &str,
        output_path: &Path,
        caller_id: Uuid,
        config: Vec<u8>,
        fuel: Option<u64>,
    ) -> Result<Self, StarError> {
        if !output_path.is_dir() {
            return Err(StarError::EntryPointNotFound {
                plugin: plugin.to_string(),
                reason: format!("output path {} does not exist", output_path.display()),
            });
        }

        let mut modules = Vec::new();
        for path in module_files(output_path)? {
            match Module::from_file(engine, &path) {
                Ok(module) => {
                    debug!(plugin, path = %path.display(), "module compiled");
                    let stem = path
                        .file_stem()
                        .map(|s| s.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    modules.push(LoadedModule { path, stem, module });
                }
                Err(e) => warn!(plugin, path = %path.display(), error = %e, "module failed to compile"),
            }
        }

        let store = Store::new(
            engine,
            PluginState {
                plugin: plugin.to_string(),
                caller_id,
                config,
                output: Vec::new(),
            },
        );
        let mut linker = Linker::new(engine);
        define_host_imports(&mut linker)?;

        Ok(Self {
            store,
            linker,
            modules,
            fuel,
        })
    }

    pub fn modules(&self) -> &[LoadedModule] {
        &self.modules
    }

    /// Index of the module to run.
    ///
    /// A declared entry point must name a contract-implementing module by file
    /// stem. Without one, the first implementing module in path order is used.
    pub fn select_entry(&self, plugin: &str, declared: Option<&str>) -> Result<usize, StarError> {
        let not_found = |reason: String| StarError::EntryPointNotFound {
            plugin: plugin.to_string(),
            reason,
        };

        if let Some(declared) = declared {
            let index = self
                .modules
                .iter()
                .position(|m| m.stem == declared)
                .ok_or_else(|| not_found(format!("declared entry point '{}' was not loaded", declared)))?;
            if !self.modules[index].implements_contract() {
                return Err(not_found(format!(
                    "'{}' does not export {} and {}",
                    declared, INIT_EXPORT, RUN_EXPORT
                )));
            }
            return Ok(index);
        }

        let index = self
            .modules
            .iter()
            .position(|m| m.implements_contract())
            .ok_or_else(|| {
                not_found(format!(
                    "none of {} modules export {} and {}",
                    self.modules.len(),
                    INIT_EXPORT,
                    RUN_EXPORT
                ))
            })?;
        warn!(
            plugin,
            module = %self.modules[index].stem,
            "no entry point declared; using the first module that implements the plugin contract"
        );
        Ok(index)
    }

    /// Instantiate module `index`, then call init and run.
    pub fn run(&mut self, index: usize) -> Result<RunOutput, StarError> {
        let loaded = self.modules.get(index).ok_or_else(|| {
            StarError::Backend(format!("module index {} out of range", index))
        })?;

        if let Some(fuel) = self.fuel {
            self.store.set_fuel(fuel)?;
        }

        let instance = self.linker.instantiate(&mut self.store, &loaded.module)?;
        let init = instance.get_typed_func::<(i64, i64), i32>(&mut self.store, INIT_EXPORT)?;
        let run = instance.get_typed_func::<(), i32>(&mut self.store, RUN_EXPORT)?;

        let (hi, lo) = split_caller_id(self.store.data().caller_id);
        let init_code = init.call(&mut self.store, (hi, lo))?;
        if init_code != 0 {
            return Err(StarError::Backend(format!(
                "{} returned {}",
                INIT_EXPORT, init_code
            )));
        }

        let exit_code = run.call(&mut self.store, ())?;
        let fuel_consumed = match self.fuel {
            Some(budget) => self.store.get_fuel().ok().map(|left| budget.saturating_sub(left)),
            None => None,
        };

        Ok(RunOutput {
            exit_code,
            output: std::mem::take(&mut self.store.data_mut().output),
            fuel_consumed,
        })
    }
}

impl Drop for IsolationBoundary {
    fn drop(&mut self) {
        info!(
            plugin = %self.store.data().plugin,
            modules = self.modules.len(),
            "isolation boundary released"
        );
    }
}

/// Caller id as two signed halves, high first.
pub fn split_caller_id(id: Uuid) -> (i64, i64) {
    let value = id.as_u128();
    ((value >> 64) as u64 as i64, value as u64 as i64)
}

fn module_files(root: &Path) -> Result<Vec<PathBuf>, StarError> {
    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| StarError::Backend(e.to_string()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let is_module = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == "wasm" || ext == "wat");
        if is_module {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn guest_memory(caller: &mut Caller<'_, PluginState>) -> anyhow::Result<Memory> {
    caller
        .get_export("memory")
        .and_then(|export| export.into_memory())
        .ok_or_else(|| anyhow!("plugin does not export memory"))
}

fn define_host_imports(linker: &mut Linker<PluginState>) -> Result<(), StarError> {
    linker.func_wrap(
        "env",
        "log",
        |mut caller: Caller<'_, PluginState>, ptr: i32, len: i32| -> anyhow::Result<()> {
            let memory = guest_memory(&mut caller)?;
            let start = usize::try_from(ptr).context("negative pointer")?;
            let len = usize::try_from(len).context("negative length")?;
            let bytes = memory
                .data(&caller)
                .get(start..start.saturating_add(len))
                .ok_or_else(|| anyhow!("log range out of bounds"))?;
            let line = String::from_utf8_lossy(bytes).into_owned();

            let state = caller.data_mut();
            info!(plugin = %state.plugin, "{}", line);
            state.output.push(line);
            Ok(())
        },
    )?;

    linker.func_wrap(
        "env",
        "config_len",
        |caller: Caller<'_, PluginState>| -> i32 {
            i32::try_from(caller.data().config.len()).unwrap_or(i32::MAX)
        },
    )?;

    linker.func_wrap(
        "env",
        "config_read",
        |mut caller: Caller<'_, PluginState>, ptr: i32| -> anyhow::Result<i32> {
            let memory = guest_memory(&mut caller)?;
            let offset = usize::try_from(ptr).context("negative pointer")?;
            let config = caller.data().config.clone();
            memory
                .write(&mut caller, offset, &config)
                .map_err(|e| anyhow!("config write failed: {}", e))?;
            Ok(i32::try_from(config.len()).unwrap_or(i32::MAX))
        },
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_caller_id_round_trips() {
        let id = Uuid::new_v4();
        let (hi, lo) = split_caller_id(id);
        let joined = ((hi as u64 as u128) << 64) | (lo as u64 as u128);
        assert_eq!(Uuid::from_u128(joined), id);
    }
}
