//! Installed plugin discovery.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::outcome::OpResult;
use crate::StarError;

/// Manifest file expected in every installed plugin folder.
pub const MANIFEST_FILE: &str = "PluginDNA.json";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ManifestFile {
    name: String,
    version: String,
    #[serde(default)]
    compiled_output_path: Option<String>,
    #[serde(default)]
    entry_point: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

/// A plugin that can be loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginManifest {
    pub name: String,
    pub version: String,
    /// Directory holding the compiled modules.
    pub compiled_output_path: PathBuf,
    /// File stem of the module to run; absent means legacy first-match.
    pub entry_point: Option<String>,
    pub description: Option<String>,
    pub folder: PathBuf,
}

impl PluginManifest {
    /// Read `PluginDNA.json` from `folder`.
    pub fn from_folder(folder: &Path) -> Result<Self, StarError> {
        let path = folder.join(MANIFEST_FILE);
        let invalid = |reason: String| StarError::ManifestInvalid {
            path: path.clone(),
            reason,
        };

        let content = std::fs::read_to_string(&path).map_err(|e| invalid(e.to_string()))?;
        let file: ManifestFile =
            serde_json::from_str(&content).map_err(|e| invalid(e.to_string()))?;

        if file.name.trim().is_empty() {
            return Err(invalid("Name is empty".to_string()));
        }

        let compiled_output_path = match file.compiled_output_path.as_deref() {
            Some(p) if !p.trim().is_empty() => {
                let p = Path::new(p);
                if p.is_absolute() {
                    p.to_path_buf()
                } else {
                    folder.join(p)
                }
            }
            _ => folder.to_path_buf(),
        };

        Ok(Self {
            name: file.name.trim().to_string(),
            version: file.version,
            compiled_output_path,
            entry_point: file.entry_point.filter(|e| !e.trim().is_empty()),
            description: file.description,
            folder: folder.to_path_buf(),
        })
    }
}

/// A plugin folder that was passed over during a scan.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedPlugin {
    pub folder: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PluginScan {
    pub manifests: Vec<PluginManifest>,
    pub skipped: Vec<SkippedPlugin>,
}

/// The installed-plugins root: one folder per plugin.
#[derive(Debug, Clone)]
pub struct PluginManifestStore {
    root: PathBuf,
}

impl PluginManifestStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Every installed plugin with a readable manifest, in folder-name order.
    ///
    /// Folders with a missing or malformed manifest are skipped with a warning;
    /// the scan itself only fails if the root cannot be read.
    pub fn scan_installed(&self) -> OpResult<PluginScan> {
        if !self.root.is_dir() {
            return OpResult::warning(
                PluginScan::default(),
                format!("No plugins installed at {}", self.root.display()),
            );
        }

        let mut folders = Vec::new();
        for entry in walkdir::WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            match entry {
                Ok(e) if e.file_type().is_dir() => folders.push(e.into_path()),
                Ok(_) => {}
                Err(e) => return OpResult::error(&StarError::Backend(e.to_string())),
            }
        }

        let mut scan = PluginScan::default();
        for folder in folders {
            match PluginManifest::from_folder(&folder) {
                Ok(manifest) => {
                    debug!(name = %manifest.name, version = %manifest.version, "plugin manifest found");
                    scan.manifests.push(manifest);
                }
                Err(e) => {
                    warn!(folder = %folder.display(), error = %e, "skipping plugin");
                    scan.skipped.push(SkippedPlugin {
                        folder,
                        reason: e.to_string(),
                    });
                }
            }
        }

        if scan.skipped.is_empty() {
            let message = format!("{} plugins found", scan.manifests.len());
            OpResult::ok(scan).with_message(message)
        } else {
            let message = format!(
                "{} plugins found, {} skipped",
                scan.manifests.len(),
                scan.skipped.len()
            );
            OpResult::warning(scan, message)
        }
    }

    /// Find an installed plugin by name (case-insensitive) and, optionally, version.
    pub fn load_installed(&self, name: &str, version: Option<&str>) -> OpResult<PluginManifest> {
        let scan = self.scan_installed();
        if scan.is_error {
            return OpResult {
                is_error: true,
                is_warning: false,
                message: scan.message,
                kind: scan.kind,
                value: None,
            };
        }

        let found = scan.value.unwrap_or_default().manifests.into_iter().find(|m| {
            m.name.eq_ignore_ascii_case(name) && version.map_or(true, |v| m.version == v)
        });

        match found {
            Some(manifest) => OpResult::ok(manifest),
            None => OpResult::error(&StarError::NoMatch {
                entity: match version {
                    Some(v) => format!("installed plugin '{}' version {}", name, v),
                    None => format!("installed plugin '{}'", name),
                },
            }),
        }
    }
}
