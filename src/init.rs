//! Shared initialization logic for CLI commands.

use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

use crate::cli::output::OutputMode;
use crate::config::{avatar_override, load_config, resolve_data_path, StarConfig};
use crate::interact::{ConsolePrompter, ConsoleRenderer, Prompter, Renderer};
use crate::models::EntityKind;
use crate::plugins::{PluginManifestStore, PluginRegistry, PluginRuntime};
use crate::repository::LocalStore;
use crate::session::SessionStateManager;
use crate::wizard::{EntityWizard, WizardContext};

/// Application context holding the store, interaction seams and plugin runtime.
pub struct AppContext {
    pub data_path: PathBuf,
    pub config: StarConfig,
    pub session_manager: Arc<SessionStateManager>,
    pub store: Arc<LocalStore>,
    pub prompter: Arc<dyn Prompter>,
    pub renderer: Arc<dyn Renderer>,
    /// The beamed-in avatar every operation acts as.
    pub caller_id: Uuid,
    pub manifests: PluginManifestStore,
    pub plugin_runtime: PluginRuntime,
    pub plugin_registry: PluginRegistry,
}

impl AppContext {
    /// Initialize application context with terminal interaction.
    ///
    /// Under JSON output, prompts and rendered views go to stderr.
    pub async fn new(explicit_path: Option<PathBuf>, mode: OutputMode) -> Result<Self> {
        Self::with_interaction(
            explicit_path,
            Arc::new(ConsolePrompter::stdio(mode)),
            Arc::new(ConsoleRenderer::for_mode(mode)),
        )
        .await
    }

    pub async fn with_interaction(
        explicit_path: Option<PathBuf>,
        prompter: Arc<dyn Prompter>,
        renderer: Arc<dyn Renderer>,
    ) -> Result<Self> {
        let data_path = resolve_data_path(explicit_path);
        tracing::info!("Using data path: {}", data_path.display());

        let config = load_config(&data_path);

        let session_manager = Arc::new(SessionStateManager::load_or_create(
            &data_path.join("session.json"),
        )?);
        let caller_id = match avatar_override() {
            Some(id) => id,
            None => session_manager.avatar_id().await,
        };
        tracing::info!("Beamed in as avatar {}", caller_id);

        let store = Arc::new(LocalStore::load_or_create(&data_path.join("entities.json"))?);

        let manifests = PluginManifestStore::new(config.plugins_root(&data_path));
        let plugin_runtime = PluginRuntime::new(config.plugin_fuel)?;

        Ok(Self {
            data_path,
            config,
            session_manager,
            store,
            prompter,
            renderer,
            caller_id,
            manifests,
            plugin_runtime,
            plugin_registry: PluginRegistry::new(),
        })
    }

    pub fn wizard_context(&self) -> WizardContext {
        WizardContext::new(
            self.store.clone(),
            self.store.clone(),
            self.prompter.clone(),
            self.renderer.clone(),
            self.caller_id,
        )
        .with_max_depth(self.config.max_dependency_depth)
    }

    pub fn wizard(&self, kind: EntityKind) -> EntityWizard {
        EntityWizard::new(kind, self.wizard_context())
    }

    /// Release every plugin and persist the session.
    pub async fn shutdown(&self) -> Result<()> {
        let unloaded = self.plugin_runtime.unload_all(&self.plugin_registry);
        tracing::debug!("{}", unloaded.message);
        self.session_manager.mark_session_end().await;
        self.session_manager.save().await?;
        Ok(())
    }
}
