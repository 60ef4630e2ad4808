//! The create/find/delete wizard shared by every entity kind.

pub mod entity;

pub use entity::EntityWizard;

use std::sync::Arc;
use uuid::Uuid;

use crate::dependency::DEFAULT_MAX_DEPTH;
use crate::interact::{Prompter, Renderer};
use crate::repository::{PersistenceManager, SearchProvider};

/// Collaborators a wizard needs, cheap to clone into nested wizards.
#[derive(Clone)]
pub struct WizardContext {
    pub provider: Arc<dyn SearchProvider>,
    pub persistence: Arc<dyn PersistenceManager>,
    pub prompter: Arc<dyn Prompter>,
    pub renderer: Arc<dyn Renderer>,
    /// The operator's avatar id; owner of everything created.
    pub caller_id: Uuid,
    pub max_depth: usize,
}

impl WizardContext {
    pub fn new(
        provider: Arc<dyn SearchProvider>,
        persistence: Arc<dyn PersistenceManager>,
        prompter: Arc<dyn Prompter>,
        renderer: Arc<dyn Renderer>,
        caller_id: Uuid,
    ) -> Self {
        Self {
            provider,
            persistence,
            prompter,
            renderer,
            caller_id,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
