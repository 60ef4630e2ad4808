//! Test harness for store lifecycle management.
//!
//! Provides an isolated entity store per test using tempfile.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use uuid::Uuid;

use starnet::models::{Candidate, EntityKind, EntityRecord};
use starnet::repository::{LocalStore, PersistenceManager, ScopeFilter, SearchProvider};
use starnet::wizard::{EntityWizard, WizardContext};
use starnet::StarError;

use super::builders::EntityBuilder;
use super::interaction::{RecordingRenderer, ScriptedPrompter};

/// Test harness that owns a temporary data directory and a store inside it.
pub struct TestHarness {
    pub store: Arc<LocalStore>,
    /// The avatar tests act as.
    pub caller_id: Uuid,
    /// Temporary directory (kept alive while harness exists)
    pub temp_dir: TempDir,
}

impl TestHarness {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory for test store");
        let store = LocalStore::load_or_create(&temp_dir.path().join("entities.json"))
            .expect("Failed to open test store");

        Self {
            store: Arc::new(store),
            caller_id: Uuid::new_v4(),
            temp_dir,
        }
    }

    pub fn temp_path(&self) -> &std::path::Path {
        self.temp_dir.path()
    }

    /// Create an entity owned by the harness caller.
    pub async fn seed(&self, kind: EntityKind, name: &str) -> EntityRecord {
        self.seed_owned_by(kind, name, self.caller_id).await
    }

    pub async fn seed_owned_by(&self, kind: EntityKind, name: &str, owner: Uuid) -> EntityRecord {
        self.store
            .create(EntityBuilder::new(kind, name).owner(owner).build())
            .await
            .expect("Failed to seed entity")
    }

    pub async fn reload(&self, id: Uuid) -> EntityRecord {
        self.store
            .load_by_id(id)
            .await
            .expect("Failed to load entity")
            .expect("Entity should exist")
    }

    pub fn wizard_context(
        &self,
        prompter: Arc<ScriptedPrompter>,
        renderer: Arc<RecordingRenderer>,
    ) -> WizardContext {
        WizardContext::new(
            self.store.clone(),
            self.store.clone(),
            prompter,
            renderer,
            self.caller_id,
        )
    }

    pub fn wizard(
        &self,
        kind: EntityKind,
        prompter: Arc<ScriptedPrompter>,
        renderer: Arc<RecordingRenderer>,
    ) -> EntityWizard {
        EntityWizard::new(kind, self.wizard_context(prompter, renderer))
    }
}

/// Wraps the store to count calls and inject load failures.
pub struct CountingProvider {
    inner: Arc<LocalStore>,
    searches: AtomicUsize,
    listings: AtomicUsize,
    failing_loads: AtomicUsize,
}

impl CountingProvider {
    pub fn new(inner: Arc<LocalStore>) -> Self {
        Self {
            inner,
            searches: AtomicUsize::new(0),
            listings: AtomicUsize::new(0),
            failing_loads: AtomicUsize::new(0),
        }
    }

    /// Make the next `n` by-id loads fail with a backend fault.
    pub fn fail_next_loads(&self, n: usize) {
        self.failing_loads.store(n, Ordering::SeqCst);
    }

    pub fn searches(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }

    pub fn listings(&self) -> usize {
        self.listings.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchProvider for CountingProvider {
    async fn list_all(
        &self,
        kind: EntityKind,
        scope: ScopeFilter,
    ) -> Result<Vec<Candidate>, StarError> {
        self.listings.fetch_add(1, Ordering::SeqCst);
        self.inner.list_all(kind, scope).await
    }

    async fn search(
        &self,
        kind: EntityKind,
        term: &str,
        scope: ScopeFilter,
    ) -> Result<Vec<Candidate>, StarError> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        self.inner.search(kind, term, scope).await
    }

    async fn load_by_id(&self, id: Uuid) -> Result<Option<EntityRecord>, StarError> {
        let failing = self.failing_loads.load(Ordering::SeqCst);
        if failing > 0 {
            self.failing_loads.store(failing - 1, Ordering::SeqCst);
            return Err(StarError::Backend("provider offline".to_string()));
        }
        self.inner.load_by_id(id).await
    }
}
