use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{Candidate, DependencyRecord, EntityDraft, EntityKind, EntityRecord, EntityUpdate};
use crate::StarError;

/// Restricts visibility to entities owned by one principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScopeFilter {
    /// When set, only entities created by this principal are visible.
    pub owner_id: Option<Uuid>,
}

impl ScopeFilter {
    /// Every entity of the kind, regardless of owner.
    pub fn global() -> Self {
        Self { owner_id: None }
    }

    /// Only entities created by `owner_id`.
    pub fn owned_by(owner_id: Uuid) -> Self {
        Self {
            owner_id: Some(owner_id),
        }
    }

    pub fn requires_ownership(&self) -> bool {
        self.owner_id.is_some()
    }

    /// True when `owner_id` may see an entity under this scope.
    pub fn admits(&self, owner_id: Uuid) -> bool {
        self.owner_id.map_or(true, |required| required == owner_id)
    }
}

/// Lookup side of the content store.
///
/// `search` must return candidates in a stable order; the resolver numbers
/// them exactly as returned.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn list_all(
        &self,
        kind: EntityKind,
        scope: ScopeFilter,
    ) -> Result<Vec<Candidate>, StarError>;

    async fn search(
        &self,
        kind: EntityKind,
        term: &str,
        scope: ScopeFilter,
    ) -> Result<Vec<Candidate>, StarError>;

    async fn load_by_id(&self, id: Uuid) -> Result<Option<EntityRecord>, StarError>;
}

/// Mutation side of the content store.
#[async_trait]
pub trait PersistenceManager: Send + Sync {
    async fn create(&self, draft: EntityDraft) -> Result<EntityRecord, StarError>;

    /// Apply `changes` and bump the version; `None` if the entity does not exist.
    async fn update(&self, id: Uuid, changes: EntityUpdate) -> Result<Option<EntityRecord>, StarError>;

    /// Soft-delete; returns the entity as it was, or `None` if it did not exist.
    async fn delete(&self, id: Uuid) -> Result<Option<EntityRecord>, StarError>;

    async fn add_dependency(
        &self,
        parent_id: Uuid,
        record: &DependencyRecord,
    ) -> Result<(), StarError>;

    /// Returns whether a record for `child_id` was removed.
    async fn remove_dependency(&self, parent_id: Uuid, child_id: Uuid) -> Result<bool, StarError>;
}
