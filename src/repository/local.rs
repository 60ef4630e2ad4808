//! JSON-file content store used when no remote backend is configured.

use async_trait::async_trait;
use chrono::Utc;
use rapidfuzz::distance::levenshtein;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::traits::{PersistenceManager, ScopeFilter, SearchProvider};
use crate::models::{
    Candidate, DependencyRecord, EntityDraft, EntityKind, EntityRecord, EntityUpdate,
};
use crate::StarError;

/// Minimum normalized Levenshtein similarity for a typo-tolerant match.
const FUZZY_THRESHOLD: f64 = 0.7;

/// Entities kept in creation order in a single JSON file.
pub struct LocalStore {
    path: PathBuf,
    entities: RwLock<Vec<EntityRecord>>,
}

impl LocalStore {
    /// Load the store from disk, or start empty if the file does not exist.
    pub fn load_or_create(path: &Path) -> Result<Self, StarError> {
        let entities = if path.exists() {
            let json = std::fs::read_to_string(path).map_err(|e| {
                StarError::Backend(format!("Failed to read entity store: {}", e))
            })?;
            serde_json::from_str(&json).map_err(|e| {
                StarError::Backend(format!("Failed to parse entity store: {}", e))
            })?
        } else {
            Vec::new()
        };

        Ok(Self {
            path: path.to_path_buf(),
            entities: RwLock::new(entities),
        })
    }

    fn persist(&self, entities: &[EntityRecord]) -> Result<(), StarError> {
        let json = serde_json::to_string_pretty(entities)?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StarError::Backend(format!("Failed to create store directory: {}", e))
            })?;
        }

        std::fs::write(&self.path, json)
            .map_err(|e| StarError::Backend(format!("Failed to write entity store: {}", e)))
    }

    /// Apply `f` to a live entity and persist; `None` if the id is unknown or deleted.
    ///
    /// The in-memory record only changes once the write succeeded.
    async fn modify<R>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut EntityRecord) -> R,
    ) -> Result<Option<R>, StarError> {
        let mut entities = self.entities.write().await;
        let Some(index) = entities.iter().position(|e| e.id == id && !e.is_deleted()) else {
            return Ok(None);
        };

        let mut changed = entities[index].clone();
        let out = f(&mut changed);
        changed.updated_at = Utc::now();

        let before = std::mem::replace(&mut entities[index], changed);
        if let Err(e) = self.persist(&entities) {
            entities[index] = before;
            return Err(e);
        }
        Ok(Some(out))
    }
}

fn visible(entity: &EntityRecord, kind: EntityKind, scope: ScopeFilter) -> bool {
    entity.kind == kind && !entity.is_deleted() && scope.admits(entity.owner_id)
}

fn name_matches(name: &str, term_lower: &str) -> bool {
    let name_lower = name.to_lowercase();
    if name_lower.contains(term_lower) {
        return true;
    }
    levenshtein::normalized_similarity(term_lower.chars(), name_lower.chars()) >= FUZZY_THRESHOLD
}

#[async_trait]
impl SearchProvider for LocalStore {
    async fn list_all(
        &self,
        kind: EntityKind,
        scope: ScopeFilter,
    ) -> Result<Vec<Candidate>, StarError> {
        let entities = self.entities.read().await;
        Ok(entities
            .iter()
            .filter(|e| visible(e, kind, scope))
            .map(EntityRecord::candidate)
            .collect())
    }

    async fn search(
        &self,
        kind: EntityKind,
        term: &str,
        scope: ScopeFilter,
    ) -> Result<Vec<Candidate>, StarError> {
        let term_lower = term.trim().to_lowercase();
        if term_lower.is_empty() {
            return Ok(Vec::new());
        }

        let entities = self.entities.read().await;
        Ok(entities
            .iter()
            .filter(|e| visible(e, kind, scope) && name_matches(&e.name, &term_lower))
            .map(EntityRecord::candidate)
            .collect())
    }

    async fn load_by_id(&self, id: Uuid) -> Result<Option<EntityRecord>, StarError> {
        let entities = self.entities.read().await;
        Ok(entities
            .iter()
            .find(|e| e.id == id && !e.is_deleted())
            .cloned())
    }
}

#[async_trait]
impl PersistenceManager for LocalStore {
    async fn create(&self, draft: EntityDraft) -> Result<EntityRecord, StarError> {
        let record = EntityRecord::from_draft(draft);
        let mut entities = self.entities.write().await;
        entities.push(record.clone());
        if let Err(e) = self.persist(&entities) {
            entities.pop();
            return Err(e);
        }
        tracing::info!(id = %record.id, kind = record.kind.slug(), "Entity created");
        Ok(record)
    }

    async fn update(
        &self,
        id: Uuid,
        changes: EntityUpdate,
    ) -> Result<Option<EntityRecord>, StarError> {
        let updated = self
            .modify(id, move |entity| {
                if let Some(name) = changes.name {
                    entity.name = name;
                }
                if let Some(description) = changes.description {
                    entity.description = description;
                }
                entity.version += 1;
                entity.clone()
            })
            .await?;
        if let Some(entity) = &updated {
            tracing::info!(id = %entity.id, version = entity.version, "Entity updated");
        }
        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> Result<Option<EntityRecord>, StarError> {
        self.modify(id, |entity| {
            let before = entity.clone();
            entity.deleted_at = Some(Utc::now());
            before
        })
        .await
    }

    async fn add_dependency(
        &self,
        parent_id: Uuid,
        record: &DependencyRecord,
    ) -> Result<(), StarError> {
        let record = record.clone();
        self.modify(parent_id, move |parent| parent.dependencies.push(record))
            .await?
            .ok_or_else(|| StarError::Backend(format!("Parent entity {} not found", parent_id)))
    }

    async fn remove_dependency(&self, parent_id: Uuid, child_id: Uuid) -> Result<bool, StarError> {
        let removed = self
            .modify(parent_id, |parent| {
                let before = parent.dependencies.len();
                parent.dependencies.retain(|d| d.entity_id != child_id);
                parent.dependencies.len() != before
            })
            .await?;
        removed.ok_or_else(|| StarError::Backend(format!("Parent entity {} not found", parent_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn draft(kind: EntityKind, name: &str, owner: Uuid) -> EntityDraft {
        EntityDraft {
            kind,
            name: name.to_string(),
            description: String::new(),
            owner_id: owner,
        }
    }

    #[tokio::test]
    async fn test_search_keeps_creation_order_and_tolerates_typos() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::load_or_create(&dir.path().join("entities.json")).unwrap();
        let owner = Uuid::new_v4();

        let first = store.create(draft(EntityKind::Quest, "Dragon Quest I", owner)).await.unwrap();
        let second = store.create(draft(EntityKind::Quest, "Dragon Quest II", owner)).await.unwrap();
        store.create(draft(EntityKind::Nft, "Dragon Quest Art", owner)).await.unwrap();

        let hits = store
            .search(EntityKind::Quest, "dragon quest", ScopeFilter::global())
            .await
            .unwrap();
        assert_eq!(hits.iter().map(|c| c.id).collect::<Vec<_>>(), vec![first.id, second.id]);

        let typo = store
            .search(EntityKind::Quest, "Dragon Qeust I", ScopeFilter::global())
            .await
            .unwrap();
        assert!(typo.iter().any(|c| c.id == first.id));
    }

    #[tokio::test]
    async fn test_soft_delete_hides_entity_and_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("entities.json");
        let owner = Uuid::new_v4();

        let id = {
            let store = LocalStore::load_or_create(&path).unwrap();
            let wallet = store.create(draft(EntityKind::Wallet, "Main", owner)).await.unwrap();
            let deleted = store.delete(wallet.id).await.unwrap();
            assert_eq!(deleted.map(|w| w.id), Some(wallet.id));
            wallet.id
        };

        let reopened = LocalStore::load_or_create(&path).unwrap();
        assert!(reopened.load_by_id(id).await.unwrap().is_none());
        assert!(reopened
            .list_all(EntityKind::Wallet, ScopeFilter::global())
            .await
            .unwrap()
            .is_empty());
        assert!(reopened.delete(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_owned_scope_filters_listing() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::load_or_create(&dir.path().join("entities.json")).unwrap();
        let me = Uuid::new_v4();
        let other = Uuid::new_v4();

        store.create(draft(EntityKind::Holon, "Mine", me)).await.unwrap();
        store.create(draft(EntityKind::Holon, "Theirs", other)).await.unwrap();

        let mine = store
            .list_all(EntityKind::Holon, ScopeFilter::owned_by(me))
            .await
            .unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].display_name, "Mine");
    }

    #[tokio::test]
    async fn test_dependencies_add_and_remove() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::load_or_create(&dir.path().join("entities.json")).unwrap();
        let owner = Uuid::new_v4();

        let collection = store
            .create(draft(EntityKind::NftCollection, "Set", owner))
            .await
            .unwrap();
        let nft = store.create(draft(EntityKind::Nft, "Card", owner)).await.unwrap();

        store
            .add_dependency(collection.id, &DependencyRecord::new("nft", nft.id))
            .await
            .unwrap();
        let loaded = store.load_by_id(collection.id).await.unwrap().unwrap();
        assert_eq!(loaded.dependencies, vec![DependencyRecord::new("nft", nft.id)]);

        assert!(store.remove_dependency(collection.id, nft.id).await.unwrap());
        assert!(!store.remove_dependency(collection.id, nft.id).await.unwrap());

        let missing = store
            .add_dependency(Uuid::new_v4(), &DependencyRecord::new("nft", nft.id))
            .await;
        assert!(missing.is_err());
    }

    #[tokio::test]
    async fn test_update_changes_only_given_fields() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::load_or_create(&dir.path().join("entities.json")).unwrap();
        let owner = Uuid::new_v4();
        let quest = store.create(draft(EntityKind::Quest, "Old", owner)).await.unwrap();

        let updated = store
            .update(
                quest.id,
                EntityUpdate {
                    name: Some("New".to_string()),
                    description: None,
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.name, "New");
        assert_eq!(updated.description, "");
        assert_eq!(updated.version, quest.version + 1);

        let missing = store.update(Uuid::new_v4(), EntityUpdate::default()).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_failed_write_leaves_memory_unchanged() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("entities.json");
        let store = LocalStore::load_or_create(&path).unwrap();
        let owner = Uuid::new_v4();
        let kept = store.create(draft(EntityKind::Quest, "Kept", owner)).await.unwrap();

        // A directory where the file should be makes every write fail.
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        assert!(store.create(draft(EntityKind::Quest, "Ghost", owner)).await.is_err());
        let names: Vec<String> = store
            .list_all(EntityKind::Quest, ScopeFilter::global())
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.display_name)
            .collect();
        assert_eq!(names, vec!["Kept".to_string()]);

        assert!(store.delete(kept.id).await.is_err());
        assert!(store.load_by_id(kept.id).await.unwrap().is_some());

        let renamed = store
            .update(
                kept.id,
                EntityUpdate {
                    name: Some("Renamed".to_string()),
                    description: None,
                },
            )
            .await;
        assert!(renamed.is_err());

        let dep = DependencyRecord::new("quest", Uuid::new_v4());
        assert!(store.add_dependency(kept.id, &dep).await.is_err());

        let loaded = store.load_by_id(kept.id).await.unwrap().unwrap();
        assert_eq!(loaded.name, "Kept");
        assert_eq!(loaded.version, kept.version);
        assert!(loaded.dependencies.is_empty());
    }
}
