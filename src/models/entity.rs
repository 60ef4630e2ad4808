use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::dependency::DependencyRecord;
use super::kind::EntityKind;

/// A typed entity as held by the content store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub id: Uuid,
    pub kind: EntityKind,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Principal that created the entity.
    pub owner_id: Uuid,
    #[serde(default = "default_version")]
    pub version: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub dependencies: Vec<DependencyRecord>,
}

fn default_version() -> u32 {
    1
}

impl EntityRecord {
    /// Materialize a draft with a fresh id and timestamps.
    pub fn from_draft(draft: EntityDraft) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            kind: draft.kind,
            name: draft.name,
            description: draft.description,
            owner_id: draft.owner_id,
            version: default_version(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
            dependencies: Vec::new(),
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Lightweight projection used for listing and disambiguation.
    pub fn candidate(&self) -> Candidate {
        Candidate {
            id: self.id,
            display_name: self.name.clone(),
            owner_id: self.owner_id,
        }
    }
}

/// Data for creating a new entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityDraft {
    pub kind: EntityKind,
    pub name: String,
    pub description: String,
    pub owner_id: Uuid,
}

/// Fields to change on an existing entity; `None` leaves the field as is.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EntityUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl EntityUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}

/// One possible match for a token. Never the full entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: Uuid,
    pub display_name: String,
    pub owner_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_draft_assigns_identity() {
        let owner = Uuid::new_v4();
        let record = EntityRecord::from_draft(EntityDraft {
            kind: EntityKind::Quest,
            name: "Dragon Quest I".to_string(),
            description: String::new(),
            owner_id: owner,
        });

        assert!(!record.id.is_nil());
        assert_eq!(record.owner_id, owner);
        assert_eq!(record.version, 1);
        assert!(!record.is_deleted());
        assert!(record.dependencies.is_empty());

        let candidate = record.candidate();
        assert_eq!(candidate.id, record.id);
        assert_eq!(candidate.display_name, "Dragon Quest I");
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let json = serde_json::json!({
            "id": "6f1c1f0e-8a59-4f57-9d6b-0c1f3c2f9a11",
            "kind": "geo-nft",
            "name": "Landmark",
            "owner_id": "00000000-0000-0000-0000-000000000001",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        });
        let record: EntityRecord = serde_json::from_value(json).unwrap();
        assert_eq!(record.kind, EntityKind::GeoNft);
        assert_eq!(record.version, 1);
        assert_eq!(record.description, "");
        assert!(record.deleted_at.is_none());
    }
}
