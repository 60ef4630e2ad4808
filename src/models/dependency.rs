use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A link from a parent entity to a child it depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyRecord {
    /// Dependency type tag (the child's kind slug, e.g. "nft").
    #[serde(rename = "type")]
    pub dependency_type: String,
    pub entity_id: Uuid,
}

impl DependencyRecord {
    pub fn new(dependency_type: impl Into<String>, entity_id: Uuid) -> Self {
        Self {
            dependency_type: dependency_type.into(),
            entity_id,
        }
    }
}

/// Dependencies gathered during one parent's creation session.
///
/// Append-only: records can be pushed and read, never removed or reordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyGraph {
    parent_id: Uuid,
    records: Vec<DependencyRecord>,
}

impl DependencyGraph {
    pub fn new(parent_id: Uuid) -> Self {
        Self {
            parent_id,
            records: Vec::new(),
        }
    }

    pub fn parent_id(&self) -> Uuid {
        self.parent_id
    }

    pub fn push(&mut self, record: DependencyRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[DependencyRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
