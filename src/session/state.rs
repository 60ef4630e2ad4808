use crate::error::StarError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Most recent resolved entities kept in the session.
pub const MAX_RECENT: usize = 50;

/// Session state that persists across process restarts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    /// The operator's avatar id, generated on first run
    #[serde(default = "Uuid::new_v4")]
    pub avatar_id: Uuid,
    /// When the last session ended (None for new session)
    #[serde(default)]
    pub last_session: Option<DateTime<Utc>>,
    /// Recently resolved entity ids (most recent first)
    #[serde(default)]
    pub recent_accesses: Vec<Uuid>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            avatar_id: Uuid::new_v4(),
            last_session: None,
            recent_accesses: Vec::new(),
        }
    }
}

/// Manages session state persistence to disk.
pub struct SessionStateManager {
    /// Path to the session state JSON file
    state_path: PathBuf,
    /// Current session state
    state: Arc<RwLock<SessionState>>,
}

impl SessionStateManager {
    /// Load session state from disk or create a new default state.
    pub fn load_or_create(path: &Path) -> Result<Self, StarError> {
        let state = if path.exists() {
            let json = std::fs::read_to_string(path).map_err(|e| {
                StarError::Backend(format!("Failed to read session state: {}", e))
            })?;

            serde_json::from_str(&json).map_err(|e| {
                StarError::Backend(format!("Failed to parse session state: {}", e))
            })?
        } else {
            SessionState::default()
        };

        Ok(Self {
            state_path: path.to_path_buf(),
            state: Arc::new(RwLock::new(state)),
        })
    }

    /// Persist current state to disk.
    pub async fn save(&self) -> Result<(), StarError> {
        let state = self.state.read().await;
        let json = serde_json::to_string_pretty(&*state).map_err(|e| {
            StarError::Backend(format!("Failed to serialize session state: {}", e))
        })?;

        if let Some(parent) = self.state_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StarError::Backend(format!("Failed to create session directory: {}", e))
            })?;
        }

        std::fs::write(&self.state_path, json)
            .map_err(|e| StarError::Backend(format!("Failed to write session state: {}", e)))?;

        Ok(())
    }

    pub async fn avatar_id(&self) -> Uuid {
        self.state.read().await.avatar_id
    }

    /// Record a resolved entity.
    ///
    /// Moves the id to the front if already present. Keeps at most `MAX_RECENT`.
    pub async fn record_access(&self, entity_id: Uuid) {
        let mut state = self.state.write().await;
        state.recent_accesses.retain(|e| *e != entity_id);
        state.recent_accesses.insert(0, entity_id);
        state.recent_accesses.truncate(MAX_RECENT);
    }

    /// Up to `limit` most recent accesses.
    pub async fn get_recent(&self, limit: usize) -> Vec<Uuid> {
        let state = self.state.read().await;
        state.recent_accesses.iter().take(limit).copied().collect()
    }

    /// Mark the end of a session.
    pub async fn mark_session_end(&self) {
        let mut state = self.state.write().await;
        state.last_session = Some(Utc::now());
    }

    pub async fn get_last_session(&self) -> Option<DateTime<Utc>> {
        self.state.read().await.last_session
    }
}
