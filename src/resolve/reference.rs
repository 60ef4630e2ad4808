use serde::Serialize;
use uuid::Uuid;

use crate::models::EntityRecord;

/// Where a resolution currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionState {
    AwaitingToken,
    Searching,
    Disambiguating,
    Confirming,
    Resolved,
    NotFound,
    Cancelled,
}

impl ResolutionState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ResolutionState::Resolved | ResolutionState::NotFound | ResolutionState::Cancelled
        )
    }
}

/// One resolution attempt. `resolved_id` is present exactly when the state is `Resolved`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityReference {
    token: String,
    resolved_id: Option<Uuid>,
    state: ResolutionState,
}

impl EntityReference {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            resolved_id: None,
            state: ResolutionState::AwaitingToken,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn resolved_id(&self) -> Option<Uuid> {
        self.resolved_id
    }

    pub fn state(&self) -> ResolutionState {
        self.state
    }

    pub(crate) fn set_token(&mut self, token: impl Into<String>) {
        self.token = token.into();
    }

    /// Move to any non-resolved state, dropping a previous resolution.
    /// Returning to `AwaitingToken` clears the token.
    pub(crate) fn enter(&mut self, state: ResolutionState) {
        if state != self.state {
            tracing::debug!(from = ?self.state, to = ?state, token = %self.token, "resolution transition");
        }
        debug_assert!(state != ResolutionState::Resolved, "use mark_resolved");
        if state == ResolutionState::AwaitingToken {
            self.token.clear();
        }
        self.state = state;
        self.resolved_id = None;
    }

    pub(crate) fn mark_resolved(&mut self, id: Uuid) {
        tracing::debug!(from = ?self.state, %id, "resolution complete");
        self.state = ResolutionState::Resolved;
        self.resolved_id = Some(id);
    }
}

/// A finished resolution together with the loaded entity.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedEntity {
    pub reference: EntityReference,
    pub entity: EntityRecord,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolved_id_tracks_state() {
        let mut reference = EntityReference::new("Dragon");
        assert_eq!(reference.state(), ResolutionState::AwaitingToken);
        assert!(reference.resolved_id().is_none());

        let id = Uuid::new_v4();
        reference.mark_resolved(id);
        assert_eq!(reference.state(), ResolutionState::Resolved);
        assert_eq!(reference.resolved_id(), Some(id));

        reference.enter(ResolutionState::Searching);
        assert!(reference.resolved_id().is_none());
    }

    #[test]
    fn test_terminal_states() {
        assert!(ResolutionState::Resolved.is_terminal());
        assert!(ResolutionState::NotFound.is_terminal());
        assert!(ResolutionState::Cancelled.is_terminal());
        assert!(!ResolutionState::Disambiguating.is_terminal());
    }
}
