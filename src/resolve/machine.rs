//! The resolution state machine.
//!
//! Every prompt loop of the interactive find flow is one variant of [`Step`];
//! each transition is a single method call, so the exits are enumerable.

use tracing::warn;
use uuid::Uuid;

use super::reference::{EntityReference, ResolutionState, ResolvedEntity};
use super::VIEW_OPERATION;
use crate::interact::{is_cancel, ConfirmationGate, Prompter, Renderer};
use crate::models::{Candidate, EntityKind, EntityRecord};
use crate::outcome::OpResult;
use crate::repository::{ScopeFilter, SearchProvider};
use crate::StarError;

#[derive(Debug)]
enum Step {
    AwaitingToken,
    Searching(String),
    Disambiguating(Vec<Candidate>),
    /// By-id load; reported as `Searching`.
    Loading(Uuid),
    Confirming(EntityRecord),
    Resolved(EntityRecord),
    NotFound,
    Cancelled,
}

impl Step {
    fn state(&self) -> ResolutionState {
        match self {
            Step::AwaitingToken => ResolutionState::AwaitingToken,
            Step::Searching(_) | Step::Loading(_) => ResolutionState::Searching,
            Step::Disambiguating(_) => ResolutionState::Disambiguating,
            Step::Confirming(_) => ResolutionState::Confirming,
            Step::Resolved(_) => ResolutionState::Resolved,
            Step::NotFound => ResolutionState::NotFound,
            Step::Cancelled => ResolutionState::Cancelled,
        }
    }

    /// Classify a raw token. A nil UUID counts as no token at all.
    fn from_token(token: &str) -> Step {
        let token = token.trim();
        if token.is_empty() {
            return Step::AwaitingToken;
        }
        if is_cancel(token) {
            return Step::Cancelled;
        }
        match Uuid::parse_str(token) {
            Ok(id) if id.is_nil() => Step::AwaitingToken,
            Ok(id) => Step::Loading(id),
            Err(_) => Step::Searching(token.to_string()),
        }
    }
}

/// Candidate at 1-based `number`, if in range.
fn select(candidates: &[Candidate], number: i64) -> Option<&Candidate> {
    usize::try_from(number)
        .ok()
        .filter(|n| *n >= 1)
        .and_then(|n| candidates.get(n - 1))
}

/// A prompt answered with the sentinel ends the resolution as `Cancelled`.
fn cancel_on_sentinel(step: Result<Step, StarError>) -> Result<Step, StarError> {
    match step {
        Err(StarError::UserCancelled) => Ok(Step::Cancelled),
        other => other,
    }
}

/// Resolves tokens for one entity kind on behalf of one caller.
pub struct ReferenceResolver<'a> {
    kind: EntityKind,
    provider: &'a dyn SearchProvider,
    prompter: &'a dyn Prompter,
    renderer: &'a dyn Renderer,
    caller_id: Uuid,
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(
        kind: EntityKind,
        provider: &'a dyn SearchProvider,
        prompter: &'a dyn Prompter,
        renderer: &'a dyn Renderer,
        caller_id: Uuid,
    ) -> Self {
        Self {
            kind,
            provider,
            prompter,
            renderer,
            caller_id,
        }
    }

    /// Resolve `token` to one entity of this resolver's kind.
    ///
    /// An empty token starts with the "do you know the id?" prompt. When
    /// `scope` requires ownership, entities created by someone else are
    /// refused and the operator is asked again.
    pub async fn resolve(
        &self,
        token: &str,
        scope: ScopeFilter,
        operation: &str,
    ) -> OpResult<ResolvedEntity> {
        self.try_resolve(token, scope, operation).await.into()
    }

    pub async fn try_resolve(
        &self,
        token: &str,
        scope: ScopeFilter,
        operation: &str,
    ) -> Result<ResolvedEntity, StarError> {
        let mut reference = EntityReference::new(token);
        let mut step = Step::from_token(token);

        loop {
            let state = step.state();
            if state != ResolutionState::Resolved {
                reference.enter(state);
            }

            step = match step {
                Step::Resolved(entity) => {
                    reference.mark_resolved(entity.id);
                    return Ok(ResolvedEntity { reference, entity });
                }
                Step::AwaitingToken => {
                    cancel_on_sentinel(self.await_token(&mut reference, scope, operation).await)?
                }
                Step::Searching(term) => self.search(&term, scope).await,
                Step::Disambiguating(candidates) => {
                    cancel_on_sentinel(self.disambiguate(candidates, operation))?
                }
                Step::Loading(id) => self.load(id, scope, operation).await,
                Step::Confirming(entity) => {
                    cancel_on_sentinel(self.confirm(entity, operation))?
                }
                Step::NotFound => {
                    return Err(StarError::NoMatch {
                        entity: self.kind.to_string(),
                    })
                }
                Step::Cancelled => return Err(StarError::UserCancelled),
            };
        }
    }

    async fn await_token(
        &self,
        reference: &mut EntityReference,
        scope: ScopeFilter,
        operation: &str,
    ) -> Result<Step, StarError> {
        let known = self.prompter.ask_yes_no(&format!(
            "Do you know the GUID/ID or Name of the {} you wish to {}?",
            self.kind, operation
        ))?;

        if !known {
            self.renderer.working(&format!("Loading {}s...", self.kind));
            match self.provider.list_all(self.kind, scope).await {
                Ok(candidates) if candidates.is_empty() => return Ok(Step::NotFound),
                Ok(candidates) => self.renderer.display_list(self.kind, &candidates, false),
                Err(e) => {
                    warn!(kind = self.kind.slug(), error = %e, "listing failed");
                    self.renderer.error(&e.to_string());
                }
            }
        }

        let token = self.prompter.ask_text(&format!(
            "What is the GUID/ID or Name of the {} you wish to {}?",
            self.kind, operation
        ))?;
        reference.set_token(token.trim());
        Ok(Step::from_token(&token))
    }

    async fn search(&self, term: &str, scope: ScopeFilter) -> Step {
        self.renderer.working(&format!("Searching {}s...", self.kind));

        match self.provider.search(self.kind, term, scope).await {
            Ok(mut candidates) => match candidates.len() {
                0 => {
                    self.renderer.warning(&format!("No {} Found!", self.kind));
                    Step::AwaitingToken
                }
                1 => Step::Loading(candidates.remove(0).id),
                _ => Step::Disambiguating(candidates),
            },
            Err(e) => {
                warn!(kind = self.kind.slug(), term, error = %e, "search failed");
                self.renderer.error(&format!("An error occurred searching: {}", e));
                Step::AwaitingToken
            }
        }
    }

    fn disambiguate(
        &self,
        candidates: Vec<Candidate>,
        operation: &str,
    ) -> Result<Step, StarError> {
        self.renderer.display_list(self.kind, &candidates, true);

        if !self.prompter.ask_yes_no("Are any of these correct?")? {
            return Ok(Step::AwaitingToken);
        }

        let max = i64::try_from(candidates.len()).unwrap_or(i64::MAX);
        let question = format!(
            "What is the number of the {} you wish to {}?",
            self.kind, operation
        );
        loop {
            let number = self.prompter.ask_int(&question, 1, max)?;
            match select(&candidates, number) {
                Some(candidate) => return Ok(Step::Loading(candidate.id)),
                None => self
                    .renderer
                    .error("Invalid number entered. Please try again."),
            }
        }
    }

    async fn load(&self, id: Uuid, scope: ScopeFilter, operation: &str) -> Step {
        self.renderer.working(&format!("Loading {}...", self.kind));

        let entity = match self.provider.load_by_id(id).await {
            Ok(Some(entity)) if entity.kind == self.kind => entity,
            Ok(_) => {
                self.renderer.warning(&format!("No {} Found!", self.kind));
                return Step::AwaitingToken;
            }
            Err(e) => {
                warn!(kind = self.kind.slug(), %id, error = %e, "load by id failed");
                self.renderer.error(&e.to_string());
                return Step::AwaitingToken;
            }
        };

        if scope.requires_ownership() && entity.owner_id != self.caller_id {
            let denied = StarError::PermissionDenied {
                operation: operation.to_string(),
                entity: self.kind.to_string(),
            };
            self.renderer.error(&denied.to_string());
            return Step::AwaitingToken;
        }

        self.renderer.display_detail(&entity);

        if operation == VIEW_OPERATION {
            Step::Resolved(entity)
        } else {
            Step::Confirming(entity)
        }
    }

    fn confirm(&self, entity: EntityRecord, operation: &str) -> Result<Step, StarError> {
        let gate = ConfirmationGate::new(self.prompter);

        if gate.confirm(&format!(
            "Please confirm you wish to {} this {}?",
            operation, self.kind
        ))? {
            return Ok(Step::Resolved(entity));
        }

        if gate.confirm(&format!(
            "Do you wish to search for another {}?",
            self.kind
        ))? {
            Ok(Step::AwaitingToken)
        } else {
            Ok(Step::Cancelled)
        }
    }
}
