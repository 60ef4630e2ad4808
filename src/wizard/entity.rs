use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::WizardContext;
use crate::dependency::{DependencyGraphBuilder, DependencySource, ParentRef, TaskFrame, TaskStack};
use crate::interact::{is_cancel, ConfirmationGate};
use crate::models::{
    Candidate, DependencyGraph, DependencyRecord, EntityDraft, EntityKind, EntityRecord,
    EntityUpdate,
};
use crate::outcome::OpResult;
use crate::repository::ScopeFilter;
use crate::resolve::{ReferenceResolver, ResolvedEntity, USE_AS_DEPENDENCY, VIEW_OPERATION};
use crate::StarError;

/// Wizard for one entity kind.
#[derive(Clone)]
pub struct EntityWizard {
    kind: EntityKind,
    ctx: WizardContext,
}

impl EntityWizard {
    pub fn new(kind: EntityKind, ctx: WizardContext) -> Self {
        Self { kind, ctx }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    fn resolver(&self) -> ReferenceResolver<'_> {
        ReferenceResolver::new(
            self.kind,
            self.ctx.provider.as_ref(),
            self.ctx.prompter.as_ref(),
            self.ctx.renderer.as_ref(),
            self.ctx.caller_id,
        )
    }

    fn scope(&self, mine: bool) -> ScopeFilter {
        if mine {
            ScopeFilter::owned_by(self.ctx.caller_id)
        } else {
            ScopeFilter::global()
        }
    }

    /// One wizard per kind this kind may depend on, in declared order.
    fn dependency_slots(&self) -> Vec<Arc<dyn DependencySource>> {
        self.kind
            .dependency_kinds()
            .iter()
            .map(|kind| {
                Arc::new(EntityWizard::new(*kind, self.ctx.clone())) as Arc<dyn DependencySource>
            })
            .collect()
    }

    /// Text prompt where the sentinel cancels.
    fn ask_field(&self, question: &str) -> Result<String, StarError> {
        let answer = self.ctx.prompter.ask_text(question)?;
        if is_cancel(&answer) {
            return Err(StarError::UserCancelled);
        }
        Ok(answer.trim().to_string())
    }

    /// Create a new entity, then offer to attach its dependencies.
    pub async fn create(&self) -> OpResult<EntityRecord> {
        let mut stack = TaskStack::new(self.ctx.max_depth);
        match self.create_in(&mut stack, None).await {
            Ok((record, deps)) => {
                let mut result = OpResult::ok(record);
                result.message = format!("{} Successfully Created", self.kind);
                if let Some(deps) = deps.filter(|d| d.is_error || d.is_warning) {
                    result.is_warning = true;
                    result.message = format!("{}, but adding dependencies reported: {}", result.message, deps.message);
                }
                result
            }
            Err(e) => OpResult::error(&e),
        }
    }

    async fn create_in(
        &self,
        stack: &mut TaskStack,
        parent_id: Option<Uuid>,
    ) -> Result<(EntityRecord, Option<OpResult<DependencyGraph>>), StarError> {
        stack.push(TaskFrame {
            kind: self.kind,
            parent_id,
        })?;
        let created = self.create_frame(stack).await;
        stack.pop();
        created
    }

    async fn create_frame(
        &self,
        stack: &mut TaskStack,
    ) -> Result<(EntityRecord, Option<OpResult<DependencyGraph>>), StarError> {
        let name = loop {
            let name = self.ask_field(&format!("What is the name of the {}?", self.kind))?;
            if !name.is_empty() {
                break name;
            }
            self.ctx.renderer.warning("The name cannot be empty.");
        };
        let description =
            self.ask_field(&format!("What is the description of the {}?", self.kind))?;

        self.ctx
            .renderer
            .working(&format!("Creating {}...", self.kind));
        let record = self
            .ctx
            .persistence
            .create(EntityDraft {
                kind: self.kind,
                name,
                description,
                owner_id: self.ctx.caller_id,
            })
            .await?;
        self.ctx.renderer.success(&format!(
            "{} '{}' created with id {}",
            self.kind, record.name, record.id
        ));

        let slots = self.dependency_slots();
        if slots.is_empty() {
            return Ok((record, None));
        }

        let parent = ParentRef {
            id: record.id,
            name: record.name.clone(),
            kind: self.kind,
        };
        let deps = DependencyGraphBuilder::new(
            self.ctx.prompter.as_ref(),
            self.ctx.renderer.as_ref(),
            self.ctx.persistence.as_ref(),
        )
        .attach_dependencies(&parent, &slots, stack)
        .await;

        let record = self
            .ctx
            .provider
            .load_by_id(record.id)
            .await?
            .unwrap_or(record);
        Ok((record, Some(deps)))
    }

    /// Find an entity and display it.
    pub async fn show(&self, token: &str) -> OpResult<ResolvedEntity> {
        self.resolver()
            .resolve(token, ScopeFilter::global(), VIEW_OPERATION)
            .await
    }

    pub async fn list(&self, mine: bool) -> OpResult<Vec<Candidate>> {
        self.ctx
            .provider
            .list_all(self.kind, self.scope(mine))
            .await
            .into()
    }

    pub async fn search(&self, term: &str, mine: bool) -> OpResult<Vec<Candidate>> {
        let term = if term.trim().is_empty() {
            match self.ask_field(&format!(
                "What is the name of the {} you wish to search for?",
                self.kind
            )) {
                Ok(term) => term,
                Err(e) => return OpResult::error(&e),
            }
        } else {
            term.trim().to_string()
        };

        self.ctx
            .provider
            .search(self.kind, &term, self.scope(mine))
            .await
            .into()
    }

    /// Resolve one of the caller's own entities and offer to edit its name and description.
    ///
    /// Nothing is written unless a field actually changed; that case is a warning.
    pub async fn update(&self, token: &str) -> OpResult<EntityRecord> {
        match self.try_update(token).await {
            Ok((entity, false)) => OpResult::warning(
                entity,
                format!("No changes were made to the {}", self.kind),
            ),
            Ok((entity, true)) => {
                OpResult::ok(entity).with_message(format!("{} Successfully Updated", self.kind))
            }
            Err(e) => OpResult::error(&e),
        }
    }

    async fn try_update(&self, token: &str) -> Result<(EntityRecord, bool), StarError> {
        let entity = self
            .resolver()
            .try_resolve(token, self.scope(true), "update")
            .await?
            .entity;

        let gate = ConfirmationGate::new(self.ctx.prompter.as_ref());
        let mut changes = EntityUpdate::default();

        if gate.confirm(&format!(
            "Do you wish to update the {} Name? (currently is {}).",
            self.kind, entity.name
        ))? {
            let name = loop {
                let name = self.ask_field(&format!("What is the new name of the {}?", self.kind))?;
                if !name.is_empty() {
                    break name;
                }
                self.ctx.renderer.warning("The name cannot be empty.");
            };
            changes.name = Some(name).filter(|n| *n != entity.name);
        }

        if gate.confirm(&format!(
            "Do you wish to update the {} Description? (currently is {}).",
            self.kind, entity.description
        ))? {
            let description =
                self.ask_field(&format!("What is the new description of the {}?", self.kind))?;
            changes.description = Some(description).filter(|d| *d != entity.description);
        }

        if changes.is_empty() {
            return Ok((entity, false));
        }

        self.ctx
            .renderer
            .working(&format!("Saving {}...", self.kind));
        let updated = self
            .ctx
            .persistence
            .update(entity.id, changes)
            .await?
            .ok_or_else(|| StarError::NoMatch {
                entity: self.kind.to_string(),
            })?;
        self.ctx.renderer.display_detail(&updated);
        Ok((updated, true))
    }

    /// Resolve one of the caller's own entities, confirm, and soft-delete it.
    pub async fn delete(&self, token: &str) -> OpResult<EntityRecord> {
        self.try_delete(token).await.into()
    }

    async fn try_delete(&self, token: &str) -> Result<EntityRecord, StarError> {
        let resolved = self
            .resolver()
            .try_resolve(token, self.scope(true), "delete")
            .await?;

        let deleted = self
            .ctx
            .persistence
            .delete(resolved.entity.id)
            .await?
            .ok_or_else(|| StarError::NoMatch {
                entity: self.kind.to_string(),
            })?;
        info!(id = %deleted.id, kind = self.kind.slug(), "Entity deleted");
        self.ctx
            .renderer
            .success(&format!("{} Successfully Deleted", self.kind));
        Ok(deleted)
    }

    /// Resolve one of the caller's own entities and run the dependency builder on it.
    pub async fn add_dependency(&self, token: &str) -> OpResult<DependencyGraph> {
        let parent = match self
            .resolver()
            .try_resolve(token, self.scope(true), "add a dependency to")
            .await
        {
            Ok(resolved) => resolved.entity,
            Err(e) => return OpResult::error(&e),
        };

        let slots = self.dependency_slots();
        if slots.is_empty() {
            return OpResult::warning(
                DependencyGraph::new(parent.id),
                format!("A {} cannot have dependencies", self.kind),
            );
        }

        let mut stack = TaskStack::new(self.ctx.max_depth);
        DependencyGraphBuilder::new(
            self.ctx.prompter.as_ref(),
            self.ctx.renderer.as_ref(),
            self.ctx.persistence.as_ref(),
        )
        .attach_dependencies(
            &ParentRef {
                id: parent.id,
                name: parent.name,
                kind: self.kind,
            },
            &slots,
            &mut stack,
        )
        .await
    }

    /// Resolve one of the caller's own entities and detach one numbered dependency.
    pub async fn remove_dependency(&self, token: &str) -> OpResult<DependencyRecord> {
        self.try_remove_dependency(token).await.into()
    }

    async fn try_remove_dependency(&self, token: &str) -> Result<DependencyRecord, StarError> {
        let parent = self
            .resolver()
            .try_resolve(token, self.scope(true), "remove a dependency from")
            .await?
            .entity;

        if parent.dependencies.is_empty() {
            return Err(StarError::NoMatch {
                entity: format!("dependency on this {}", self.kind),
            });
        }

        let mut rows = Vec::with_capacity(parent.dependencies.len());
        for dep in &parent.dependencies {
            let name = match self.ctx.provider.load_by_id(dep.entity_id).await? {
                Some(child) => child.name,
                None => "(deleted)".to_string(),
            };
            rows.push(Candidate {
                id: dep.entity_id,
                display_name: format!("{}: {}", dep.dependency_type, name),
                owner_id: parent.owner_id,
            });
        }
        self.ctx.renderer.display_list(self.kind, &rows, true);

        let max = i64::try_from(rows.len()).unwrap_or(i64::MAX);
        let chosen = loop {
            let number = self.ctx.prompter.ask_int(
                "What is the number of the dependency you wish to remove?",
                1,
                max,
            )?;
            match usize::try_from(number)
                .ok()
                .filter(|n| *n >= 1)
                .and_then(|n| parent.dependencies.get(n - 1))
            {
                Some(dep) => break dep.clone(),
                None => self
                    .ctx
                    .renderer
                    .error("Invalid number entered. Please try again."),
            }
        };

        let gate = ConfirmationGate::new(self.ctx.prompter.as_ref());
        if !gate.confirm(&format!(
            "Please confirm you wish to remove this dependency from the {}?",
            self.kind
        ))? {
            return Err(StarError::UserCancelled);
        }

        if !self
            .ctx
            .persistence
            .remove_dependency(parent.id, chosen.entity_id)
            .await?
        {
            return Err(StarError::NoMatch {
                entity: "dependency".to_string(),
            });
        }
        self.ctx.renderer.success("Dependency Successfully Removed");
        Ok(chosen)
    }
}

#[async_trait]
impl DependencySource for EntityWizard {
    fn dependency_type(&self) -> &str {
        self.kind.slug()
    }

    fn label(&self) -> &str {
        self.kind.display_name()
    }

    async fn create(&self, parent: &ParentRef, stack: &mut TaskStack) -> Result<Uuid, StarError> {
        let (record, deps) = self.create_in(stack, Some(parent.id)).await?;
        if let Some(deps) = deps.filter(|d| d.is_error || d.is_warning) {
            self.ctx.renderer.warning(&format!(
                "{} '{}' was created, but adding its dependencies reported: {}",
                self.kind, record.name, deps.message
            ));
        }
        Ok(record.id)
    }

    async fn resolve(&self, parent: &ParentRef) -> Result<Uuid, StarError> {
        let resolved = self
            .resolver()
            .try_resolve("", ScopeFilter::global(), USE_AS_DEPENDENCY)
            .await?;
        if resolved.entity.id == parent.id {
            return Err(StarError::Backend(format!(
                "A {} cannot depend on itself",
                self.kind
            )));
        }
        Ok(resolved.entity.id)
    }
}
