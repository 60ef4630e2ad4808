use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use super::stack::TaskStack;
use crate::interact::{ConfirmationGate, Prompter, Renderer};
use crate::models::{DependencyGraph, DependencyRecord, EntityKind};
use crate::outcome::OpResult;
use crate::repository::PersistenceManager;
use crate::StarError;

/// The entity whose dependencies are being gathered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentRef {
    pub id: Uuid,
    pub name: String,
    pub kind: EntityKind,
}

/// One allowed dependency type: how to create a new child and how to find an existing one.
#[async_trait]
pub trait DependencySource: Send + Sync {
    /// Tag stored in the dependency record.
    fn dependency_type(&self) -> &str;

    /// Name shown in prompts.
    fn label(&self) -> &str;

    /// Create a new child; nested creations go through `stack`.
    async fn create(&self, parent: &ParentRef, stack: &mut TaskStack) -> Result<Uuid, StarError>;

    /// Find an existing child to link.
    async fn resolve(&self, parent: &ParentRef) -> Result<Uuid, StarError>;
}

pub struct DependencyGraphBuilder<'a> {
    prompter: &'a dyn Prompter,
    renderer: &'a dyn Renderer,
    persistence: &'a dyn PersistenceManager,
}

impl<'a> DependencyGraphBuilder<'a> {
    pub fn new(
        prompter: &'a dyn Prompter,
        renderer: &'a dyn Renderer,
        persistence: &'a dyn PersistenceManager,
    ) -> Self {
        Self {
            prompter,
            renderer,
            persistence,
        }
    }

    /// Walk `slots` in order, offering to add children of each type, then
    /// persist everything that was attached.
    ///
    /// A child that fails to be created or resolved is reported and never
    /// recorded. Cancelling at a yes/no prompt stops gathering early; the
    /// records collected so far are still persisted and returned as a warning.
    pub async fn attach_dependencies(
        &self,
        parent: &ParentRef,
        slots: &[Arc<dyn DependencySource>],
        stack: &mut TaskStack,
    ) -> OpResult<DependencyGraph> {
        let mut graph = DependencyGraph::new(parent.id);
        let cancelled = match self.gather(parent, slots, stack, &mut graph).await {
            Ok(()) => false,
            Err(StarError::UserCancelled) => true,
            Err(e) => return OpResult::error(&e).with_value(DependencyGraph::new(parent.id)),
        };

        let (persisted, flushed) = self.flush(&graph).await;
        if let Err(e) = flushed {
            warn!(
                parent = %parent.id,
                persisted = persisted.len(),
                gathered = graph.len(),
                error = %e,
                "failed to persist dependencies"
            );
            let message = format!(
                "{} ({} of {} dependencies were saved)",
                e,
                persisted.len(),
                graph.len()
            );
            let mut result = OpResult::error(&e).with_value(persisted);
            result.message = message;
            return result;
        }

        if cancelled {
            return OpResult::warning(graph, StarError::UserCancelled.to_string());
        }

        let message = format!(
            "{} dependencies added to {} '{}'",
            graph.len(),
            parent.kind,
            parent.name
        );
        OpResult::ok(graph).with_message(message)
    }

    async fn gather(
        &self,
        parent: &ParentRef,
        slots: &[Arc<dyn DependencySource>],
        stack: &mut TaskStack,
        graph: &mut DependencyGraph,
    ) -> Result<(), StarError> {
        let gate = ConfirmationGate::new(self.prompter);

        for slot in slots {
            let mut question = format!(
                "Do you wish to add any {}s to this {} now? (You can always add more later).",
                slot.label(),
                parent.kind
            );

            while gate.confirm(&question)? {
                let exists = gate.confirm(&format!("Does the {} already exist?", slot.label()))?;

                let attached = if exists {
                    slot.resolve(parent).await
                } else {
                    slot.create(parent, stack).await
                };

                match attached {
                    Ok(child_id) => {
                        graph.push(DependencyRecord::new(slot.dependency_type(), child_id));
                        self.renderer
                            .success(&format!("{} {} attached", slot.label(), child_id));
                    }
                    Err(e) => {
                        warn!(
                            parent = %parent.id,
                            dependency_type = slot.dependency_type(),
                            error = %e,
                            "dependency not attached"
                        );
                        self.renderer
                            .error(&format!("Failed to add {}: {}", slot.label(), e));
                    }
                }

                question = format!(
                    "Do you wish to add another {} to this {}?",
                    slot.label(),
                    parent.kind
                );
            }
        }

        Ok(())
    }

    /// Persist records in order, stopping at the first failure.
    ///
    /// Returns the records that were written alongside the outcome.
    async fn flush(&self, graph: &DependencyGraph) -> (DependencyGraph, Result<(), StarError>) {
        let mut persisted = DependencyGraph::new(graph.parent_id());
        for record in graph.records() {
            if let Err(e) = self
                .persistence
                .add_dependency(graph.parent_id(), record)
                .await
            {
                return (persisted, Err(e));
            }
            persisted.push(record.clone());
        }
        if !persisted.is_empty() {
            info!(parent = %graph.parent_id(), count = persisted.len(), "dependencies persisted");
        }
        (persisted, Ok(()))
    }
}
