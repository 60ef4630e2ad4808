use uuid::Uuid;

use crate::models::EntityKind;
use crate::StarError;

pub const DEFAULT_MAX_DEPTH: usize = 16;

/// One creation in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFrame {
    pub kind: EntityKind,
    pub parent_id: Option<Uuid>,
}

/// Explicit stack of nested creations.
///
/// A creation wizard that adds a dependency which itself has to be created
/// pushes a frame instead of recursing without limit.
#[derive(Debug, Clone)]
pub struct TaskStack {
    frames: Vec<TaskFrame>,
    max_depth: usize,
}

impl Default for TaskStack {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl TaskStack {
    pub fn new(max_depth: usize) -> Self {
        Self {
            frames: Vec::new(),
            max_depth,
        }
    }

    pub fn push(&mut self, frame: TaskFrame) -> Result<(), StarError> {
        if self.frames.len() >= self.max_depth {
            return Err(StarError::DepthExceeded {
                max: self.max_depth,
            });
        }
        tracing::debug!(kind = frame.kind.slug(), depth = self.frames.len() + 1, "creation started");
        self.frames.push(frame);
        Ok(())
    }

    pub fn pop(&mut self) -> Option<TaskFrame> {
        self.frames.pop()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn current(&self) -> Option<&TaskFrame> {
        self.frames.last()
    }
}
