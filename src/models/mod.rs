pub mod dependency;
pub mod entity;
pub mod kind;

pub use dependency::{DependencyGraph, DependencyRecord};
pub use entity::{Candidate, EntityDraft, EntityRecord, EntityUpdate};
pub use kind::EntityKind;
