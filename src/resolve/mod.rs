//! Turning an operator-supplied token into a confirmed, permission-checked entity.

pub mod machine;
pub mod reference;

pub use crate::repository::ScopeFilter;
pub use machine::ReferenceResolver;
pub use reference::{EntityReference, ResolutionState, ResolvedEntity};

/// Operation name that skips the confirmation step.
pub const VIEW_OPERATION: &str = "view";

/// Operation name used when linking an existing entity as a dependency.
pub const USE_AS_DEPENDENCY: &str = "use as dependency";
