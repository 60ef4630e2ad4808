pub mod local;
pub mod traits;

pub use local::LocalStore;
pub use traits::{PersistenceManager, ScopeFilter, SearchProvider};
