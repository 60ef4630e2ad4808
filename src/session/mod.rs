mod state;

pub use state::{SessionState, SessionStateManager, MAX_RECENT};
