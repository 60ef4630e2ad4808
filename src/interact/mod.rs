//! Operator interaction seams: prompting, rendering and the confirmation gate.

pub mod console;
pub mod gate;

pub use console::{ConsolePrompter, ConsoleRenderer, ConsoleStream};
pub use gate::ConfirmationGate;

use crate::models::{Candidate, EntityKind, EntityRecord};
use crate::StarError;

/// Typed at any prompt to abandon the current operation.
pub const CANCEL_TOKEN: &str = "exit";

/// True when `input` is the cancellation sentinel.
pub fn is_cancel(input: &str) -> bool {
    input.trim().eq_ignore_ascii_case(CANCEL_TOKEN)
}

/// Operator input.
///
/// `ask_yes_no` and `ask_int` fail with `UserCancelled` when the operator types
/// the sentinel. `ask_text` returns raw text; callers decide what the sentinel
/// means in context. `ask_int` may return a value outside `[min, max]`, and
/// callers that need the range enforce it themselves.
pub trait Prompter: Send + Sync {
    fn ask_yes_no(&self, question: &str) -> Result<bool, StarError>;

    fn ask_text(&self, question: &str) -> Result<String, StarError>;

    fn ask_int(&self, question: &str, min: i64, max: i64) -> Result<i64, StarError>;
}

/// Operator-facing display.
pub trait Renderer: Send + Sync {
    fn display_detail(&self, entity: &EntityRecord);

    /// Render candidates; when `numbered`, rows are labelled 1..=N in slice order.
    fn display_list(&self, kind: EntityKind, candidates: &[Candidate], numbered: bool);

    /// Progress line for a backend call ("Searching...", "Loading...").
    fn working(&self, message: &str);

    fn warning(&self, message: &str);

    fn error(&self, message: &str);

    fn success(&self, message: &str);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_sentinel_ignores_case_and_padding() {
        assert!(is_cancel("exit"));
        assert!(is_cancel("  EXIT \n"));
        assert!(!is_cancel("exits"));
        assert!(!is_cancel(""));
    }
}
