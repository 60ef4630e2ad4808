use super::Prompter;
use crate::StarError;

/// Puts a pending mutation behind an explicit yes/no.
///
/// Refusal is an ordinary `false`, never an error; only the cancellation
/// sentinel surfaces as `UserCancelled`.
pub struct ConfirmationGate<'a> {
    prompter: &'a dyn Prompter,
}

impl<'a> ConfirmationGate<'a> {
    pub fn new(prompter: &'a dyn Prompter) -> Self {
        Self { prompter }
    }

    pub fn confirm(&self, question: &str) -> Result<bool, StarError> {
        self.prompter.ask_yes_no(question)
    }
}
