//! CLI command handlers.

pub mod entity;
pub mod plugin;

use serde::Serialize;

use crate::cli::output::{output_json, print_outcome_status, OutputMode};
use crate::outcome::OpResult;

/// Print an operation result in the requested mode.
///
/// In human mode the status line comes first, then `human` renders the value.
pub(crate) fn report<T: Serialize>(result: &OpResult<T>, mode: OutputMode, human: impl FnOnce(&T)) {
    match mode {
        OutputMode::Json => output_json(result),
        OutputMode::Human => {
            print_outcome_status(result);
            if let Some(value) = &result.value {
                human(value);
            }
        }
    }
}
