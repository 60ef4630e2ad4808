//! Scripted operator input and a renderer that records what was shown.

use parking_lot::Mutex;
use std::collections::VecDeque;
use uuid::Uuid;

use starnet::interact::{Prompter, Renderer, CANCEL_TOKEN};
use starnet::models::{Candidate, EntityKind, EntityRecord};
use starnet::StarError;

/// One scripted answer, consumed in order by whichever prompt comes next.
#[derive(Debug, Clone)]
pub enum Answer {
    Yes,
    No,
    Text(String),
    Int(i64),
    /// The cancellation sentinel.
    Exit,
}

impl Answer {
    pub fn text(s: impl Into<String>) -> Self {
        Answer::Text(s.into())
    }
}

/// Prompter that replays a fixed script and panics when the script and the
/// prompt disagree, so tests fail at the first unexpected question.
pub struct ScriptedPrompter {
    answers: Mutex<VecDeque<Answer>>,
    asked: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            asked: Mutex::new(Vec::new()),
        }
    }

    /// Every question asked so far, in order.
    pub fn questions(&self) -> Vec<String> {
        self.asked.lock().clone()
    }

    pub fn remaining(&self) -> usize {
        self.answers.lock().len()
    }

    fn next(&self, question: &str) -> Answer {
        self.asked.lock().push(question.to_string());
        self.answers
            .lock()
            .pop_front()
            .unwrap_or_else(|| panic!("script ran out of answers at: {}", question))
    }
}

impl Prompter for ScriptedPrompter {
    fn ask_yes_no(&self, question: &str) -> Result<bool, StarError> {
        match self.next(question) {
            Answer::Yes => Ok(true),
            Answer::No => Ok(false),
            Answer::Exit => Err(StarError::UserCancelled),
            other => panic!("expected yes/no for '{}', script had {:?}", question, other),
        }
    }

    fn ask_text(&self, question: &str) -> Result<String, StarError> {
        match self.next(question) {
            Answer::Text(text) => Ok(text),
            Answer::Exit => Ok(CANCEL_TOKEN.to_string()),
            other => panic!("expected text for '{}', script had {:?}", question, other),
        }
    }

    fn ask_int(&self, question: &str, _min: i64, _max: i64) -> Result<i64, StarError> {
        match self.next(question) {
            Answer::Int(n) => Ok(n),
            Answer::Exit => Err(StarError::UserCancelled),
            other => panic!("expected a number for '{}', script had {:?}", question, other),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    Detail(Uuid),
    List { count: usize, numbered: bool },
    Working(String),
    Warning(String),
    Error(String),
    Success(String),
}

#[derive(Default)]
pub struct RecordingRenderer {
    events: Mutex<Vec<Rendered>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Rendered> {
        self.events.lock().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                Rendered::Error(m) => Some(m.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                Rendered::Warning(m) => Some(m.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn details(&self) -> Vec<Uuid> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                Rendered::Detail(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: Rendered) {
        self.events.lock().push(event);
    }
}

impl Renderer for RecordingRenderer {
    fn display_detail(&self, entity: &EntityRecord) {
        self.push(Rendered::Detail(entity.id));
    }

    fn display_list(&self, _kind: EntityKind, candidates: &[Candidate], numbered: bool) {
        self.push(Rendered::List {
            count: candidates.len(),
            numbered,
        });
    }

    fn working(&self, message: &str) {
        self.push(Rendered::Working(message.to_string()));
    }

    fn warning(&self, message: &str) {
        self.push(Rendered::Warning(message.to_string()));
    }

    fn error(&self, message: &str) {
        self.push(Rendered::Error(message.to_string()));
    }

    fn success(&self, message: &str) {
        self.push(Rendered::Success(message.to_string()));
    }
}
