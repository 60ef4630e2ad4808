//! Terminal-backed prompter and renderer.

use colored::Colorize;
use parking_lot::Mutex;
use std::io::{self, BufRead, Write};

use super::{is_cancel, Prompter, Renderer};
use crate::cli::output::{
    format_header, format_kv, format_success, format_table, print_error, print_warning, OutputMode,
};
use crate::models::{Candidate, EntityKind, EntityRecord};
use crate::StarError;

/// Where prompts and rendered views go. JSON output keeps stdout for the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleStream {
    Stdout,
    Stderr,
}

impl ConsoleStream {
    pub fn for_mode(mode: OutputMode) -> Self {
        match mode {
            OutputMode::Human => ConsoleStream::Stdout,
            OutputMode::Json => ConsoleStream::Stderr,
        }
    }

    fn writer(self) -> Box<dyn Write + Send> {
        match self {
            ConsoleStream::Stdout => Box::new(io::stdout()),
            ConsoleStream::Stderr => Box::new(io::stderr()),
        }
    }
}

/// Line-oriented prompter over any reader/writer pair.
pub struct ConsolePrompter {
    input: Mutex<Box<dyn BufRead + Send>>,
    output: Mutex<Box<dyn Write + Send>>,
}

impl ConsolePrompter {
    /// Reads stdin; writes to the stream `mode` calls for.
    pub fn stdio(mode: OutputMode) -> Self {
        Self::new(
            io::BufReader::new(io::stdin()),
            ConsoleStream::for_mode(mode).writer(),
        )
    }

    pub fn new(input: impl BufRead + Send + 'static, output: impl Write + Send + 'static) -> Self {
        Self {
            input: Mutex::new(Box::new(input)),
            output: Mutex::new(Box::new(output)),
        }
    }

    /// Print `prompt` and read one trimmed line. End of input cancels.
    fn read_line(&self, prompt: &str) -> Result<String, StarError> {
        {
            let mut out = self.output.lock();
            write!(out, "{} ", prompt)?;
            out.flush()?;
        }

        let mut line = String::new();
        let read = self.input.lock().read_line(&mut line)?;
        if read == 0 {
            return Err(StarError::UserCancelled);
        }
        Ok(line.trim().to_string())
    }

    fn say(&self, message: &str) -> Result<(), StarError> {
        let mut out = self.output.lock();
        writeln!(out, "{}", message)?;
        Ok(())
    }
}

impl Prompter for ConsolePrompter {
    fn ask_yes_no(&self, question: &str) -> Result<bool, StarError> {
        loop {
            let answer = self.read_line(&format!("{} (Y/N):", question))?;
            if is_cancel(&answer) {
                return Err(StarError::UserCancelled);
            }
            match answer.to_lowercase().as_str() {
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => self.say("Please enter Y or N.")?,
            }
        }
    }

    fn ask_text(&self, question: &str) -> Result<String, StarError> {
        self.read_line(question)
    }

    fn ask_int(&self, question: &str, min: i64, max: i64) -> Result<i64, StarError> {
        loop {
            let answer = self.read_line(&format!("{} ({}-{}):", question, min, max))?;
            if is_cancel(&answer) {
                return Err(StarError::UserCancelled);
            }
            match answer.parse::<i64>() {
                Ok(n) => return Ok(n),
                Err(_) => self.say("Invalid number entered. Please try again.")?,
            }
        }
    }
}

/// Renders through the shared CLI output helpers.
///
/// Warnings and errors always go to stderr; everything else goes to `output`.
pub struct ConsoleRenderer {
    output: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleRenderer {
    pub fn for_mode(mode: OutputMode) -> Self {
        Self::new(ConsoleStream::for_mode(mode).writer())
    }

    pub fn new(output: impl Write + Send + 'static) -> Self {
        Self {
            output: Mutex::new(Box::new(output)),
        }
    }

    fn emit(&self, text: &str) {
        let mut out = self.output.lock();
        // Write failures are ignored.
        let _ = writeln!(out, "{}", text);
        let _ = out.flush();
    }
}

impl Renderer for ConsoleRenderer {
    fn display_detail(&self, entity: &EntityRecord) {
        let mut lines = vec![
            format_header(&format!("{}: {}", entity.kind, entity.name)),
            format_kv("Id", &entity.id.to_string()),
        ];
        if !entity.description.is_empty() {
            lines.push(format_kv("Description", &entity.description));
        }
        lines.push(format_kv("Created By", &entity.owner_id.to_string()));
        lines.push(format_kv(
            "Created",
            &entity.created_at.format("%Y-%m-%d %H:%M").to_string(),
        ));
        lines.push(format_kv("Version", &entity.version.to_string()));
        if !entity.dependencies.is_empty() {
            let deps: Vec<String> = entity
                .dependencies
                .iter()
                .map(|d| format!("{} {}", d.dependency_type, d.entity_id))
                .collect();
            lines.push(format_kv("Dependencies", &deps.join(", ")));
        }
        self.emit(&lines.join("\n"));
    }

    fn display_list(&self, kind: EntityKind, candidates: &[Candidate], numbered: bool) {
        self.emit(&format_header(&format!("{} ({})", kind, candidates.len())));
        let table = if numbered {
            let rows = candidates
                .iter()
                .enumerate()
                .map(|(i, c)| {
                    vec![
                        (i + 1).to_string(),
                        c.display_name.clone(),
                        c.id.to_string(),
                    ]
                })
                .collect();
            format_table(&["#", "Name", "Id"], rows)
        } else {
            let rows = candidates
                .iter()
                .map(|c| vec![c.display_name.clone(), c.id.to_string(), c.owner_id.to_string()])
                .collect();
            format_table(&["Name", "Id", "Created By"], rows)
        };
        self.emit(&table);
    }

    fn working(&self, message: &str) {
        self.emit(&message.dimmed().to_string());
    }

    fn warning(&self, message: &str) {
        print_warning(message);
    }

    fn error(&self, message: &str) {
        print_error(message);
    }

    fn success(&self, message: &str) {
        self.emit(&format_success(message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompter(script: &str) -> ConsolePrompter {
        ConsolePrompter::new(Cursor::new(script.as_bytes().to_vec()), io::sink())
    }

    #[test]
    fn test_yes_no_reprompts_until_recognised() {
        let p = prompter("maybe\nY\n");
        assert!(p.ask_yes_no("Continue?").unwrap());
    }

    #[test]
    fn test_sentinel_and_eof_cancel() {
        let p = prompter("exit\n");
        assert!(matches!(p.ask_yes_no("Continue?"), Err(StarError::UserCancelled)));

        let p = prompter("");
        assert!(matches!(p.ask_text("Name:"), Err(StarError::UserCancelled)));
    }

    #[test]
    fn test_ask_int_skips_non_numbers_but_not_range() {
        let p = prompter("two\n7\n");
        assert_eq!(p.ask_int("Number?", 1, 3).unwrap(), 7);
    }

    #[derive(Clone, Default)]
    struct Capture(std::sync::Arc<Mutex<Vec<u8>>>);

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_json_mode_moves_interactive_output_to_stderr() {
        assert_eq!(ConsoleStream::for_mode(OutputMode::Json), ConsoleStream::Stderr);
        assert_eq!(ConsoleStream::for_mode(OutputMode::Human), ConsoleStream::Stdout);
    }

    #[test]
    fn test_renderer_writes_views_to_its_stream() {
        let capture = Capture::default();
        let renderer = ConsoleRenderer::new(capture.clone());

        renderer.working("Searching Quests...");
        renderer.display_list(
            EntityKind::Quest,
            &[Candidate {
                id: uuid::Uuid::new_v4(),
                display_name: "Dragon Quest".to_string(),
                owner_id: uuid::Uuid::new_v4(),
            }],
            true,
        );
        renderer.success("Quest Successfully Created");

        let text = String::from_utf8(capture.0.lock().clone()).unwrap();
        assert!(text.contains("Searching Quests..."));
        assert!(text.contains("Dragon Quest"));
        assert!(text.contains("Quest Successfully Created"));
    }

    #[test]
    fn test_ask_text_returns_raw_sentinel() {
        let p = prompter("exit\n");
        assert_eq!(p.ask_text("Name:").unwrap(), "exit");
    }
}
