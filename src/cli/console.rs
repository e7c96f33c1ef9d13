use colored::*;
use std::io::{self, BufRead, Write};

use crate::tools::ReasoningSink;

/// Label printed before every reasoning fragment
pub const THINKING_LABEL: &str = "(AI Thinking):";
/// Label printed before the final command or failure reason
pub const ANSWER_LABEL: &str = "(AI Answer):";
/// Confirmation prompt shown before execution
pub const CONFIRM_PROMPT: &str = "Execute? Y/N: ";

/// Console handles all terminal I/O with colored formatting
///
/// Write errors are ignored: there is nowhere left to report them.
pub struct Console {
    out: Box<dyn Write + Send>,
    err: Box<dyn Write + Send>,
    thinking_color: Color,
    answer_color: Color,
}

impl Console {
    /// Create a console on stdout/stderr
    pub fn new() -> Self {
        Self::with_writers(Box::new(io::stdout()), Box::new(io::stderr()))
    }

    /// Create a console on arbitrary writers
    pub fn with_writers(out: Box<dyn Write + Send>, err: Box<dyn Write + Send>) -> Self {
        Self {
            out,
            err,
            thinking_color: Color::BrightBlack,
            answer_color: Color::Green,
        }
    }

    /// Print one reasoning fragment, followed by a blank line
    pub fn print_thinking(&mut self, thought: &str) {
        let _ = writeln!(
            self.out,
            "{} {}\n",
            THINKING_LABEL.color(self.thinking_color).bold(),
            thought.color(self.thinking_color)
        );
        let _ = self.out.flush();
    }

    /// Print the generated command
    pub fn print_answer(&mut self, cmd: &str) {
        let _ = writeln!(
            self.out,
            "{} {}",
            ANSWER_LABEL.color(self.answer_color).bold(),
            cmd.color(self.answer_color).bold()
        );
    }

    /// Print why no command could be generated
    pub fn print_failure(&mut self, reason: &str) {
        let _ = writeln!(self.out, "{} {}", ANSWER_LABEL.yellow().bold(), reason);
        let _ = writeln!(self.out, "{}", "Generate failed".red().bold());
    }

    /// Print an error message
    pub fn print_error(&mut self, error: &str) {
        let _ = writeln!(self.err, "{} {}", "Error:".red().bold(), error);
        let _ = self.err.flush();
    }

    /// Tell the user there is nothing to do
    pub fn print_no_prompt(&mut self) {
        let _ = writeln!(self.out, "{}", "No prompts".yellow());
        let _ = self.out.flush();
    }

    /// Ask whether to run the command; only `y`/`Y` counts as yes
    ///
    /// End of input or a read error is a no.
    pub fn ask_confirmation(&mut self, input: &mut dyn BufRead) -> bool {
        let _ = write!(self.out, "{}", CONFIRM_PROMPT.bold());
        let _ = self.out.flush();

        let mut line = String::new();
        match input.read_line(&mut line) {
            Ok(0) => {
                tracing::debug!("No confirmation input (EOF)");
                false
            }
            Ok(_) => is_affirmative(&line),
            Err(e) => {
                tracing::warn!("Failed to read confirmation: {}", e);
                false
            }
        }
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

impl ReasoningSink for Console {
    fn on_think(&mut self, thought: &str) {
        self.print_thinking(thought);
    }
}

fn is_affirmative(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Buffer {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).to_string()
        }
    }

    fn console() -> (Console, Buffer, Buffer) {
        let out = Buffer::default();
        let err = Buffer::default();
        let console = Console::with_writers(Box::new(out.clone()), Box::new(err.clone()));
        (console, out, err)
    }

    #[test]
    fn test_affirmative_tokens() {
        assert!(is_affirmative("y\n"));
        assert!(is_affirmative("Y"));
        assert!(is_affirmative("  y \r\n"));
        assert!(!is_affirmative("yes"));
        assert!(!is_affirmative("n"));
        assert!(!is_affirmative(""));
    }

    #[test]
    fn test_ask_confirmation_prompts() {
        let (mut console, out, _) = console();
        assert!(console.ask_confirmation(&mut Cursor::new("Y\n")));
        assert!(out.contents().contains(CONFIRM_PROMPT));
    }

    #[test]
    fn test_ask_confirmation_eof_is_no() {
        let (mut console, _, _) = console();
        assert!(!console.ask_confirmation(&mut Cursor::new("")));
    }

    #[test]
    fn test_thinking_goes_to_stdout() {
        let (mut console, out, err) = console();
        console.on_think("Using ls");
        let text = out.contents();
        assert!(text.contains(THINKING_LABEL));
        assert!(text.contains("Using ls"));
        assert!(err.contents().is_empty());
    }

    #[test]
    fn test_no_prompt_goes_to_stdout() {
        let (mut console, out, err) = console();
        console.print_no_prompt();
        assert!(out.contents().contains("No prompts"));
        assert!(err.contents().is_empty());
    }

    #[test]
    fn test_failure_output() {
        let (mut console, out, _) = console();
        console.print_failure("cannot do that");
        let text = out.contents();
        assert!(text.contains("cannot do that"));
        assert!(text.contains("Generate failed"));
    }
}
