//! User-facing output and yes/no prompts

use std::io::{self, BufRead, Write};

/// Terminal the commands talk to
pub trait Console: Send + Sync {
    /// Prints one line
    fn print(&self, line: &str);

    /// Shows `prompt` and reads one answer, `true` only for a "y"
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be written or read
    fn confirm(&self, prompt: &str) -> io::Result<bool>;
}

/// Console on stdin/stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct StdConsole;

impl Console for StdConsole {
    fn print(&self, line: &str) {
        println!("{line}");
    }

    fn confirm(&self, prompt: &str) -> io::Result<bool> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(prompt.as_bytes())?;
        stdout.flush()?;

        let mut answer = String::new();
        // EOF reads as an empty answer
        io::stdin().lock().read_line(&mut answer)?;
        Ok(is_affirmative(&answer))
    }
}

/// Whether an answer is a case-insensitive "y"
///
/// Only the line ending is removed; surrounding spaces make the answer negative.
#[must_use]
pub fn is_affirmative(answer: &str) -> bool {
    answer
        .trim_end_matches(['\r', '\n'])
        .eq_ignore_ascii_case("y")
}
