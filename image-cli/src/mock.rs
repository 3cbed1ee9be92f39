use std::collections::VecDeque;
use std::io;
use std::sync::Mutex;

use crate::console::{is_affirmative, Console};

/// Console answering prompts from a script and recording everything shown
///
/// Prompts beyond the script are answered with an empty line.
#[derive(Default)]
pub struct ScriptedConsole {
    answers: Mutex<VecDeque<String>>,
    lines: Mutex<Vec<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedConsole {
    /// Creates a console giving `answers` in order
    #[must_use]
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: Mutex::new(answers.iter().map(ToString::to_string).collect()),
            ..Self::default()
        }
    }

    /// Printed lines
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    /// Prompts shown
    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl Console for ScriptedConsole {
    fn print(&self, line: &str) {
        self.lines.lock().unwrap().push(line.to_string());
    }

    fn confirm(&self, prompt: &str) -> io::Result<bool> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let answer = self.answers.lock().unwrap().pop_front().unwrap_or_default();
        Ok(is_affirmative(&answer))
    }
}
