//! Interactive prompts
//!
//! The only code that reads from the terminal. Generic over the input and
//! output streams so it can be driven from tests with in-memory buffers.

use std::io::{BufRead, Write};

use crate::error::{PkgSvcError, Result};
use crate::logic::workflow::ActionSource;
use crate::types::PackageName;

pub const PACKAGE_PROMPT: &str = "Enter the package name: ";
pub const ACTION_PROMPT: &str = "Enter action (start/stop/status): ";

/// Line-oriented prompter over any reader/writer pair.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print `prompt` and read one line. `None` on end of input.
    fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    /// Ask for the package to act on.
    ///
    /// # Errors
    ///
    /// `PkgSvcError::Prompt` on end of input, `PkgSvcError::Validation` if the
    /// name is empty or malformed.
    pub fn ask_package(&mut self) -> Result<PackageName> {
        match self.ask(PACKAGE_PROMPT)? {
            Some(line) => PackageName::new(&line),
            None => Err(PkgSvcError::prompt("no package name given (end of input)")),
        }
    }
}

impl<R: BufRead, W: Write> ActionSource for Prompter<R, W> {
    /// End of input yields an empty string, which the workflow rejects as an
    /// invalid action.
    fn next_action(&mut self, _service: &str) -> Result<String> {
        Ok(self.ask(ACTION_PROMPT)?.unwrap_or_default())
    }
}
