//! Terminal implementation of [`Prompter`].

use std::io::ErrorKind;

use console::style;
use dialoguer::{Confirm, Error as DialoguerError, Input};

use crate::error::{ConnectorError, Result};
use crate::register::Prompter;

/// Prompts on the controlling terminal.
#[derive(Debug, Default)]
pub struct TerminalPrompter;

fn prompt_error(what: &str, err: DialoguerError) -> ConnectorError {
    match err {
        DialoguerError::IO(e) if e.kind() == ErrorKind::Interrupted => {
            ConnectorError::Prompt(format!("{what} interrupted"))
        }
        err => ConnectorError::Prompt(format!("Failed to read {what}: {err}")),
    }
}

impl Prompter for TerminalPrompter {
    fn input(&mut self, prompt: &str) -> Result<String> {
        Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .map_err(|e| prompt_error("input", e))
    }

    fn confirm(&mut self, question: &str) -> Result<bool> {
        Confirm::new()
            .with_prompt(question)
            .default(true)
            .interact()
            .map_err(|e| prompt_error("confirmation", e))
    }

    fn warn(&mut self, message: &str) {
        eprintln!("{} {}", style("Warning:").yellow().bold(), message);
    }
}
