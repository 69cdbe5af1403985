#![deny(clippy::all, clippy::pedantic)]

use std::io::{self, BufRead, Write};

use recipebox::application::Confirm;

use crate::context::CliError;

/// Asks on stderr, reads the answer from stdin. Only `y`/`yes` approve.
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        eprint!("{prompt} [y/N] ");
        let _ = io::stderr().flush();
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_yes(&answer),
            Err(_) => false,
        }
    }
}

pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// One line from stdin without its line ending.
pub fn read_secret_line(what: &'static str) -> Result<String, CliError> {
    eprint!("{what}: ");
    let _ = io::stderr().flush();
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|source| CliError::Stdin { what, source })?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
