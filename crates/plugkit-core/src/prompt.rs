//! Interactive line prompts
//!
//! Reads one answer per line. End of input counts as an empty answer.

use anyhow::Result;
use std::io::{self, BufRead, Write};

/// Asks questions on `output` and reads answers from `input`
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl Prompter<io::StdinLock<'static>, io::Stdout> {
    /// Prompter bound to the process stdin/stdout
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Ask for a line of text, falling back to `default` on an empty answer
    pub fn ask(&mut self, label: &str, default: Option<&str>) -> Result<String> {
        match default {
            Some(d) if !d.is_empty() => write!(self.output, "{} [{}]: ", label, d)?,
            _ => write!(self.output, "{}: ", label)?,
        }
        self.output.flush()?;

        let mut input = String::new();
        self.input.read_line(&mut input)?;
        let answer = input.trim();

        if answer.is_empty() {
            Ok(default.unwrap_or_default().to_string())
        } else {
            Ok(answer.to_string())
        }
    }

    /// Ask a y/n question. Only "y" or "yes" count as yes.
    pub fn confirm(&mut self, label: &str) -> Result<bool> {
        write!(self.output, "{} (y/n): ", label)?;
        self.output.flush()?;

        let mut input = String::new();
        self.input.read_line(&mut input)?;

        Ok(is_yes(&input))
    }
}

/// Interpret a y/n answer
pub fn is_yes(answer: &str) -> bool {
    let answer = answer.trim();
    answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
}
