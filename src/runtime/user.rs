//! Operator interaction (confirmation and selection prompts).

use anyhow::{Result, bail};

use super::RealRuntime;

use std::io::{self, BufRead, Write};

/// Core, testable implementation that reads from any BufRead and writes to any Write.
///
/// Renders `Prompt [a/b/c] (default: c): `, then keeps asking until the
/// answer is one of `choices` or empty with a default available.
pub(crate) fn select_with_io<R: BufRead, W: Write>(
    prompt: &str,
    choices: &[String],
    default: Option<usize>,
    input: &mut R,
    output: &mut W,
) -> Result<usize> {
    if choices.is_empty() {
        bail!("No choices available for prompt: {}", prompt);
    }
    if let Some(index) = default {
        if index >= choices.len() {
            bail!("Default choice {} is out of range", index);
        }
    }

    let prompt_line = match default {
        Some(index) => format!(
            "{} [{}] (default: {}): ",
            prompt,
            choices.join("/"),
            choices[index]
        ),
        None => format!("{} [{}]: ", prompt, choices.join("/")),
    };

    loop {
        write!(output, "{}", prompt_line)?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            // End of input: fall back to the default rather than spinning.
            return match default {
                Some(index) => Ok(index),
                None => bail!("No answer given for prompt: {}", prompt),
            };
        }

        let answer = line.trim();
        if answer.is_empty() {
            if let Some(index) = default {
                return Ok(index);
            }
        } else if let Some(index) = choices.iter().position(|c| c.eq_ignore_ascii_case(answer)) {
            return Ok(index);
        }

        writeln!(output, "Invalid option selected, re-enter your choice.")?;
    }
}

pub(crate) fn confirm_with_io<R: BufRead, W: Write>(
    prompt: &str,
    default: bool,
    input: &mut R,
    output: &mut W,
) -> Result<bool> {
    let choices = ["y".to_string(), "n".to_string()];
    let default_index = if default { 0 } else { 1 };
    let index = select_with_io(prompt, &choices, Some(default_index), input, output)?;
    Ok(index == 0)
}

impl RealRuntime {
    pub(crate) fn confirm_impl(&self, prompt: &str, default: bool) -> Result<bool> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        let mut stdin_lock = stdin.lock();
        confirm_with_io(prompt, default, &mut stdin_lock, &mut stdout)
    }

    pub(crate) fn select_impl(
        &self,
        prompt: &str,
        choices: &[String],
        default: Option<usize>,
    ) -> Result<usize> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        let mut stdin_lock = stdin.lock();
        select_with_io(prompt, choices, default, &mut stdin_lock, &mut stdout)
    }
}
