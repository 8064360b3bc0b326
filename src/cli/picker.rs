//! Numbered text picker.
//!
//! This is intentionally kept separate from clap parsing:
//! - clap handles structured flags/subcommands
//! - the picker provides the line-based "choose from a list" UX for `fprice ask`
//!
//! Input rules: a number picks from the list, an exact label (case-insensitive)
//! picks that label, an empty line keeps the current value, `q` cancels.

use std::io::{self, BufRead, Write};

use crate::error::{AppError, EXIT_FAILURE};

const EXIT_CANCELED: u8 = EXIT_FAILURE;

/// Prompt on stdin/stdout.
pub fn prompt_choice(label: &str, options: &[String], current: &str) -> Result<String, AppError> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    prompt_choice_with(&mut input, &mut output, label, options, current)
}

/// Prompt using explicit input/output streams.
pub fn prompt_choice_with<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    label: &str,
    options: &[String],
    current: &str,
) -> Result<String, AppError> {
    if options.is_empty() {
        return Err(AppError::new(EXIT_CANCELED, format!("No choices available for {label}.")));
    }

    let write_err = |e: io::Error| AppError::new(EXIT_CANCELED, format!("Failed to write prompt: {e}"));

    writeln!(output, "{label}:").map_err(write_err)?;
    for (idx, opt) in options.iter().enumerate() {
        let marker = if opt == current { "*" } else { " " };
        writeln!(output, "{marker}{:>3}) {opt}", idx + 1).map_err(write_err)?;
    }

    loop {
        write!(output, "Select {label} (1-{}, Enter keeps {current}, q to quit): ", options.len())
            .map_err(write_err)?;
        output.flush().map_err(write_err)?;

        let mut line = String::new();
        let bytes = input
            .read_line(&mut line)
            .map_err(|e| AppError::new(EXIT_CANCELED, format!("Failed to read input: {e}")))?;

        if bytes == 0 {
            return Err(AppError::new(EXIT_CANCELED, "No input received."));
        }

        let line = line.trim();
        if line.eq_ignore_ascii_case("q") {
            return Err(AppError::new(EXIT_CANCELED, "Canceled."));
        }

        if line.is_empty() && options.iter().any(|o| o == current) {
            return Ok(current.to_string());
        }

        if let Ok(choice) = line.parse::<usize>() {
            if (1..=options.len()).contains(&choice) {
                return Ok(options[choice - 1].clone());
            }
            writeln!(output, "Invalid choice: {choice}. Enter a number between 1 and {}.", options.len())
                .map_err(write_err)?;
            continue;
        }

        if let Some(opt) = options.iter().find(|o| o.eq_ignore_ascii_case(line)) {
            return Ok(opt.clone());
        }

        writeln!(output, "'{line}' is not one of the listed choices.").map_err(write_err)?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn opts() -> Vec<String> {
        vec!["Colombo".to_string(), "Gampaha".to_string(), "Kandy".to_string()]
    }

    fn run(input: &str, current: &str) -> (Result<String, AppError>, String) {
        let mut input = Cursor::new(input.as_bytes().to_vec());
        let mut out = Vec::new();
        let res = prompt_choice_with(&mut input, &mut out, "Market", &opts(), current);
        (res, String::from_utf8(out).unwrap())
    }

    #[test]
    fn number_picks_entry() {
        let (res, out) = run("2\n", "Colombo");
        assert_eq!(res.unwrap(), "Gampaha");
        assert!(out.contains("*  1) Colombo"));
    }

    #[test]
    fn empty_line_keeps_current() {
        let (res, _) = run("\n", "Kandy");
        assert_eq!(res.unwrap(), "Kandy");
    }

    #[test]
    fn invalid_then_label() {
        let (res, out) = run("9\nnowhere\nkandy\n", "Colombo");
        assert_eq!(res.unwrap(), "Kandy");
        assert!(out.contains("Invalid choice: 9"));
        assert!(out.contains("'nowhere' is not one of the listed choices."));
    }

    #[test]
    fn quit_and_eof_cancel() {
        assert!(run("q\n", "Colombo").0.is_err());
        assert!(run("", "Colombo").0.is_err());
    }
}
