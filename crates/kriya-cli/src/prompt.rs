//! Line-based prompts for interactive commands.

use std::io::{self, BufRead, Write};

/// Print a prompt and read one trimmed line. Returns None on EOF.
pub fn line(label: &str) -> io::Result<Option<String>> {
    print!("{label}: ");
    io::stdout().flush()?;

    let mut input = String::new();
    let read = io::stdin().lock().read_line(&mut input)?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim_end_matches(['\n', '\r']).to_string()))
}

/// Prompt until a non-empty line is entered. Returns None on EOF or when
/// the user submits an empty line to abort.
pub fn required(label: &str) -> io::Result<Option<String>> {
    match line(label)? {
        Some(value) if !value.is_empty() => Ok(Some(value)),
        _ => Ok(None),
    }
}

/// Prompt for a yes/no answer, defaulting to no.
pub fn confirm(label: &str) -> io::Result<bool> {
    match line(&format!("{label} [y/N]"))? {
        Some(answer) => Ok(matches!(answer.as_str(), "y" | "Y" | "yes")),
        None => Ok(false),
    }
}
