//! Interactive prompts for required values missing from the command line

use std::io::IsTerminal;

/// Whether prompting is possible at all
pub fn is_interactive() -> bool {
    std::io::stdin().is_terminal() && std::io::stderr().is_terminal()
}

/// Ask for a required text value
///
/// Returns `Ok(None)` without prompting when stdin is not a terminal, so
/// the caller can report the value as missing.
pub fn ask_text(label: &str, default: Option<&str>) -> anyhow::Result<Option<String>> {
    if !is_interactive() {
        return Ok(None);
    }

    let mut input = dialoguer::Input::<String>::new().with_prompt(label);
    if let Some(default) = default {
        input = input.default(default.to_string());
    }
    let value = input
        .validate_with(|value: &String| -> Result<(), &str> {
            if value.trim().is_empty() {
                Err("a value is required")
            } else {
                Ok(())
            }
        })
        .interact_text()?;
    Ok(Some(value.trim().to_string()))
}
