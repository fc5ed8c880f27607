//! Process-level error handling

use crate::core::errors::PipelineError;

/// Exit status for any failed run
pub const FAILURE_EXIT_CODE: i32 = 1;

/// Render an error for the terminal, naming the failed stage when known
pub fn describe_error(error: &anyhow::Error) -> String {
    match error.downcast_ref::<PipelineError>() {
        Some(PipelineError::InvalidInput { .. }) => {
            format!("{error}\n\nTry running with --help for usage information.")
        }
        Some(_) => error.to_string(),
        None => format!("{error:#}"),
    }
}

/// Prints to stderr and exits with code 1
pub fn handle_error(error: anyhow::Error) -> ! {
    eprintln!();
    eprintln!("iconpress failed:");
    eprintln!("{}", describe_error(&error));
    std::process::exit(FAILURE_EXIT_CODE);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::Stage;

    #[test]
    fn invalid_input_points_at_help() {
        let error = PipelineError::invalid_input(Stage::Configuration, "font name is required");
        let text = describe_error(&error.into());
        assert!(text.starts_with("configuration: invalid input: font name is required"));
        assert!(text.contains("--help"));
    }

    #[test]
    fn other_errors_keep_their_context() {
        let error = anyhow::anyhow!("disk full").context("saving settings");
        assert_eq!(describe_error(&error), "saving settings: disk full");
    }
}
