//! Error message formatting with actionable suggestions.

use modforge_core::error::ForgeError;

use super::colors::ColorSupport;

/// Error formatter with suggestions
pub struct ErrorFormatter {
    colors: ColorSupport,
}

impl ErrorFormatter {
    /// Create a new error formatter
    pub fn new() -> Self {
        Self {
            colors: ColorSupport::detect(),
        }
    }

    pub fn with_colors(colors: ColorSupport) -> Self {
        Self { colors }
    }

    /// Format an error chain, with a suggestion when a `ForgeError` has one
    pub fn format_report(&self, error: &anyhow::Error) -> String {
        let mut output = String::new();

        output.push_str(&self.colors.red("error"));
        output.push_str(": ");
        output.push_str(&error.to_string());
        output.push('\n');

        for cause in error.chain().skip(1) {
            output.push_str(&self.colors.dim("caused by"));
            output.push_str(": ");
            output.push_str(&cause.to_string());
            output.push('\n');
        }

        let suggestion = error
            .chain()
            .find_map(|cause| cause.downcast_ref::<ForgeError>())
            .and_then(ForgeError::suggestion);
        if let Some(suggestion) = suggestion {
            output.push('\n');
            output.push_str(&self.colors.yellow("help"));
            output.push_str(": ");
            output.push_str(suggestion);
            output.push('\n');
        }

        output
    }
}

impl Default for ErrorFormatter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_format_with_context_and_suggestion() {
        let result: Result<(), ForgeError> = Err(ForgeError::InvalidName {
            raw: "puppet".to_string(),
        });
        let error = result.context("Install failed").unwrap_err();

        let text = ErrorFormatter::with_colors(ColorSupport::disabled()).format_report(&error);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "error: Install failed");
        assert_eq!(
            lines[1],
            "caused by: Could not install module with invalid name: puppet"
        );
        assert!(lines[3].starts_with("help: "));
    }

    #[test]
    fn test_format_plain_error() {
        let error = anyhow::anyhow!("something broke");
        let text = ErrorFormatter::with_colors(ColorSupport::disabled()).format_report(&error);
        assert_eq!(text, "error: something broke\n");
    }
}
