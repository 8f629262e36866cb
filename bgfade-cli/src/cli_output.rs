// ABOUTME: Centralized CLI output utilities for consistent user-facing messages
// ABOUTME: Provides standardized formatting for errors, warnings and info on stderr

use owo_colors::OwoColorize;
use std::io::IsTerminal;

/// Centralized CLI output utilities for consistent formatting
pub struct CliOutput {
    use_color: bool,
}

impl CliOutput {
    /// Colors only when allowed and stderr is a terminal
    pub fn for_stderr(allow_color: bool) -> Self {
        Self::with_color(allow_color && std::io::stderr().is_terminal())
    }

    fn with_color(use_color: bool) -> Self {
        Self { use_color }
    }

    /// Display an error message
    pub fn error(&self, message: &str) {
        eprintln!("{}", self.render("error:", message, Level::Error));
    }

    /// Display a warning message
    pub fn warning(&self, message: &str) {
        eprintln!("{}", self.render("warning:", message, Level::Warning));
    }

    /// Display an informational message
    pub fn info(&self, message: &str) {
        eprintln!("{}", self.render("info:", message, Level::Info));
    }

    fn render(&self, label: &str, message: &str, level: Level) -> String {
        if !self.use_color {
            return format!("{} {}", label, message);
        }
        let label = match level {
            Level::Error => label.red().bold().to_string(),
            Level::Warning => label.yellow().bold().to_string(),
            Level::Info => label.blue().bold().to_string(),
        };
        format!("{} {}", label, message)
    }
}

#[derive(Clone, Copy)]
enum Level {
    Error,
    Warning,
    Info,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_output_creation() {
        let _cli = CliOutput::for_stderr(true);
        assert!(!CliOutput::for_stderr(false).use_color);

        let cli_color = CliOutput::with_color(true);
        assert!(cli_color.use_color);

        let cli_no_color = CliOutput::with_color(false);
        assert!(!cli_no_color.use_color);
    }

    #[test]
    fn test_plain_rendering() {
        let cli = CliOutput::with_color(false);
        assert_eq!(cli.render("error:", "boom", Level::Error), "error: boom");
        assert_eq!(cli.render("info:", "hint", Level::Info), "info: hint");
    }

    #[test]
    fn test_colored_rendering() {
        let cli = CliOutput::with_color(true);
        let rendered = cli.render("warning:", "careful", Level::Warning);
        assert!(rendered.contains("\u{1b}["));
        assert!(rendered.ends_with("careful"));
    }

    #[test]
    fn test_message_methods() {
        let cli = CliOutput::with_color(false);
        cli.error("test error");
        cli.warning("test warning");
        cli.info("test info");
    }
}
