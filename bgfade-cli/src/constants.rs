// ABOUTME: Centralized constants for the bgfade command-line harness
// ABOUTME: Contains config file locations, environment overrides and display limits

/// Configuration file discovery
pub mod config {
    /// Directory name under the user and XDG config homes
    pub const APP_DIR: &str = "bgfade";

    pub const CONFIG_FILE: &str = "config.toml";

    /// Project-local config file in the working directory
    pub const PROJECT_FILE: &str = "bgfade.toml";
}

/// Environment variables read by the harness
pub mod env {
    /// Forces the host capability profile: browser, legacy or server
    pub const FORCE_ENVIRONMENT: &str = "BGFADE_FORCE_ENVIRONMENT";

    pub const NO_COLOR: &str = "NO_COLOR";
}

/// Table output
pub mod ui {
    /// Background values longer than this are shortened in text output
    pub const MAX_VALUE_WIDTH: usize = 60;
}
