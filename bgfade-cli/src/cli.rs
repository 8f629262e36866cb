// ABOUTME: CLI argument definitions for the bgfade scene harness
// ABOUTME: Defines the command-line interface structure using clap derive macros

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "bgfade")]
#[command(about = "Drive progressive background-image load cycles from scene files")]
#[command(long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output format (defaults to the configured preference, then text)
    #[arg(long, global = true, value_enum)]
    pub format: Option<Format>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Extra config file applied on top of the standard locations
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable verbose output for debugging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the first-paint background value of a scene
    Initial {
        /// Scene file (.json, otherwise TOML)
        scene: PathBuf,

        /// Leave layers without a placeholder empty instead of padding them
        #[arg(long)]
        no_padding: bool,
    },
    /// Run a scene's event script and print every composition step
    Compose {
        /// Scene file (.json, otherwise TOML)
        scene: PathBuf,
    },
    /// Report whether switching between two scenes restarts the load cycle
    Changed {
        /// Scene currently shown
        old: PathBuf,

        /// Scene replacing it
        new: PathBuf,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Text,
    Json,
}

impl Format {
    /// Parses a configured `preferred_format` value.
    pub fn from_config(value: &str) -> Option<Self> {
        match value {
            "text" => Some(Format::Text),
            "json" => Some(Format::Json),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_structure() {
        let cli = Cli::command();
        assert_eq!(cli.get_name(), "bgfade");

        for name in ["initial", "compose", "changed"] {
            assert!(cli.find_subcommand(name).is_some(), "missing {}", name);
        }
    }

    #[test]
    fn test_parse_initial() {
        let cli = Cli::try_parse_from(["bgfade", "initial", "scene.toml"]).unwrap();
        match cli.command {
            Commands::Initial { scene, no_padding } => {
                assert_eq!(scene, PathBuf::from("scene.toml"));
                assert!(!no_padding);
            }
            other => panic!("unexpected command: {:?}", other),
        }
        assert!(cli.format.is_none());

        let cli =
            Cli::try_parse_from(["bgfade", "initial", "scene.json", "--no-padding"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Initial {
                no_padding: true,
                ..
            }
        ));
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from([
            "bgfade",
            "compose",
            "scene.toml",
            "--format",
            "json",
            "--no-color",
            "--config",
            "custom.toml",
            "-v",
        ])
        .unwrap();

        assert_eq!(cli.format, Some(Format::Json));
        assert!(cli.no_color);
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
    }

    #[test]
    fn test_changed_requires_two_scenes() {
        assert!(Cli::try_parse_from(["bgfade", "changed", "old.toml"]).is_err());

        let cli = Cli::try_parse_from(["bgfade", "changed", "old.toml", "new.json"]).unwrap();
        match cli.command {
            Commands::Changed { old, new } => {
                assert_eq!(old, PathBuf::from("old.toml"));
                assert_eq!(new, PathBuf::from("new.json"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_format_rejected() {
        assert!(Cli::try_parse_from(["bgfade", "compose", "s.toml", "--format", "yaml"]).is_err());
    }

    #[test]
    fn test_format_from_config() {
        assert_eq!(Format::from_config("text"), Some(Format::Text));
        assert_eq!(Format::from_config("json"), Some(Format::Json));
        assert_eq!(Format::from_config("table"), None);
    }
}
