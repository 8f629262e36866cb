// ABOUTME: Main entry point for the bgfade command-line harness
// ABOUTME: Loads config and scenes, drives the composition engine and prints the results

use anyhow::{anyhow, Result};
use bgfade::shared_cache;
use bgfade_cli::cli::{Cli, Commands, Format};
use bgfade_cli::cli_output::CliOutput;
use bgfade_cli::config::Config;
use bgfade_cli::constants::env as vars;
use bgfade_cli::output::{JsonFormatter, OutputFormat, TableFormatter};
use bgfade_cli::scene::Scene;
use bgfade_cli::session::{BackgroundSession, ChangeReport, InitialReport};
use clap::Parser;
use std::env;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let output = CliOutput::for_stderr(!cli.no_color && env::var(vars::NO_COLOR).is_err());
    if let Err(err) = run(cli) {
        output.error(&format!("{:#}", err));
        if let Some(help) = err
            .chain()
            .find_map(|cause| cause.downcast_ref::<bgfade::Error>())
            .and_then(bgfade::Error::help_text)
        {
            output.info(help);
        }
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    let use_color = !cli.no_color
        && config.color.unwrap_or(true)
        && env::var(vars::NO_COLOR).is_err()
        && env::var("TERM").unwrap_or_default() != "dumb";

    let format = cli
        .format
        .or_else(|| config.preferred_format.as_deref().and_then(Format::from_config))
        .unwrap_or(Format::Text);
    let formatter: Box<dyn OutputFormat> = match format {
        Format::Json => Box::new(JsonFormatter::new(true)),
        Format::Text => Box::new(TableFormatter::new(use_color)),
    };

    let rendered = match cli.command {
        Commands::Initial { scene, no_padding } => {
            let scene = Scene::load_from_file(&scene)?;
            formatter.format_initial(&InitialReport::for_scene(&scene, !no_padding))?
        }
        Commands::Compose { scene } => {
            let scene = Scene::load_from_file(&scene)?;
            let env = config.environment();
            if !env.has_surface {
                CliOutput::for_stderr(use_color)
                    .warning("No presentation surface: images are never loaded in this run");
            }

            let mut cache = shared_cache()
                .lock()
                .map_err(|_| anyhow!("Image cache lock was poisoned"))?;
            let mut session = BackgroundSession::new(&mut cache, env, &scene);
            let steps = session.run(&scene.events);
            formatter.format_steps(&steps)?
        }
        Commands::Changed { old, new } => {
            let old = Scene::load_from_file(&old)?;
            let new = Scene::load_from_file(&new)?;
            formatter.format_change(&ChangeReport::between(&old, &new))?
        }
    };

    println!("{}", rendered);
    Ok(())
}
