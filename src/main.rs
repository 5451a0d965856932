use std::{path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use uds_design_tokens::{config::Config, pipeline};
use uds_design_tokens_core::{Result, TokenError};

const DEFAULT_FILTER: &str = "uds_design_tokens=info,uds_design_tokens_core=info";
const VERBOSE_FILTER: &str = "uds_design_tokens=debug,uds_design_tokens_core=debug";

#[derive(Parser)]
#[command(name = "uds-tokens")]
#[command(about = "Build CSS variables and Tailwind configs from design tokens")]
struct Cli {
    /// Config file merged over the built-in defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log per-token detail
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write the CSS custom properties stylesheet
    Build,

    /// Write the base and per-brand Tailwind configs
    Tailwind,

    /// Report unresolved aliases and suspicious values
    Validate {
        /// Print the issues as JSON
        #[arg(long)]
        json: bool,
    },

    /// Split a Figma variables export into token files
    Figma {
        /// API response to read instead of the configured one
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Build and tailwind, writing only if both succeed
    All,
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    match cli.command {
        Command::Build => {
            pipeline::build_css(&config)?;
        }
        Command::Tailwind => {
            let written = pipeline::generate_tailwind(&config)?;
            info!(files = written.len(), "generated tailwind configs");
        }
        Command::Validate { json } => {
            let report = pipeline::validate_tokens(&config)?;
            if json {
                let text = serde_json::to_string_pretty(&report.issues)
                    .map_err(|e| TokenError::Config(e.to_string()))?;
                println!("{text}");
            } else {
                print!("{}", report.render_console(config.validate.preview_limit));
                print!("{}", report.render_markdown());
            }
        }
        Command::Figma { input } => {
            let written = pipeline::transform_figma(&config, input.as_deref())?;
            info!(files = written.len(), "transformed figma export");
        }
        Command::All => {
            pipeline::build_all(&config)?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
