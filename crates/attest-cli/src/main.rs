//! Attest CLI - operator front-end for the portfolio governance layer.

use attest_cli::commands;
use attest_cli::{Cli, Command, Config, Formatter};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> attest_cli::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Load config; an explicit path must exist
    let mut config = match &cli.config {
        Some(path) if !path.exists() => {
            return Err(attest_cli::CliError::Config(format!(
                "Config file not found: {}",
                path.display()
            )))
        }
        Some(path) => Config::load_from(path)?,
        None => Config::load().unwrap_or_else(|e| {
            tracing::warn!("Falling back to default config: {}", e);
            Config::default()
        }),
    };

    // Command-line overrides
    if let Some(resume) = cli.resume {
        config.knowledge.resume_path = resume;
    }
    if let Some(availability) = cli.availability {
        config.knowledge.availability_path = availability;
    }
    if let Some(preset) = cli.preset {
        config.apply_preset(preset.as_str())?;
    }

    // Determine output format
    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);

    // Determine color setting
    let color_enabled = !cli.no_color && config.settings.color;

    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        Command::Check(args) => commands::execute_check(args, &config, &formatter)?,
        Command::Facts(args) => commands::execute_facts(args, &config, &formatter)?,
        Command::Profile => commands::execute_profile(&config, &formatter)?,
        Command::Availability => commands::execute_availability(&config, &formatter)?,
        Command::Project(args) => commands::execute_project(args, &config, &formatter)?,
        Command::VerifyEmployment(args) => {
            commands::execute_verify_employment(args, &config, &formatter)?
        }
        Command::Watch(args) => commands::execute_watch(args, &config, &formatter).await?,
    }

    Ok(())
}

/// Logs go to stderr so stdout stays machine readable.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env("ATTEST_LOG").unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
