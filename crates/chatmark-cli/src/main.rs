use anyhow::Result;
use chatmark_cli::cli::{Cli, Commands};
use chatmark_cli::commands;
use chatmark_config::ChatmarkConfig;
use clap::Parser;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays machine-readable
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from(cli.log_level).into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => ChatmarkConfig::load(path)?,
        None => ChatmarkConfig::default(),
    };
    tracing::debug!(config = ?cli.config, "configuration loaded");

    let output = match cli.command {
        Commands::Lex { input, diagnostics } => {
            commands::lex(&config, &commands::read_input(&input)?, diagnostics)?
        }
        Commands::Render { input, open } => {
            commands::render(&config, &commands::read_input(&input)?, open)?
        }
        Commands::Interpret { input } => {
            commands::interpret(&config, &commands::read_input(&input)?)?
        }
        Commands::Directives { input } => commands::directives(&commands::read_input(&input)?)?,
        Commands::Extensions => commands::extensions(&config)?,
    };

    println!("{output}");
    Ok(())
}
