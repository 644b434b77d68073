use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use starlane_cli::commands::route::{handle_route_command, RouteCommandArgs};
use starlane_lib::RoutingConfig;

#[derive(Parser, Debug)]
#[command(author, version, about = "Starlane route finding utilities")]
struct Cli {
    /// JSON routing configuration file.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the maximum number of stars a search may use.
    #[arg(long, global = true)]
    max_stars: Option<usize>,

    /// Log line format written to stderr.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Find ranked alternative routes between two stars.
    Route(RouteCommandArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(max_stars) = cli.max_stars {
        config.max_vertices = max_stars;
    }

    match &cli.command {
        Command::Route(args) => handle_route_command(args, config),
    }
}

fn load_config(path: Option<&Path>) -> Result<RoutingConfig> {
    match path {
        Some(path) => RoutingConfig::load(path)
            .with_context(|| format!("failed to load configuration from {}", path.display())),
        None => Ok(RoutingConfig::default()),
    }
}

fn init_tracing(format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    let installed = match format {
        LogFormat::Text => tracing::subscriber::set_global_default(builder.finish()),
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish()),
    };
    // A subscriber may already be installed.
    installed.ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracing_can_be_initialised_twice() {
        init_tracing(LogFormat::Json);
        init_tracing(LogFormat::Text);
        tracing::info!("still logging");
    }
}
