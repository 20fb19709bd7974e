//! wsreader binary entry point.
//!
//! Parses arguments, sets up logging on stderr and runs the command with
//! stdout as the report writer.

use anyhow::Result;
use wsreader_cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::from_args();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(cli.log_level())),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Configuration: {cli:?}");

    let stdout = std::io::stdout();
    wsreader_cli::run(&cli, &mut stdout.lock())
}
