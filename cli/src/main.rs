use std::io;
use std::process::ExitCode;

use clap::Parser;
use notes_cli::{Cli, Config};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match Config::from_env() {
        Ok(config) => config.with_overrides(cli.api_base_url, cli.session_dir),
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::from(2);
        }
    };
    tracing::debug!(base_url = %config.api_base_url, session_dir = %config.session_dir.display(), "configuration loaded");

    let mut out = io::stdout().lock();
    let mut input = io::stdin().lock();
    match notes_cli::run(cli.command, &config, &mut out, &mut input) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}
