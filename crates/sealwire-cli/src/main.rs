//! sealwire CLI entry point

use clap::Parser;
use sealwire_cli::config::CliOverrides;
use sealwire_cli::{Cli, Config, ExitCode};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let config = match Config::load_from(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: config: {e}");
            return ExitCode::InvalidInput.to_exit_code();
        }
    };

    let config = config.with_overrides(&CliOverrides::from(&cli));
    if let Err(e) = config.validate() {
        eprintln!("Error: {e}");
        return ExitCode::InvalidInput.to_exit_code();
    }

    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.execute_with_config(config).await {
        Ok(code) => code.to_exit_code(),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::GeneralError.to_exit_code()
        }
    }
}
