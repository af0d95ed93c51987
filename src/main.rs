//! new-dockerfile CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use new_dockerfile::cli::{self, Cli};
use new_dockerfile::Dockerfile;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--debug` flag or a non-empty `DEBUG` variable sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is INFO
///
/// Logs go to stderr so `--stdout` output stays clean.
fn init_tracing(debug: bool, no_color: bool) {
    let debug = debug || std::env::var("DEBUG").is_ok_and(|v| !v.is_empty());
    let filter = if debug {
        EnvFilter::new("new_dockerfile=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("new_dockerfile=info"))
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(!no_color)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug, cli.no_color);

    tracing::debug!("new-dockerfile starting with args: {:?}", cli);

    match cli::run(&cli, &Dockerfile::default()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::from(1)
        }
    }
}
