//! Command-line interface for new-dockerfile.
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`run`] - Executes a parsed [`Cli`] against a [`Dockerfile`] generator

pub mod args;

use std::io::Write;

use tracing::info;

use crate::error::Result;
use crate::generator::Dockerfile;
use crate::runtime::RuntimeName;

pub use args::{parse_override, Cli};

/// Run the CLI with parsed arguments.
pub fn run(cli: &Cli, generator: &Dockerfile) -> Result<()> {
    if cli.list {
        let mut stdout = std::io::stdout().lock();
        for name in RuntimeName::DETECTION_ORDER {
            writeln!(stdout, "{}", name)?;
        }
        return Ok(());
    }

    let overrides = cli.overrides()?;
    let runtime = cli.runtime.as_deref().filter(|r| !r.trim().is_empty());

    if cli.stdout {
        let (name, contents) = generator.generate(&cli.path, runtime, &overrides)?;
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(&contents)?;
        stdout.flush()?;
        info!("Generated Dockerfile for project using {}", name);
        return Ok(());
    }

    generator.write(&cli.path, runtime, &overrides)?;
    Ok(())
}
