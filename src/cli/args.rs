//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::Parser;
use std::path::PathBuf;

use crate::error::{DockerfileError, Result};
use crate::runtime::Overrides;

/// new-dockerfile - Autogenerate a Dockerfile from your project source code.
#[derive(Debug, Parser)]
#[command(name = "new-dockerfile")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the project directory
    #[arg(long, env = "NEW_DOCKERFILE_PATH", default_value = ".")]
    pub path: PathBuf,

    /// Force a specific runtime instead of detecting one
    #[arg(long, env = "NEW_DOCKERFILE_RUNTIME")]
    pub runtime: Option<String>,

    /// Template value override as KEY=VALUE (repeatable)
    #[arg(long = "arg", value_name = "KEY=VALUE")]
    pub args: Vec<String>,

    /// Print the Dockerfile instead of writing it to the project
    #[arg(long)]
    pub stdout: bool,

    /// List supported runtimes in detection order and exit
    #[arg(long)]
    pub list: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Collect `--arg` values into template overrides; later keys win.
    pub fn overrides(&self) -> Result<Overrides> {
        let mut overrides = Overrides::new();
        for raw in &self.args {
            let (key, value) = parse_override(raw)?;
            overrides.insert(key, value);
        }
        Ok(overrides)
    }
}

/// Split `KEY=VALUE` at the first `=`. The key must be non-empty.
pub fn parse_override(raw: &str) -> Result<(String, String)> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(DockerfileError::InvalidOverride {
            raw: raw.to_string(),
        }),
    }
}
