//! Rust runtime.

use std::path::Path;

use tracing::{info, warn, Dispatch};

use super::{log_defaults, match_markers, with_log, Matcher, Overrides, RuntimeName};
use crate::detection::manifests::{read_toml, CargoToml};
use crate::error::Result;
use crate::template::{self, TemplateData};

const MARKERS: &[&str] = &["Cargo.toml"];

#[derive(Debug, Clone)]
pub struct Rust {
    log: Dispatch,
}

impl Rust {
    pub fn new(log: Dispatch) -> Self {
        Self { log }
    }

    /// Name of the binary Cargo will produce, empty when the manifest has none.
    pub fn bin_name(path: &Path) -> Result<String> {
        let Some(cargo) = read_toml::<CargoToml>(path, "Cargo.toml")? else {
            return Ok(String::new());
        };

        let name = match cargo.binary_target() {
            Some((target, name)) => {
                info!("Detected binary in Cargo.toml via {}", target.as_str());
                name
            }
            None => None,
        };

        match name {
            Some(name) => {
                info!("Detected binary name: {}", name);
                Ok(name.to_string())
            }
            None => {
                warn!("Failed to get binary name from Cargo.toml");
                Ok(String::new())
            }
        }
    }
}

impl Matcher for Rust {
    fn name(&self) -> RuntimeName {
        RuntimeName::Rust
    }

    fn matches(&self, path: &Path) -> bool {
        with_log(&self.log, || match_markers(self.name(), path, MARKERS))
    }

    fn generate_dockerfile(&self, path: &Path, overrides: &Overrides) -> Result<Vec<u8>> {
        with_log(&self.log, || {
            let bin_name = Self::bin_name(path)?;
            log_defaults(&[("Binary name", bin_name.as_str())]);

            let data = TemplateData::new().with("BinName", bin_name).merge(overrides);
            template::render("rust", &data)
        })
    }
}
