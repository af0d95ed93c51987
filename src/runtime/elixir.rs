//! Elixir runtime, built as a Mix release.

use std::path::Path;

use tracing::{info, warn, Dispatch};

use super::{log_defaults, match_markers, with_log, Matcher, Overrides, RuntimeName};
use crate::detection::{read_optional, VersionResolver, VersionSource};
use crate::error::Result;
use crate::template::{self, TemplateData};

const MARKERS: &[&str] = &["mix.exs"];

#[derive(Debug, Clone)]
pub struct Elixir {
    log: Dispatch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElixirFacts {
    pub elixir_version: String,
    /// Full Erlang/OTP version; only the major part reaches the image tag.
    pub otp_version: String,
    pub bin_name: String,
}

impl Elixir {
    pub fn new(log: Dispatch) -> Self {
        Self { log }
    }

    pub fn detect(path: &Path) -> Result<ElixirFacts> {
        let elixir_version = VersionResolver::new(
            "Elixir",
            vec![
                VersionSource::ToolVersions("elixir"),
                VersionSource::VersionFile(".elixir-version"),
            ],
            "1.12",
        )
        .resolve(path)?;

        let otp_version = VersionResolver::new(
            "Erlang",
            vec![
                VersionSource::ToolVersions("erlang"),
                VersionSource::VersionFile(".erlang-version"),
            ],
            "26.2.5",
        )
        .resolve(path)?;

        let bin_name = Self::bin_name(path)?;

        Ok(ElixirFacts {
            elixir_version,
            otp_version,
            bin_name,
        })
    }

    /// The `app:` atom declared in `mix.exs`.
    pub fn bin_name(path: &Path) -> Result<String> {
        let Some(content) = read_optional(path, "mix.exs")? else {
            return Ok(String::new());
        };

        match content.lines().find_map(app_atom) {
            Some(name) => {
                info!("Detected release name: {}", name);
                Ok(name)
            }
            None => {
                warn!("Failed to get app name from mix.exs");
                Ok(String::new())
            }
        }
    }
}

/// `app: :my_app,` gives `my_app`.
fn app_atom(line: &str) -> Option<String> {
    if !line.contains("app: :") {
        return None;
    }

    let rest = line.replacen("app:", "", 1);
    let atom = rest.split(':').nth(1)?;
    let name = atom
        .trim()
        .trim_matches(|c: char| c == ',' || c == '\'' || c == '"')
        .trim();
    Some(name.to_string())
}

impl ElixirFacts {
    /// Major component of the OTP version, e.g. `26` for `26.2.5`.
    pub fn otp_major(&self) -> &str {
        self.otp_version.split('.').next().unwrap_or_default()
    }

    pub fn template_data(&self) -> TemplateData {
        TemplateData::new()
            .with("ElixirVersion", &self.elixir_version)
            .with("OTPVersion", self.otp_major())
            .with("BinName", &self.bin_name)
    }
}

impl Matcher for Elixir {
    fn name(&self) -> RuntimeName {
        RuntimeName::Elixir
    }

    fn matches(&self, path: &Path) -> bool {
        with_log(&self.log, || match_markers(self.name(), path, MARKERS))
    }

    fn generate_dockerfile(&self, path: &Path, overrides: &Overrides) -> Result<Vec<u8>> {
        with_log(&self.log, || {
            let facts = Self::detect(path)?;
            log_defaults(&[
                ("Elixir version", facts.elixir_version.as_str()),
                ("Erlang version", facts.otp_version.as_str()),
                ("Binary name", facts.bin_name.as_str()),
            ]);

            template::render("elixir", &facts.template_data().merge(overrides))
        })
    }
}
