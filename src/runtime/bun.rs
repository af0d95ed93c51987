//! Bun runtime.

use std::path::Path;

use tracing::{info, Dispatch};

use super::{log_defaults, match_markers, with_log, Matcher, Overrides, RuntimeName};
use crate::detection::manifests::{read_json, PackageJson};
use crate::detection::scripts::find_script;
use crate::detection::{VersionResolver, VersionSource, BUILD_SCRIPTS, START_SCRIPTS};
use crate::error::Result;
use crate::template::{self, TemplateData};

const MARKERS: &[&str] = &["bun.lockb", "bunfig.toml"];

const INSTALL_COMMAND: &str = "bun install";

#[derive(Debug, Clone)]
pub struct Bun {
    log: Dispatch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BunFacts {
    pub version: String,
    pub build: String,
    pub start: String,
}

impl Bun {
    pub fn new(log: Dispatch) -> Self {
        Self { log }
    }

    pub fn detect(path: &Path) -> Result<BunFacts> {
        let package_json = read_json::<PackageJson>(path, "package.json")?.unwrap_or_default();

        let mut start = String::new();
        if let Some(script) = find_script(&package_json.scripts, START_SCRIPTS) {
            info!("Detected start command in package.json: {}", script);
            start = format!("bun run {}", script);
        }

        let mut build = String::new();
        if let Some(script) = find_script(&package_json.scripts, BUILD_SCRIPTS) {
            info!("Detected build command in package.json: {}", script);
            build = format!("bun run {}", script);
        }

        if start.is_empty() {
            if let Some(main) = package_json.entry_point().filter(|m| !m.is_empty()) {
                info!("Detected start command via main file: {}", main);
                start = format!("bun {}", main);
            }
        }

        let version =
            VersionResolver::new("Bun", vec![VersionSource::ToolVersions("bun")], "1")
                .resolve(path)?;

        Ok(BunFacts {
            version,
            build,
            start,
        })
    }
}

impl BunFacts {
    pub fn template_data(&self) -> TemplateData {
        TemplateData::new()
            .with("Version", &self.version)
            .with_command("InstallCMD", INSTALL_COMMAND)
            .with_command("BuildCMD", &self.build)
            .with_command("StartCMD", &self.start)
    }
}

impl Matcher for Bun {
    fn name(&self) -> RuntimeName {
        RuntimeName::Bun
    }

    fn matches(&self, path: &Path) -> bool {
        with_log(&self.log, || match_markers(self.name(), path, MARKERS))
    }

    fn generate_dockerfile(&self, path: &Path, overrides: &Overrides) -> Result<Vec<u8>> {
        with_log(&self.log, || {
            let facts = Self::detect(path)?;
            log_defaults(&[
                ("Version", facts.version.as_str()),
                ("Install command", INSTALL_COMMAND),
                ("Build command", facts.build.as_str()),
                ("Start command", facts.start.as_str()),
            ]);

            template::render("bun", &facts.template_data().merge(overrides))
        })
    }
}
