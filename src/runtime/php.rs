//! PHP runtime.

use std::path::Path;

use tracing::{info, Dispatch};

use super::{log_defaults, match_markers, with_log, Matcher, Overrides, RuntimeName};
use crate::detection::manifests::{read_json, PackageJson};
use crate::detection::scripts::find_script;
use crate::detection::{
    file_exists, NodePackageManager, VersionResolver, VersionSource, BUILD_SCRIPTS,
};
use crate::error::{DockerfileError, Result};
use crate::template::{self, TemplateData};

const MARKERS: &[&str] = &["composer.json", "index.php"];

const COMPOSER_INSTALL: &str =
    "composer update && composer install --prefer-dist --no-dev --optimize-autoloader --no-interaction";

const START_COMMAND: &str = "apache2-foreground";

#[derive(Debug, Clone)]
pub struct Php {
    log: Dispatch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhpFacts {
    pub version: String,
    pub node_package_manager: Option<NodePackageManager>,
    pub install: String,
    pub build: String,
    pub start: String,
}

impl Php {
    pub fn new(log: Dispatch) -> Self {
        Self { log }
    }

    pub fn version_resolver() -> VersionResolver {
        VersionResolver::new(
            "PHP",
            vec![
                VersionSource::ToolVersions("php"),
                VersionSource::ComposerJson,
            ],
            "8.3",
        )
    }

    pub fn detect(path: &Path) -> Result<PhpFacts> {
        let version = Self::version_resolver().resolve(path)?;

        let mut steps: Vec<&str> = Vec::new();
        if file_exists(path, "composer.json") {
            info!("Detected composer.json file");
            steps.push(COMPOSER_INSTALL);
        }

        let node_package_manager = NodePackageManager::detect_frontend(path);
        if let Some(pm) = node_package_manager {
            info!("Detected Node.js package manager: {}", pm);
            steps.push(pm.standalone_install_command());
        }
        let install = steps.join(" && ");

        let build = match node_package_manager {
            Some(pm) => frontend_build_command(path, pm)?,
            None => String::new(),
        };

        Ok(PhpFacts {
            version,
            node_package_manager,
            install,
            build,
            start: START_COMMAND.to_string(),
        })
    }
}

/// Build script from `package.json`; a lockfile without a manifest is an error.
fn frontend_build_command(path: &Path, pm: NodePackageManager) -> Result<String> {
    let package_json = read_json::<PackageJson>(path, "package.json")?.ok_or_else(|| {
        DockerfileError::parse(
            path.join("package.json"),
            format!("{} lockfile found without a package.json", pm),
        )
    })?;

    let Some(script) = find_script(&package_json.scripts, BUILD_SCRIPTS) else {
        return Ok(String::new());
    };

    let command = match pm {
        NodePackageManager::Pnpm => format!("corepack enable pnpm && {}", pm.run_script(script)),
        _ => pm.run_script(script),
    };
    info!("Detected build command in package.json: {}", command);
    Ok(command)
}

impl PhpFacts {
    pub fn template_data(&self) -> TemplateData {
        TemplateData::new()
            .with("Version", &self.version)
            .with_command("InstallCMD", &self.install)
            .with_command("BuildCMD", &self.build)
            .with_command("StartCMD", &self.start)
    }
}

impl Matcher for Php {
    fn name(&self) -> RuntimeName {
        RuntimeName::Php
    }

    fn matches(&self, path: &Path) -> bool {
        with_log(&self.log, || match_markers(self.name(), path, MARKERS))
    }

    fn generate_dockerfile(&self, path: &Path, overrides: &Overrides) -> Result<Vec<u8>> {
        with_log(&self.log, || {
            let facts = Self::detect(path)?;
            log_defaults(&[
                ("PHP version", facts.version.as_str()),
                ("Install command", facts.install.as_str()),
                ("Build command", facts.build.as_str()),
                ("Start command", facts.start.as_str()),
            ]);

            template::render("php", &facts.template_data().merge(overrides))
        })
    }
}
