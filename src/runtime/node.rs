//! Node.js runtime.

use std::path::Path;

use tracing::{info, Dispatch};

use super::{log_defaults, match_markers, with_log, Matcher, Overrides, RuntimeName};
use crate::detection::manifests::{read_json, PackageJson};
use crate::detection::scripts::{find_script, find_start_script_by_pattern};
use crate::detection::{
    NodePackageManager, VersionResolver, VersionSource, BUILD_SCRIPTS, START_SCRIPTS,
};
use crate::error::Result;
use crate::template::{self, TemplateData};

const MARKERS: &[&str] = &["yarn.lock", "package-lock.json", "pnpm-lock.yaml"];

/// Matches Node projects by lockfile.
#[derive(Debug, Clone)]
pub struct Node {
    log: Dispatch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeFacts {
    pub version: String,
    pub package_manager: NodePackageManager,
    pub install: String,
    pub build: String,
    pub start: String,
}

impl Node {
    pub fn new(log: Dispatch) -> Self {
        Self { log }
    }

    /// Node version lookup, shared with Next.js.
    pub fn version_resolver() -> VersionResolver {
        VersionResolver::new(
            "Node",
            vec![
                VersionSource::VersionFile(".nvmrc"),
                VersionSource::VersionFile(".node-version"),
                VersionSource::ToolVersions("nodejs"),
                VersionSource::Mise("node"),
                VersionSource::PackageJsonEngines,
            ],
            "lts",
        )
    }

    pub fn detect(path: &Path) -> Result<NodeFacts> {
        let version = Self::version_resolver().resolve(path)?;

        let package_json = read_json::<PackageJson>(path, "package.json")?.unwrap_or_else(|| {
            info!("No package.json file found");
            PackageJson::default()
        });

        let package_manager = NodePackageManager::detect(path);
        let install = package_manager.install_command().to_string();

        let scripts = &package_json.scripts;
        let mut start = String::new();
        let mut build = String::new();

        if !scripts.is_empty() {
            info!("Detected scripts in package.json");

            if let Some(script) = find_script(scripts, START_SCRIPTS) {
                start = package_manager.run_script(script);
                info!("Detected start command in package.json: {}", start);
            } else if let Some(script) = find_start_script_by_pattern(scripts) {
                start = package_manager.run_script(script);
                info!(
                    "Detected start command in package.json via regex pattern: {}",
                    start
                );
            }

            if let Some(script) = find_script(scripts, BUILD_SCRIPTS) {
                build = package_manager.run_script(script);
                info!("Detected build command in package.json: {}", build);
            }
        }

        if start.is_empty() {
            if let Some(entry) = package_json.entry_point() {
                start = format!("node {}", entry);
            }
        }

        Ok(NodeFacts {
            version,
            package_manager,
            install,
            build,
            start,
        })
    }
}

impl NodeFacts {
    pub fn template_data(&self) -> TemplateData {
        TemplateData::new()
            .with("Version", &self.version)
            .with_command("InstallCMD", &self.install)
            .with_command("BuildCMD", &self.build)
            .with_command("StartCMD", &self.start)
    }
}

impl Matcher for Node {
    fn name(&self) -> RuntimeName {
        RuntimeName::Node
    }

    fn matches(&self, path: &Path) -> bool {
        with_log(&self.log, || match_markers(self.name(), path, MARKERS))
    }

    fn generate_dockerfile(&self, path: &Path, overrides: &Overrides) -> Result<Vec<u8>> {
        with_log(&self.log, || {
            let facts = Self::detect(path)?;
            log_defaults(&[
                ("Node version", facts.version.as_str()),
                ("Package manager", facts.package_manager.as_str()),
                ("Install command", facts.install.as_str()),
                ("Build command", facts.build.as_str()),
                ("Start command", facts.start.as_str()),
            ]);

            template::render("node", &facts.template_data().merge(overrides))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn render(path: &Path) -> String {
        let bytes = Node::new(Dispatch::none())
            .generate_dockerfile(path, &Overrides::new())
            .unwrap();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn matches_lockfiles_only() {
        let matcher = Node::new(Dispatch::none());
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("package.json"), "{}").unwrap();
        assert!(!matcher.matches(temp.path()));

        fs::write(temp.path().join("pnpm-lock.yaml"), "").unwrap();
        assert!(matcher.matches(temp.path()));
    }

    #[test]
    fn yarn_production_start_script() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("package.json"),
            r#"{"scripts":{"start:production":"node server.js"},"engines":{"node":"18"}}"#,
        )
        .unwrap();
        fs::write(temp.path().join("yarn.lock"), "").unwrap();

        let out = render(temp.path());
        assert!(out.contains(r#"ARG INSTALL_CMD="yarn --frozen-lockfile""#));
        assert!(out.contains(r#"ARG START_CMD="yarn run start:production""#));
        assert!(out.contains("ARG VERSION=18\n"));
    }

    #[test]
    fn production_start_beats_plain_start() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("package.json"),
            r#"{"scripts":{"start":"node index.js","start:production":"node dist/index.js","build":"tsc"}}"#,
        )
        .unwrap();
        fs::write(temp.path().join("package-lock.json"), "{}").unwrap();

        let facts = Node::detect(temp.path()).unwrap();
        assert_eq!(facts.start, "npm run start:production");
        assert_eq!(facts.build, "npm run build");
        assert_eq!(facts.install, "npm ci");
    }

    #[test]
    fn regex_fallback_finds_node_entry_script() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("package.json"),
            r#"{"scripts":{"dev":"vite","launch":"node src/main.js"}}"#,
        )
        .unwrap();
        fs::write(temp.path().join("pnpm-lock.yaml"), "").unwrap();

        let facts = Node::detect(temp.path()).unwrap();
        assert_eq!(facts.package_manager, NodePackageManager::Pnpm);
        assert_eq!(facts.start, "pnpm run launch");
        assert_eq!(facts.install, "pnpm i --frozen-lockfile");
    }

    #[test]
    fn main_field_is_last_resort() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("package.json"), r#"{"main":"app.js"}"#).unwrap();
        fs::write(temp.path().join("package-lock.json"), "{}").unwrap();

        assert_eq!(Node::detect(temp.path()).unwrap().start, "node app.js");
    }

    #[test]
    fn odd_shaped_tables_fall_through_to_main() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("package-lock.json"), "{}").unwrap();

        fs::write(
            temp.path().join("package.json"),
            r#"{"scripts":null,"main":"app.js"}"#,
        )
        .unwrap();
        assert_eq!(Node::detect(temp.path()).unwrap().start, "node app.js");

        fs::write(
            temp.path().join("package.json"),
            r#"{"engines":"node 18","main":"app.js"}"#,
        )
        .unwrap();
        let facts = Node::detect(temp.path()).unwrap();
        assert_eq!(facts.start, "node app.js");
        assert_eq!(facts.version, "lts");
    }

    #[test]
    fn no_start_command_renders_guard() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("package-lock.json"), "{}").unwrap();

        let out = render(temp.path());
        assert!(out.contains("ARG START_CMD=\n"));
        assert!(out.contains("Unable to detect a container start command"));
        assert!(out.contains("ARG VERSION=lts\n"));
    }

    #[test]
    fn nvmrc_beats_engines() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".nvmrc"), "v20.11.0\n").unwrap();
        fs::write(
            temp.path().join("package.json"),
            r#"{"engines":{"node":">=16"}}"#,
        )
        .unwrap();

        assert_eq!(Node::detect(temp.path()).unwrap().version, "20.11.0");
    }

    #[test]
    fn malformed_package_json_is_fatal() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("package.json"), "{").unwrap();
        fs::write(temp.path().join("yarn.lock"), "").unwrap();

        let result =
            Node::new(Dispatch::none()).generate_dockerfile(temp.path(), &Overrides::new());
        assert!(matches!(
            result,
            Err(crate::error::DockerfileError::ConfigParse { .. })
        ));
    }
}
