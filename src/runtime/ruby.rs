//! Ruby runtime.

use std::path::Path;

use tracing::{info, Dispatch};

use super::{log_defaults, match_markers, with_log, Matcher, Overrides, RuntimeName};
use crate::detection::file_detection::file_has_line;
use crate::detection::{file_exists, NodePackageManager, VersionResolver, VersionSource};
use crate::error::Result;
use crate::template::{self, TemplateData};

const MARKERS: &[&str] = &[
    "Gemfile",
    "Gemfile.lock",
    "Rakefile",
    "config.ru",
    "config/environment.rb",
];

#[derive(Debug, Clone)]
pub struct Ruby {
    log: Dispatch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RubyFacts {
    pub version: String,
    /// Frontend package manager installed alongside the gems.
    pub node_package_manager: Option<NodePackageManager>,
    pub install: String,
    pub build: String,
    pub start: String,
}

impl Ruby {
    pub fn new(log: Dispatch) -> Self {
        Self { log }
    }

    pub fn version_resolver() -> VersionResolver {
        VersionResolver::new(
            "Ruby",
            vec![
                VersionSource::ToolVersions("ruby"),
                VersionSource::VersionFile(".ruby-version"),
                VersionSource::Gemfile,
            ],
            "3.1",
        )
    }

    pub fn detect(path: &Path) -> Result<RubyFacts> {
        let version = Self::version_resolver().resolve(path)?;

        let node_package_manager = NodePackageManager::detect_frontend(path);
        let mut install = "bundle install".to_string();
        if let Some(pm) = node_package_manager {
            info!("Detected Node.js package manager: {}", pm);
            install = format!("{} && {}", install, pm.standalone_install_command());
        }

        let (build, start) = if is_rails(path) {
            info!("Detected Rails project");
            (
                "bundle exec rake assets:precompile".to_string(),
                "bundle exec rails server -b 0.0.0.0 -p ${PORT}".to_string(),
            )
        } else {
            (String::new(), plain_start_command(path))
        };

        Ok(RubyFacts {
            version,
            node_package_manager,
            install,
            build,
            start,
        })
    }
}

fn is_rails(path: &Path) -> bool {
    file_has_line(path, "Gemfile", |line| {
        line.starts_with("gem 'rails'") || line.starts_with("gem \"rails\"")
    })
}

fn plain_start_command(path: &Path) -> String {
    if file_exists(path, "config.ru") {
        info!("Detected Rack project");
        "bundle exec rackup config.ru -p ${PORT}".to_string()
    } else if file_exists(path, "config/environment.rb") {
        info!("Detected Rails project");
        "bundle exec ruby script/server".to_string()
    } else if file_exists(path, "Rakefile") {
        info!("Detected Rake project");
        "bundle exec rake".to_string()
    } else {
        String::new()
    }
}

impl RubyFacts {
    pub fn template_data(&self) -> TemplateData {
        TemplateData::new()
            .with("Version", &self.version)
            .with_command("InstallCMD", &self.install)
            .with_command("BuildCMD", &self.build)
            .with_command("StartCMD", &self.start)
    }
}

impl Matcher for Ruby {
    fn name(&self) -> RuntimeName {
        RuntimeName::Ruby
    }

    fn matches(&self, path: &Path) -> bool {
        with_log(&self.log, || match_markers(self.name(), path, MARKERS))
    }

    fn generate_dockerfile(&self, path: &Path, overrides: &Overrides) -> Result<Vec<u8>> {
        with_log(&self.log, || {
            let facts = Self::detect(path)?;
            log_defaults(&[
                ("Ruby version", facts.version.as_str()),
                (
                    "Node package manager",
                    facts.node_package_manager.map_or("", |pm| pm.as_str()),
                ),
                ("Install command", facts.install.as_str()),
                ("Build command", facts.build.as_str()),
                ("Start command", facts.start.as_str()),
            ]);

            template::render("ruby", &facts.template_data().merge(overrides))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn rails_with_yarn_assets() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("Gemfile"),
            "source 'https://rubygems.org'\nruby '3.2.2'\ngem 'rails', '~> 7.1'\n",
        )
        .unwrap();
        fs::write(temp.path().join("yarn.lock"), "").unwrap();

        let facts = Ruby::detect(temp.path()).unwrap();
        assert_eq!(facts.version, "3.2.2");
        assert_eq!(facts.install, "bundle install && yarn --frozen-lockfile");
        assert_eq!(facts.build, "bundle exec rake assets:precompile");
        assert_eq!(
            facts.start,
            "bundle exec rails server -b 0.0.0.0 -p ${PORT}"
        );
    }

    #[test]
    fn pnpm_assets_enable_corepack() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("Gemfile"), "gem \"sinatra\"\n").unwrap();
        fs::write(temp.path().join("pnpm-lock.yaml"), "").unwrap();

        let facts = Ruby::detect(temp.path()).unwrap();
        assert_eq!(
            facts.install,
            "bundle install && corepack enable pnpm && pnpm i --frozen-lockfile"
        );
    }

    #[test]
    fn rack_app_uses_rackup() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("Gemfile"), "gem 'rack'\n").unwrap();
        fs::write(temp.path().join("config.ru"), "run App\n").unwrap();
        fs::write(temp.path().join("Rakefile"), "").unwrap();

        let bytes = Ruby::new(Dispatch::none())
            .generate_dockerfile(temp.path(), &Overrides::new())
            .unwrap();
        let out = String::from_utf8(bytes).unwrap();
        assert!(out.contains(r#"ARG START_CMD="bundle exec rackup config.ru -p ${PORT}""#));
        assert!(out.contains(r#"ARG INSTALL_CMD="bundle install""#));
        assert!(out.contains("ARG BUILD_CMD=\n"));
        assert!(out.contains("ARG VERSION=3.1\n"));
    }

    #[test]
    fn ruby_version_file_beats_gemfile() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".ruby-version"), "3.3.0\n").unwrap();
        fs::write(temp.path().join("Gemfile"), "ruby \">= 3.0\"\n").unwrap();

        assert_eq!(Ruby::detect(temp.path()).unwrap().version, "3.3.0");
    }

    #[test]
    fn rakefile_only() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("Rakefile"), "task :default\n").unwrap();

        let matcher = Ruby::new(Dispatch::none());
        assert!(matcher.matches(temp.path()));
        assert_eq!(Ruby::detect(temp.path()).unwrap().start, "bundle exec rake");
    }

    #[test]
    fn mise_toml_is_not_a_ruby_source() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".mise.toml"), "[tools]\nruby = \"3.3.0\"\n").unwrap();
        fs::write(temp.path().join("Gemfile"), "ruby '3.2.2'\n").unwrap();
        assert_eq!(Ruby::detect(temp.path()).unwrap().version, "3.2.2");

        fs::write(temp.path().join(".mise.toml"), "[tools\nruby = ").unwrap();
        assert_eq!(Ruby::detect(temp.path()).unwrap().version, "3.2.2");
    }

    #[test]
    fn pessimistic_gemfile_constraint_uses_default() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("Gemfile"), "ruby \"~> 3.2.0\"\ngem 'rack'\n").unwrap();

        assert_eq!(Ruby::detect(temp.path()).unwrap().version, "3.1");
    }
}
