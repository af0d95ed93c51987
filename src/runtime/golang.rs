//! Go runtime.

use std::fs;
use std::path::Path;

use tracing::{info, Dispatch};

use super::{log_defaults, match_markers, with_log, Matcher, Overrides, RuntimeName};
use crate::detection::{dir_exists, file_exists, VersionResolver, VersionSource};
use crate::error::Result;
use crate::template::{self, TemplateData};

const MARKERS: &[&str] = &["go.mod", "main.go"];

/// Matches Go modules and single-file Go programs.
#[derive(Debug, Clone)]
pub struct Golang {
    log: Dispatch,
}

/// What a Go build needs to know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoFacts {
    pub version: String,
    /// Package passed to `go build`, empty when nothing buildable was found.
    pub package: String,
}

impl Golang {
    pub fn new(log: Dispatch) -> Self {
        Self { log }
    }

    pub fn version_resolver() -> VersionResolver {
        VersionResolver::new(
            "Go",
            vec![
                VersionSource::ToolVersions("golang"),
                VersionSource::Mise("go"),
                VersionSource::GoMod,
            ],
            "1.17",
        )
    }

    /// Gather facts for the project at `path`.
    pub fn detect(path: &Path) -> Result<GoFacts> {
        Ok(GoFacts {
            version: Self::version_resolver().resolve(path)?,
            package: find_package(path)?,
        })
    }
}

/// Locate the main package: `cmd/main.go`, else the first `cmd/<name>` directory,
/// else a root `main.go`.
fn find_package(path: &Path) -> Result<String> {
    if dir_exists(path, "cmd") {
        info!("Found cmd directory. Detecting package...");

        let mut entries = fs::read_dir(path.join("cmd"))?.collect::<std::io::Result<Vec<_>>>()?;
        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let name = entry.file_name().to_string_lossy().into_owned();
            if entry.file_type()?.is_dir() {
                return Ok(format!("./cmd/{}", name));
            }
            if name == "main.go" {
                return Ok("./cmd/main.go".to_string());
            }
        }
    }

    if file_exists(path, "main.go") {
        return Ok("./main.go".to_string());
    }

    Ok(String::new())
}

impl GoFacts {
    pub fn template_data(&self) -> TemplateData {
        TemplateData::new()
            .with("Version", &self.version)
            .with("Package", &self.package)
    }
}

impl Matcher for Golang {
    fn name(&self) -> RuntimeName {
        RuntimeName::Golang
    }

    fn matches(&self, path: &Path) -> bool {
        with_log(&self.log, || match_markers(self.name(), path, MARKERS))
    }

    fn generate_dockerfile(&self, path: &Path, overrides: &Overrides) -> Result<Vec<u8>> {
        with_log(&self.log, || {
            let facts = Self::detect(path)?;
            log_defaults(&[
                ("Go version", facts.version.as_str()),
                ("Package", facts.package.as_str()),
            ]);

            template::render("golang", &facts.template_data().merge(overrides))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn render(path: &Path) -> String {
        let bytes = Golang::new(Dispatch::none())
            .generate_dockerfile(path, &Overrides::new())
            .unwrap();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn matches_go_mod_or_main() {
        let matcher = Golang::new(Dispatch::none());
        let temp = TempDir::new().unwrap();
        assert!(!matcher.matches(temp.path()));

        fs::write(temp.path().join("main.go"), "package main\n").unwrap();
        assert!(matcher.matches(temp.path()));
    }

    #[test]
    fn cmd_subdirectory_is_the_package() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("go.mod"),
            "module example.com/hello\n\ngo 1.22.3\n",
        )
        .unwrap();
        fs::create_dir_all(temp.path().join("cmd/hello")).unwrap();
        fs::write(temp.path().join("cmd/hello/main.go"), "package main\n").unwrap();

        let out = render(temp.path());
        assert!(out.contains("ARG VERSION=1.22.3"));
        assert!(out.contains("ARG PACKAGE=./cmd/hello"));
    }

    #[test]
    fn cmd_main_file_wins_when_listed_first() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("cmd/server")).unwrap();
        fs::write(temp.path().join("cmd/main.go"), "package main\n").unwrap();

        assert_eq!(find_package(temp.path()).unwrap(), "./cmd/main.go");
    }

    #[test]
    fn root_main_is_fallback() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("main.go"), "package main\n").unwrap();

        let facts = Golang::detect(temp.path()).unwrap();
        assert_eq!(facts.package, "./main.go");
        assert_eq!(facts.version, "1.17");
    }

    #[test]
    fn no_package_renders_empty() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("go.mod"), "module x\n").unwrap();

        let out = render(temp.path());
        assert!(out.contains("ARG PACKAGE=\n"));
    }

    #[test]
    fn tool_versions_beats_go_mod() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".tool-versions"), "golang 1.21.0\n").unwrap();
        fs::write(temp.path().join("go.mod"), "module x\n\ngo 1.22.3\n").unwrap();

        assert_eq!(Golang::detect(temp.path()).unwrap().version, "1.21.0");
    }

    #[test]
    fn overrides_replace_detected_values() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("main.go"), "package main\n").unwrap();

        let mut overrides = Overrides::new();
        overrides.insert("Version".into(), "1.23".into());
        overrides.insert("InstallMounts".into(), "--mount=type=cache,target=/go/pkg ".into());

        let bytes = Golang::new(Dispatch::none())
            .generate_dockerfile(temp.path(), &overrides)
            .unwrap();
        let out = String::from_utf8(bytes).unwrap();
        assert!(out.contains("ARG VERSION=1.23"));
        assert!(out.contains("RUN --mount=type=cache,target=/go/pkg if [ -f go.mod ]"));
    }
}
