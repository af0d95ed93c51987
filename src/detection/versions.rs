//! Version resolution from convention files.
//!
//! A [`VersionResolver`] walks an ordered list of [`VersionSource`]s and
//! returns the first non-empty value, or the runtime's default. Each source
//! has its own micro-grammar; a source whose file is missing, or whose file
//! does not mention the tool, simply falls through to the next one.

use std::path::Path;

use tracing::info;

use super::constraint::{extract_constraint_version, resolve_engine_version};
use super::file_detection::read_optional;
use super::manifests::{read_json, read_toml, ComposerJson, MiseToml, PackageJson};
use crate::error::Result;

/// A place a version can be pinned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionSource {
    /// `.tool-versions` line whose first token is the tool name.
    ToolVersions(&'static str),
    /// `[tools]` entry of `.mise.toml`.
    Mise(&'static str),
    /// First non-empty line of a single-purpose file such as `.ruby-version`.
    /// A leading `v` is stripped.
    VersionFile(&'static str),
    /// `runtime.txt` with a `python-X.Y` line.
    RuntimeTxt,
    /// The `go` directive of `go.mod`.
    GoMod,
    /// `engines.node` of `package.json`, resolved to a concrete version.
    PackageJsonEngines,
    /// The `ruby` directive of a `Gemfile`.
    Gemfile,
    /// `require.php` of `composer.json`.
    ComposerJson,
}

impl VersionSource {
    /// The convention file this source reads.
    pub fn file(&self) -> &'static str {
        match self {
            VersionSource::ToolVersions(_) => ".tool-versions",
            VersionSource::Mise(_) => ".mise.toml",
            VersionSource::VersionFile(file) => *file,
            VersionSource::RuntimeTxt => "runtime.txt",
            VersionSource::GoMod => "go.mod",
            VersionSource::PackageJsonEngines => "package.json",
            VersionSource::Gemfile => "Gemfile",
            VersionSource::ComposerJson => "composer.json",
        }
    }

    /// Read the version this source pins, if any.
    pub fn read(&self, project_root: &Path) -> Result<Option<String>> {
        let version = match self {
            VersionSource::Mise(tool) => read_toml::<MiseToml>(project_root, self.file())?
                .and_then(|mise| mise.tool_version(tool).map(str::to_string)),
            VersionSource::PackageJsonEngines => {
                read_json::<PackageJson>(project_root, self.file())?
                    .and_then(|pkg| pkg.node_engine().and_then(resolve_engine_version))
            }
            VersionSource::ComposerJson => read_json::<ComposerJson>(project_root, self.file())?
                .and_then(|composer| {
                    composer
                        .php_constraint()
                        .and_then(extract_constraint_version)
                }),
            _ => read_optional(project_root, self.file())?
                .and_then(|content| self.read_lines(&content)),
        };

        Ok(version.filter(|v| !v.is_empty()))
    }

    fn read_lines(&self, content: &str) -> Option<String> {
        match self {
            VersionSource::ToolVersions(tool) => tool_versions_entry(content, tool),
            VersionSource::VersionFile(_) => content
                .lines()
                .map(str::trim)
                .find(|line| !line.is_empty())
                .map(|line| line.strip_prefix('v').unwrap_or(line).to_string()),
            VersionSource::RuntimeTxt => content
                .lines()
                .find_map(|line| line.trim().strip_prefix("python-"))
                .map(str::to_string),
            VersionSource::GoMod => content.lines().find_map(|line| {
                line.trim()
                    .strip_prefix("go ")
                    .and_then(|rest| rest.split_whitespace().next())
                    .map(str::to_string)
            }),
            VersionSource::Gemfile => content
                .lines()
                .find(|line| line.starts_with("ruby"))
                .and_then(quoted_value)
                .and_then(|constraint| extract_constraint_version(&constraint)),
            _ => None,
        }
    }
}

/// Version pinned for `tool` in `.tool-versions` content.
pub fn tool_versions_entry(content: &str, tool: &str) -> Option<String> {
    content.lines().find_map(|line| {
        let mut tokens = line.split_whitespace();
        if tokens.next()? == tool {
            tokens.next().map(str::to_string)
        } else {
            None
        }
    })
}

/// The first single- or double-quoted value on a line.
fn quoted_value(line: &str) -> Option<String> {
    let start = line.find(['\'', '"'])?;
    let quote = line[start..].chars().next()?;
    let rest = &line[start + 1..];
    let end = rest.find(quote)?;
    Some(rest[..end].to_string())
}

/// Ordered version lookup for one tool.
#[derive(Debug, Clone)]
pub struct VersionResolver {
    label: &'static str,
    sources: Vec<VersionSource>,
    default: &'static str,
}

impl VersionResolver {
    /// Create a resolver; `label` names the tool in log output.
    pub fn new(label: &'static str, sources: Vec<VersionSource>, default: &'static str) -> Self {
        Self {
            label,
            sources,
            default,
        }
    }

    /// Resolve the version, falling back to the default.
    pub fn resolve(&self, project_root: &Path) -> Result<String> {
        for source in &self.sources {
            if let Some(version) = source.read(project_root)? {
                info!(
                    "Detected {} version in {}: {}",
                    self.label,
                    source.file(),
                    version
                );
                return Ok(version);
            }
        }

        info!("No {} version detected. Using: {}", self.label, self.default);
        Ok(self.default.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DockerfileError;
    use std::fs;
    use tempfile::TempDir;

    fn go_resolver() -> VersionResolver {
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

    #[test]
    fn tool_versions_matches_first_token_only() {
        let content = "nodejs 20.1.0\ngolang 1.21.5\n";
        assert_eq!(tool_versions_entry(content, "golang"), Some("1.21.5".into()));
        assert_eq!(tool_versions_entry(content, "go"), None);
        assert_eq!(tool_versions_entry("golang\n", "golang"), None);
    }

    #[test]
    fn falls_back_to_default() {
        let temp = TempDir::new().unwrap();
        assert_eq!(go_resolver().resolve(temp.path()).unwrap(), "1.17");
    }

    #[test]
    fn generic_file_listed_first_wins() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".tool-versions"), "golang 1.20.1\n").unwrap();
        fs::write(temp.path().join("go.mod"), "module example.com/x\n\ngo 1.22.3\n").unwrap();

        assert_eq!(go_resolver().resolve(temp.path()).unwrap(), "1.20.1");
    }

    #[test]
    fn manifest_listed_first_wins() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".tool-versions"), "golang 1.20.1\n").unwrap();
        fs::write(temp.path().join("go.mod"), "module example.com/x\n\ngo 1.22.3\n").unwrap();

        let resolver = VersionResolver::new(
            "Go",
            vec![VersionSource::GoMod, VersionSource::ToolVersions("golang")],
            "1.17",
        );
        assert_eq!(resolver.resolve(temp.path()).unwrap(), "1.22.3");
    }

    #[test]
    fn file_without_the_tool_falls_through() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".tool-versions"), "nodejs 20.1.0\n").unwrap();
        fs::write(temp.path().join(".mise.toml"), "[tools]\ngo = \"1.16\"\n").unwrap();

        assert_eq!(go_resolver().resolve(temp.path()).unwrap(), "1.16");
    }

    #[test]
    fn malformed_mise_is_fatal() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".mise.toml"), "tools = [").unwrap();

        let result = go_resolver().resolve(temp.path());
        assert!(matches!(result, Err(DockerfileError::ConfigParse { .. })));
    }

    #[test]
    fn version_file_strips_v_prefix_and_blank_lines() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".nvmrc"), "\nv18.19.0\n").unwrap();

        let source = VersionSource::VersionFile(".nvmrc");
        assert_eq!(source.read(temp.path()).unwrap(), Some("18.19.0".into()));
    }

    #[test]
    fn runtime_txt_reads_python_prefix() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("runtime.txt"), "python-3.11.4\n").unwrap();

        assert_eq!(
            VersionSource::RuntimeTxt.read(temp.path()).unwrap(),
            Some("3.11.4".into())
        );
    }

    #[test]
    fn gemfile_reads_ruby_directive() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("Gemfile"),
            "source 'https://rubygems.org'\nruby \">= 3.2.2\"\ngem 'rack'\n",
        )
        .unwrap();

        assert_eq!(
            VersionSource::Gemfile.read(temp.path()).unwrap(),
            Some("3.2.2".into())
        );
    }

    #[test]
    fn gemfile_pessimistic_constraint_is_no_data() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("Gemfile"), "ruby \"~> 3.2.0\"\n").unwrap();

        assert_eq!(VersionSource::Gemfile.read(temp.path()).unwrap(), None);
    }

    #[test]
    fn composer_reads_php_constraint() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("composer.json"),
            r#"{"require": {"php": ">=5.3.", "laravel/framework": "^10.0"}}"#,
        )
        .unwrap();

        assert_eq!(
            VersionSource::ComposerJson.read(temp.path()).unwrap(),
            Some("5.3".into())
        );
    }

    #[test]
    fn package_json_engines_resolves_range() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("package.json"),
            r#"{"engines": {"node": ">=16.4 <19"}}"#,
        )
        .unwrap();

        assert_eq!(
            VersionSource::PackageJsonEngines.read(temp.path()).unwrap(),
            Some("16.4".into())
        );
    }
}
