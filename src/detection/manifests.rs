//! Typed views of the manifests the runtimes read.
//!
//! Only the fields that drive detection are modelled. Values that are
//! usually strings are kept as [`serde_json::Value`] / [`toml::Value`] so a
//! manifest with an unexpected shape degrades to "no data" instead of a
//! decode failure.

use std::path::Path;

use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::{Map, Value};

use super::file_detection::read_optional;
use crate::error::{DockerfileError, Result};

/// Decode a JSON file if it exists.
pub fn read_json<T: DeserializeOwned>(project_root: &Path, file: &str) -> Result<Option<T>> {
    match read_optional(project_root, file)? {
        Some(content) => serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| DockerfileError::parse(project_root.join(file), e)),
        None => Ok(None),
    }
}

/// Decode a TOML file if it exists.
pub fn read_toml<T: DeserializeOwned>(project_root: &Path, file: &str) -> Result<Option<T>> {
    match read_optional(project_root, file)? {
        Some(content) => toml::from_str(&content)
            .map(Some)
            .map_err(|e| DockerfileError::parse(project_root.join(file), e)),
        None => Ok(None),
    }
}

/// A JSON object, or an empty map for `null` or any other shape.
fn object_or_empty<'de, D>(deserializer: D) -> std::result::Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Object(map) => Ok(map),
        _ => Ok(Map::new()),
    }
}

/// `package.json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageJson {
    #[serde(default, deserialize_with = "object_or_empty")]
    pub scripts: Map<String, Value>,
    #[serde(default, deserialize_with = "object_or_empty")]
    pub engines: Map<String, Value>,
    pub main: Option<Value>,
    pub module: Option<Value>,
}

impl PackageJson {
    /// The `engines.node` constraint, if present.
    pub fn node_engine(&self) -> Option<&str> {
        self.engines.get("node").and_then(Value::as_str)
    }

    /// The `main` entry point, falling back to `module`.
    pub fn entry_point(&self) -> Option<&str> {
        match &self.main {
            Some(main) => main.as_str(),
            None => self.module.as_ref().and_then(Value::as_str),
        }
    }
}

/// `deno.json` / `deno.jsonc`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DenoJson {
    #[serde(default, deserialize_with = "object_or_empty")]
    pub tasks: Map<String, Value>,
}

/// `composer.json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComposerJson {
    #[serde(default, deserialize_with = "object_or_empty")]
    pub require: Map<String, Value>,
}

impl ComposerJson {
    /// The `require.php` constraint, if present.
    pub fn php_constraint(&self) -> Option<&str> {
        self.require.get("php").and_then(Value::as_str)
    }
}

/// A `name = "..."` table such as `[package]`, `[lib]` or a `[[bin]]` entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NamedTarget {
    pub name: Option<String>,
}

/// `Cargo.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CargoToml {
    #[serde(default)]
    pub bin: Vec<NamedTarget>,
    pub lib: Option<NamedTarget>,
    pub package: Option<NamedTarget>,
}

/// Where a Cargo binary name was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CargoTarget {
    Bin,
    Lib,
    Package,
}

impl CargoTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            CargoTarget::Bin => "[[bin]]",
            CargoTarget::Lib => "[lib]",
            CargoTarget::Package => "[package]",
        }
    }
}

impl CargoToml {
    /// First table present among `[[bin]]`, `[lib]`, `[package]` and the name it carries.
    pub fn binary_target(&self) -> Option<(CargoTarget, Option<&str>)> {
        if let Some(bin) = self.bin.first() {
            return Some((CargoTarget::Bin, bin.name.as_deref()));
        }
        if let Some(lib) = &self.lib {
            return Some((CargoTarget::Lib, lib.name.as_deref()));
        }
        self.package
            .as_ref()
            .map(|pkg| (CargoTarget::Package, pkg.name.as_deref()))
    }
}

/// `pyproject.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PyProject {
    pub project: Option<NamedTarget>,
    pub tool: Option<PyProjectTools>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PyProjectTools {
    pub poetry: Option<NamedTarget>,
}

impl PyProject {
    /// `[project].name`, else `[tool.poetry].name`.
    pub fn name(&self) -> Option<&str> {
        self.project
            .as_ref()
            .and_then(|p| p.name.as_deref())
            .or_else(|| {
                self.tool
                    .as_ref()
                    .and_then(|t| t.poetry.as_ref())
                    .and_then(|p| p.name.as_deref())
            })
    }
}

/// `.mise.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MiseToml {
    #[serde(default)]
    pub tools: toml::Table,
}

impl MiseToml {
    /// Version pinned for `tool`: a plain string or the first element of an array.
    pub fn tool_version(&self, tool: &str) -> Option<&str> {
        match self.tools.get(tool)? {
            toml::Value::String(version) => Some(version.as_str()),
            toml::Value::Array(versions) => versions.first().and_then(toml::Value::as_str),
            _ => None,
        }
    }
}
