//! Dockerfile templates and rendering.
//!
//! Templates are embedded at compile time from `templates/<name>.Dockerfile`.
//! Rendering substitutes `{{.Key}}` placeholders from a [`TemplateData`] map;
//! keys that were never set render as empty strings.

pub mod placeholder;

use std::collections::BTreeMap;

use include_dir::{include_dir, Dir};

use crate::detection::safe_command;
use crate::error::{DockerfileError, Result};
pub use placeholder::{extract_placeholders, parse_template, Segment};

/// Embedded templates directory.
static TEMPLATES_DIR: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/templates");

const TEMPLATE_EXTENSION: &str = "Dockerfile";

/// Facts handed to a template, keyed by placeholder name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateData(BTreeMap<String, String>);

impl TemplateData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a raw value.
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    /// Set a command, quoted for an `ARG` default.
    pub fn with_command(self, key: &str, command: &str) -> Self {
        self.with(key, safe_command(command))
    }

    /// Merge caller overrides; later values win.
    pub fn merge(mut self, overrides: &BTreeMap<String, String>) -> Self {
        self.0
            .extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    /// Value for `key`, or `""` when it was never set.
    pub fn get(&self, key: &str) -> &str {
        self.0.get(key).map(String::as_str).unwrap_or("")
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }
}

/// Raw source of an embedded template.
pub fn load(name: &str) -> Result<&'static str> {
    let path = format!("{}.{}", name, TEMPLATE_EXTENSION);
    let file = TEMPLATES_DIR
        .get_file(&path)
        .ok_or_else(|| DockerfileError::Template {
            name: name.to_string(),
            message: format!("no embedded template at templates/{}", path),
        })?;

    file.contents_utf8().ok_or_else(|| DockerfileError::Template {
        name: name.to_string(),
        message: "Invalid UTF-8".to_string(),
    })
}

/// Names of every embedded template.
pub fn available() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = TEMPLATES_DIR
        .files()
        .filter(|f| {
            f.path()
                .extension()
                .is_some_and(|ext| ext == TEMPLATE_EXTENSION)
        })
        .filter_map(|f| f.path().file_stem().and_then(|s| s.to_str()))
        .collect();
    names.sort_unstable();
    names
}

/// Render an embedded template.
pub fn render(name: &str, data: &TemplateData) -> Result<Vec<u8>> {
    render_source(name, load(name)?, data)
}

/// Render template text. Surrounding whitespace of the source is trimmed.
pub fn render_source(name: &str, source: &str, data: &TemplateData) -> Result<Vec<u8>> {
    let segments = parse_template(source.trim()).map_err(|e| DockerfileError::Template {
        name: name.to_string(),
        message: e.to_string(),
    })?;

    let mut out = String::with_capacity(source.len());
    for segment in &segments {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Placeholder(key) => out.push_str(data.get(key)),
        }
    }

    Ok(out.into_bytes())
}
