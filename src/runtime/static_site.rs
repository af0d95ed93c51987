//! Static site runtime.

use std::path::Path;

use tracing::{info, Dispatch};

use super::{match_markers, with_log, Matcher, Overrides, RuntimeName};
use crate::detection::{dir_exists, file_exists};
use crate::error::Result;
use crate::template::{self, TemplateData};

const MARKERS: &[&str] = &["public", "static", "dist", "index.html"];

const ROOT_DIRS: &[&str] = &["public", "static", "dist"];

/// Serves a directory of files with a static web server.
#[derive(Debug, Clone)]
pub struct Static {
    log: Dispatch,
}

impl Static {
    pub fn new(log: Dispatch) -> Self {
        Self { log }
    }

    /// Directory to serve: the project root when it has an `index.html`,
    /// else the first of `public`, `static`, `dist`.
    pub fn server_root(path: &Path) -> String {
        if file_exists(path, "index.html") {
            return ".".to_string();
        }

        ROOT_DIRS
            .iter()
            .find(|dir| dir_exists(path, dir))
            .map(|dir| dir.to_string())
            .unwrap_or_else(|| ".".to_string())
    }
}

impl Matcher for Static {
    fn name(&self) -> RuntimeName {
        RuntimeName::Static
    }

    fn matches(&self, path: &Path) -> bool {
        with_log(&self.log, || match_markers(self.name(), path, MARKERS))
    }

    fn generate_dockerfile(&self, path: &Path, overrides: &Overrides) -> Result<Vec<u8>> {
        with_log(&self.log, || {
            let root = Self::server_root(path);
            info!("Detected root directory: {}", root);

            let data = TemplateData::new().with("ServerRoot", root).merge(overrides);
            template::render("static", &data)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn index_html_serves_project_root() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("index.html"), "<html></html>").unwrap();
        fs::create_dir(temp.path().join("public")).unwrap();

        assert_eq!(Static::server_root(temp.path()), ".");
    }

    #[test]
    fn first_existing_directory_is_root() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("dist")).unwrap();
        fs::create_dir(temp.path().join("static")).unwrap();

        assert_eq!(Static::server_root(temp.path()), "static");
    }

    #[test]
    fn renders_server_root() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("public")).unwrap();

        let matcher = Static::new(Dispatch::none());
        assert!(matcher.matches(temp.path()));

        let bytes = matcher
            .generate_dockerfile(temp.path(), &Overrides::new())
            .unwrap();
        let out = String::from_utf8(bytes).unwrap();
        assert!(out.contains("ARG SERVER_ROOT=public"));
        assert!(out.contains("ENV PORT=8080"));
    }
}
