//! Deno runtime.

use std::fs;
use std::path::Path;

use tracing::{debug, info, Dispatch};
use walkdir::{DirEntry, WalkDir};

use super::{log_defaults, with_log, Matcher, Overrides, RuntimeName};
use crate::detection::manifests::{read_json, DenoJson};
use crate::detection::scripts::find_script;
use crate::detection::{any_file_exists, file_exists, VersionResolver, VersionSource, START_SCRIPTS};
use crate::error::Result;
use crate::template::{self, TemplateData};

const MARKERS: &[&str] = &["deno.json", "deno.jsonc", "deno.lock", "deps.ts", "mod.ts"];

/// `deno.jsonc` is preferred when both exist.
const CONFIG_FILES: &[&str] = &["deno.jsonc", "deno.json"];

const MAIN_FILES: &[&str] = &[
    "mod.ts",
    "src/mod.ts",
    "main.ts",
    "src/main.ts",
    "index.ts",
    "src/index.ts",
];

const MAX_SCAN_DEPTH: usize = 10;

const SKIPPED_DIRS: &[&str] = &["node_modules", ".git"];

#[derive(Debug, Clone)]
pub struct Deno {
    log: Dispatch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenoFacts {
    pub version: String,
    pub install: String,
    pub start: String,
}

impl Deno {
    pub fn new(log: Dispatch) -> Self {
        Self { log }
    }

    pub fn detect(path: &Path) -> Result<DenoFacts> {
        let mut start = String::new();
        let mut install = String::new();

        if let Some(config) = read_config(path)? {
            if let Some(task) = find_script(&config.tasks, START_SCRIPTS) {
                info!("Detected start command in deno.json: {}", task);
                start = format!("deno task {}", task);
            }
            if config.tasks.get("cache").is_some_and(|t| t.is_string()) {
                info!("Detected install command in deno.json: cache");
                install = "deno task cache".to_string();
            }
        }

        if start.is_empty() {
            if let Some(main) = MAIN_FILES.iter().find(|f| file_exists(path, f)) {
                info!("Detected start command via main/mod file: {}", main);
                start = format!("deno run --allow-all {}", main);
                if install.is_empty() {
                    install = format!("deno cache {}", main);
                }
            }
        }

        let version = VersionResolver::new(
            "Deno",
            vec![VersionSource::ToolVersions("deno"), VersionSource::Mise("deno")],
            "latest",
        )
        .resolve(path)?;

        Ok(DenoFacts {
            version,
            install,
            start,
        })
    }
}

fn read_config(path: &Path) -> Result<Option<DenoJson>> {
    for file in CONFIG_FILES {
        if let Some(config) = read_json::<DenoJson>(path, file)? {
            return Ok(Some(config));
        }
    }
    Ok(None)
}

fn is_skipped(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| SKIPPED_DIRS.contains(&name))
}

/// A line like `import { serve } from "https://deno.land/std/http/server.ts";`.
fn is_deno_import(line: &str) -> bool {
    (line.starts_with("import ") || line.starts_with("export "))
        && line.contains(" from ")
        && line.contains("https://deno.land/")
}

/// Scan TypeScript sources for a `deno.land` import. Unreadable entries are skipped.
fn find_deno_import(path: &Path) -> Option<String> {
    WalkDir::new(path)
        .max_depth(MAX_SCAN_DEPTH)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_skipped(entry))
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "ts"))
        .find(|entry| {
            fs::read_to_string(entry.path())
                .map(|content| content.lines().any(is_deno_import))
                .unwrap_or(false)
        })
        .map(|entry| entry.path().display().to_string())
}

impl DenoFacts {
    pub fn template_data(&self) -> TemplateData {
        TemplateData::new()
            .with("Version", &self.version)
            .with_command("InstallCMD", &self.install)
            .with_command("StartCMD", &self.start)
    }
}

impl Matcher for Deno {
    fn name(&self) -> RuntimeName {
        RuntimeName::Deno
    }

    fn matches(&self, path: &Path) -> bool {
        with_log(&self.log, || {
            let found = any_file_exists(path, MARKERS).or_else(|| find_deno_import(path));
            match found {
                Some(marker) => {
                    info!("Detected Deno project ({})", marker);
                    true
                }
                None => {
                    debug!("Deno project not detected");
                    false
                }
            }
        })
    }

    fn generate_dockerfile(&self, path: &Path, overrides: &Overrides) -> Result<Vec<u8>> {
        with_log(&self.log, || {
            let facts = Self::detect(path)?;
            log_defaults(&[
                ("Version", facts.version.as_str()),
                ("Install command", facts.install.as_str()),
                ("Start command", facts.start.as_str()),
            ]);

            template::render("deno", &facts.template_data().merge(overrides))
        })
    }
}
