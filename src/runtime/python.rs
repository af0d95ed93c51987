//! Python runtime.
//!
//! Start command priority: Django's `manage.py`, then `python -m <project>`
//! for packaged projects, then the first conventional main file. FastAPI
//! projects skip the module form and run their main file with `fastapi run`.

use std::path::Path;

use tracing::{debug, info, Dispatch};

use super::{log_defaults, with_log, Matcher, Overrides, RuntimeName};
use crate::detection::file_detection::any_file_mentions;
use crate::detection::manifests::{read_toml, PyProject};
use crate::detection::{
    any_file_exists, file_exists, PythonPackageManager, VersionResolver, VersionSource,
};
use crate::error::Result;
use crate::template::{self, TemplateData};

const MARKERS: &[&str] = &[
    "requirements.txt",
    "poetry.lock",
    "uv.lock",
    "Pipfile.lock",
    "pyproject.toml",
    "pdm.lock",
    "main.py",
    "app.py",
    "application.py",
    "app/__init__.py",
];

/// Files inside a directory named after the project that also mark it.
const PACKAGE_MARKERS: &[&str] = &["app.py", "application.py", "main.py", "__init__.py"];

const MAIN_FILES: &[&str] = &[
    "main.py",
    "app.py",
    "application.py",
    "app/main.py",
    "app/__init__.py",
];

const PACKAGE_MAIN_FILES: &[&str] = &["main.py", "app.py", "application.py", "__init__.py"];

/// Dependency manifests scanned for framework names.
const DEPENDENCY_FILES: &[&str] = &["requirements.txt", "pyproject.toml", "Pipfile"];

#[derive(Debug, Clone)]
pub struct Python {
    log: Dispatch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PythonFacts {
    pub version: String,
    pub package_manager: Option<PythonPackageManager>,
    pub install: String,
    pub start: String,
}

impl Python {
    pub fn new(log: Dispatch) -> Self {
        Self { log }
    }

    pub fn version_resolver() -> VersionResolver {
        VersionResolver::new(
            "Python",
            vec![
                VersionSource::ToolVersions("python"),
                VersionSource::VersionFile(".python-version"),
                VersionSource::Mise("python"),
                VersionSource::RuntimeTxt,
            ],
            "3.12",
        )
    }

    pub fn detect(path: &Path) -> Result<PythonFacts> {
        let version = Self::version_resolver().resolve(path)?;

        let package_manager = PythonPackageManager::detect(path);
        let install = match package_manager {
            Some(pm) => {
                info!("Detected Python package manager: {}", pm);
                pm.install_command().to_string()
            }
            None => String::new(),
        };

        let start = start_command(path)?;

        Ok(PythonFacts {
            version,
            package_manager,
            install,
            start,
        })
    }
}

/// Name of the project directory, used for the `<project>/main.py` layout.
fn project_basename(path: &Path) -> String {
    path.canonicalize()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .or_else(|| path.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_default()
}

fn package_paths(base: &str, files: &[&str]) -> Vec<String> {
    if base.is_empty() {
        return Vec::new();
    }
    files.iter().map(|f| format!("{}/{}", base, f)).collect()
}

fn django_manage_file(path: &Path, base: &str) -> Option<String> {
    let mut candidates = vec!["manage.py".to_string(), "app/manage.py".to_string()];
    candidates.extend(package_paths(base, &["manage.py"]));

    let manage = candidates.into_iter().find(|f| file_exists(path, f))?;
    if any_file_mentions(path, DEPENDENCY_FILES, "django") {
        Some(manage)
    } else {
        None
    }
}

fn start_command(path: &Path) -> Result<String> {
    let base = project_basename(path);

    if let Some(manage) = django_manage_file(path, &base) {
        info!("Detected Django project");
        return Ok(format!("python {} runserver 0.0.0.0:${{PORT}}", manage));
    }

    let fastapi = any_file_mentions(path, DEPENDENCY_FILES, "fastapi");
    if fastapi {
        info!("Detected FastAPI project");
    } else if let Some(pyproject) = read_toml::<PyProject>(path, "pyproject.toml")? {
        let module = pyproject.name().map(str::to_string).unwrap_or_else(|| base.clone());
        if !module.is_empty() {
            info!("Detected start command via pyproject.toml");
            return Ok(format!("python -m {}", module));
        }
    }

    let mut main_files: Vec<String> = MAIN_FILES.iter().map(|f| f.to_string()).collect();
    main_files.extend(package_paths(&base, PACKAGE_MAIN_FILES));

    let Some(main) = main_files.into_iter().find(|f| file_exists(path, f)) else {
        debug!("No Python main file found");
        return Ok(String::new());
    };

    let command = if fastapi {
        format!("fastapi run {} --port ${{PORT}}", main)
    } else {
        format!("python {}", main)
    };
    info!("Detected start command via main file: {}", command);
    Ok(command)
}

impl PythonFacts {
    pub fn template_data(&self) -> TemplateData {
        TemplateData::new()
            .with("Version", &self.version)
            .with_command("InstallCMD", &self.install)
            .with_command("StartCMD", &self.start)
            .with(
                "PackagerInstructions",
                self.package_manager
                    .map_or("", |pm| pm.packager_instructions()),
            )
    }
}

impl Matcher for Python {
    fn name(&self) -> RuntimeName {
        RuntimeName::Python
    }

    fn matches(&self, path: &Path) -> bool {
        with_log(&self.log, || {
            let base = project_basename(path);
            let nested = package_paths(&base, PACKAGE_MARKERS);
            let nested: Vec<&str> = nested.iter().map(String::as_str).collect();

            match any_file_exists(path, MARKERS).or_else(|| any_file_exists(path, &nested)) {
                Some(marker) => {
                    info!("Detected Python project ({})", marker);
                    true
                }
                None => {
                    debug!("Python project not detected");
                    false
                }
            }
        })
    }

    fn generate_dockerfile(&self, path: &Path, overrides: &Overrides) -> Result<Vec<u8>> {
        with_log(&self.log, || {
            let facts = Self::detect(path)?;
            log_defaults(&[
                ("Python version", facts.version.as_str()),
                ("Install command", facts.install.as_str()),
                ("Start command", facts.start.as_str()),
            ]);

            template::render("python", &facts.template_data().merge(overrides))
        })
    }
}
