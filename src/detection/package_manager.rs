//! Package manager detection from lockfiles.

use std::path::Path;

use super::file_detection::file_exists;

/// JavaScript package manager behind a Node-flavoured project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodePackageManager {
    Npm,
    Yarn,
    Pnpm,
    Bun,
}

impl NodePackageManager {
    /// Detection for Node projects: `yarn.lock`, then `pnpm-lock.yaml`, else npm.
    pub fn detect(project_root: &Path) -> Self {
        if file_exists(project_root, "yarn.lock") {
            NodePackageManager::Yarn
        } else if file_exists(project_root, "pnpm-lock.yaml") {
            NodePackageManager::Pnpm
        } else {
            NodePackageManager::Npm
        }
    }

    /// Detection for projects that only carry frontend assets (Ruby, PHP).
    ///
    /// Checks `package-lock.json`, `pnpm-lock.yaml`, `yarn.lock` and `bun.lockb`
    /// in that order; `None` when there is no lockfile at all.
    pub fn detect_frontend(project_root: &Path) -> Option<Self> {
        [
            ("package-lock.json", NodePackageManager::Npm),
            ("pnpm-lock.yaml", NodePackageManager::Pnpm),
            ("yarn.lock", NodePackageManager::Yarn),
            ("bun.lockb", NodePackageManager::Bun),
        ]
        .into_iter()
        .find(|(lockfile, _)| file_exists(project_root, lockfile))
        .map(|(_, pm)| pm)
    }

    /// Executable name.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodePackageManager::Npm => "npm",
            NodePackageManager::Yarn => "yarn",
            NodePackageManager::Pnpm => "pnpm",
            NodePackageManager::Bun => "bun",
        }
    }

    /// Install command for an image where corepack is already enabled.
    pub fn install_command(&self) -> &'static str {
        match self {
            NodePackageManager::Npm => "npm ci",
            NodePackageManager::Yarn => "yarn --frozen-lockfile",
            NodePackageManager::Pnpm => "pnpm i --frozen-lockfile",
            NodePackageManager::Bun => "bun install",
        }
    }

    /// Install command for an image without corepack enabled.
    pub fn standalone_install_command(&self) -> &'static str {
        match self {
            NodePackageManager::Pnpm => "corepack enable pnpm && pnpm i --frozen-lockfile",
            other => other.install_command(),
        }
    }

    /// `<pm> run <script>`.
    pub fn run_script(&self, script: &str) -> String {
        format!("{} run {}", self.as_str(), script)
    }
}

impl std::fmt::Display for NodePackageManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Python packaging tool, chosen by lockfile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PythonPackageManager {
    Pip,
    Uv,
    Poetry,
    Pipenv,
    Pdm,
    /// `pyproject.toml` without a lockfile: build and install the project itself.
    PipProject,
}

impl PythonPackageManager {
    /// First lockfile present wins; `None` for projects with no manifest at all.
    pub fn detect(project_root: &Path) -> Option<Self> {
        [
            ("requirements.txt", PythonPackageManager::Pip),
            ("uv.lock", PythonPackageManager::Uv),
            ("poetry.lock", PythonPackageManager::Poetry),
            ("Pipfile.lock", PythonPackageManager::Pipenv),
            ("pdm.lock", PythonPackageManager::Pdm),
            ("pyproject.toml", PythonPackageManager::PipProject),
        ]
        .into_iter()
        .find(|(file, _)| file_exists(project_root, file))
        .map(|(_, pm)| pm)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PythonPackageManager::Pip | PythonPackageManager::PipProject => "pip",
            PythonPackageManager::Uv => "uv",
            PythonPackageManager::Poetry => "poetry",
            PythonPackageManager::Pipenv => "pipenv",
            PythonPackageManager::Pdm => "pdm",
        }
    }

    pub fn install_command(&self) -> &'static str {
        match self {
            PythonPackageManager::Pip => "pip install --no-cache -r requirements.txt",
            PythonPackageManager::Uv => {
                "pip install uv && uv sync --python-preference=only-system --no-cache --no-dev"
            }
            PythonPackageManager::Poetry => {
                "pip install poetry && poetry install --no-dev --no-ansi --no-root"
            }
            PythonPackageManager::Pipenv => {
                "pip install pipenv && pipenv install --dev --system --deploy"
            }
            PythonPackageManager::Pdm => "pip install pdm && pdm install --prod",
            PythonPackageManager::PipProject => {
                "pip install --upgrade build setuptools && pip install ."
            }
        }
    }

    /// Extra `ENV` directives the tool needs inside the image.
    pub fn packager_instructions(&self) -> &'static str {
        match self {
            PythonPackageManager::Poetry => POETRY_INSTRUCTIONS,
            PythonPackageManager::Uv => UV_INSTRUCTIONS,
            _ => "",
        }
    }
}

const POETRY_INSTRUCTIONS: &str = "ENV POETRY_NO_INTERACTION=1
ENV POETRY_VIRTUALENVS_CREATE=false
ENV POETRY_CACHE_DIR='/var/cache/pypoetry'
ENV POETRY_HOME='/usr/local'";

const UV_INSTRUCTIONS: &str = "ENV UV_CACHE_DIR='/var/cache/uv'
ENV VIRTUAL_ENV=/app/.venv
ENV PATH=\"/app/.venv/bin:$PATH\"";

impl std::fmt::Display for PythonPackageManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
