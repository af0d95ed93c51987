//! Dockerfile generation entry point.
//!
//! [`Dockerfile`] owns the matcher chain: it lists the runtimes, picks the
//! first one that claims a project (or the one named by the caller), and
//! turns its rendered output into a file on disk.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, Dispatch};

use crate::error::{DockerfileError, Result};
use crate::runtime::{Matcher, Overrides, Runtime, RuntimeName};

/// File name written into the project directory.
pub const DOCKERFILE_NAME: &str = "Dockerfile";

/// Runtime detection and Dockerfile generation for project directories.
#[derive(Debug, Clone)]
pub struct Dockerfile {
    log: Dispatch,
}

impl Default for Dockerfile {
    /// Logs through the process-wide default subscriber.
    fn default() -> Self {
        Self::new(Dispatch::default())
    }
}

impl Dockerfile {
    /// Build a generator whose matchers all log through `log`.
    pub fn new(log: Dispatch) -> Self {
        Self { log }
    }

    /// Runtimes tried by [`match_runtime`](Self::match_runtime), in order.
    pub fn list_runtimes(&self) -> Vec<Runtime> {
        RuntimeName::DETECTION_ORDER
            .into_iter()
            .map(|name| Runtime::new(name, self.log.clone()))
            .collect()
    }

    /// First runtime in detection order that claims `path`.
    pub fn match_runtime(&self, path: &Path) -> Result<Runtime> {
        self.list_runtimes()
            .into_iter()
            .find(|runtime| runtime.matches(path))
            .ok_or_else(|| DockerfileError::RuntimeNotDetected {
                supported: RuntimeName::DETECTION_ORDER
                    .iter()
                    .map(|name| name.to_string())
                    .collect(),
            })
    }

    /// Runtime selected by display name, case-insensitively.
    pub fn find_runtime(&self, name: &str) -> Result<Runtime> {
        RuntimeName::from_name(name)
            .map(|runtime| Runtime::new(runtime, self.log.clone()))
            .ok_or_else(|| DockerfileError::UnknownRuntime {
                name: name.to_string(),
                expected: RuntimeName::ALL.iter().map(|n| n.to_string()).collect(),
            })
    }

    /// Generate a Dockerfile for `path`.
    ///
    /// With `runtime` set the named runtime is used even if it would not
    /// match; otherwise the detection chain picks one.
    pub fn generate(
        &self,
        path: &Path,
        runtime: Option<&str>,
        overrides: &Overrides,
    ) -> Result<(RuntimeName, Vec<u8>)> {
        let runtime = match runtime {
            Some(name) => self.find_runtime(name)?,
            None => self.match_runtime(path)?,
        };

        let contents = runtime.generate_dockerfile(path, overrides)?;
        Ok((runtime.name(), contents))
    }

    /// Generate and write `<path>/Dockerfile`, returning the written path.
    pub fn write(
        &self,
        path: &Path,
        runtime: Option<&str>,
        overrides: &Overrides,
    ) -> Result<PathBuf> {
        let (name, contents) = self.generate(path, runtime, overrides)?;
        let target = path.join(DOCKERFILE_NAME);
        fs::write(&target, contents)?;

        tracing::dispatcher::with_default(&self.log, || {
            info!("Auto-generated Dockerfile for project using {}", name);
        });
        Ok(target)
    }
}
