//! Pass-through for projects that already ship a Dockerfile.

use std::fs;
use std::path::Path;

use tracing::{debug, info, Dispatch};

use super::{with_log, Matcher, Overrides, RuntimeName};
use crate::error::Result;

/// Returns an existing `Dockerfile` unchanged.
///
/// Only selected by name; automatic detection never picks it.
#[derive(Debug, Clone)]
pub struct Docker {
    log: Dispatch,
}

impl Docker {
    pub fn new(log: Dispatch) -> Self {
        Self { log }
    }
}

impl Matcher for Docker {
    fn name(&self) -> RuntimeName {
        RuntimeName::Docker
    }

    fn matches(&self, path: &Path) -> bool {
        with_log(&self.log, || {
            if path.join("Dockerfile").is_file() {
                info!("Detected Docker project");
                true
            } else {
                debug!("Docker project not detected");
                false
            }
        })
    }

    fn generate_dockerfile(&self, path: &Path, _overrides: &Overrides) -> Result<Vec<u8>> {
        Ok(fs::read(path.join("Dockerfile"))?)
    }
}
