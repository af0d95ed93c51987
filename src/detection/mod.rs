//! Convention scanners shared by the runtime matchers.

pub mod constraint;
pub mod file_detection;
pub mod manifests;
pub mod package_manager;
pub mod scripts;
pub mod versions;

pub use file_detection::{any_file_exists, dir_exists, file_exists, read_optional};
pub use package_manager::{NodePackageManager, PythonPackageManager};
pub use scripts::{safe_command, BUILD_SCRIPTS, START_SCRIPTS};
pub use versions::{VersionResolver, VersionSource};
