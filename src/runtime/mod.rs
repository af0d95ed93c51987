//! Runtime matchers.
//!
//! Each supported ecosystem has one matcher implementing [`Matcher`]. The
//! closed [`Runtime`] enum wraps them all so the dispatcher can hold an
//! ordered list without trait objects.
//!
//! Matchers log through the [`Dispatch`] they were built with rather than the
//! process default, so a caller can route (or silence) each one separately.

pub mod bun;
pub mod deno;
pub mod docker;
pub mod elixir;
pub mod golang;
pub mod java;
pub mod nextjs;
pub mod node;
pub mod php;
pub mod python;
pub mod ruby;
pub mod rust;
pub mod static_site;

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use tracing::{debug, info, Dispatch};

use crate::detection::any_file_exists;
use crate::error::Result;

pub use bun::Bun;
pub use deno::Deno;
pub use docker::Docker;
pub use elixir::Elixir;
pub use golang::Golang;
pub use java::Java;
pub use nextjs::NextJs;
pub use node::Node;
pub use php::Php;
pub use python::Python;
pub use ruby::Ruby;
pub use rust::Rust;
pub use static_site::Static;

/// Caller-supplied template values, merged over the detected facts.
pub type Overrides = BTreeMap<String, String>;

/// Identity of a runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuntimeName {
    Golang,
    Ruby,
    Python,
    Php,
    Elixir,
    Java,
    Rust,
    NextJs,
    Bun,
    Deno,
    Node,
    Static,
    Docker,
}

impl RuntimeName {
    /// Runtimes tried by automatic detection, highest priority first.
    ///
    /// Next.js, Deno and Bun projects usually also look like Node projects,
    /// so they must be probed before Node.
    pub const DETECTION_ORDER: [RuntimeName; 12] = [
        RuntimeName::Golang,
        RuntimeName::Rust,
        RuntimeName::Ruby,
        RuntimeName::Python,
        RuntimeName::Php,
        RuntimeName::Java,
        RuntimeName::Elixir,
        RuntimeName::NextJs,
        RuntimeName::Deno,
        RuntimeName::Bun,
        RuntimeName::Node,
        RuntimeName::Static,
    ];

    /// Every runtime that can be selected by name.
    pub const ALL: [RuntimeName; 13] = [
        RuntimeName::Golang,
        RuntimeName::Rust,
        RuntimeName::Ruby,
        RuntimeName::Python,
        RuntimeName::Php,
        RuntimeName::Java,
        RuntimeName::Elixir,
        RuntimeName::NextJs,
        RuntimeName::Deno,
        RuntimeName::Bun,
        RuntimeName::Node,
        RuntimeName::Static,
        RuntimeName::Docker,
    ];

    /// Display name.
    pub fn as_str(&self) -> &'static str {
        match self {
            RuntimeName::Golang => "Go",
            RuntimeName::Ruby => "Ruby",
            RuntimeName::Python => "Python",
            RuntimeName::Php => "PHP",
            RuntimeName::Elixir => "Elixir",
            RuntimeName::Java => "Java",
            RuntimeName::Rust => "Rust",
            RuntimeName::NextJs => "Next.js",
            RuntimeName::Bun => "Bun",
            RuntimeName::Deno => "Deno",
            RuntimeName::Node => "Node",
            RuntimeName::Static => "Static",
            RuntimeName::Docker => "Docker",
        }
    }

    /// Case-insensitive lookup by display name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|runtime| runtime.as_str().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for RuntimeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capability shared by every runtime.
pub trait Matcher {
    /// The runtime this matcher handles.
    fn name(&self) -> RuntimeName;

    /// Whether the project at `path` looks like this runtime.
    ///
    /// Only reads the filesystem; safe to call repeatedly.
    fn matches(&self, path: &Path) -> bool;

    /// Build a Dockerfile for the project at `path`.
    ///
    /// `overrides` are merged over the detected template data, overrides winning.
    fn generate_dockerfile(&self, path: &Path, overrides: &Overrides) -> Result<Vec<u8>>;
}

/// All runtimes as a closed set.
#[derive(Debug, Clone)]
pub enum Runtime {
    Golang(Golang),
    Rust(Rust),
    Ruby(Ruby),
    Python(Python),
    Php(Php),
    Java(Java),
    Elixir(Elixir),
    NextJs(NextJs),
    Deno(Deno),
    Bun(Bun),
    Node(Node),
    Static(Static),
    Docker(Docker),
}

macro_rules! delegate {
    ($self:ident, $runtime:ident => $body:expr) => {
        match $self {
            Runtime::Golang($runtime) => $body,
            Runtime::Rust($runtime) => $body,
            Runtime::Ruby($runtime) => $body,
            Runtime::Python($runtime) => $body,
            Runtime::Php($runtime) => $body,
            Runtime::Java($runtime) => $body,
            Runtime::Elixir($runtime) => $body,
            Runtime::NextJs($runtime) => $body,
            Runtime::Deno($runtime) => $body,
            Runtime::Bun($runtime) => $body,
            Runtime::Node($runtime) => $body,
            Runtime::Static($runtime) => $body,
            Runtime::Docker($runtime) => $body,
        }
    };
}

impl Runtime {
    /// Build the matcher for `name`, logging through `log`.
    pub fn new(name: RuntimeName, log: Dispatch) -> Self {
        match name {
            RuntimeName::Golang => Runtime::Golang(Golang::new(log)),
            RuntimeName::Rust => Runtime::Rust(Rust::new(log)),
            RuntimeName::Ruby => Runtime::Ruby(Ruby::new(log)),
            RuntimeName::Python => Runtime::Python(Python::new(log)),
            RuntimeName::Php => Runtime::Php(Php::new(log)),
            RuntimeName::Java => Runtime::Java(Java::new(log)),
            RuntimeName::Elixir => Runtime::Elixir(Elixir::new(log)),
            RuntimeName::NextJs => Runtime::NextJs(NextJs::new(log)),
            RuntimeName::Deno => Runtime::Deno(Deno::new(log)),
            RuntimeName::Bun => Runtime::Bun(Bun::new(log)),
            RuntimeName::Node => Runtime::Node(Node::new(log)),
            RuntimeName::Static => Runtime::Static(Static::new(log)),
            RuntimeName::Docker => Runtime::Docker(Docker::new(log)),
        }
    }
}

impl Matcher for Runtime {
    fn name(&self) -> RuntimeName {
        delegate!(self, runtime => runtime.name())
    }

    fn matches(&self, path: &Path) -> bool {
        delegate!(self, runtime => runtime.matches(path))
    }

    fn generate_dockerfile(&self, path: &Path, overrides: &Overrides) -> Result<Vec<u8>> {
        delegate!(self, runtime => runtime.generate_dockerfile(path, overrides))
    }
}

/// Run `f` with `log` as the active subscriber.
pub(crate) fn with_log<T>(log: &Dispatch, f: impl FnOnce() -> T) -> T {
    tracing::dispatcher::with_default(log, f)
}

/// Marker-file probe shared by most matchers.
pub(crate) fn match_markers(name: RuntimeName, path: &Path, markers: &[&str]) -> bool {
    match any_file_exists(path, markers) {
        Some(marker) => {
            info!("Detected {} project ({})", name, marker);
            true
        }
        None => {
            debug!("{} project not detected", name);
            false
        }
    }
}

/// Log the facts a generation settled on.
pub(crate) fn log_defaults(facts: &[(&str, &str)]) {
    let width = facts.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    let lines: Vec<String> = facts
        .iter()
        .map(|(label, value)| format!("  {:<width$} : {}", label, value, width = width))
        .collect();

    info!(
        "Detected defaults\n{}\n\n  Docker build arguments can supersede these defaults if provided.",
        lines.join("\n")
    );
}
