//! new-dockerfile - Autogenerate a Dockerfile from your project source code.
//!
//! The library inspects a project directory, decides which runtime it uses,
//! and renders a production Dockerfile for it from embedded templates.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`detection`] - Marker probes, version files and script scans
//! - [`error`] - Error types and result aliases
//! - [`generator`] - Runtime selection and Dockerfile output
//! - [`runtime`] - One matcher per supported runtime
//! - [`template`] - Embedded templates and placeholder rendering
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use new_dockerfile::{Dockerfile, Overrides};
//!
//! let generator = Dockerfile::default();
//! let (runtime, contents) = generator
//!     .generate(Path::new("."), None, &Overrides::new())
//!     .unwrap();
//! println!("{runtime}: {} bytes", contents.len());
//! ```

pub mod cli;
pub mod detection;
pub mod error;
pub mod generator;
pub mod runtime;
pub mod template;

pub use error::{DockerfileError, Result};
pub use generator::Dockerfile;
pub use runtime::{Matcher, Overrides, Runtime, RuntimeName};
