//! Next.js runtime.
//!
//! Two template variants exist: standalone output (the build emits its own
//! `server.js`) and the regular `next start` server.

use std::path::Path;

use tracing::{info, Dispatch};

use super::node::Node;
use super::{log_defaults, match_markers, with_log, Matcher, Overrides, RuntimeName};
use crate::detection::file_detection::find_file_with_line;
use crate::error::Result;
use crate::template::{self, TemplateData};

const MARKERS: &[&str] = &[
    "next.config.js",
    "next.config.ts",
    "next.config.cjs",
    "next.config.mjs",
    "next.config.mts",
    "next-env.d.ts",
    "src/next-env.d.ts",
    ".next",
];

const CONFIG_FILES: &[&str] = &[
    "next.config.js",
    "next.config.ts",
    "next.config.cjs",
    "next.config.mjs",
    "next.config.mts",
];

#[derive(Debug, Clone)]
pub struct NextJs {
    log: Dispatch,
}

/// Output mode declared in `next.config.*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextOutput {
    Standalone,
    Server,
}

impl NextOutput {
    pub fn template_name(&self) -> &'static str {
        match self {
            NextOutput::Standalone => "nextjs-standalone",
            NextOutput::Server => "nextjs-server",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextFacts {
    pub version: String,
    pub output: NextOutput,
}

impl NextJs {
    pub fn new(log: Dispatch) -> Self {
        Self { log }
    }

    pub fn detect(path: &Path) -> Result<NextFacts> {
        let output = match find_file_with_line(path, CONFIG_FILES, |line| {
            line.contains("output") && line.contains("standalone")
        }) {
            Some(file) => {
                info!("Found standalone output in {}", file);
                NextOutput::Standalone
            }
            None => NextOutput::Server,
        };

        Ok(NextFacts {
            version: Node::version_resolver().resolve(path)?,
            output,
        })
    }
}

impl NextFacts {
    pub fn template_data(&self) -> TemplateData {
        TemplateData::new().with("Version", &self.version)
    }
}

impl Matcher for NextJs {
    fn name(&self) -> RuntimeName {
        RuntimeName::NextJs
    }

    fn matches(&self, path: &Path) -> bool {
        with_log(&self.log, || match_markers(self.name(), path, MARKERS))
    }

    fn generate_dockerfile(&self, path: &Path, overrides: &Overrides) -> Result<Vec<u8>> {
        with_log(&self.log, || {
            let facts = Self::detect(path)?;
            log_defaults(&[
                ("Node version", facts.version.as_str()),
                ("Output", facts.output.template_name()),
            ]);

            template::render(
                facts.output.template_name(),
                &facts.template_data().merge(overrides),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn render(path: &Path) -> String {
        let bytes = NextJs::new(Dispatch::none())
            .generate_dockerfile(path, &Overrides::new())
            .unwrap();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn matches_next_directory() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join(".next")).unwrap();
        assert!(NextJs::new(Dispatch::none()).matches(temp.path()));
    }

    #[test]
    fn standalone_output_selects_standalone_template() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("next.config.mjs"),
            "export default {\n  output: 'standalone',\n}\n",
        )
        .unwrap();
        fs::write(temp.path().join(".nvmrc"), "20\n").unwrap();

        let out = render(temp.path());
        assert!(out.contains("ENV PORT=3000"));
        assert!(out.contains(r#"CMD HOSTNAME="0.0.0.0" node server.js"#));
        assert!(out.contains("ARG VERSION=20\n"));
    }

    #[test]
    fn default_is_server_template() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("next.config.js"), "module.exports = {}\n").unwrap();

        let out = render(temp.path());
        assert!(out.contains("ENV PORT=8080"));
        assert!(out.contains(r#"CMD ["node_modules/.bin/next", "start", "-H", "0.0.0.0"]"#));
        assert!(out.contains("ARG VERSION=lts\n"));
    }

    #[test]
    fn mounts_are_injected() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("next-env.d.ts"), "").unwrap();

        let mut overrides = Overrides::new();
        overrides.insert(
            "BuildMounts".into(),
            "--mount=type=cache,target=/app/.next/cache ".into(),
        );
        let bytes = NextJs::new(Dispatch::none())
            .generate_dockerfile(temp.path(), &overrides)
            .unwrap();
        let out = String::from_utf8(bytes).unwrap();
        assert!(out.contains(
            "RUN --mount=type=cache,target=/app/.next/cache if [ -f yarn.lock ]; then yarn run build"
        ));
    }
}
