//! Java runtime (Maven and Gradle).

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{info, Dispatch};

use super::{log_defaults, match_markers, with_log, Matcher, Overrides, RuntimeName};
use crate::detection::file_detection::find_file_with_line;
use crate::detection::versions::tool_versions_entry;
use crate::detection::{any_file_exists, file_exists, read_optional, VersionResolver, VersionSource};
use crate::error::Result;
use crate::template::{self, TemplateData};

const POM_FILES: &[&str] = &[
    "pom.xml",
    "pom.atom",
    "pom.clj",
    "pom.groovy",
    "pom.rb",
    "pom.scala",
    "pom.yml",
    "pom.yaml",
];

const DEFAULT_JDK: &str = "17";

static MAJOR_VERSION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

#[derive(Debug, Clone)]
pub struct Java {
    log: Dispatch,
}

/// Build tool driving the image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JavaBuild {
    Maven { version: String },
    Gradle { version: String },
}

impl JavaBuild {
    pub fn template_name(&self) -> &'static str {
        match self {
            JavaBuild::Maven { .. } => "java-maven",
            JavaBuild::Gradle { .. } => "java-gradle",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JavaFacts {
    pub jdk_version: String,
    pub build_tool: JavaBuild,
    pub build: String,
    pub start: String,
}

impl Java {
    pub fn new(log: Dispatch) -> Self {
        Self { log }
    }

    /// JDK major version from `.tool-versions`, e.g. `temurin-21.0.2+13` gives `21`.
    pub fn jdk_version(path: &Path) -> Result<String> {
        let pinned = read_optional(path, ".tool-versions")?
            .and_then(|content| tool_versions_entry(&content, "java"))
            .and_then(|raw| MAJOR_VERSION_RE.find(&raw).map(|m| m.as_str().to_string()));

        match pinned {
            Some(version) => {
                info!("Detected JDK version in .tool-versions: {}", version);
                Ok(version)
            }
            None => {
                info!("No JDK version detected. Using: {}", DEFAULT_JDK);
                Ok(DEFAULT_JDK.to_string())
            }
        }
    }

    pub fn detect(path: &Path) -> Result<JavaFacts> {
        let jdk_version = Self::jdk_version(path)?;
        let gradle = file_exists(path, "gradlew");

        // A pom next to gradlew keeps the Gradle build command: the Gradle
        // builder image ships no mvn.
        let (build_tool, build, mut start) = if gradle {
            let version = VersionResolver::new(
                "Gradle",
                vec![VersionSource::ToolVersions("gradle")],
                "8",
            )
            .resolve(path)?;
            (
                JavaBuild::Gradle { version },
                "./gradlew clean build -x check -x test".to_string(),
                "java $JAVA_OPTS -jar $(ls -1 build/libs/*jar | grep -v plain)".to_string(),
            )
        } else {
            let version = VersionResolver::new(
                "Maven",
                vec![VersionSource::ToolVersions("maven")],
                "3",
            )
            .resolve(path)?;
            let build = if any_file_exists(path, POM_FILES).is_some() {
                "mvn -DoutputFile=target/mvn-dependency-list.log -B -DskipTests clean dependency:list install"
                    .to_string()
            } else {
                String::new()
            };
            (
                JavaBuild::Maven { version },
                build,
                "java $JAVA_OPTS -jar target/*jar".to_string(),
            )
        };

        if is_spring_boot(path) {
            info!("Detected Spring Boot application");
            start = if gradle {
                "java $JAVA_OPTS -jar -Dserver.port=${PORT} $(ls -1 build/libs/*jar | grep -v plain)"
                    .to_string()
            } else {
                "java -Dserver.port=${PORT} $JAVA_OPTS -jar target/*jar".to_string()
            };
        }

        if is_wildfly_swarm(path) {
            info!("Detected WildFly Swarm application");
            start = "java -Dswarm.http.port=${PORT} $JAVA_OPTS -jar target/*jar".to_string();
        }

        Ok(JavaFacts {
            jdk_version,
            build_tool,
            build,
            start,
        })
    }
}

fn is_spring_boot(path: &Path) -> bool {
    let mut files = POM_FILES.to_vec();
    files.push("build.gradle");
    find_file_with_line(path, &files, |line| line.contains("org.springframework.boot")).is_some()
}

fn is_wildfly_swarm(path: &Path) -> bool {
    find_file_with_line(path, POM_FILES, |line| {
        line.contains("wildfly-swarm") || line.contains("org.wildfly.swarm")
    })
    .is_some()
}

impl JavaFacts {
    pub fn template_data(&self) -> TemplateData {
        let data = TemplateData::new()
            .with("Version", &self.jdk_version)
            .with_command("BuildCMD", &self.build)
            .with_command("StartCMD", &self.start);

        match &self.build_tool {
            JavaBuild::Maven { version } => data.with("MavenVersion", version),
            JavaBuild::Gradle { version } => data.with("GradleVersion", version),
        }
    }
}

impl Matcher for Java {
    fn name(&self) -> RuntimeName {
        RuntimeName::Java
    }

    fn matches(&self, path: &Path) -> bool {
        with_log(&self.log, || {
            let mut markers = vec!["build.gradle", "gradlew"];
            markers.extend_from_slice(POM_FILES);
            match_markers(self.name(), path, &markers)
        })
    }

    fn generate_dockerfile(&self, path: &Path, overrides: &Overrides) -> Result<Vec<u8>> {
        with_log(&self.log, || {
            let facts = Self::detect(path)?;
            let (maven, gradle) = match &facts.build_tool {
                JavaBuild::Maven { version } => (version.as_str(), ""),
                JavaBuild::Gradle { version } => ("", version.as_str()),
            };
            log_defaults(&[
                ("JDK version", facts.jdk_version.as_str()),
                ("Maven version", maven),
                ("Gradle version", gradle),
                ("Build command", facts.build.as_str()),
                ("Start command", facts.start.as_str()),
            ]);

            template::render(
                facts.build_tool.template_name(),
                &facts.template_data().merge(overrides),
            )
        })
    }
}
