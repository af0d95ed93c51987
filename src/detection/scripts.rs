//! Script-table scans and shell-safe command quoting.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

/// Start script names, most production-specific first.
pub const START_SCRIPTS: &[&str] = &[
    "serve",
    "start:prod",
    "start:production",
    "start-prod",
    "start-production",
    "preview",
    "start",
];

/// Build script names, most production-specific first.
pub const BUILD_SCRIPTS: &[&str] = &[
    "build:prod",
    "build:production",
    "build-prod",
    "build-production",
    "build",
];

/// A script that launches node (or ts-node / nodemon) on an entry file.
static START_SCRIPT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^.*?\b(ts-)?node(mon)?\b.*?(index|main|server|client)\.([cm]?[tj]s)\b").unwrap()
});

/// First name in `priority` that is a string entry of `scripts`.
pub fn find_script<'a>(scripts: &Map<String, Value>, priority: &[&'a str]) -> Option<&'a str> {
    priority
        .iter()
        .copied()
        .find(|name| scripts.get(*name).is_some_and(Value::is_string))
}

/// First script (by name) whose body runs node against an entry file.
pub fn find_start_script_by_pattern(scripts: &Map<String, Value>) -> Option<&str> {
    scripts
        .iter()
        .find(|(_, body)| body.as_str().is_some_and(|b| START_SCRIPT_RE.is_match(b)))
        .map(|(name, _)| name.as_str())
}

/// Quote a command for a Dockerfile `ARG` default.
///
/// The command is JSON-encoded so that quotes and backslashes survive, then
/// escaped `&&` sequences are turned back into the literal operator. An empty
/// command stays empty so the template renders `ARG X=`.
pub fn safe_command(cmd: &str) -> String {
    if cmd.is_empty() {
        return String::new();
    }

    match serde_json::to_string(cmd) {
        Ok(quoted) => quoted.replace(r"\u0026\u0026", "&&"),
        Err(_) => String::new(),
    }
}
