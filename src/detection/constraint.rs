//! Turning version constraints into concrete versions.
//!
//! Two strategies are used, neither of them a full solver:
//!
//! - Manifest constraints such as `>=7.4` or `^8.1` (composer, Gemfile) are
//!   read with a cascade of patterns; the first pattern that matches wins.
//! - `engines.node` ranges are resolved by testing candidate versions
//!   `i.j.k` (each component below [`CANDIDATE_LIMIT`]) in ascending order and
//!   keeping the first one the range accepts.

use std::sync::LazyLock;

use regex::Regex;
use semver::{Version, VersionReq};

/// Upper bound (exclusive) of each candidate version component.
pub const CANDIDATE_LIMIT: u64 = 60;

macro_rules! lazy_regex {
    ($name:ident, $pattern:expr) => {
        static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($pattern).unwrap());
    };
}

lazy_regex!(GTE_VERSION_RE, r"^>=\s*([\d.]+)");
lazy_regex!(RANGE_VERSION_RE, r"^([\d.]+)\s*-\s*([\d.]+)");
lazy_regex!(TILDE_VERSION_RE, r"^~\s*([\d.]+)");
lazy_regex!(CARET_VERSION_RE, r"^\^([\d.]+)");
lazy_regex!(EXACT_VERSION_RE, r"^([\d.]+)");

/// Pull a version out of a manifest constraint.
///
/// Tries, in order: `>=X`, `X - Y` (yields the upper bound), `~X`, `^X` and
/// a bare `X`. A trailing `.` is dropped. Bundler's `~> X` matches none of
/// these and yields `None`.
pub fn extract_constraint_version(constraint: &str) -> Option<String> {
    let constraint = constraint.trim();

    let captured = if let Some(caps) = GTE_VERSION_RE.captures(constraint) {
        caps.get(1)
    } else if let Some(caps) = RANGE_VERSION_RE.captures(constraint) {
        caps.get(2)
    } else if let Some(caps) = TILDE_VERSION_RE.captures(constraint) {
        caps.get(1)
    } else if let Some(caps) = CARET_VERSION_RE.captures(constraint) {
        caps.get(1)
    } else if let Some(caps) = EXACT_VERSION_RE.captures(constraint) {
        caps.get(1)
    } else {
        None
    }?;

    let version = captured.as_str().trim_end_matches('.');
    if version.is_empty() {
        None
    } else {
        Some(version.to_string())
    }
}

/// Parse a loose version: optional `v`, one to three numeric components.
pub fn parse_loose_version(raw: &str) -> Option<Version> {
    let raw = raw.trim();
    let raw = raw.strip_prefix('v').unwrap_or(raw);

    let parts: Vec<&str> = raw.split('.').collect();
    if parts.is_empty() || parts.len() > 3 {
        return None;
    }

    let mut numbers = [0u64; 3];
    for (slot, part) in numbers.iter_mut().zip(&parts) {
        *slot = part.parse().ok()?;
    }

    Some(Version::new(numbers[0], numbers[1], numbers[2]))
}

/// A parsed range: any alternative (`||`) may accept a version.
#[derive(Debug, Clone)]
pub struct VersionRange {
    alternatives: Vec<VersionReq>,
}

impl VersionRange {
    /// Parse npm-style range syntax.
    ///
    /// Supports `||` alternatives, space or comma separated comparators,
    /// operators detached from their version (`>= 16`) and hyphen ranges
    /// (`16 - 18`).
    pub fn parse(raw: &str) -> Option<Self> {
        let alternatives = raw
            .split("||")
            .map(|alt| VersionReq::parse(&normalize_comparators(alt)).ok())
            .collect::<Option<Vec<_>>>()?;

        if alternatives.is_empty() {
            None
        } else {
            Some(Self { alternatives })
        }
    }

    pub fn matches(&self, version: &Version) -> bool {
        self.alternatives.iter().any(|req| req.matches(version))
    }

    /// Lowest candidate version accepted by the range.
    pub fn lowest_candidate(&self) -> Option<Version> {
        (0..CANDIDATE_LIMIT)
            .flat_map(|major| {
                (0..CANDIDATE_LIMIT).flat_map(move |minor| {
                    (0..CANDIDATE_LIMIT).map(move |patch| Version::new(major, minor, patch))
                })
            })
            .find(|candidate| self.matches(candidate))
    }
}

fn normalize_comparators(alternative: &str) -> String {
    let alternative = alternative.trim();

    if let Some((low, high)) = alternative.split_once(" - ") {
        return format!(">={}, <={}", low.trim(), high.trim());
    }

    let mut comparators: Vec<String> = Vec::new();
    let mut pending_op = String::new();

    for token in alternative
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
    {
        if token.chars().all(|c| matches!(c, '<' | '>' | '=' | '~' | '^')) {
            pending_op.push_str(token);
            continue;
        }
        comparators.push(format!("{}{}", std::mem::take(&mut pending_op), token));
    }

    if comparators.is_empty() {
        "*".to_string()
    } else {
        comparators.join(", ")
    }
}

/// Resolve an `engines.node` value into the version tag used for the base image.
///
/// Exact versions are used as-is; ranges resolve to their lowest candidate.
/// The result is `major.minor` when the minor component is non-zero, else `major`.
pub fn resolve_engine_version(raw: &str) -> Option<String> {
    if raw.trim().is_empty() {
        return None;
    }

    let version = match parse_loose_version(raw) {
        Some(version) => version,
        None => VersionRange::parse(raw)?.lowest_candidate()?,
    };

    if version.minor > 0 {
        Some(format!("{}.{}", version.major, version.minor))
    } else {
        Some(version.major.to_string())
    }
}
