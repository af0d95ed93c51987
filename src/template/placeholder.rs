//! Placeholder parsing for Dockerfile templates.
//!
//! Templates reference facts with `{{.Key}}`. Whitespace inside the braces is
//! allowed (`{{ .Key }}`). Everything outside a placeholder is literal text,
//! including Dockerfile `${VAR}` references.

use std::collections::HashSet;

/// A segment of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Literal text
    Literal(String),
    /// Fact reference: {{.Key}}
    Placeholder(String),
}

/// Why a template failed to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceholderError {
    /// `{{` without a closing `}}`.
    Unterminated { offset: usize },
    /// `{{ ... }}` whose body is not `.Identifier`.
    Malformed { offset: usize, body: String },
}

impl std::fmt::Display for PlaceholderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaceholderError::Unterminated { offset } => {
                write!(f, "unterminated placeholder at byte {}", offset)
            }
            PlaceholderError::Malformed { offset, body } => {
                write!(f, "malformed placeholder '{{{{{}}}}}' at byte {}", body, offset)
            }
        }
    }
}

/// Parse a template into literal and placeholder segments.
pub fn parse_template(input: &str) -> Result<Vec<Segment>, PlaceholderError> {
    let mut segments = Vec::new();
    let mut rest = input;
    let mut consumed = 0;

    while let Some(start) = rest.find("{{") {
        if start > 0 {
            segments.push(Segment::Literal(rest[..start].to_string()));
        }

        let after_open = &rest[start + 2..];
        let end = after_open
            .find("}}")
            .ok_or(PlaceholderError::Unterminated {
                offset: consumed + start,
            })?;

        let body = &after_open[..end];
        let key = parse_key(body).ok_or_else(|| PlaceholderError::Malformed {
            offset: consumed + start,
            body: body.to_string(),
        })?;
        segments.push(Segment::Placeholder(key.to_string()));

        let advance = start + 2 + end + 2;
        consumed += advance;
        rest = &rest[advance..];
    }

    if !rest.is_empty() {
        segments.push(Segment::Literal(rest.to_string()));
    }

    Ok(segments)
}

fn parse_key(body: &str) -> Option<&str> {
    let key = body.trim().strip_prefix('.')?;
    let valid = !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    valid.then_some(key)
}

/// Extract all placeholder names from a template.
pub fn extract_placeholders(input: &str) -> HashSet<String> {
    parse_template(input)
        .map(|segments| {
            segments
                .into_iter()
                .filter_map(|seg| match seg {
                    Segment::Placeholder(name) => Some(name),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default()
}
