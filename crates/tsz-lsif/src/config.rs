//! Indexer configuration.
//!
//! Read from a JSON file (`lsif.json`). Comments and trailing commas are
//! accepted the same way tsconfig files accept them. Every field has a
//! default, so `{}` is a valid configuration.

use serde::{Deserialize, Deserializer, Serialize};
use tsz_common::limits;

use crate::error::{IndexError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LsifConfig {
    /// Root that module aliases are computed relative to. Also reported in
    /// the `metaData` vertex.
    pub project_root: String,
    pub moniker_scheme: String,
    /// `kind` of the `project` vertex.
    pub project_kind: String,
    #[serde(deserialize_with = "bool_or_string")]
    pub emit_hover: bool,
    #[serde(deserialize_with = "bool_or_string")]
    pub emit_definitions: bool,
    #[serde(deserialize_with = "bool_or_string")]
    pub emit_references: bool,
    #[serde(deserialize_with = "bool_or_string")]
    pub emit_contains: bool,
    /// Longest export path the walker builds.
    pub max_walk_depth: u32,
}

impl Default for LsifConfig {
    fn default() -> Self {
        LsifConfig {
            project_root: "/".to_string(),
            moniker_scheme: "tsc".to_string(),
            project_kind: "typescript".to_string(),
            emit_hover: true,
            emit_definitions: true,
            emit_references: true,
            emit_contains: true,
            max_walk_depth: limits::MAX_EXPORT_PATH_DEPTH,
        }
    }
}

impl LsifConfig {
    pub fn from_json_str(source: &str) -> Result<Self> {
        let normalized = normalize_jsonc(source);
        serde_json::from_str(&normalized).map_err(IndexError::Config)
    }

    pub fn load(path: &std::path::Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_json_str(&source)
    }
}

/// Accept `true` as well as `"true"`, like tsconfig boolean options.
fn bool_or_string<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        String(String),
    }

    match BoolOrString::deserialize(deserializer)? {
        BoolOrString::Bool(value) => Ok(value),
        BoolOrString::String(text) => match text.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(Error::custom(format!(
                "invalid boolean value: '{text}'. Expected true or false"
            ))),
        },
    }
}

/// Strip `//` and `/* */` comments and drop commas that directly precede a
/// closing `}` or `]`. String contents are left untouched.
fn normalize_jsonc(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;
    let mut escape = false;
    // Comma seen outside a string, held back until the next significant
    // character decides whether it is trailing.
    let mut pending_comma: Option<String> = None;

    while let Some(ch) = chars.next() {
        if in_string {
            out.push(ch);
            if escape {
                escape = false;
            } else if ch == '\\' {
                escape = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        if ch == '/' {
            match chars.peek().copied() {
                Some('/') => {
                    for next in chars.by_ref() {
                        if next == '\n' {
                            push_layout(&mut out, &mut pending_comma, '\n');
                            break;
                        }
                    }
                    continue;
                }
                Some('*') => {
                    chars.next();
                    let mut prev = '\0';
                    for next in chars.by_ref() {
                        if prev == '*' && next == '/' {
                            break;
                        }
                        if next == '\n' {
                            push_layout(&mut out, &mut pending_comma, '\n');
                        }
                        prev = next;
                    }
                    continue;
                }
                _ => {}
            }
        }

        if ch.is_whitespace() {
            push_layout(&mut out, &mut pending_comma, ch);
            continue;
        }

        if let Some(held) = pending_comma.take() {
            if ch != '}' && ch != ']' {
                out.push(',');
            }
            out.push_str(&held);
        }

        match ch {
            ',' => pending_comma = Some(String::new()),
            '"' => {
                in_string = true;
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }

    if let Some(held) = pending_comma {
        out.push(',');
        out.push_str(&held);
    }
    out
}

fn push_layout(out: &mut String, pending_comma: &mut Option<String>, ch: char) {
    match pending_comma {
        Some(held) => held.push(ch),
        None => out.push(ch),
    }
}

#[cfg(test)]
#[path = "../tests/config_tests.rs"]
mod config_tests;
