//! Userscript header metadata.
//!
//! A userscript opens with a comment block of the form:
//!
//! ```text
//! // ==UserScript==
//! // @name         Example
//! // @match        https://example.com/*
//! // @match        https://example.org/*
//! // ==/UserScript==
//! ```
//!
//! Attributes are `@key value` pairs on `//` comment lines between the two
//! markers. A key may repeat; its values accumulate in encounter order.

use std::sync::OnceLock;

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Attribute values for one key.
///
/// Serialized untagged, so a single value persists as a bare JSON string
/// and repeated keys as an array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Single(String),
    Many(Vec<String>),
}

impl MetadataValue {
    /// Appends a value, promoting a single value to a list on the second
    /// occurrence of its key.
    fn push(&mut self, value: String) {
        match self {
            MetadataValue::Single(first) => {
                *self = MetadataValue::Many(vec![std::mem::take(first), value]);
            }
            MetadataValue::Many(values) => values.push(value),
        }
    }

    /// The first recorded value for this key.
    pub fn first(&self) -> &str {
        match self {
            MetadataValue::Single(value) => value,
            MetadataValue::Many(values) => values.first().map(String::as_str).unwrap_or(""),
        }
    }
}

/// Attribute mapping extracted from a script header, in encounter order
pub type Metadata = IndexMap<String, MetadataValue>;

fn header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)//\s*==UserScript==(.*?)//\s*==/UserScript==").expect("header pattern")
    })
}

fn attribute_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^@(\w+)\s+(.*)$").expect("attribute pattern"))
}

/// Extracts the attribute mapping from a script's first header block.
///
/// Lines outside the markers and lines that are not `// @key value` are
/// ignored. A script without a header yields an empty mapping; it is still
/// a valid script, it just has no name to derive a filename from.
pub fn parse_metadata(script: &str) -> Metadata {
    let mut metadata = Metadata::new();
    let Some(captures) = header_re().captures(script) else {
        return metadata;
    };
    let header = captures.get(1).map(|m| m.as_str()).unwrap_or_default();

    for line in header.lines() {
        let Some(rest) = line.trim().strip_prefix("//") else {
            continue;
        };
        let Some(caps) = attribute_re().captures(rest.trim()) else {
            continue;
        };
        let key = caps[1].to_string();
        let value = caps[2].to_string();
        match metadata.get_mut(&key) {
            Some(existing) => existing.push(value),
            None => {
                metadata.insert(key, MetadataValue::Single(value));
            }
        }
    }

    metadata
}

/// Display name for a script: the `@name` attribute, or the identifier when
/// the header carries no name.
pub fn display_name<'a>(metadata: &'a Metadata, id: &'a str) -> &'a str {
    match metadata.get("name") {
        Some(value) => value.first(),
        None => id,
    }
}
