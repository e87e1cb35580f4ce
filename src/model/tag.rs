use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A `(group, element)` pair identifying one metadata field in a record.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TagId {
    pub group: u16,
    pub element: u16,
}

impl TagId {
    pub const fn new(group: u16, element: u16) -> Self {
        Self { group, element }
    }

    pub fn group_hex(&self) -> String {
        format!("{:04x}", self.group)
    }

    pub fn element_hex(&self) -> String {
        format!("{:04x}", self.element)
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X},{:04X}", self.group, self.element)
    }
}

/// One tag occurrence in one record, as reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagRow {
    #[serde(flatten)]
    pub id: TagId,
    pub name: String,
    pub vr: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagParseError {
    #[error("invalid tag '{0}': expected 'group,element' in hex, e.g. 0010,0010")]
    WrongArity(String),
    #[error("invalid tag '{input}': '{part}' is not a 16-bit hex number")]
    NotHex { input: String, part: String },
}

/// Parses a single `group,element` pair in hex, e.g. `0010,0010`.
pub fn parse_tag(input: &str) -> Result<TagId, TagParseError> {
    let parts: Vec<&str> = input.split(',').map(str::trim).collect();
    if parts.len() != 2 {
        return Err(TagParseError::WrongArity(input.trim().to_string()));
    }

    let hex = |part: &str| {
        u16::from_str_radix(part, 16).map_err(|_| TagParseError::NotHex {
            input: input.trim().to_string(),
            part: part.to_string(),
        })
    };

    Ok(TagId::new(hex(parts[0])?, hex(parts[1])?))
}

/// Parses a `;`-separated list of tags, e.g. `0010,0010; 0010,0020`.
/// Empty segments are ignored; any malformed segment fails the whole list.
pub fn parse_tag_list(input: &str) -> Result<Vec<TagId>, TagParseError> {
    input
        .split(';')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(parse_tag)
        .collect()
}
