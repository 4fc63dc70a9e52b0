//! Field extraction from raw access-log lines.
//!
//! The default [`FieldLayout::Positional`] splits a line on runs of whitespace
//! and reads the client, endpoint and status by fixed index. There is no
//! quoting or escaping: a multi-word value earlier in the line shifts every
//! later index, so an embedded message can move the status code out of slot 8.
//! That is a known limitation of the positional layout and is kept as-is.
//! [`FieldLayout::Combined`] matches the Common/Combined Log Format instead.
use once_cell::sync::Lazy;
use regex::Regex;

/// Token index of the client address.
pub const CLIENT_FIELD: usize = 0;
/// Token index of the requested endpoint path.
pub const ENDPOINT_FIELD: usize = 6;
/// Token index of the response status code.
pub const STATUS_FIELD: usize = 8;

// host ident user [time] "METHOD path proto" status
static COMBINED_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(\S+)\s+\S+\s+\S+\s+\[[^\]]*\]\s+"(?:\S+\s+)?(\S+)[^"]*"\s+(\S+)"#)
        .expect("combined log pattern is valid")
});

/// Split a line on runs of whitespace. Blank lines yield no tokens.
pub fn tokens(line: &str) -> Vec<&str> {
    line.split_whitespace().collect()
}

/// Token at `index`, or `None` when the line is too short.
pub fn field_at<'a>(tokens: &[&'a str], index: usize) -> Option<&'a str> {
    tokens.get(index).copied()
}

/// The fields an aggregation pass cares about. Absent fields mean "skip this
/// line for that pass".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineFields<'a> {
    pub client: Option<&'a str>,
    pub endpoint: Option<&'a str>,
    pub status: Option<&'a str>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FieldLayout {
    /// Whitespace tokens at indices 0, 6 and 8.
    #[default]
    Positional,
    /// Common/Combined Log Format; lines that don't match yield no fields.
    Combined,
}

impl FieldLayout {
    pub fn extract(self, line: &str) -> LineFields<'_> {
        match self {
            FieldLayout::Positional => {
                let toks = tokens(line);
                LineFields {
                    client: field_at(&toks, CLIENT_FIELD),
                    endpoint: field_at(&toks, ENDPOINT_FIELD),
                    status: field_at(&toks, STATUS_FIELD),
                }
            }
            FieldLayout::Combined => match COMBINED_LINE.captures(line) {
                Some(caps) => LineFields {
                    client: caps.get(1).map(|m| m.as_str()),
                    endpoint: caps.get(2).map(|m| m.as_str()),
                    status: caps.get(3).map(|m| m.as_str()),
                },
                None => LineFields::default(),
            },
        }
    }
}
