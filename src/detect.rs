//! Failed-login detection and threshold flagging.
//!
//! A line is a failed login when it has a status field and either that status
//! is `401` or the raw line mentions `Invalid credentials`. A line satisfying
//! both is still one attempt. Detection is pure; rendering lives in
//! [`crate::report`].
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use log::debug;
use serde::Serialize;

use crate::fields::{FieldLayout, LineFields};
use crate::table::FrequencyTable;

pub const FAILED_STATUS: &str = "401";
pub const FAILED_MARKER: &str = "Invalid credentials";
pub const DEFAULT_THRESHOLD: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ThresholdError {
    #[error("threshold must be at least 1")]
    Zero,
    #[error("invalid threshold {0:?}: {1}")]
    NotANumber(String, ParseIntError),
}

/// Minimum failed-login count at which a client is flagged. Always >= 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Threshold(usize);

impl Threshold {
    pub fn new(n: usize) -> Result<Self, ThresholdError> {
        if n == 0 {
            return Err(ThresholdError::Zero);
        }
        Ok(Self(n))
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self(DEFAULT_THRESHOLD)
    }
}

impl TryFrom<usize> for Threshold {
    type Error = ThresholdError;
    fn try_from(n: usize) -> Result<Self, Self::Error> {
        Self::new(n)
    }
}

impl FromStr for Threshold {
    type Err = ThresholdError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let n = s
            .trim()
            .parse::<usize>()
            .map_err(|e| ThresholdError::NotANumber(s.to_string(), e))?;
        Self::new(n)
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub fn is_failed_login(line: &str, fields: &LineFields<'_>) -> bool {
    match fields.status {
        Some(status) => status == FAILED_STATUS || line.contains(FAILED_MARKER),
        None => false,
    }
}

/// Failed-login attempts per client, over every line.
pub fn failed_login_counts<S: AsRef<str>>(lines: &[S], layout: FieldLayout) -> FrequencyTable {
    let table: FrequencyTable = lines
        .iter()
        .filter_map(|l| {
            let line = l.as_ref();
            let fields = layout.extract(line);
            if is_failed_login(line, &fields) {
                fields.client
            } else {
                None
            }
        })
        .collect();
    debug!(
        "failed-login pass: {} attempts from {} clients",
        table.total(),
        table.len()
    );
    table
}

/// Clients whose count meets or exceeds the threshold.
pub fn filter_by_threshold(counts: FrequencyTable, threshold: Threshold) -> FrequencyTable {
    counts.retain_at_least(threshold.get())
}

pub fn suspicious_clients<S: AsRef<str>>(
    lines: &[S],
    layout: FieldLayout,
    threshold: Threshold,
) -> FrequencyTable {
    filter_by_threshold(failed_login_counts(lines, layout), threshold)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(client: &str, status: &str, tail: &str) -> String {
        format!(r#"{client} - - [03/Dec/2024:10:12:34 +0000] "POST /login HTTP/1.1" {status} 128 {tail}"#)
    }

    fn t(n: usize) -> Threshold {
        Threshold::new(n).unwrap()
    }

    #[test]
    fn status_401_and_marker_both_count_once_per_line() {
        let lines = vec![
            line("1.1.1.1", "401", ""),
            line("1.1.1.1", "200", "\"Invalid credentials\""),
            line("1.1.1.1", "401", "\"Invalid credentials\""),
            line("2.2.2.2", "200", ""),
        ];
        let counts = failed_login_counts(&lines, FieldLayout::Positional);
        assert_eq!(counts.get("1.1.1.1"), Some(3));
        assert_eq!(counts.get("2.2.2.2"), None);
    }

    #[test]
    fn eight_token_lines_never_count() {
        let lines = [
            "9.9.9.9 - - [t] z \"GET /x 401",
            "9.9.9.9 - - [t] z m Invalid credentials",
        ];
        for l in lines {
            assert_eq!(crate::fields::tokens(l).len(), 8);
        }
        let counts = failed_login_counts(&lines, FieldLayout::Positional);
        assert!(counts.is_empty());
    }

    #[test]
    fn threshold_is_inclusive() {
        let mut lines = Vec::new();
        for _ in 0..4 {
            lines.push(line("a", "401", ""));
        }
        for _ in 0..3 {
            lines.push(line("b", "401", ""));
        }
        let flagged = suspicious_clients(&lines, FieldLayout::Positional, t(4));
        assert_eq!(flagged.get("a"), Some(4));
        assert_eq!(flagged.get("b"), None);

        let all = failed_login_counts(&lines, FieldLayout::Positional);
        for threshold in 1..=5 {
            let flagged = suspicious_clients(&lines, FieldLayout::Positional, t(threshold));
            for (client, n) in all.iter() {
                assert_eq!(flagged.get(client).is_some(), n >= threshold);
            }
        }
    }

    #[test]
    fn high_threshold_flags_nobody() {
        let lines = vec![line("a", "401", ""), line("a", "401", "")];
        assert!(suspicious_clients(&lines, FieldLayout::Positional, t(3)).is_empty());
    }

    #[test]
    fn threshold_rejects_zero_and_garbage() {
        assert_eq!(Threshold::new(0), Err(ThresholdError::Zero));
        assert_eq!("0".parse::<Threshold>(), Err(ThresholdError::Zero));
        assert!(matches!(
            "ten".parse::<Threshold>(),
            Err(ThresholdError::NotANumber(_, _))
        ));
        assert_eq!(" 4 ".parse::<Threshold>().unwrap().get(), 4);
        assert_eq!(Threshold::default().get(), DEFAULT_THRESHOLD);
    }

    #[test]
    fn combined_layout_detects_failures() {
        let lines = [
            r#"5.5.5.5 - - [t] "POST /login HTTP/1.1" 401 12"#,
            r#"5.5.5.5 - - [t] "POST /login HTTP/1.1" 200 12 "Invalid credentials""#,
            "garbage Invalid credentials",
        ];
        let counts = failed_login_counts(&lines, FieldLayout::Combined);
        assert_eq!(counts.get("5.5.5.5"), Some(2));
        assert_eq!(counts.len(), 1);
    }
}
