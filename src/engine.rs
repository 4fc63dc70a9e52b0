//! Analyzer: runs the client, endpoint and failed-login passes over one set of
//! lines and bundles the results into an [`AnalysisReport`].
//!
//! Loading is kept apart from analysis, so the passes can be exercised on
//! synthetic lines without touching the filesystem.
//!
//! ```no_run
//! use logwarden::engine::Analyzer;
//! # fn main() -> anyhow::Result<()> {
//! let analyzer = Analyzer::from_path("/var/log/nginx/access.log", u64::MAX)?;
//! let report = analyzer.analyze();
//! println!("{}", logwarden::report::render_summary(&report));
//! # Ok(())
//! # }
//! ```
use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use crate::aggregate::{TopEndpoint, client_counts, top_endpoint};
use crate::detect::{Threshold, suspicious_clients};
use crate::fields::FieldLayout;
use crate::io::{FileSource, LineSource};
use crate::table::FrequencyTable;

/// How many lines each pass had to skip.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParseStats {
    pub total_lines: usize,
    pub blank_lines: usize,
    /// Non-blank lines with no client field (only possible in combined layout).
    pub unparsed_lines: usize,
    pub missing_endpoint: usize,
    pub missing_status: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisReport {
    pub threshold: Threshold,
    pub client_counts: FrequencyTable,
    pub top_endpoint: Option<TopEndpoint>,
    pub suspicious: FrequencyTable,
    pub parse_stats: ParseStats,
}

#[derive(Debug, Default)]
pub struct Analyzer {
    lines: Vec<String>,
    layout: FieldLayout,
    threshold: Threshold,
}

impl Analyzer {
    pub fn new(lines: Vec<String>) -> Self {
        Self {
            lines,
            layout: FieldLayout::default(),
            threshold: Threshold::default(),
        }
    }

    pub fn from_text(text: &str) -> Self {
        Self::new(text.lines().map(str::to_owned).collect())
    }

    pub fn from_source<L: LineSource + ?Sized>(source: &L) -> Result<Self> {
        Ok(Self::new(source.load()?))
    }

    pub fn from_path<P: AsRef<Path>>(path: P, mmap_threshold_bytes: u64) -> Result<Self> {
        let source = FileSource::new(path.as_ref()).with_mmap_threshold(mmap_threshold_bytes);
        Self::from_source(&source)
    }

    pub fn with_layout(mut self, layout: FieldLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_threshold(mut self, threshold: Threshold) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn analyze(&self) -> AnalysisReport {
        AnalysisReport {
            threshold: self.threshold,
            client_counts: client_counts(&self.lines, self.layout),
            top_endpoint: top_endpoint(&self.lines, self.layout),
            suspicious: suspicious_clients(&self.lines, self.layout, self.threshold),
            parse_stats: self.parse_stats(),
        }
    }

    /// Same result as [`Analyzer::analyze`], with the passes run on the rayon pool.
    pub fn analyze_parallel(&self) -> AnalysisReport {
        let lines = self.lines.as_slice();
        let layout = self.layout;
        let ((clients, top), (suspicious, stats)) = rayon::join(
            || {
                rayon::join(
                    || client_counts(lines, layout),
                    || top_endpoint(lines, layout),
                )
            },
            || {
                rayon::join(
                    || suspicious_clients(lines, layout, self.threshold),
                    || self.parse_stats(),
                )
            },
        );
        AnalysisReport {
            threshold: self.threshold,
            client_counts: clients,
            top_endpoint: top,
            suspicious,
            parse_stats: stats,
        }
    }

    pub fn parse_stats(&self) -> ParseStats {
        let mut stats = ParseStats {
            total_lines: self.lines.len(),
            ..ParseStats::default()
        };
        for line in &self.lines {
            if line.trim().is_empty() {
                stats.blank_lines += 1;
                continue;
            }
            let fields = self.layout.extract(line);
            if fields.client.is_none() {
                stats.unparsed_lines += 1;
            }
            if fields.endpoint.is_none() {
                stats.missing_endpoint += 1;
            }
            if fields.status.is_none() {
                stats.missing_status += 1;
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn threshold(n: usize) -> Threshold {
        Threshold::new(n).unwrap()
    }

    #[test]
    fn padded_scenario_matches_expected_report() {
        let text = "\
10.0.0.1 - - [x +0000] \"GET /login HTTP/1.1\" 200
10.0.0.1 - - [x +0000] \"GET /login HTTP/1.1\" 401
10.0.0.2 - - [x +0000] \"GET /home HTTP/1.1\" 200
";
        let report = Analyzer::from_text(text)
            .with_threshold(threshold(1))
            .analyze();
        assert_eq!(report.client_counts.get("10.0.0.1"), Some(2));
        assert_eq!(report.client_counts.get("10.0.0.2"), Some(1));
        let top = report.top_endpoint.unwrap();
        assert_eq!((top.endpoint.as_str(), top.count), ("/login", 2));
        assert_eq!(report.suspicious.get("10.0.0.1"), Some(1));
        assert_eq!(report.suspicious.len(), 1);
    }

    #[test]
    fn seven_token_lines_follow_the_positional_contract() {
        // index 6 is the status here and there is no index 8
        let text = "\
10.0.0.1 - - [x] \"GET\" \"/login\" 200
10.0.0.1 - - [x] \"GET\" \"/login\" 401
10.0.0.2 - - [x] \"GET\" \"/home\" 200
";
        let report = Analyzer::from_text(text)
            .with_threshold(threshold(1))
            .analyze();
        assert_eq!(report.client_counts.total(), 3);
        let top = report.top_endpoint.unwrap();
        assert_eq!((top.endpoint.as_str(), top.count), ("200", 2));
        assert!(report.suspicious.is_empty());
        assert_eq!(report.parse_stats.missing_status, 3);
    }

    #[test]
    fn empty_input_yields_empty_report() {
        let report = Analyzer::new(Vec::new()).analyze();
        assert!(report.client_counts.is_empty());
        assert_eq!(report.top_endpoint, None);
        assert!(report.suspicious.is_empty());
        assert_eq!(report.parse_stats, ParseStats::default());
    }

    #[test]
    fn threshold_only_affects_suspicious_set() {
        let text = "a - - [t] z m /x v 401\na - - [t] z m /x v 401\nb - - [t] z m /y v 200\n";
        let low = Analyzer::from_text(text).with_threshold(threshold(2)).analyze();
        let high = Analyzer::from_text(text).with_threshold(threshold(3)).analyze();
        assert_eq!(low.suspicious.get("a"), Some(2));
        assert!(high.suspicious.is_empty());
        assert_eq!(low.client_counts, high.client_counts);
        assert_eq!(low.top_endpoint, high.top_endpoint);
    }

    #[test]
    fn analysis_is_idempotent_and_parallel_agrees() {
        let text = "a - - [t] z m /x v 401\n\nb - - [t] z m /y v 200 Invalid credentials\nshort line\n";
        let analyzer = Analyzer::from_text(text).with_threshold(threshold(1));
        let first = analyzer.analyze();
        assert_eq!(first, analyzer.analyze());
        assert_eq!(first, analyzer.analyze_parallel());
        assert_eq!(first.suspicious.len(), 2);
    }

    #[test]
    fn parse_stats_count_skipped_fields() {
        let text = "a b c d e f /x h 200\n\n   \nshort line\n1 2 3 4 5 6 /y\n";
        let stats = Analyzer::from_text(text).parse_stats();
        assert_eq!(stats.total_lines, 5);
        assert_eq!(stats.blank_lines, 2);
        assert_eq!(stats.unparsed_lines, 0);
        assert_eq!(stats.missing_endpoint, 1);
        assert_eq!(stats.missing_status, 2);
    }

    #[test]
    fn combined_layout_marks_unmatched_lines() {
        let text = "1.2.3.4 - - [t] \"GET /a HTTP/1.1\" 200 1\nnot a log line\n";
        let analyzer = Analyzer::from_text(text).with_layout(FieldLayout::Combined);
        let report = analyzer.analyze();
        assert_eq!(report.client_counts.total(), 1);
        assert_eq!(report.parse_stats.unparsed_lines, 1);
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("access.log");
        std::fs::write(&path, "a - - [t] z m /x v 401\n").unwrap();
        let analyzer = Analyzer::from_path(&path, u64::MAX).unwrap();
        assert_eq!(analyzer.lines().len(), 1);
        assert!(Analyzer::from_path(dir.path().join("missing.log"), u64::MAX).is_err());
    }
}
