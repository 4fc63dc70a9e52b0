//! Report sinks: where a finished [`AnalysisReport`] goes.
use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;

use crate::engine::AnalysisReport;
use crate::export::{save_report_csv, save_report_json};
use crate::report::render_summary;

pub trait ReportSink {
    fn emit(&mut self, report: &AnalysisReport) -> Result<()>;
}

/// Writes the colored terminal summary.
pub struct ConsoleSink<W: Write> {
    out: W,
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReportSink for ConsoleSink<W> {
    fn emit(&mut self, report: &AnalysisReport) -> Result<()> {
        writeln!(self.out, "{}", render_summary(report))?;
        self.out.flush()?;
        Ok(())
    }
}

pub struct CsvSink {
    pub path: PathBuf,
}

impl ReportSink for CsvSink {
    fn emit(&mut self, report: &AnalysisReport) -> Result<()> {
        save_report_csv(report, &self.path)?;
        log::info!("wrote CSV report to {}", self.path.display());
        Ok(())
    }
}

pub struct JsonSink {
    pub path: PathBuf,
}

impl ReportSink for JsonSink {
    fn emit(&mut self, report: &AnalysisReport) -> Result<()> {
        save_report_json(report, &self.path)?;
        log::info!("wrote JSON report to {}", self.path.display());
        Ok(())
    }
}
