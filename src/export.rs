//! Export helpers for writing an analysis report to disk.
//!
//! - `save_report_csv` writes the three result sections under an
//!   `Analysis Type,Detail,Count` header, separated by blank rows.
//! - `save_report_json` writes the whole report as pretty-printed JSON.
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use csv::WriterBuilder;

use crate::engine::AnalysisReport;
use crate::table::FrequencyTable;

/// Default file name for the tabular report.
pub const DEFAULT_CSV_PATH: &str = "log_analysis_results.csv";

// A truly empty line; an empty csv record would be written as `""`.
fn write_blank_row<W: Write>(wtr: csv::Writer<&mut W>) -> Result<()> {
    let out = wtr.into_inner().map_err(|e| e.into_error())?;
    out.write_all(b"\n")?;
    Ok(())
}

fn write_section<W: Write>(
    wtr: &mut csv::Writer<W>,
    heading: [&str; 3],
    rows: &FrequencyTable,
) -> Result<()> {
    wtr.write_record(heading)?;
    for (key, count) in rows.iter() {
        let count = count.to_string();
        wtr.write_record(["", key, count.as_str()])?;
    }
    Ok(())
}

pub fn write_report_csv<W: Write>(report: &AnalysisReport, mut out: W) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_writer(&mut out);
    wtr.write_record(["Analysis Type", "Detail", "Count"])?;

    write_section(
        &mut wtr,
        ["IP Access Counts", "IP Address", "Request Count"],
        &report.client_counts,
    )?;

    write_blank_row(wtr)?;
    let mut wtr = WriterBuilder::new().from_writer(&mut out);
    wtr.write_record(["Most Accessed Endpoint", "Endpoint", "Access Count"])?;
    if let Some(top) = &report.top_endpoint {
        let count = top.count.to_string();
        wtr.write_record(["", top.endpoint.as_str(), count.as_str()])?;
    }

    write_blank_row(wtr)?;
    let mut wtr = WriterBuilder::new().from_writer(&mut out);
    write_section(
        &mut wtr,
        ["Suspicious Activity", "IP Address", "Failed Login Count"],
        &report.suspicious,
    )?;
    wtr.flush()?;
    Ok(())
}

pub fn save_report_csv<P: AsRef<Path>>(report: &AnalysisReport, path: P) -> Result<()> {
    let path = path.as_ref();
    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    write_report_csv(report, f).with_context(|| format!("write {}", path.display()))
}

pub fn save_report_json<P: AsRef<Path>>(report: &AnalysisReport, path: P) -> Result<()> {
    let path = path.as_ref();
    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut w = BufWriter::new(f);
    serde_json::to_writer_pretty(&mut w, report)
        .with_context(|| format!("write {}", path.display()))?;
    writeln!(w)?;
    w.flush()?;
    Ok(())
}
