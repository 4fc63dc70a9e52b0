//! Human-readable report rendering for terminal output.
//!
//! Produces a colored summary with the per-client request counts, the most
//! accessed endpoint and the clients flagged for failed logins.
use colored::*;

use crate::{engine::AnalysisReport, table::FrequencyTable};

fn section_header(title: &str) -> String {
    format!(
        "\n{}\n{}\n\n",
        title.bold().cyan(),
        "─".repeat(title.chars().count())
    )
}

// Keys of 20 chars or more run straight into the value.
fn table_row(key: &str, value: &str) -> String {
    format!("{:<20}{}\n", key, value)
}

/// Two-column table of flagged clients and their failed attempts.
pub fn render_suspicious_table(suspicious: &FrequencyTable) -> String {
    let mut out = table_row("IP Address", "Failed Login Attempts");
    for (client, count) in suspicious.iter() {
        out.push_str(&table_row(client, &count.to_string()));
    }
    out
}

pub fn render_summary(report: &AnalysisReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{}\n",
        "Logwarden: Access Log Analysis Results".bold().cyan()
    ));

    out.push_str(&section_header("IP Access Counts"));
    if report.client_counts.is_empty() {
        out.push_str("(No requests)\n");
    } else {
        out.push_str(&table_row("IP Address", "Request Count"));
        for (client, count) in report.client_counts.iter() {
            out.push_str(&table_row(client, &count.to_string()));
        }
    }

    out.push_str(&section_header("Most Accessed Endpoint"));
    match &report.top_endpoint {
        Some(top) => out.push_str(&format!(
            "{} (Accessed {} times)\n",
            top.endpoint, top.count
        )),
        None => out.push_str("(No endpoints)\n"),
    }

    out.push_str(&section_header("Suspicious Activity Detected"));
    out.push_str(&format!("Minimum failed attempts: {}\n", report.threshold));
    if report.suspicious.is_empty() {
        out.push_str(&format!("{}\n", "(No flagged clients)".dimmed()));
    } else {
        for line in render_suspicious_table(&report.suspicious).lines() {
            out.push_str(&format!("{}\n", line.red()));
        }
    }

    out
}
