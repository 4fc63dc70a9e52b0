//! Client and endpoint frequency passes.
//!
//! Each pass scans the whole line set on its own and builds a fresh table.
//! Lines missing the field a pass needs are skipped by that pass only.
use log::debug;
use serde::Serialize;

use crate::fields::FieldLayout;
use crate::table::FrequencyTable;

/// The most requested endpoint and how often it was requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopEndpoint {
    pub endpoint: String,
    pub count: usize,
}

/// Requests per client address, covering every line that has a client field.
pub fn client_counts<S: AsRef<str>>(lines: &[S], layout: FieldLayout) -> FrequencyTable {
    let table: FrequencyTable = lines
        .iter()
        .filter_map(|l| layout.extract(l.as_ref()).client)
        .collect();
    debug!("client pass: {} distinct clients", table.len());
    table
}

/// Requests per endpoint for lines long enough to carry one.
pub fn endpoint_counts<S: AsRef<str>>(lines: &[S], layout: FieldLayout) -> FrequencyTable {
    let table: FrequencyTable = lines
        .iter()
        .filter_map(|l| layout.extract(l.as_ref()).endpoint)
        .collect();
    debug!("endpoint pass: {} distinct endpoints", table.len());
    table
}

/// The single most requested endpoint. Ties go to the endpoint that appears
/// first in the input. `None` when no line has an endpoint field.
pub fn top_endpoint<S: AsRef<str>>(lines: &[S], layout: FieldLayout) -> Option<TopEndpoint> {
    endpoint_counts(lines, layout)
        .max_entry()
        .map(|(endpoint, count)| TopEndpoint {
            endpoint: endpoint.to_string(),
            count,
        })
}
