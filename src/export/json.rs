//! JSON export implementation.
//!
//! Exports call-graph reports in JSON format for machine-readable output.

use super::{ExportData, Exporter, EMPTY_GRAPH_MESSAGE};
use crate::analysis::GraphPath;
use serde::Serialize;
use std::io::{self, Write};

/// JSON exporter implementation.
pub struct JsonExporter;

/// Serializable object entry for JSON output.
#[derive(Serialize)]
struct JsonObject {
    object: String,
    kind: String,
    is_in_catalog: bool,
    diameter: usize,
    calls: Vec<Vec<String>>,
    call_graph: Vec<[String; 2]>,
    called_by: Vec<String>,
}

/// Serializable bucket section for JSON output.
#[derive(Serialize)]
struct JsonBucket {
    bucket_name: String,
    objects: Vec<JsonObject>,
}

/// Serializable cycle info for JSON output.
#[derive(Serialize)]
struct JsonCycle {
    objects: Vec<String>,
    path: String,
}

/// Summary statistics for JSON output.
#[derive(Serialize)]
struct JsonSummary {
    objects: usize,
    dependencies: usize,
    entries: usize,
    paths: usize,
    cycles: usize,
}

/// Root JSON export structure.
#[derive(Serialize)]
struct JsonExport {
    report: &'static str,
    summary: JsonSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
    buckets: Vec<JsonBucket>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    cycles: Vec<JsonCycle>,
}

fn path_names(path: &GraphPath) -> Vec<String> {
    path.nodes().iter().map(ToString::to_string).collect()
}

impl Exporter for JsonExporter {
    fn export<W: Write>(&self, data: &ExportData, writer: &mut W) -> io::Result<()> {
        let buckets: Vec<JsonBucket> = data
            .sections
            .iter()
            .map(|section| JsonBucket {
                bucket_name: section.bucket_name.clone(),
                objects: section
                    .entries
                    .iter()
                    .map(|(node, listing)| JsonObject {
                        object: node.to_string(),
                        kind: node.object_kind().to_string(),
                        is_in_catalog: node.is_in_catalog(),
                        diameter: listing.diameter,
                        calls: listing.calls.iter().map(path_names).collect(),
                        call_graph: listing
                            .call_graph
                            .iter()
                            .map(|(from, to)| [from.to_string(), to.to_string()])
                            .collect(),
                        called_by: listing.called_by.iter().map(ToString::to_string).collect(),
                    })
                    .collect(),
            })
            .collect();

        let cycles: Vec<JsonCycle> = data
            .cycles
            .iter()
            .map(|c| JsonCycle {
                objects: c.nodes.iter().map(ToString::to_string).collect(),
                path: c.cycle_path(),
            })
            .collect();

        let export = JsonExport {
            report: data.kind.label(),
            summary: JsonSummary {
                objects: data.object_count,
                dependencies: data.dependency_count,
                entries: data.entry_count(),
                paths: data.path_count(),
                cycles: data.cycles.len(),
            },
            message: data.is_empty().then_some(EMPTY_GRAPH_MESSAGE),
            buckets,
            cycles,
        };

        let json = serde_json::to_string_pretty(&export)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        writeln!(writer, "{}", json)
    }
}
