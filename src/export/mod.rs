//! Export functionality for call-graph reports.
//!
//! This module provides exporters for outputting call graphs and call
//! listings in various formats: JSON, CSV, and Markdown.

pub mod csv;
pub mod json;
pub mod markdown;

use crate::analysis::CallGraphAnalysis;
use crate::graph::{CycleInfo, DependencyGraph, GraphNode};
use crate::report::{self, BucketSection, CallListing};
use std::io::{self, Write};

/// Printed in place of a report when the graph has no objects.
pub const EMPTY_GRAPH_MESSAGE: &str =
    "No identified Dependencies in the Catalog or among the selected Catalog Objects";

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// JSON format - machine-readable, full data
    Json,
    /// CSV format - one row per path
    Csv,
    /// Markdown format - documentation/reporting
    Markdown,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "markdown" | "md" => Ok(ExportFormat::Markdown),
            _ => Err(format!(
                "Unknown export format: '{}'. Valid formats: json, csv, markdown",
                s
            )),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Json => write!(f, "json"),
            ExportFormat::Csv => write!(f, "csv"),
            ExportFormat::Markdown => write!(f, "markdown"),
        }
    }
}

/// Which report an [`ExportData`] holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    /// Root-to-leaf paths grouped by root
    CallGraph,
    /// Calls and called-by for every object
    CallListing,
}

impl ReportKind {
    pub fn title(&self) -> &'static str {
        match self {
            ReportKind::CallGraph => "Catalog Call Graph",
            ReportKind::CallListing => "Catalog Objects Dependencies",
        }
    }

    /// Machine-readable name used in JSON output.
    pub fn label(&self) -> &'static str {
        match self {
            ReportKind::CallGraph => "call_graph",
            ReportKind::CallListing => "call_listing",
        }
    }
}

/// Data container for export operations.
///
/// Entries are already sorted by bucket then object name and split into
/// bucket sections.
#[derive(Debug, Clone)]
pub struct ExportData {
    pub kind: ReportKind,
    /// Number of objects in the graph
    pub object_count: usize,
    /// Number of depends-on edges in the graph
    pub dependency_count: usize,
    pub sections: Vec<BucketSection<CallListing>>,
    /// Cyclic components of the graph
    pub cycles: Vec<CycleInfo>,
}

impl ExportData {
    /// Creates call-graph report data: one entry per root (and per cycle
    /// entry point) with its paths, diameter and call graph as computed by
    /// the analysis.
    pub fn call_graph(graph: &DependencyGraph, analysis: CallGraphAnalysis) -> Self {
        let sections = report::listings(
            graph,
            analysis.paths_by_root,
            &analysis.diameters,
            &analysis.call_graphs,
        );

        Self {
            kind: ReportKind::CallGraph,
            object_count: graph.order(),
            dependency_count: graph.size(),
            sections,
            cycles: graph.detect_cycles(),
        }
    }

    /// Creates call-listing report data for every object of `graph`.
    pub fn call_listings(graph: &DependencyGraph) -> Self {
        Self {
            kind: ReportKind::CallListing,
            object_count: graph.order(),
            dependency_count: graph.size(),
            sections: report::call_listings(graph),
            cycles: graph.detect_cycles(),
        }
    }

    /// Returns true if the graph behind this report had no objects.
    pub fn is_empty(&self) -> bool {
        self.object_count == 0
    }

    /// Number of listed objects across all sections.
    pub fn entry_count(&self) -> usize {
        self.sections.iter().map(BucketSection::len).sum()
    }

    /// Number of paths across all entries.
    pub fn path_count(&self) -> usize {
        self.entries().map(|(_, listing)| listing.calls.len()).sum()
    }

    /// Iterates over all entries in report order.
    pub fn entries(&self) -> impl Iterator<Item = &(GraphNode, CallListing)> {
        self.sections.iter().flat_map(|section| section.entries.iter())
    }
}

/// Trait for exporters.
pub trait Exporter {
    /// Export the data to the given writer.
    fn export<W: Write>(&self, data: &ExportData, writer: &mut W) -> io::Result<()>;
}

/// Export data in the specified format.
pub fn export<W: Write>(
    format: ExportFormat,
    data: &ExportData,
    writer: &mut W,
) -> io::Result<()> {
    match format {
        ExportFormat::Json => json::JsonExporter.export(data, writer),
        ExportFormat::Csv => csv::CsvExporter.export(data, writer),
        ExportFormat::Markdown => markdown::MarkdownExporter.export(data, writer),
    }
}
