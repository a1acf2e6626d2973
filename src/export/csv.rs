//! CSV export implementation.
//!
//! Exports call-graph reports in CSV format for spreadsheet use, one row per
//! path. Objects without any path get a single row with an empty path.

use super::{ExportData, Exporter};
use std::io::{self, Write};

/// CSV exporter implementation.
pub struct CsvExporter;

impl CsvExporter {
    /// Escape a field value for CSV format.
    ///
    /// Wraps the value in quotes if it contains commas, quotes, or newlines.
    fn escape_field(value: &str) -> String {
        if value.contains(',') || value.contains('"') || value.contains('\n') {
            format!("\"{}\"", value.replace('"', "\"\""))
        } else {
            value.to_string()
        }
    }
}

impl Exporter for CsvExporter {
    fn export<W: Write>(&self, data: &ExportData, writer: &mut W) -> io::Result<()> {
        writeln!(
            writer,
            "bucket_name,object_name,object_kind,in_cycle,path_length,path"
        )?;

        let cyclic: std::collections::HashSet<_> = data
            .cycles
            .iter()
            .flat_map(|c| c.nodes.iter().map(|node| node.key()))
            .collect();

        for (node, listing) in data.entries() {
            let prefix = format!(
                "{},{},{},{}",
                Self::escape_field(node.bucket_name()),
                Self::escape_field(node.object_name()),
                Self::escape_field(node.object_kind()),
                cyclic.contains(node.key())
            );

            if listing.calls.is_empty() {
                writeln!(writer, "{},0,", prefix)?;
                continue;
            }
            for path in &listing.calls {
                writeln!(
                    writer,
                    "{},{},{}",
                    prefix,
                    path.length(),
                    Self::escape_field(&path.to_string())
                )?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::PathAnalyzer;
    use crate::export::fixtures::sample_graph;
    use crate::graph::{DependencyGraph, GraphNode, NodeKey};

    fn export_csv(data: &ExportData) -> String {
        let mut output = Vec::new();
        CsvExporter.export(data, &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_csv_export_call_graph() {
        let graph = sample_graph();
        let data = ExportData::call_graph(&graph, PathAnalyzer::new(&graph).analyze());
        let csv_str = export_csv(&data);
        let lines: Vec<&str> = csv_str.lines().collect();

        // Header + 2 paths
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "bucket_name,object_name,object_kind,in_cycle,path_length,path"
        );
        assert_eq!(
            lines[1],
            "apps,deploy,workflow/standard,false,2,apps/deploy -> libs/build -> libs/archive"
        );
        assert_eq!(
            lines[2],
            "tools,loop,workflow/standard,true,1,tools/loop -> tools/loop"
        );
    }

    #[test]
    fn test_csv_export_call_listing_rows() {
        let graph = sample_graph();
        let csv_str = export_csv(&ExportData::call_listings(&graph));
        let lines: Vec<&str> = csv_str.lines().collect();

        // Header + deploy + build + loop
        assert_eq!(lines.len(), 4);
        assert!(lines[2].starts_with("libs,build,script,false,1,"));
    }

    #[test]
    fn test_csv_export_row_without_paths() {
        let mut graph = DependencyGraph::new();
        graph.add_node(GraphNode::new("b", "a", "workflow", true).unwrap());
        graph.add_node(GraphNode::new("b", "leaf", "workflow", true).unwrap());
        graph
            .add_edge(&NodeKey::new("b", "a"), &NodeKey::new("b", "leaf"))
            .unwrap();

        let csv_str = export_csv(&ExportData::call_listings(&graph));
        assert!(csv_str.lines().any(|line| line == "b,leaf,workflow,false,0,"));
    }

    #[test]
    fn test_csv_escape_field() {
        assert_eq!(CsvExporter::escape_field("simple"), "simple");
        assert_eq!(CsvExporter::escape_field("with,comma"), "\"with,comma\"");
        assert_eq!(
            CsvExporter::escape_field("with\"quote"),
            "\"with\"\"quote\""
        );
    }

    #[test]
    fn test_csv_export_empty() {
        let graph = DependencyGraph::new();
        let csv_str = export_csv(&ExportData::call_listings(&graph));
        assert_eq!(csv_str.lines().count(), 1);
    }
}
