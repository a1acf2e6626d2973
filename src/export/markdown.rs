//! Markdown export implementation.
//!
//! Exports call-graph reports in Markdown format: one section per bucket,
//! one entry per object with its calls and callers.

use super::{ExportData, Exporter, ReportKind, EMPTY_GRAPH_MESSAGE};
use crate::analysis::GraphPath;
use std::io::{self, Write};

/// Markdown exporter implementation.
pub struct MarkdownExporter;

/// Renders the nodes after the start of `path`, e.g. "⇢ b/x ⇢ b/y".
fn calls_line(path: &GraphPath) -> String {
    path.nodes()
        .iter()
        .skip(1)
        .map(|node| format!("\u{21E2} {}", node))
        .collect::<Vec<_>>()
        .join(" ")
}

impl Exporter for MarkdownExporter {
    fn export<W: Write>(&self, data: &ExportData, writer: &mut W) -> io::Result<()> {
        writeln!(writer, "# {}", data.kind.title())?;
        writeln!(writer)?;

        if data.is_empty() {
            writeln!(writer, "{}", EMPTY_GRAPH_MESSAGE)?;
            return Ok(());
        }

        // Summary section
        writeln!(writer, "## Summary")?;
        writeln!(writer)?;
        writeln!(writer, "| Metric | Count |")?;
        writeln!(writer, "|--------|-------|")?;
        writeln!(writer, "| Catalog Objects | {} |", data.object_count)?;
        writeln!(writer, "| Dependencies | {} |", data.dependency_count)?;
        writeln!(writer, "| Listed Objects | {} |", data.entry_count())?;
        writeln!(writer, "| Paths | {} |", data.path_count())?;
        writeln!(writer, "| Cycles | {} |", data.cycles.len())?;
        writeln!(writer)?;

        for section in &data.sections {
            writeln!(writer, "## {}", section.bucket_name)?;
            writeln!(writer)?;

            for (node, listing) in &section.entries {
                writeln!(writer, "### {} ({})", node.object_name(), node.object_kind())?;
                writeln!(writer)?;

                if data.kind == ReportKind::CallGraph {
                    writeln!(writer, "Diameter: {}", listing.diameter)?;
                    writeln!(writer)?;
                }

                writeln!(writer, "*Calls:*")?;
                writeln!(writer)?;
                for path in &listing.calls {
                    writeln!(writer, "- {}", calls_line(path))?;
                }
                if listing.calls.is_empty() {
                    writeln!(writer, "- none")?;
                }
                writeln!(writer)?;

                if data.kind == ReportKind::CallGraph && !listing.call_graph.is_empty() {
                    writeln!(writer, "*Call graph:*")?;
                    writeln!(writer)?;
                    for (from, to) in &listing.call_graph {
                        writeln!(writer, "- {} \u{21E2} {}", from, to)?;
                    }
                    writeln!(writer)?;
                }

                if data.kind == ReportKind::CallListing {
                    writeln!(writer, "*Called by:*")?;
                    writeln!(writer)?;
                    for caller in &listing.called_by {
                        writeln!(writer, "- \u{21E0} {}", caller)?;
                    }
                    if listing.called_by.is_empty() {
                        writeln!(writer, "- none")?;
                    }
                    writeln!(writer)?;
                }
            }
        }

        if !data.cycles.is_empty() {
            writeln!(writer, "## Cycles")?;
            writeln!(writer)?;
            writeln!(writer, "The following circular dependencies were detected:")?;
            writeln!(writer)?;
            for (i, cycle) in data.cycles.iter().enumerate() {
                writeln!(writer, "{}. `{}`", i + 1, cycle.cycle_path())?;
            }
            writeln!(writer)?;
        }

        // Footer
        writeln!(writer, "---")?;
        writeln!(writer, "*Generated by catalog-callgraph*")?;

        Ok(())
    }
}
