//! Human-readable table output formatting.

use is_terminal::IsTerminal;
use owo_colors::OwoColorize;
use querygraph_core::{
    EdgeLabel, GraphModel, GraphNode, GraphView, NodeKind, SkippedEntry, ViewFrame,
};
use std::fmt::Write;

/// Format the view as human-readable text with optional colors.
pub fn format_table(
    view: &GraphView,
    skipped: &[SkippedEntry],
    quiet: bool,
    use_colors: bool,
) -> String {
    let colored = use_colors && std::io::stdout().is_terminal();
    let mut out = String::new();

    write_header(&mut out, colored);
    write_summary(&mut out, view, colored);
    write_queries(&mut out, view.model(), colored);
    write_selection(&mut out, view, colored);

    if !quiet {
        write_skipped(&mut out, skipped, colored);
    }

    out
}

fn write_header(out: &mut String, colored: bool) {
    let title = "QueryGraph Lineage";
    let line = "═".repeat(50);

    if colored {
        writeln!(out, "{}", title.bold()).unwrap();
        writeln!(out, "{}", line.dimmed()).unwrap();
    } else {
        writeln!(out, "{title}").unwrap();
        writeln!(out, "{line}").unwrap();
    }
}

fn write_summary(out: &mut String, view: &GraphView, colored: bool) {
    let summary = view.model().summary();
    let dimensions = view.dimensions();

    let stats = format!(
        "Summary: {} queries | {} tables read | {} tables written | {} edges | {} distinct tables",
        summary.query_count,
        summary.source_count,
        summary.target_count,
        summary.edge_count,
        summary.distinct_tables
    );

    if colored {
        writeln!(out, "{}", stats.cyan()).unwrap();
    } else {
        writeln!(out, "{stats}").unwrap();
    }
    writeln!(out, "Canvas: {} x {}", dimensions.width, dimensions.height).unwrap();
    writeln!(out).unwrap();
}

fn table_labels<'a>(model: &'a GraphModel, query: &'a GraphNode, label: EdgeLabel) -> Vec<&'a str> {
    model
        .edges_for(&query.id)
        .filter(|edge| edge.label == label)
        .filter_map(|edge| {
            let other = if edge.source == query.id {
                &edge.target
            } else {
                &edge.source
            };
            model.node(other).map(|node| node.label.as_str())
        })
        .collect()
}

fn write_queries(out: &mut String, model: &GraphModel, colored: bool) {
    if model.is_empty() {
        writeln!(out, "No analyzed queries.").unwrap();
        writeln!(out).unwrap();
        return;
    }

    if colored {
        writeln!(out, "{}", "Queries:".bold()).unwrap();
    } else {
        writeln!(out, "Queries:").unwrap();
    }

    let arrow = if colored {
        "→".green().to_string()
    } else {
        "→".to_string()
    };

    for query in model.nodes_of_kind(NodeKind::Query) {
        let reads = table_labels(model, query, EdgeLabel::Reads);
        let writes = table_labels(model, query, EdgeLabel::Writes);

        writeln!(out, "  {} ({})", query.label, query.id).unwrap();
        match (reads.is_empty(), writes.is_empty()) {
            (true, true) => writeln!(out, "    (no tables)").unwrap(),
            _ => writeln!(
                out,
                "    {} {arrow} {}",
                if reads.is_empty() { "-".to_string() } else { reads.join(", ") },
                if writes.is_empty() { "-".to_string() } else { writes.join(", ") },
            )
            .unwrap(),
        }
    }
    writeln!(out).unwrap();
}

fn write_selection(out: &mut String, view: &GraphView, colored: bool) {
    let ViewFrame::Graph(scene) = view.frame() else {
        return;
    };
    let Some(node) = scene.selected_node() else {
        return;
    };

    let header = format!("Selected: {} ({})", node.label, node.node_id);
    if colored {
        writeln!(out, "{}", header.bold()).unwrap();
    } else {
        writeln!(out, "{header}").unwrap();
    }

    if let Some(details) = &node.details {
        if let Some(query) = &details.query {
            writeln!(out, "  Query: {query}").unwrap();
        }
        if let Some(created) = &details.created {
            writeln!(out, "  Created: {created}").unwrap();
        }
        if let Some(tables) = &details.tables {
            writeln!(out, "  Tables: {tables}").unwrap();
        }
    }
    writeln!(out).unwrap();
}

fn write_skipped(out: &mut String, skipped: &[SkippedEntry], colored: bool) {
    if skipped.is_empty() {
        return;
    }

    let header = format!("Skipped ({}):", skipped.len());
    if colored {
        writeln!(out, "{}", header.bold()).unwrap();
    } else {
        writeln!(out, "{header}").unwrap();
    }

    for entry in skipped {
        let label = if colored {
            "SKIP".yellow().to_string()
        } else {
            "SKIP".to_string()
        };
        let origin = entry
            .file_name
            .as_deref()
            .map(|name| format!(" {name}:"))
            .unwrap_or_default();

        writeln!(
            out,
            "  [{label}] entry {}{origin} {}",
            entry.index, entry.reason
        )
        .unwrap();
    }
}
