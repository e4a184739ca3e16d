use std::collections::{BTreeMap, BTreeSet};
use std::io::{Cursor, Write};

use csv::WriterBuilder;
use querygraph_core::{EdgeLabel, GraphModel, NodeDetails};
use zip::write::FileOptions;
use zip::CompressionMethod;

use crate::ExportError;

/// Zips `nodes.csv`, `edges.csv`, `tables.csv` and `summary.csv` together.
pub fn export_csv_bundle(model: &GraphModel) -> Result<Vec<u8>, ExportError> {
    let files: Vec<(&str, Vec<u8>)> = vec![
        ("nodes.csv", export_nodes_csv(model)?),
        ("edges.csv", export_edges_csv(model)?),
        ("tables.csv", export_tables_csv(model)?),
        ("summary.csv", export_summary_csv(model)?),
    ];

    let cursor = Cursor::new(Vec::new());
    let mut zip = zip::ZipWriter::new(cursor);
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644);

    for (name, content) in files {
        zip.start_file(name, options)
            .map_err(|err| ExportError::Archive(err.to_string()))?;
        zip.write_all(&content)
            .map_err(|err| ExportError::Archive(err.to_string()))?;
    }

    let cursor = zip
        .finish()
        .map_err(|err| ExportError::Archive(err.to_string()))?;
    Ok(cursor.into_inner())
}

fn csv_writer() -> csv::Writer<Vec<u8>> {
    WriterBuilder::new().has_headers(true).from_writer(Vec::new())
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>, ExportError> {
    writer
        .into_inner()
        .map_err(|err| ExportError::Csv(err.to_string()))
}

fn export_nodes_csv(model: &GraphModel) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv_writer();

    writer
        .write_record(["Node ID", "Type", "Label", "X", "Y", "Query", "Created At"])
        .map_err(|err| ExportError::Csv(err.to_string()))?;

    for node in &model.nodes {
        let (query, created_at) = match &node.details {
            Some(NodeDetails::Query { query, timestamp }) => (query.as_str(), timestamp.as_str()),
            _ => ("", ""),
        };
        let x = node.position.x.to_string();
        let y = node.position.y.to_string();
        writer
            .write_record([
                node.id.as_str(),
                node.kind.as_str(),
                node.label.as_str(),
                x.as_str(),
                y.as_str(),
                query,
                created_at,
            ])
            .map_err(|err| ExportError::Csv(err.to_string()))?;
    }

    finish(writer)
}

fn export_edges_csv(model: &GraphModel) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv_writer();

    writer
        .write_record(["Edge ID", "Source", "Target", "Label"])
        .map_err(|err| ExportError::Csv(err.to_string()))?;

    for edge in &model.edges {
        writer
            .write_record([
                edge.id.as_str(),
                edge.source.as_str(),
                edge.target.as_str(),
                edge.label.as_str(),
            ])
            .map_err(|err| ExportError::Csv(err.to_string()))?;
    }

    finish(writer)
}

/// One row per distinct table name with the queries touching it.
fn export_tables_csv(model: &GraphModel) -> Result<Vec<u8>, ExportError> {
    #[derive(Default)]
    struct Usage<'a> {
        read_by: BTreeSet<&'a str>,
        written_by: BTreeSet<&'a str>,
        occurrences: usize,
    }

    let mut tables: BTreeMap<&str, Usage<'_>> = BTreeMap::new();
    for edge in &model.edges {
        let (table_id, query_id) = match edge.label {
            EdgeLabel::Reads => (&edge.source, &edge.target),
            EdgeLabel::Writes => (&edge.target, &edge.source),
        };
        let (Some(table), Some(query)) = (model.node(table_id), model.node(query_id)) else {
            continue;
        };

        let usage = tables.entry(table.label.as_str()).or_default();
        usage.occurrences += 1;
        match edge.label {
            EdgeLabel::Reads => usage.read_by.insert(query.label.as_str()),
            EdgeLabel::Writes => usage.written_by.insert(query.label.as_str()),
        };
    }

    let mut writer = csv_writer();
    writer
        .write_record(["Table Name", "Occurrences", "Read By", "Written By"])
        .map_err(|err| ExportError::Csv(err.to_string()))?;

    for (name, usage) in tables {
        writer
            .write_record([
                name.to_string(),
                usage.occurrences.to_string(),
                usage.read_by.into_iter().collect::<Vec<_>>().join(", "),
                usage.written_by.into_iter().collect::<Vec<_>>().join(", "),
            ])
            .map_err(|err| ExportError::Csv(err.to_string()))?;
    }

    finish(writer)
}

fn export_summary_csv(model: &GraphModel) -> Result<Vec<u8>, ExportError> {
    let summary = model.summary();
    let mut writer = csv_writer();

    writer
        .write_record(["Metric", "Value"])
        .map_err(|err| ExportError::Csv(err.to_string()))?;

    let rows = [
        ("Queries", summary.query_count),
        ("Source Nodes", summary.source_count),
        ("Target Nodes", summary.target_count),
        ("Edges", summary.edge_count),
        ("Distinct Tables", summary.distinct_tables),
    ];
    for (metric, value) in rows {
        writer
            .write_record([metric.to_string(), value.to_string()])
            .map_err(|err| ExportError::Csv(err.to_string()))?;
    }
    for (metric, value) in [("Width", model.bounds.width), ("Height", model.bounds.height)] {
        writer
            .write_record([metric.to_string(), value.to_string()])
            .map_err(|err| ExportError::Csv(err.to_string()))?;
    }

    finish(writer)
}
