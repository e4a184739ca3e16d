use querygraph_core::{GraphModel, NodeKind, NodeStyle};

/// Renders the model as a left-to-right Mermaid flowchart.
///
/// Node ids are escaped into Mermaid-safe identifiers; labels keep the table names verbatim. Each table
/// occurrence stays its own node, mirroring the built model.
pub fn export_mermaid(model: &GraphModel) -> String {
    let mut lines = vec!["flowchart LR".to_string()];

    for node in &model.nodes {
        let id = sanitize_id(&node.id);
        let label = escape_label(&node.label);
        let shape = match node.kind {
            NodeKind::Query => format!("[\"{label}\"]"),
            NodeKind::Source | NodeKind::Target => format!("[(\"{label}\")]"),
        };
        lines.push(format!("    {id}{shape}"));
    }

    for edge in &model.edges {
        lines.push(format!(
            "    {} -->|{}| {}",
            sanitize_id(&edge.source),
            edge.label,
            sanitize_id(&edge.target)
        ));
    }

    if !model.is_empty() {
        for kind in [NodeKind::Source, NodeKind::Target, NodeKind::Query] {
            let style = NodeStyle::for_kind(kind);
            lines.push(format!(
                "    classDef {kind} fill:{},stroke:{}",
                style.background(),
                style.border_color()
            ));

            let members: Vec<String> = model
                .nodes_of_kind(kind)
                .map(|node| sanitize_id(&node.id))
                .collect();
            if !members.is_empty() {
                lines.push(format!("    class {} {kind}", members.join(",")));
            }
        }
    }

    lines.join("\n")
}

/// Keeps ASCII alphanumerics and writes every other character, `_`
/// included, as `_{hex code point}_`. Distinct ids stay distinct.
fn sanitize_id(id: &str) -> String {
    let mut out = String::with_capacity(id.len());
    for c in id.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c);
        } else {
            out.push_str(&format!("_{:x}_", u32::from(c)));
        }
    }
    out
}

fn escape_label(label: &str) -> String {
    label.replace('"', "#quot;").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use querygraph_core::{build_graph, LineageRecord};

    #[test]
    fn test_empty_model() {
        assert_eq!(export_mermaid(&build_graph(&[])), "flowchart LR");
    }

    #[test]
    fn test_nodes_edges_and_classes() {
        let model = build_graph(&[LineageRecord::new(1, "q")
            .with_sources(["raw.orders"])
            .with_targets(["orders_summary"])]);
        let mermaid = export_mermaid(&model);

        assert!(mermaid.contains("    query_2d_1[\"Query 1\"]"));
        assert!(mermaid.contains("    source_2d_0[(\"raw.orders\")]"));
        assert!(mermaid.contains("    source_2d_0 -->|reads| query_2d_1"));
        assert!(mermaid.contains("    query_2d_1 -->|writes| target_2d_1"));
        assert!(mermaid.contains("classDef source fill:#f0fdf4,stroke:#e5e7eb"));
        assert!(mermaid.contains("class query_2d_1 query"));
    }

    #[test]
    fn test_label_escaping() {
        assert_eq!(escape_label("say \"hi\"\nnow"), "say #quot;hi#quot; now");
        assert_eq!(sanitize_id("query-stg.orders"), "query_2d_stg_2e_orders");
    }

    #[test]
    fn test_ids_differing_only_in_punctuation_stay_distinct() {
        assert_eq!(sanitize_id("query-a-b"), "query_2d_a_2d_b");
        assert_eq!(sanitize_id("query-a_b"), "query_2d_a_5f_b");
        assert_ne!(sanitize_id("a-b"), sanitize_id("a_b"));
        assert_ne!(sanitize_id("a-_b"), sanitize_id("a_-b"));
    }

    #[test]
    fn test_colliding_record_ids_export_separate_nodes() {
        let model = build_graph(&[
            LineageRecord::new("a-b", "q1").with_sources(["orders"]),
            LineageRecord::new("a_b", "q2").with_sources(["orders"]),
        ]);
        let mermaid = export_mermaid(&model);

        assert!(mermaid.contains("    query_2d_a_2d_b[\"Query a-b\"]"));
        assert!(mermaid.contains("    query_2d_a_5f_b[\"Query a_b\"]"));
        assert!(mermaid.contains("    source_2d_0 -->|reads| query_2d_a_2d_b"));
        assert!(mermaid.contains("    source_2d_1 -->|reads| query_2d_a_5f_b"));
    }
}
