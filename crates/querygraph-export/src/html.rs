use chrono::{DateTime, Utc};

use querygraph_core::{
    Connector, DetailPanel, GraphView, NodeBox, NodeStyle, Position, Scene, ViewFrame,
};

const CANVAS_PADDING: f64 = 24.0;

/// Renders the view as a standalone HTML page.
///
/// The page reproduces the current frame, selection included, and toggles
/// the selection client-side with the same click rules as the view.
pub fn export_html(view: &GraphView, project_name: &str, exported_at: DateTime<Utc>) -> String {
    let summary = view.model().summary();
    let export_date = exported_at.format("%Y-%m-%d %H:%M:%S UTC");

    let body = match view.frame() {
        ViewFrame::Loading => {
            "<div class=\"loading\"><div class=\"spinner\"></div></div>".to_string()
        }
        ViewFrame::Empty => {
            "<div class=\"empty-state\">No analyzed queries yet</div>".to_string()
        }
        ViewFrame::Graph(scene) => render_scene(view, &scene),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{title} - Query Lineage</title>
  <style>
    :root {{
      --bg-primary: #ffffff;
      --bg-secondary: #f8fafc;
      --text-primary: #1e293b;
      --text-secondary: #64748b;
      --border-color: #e2e8f0;
      --connector-color: #94a3b8;
    }}

    * {{ box-sizing: border-box; margin: 0; padding: 0; }}

    body {{
      font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, 'Helvetica Neue', Arial, sans-serif;
      background-color: var(--bg-secondary);
      color: var(--text-primary);
      line-height: 1.5;
    }}

    .container {{ max-width: 1400px; margin: 0 auto; padding: 2rem; }}

    header {{
      background: var(--bg-primary);
      border-bottom: 1px solid var(--border-color);
      padding: 1.5rem 2rem;
      margin-bottom: 2rem;
    }}

    h1 {{ font-size: 1.75rem; font-weight: 600; }}
    .export-date {{ color: var(--text-secondary); font-size: 0.875rem; margin-top: 0.5rem; }}

    .summary-cards {{
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(150px, 1fr));
      gap: 1rem;
      margin-bottom: 2rem;
    }}

    .card {{
      background: var(--bg-primary);
      border: 1px solid var(--border-color);
      border-radius: 8px;
      padding: 1rem;
    }}

    .card-label {{ font-size: 0.75rem; text-transform: uppercase; color: var(--text-secondary); }}
    .card-value {{ font-size: 1.5rem; font-weight: 600; }}

    .graph-container {{
      background: var(--bg-primary);
      border: 1px solid var(--border-color);
      border-radius: 8px;
      overflow: auto;
    }}

    .canvas {{ position: relative; }}

    .connector {{
      position: absolute;
      height: 0;
      border-top: 1px solid var(--connector-color);
      transform-origin: 0 0;
    }}

    .connector-label {{
      position: absolute;
      white-space: nowrap;
      font-size: 0.75rem;
      color: var(--text-secondary);
      background: var(--bg-primary);
      padding: 0 0.25rem;
    }}

    .node {{
      position: absolute;
      border-radius: 8px;
      padding: 0.5rem 0.75rem;
      cursor: pointer;
      box-shadow: 0 1px 2px rgba(0, 0, 0, 0.05);
      overflow: visible;
    }}

    .node-label {{ font-weight: 600; font-size: 0.875rem; white-space: nowrap; overflow: hidden; text-overflow: ellipsis; }}
    {node_styles}

    .details {{
      display: none;
      margin-top: 0.5rem;
      font-size: 0.75rem;
      background: var(--bg-primary);
      border: 1px solid var(--border-color);
      border-radius: 4px;
      padding: 0.5rem;
      position: relative;
      z-index: 1;
    }}
    .node.selected .details {{ display: block; }}
    .details pre {{ white-space: pre-wrap; word-break: break-word; font-size: 0.75rem; }}
    .details-label {{ font-weight: 600; color: var(--text-secondary); }}

    .loading {{ display: flex; align-items: center; justify-content: center; height: 600px; }}
    .spinner {{
      width: 2rem;
      height: 2rem;
      border: 3px solid var(--border-color);
      border-top-color: {selected_border};
      border-radius: 50%;
      animation: spin 1s linear infinite;
    }}
    @keyframes spin {{ to {{ transform: rotate(360deg); }} }}

    .empty-state {{
      display: flex;
      align-items: center;
      justify-content: center;
      height: 600px;
      color: var(--text-secondary);
    }}
  </style>
</head>
<body>
  <header>
    <h1>{title}</h1>
    <div class="export-date">Exported on {export_date}</div>
  </header>

  <div class="container">
    <div class="summary-cards">
      <div class="card"><div class="card-label">Queries</div><div class="card-value">{query_count}</div></div>
      <div class="card"><div class="card-label">Source Tables</div><div class="card-value">{source_count}</div></div>
      <div class="card"><div class="card-label">Target Tables</div><div class="card-value">{target_count}</div></div>
      <div class="card"><div class="card-label">Edges</div><div class="card-value">{edge_count}</div></div>
      <div class="card"><div class="card-label">Distinct Tables</div><div class="card-value">{distinct_tables}</div></div>
    </div>

    <div class="graph-container">{body}</div>
  </div>

  <script>
    document.querySelectorAll('.node').forEach(node => {{
      node.addEventListener('click', () => {{
        const wasSelected = node.classList.contains('selected');
        document.querySelectorAll('.node.selected').forEach(n => n.classList.remove('selected'));
        if (!wasSelected) {{
          node.classList.add('selected');
        }}
      }});
    }});
  </script>
</body>
</html>"#,
        title = escape_html(project_name),
        export_date = escape_html(&export_date.to_string()),
        node_styles = node_style_rules(),
        selected_border = NodeStyle::Selected.border_color(),
        query_count = summary.query_count,
        source_count = summary.source_count,
        target_count = summary.target_count,
        edge_count = summary.edge_count,
        distinct_tables = summary.distinct_tables,
        body = body,
    )
}

fn node_style_rules() -> String {
    // Selected comes last so it overrides the kind colours.
    [
        ("source", NodeStyle::Source),
        ("target", NodeStyle::Target),
        ("query", NodeStyle::Query),
    ]
    .iter()
    .map(|(class, style)| {
        format!(
            ".node-{class} {{ background: {}; border: {}px solid {}; }}",
            style.background(),
            style.border_width(),
            style.border_color()
        )
    })
    .chain(std::iter::once(format!(
        ".node.selected {{ background: {}; border: {}px solid {}; }}",
        NodeStyle::Selected.background(),
        NodeStyle::Selected.border_width(),
        NodeStyle::Selected.border_color()
    )))
    .collect::<Vec<_>>()
    .join("\n    ")
}

/// Shift that keeps every box inside the canvas; sources above the center
/// line can have negative coordinates.
fn canvas_shift(scene: &Scene) -> Position {
    let min_x = scene
        .nodes
        .iter()
        .map(|n| n.origin().x)
        .fold(f64::INFINITY, f64::min);
    let min_y = scene
        .nodes
        .iter()
        .map(|n| n.origin().y)
        .fold(f64::INFINITY, f64::min);

    Position::new(
        (CANVAS_PADDING - min_x).max(0.0),
        (CANVAS_PADDING - min_y).max(0.0),
    )
}

fn render_scene(view: &GraphView, scene: &Scene) -> String {
    let shift = canvas_shift(scene);

    let max_x = scene
        .nodes
        .iter()
        .map(|n| n.origin().x + n.width)
        .fold(0.0, f64::max);
    let max_y = scene
        .nodes
        .iter()
        .map(|n| n.origin().y + n.height)
        .fold(0.0, f64::max);
    let width = scene.width.max(max_x + shift.x + CANVAS_PADDING);
    let height = scene.height.max(max_y + shift.y + CANVAS_PADDING);

    let connectors = scene
        .connectors
        .iter()
        .map(|connector| render_connector(connector, shift))
        .collect::<Vec<_>>()
        .join("");

    let nodes = scene
        .nodes
        .iter()
        .map(|node| {
            let panel = view
                .model()
                .node(&node.node_id)
                .and_then(|model_node| model_node.details.as_ref())
                .map(DetailPanel::from_details)
                .unwrap_or_default();
            render_node(node, &panel, shift)
        })
        .collect::<Vec<_>>()
        .join("");

    format!(
        "<div class=\"canvas\" style=\"width: {width}px; height: {height}px;\">{connectors}{nodes}</div>"
    )
}

fn render_connector(connector: &Connector, shift: Position) -> String {
    format!(
        "<div class=\"connector\" data-edge-id=\"{id}\" style=\"left: {x}px; top: {y}px; width: {length}px; transform: rotate({angle}deg);\"></div>\
<span class=\"connector-label\" style=\"left: {mx}px; top: {my}px; transform: translate(-50%, -50%) rotate({angle}deg);\">{label}</span>",
        id = escape_html(&connector.edge_id),
        x = connector.start.x + shift.x,
        y = connector.start.y + shift.y,
        length = connector.length,
        angle = connector.angle_degrees(),
        mx = connector.midpoint.x + shift.x,
        my = connector.midpoint.y + shift.y,
        label = connector.label,
    )
}

fn render_node(node: &NodeBox, panel: &DetailPanel, shift: Position) -> String {
    let origin = node.origin();
    let selected = if node.selected { " selected" } else { "" };

    let mut details = String::new();
    if let Some(query) = &panel.query {
        details.push_str(&format!(
            "<div><span class=\"details-label\">Query:</span><pre>{}</pre></div>",
            escape_html(query)
        ));
    }
    if let Some(created) = &panel.created {
        details.push_str(&format!(
            "<div><span class=\"details-label\">Created:</span> {}</div>",
            escape_html(created)
        ));
    }
    if let Some(tables) = &panel.tables {
        details.push_str(&format!(
            "<div><span class=\"details-label\">Tables:</span> {}</div>",
            escape_html(tables)
        ));
    }

    format!(
        "<div class=\"node node-{kind}{selected}\" data-node-id=\"{id}\" style=\"left: {x}px; top: {y}px; width: {width}px; min-height: {height}px;\">\
<div class=\"node-label\">{label}</div><div class=\"details\">{details}</div></div>",
        kind = node.kind.as_str(),
        id = escape_html(&node.node_id),
        x = origin.x + shift.x,
        y = origin.y + shift.y,
        width = node.width,
        height = node.height,
        label = escape_html(&node.label),
    )
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#039;")
}
