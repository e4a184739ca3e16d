//! QueryGraph CLI - lineage graph viewer for analyzed SQL batches

use querygraph_cli::cli;
use querygraph_cli::input;
use querygraph_cli::logging;
use querygraph_cli::output;
use querygraph_cli::schema;
#[cfg(feature = "serve")]
use querygraph_cli::server;

use anyhow::{Context, Result};
use clap::Parser;
use querygraph_core::{GraphView, RecordBatch};
use querygraph_export::{
    export_csv_bundle, export_html, export_mermaid, ExportFormat, ExportNaming,
};
use std::fs;
use std::io::{self, Write};
use std::process::ExitCode;

use cli::{Args, OutputFormat};
use output::{format_frame_json, format_json, format_table};

/// Entries were skipped while loading the batch.
const EXIT_FAILURE: u8 = 1;
/// Input or configuration error (unreadable batch, invalid layout config).
const EXIT_CONFIG_ERROR: u8 = 66;

fn main() -> ExitCode {
    let args = Args::parse();
    logging::init(args.verbose);

    if args.emit_schema {
        return match schema::batch_schema_json(args.compact)
            .and_then(|content| write_output(&args.output, &content))
        {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("querygraph: error: {e:#}");
                ExitCode::from(EXIT_FAILURE)
            }
        };
    }

    #[cfg(feature = "serve")]
    if args.serve {
        return run_serve_mode(args);
    }

    match run(args) {
        Ok(has_skipped) => {
            if has_skipped {
                ExitCode::from(EXIT_FAILURE)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("querygraph: error: {e:#}");
            ExitCode::from(EXIT_CONFIG_ERROR)
        }
    }
}

/// Run the CLI in serve mode.
#[cfg(feature = "serve")]
fn run_serve_mode(args: Args) -> ExitCode {
    use server::ServerConfig;

    let layout = match input::read_layout_config(args.layout_config.as_deref()) {
        Ok(layout) => layout,
        Err(e) => {
            eprintln!("querygraph: error: {e:#}");
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };

    // Watch directories take precedence over static input
    let (watch_dirs, static_sources) = if !args.watch.is_empty() {
        if !args.files.is_empty() {
            eprintln!("querygraph: warning: ignoring positional files when --watch is provided");
        }
        (args.watch.clone(), None)
    } else {
        match input::read_input(&args.files) {
            Ok(sources) if !sources.is_empty() => (vec![], Some(sources)),
            Ok(_) => {
                eprintln!("querygraph: error: no batches to serve (use --watch or provide files)");
                return ExitCode::from(EXIT_FAILURE);
            }
            Err(e) => {
                eprintln!("querygraph: error: {e:#}");
                return ExitCode::from(EXIT_FAILURE);
            }
        }
    };

    let config = ServerConfig {
        watch_dirs,
        static_sources,
        layout,
        port: args.port,
        open_browser: args.open,
        project_name: args.project_name.clone(),
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("querygraph: error: failed to create tokio runtime: {e}");
            return ExitCode::from(EXIT_FAILURE);
        }
    };

    match runtime.block_on(server::run_server(config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("querygraph: server error: {e:#}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

/// Load the batch, build the view and render it in the requested format.
///
/// Returns whether any entry was skipped.
fn run(args: Args) -> Result<bool> {
    let sources = input::read_input(&args.files)?;
    let batch = input::load_batch(&sources)?;
    let layout = input::read_layout_config(args.layout_config.as_deref())?;
    tracing::debug!(
        sources = sources.len(),
        records = batch.len(),
        skipped = batch.skipped.len(),
        "batch loaded"
    );

    let mut view = GraphView::new(layout);
    view.load_records(&batch.records);
    apply_selection(&mut view, &args.select, args.quiet);

    if !args.quiet {
        print_skipped_to_stderr(&batch);
    }

    let naming = ExportNaming::new(args.project_name.clone());
    let has_skipped = batch.has_skipped();

    match args.format {
        OutputFormat::Table => {
            let use_colors = args.output.is_none();
            let content = format_table(&view, &batch.skipped, args.quiet, use_colors);
            write_output(&args.output, &content)?;
        }
        OutputFormat::Json => {
            write_output(&args.output, &format_json(&view, args.compact)?)?;
        }
        OutputFormat::Frame => {
            write_output(&args.output, &format_frame_json(&view, args.compact)?)?;
        }
        OutputFormat::Mermaid => {
            write_output(&args.output, &export_mermaid(view.model()))?;
        }
        OutputFormat::Html => {
            let content = export_html(&view, &args.project_name, naming.exported_at());
            write_output(&args.output, &content)?;
        }
        OutputFormat::Csv => {
            let bytes = export_csv_bundle(view.model()).context("Failed to export CSV archive")?;
            write_binary_output(&args.output, &bytes, &naming, ExportFormat::CsvBundle)?;
        }
    }

    Ok(has_skipped)
}

/// Replay `--select` clicks in order, warning about ids the graph lacks.
fn apply_selection(view: &mut GraphView, clicks: &[String], quiet: bool) {
    for node_id in clicks {
        if !view.model().contains_node(node_id) && !quiet {
            eprintln!("querygraph: warning: no node with id {node_id}; click ignored");
        }
        view.click(node_id);
    }
}

fn write_output(path: &Option<std::path::PathBuf>, content: &str) -> Result<()> {
    if let Some(path) = path {
        fs::write(path, content)
            .with_context(|| format!("Failed to write to {}", path.display()))?;
    } else {
        io::stdout()
            .write_all(content.as_bytes())
            .context("Failed to write to stdout")?;
        // Ensure newline at end for terminal output
        if !content.ends_with('\n') {
            println!();
        }
    }
    Ok(())
}

fn write_binary_output(
    path: &Option<std::path::PathBuf>,
    content: &[u8],
    naming: &ExportNaming,
    format: ExportFormat,
) -> Result<()> {
    let path = path
        .clone()
        .unwrap_or_else(|| std::path::PathBuf::from(naming.filename(format)));

    fs::write(&path, content).with_context(|| format!("Failed to write to {}", path.display()))?;
    Ok(())
}

fn print_skipped_to_stderr(batch: &RecordBatch) {
    for entry in &batch.skipped {
        let origin = entry
            .file_name
            .as_deref()
            .map(|name| format!(" ({name})"))
            .unwrap_or_default();
        eprintln!(
            "querygraph: warning: skipped entry {}{origin}: {}",
            entry.index, entry.reason
        );
    }
}
