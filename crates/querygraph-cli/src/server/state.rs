//! Shared application state for the server.
//!
//! `AppState` owns the loaded batch and the single `GraphView` every client
//! sees. State is shared across handlers via `Arc`.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::SystemTime;

use anyhow::Result;
use querygraph_core::{GraphView, IngestError, LayoutConfig, RecordBatch};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::input::{self, BatchSource};

/// Server configuration derived from CLI arguments.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Directories to watch for batch JSON files
    pub watch_dirs: Vec<PathBuf>,
    /// Batches read once at startup when no directory is watched
    pub static_sources: Option<Vec<BatchSource>>,
    /// Layout parameters for every rebuilt graph
    pub layout: LayoutConfig,
    /// Port to listen on
    pub port: u16,
    /// Whether to open browser on startup
    pub open_browser: bool,
    /// Title of the viewer page and prefix of export filenames
    pub project_name: String,
}

/// Shared application state.
pub struct AppState {
    /// Server configuration
    pub config: ServerConfig,
    /// Records and skipped entries behind the current graph
    pub batch: RwLock<RecordBatch>,
    /// Selection and viewport over the current graph
    pub view: RwLock<GraphView>,
    /// Last seen modification times of watched batch files
    pub mtimes: RwLock<HashMap<PathBuf, SystemTime>>,
}

impl AppState {
    /// Create new application state, loading the initial batch.
    pub async fn new(config: ServerConfig) -> Result<Self> {
        let (sources, mtimes) = match &config.static_sources {
            Some(sources) => (sources.clone(), HashMap::new()),
            None => super::scan_batch_files(&config.watch_dirs)?,
        };
        let batch = input::load_batch(&sources)?;

        let mut view = GraphView::new(config.layout.clone());
        view.load_records(&batch.records);

        if !batch.is_empty() {
            println!(
                "querygraph: loaded {} record(s) from {} batch file(s)",
                batch.len(),
                sources.len()
            );
        }

        Ok(Self {
            config,
            batch: RwLock::new(batch),
            view: RwLock::new(view),
            mtimes: RwLock::new(mtimes),
        })
    }

    /// Replace the batch and rebuild the graph; the selection is reset.
    pub async fn replace_batch(&self, batch: RecordBatch) {
        let mut view = self.view.write().await;
        view.load_records(&batch.records);
        view.set_loading(false);
        debug!(records = batch.len(), skipped = batch.skipped.len(), "batch replaced");
        *self.batch.write().await = batch;
    }

    /// Append records after the loaded batch and rebuild the graph.
    ///
    /// Both locks are held across the read, the append and the rebuild, in
    /// the same order as `replace_batch`. A rejected batch changes nothing.
    /// Returns the skipped-entry count of the combined batch.
    pub async fn append_batch(&self, next: RecordBatch) -> Result<usize, IngestError> {
        let mut view = self.view.write().await;
        let mut batch = self.batch.write().await;

        let mut combined = batch.clone();
        combined.append(next)?;
        view.load_records(&combined.records);
        view.set_loading(false);
        debug!(records = combined.len(), skipped = combined.skipped.len(), "batch appended");

        let skipped = combined.skipped.len();
        *batch = combined;
        Ok(skipped)
    }

    /// Reload batches from watch directories.
    ///
    /// The view reports loading while files are read. A batch that fails to
    /// parse leaves the previous graph in place.
    pub async fn reload_batches(&self) -> Result<()> {
        self.view.write().await.set_loading(true);

        let loaded = super::scan_batch_files(&self.config.watch_dirs)
            .and_then(|(sources, mtimes)| Ok((input::load_batch(&sources)?, mtimes)));

        match loaded {
            Ok((batch, mtimes)) => {
                let count = batch.len();
                self.replace_batch(batch).await;
                *self.mtimes.write().await = mtimes;
                println!("querygraph: reloaded {count} record(s)");
                Ok(())
            }
            Err(e) => {
                self.view.write().await.set_loading(false);
                warn!(error = %e, "keeping previous graph");
                Err(e)
            }
        }
    }
}
