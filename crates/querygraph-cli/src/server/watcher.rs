//! File system watcher for batch files.
//!
//! Watches the configured directories for changes to batch JSON files and
//! rebuilds the shared graph when one changes.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use anyhow::Result;
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode, DebouncedEventKind};

use super::{is_batch_file, AppState};

/// Check if a file's mtime has actually changed compared to stored value.
fn has_mtime_changed(path: &Path, stored_mtimes: &HashMap<PathBuf, SystemTime>) -> bool {
    match std::fs::metadata(path).and_then(|meta| meta.modified()) {
        Ok(current) => stored_mtimes
            .get(path)
            .map(|&stored| stored != current)
            .unwrap_or(true),
        // Deleted or unreadable files count as changed
        Err(_) => true,
    }
}

/// Groups an editor's save bursts into a single reload.
const DEBOUNCE_DURATION: Duration = Duration::from_millis(100);

/// Start watching directories for batch file changes.
///
/// Runs until the task is cancelled.
pub async fn start_watcher(state: Arc<AppState>) -> Result<()> {
    let watch_dirs = state.config.watch_dirs.clone();

    if watch_dirs.is_empty() {
        return Ok(());
    }

    let (tx, mut rx) = tokio::sync::mpsc::channel(16);

    let mut debouncer = new_debouncer(DEBOUNCE_DURATION, move |result| {
        if let Err(e) = tx.blocking_send(result) {
            eprintln!("querygraph: warning: failed to send file event: {e}");
        }
    })
    .map_err(|e| anyhow::anyhow!("Failed to create file watcher: {e}"))?;

    for dir in &watch_dirs {
        if dir.exists() {
            debouncer
                .watcher()
                .watch(dir, RecursiveMode::Recursive)
                .map_err(|e| anyhow::anyhow!("Failed to watch {}: {e}", dir.display()))?;
            println!("querygraph: watching {}", dir.display());
        }
    }

    while let Some(result) = rx.recv().await {
        match result {
            Ok(events) => {
                let stored_mtimes = state.mtimes.read().await.clone();

                let changed_files: Vec<_> = events
                    .iter()
                    .filter(|event| {
                        is_batch_file(&event.path)
                            && matches!(
                                event.kind,
                                DebouncedEventKind::Any | DebouncedEventKind::AnyContinuous
                            )
                    })
                    .filter(|event| has_mtime_changed(&event.path, &stored_mtimes))
                    .map(|e| e.path.display().to_string())
                    .collect();

                if !changed_files.is_empty() {
                    for file in &changed_files {
                        println!("querygraph: file changed: {file}");
                    }

                    if let Err(e) = state.reload_batches().await {
                        eprintln!("querygraph: failed to reload batches: {e:#}");
                    }
                }
            }
            Err(error) => {
                eprintln!("querygraph: watcher error: {error}");
            }
        }
    }

    Ok(())
}
