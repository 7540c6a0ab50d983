//! File watching for rebuild-on-change.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc as async_mpsc;

use skiff_pipeline::AssetKind;

/// Events emitted by the file watcher.
#[derive(Debug, Clone)]
pub enum WatchEvent {
    /// Entry-module source was modified
    EntryModified(PathBuf),

    /// Stylesheet was modified
    StyleModified(PathBuf),

    /// Font or image was modified
    AssetModified(PathBuf),

    /// File was created
    Created(PathBuf),

    /// File was deleted
    Deleted(PathBuf),

    /// Modification outside the asset table
    Modified(PathBuf),
}

/// File watcher for detecting changes.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
}

impl FileWatcher {
    /// Create a new file watcher for the given paths.
    ///
    /// Returns the watcher and a channel to receive events.
    pub fn new(
        paths: &[PathBuf],
    ) -> Result<(Self, async_mpsc::Receiver<WatchEvent>), std::io::Error> {
        let (sync_tx, sync_rx) = mpsc::channel();
        let (async_tx, async_rx) = async_mpsc::channel(100);

        // Create the watcher
        let mut watcher = notify::recommended_watcher(move |res: Result<notify::Event, _>| {
            if let Ok(event) = res {
                let _ = sync_tx.send(event);
            }
        })
        .map_err(std::io::Error::other)?;

        // Watch all paths
        for path in paths {
            if path.exists() {
                watcher
                    .watch(path, RecursiveMode::Recursive)
                    .map_err(std::io::Error::other)?;
            }
        }

        // Spawn a task to forward events
        let async_tx_clone = async_tx.clone();
        std::thread::spawn(move || {
            let debounce_duration = Duration::from_millis(100);

            while let Ok(event) = sync_rx.recv() {
                // Coalesce bursts: wait out the quiet window and forward
                // the last event seen, so a save landing right after
                // another one still triggers a rebuild.
                let mut latest = event;
                while let Ok(next) = sync_rx.recv_timeout(debounce_duration) {
                    latest = next;
                }

                for path in &latest.paths {
                    let watch_event = classify_event(path, &latest.kind);
                    if let Some(e) = watch_event {
                        let _ = async_tx_clone.blocking_send(e);
                    }
                }
            }
        });

        Ok((Self { _watcher: watcher }, async_rx))
    }
}

/// Classify a notify event into a WatchEvent using the pipeline's asset
/// table.
fn classify_event(path: &Path, kind: &notify::EventKind) -> Option<WatchEvent> {
    use notify::EventKind;

    match kind {
        EventKind::Create(_) => Some(WatchEvent::Created(path.to_path_buf())),
        EventKind::Remove(_) => Some(WatchEvent::Deleted(path.to_path_buf())),
        EventKind::Modify(_) => Some(match AssetKind::from_path(path) {
            Some(AssetKind::Script) => WatchEvent::EntryModified(path.to_path_buf()),
            Some(AssetKind::Style) => WatchEvent::StyleModified(path.to_path_buf()),
            Some(AssetKind::Font | AssetKind::Image) => {
                WatchEvent::AssetModified(path.to_path_buf())
            }
            None => WatchEvent::Modified(path.to_path_buf()),
        }),
        _ => None,
    }
}
