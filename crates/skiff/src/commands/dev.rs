//! Development server command: build, watch, rebuild, reload.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use skiff_pipeline::{BuildEnv, Pipeline};
use skiff_server::{FileWatcher, ReloadHub, ReloadMessage, SpaServer, SpaServerConfig, WatchEvent};

use crate::commands::config::load_config;

/// Run the dev command.
pub async fn run(config_path: &Path, port: u16, open: bool) -> Result<()> {
    let env = BuildEnv::from_env().unwrap_or(BuildEnv::Development);

    let file_config = load_config(config_path)?;
    let config = file_config.pipeline_config(env, None, None);

    let watch_paths = watch_paths(&config.entry, &config.assets_dir);
    let output_dir = config.output_dir.clone();

    let pipeline = Arc::new(Pipeline::new(config));

    let result = pipeline.build()?;
    tracing::info!(
        "Initial build: {} assets, {} stylesheets in {}ms",
        result.assets,
        result.styles,
        result.duration_ms
    );

    let hub = ReloadHub::new();

    // Rebuild on source changes and notify connected pages
    let (watcher, mut rx) = FileWatcher::new(&watch_paths)?;

    let rebuild_hub = hub.clone();
    let rebuild_pipeline = Arc::clone(&pipeline);
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match &event {
                WatchEvent::EntryModified(path) => {
                    tracing::info!("Entry modified: {}", path.display());
                }
                WatchEvent::StyleModified(path) => {
                    tracing::info!("Stylesheet modified: {}", path.display());
                }
                WatchEvent::AssetModified(path) => {
                    tracing::info!("Asset modified: {}", path.display());
                }
                WatchEvent::Created(path) | WatchEvent::Deleted(path) => {
                    tracing::info!("Source tree changed: {}", path.display());
                }
                WatchEvent::Modified(path) => {
                    tracing::debug!("Ignoring change outside asset table: {}", path.display());
                    continue;
                }
            }

            match rebuild_pipeline.build() {
                Ok(_) => rebuild_hub.send(ReloadMessage::Reload),
                Err(e) => tracing::warn!("Rebuild failed: {}", e),
            }
        }
        // Keep watcher alive
        drop(watcher);
    });

    let server_config = SpaServerConfig {
        root: output_dir,
        port,
        host: "127.0.0.1".to_string(),
        open,
    };

    SpaServer::new(server_config).with_reload(hub).start().await?;

    Ok(())
}

/// Watch the entry module's directory and the assets directory, collapsing
/// nested paths so events are not delivered twice.
fn watch_paths(entry: &Path, assets_dir: &Path) -> Vec<PathBuf> {
    let entry_dir = entry.parent().unwrap_or(Path::new(".")).to_path_buf();

    if assets_dir.starts_with(&entry_dir) {
        vec![entry_dir]
    } else if entry_dir.starts_with(assets_dir) {
        vec![assets_dir.to_path_buf()]
    } else {
        vec![entry_dir, assets_dir.to_path_buf()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_watch_paths_are_collapsed() {
        let paths = watch_paths(Path::new("web/main.js"), Path::new("web/assets"));
        assert_eq!(paths, vec![PathBuf::from("web")]);

        let paths = watch_paths(Path::new("src/Main.elm"), Path::new("static"));
        assert_eq!(paths, vec![PathBuf::from("src"), PathBuf::from("static")]);
    }
}
