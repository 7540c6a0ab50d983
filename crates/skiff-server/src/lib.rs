//! Static asset server for skiff applications.
//!
//! Serves the build output directory with SPA fallback routing and a
//! content-type-aware cache policy. In development the server additionally
//! carries a WebSocket live-reload hub fed by a file watcher.

pub mod reload;
pub mod server;
pub mod watcher;

pub use reload::{reload_client_script, ReloadHub, ReloadMessage};
pub use server::{ServerError, SpaServer, SpaServerConfig};
pub use watcher::{FileWatcher, WatchEvent};
