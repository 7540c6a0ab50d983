//! Production server command.

use std::path::PathBuf;

use anyhow::Result;
use skiff_server::{SpaServer, SpaServerConfig};

/// Run the serve command.
pub async fn run(port: u16, dir: PathBuf) -> Result<()> {
    let config = SpaServerConfig {
        root: dir,
        port,
        ..Default::default()
    };

    SpaServer::new(config).start().await?;

    Ok(())
}
