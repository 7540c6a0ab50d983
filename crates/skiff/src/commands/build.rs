//! Deployment build command.

use std::path::{Path, PathBuf};

use anyhow::Result;
use skiff_pipeline::{BuildEnv, Pipeline};

use crate::commands::config::load_config;

/// Run the build command.
///
/// The lifecycle variable can redirect the branch; without it a `build`
/// invocation is a production build.
pub async fn run(config_path: &Path, output: Option<PathBuf>, minify: Option<bool>) -> Result<()> {
    let env = BuildEnv::from_env().unwrap_or(BuildEnv::Production);

    if env.is_production() {
        tracing::info!("Building for production...");
    } else {
        tracing::info!("Building for development...");
    }

    let file_config = load_config(config_path)?;
    let config = file_config.pipeline_config(env, output, minify);

    let result = Pipeline::new(config).build()?;

    tracing::info!(
        "Staged {} assets and {} stylesheets in {}ms",
        result.assets,
        result.styles,
        result.duration_ms
    );

    tracing::info!("Output: {}", result.output_dir.display());

    Ok(())
}
