//! Pipeline orchestration: compile the entry module, stage assets, generate
//! the entry document.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;

use rayon::prelude::*;
use walkdir::WalkDir;

use skiff_bridge::{bootstrap_script, WidgetConfig};

use crate::assets::AssetKind;
use crate::hash::hashed_filename;
use crate::html::{IndexContext, IndexTemplate};
use crate::styles::{bundle_styles, minify_css, rewrite_asset_urls};

/// Build environment, selected by the lifecycle event that invoked the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildEnv {
    Development,
    Production,
}

impl BuildEnv {
    /// Environment variable carrying the build-lifecycle signal.
    pub const LIFECYCLE_VAR: &'static str = "SKIFF_LIFECYCLE";

    /// Map a lifecycle event name to a build environment.
    ///
    /// `build` selects production; `start` and `dev` select development.
    /// Anything else leaves the choice to the invoking command.
    pub fn from_lifecycle(event: Option<&str>) -> Option<Self> {
        match event {
            Some("build") => Some(Self::Production),
            Some("start") | Some("dev") => Some(Self::Development),
            _ => None,
        }
    }

    /// Read the build environment from the lifecycle variable.
    pub fn from_env() -> Option<Self> {
        Self::from_lifecycle(std::env::var(Self::LIFECYCLE_VAR).ok().as_deref())
    }

    pub fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Configuration for a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Entry module source file
    pub entry: PathBuf,

    /// Directory containing stylesheets, fonts, and images
    pub assets_dir: PathBuf,

    /// Build output directory
    pub output_dir: PathBuf,

    /// Build environment branch
    pub env: BuildEnv,

    /// Minify extracted stylesheets (production builds)
    pub minify: bool,

    /// Document title for the generated index.html
    pub title: String,

    /// External compiler command for the entry module, with `{entry}` and
    /// `{output}` placeholders. Empty means the entry is copied as-is.
    pub compiler: Vec<String>,

    /// Extra compiler arguments appended in production builds
    pub release_args: Vec<String>,

    /// Authentication widget configuration, if the app uses sign-in
    pub auth: Option<WidgetConfig>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            entry: PathBuf::from("web/main.js"),
            assets_dir: PathBuf::from("web/assets"),
            output_dir: PathBuf::from("dist"),
            env: BuildEnv::Development,
            minify: true,
            title: "Application".to_string(),
            compiler: vec![],
            release_args: vec![],
            auth: None,
        }
    }
}

/// Result of a pipeline run.
#[derive(Debug)]
pub struct BuildResult {
    /// Number of fonts and images staged
    pub assets: usize,

    /// Number of stylesheet sources bundled
    pub styles: usize,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

/// Errors that can occur during a build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Failed to compile entry module: {0}")]
    CompileError(String),

    #[error("Failed to read source: {0}")]
    ReadError(String),

    #[error("Failed to write output: {0}")]
    WriteError(String),

    #[error("Failed to process stylesheet: {0}")]
    StyleError(String),

    #[error("Failed to render index.html: {0}")]
    TemplateError(String),
}

/// The build pipeline.
pub struct Pipeline {
    config: PipelineConfig,
    template: IndexTemplate,
}

impl Pipeline {
    /// Create a new pipeline.
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            template: IndexTemplate::new(),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline: compile the entry, stage assets, bundle styles,
    /// and generate index.html.
    pub fn build(&self) -> Result<BuildResult, BuildError> {
        let start = Instant::now();
        let production = self.config.env.is_production();

        fs::create_dir_all(&self.config.output_dir)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        // Entry module
        let bundle = self.compile_entry()?;
        let script_name = hashed_filename(&self.entry_stem(), "js", &bundle);
        self.write_output(Path::new(AssetKind::Script.dest_dir()), &script_name, &bundle)?;

        // Fonts and images, staged in parallel. The map records where each
        // source file landed so stylesheet references can follow.
        let (style_paths, asset_paths) = self.discover_assets();

        let staged: HashMap<String, String> = asset_paths
            .par_iter()
            .map(|path| self.stage_asset(path))
            .collect::<Result<HashMap<_, _>, _>>()?;

        // Stylesheets: inlined in development, extracted in production
        let css = self.bundle_stylesheets(&style_paths, &staged)?;
        let (style_href, inline_css) = match (&css, production) {
            (None, _) => (None, None),
            (Some(css), false) => (None, Some(css.clone())),
            (Some(css), true) => {
                let extracted = if self.config.minify {
                    minify_css(css).map_err(BuildError::StyleError)?
                } else {
                    css.clone()
                };
                let name = hashed_filename("app", "css", extracted.as_bytes());
                self.write_output(
                    Path::new(AssetKind::Style.dest_dir()),
                    &name,
                    extracted.as_bytes(),
                )?;
                (Some(format!("/css/{name}")), None)
            }
        };

        // Entry document
        let ctx = IndexContext {
            title: self.config.title.clone(),
            script_src: format!("/js/{script_name}"),
            style_href,
            inline_css,
            production,
            auth_bootstrap: self.config.auth.as_ref().map(bootstrap_script),
            live_reload: !production,
        };

        let html = self
            .template
            .render(&ctx)
            .map_err(|e| BuildError::TemplateError(e.to_string()))?;

        fs::write(self.config.output_dir.join("index.html"), html)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        let duration = start.elapsed();

        tracing::debug!(
            "Staged {} assets and {} stylesheets in {}ms",
            asset_paths.len(),
            style_paths.len(),
            duration.as_millis()
        );

        Ok(BuildResult {
            assets: asset_paths.len(),
            styles: style_paths.len(),
            duration_ms: duration.as_millis() as u64,
            output_dir: self.config.output_dir.clone(),
        })
    }

    /// Compile the entry module with the configured external compiler, or
    /// copy it as-is when no compiler is configured.
    fn compile_entry(&self) -> Result<Vec<u8>, BuildError> {
        if self.config.compiler.is_empty() {
            return fs::read(&self.config.entry).map_err(|e| {
                BuildError::ReadError(format!("{}: {}", self.config.entry.display(), e))
            });
        }

        let scratch = self.config.output_dir.join(".entry.js");

        let mut args: Vec<String> = self.config.compiler[1..].to_vec();
        if self.config.env.is_production() {
            args.extend(self.config.release_args.iter().cloned());
        }
        for arg in &mut args {
            *arg = arg
                .replace("{entry}", &self.config.entry.display().to_string())
                .replace("{output}", &scratch.display().to_string());
        }

        let status = Command::new(&self.config.compiler[0])
            .args(&args)
            .status()
            .map_err(|e| {
                BuildError::CompileError(format!("{}: {}", self.config.compiler[0], e))
            })?;

        if !status.success() {
            // A failed compiler may still have written partial output
            let _ = fs::remove_file(&scratch);
            return Err(BuildError::CompileError(format!(
                "{} exited with {}",
                self.config.compiler[0], status
            )));
        }

        let bundle = fs::read(&scratch)
            .map_err(|e| BuildError::CompileError(format!("compiler wrote no output: {}", e)))?;
        let _ = fs::remove_file(&scratch);

        Ok(bundle)
    }

    /// Walk the assets directory and split sources into stylesheets and
    /// copyable assets. Unknown extensions are skipped.
    fn discover_assets(&self) -> (Vec<PathBuf>, Vec<PathBuf>) {
        let mut styles = Vec::new();
        let mut assets = Vec::new();

        if !self.config.assets_dir.exists() {
            return (styles, assets);
        }

        for entry in WalkDir::new(&self.config.assets_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();

            if !path.is_file() || path == self.config.entry {
                continue;
            }

            match AssetKind::from_path(path) {
                Some(AssetKind::Style) => styles.push(path.to_path_buf()),
                Some(_) => assets.push(path.to_path_buf()),
                None => {}
            }
        }

        // Bundle order must be stable across runs
        styles.sort();

        (styles, assets)
    }

    /// Read and concatenate stylesheet sources, pointing url() references
    /// at the staged hashed assets. Returns None when the app has no
    /// stylesheets.
    fn bundle_stylesheets(
        &self,
        paths: &[PathBuf],
        staged: &HashMap<String, String>,
    ) -> Result<Option<String>, BuildError> {
        if paths.is_empty() {
            return Ok(None);
        }

        let mut sources = Vec::with_capacity(paths.len());
        for path in paths {
            let source = fs::read_to_string(path)
                .map_err(|e| BuildError::ReadError(format!("{}: {}", path.display(), e)))?;
            sources.push(source);
        }

        Ok(Some(rewrite_asset_urls(&bundle_styles(&sources), staged)))
    }

    /// Hash and copy a font or image into its destination directory.
    ///
    /// Returns the source file name and the URL it was staged under.
    fn stage_asset(&self, path: &Path) -> Result<(String, String), BuildError> {
        let kind = AssetKind::from_path(path).expect("staged paths are pre-classified");

        let bytes = fs::read(path)
            .map_err(|e| BuildError::ReadError(format!("{}: {}", path.display(), e)))?;

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("asset");
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("bin");

        let name = hashed_filename(stem, ext, &bytes);
        self.write_output(Path::new(kind.dest_dir()), &name, &bytes)?;

        let source_name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or(stem)
            .to_string();

        Ok((source_name, format!("/{}/{}", kind.dest_dir(), name)))
    }

    /// Write a file into a subdirectory of the output directory.
    fn write_output(&self, subdir: &Path, name: &str, bytes: &[u8]) -> Result<(), BuildError> {
        let dir = self.config.output_dir.join(subdir);
        fs::create_dir_all(&dir).map_err(|e| BuildError::WriteError(e.to_string()))?;

        fs::write(dir.join(name), bytes).map_err(|e| BuildError::WriteError(e.to_string()))
    }

    fn entry_stem(&self) -> String {
        self.config
            .entry
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("app")
            .to_ascii_lowercase()
    }
}
