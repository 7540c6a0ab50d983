//! Configuration file handling (skiff.toml).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Deserialize;

use skiff_bridge::WidgetConfig;
use skiff_pipeline::{BuildEnv, PipelineConfig};

/// Configuration file structure (skiff.toml).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub build: BuildSettings,
    pub auth: Option<AuthSettings>,
}

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_entry")]
    pub entry: String,
    #[serde(default = "default_assets")]
    pub assets: String,
    #[serde(default = "default_output")]
    pub output: String,
    #[serde(default = "default_title")]
    pub title: String,
    /// External compiler command with {entry}/{output} placeholders
    #[serde(default)]
    pub compiler: Vec<String>,
    /// Extra compiler arguments for production builds
    #[serde(default)]
    pub release_args: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct BuildSettings {
    #[serde(default = "default_minify")]
    pub minify: bool,
}

#[derive(Debug, Deserialize)]
pub struct AuthSettings {
    pub client_id: String,
    pub domain: String,
}

fn default_entry() -> String {
    "web/main.js".to_string()
}
fn default_assets() -> String {
    "web/assets".to_string()
}
fn default_output() -> String {
    "dist".to_string()
}
fn default_title() -> String {
    "Application".to_string()
}
fn default_minify() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            entry: default_entry(),
            assets: default_assets(),
            output: default_output(),
            title: default_title(),
            compiler: vec![],
            release_args: vec![],
        }
    }
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            minify: default_minify(),
        }
    }
}

/// Load configuration from skiff.toml if it exists.
/// Returns an error if the config file exists but is malformed.
pub fn load_config(path: &Path) -> Result<ConfigFile> {
    if path.exists() {
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
        let config: ConfigFile = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path.display(), e))?;
        tracing::info!("Loaded config from {}", path.display());
        return Ok(config);
    }
    Ok(ConfigFile::default())
}

impl ConfigFile {
    /// Assemble the pipeline configuration for a build in the given
    /// environment.
    pub fn pipeline_config(
        &self,
        env: BuildEnv,
        output: Option<PathBuf>,
        minify: Option<bool>,
    ) -> PipelineConfig {
        PipelineConfig {
            entry: PathBuf::from(&self.app.entry),
            assets_dir: PathBuf::from(&self.app.assets),
            output_dir: output.unwrap_or_else(|| PathBuf::from(&self.app.output)),
            env,
            minify: minify.unwrap_or(self.build.minify),
            title: self.app.title.clone(),
            compiler: self.app.compiler.clone(),
            release_args: self.app.release_args.clone(),
            auth: self.auth.as_ref().map(|a| WidgetConfig {
                client_id: a.client_id.clone(),
                domain: a.domain.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let config = load_config(Path::new("/nonexistent/skiff.toml")).unwrap();

        assert_eq!(config.app.entry, "web/main.js");
        assert_eq!(config.app.output, "dist");
        assert!(config.build.minify);
        assert!(config.auth.is_none());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("skiff.toml");
        std::fs::write(&path, "[app\nentry = ").unwrap();

        assert!(load_config(&path).is_err());
    }

    #[test]
    fn parses_full_config() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("skiff.toml");
        std::fs::write(
            &path,
            r#"
[app]
entry = "web/Main.elm"
assets = "web/static"
output = "public"
title = "My App"
compiler = ["elm", "make", "{entry}", "--output", "{output}"]
release_args = ["--optimize"]

[build]
minify = false

[auth]
client_id = "client-abc"
domain = "tenant.auth.example.com"
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        let pipeline = config.pipeline_config(BuildEnv::Production, None, None);

        assert_eq!(pipeline.entry, PathBuf::from("web/Main.elm"));
        assert_eq!(pipeline.output_dir, PathBuf::from("public"));
        assert_eq!(pipeline.compiler[0], "elm");
        assert_eq!(pipeline.release_args, vec!["--optimize".to_string()]);
        assert!(!pipeline.minify);
        assert_eq!(pipeline.auth.unwrap().client_id, "client-abc");
    }

    #[test]
    fn overrides_take_precedence() {
        let config = ConfigFile::default();
        let pipeline = config.pipeline_config(
            BuildEnv::Production,
            Some(PathBuf::from("out")),
            Some(false),
        );

        assert_eq!(pipeline.output_dir, PathBuf::from("out"));
        assert!(!pipeline.minify);
    }
}
