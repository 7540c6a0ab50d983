//! Build pipeline for skiff single-page applications.
//!
//! Transforms an entry module plus loose assets (stylesheets, fonts, images)
//! into a static output directory ready for serving, with content-hashed
//! filenames for cache busting and a generated index.html.

pub mod assets;
pub mod hash;
pub mod html;
pub mod pipeline;
pub mod styles;

pub use assets::AssetKind;
pub use pipeline::{BuildEnv, BuildError, BuildResult, Pipeline, PipelineConfig};
