//! Classification of source files into pipeline asset kinds.
//!
//! This is the transformation table of the pipeline: each kind maps a set of
//! source extensions to an output subdirectory and a processing step.

use std::path::Path;

/// What the pipeline does with a source file, decided by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    /// Entry-module sources, compiled (or copied) into `js/`
    Script,

    /// Stylesheets, bundled and either inlined or extracted into `css/`
    Style,

    /// Font files, hashed and copied into `font/`
    Font,

    /// Images, hashed and copied into `img/`
    Image,
}

impl AssetKind {
    /// Classify a path by its extension. Unknown extensions are ignored by
    /// the pipeline.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension().and_then(|e| e.to_str())?;

        match ext.to_ascii_lowercase().as_str() {
            "js" | "elm" => Some(Self::Script),
            "css" => Some(Self::Style),
            "woff" | "woff2" | "ttf" | "eot" => Some(Self::Font),
            "png" | "jpg" | "jpeg" | "gif" | "svg" => Some(Self::Image),
            _ => None,
        }
    }

    /// Output subdirectory for this kind.
    pub fn dest_dir(self) -> &'static str {
        match self {
            Self::Script => "js",
            Self::Style => "css",
            Self::Font => "font",
            Self::Image => "img",
        }
    }
}
