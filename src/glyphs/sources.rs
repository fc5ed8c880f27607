//! Icon source enumeration
//!
//! Walks the icon directory once and produces an ordered list of SVG
//! files. Ordering is by file name so repeated runs over the same
//! directory snapshot see the same sequence on every platform.

use crate::core::errors::{PipelineError, PipelineResult, Stage};
use std::path::{Path, PathBuf};
use tokio::fs;

/// One vector image file that will become a glyph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconSource {
    pub path: PathBuf,
    /// File name without extension, used as the glyph name
    pub base_name: String,
}

impl IconSource {
    /// Build a source from a path, deriving the base name from the file stem
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let base_name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { path, base_name }
    }
}

fn is_svg(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("svg"))
        .unwrap_or(false)
}

/// List every `.svg` file directly inside `dir`, sorted by file name
pub async fn collect_icon_sources(dir: &Path) -> PipelineResult<Vec<IconSource>> {
    if dir.as_os_str().is_empty() {
        return Err(PipelineError::invalid_input(
            Stage::CollectIcons,
            "icon directory path is empty",
        ));
    }

    let mut entries = fs::read_dir(dir)
        .await
        .map_err(|e| PipelineError::io(Stage::CollectIcons, dir, e))?;

    let mut sources = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| PipelineError::io(Stage::CollectIcons, dir, e))?
    {
        let path = entry.path();
        if !is_svg(&path) {
            continue;
        }
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| PipelineError::io(Stage::CollectIcons, &path, e))?;
        if file_type.is_file() {
            sources.push(IconSource::from_path(path));
        }
    }

    sources.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));

    tracing::debug!("Found {} icons in {}", sources.len(), dir.display());
    Ok(sources)
}
