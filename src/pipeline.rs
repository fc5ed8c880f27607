//! Pipeline orchestration
//!
//! Runs collect -> assign -> compose -> convert -> header -> preview in
//! order. Each stage finishes before the next starts, and the first
//! failure stops the run. Files written by earlier stages are left on
//! disk.

use crate::core::errors::{PipelineError, PipelineResult, Stage};
use crate::font::{
    BinaryConverter, FontMetadata, FontcConverter, SvgFontCompositor, VectorCompositor,
};
use crate::glyphs::{self, CodepointMap, Glyph, DEFAULT_START_CODEPOINT};
use crate::output;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Everything the pipeline needs, resolved up front
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Font family, output directory name and (sanitized) header symbol
    pub font_name: String,
    pub icons_dir: PathBuf,
    /// Artifacts go to `<output_root>/<font_name>/`
    pub output_root: PathBuf,
    pub start_codepoint: u32,
    pub normalize: bool,
    pub font_height: f64,
    pub descent: f64,
    pub preview: bool,
    pub open_preview: bool,
    /// Reuse and update `<font_name>.codepoints.json`
    pub stable_codepoints: bool,
}

impl PipelineConfig {
    pub fn new(font_name: impl Into<String>, icons_dir: impl Into<PathBuf>) -> Self {
        Self {
            font_name: font_name.into(),
            icons_dir: icons_dir.into(),
            output_root: PathBuf::from("."),
            start_codepoint: DEFAULT_START_CODEPOINT,
            normalize: true,
            font_height: FontMetadata::DEFAULT_FONT_HEIGHT,
            descent: FontMetadata::DEFAULT_DESCENT,
            preview: true,
            open_preview: true,
            stable_codepoints: false,
        }
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output_root.join(&self.font_name)
    }

    /// Identifier used for the header's byte array
    pub fn symbol_name(&self) -> String {
        glyphs::sanitize_identifier(&self.font_name)
    }

    pub fn metadata(&self) -> FontMetadata {
        FontMetadata {
            font_name: self.font_name.clone(),
            normalize: self.normalize,
            font_height: self.font_height,
            descent: self.descent,
        }
    }

    /// Check required values before any I/O happens
    pub fn validate(&self) -> PipelineResult<()> {
        validate_font_name(&self.font_name)?;
        if self.icons_dir.as_os_str().is_empty() {
            return Err(PipelineError::invalid_input(
                Stage::Configuration,
                "icon directory is required",
            ));
        }
        if !glyphs::is_private_use(self.start_codepoint) {
            return Err(PipelineError::invalid_input(
                Stage::Configuration,
                format!(
                    "start codepoint U+{:04X} is not in a private use area",
                    self.start_codepoint
                ),
            ));
        }
        let em_box_ok =
            self.font_height > 0.0 && self.descent >= 0.0 && self.descent < self.font_height;
        if !em_box_ok {
            return Err(PipelineError::invalid_input(
                Stage::Configuration,
                format!(
                    "font height {} and descent {} do not form a valid em box",
                    self.font_height, self.descent
                ),
            ));
        }
        Ok(())
    }
}

/// A font name must be usable as a file name and as an identifier
pub fn validate_font_name(name: &str) -> PipelineResult<()> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(PipelineError::invalid_input(
            Stage::Configuration,
            "font name is required",
        ));
    }
    if trimmed != name || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(PipelineError::invalid_input(
            Stage::Configuration,
            format!("font name '{name}' cannot be used as a file name"),
        ));
    }
    Ok(())
}

/// Paths of everything a build produced
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub svg_font: PathBuf,
    pub font: PathBuf,
    pub header: PathBuf,
    pub preview: Option<PathBuf>,
    pub codepoint_map: Option<PathBuf>,
    pub glyphs: Vec<Glyph>,
}

impl BuildReport {
    /// `(label, path)` for every artifact, in the order they were written
    pub fn artifacts(&self) -> Vec<(&'static str, &Path)> {
        let mut artifacts = vec![
            ("SVG font", self.svg_font.as_path()),
            ("Font", self.font.as_path()),
            ("Header", self.header.as_path()),
        ];
        if let Some(preview) = &self.preview {
            artifacts.push(("Preview", preview.as_path()));
        }
        if let Some(map) = &self.codepoint_map {
            artifacts.push(("Codepoint map", map.as_path()));
        }
        artifacts
    }
}

pub struct Pipeline<C, B> {
    config: PipelineConfig,
    compositor: C,
    converter: B,
}

impl Pipeline<SvgFontCompositor, FontcConverter> {
    /// The standard pipeline: SVG font composition and `fontc` compilation
    pub fn standard(config: PipelineConfig, fontc_command: PathBuf, skip_invalid: bool) -> Self {
        Self::new(
            config,
            SvgFontCompositor::new(skip_invalid),
            FontcConverter::new(fontc_command),
        )
    }
}

impl<C: VectorCompositor, B: BinaryConverter> Pipeline<C, B> {
    pub fn new(config: PipelineConfig, compositor: C, converter: B) -> Self {
        Self {
            config,
            compositor,
            converter,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every stage from icon collection to preview
    pub async fn run_build(&self) -> PipelineResult<BuildReport> {
        let config = &self.config;
        config.validate()?;
        let output_dir = config.output_dir();
        let symbol = config.symbol_name();

        let sources = glyphs::collect_icon_sources(&config.icons_dir).await?;
        if sources.is_empty() {
            tracing::warn!(
                "No SVG icons found in {}, the font will contain no icons",
                config.icons_dir.display()
            );
        }
        tracing::info!("Loaded {} icons", sources.len());

        let map_path = CodepointMap::path_for(&output_dir, &config.font_name);
        let mut codepoint_map = None;
        let assigned = if config.stable_codepoints {
            let map = CodepointMap::load_or_default(&map_path).await?;
            tracing::debug!("Loaded {} recorded codepoints", map.len());
            let assigned = glyphs::assign_stable(&sources, config.start_codepoint, &map)?;
            codepoint_map = Some(map);
            assigned
        } else {
            glyphs::assign(&sources, config.start_codepoint)?
        };

        let svg_path = output_dir.join(format!("{}.svg", config.font_name));
        let composition = self
            .compositor
            .compose(&config.metadata(), &assigned, &svg_path)
            .await?;
        tracing::info!("SVG font: {}", composition.path.display());

        let svg_text = fs::read_to_string(&composition.path)
            .await
            .map_err(|e| PipelineError::io(Stage::BinaryConverter, &composition.path, e))?;
        let converted = self.converter.convert(&svg_text, &composition.path).await?;
        tracing::info!("Font: {}", converted.path.display());

        let header = output::write_header(
            &symbol,
            &converted.path,
            &converted.bytes,
            &composition.glyphs,
        )
        .await?;
        tracing::info!("Header: {}", header.display());

        let preview = if config.preview {
            let path = output::write_preview(&converted.path, &composition.glyphs).await?;
            tracing::info!("Preview: {}", path.display());
            if config.open_preview {
                // The preview is already on disk, a viewer failure changes nothing
                let _ = output::open_preview(&path);
            }
            Some(path)
        } else {
            None
        };

        let codepoint_map = match codepoint_map {
            Some(mut map) => {
                map.merge(&composition.glyphs);
                map.save(&map_path).await?;
                tracing::info!("Codepoint map: {}", map_path.display());
                Some(map_path)
            }
            None => None,
        };

        Ok(BuildReport {
            svg_font: composition.path,
            font: converted.path,
            header,
            preview,
            codepoint_map,
            glyphs: composition.glyphs,
        })
    }
}

/// Header-only flow: embed an existing binary font
///
/// Glyph constants come from `codepoints` when given; otherwise the header
/// holds only the byte array.
pub async fn run_header_only(
    font_path: &Path,
    font_name: &str,
    codepoints: Option<&Path>,
) -> PipelineResult<PathBuf> {
    if font_path.as_os_str().is_empty() {
        return Err(PipelineError::invalid_input(
            Stage::Configuration,
            "font path is required",
        ));
    }
    validate_font_name(font_name)?;
    let symbol = glyphs::sanitize_identifier(font_name);

    let glyphs = match codepoints {
        Some(path) => {
            let map = CodepointMap::load_or_default(path).await?;
            if map.is_empty() {
                tracing::warn!("Codepoint map {} has no entries", path.display());
            }
            map.to_glyphs()?
        }
        None => Vec::new(),
    };

    let bytes = fs::read(font_path)
        .await
        .map_err(|e| PipelineError::io(Stage::HeaderSerializer, font_path, e))?;
    let header = output::write_header(&symbol, font_path, &bytes, &glyphs).await?;
    tracing::info!("Header: {}", header.display());
    Ok(header)
}
