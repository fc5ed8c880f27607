//! SVG font to TrueType conversion
//!
//! The SVG font document is rebuilt as a UFO in a scratch directory and
//! compiled with the `fontc` command line tool.

use super::outline::bezpath_to_contours;
use crate::core::errors::{PipelineError, PipelineResult, Stage};
use kurbo::BezPath;
use norad::fontinfo::NonNegativeIntegerOrFloat;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio::fs;
use tokio::process::Command;

/// A compiled binary font
#[derive(Debug, Clone)]
pub struct ConvertedFont {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

/// Converts a vector font document into a binary font
#[allow(async_fn_in_trait)]
pub trait BinaryConverter {
    /// `svg_font` is the document text; `svg_path` is where it was written
    /// and decides the output path (same base name, `.ttf`)
    async fn convert(&self, svg_font: &str, svg_path: &Path) -> PipelineResult<ConvertedFont>;
}

/// Parsed content of an SVG font document
#[derive(Debug, Clone, PartialEq)]
pub struct SvgFont {
    pub family: String,
    pub units_per_em: f64,
    pub ascent: f64,
    pub descent: f64,
    pub glyphs: Vec<SvgFontGlyph>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SvgFontGlyph {
    pub name: String,
    pub unicode: Option<char>,
    pub advance: f64,
    pub path: BezPath,
}

fn attributes(element: &BytesStart) -> Result<Vec<(String, String)>, String> {
    element
        .attributes()
        .map(|attr| {
            let attr = attr.map_err(|e| e.to_string())?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value().map_err(|e| e.to_string())?;
            Ok((key, value.into_owned()))
        })
        .collect()
}

fn parse_number(key: &str, value: &str) -> Result<f64, String> {
    value
        .trim()
        .parse()
        .map_err(|_| format!("attribute {key}=\"{value}\" is not a number"))
}

/// Parse the subset of SVG fonts the compositor writes
pub fn parse_svg_font(text: &str) -> Result<SvgFont, String> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut font = SvgFont {
        family: String::new(),
        units_per_em: 1000.0,
        ascent: 800.0,
        descent: -200.0,
        glyphs: Vec::new(),
    };
    let mut default_advance = 0.0;
    let mut seen_font = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(element)) | Ok(Event::Empty(element)) => {
                match element.name().as_ref() {
                    b"font" => {
                        seen_font = true;
                        for (key, value) in attributes(&element)? {
                            match key.as_str() {
                                "horiz-adv-x" => default_advance = parse_number(&key, &value)?,
                                "id" if font.family.is_empty() => font.family = value,
                                _ => {}
                            }
                        }
                    }
                    b"font-face" => {
                        for (key, value) in attributes(&element)? {
                            match key.as_str() {
                                "font-family" => font.family = value,
                                "units-per-em" => font.units_per_em = parse_number(&key, &value)?,
                                "ascent" => font.ascent = parse_number(&key, &value)?,
                                "descent" => font.descent = parse_number(&key, &value)?,
                                _ => {}
                            }
                        }
                    }
                    b"glyph" => {
                        let mut glyph = SvgFontGlyph {
                            name: String::new(),
                            unicode: None,
                            advance: default_advance,
                            path: BezPath::new(),
                        };
                        for (key, value) in attributes(&element)? {
                            match key.as_str() {
                                "glyph-name" => glyph.name = value,
                                "unicode" => {
                                    let mut chars = value.chars();
                                    glyph.unicode = match (chars.next(), chars.next()) {
                                        (Some(c), None) => Some(c),
                                        (None, _) => None,
                                        _ => {
                                            return Err(format!(
                                                "glyph '{}' maps to a sequence; ligatures are not supported",
                                                glyph.name
                                            ))
                                        }
                                    };
                                }
                                "horiz-adv-x" => glyph.advance = parse_number(&key, &value)?,
                                "d" => {
                                    glyph.path = BezPath::from_svg(&value)
                                        .map_err(|e| format!("bad path data: {e}"))?;
                                }
                                _ => {}
                            }
                        }
                        font.glyphs.push(glyph);
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(format!(
                    "XML error at position {}: {e}",
                    reader.error_position()
                ))
            }
            _ => {}
        }
    }

    if !seen_font {
        return Err("document contains no <font> element".to_string());
    }
    if font.family.is_empty() {
        return Err("font has no family name".to_string());
    }
    Ok(font)
}

/// Production glyph name for a codepoint, e.g. `uniE000`
fn ufo_glyph_name(unicode: Option<char>, index: usize) -> String {
    match unicode.map(u32::from) {
        Some(cp) if cp <= 0xFFFF => format!("uni{cp:04X}"),
        Some(cp) => format!("u{cp:05X}"),
        None => format!("glyph{index:05}"),
    }
}

/// Rebuild a parsed SVG font as a UFO
pub fn build_ufo(svg_font: &SvgFont) -> norad::Font {
    let mut font = norad::Font::new();
    font.font_info.family_name = Some(svg_font.family.clone());
    font.font_info.style_name = Some("Regular".to_string());
    font.font_info.units_per_em = NonNegativeIntegerOrFloat::new(svg_font.units_per_em);
    font.font_info.ascender = Some(svg_font.ascent);
    font.font_info.descender = Some(svg_font.descent);

    let layer = font.default_layer_mut();

    let mut notdef = norad::Glyph::new(".notdef");
    notdef.width = (svg_font.units_per_em / 2.0).round();
    layer.insert_glyph(notdef);

    for (index, source) in svg_font.glyphs.iter().enumerate() {
        let mut glyph = norad::Glyph::new(&ufo_glyph_name(source.unicode, index));
        glyph.width = source.advance;
        if let Some(c) = source.unicode {
            glyph.codepoints.insert(c);
        }
        glyph.contours = bezpath_to_contours(&source.path);
        layer.insert_glyph(glyph);
    }

    font
}

/// Compiles through the `fontc` executable
#[derive(Debug, Clone)]
pub struct FontcConverter {
    command: PathBuf,
}

impl Default for FontcConverter {
    fn default() -> Self {
        Self::new("fontc")
    }
}

impl FontcConverter {
    pub fn new(command: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
        }
    }

    async fn compile_with_fontc(
        &self,
        ufo_path: &Path,
        output_path: &Path,
        work_dir: &Path,
    ) -> PipelineResult<()> {
        let mut cmd = Command::new(&self.command);
        // fontc puts its build directory under the working directory
        cmd.current_dir(work_dir)
            .arg(ufo_path)
            .arg("-o")
            .arg(output_path);

        tracing::debug!("Running {:?}", cmd.as_std());
        let output = cmd.output().await.map_err(|e| {
            let hint = if e.kind() == std::io::ErrorKind::NotFound {
                " (install it with `cargo install fontc` or set fontc_command)"
            } else {
                ""
            };
            PipelineError::conversion(
                Stage::BinaryConverter,
                None,
                format!("could not run {}: {e}{hint}", self.command.display()),
            )
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PipelineError::conversion(
                Stage::BinaryConverter,
                Some(ufo_path),
                format!("fontc failed with {}: {}", output.status, stderr.trim()),
            ));
        }
        Ok(())
    }
}

impl BinaryConverter for FontcConverter {
    async fn convert(&self, svg_font: &str, svg_path: &Path) -> PipelineResult<ConvertedFont> {
        if svg_path.file_stem().is_none() {
            return Err(PipelineError::invalid_input(
                Stage::BinaryConverter,
                "vector font path has no file name",
            ));
        }
        let parsed = parse_svg_font(svg_font)
            .map_err(|e| PipelineError::conversion(Stage::BinaryConverter, Some(svg_path), e))?;

        let font_path = svg_path.with_extension("ttf");
        let font_path_abs = std::path::absolute(&font_path)
            .map_err(|e| PipelineError::io(Stage::BinaryConverter, &font_path, e))?;

        let scratch = TempDir::new()
            .map_err(|e| PipelineError::io(Stage::BinaryConverter, std::env::temp_dir(), e))?;
        let ufo_path = scratch.path().join("font.ufo");
        build_ufo(&parsed).save(&ufo_path).map_err(|e| {
            PipelineError::conversion(Stage::BinaryConverter, Some(&ufo_path), e.to_string())
        })?;
        tracing::debug!(
            "Wrote intermediate UFO with {} glyphs to {}",
            parsed.glyphs.len(),
            ufo_path.display()
        );

        self.compile_with_fontc(&ufo_path, &font_path_abs, scratch.path())
            .await?;

        let bytes = fs::read(&font_path)
            .await
            .map_err(|e| PipelineError::io(Stage::BinaryConverter, &font_path, e))?;
        tracing::info!("Compiled {} ({} bytes)", font_path.display(), bytes.len());

        Ok(ConvertedFont {
            path: font_path,
            bytes,
        })
    }
}
