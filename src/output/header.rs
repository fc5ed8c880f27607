//! C++ header generation
//!
//! The header embeds the compiled font as a sized `unsigned char` array
//! and declares one `constexpr char ICON_<NAME>[]` per glyph holding the
//! glyph's UTF-8 bytes as `\xHH` escapes.

use crate::core::errors::{PipelineError, PipelineResult, Stage};
use crate::glyphs::Glyph;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Escape a glyph's UTF-8 encoding as `\xHH` sequences with no separators
pub fn utf8_escape(glyph: &Glyph) -> String {
    glyph
        .utf8_bytes()
        .iter()
        .fold(String::new(), |mut out, byte| {
            let _ = write!(out, "\\x{byte:02x}");
            out
        })
}

/// Render the header text
///
/// `name` must already be a valid identifier; it is upper-cased here and
/// nothing else. Glyph constants come first, in `glyphs` order, followed
/// by the byte array.
pub fn serialize(name: &str, font_bytes: &[u8], glyphs: &[Glyph]) -> String {
    let mut header = String::from("#pragma once\n\nnamespace font\n{");

    if !glyphs.is_empty() {
        header.push('\n');
        for glyph in glyphs {
            let _ = writeln!(
                header,
                "\tconstexpr char {}[] = \"{}\";",
                glyph.constant_name(),
                utf8_escape(glyph)
            );
        }
    }

    let bytes = font_bytes
        .iter()
        .map(|byte| format!("0x{byte:02x}"))
        .collect::<Vec<_>>()
        .join(", ");
    let _ = write!(
        header,
        "\n\tunsigned char {}[{}] = {{ \n\t\t{}\n\t}};\n}}",
        name.to_uppercase(),
        font_bytes.len(),
        bytes
    );
    header
}

/// Header path for a binary font: same location, `.h` extension
pub fn header_path(font_path: &Path) -> PipelineResult<PathBuf> {
    if font_path.as_os_str().is_empty() || font_path.file_stem().is_none() {
        return Err(PipelineError::invalid_input(
            Stage::HeaderSerializer,
            format!("cannot derive a header path from '{}'", font_path.display()),
        ));
    }
    Ok(font_path.with_extension("h"))
}

/// Serialize and write the header next to `font_path`, replacing any existing file
pub async fn write_header(
    name: &str,
    font_path: &Path,
    font_bytes: &[u8],
    glyphs: &[Glyph],
) -> PipelineResult<PathBuf> {
    let path = header_path(font_path)?;
    if name.is_empty() {
        return Err(PipelineError::invalid_input(
            Stage::HeaderSerializer,
            "symbol name is empty",
        ));
    }

    if glyphs.is_empty() {
        tracing::info!("No glyphs provided, writing header without icon constants");
    }
    let header = serialize(name, font_bytes, glyphs);
    fs::write(&path, header)
        .await
        .map_err(|e| PipelineError::io(Stage::HeaderSerializer, &path, e))?;

    tracing::info!(
        "Wrote header {} ({} font bytes, {} glyphs)",
        path.display(),
        font_bytes.len(),
        glyphs.len()
    );
    Ok(path)
}
