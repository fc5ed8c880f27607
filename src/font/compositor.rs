//! SVG font composition
//!
//! Icons are read and converted one at a time and appended to the output
//! document as they are processed, so only one icon's outline is held in
//! memory at once.

use super::outline::{icon_outline, IconOutline};
use super::FontMetadata;
use crate::core::errors::{PipelineError, PipelineResult, Stage};
use crate::glyphs::Glyph;
use quick_xml::escape::escape;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncWriteExt, BufWriter};

/// Result of a successful composition
#[derive(Debug, Clone)]
pub struct Composition {
    /// Where the vector font document was written
    pub path: PathBuf,
    /// Glyphs present in the document, in input order
    pub glyphs: Vec<Glyph>,
}

/// Merges per-icon outlines into a single vector font document
#[allow(async_fn_in_trait)]
pub trait VectorCompositor {
    async fn compose(
        &self,
        meta: &FontMetadata,
        glyphs: &[Glyph],
        output: &Path,
    ) -> PipelineResult<Composition>;
}

/// Writes an SVG 1.1 font document from icon SVG files
#[derive(Debug, Clone, Default)]
pub struct SvgFontCompositor {
    /// Skip icons that fail to parse instead of aborting
    pub skip_invalid: bool,
}

impl SvgFontCompositor {
    pub fn new(skip_invalid: bool) -> Self {
        Self { skip_invalid }
    }

    async fn load_outline(
        &self,
        glyph: &Glyph,
        meta: &FontMetadata,
    ) -> PipelineResult<IconOutline> {
        let path = &glyph.source.path;
        let data = fs::read(path)
            .await
            .map_err(|e| PipelineError::io(Stage::VectorCompositor, path, e))?;
        icon_outline(&data, meta).map_err(|e| {
            PipelineError::conversion(Stage::VectorCompositor, Some(path), e.to_string())
        })
    }
}

impl VectorCompositor for SvgFontCompositor {
    async fn compose(
        &self,
        meta: &FontMetadata,
        glyphs: &[Glyph],
        output: &Path,
    ) -> PipelineResult<Composition> {
        if meta.font_name.is_empty() {
            return Err(PipelineError::invalid_input(
                Stage::VectorCompositor,
                "font name is empty",
            ));
        }
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| PipelineError::io(Stage::VectorCompositor, parent, e))?;
        }

        let file = fs::File::create(output)
            .await
            .map_err(|e| PipelineError::io(Stage::VectorCompositor, output, e))?;
        let mut writer = BufWriter::new(file);
        let write_err = |e: std::io::Error| PipelineError::io(Stage::VectorCompositor, output, e);

        writer
            .write_all(document_header(meta).as_bytes())
            .await
            .map_err(write_err)?;

        let mut composed = Vec::with_capacity(glyphs.len());
        for glyph in glyphs {
            let outline = match self.load_outline(glyph, meta).await {
                Ok(outline) => outline,
                Err(e) if self.skip_invalid => {
                    tracing::warn!("Skipping icon '{}': {}", glyph.name, e);
                    continue;
                }
                Err(e) => return Err(e),
            };
            if outline.is_empty() {
                tracing::warn!(
                    "Icon '{}' has no filled geometry, its glyph will be blank",
                    glyph.name
                );
            }
            writer
                .write_all(glyph_element(glyph, &outline).as_bytes())
                .await
                .map_err(write_err)?;
            composed.push(glyph.clone());
        }

        writer
            .write_all(DOCUMENT_FOOTER.as_bytes())
            .await
            .map_err(write_err)?;
        writer.flush().await.map_err(write_err)?;

        tracing::info!(
            "Composed {} of {} glyphs into {}",
            composed.len(),
            glyphs.len(),
            output.display()
        );
        Ok(Composition {
            path: output.to_path_buf(),
            glyphs: composed,
        })
    }
}

const DOCUMENT_FOOTER: &str = "  </font>\n</defs>\n</svg>\n";

/// Everything before the first `<glyph>` element
pub fn document_header(meta: &FontMetadata) -> String {
    let name = escape(meta.font_name.as_str());
    format!(
        r#"<?xml version="1.0" standalone="no"?>
<!DOCTYPE svg PUBLIC "-//W3C//DTD SVG 1.1//EN" "http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd" >
<svg xmlns="http://www.w3.org/2000/svg">
<defs>
  <font id="{name}" horiz-adv-x="{height}">
    <font-face font-family="{name}"
      units-per-em="{height}" ascent="{ascent}"
      descent="{descent}" />
    <missing-glyph horiz-adv-x="0" />
"#,
        height = meta.font_height,
        ascent = meta.ascent(),
        descent = -meta.descent,
    )
}

/// One `<glyph>` element for an outline already in font units
pub fn glyph_element(glyph: &Glyph, outline: &IconOutline) -> String {
    let mut element = format!(
        "    <glyph glyph-name=\"{}\"\n      unicode=\"&#x{:X};\"\n      horiz-adv-x=\"{}\"",
        escape(glyph.name.as_str()),
        glyph.codepoint,
        outline.advance,
    );
    if !outline.is_empty() {
        element.push_str(&format!(" d=\"{}\"", outline.path.to_svg()));
    }
    element.push_str(" />\n");
    element
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyphs::{assign, IconSource};

    const CIRCLE: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="24" height="24">
        <circle cx="12" cy="12" r="10" fill="black"/>
    </svg>"#;

    fn write_icons(dir: &Path, icons: &[(&str, &str)]) -> Vec<IconSource> {
        icons
            .iter()
            .map(|(name, body)| {
                let path = dir.join(format!("{name}.svg"));
                std::fs::write(&path, body).unwrap();
                IconSource::from_path(path)
            })
            .collect()
    }

    #[tokio::test]
    async fn composes_one_glyph_element_per_icon() {
        let dir = tempfile::tempdir().unwrap();
        let sources = write_icons(dir.path(), &[("home", CIRCLE), ("user", CIRCLE)]);
        let glyphs = assign(&sources, 0xE000).unwrap();
        let output = dir.path().join("Icons").join("Icons.svg");

        let composition = SvgFontCompositor::default()
            .compose(&FontMetadata::new("Icons"), &glyphs, &output)
            .await
            .unwrap();

        assert_eq!(composition.glyphs, glyphs);
        let document = std::fs::read_to_string(&output).unwrap();
        assert!(document.contains(r#"<font-face font-family="Icons""#));
        assert!(document.contains(r#"glyph-name="home""#));
        assert!(document.contains("unicode=\"&#xE001;\""));
        assert_eq!(document.matches("<glyph ").count(), 2);
        assert!(document.ends_with("</svg>\n"));
    }

    #[tokio::test]
    async fn invalid_icon_fails_fast_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let sources = write_icons(dir.path(), &[("broken", "<svg"), ("home", CIRCLE)]);
        let glyphs = assign(&sources, 0xE000).unwrap();

        let err = SvgFontCompositor::default()
            .compose(&FontMetadata::new("Icons"), &glyphs, &dir.path().join("out.svg"))
            .await
            .unwrap_err();
        match err {
            PipelineError::Conversion { stage, path, .. } => {
                assert_eq!(stage, Stage::VectorCompositor);
                assert_eq!(path.unwrap(), dir.path().join("broken.svg"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn skip_policy_omits_invalid_icons() {
        let dir = tempfile::tempdir().unwrap();
        let sources = write_icons(dir.path(), &[("broken", "<svg"), ("home", CIRCLE)]);
        let glyphs = assign(&sources, 0xE000).unwrap();

        let composition = SvgFontCompositor::new(true)
            .compose(&FontMetadata::new("Icons"), &glyphs, &dir.path().join("out.svg"))
            .await
            .unwrap();
        assert_eq!(composition.glyphs.len(), 1);
        assert_eq!(composition.glyphs[0].name, "home");
        assert_eq!(composition.glyphs[0].codepoint, 0xE001);
    }

    #[test]
    fn glyph_names_are_xml_escaped() {
        let glyphs = assign(&[IconSource::from_path("svg/a&b.svg")], 0xE000).unwrap();
        let outline = IconOutline {
            path: kurbo::BezPath::new(),
            advance: 500.0,
        };
        let element = glyph_element(&glyphs[0], &outline);
        assert!(element.contains(r#"glyph-name="a&amp;b""#));
        assert!(!element.contains(" d="));
    }
}
