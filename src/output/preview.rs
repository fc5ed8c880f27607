//! HTML preview of the generated font
//!
//! Each glyph is rendered through a CSS `content` escape, so the markup
//! itself stays pure ASCII. The font is referenced by file name only;
//! the preview must sit in the same directory as the font.

use crate::core::errors::{PipelineError, PipelineResult, Stage};
use crate::glyphs::Glyph;
use quick_xml::escape::escape;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tokio::fs;

/// CSS class suffix for a glyph: lower-case, `[a-z0-9_-]` only
pub fn css_class(name: &str) -> String {
    name.chars()
        .map(|c| {
            let c = c.to_ascii_lowercase();
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

fn font_file_name(font_path: &Path) -> PipelineResult<(String, String)> {
    let invalid = || {
        PipelineError::invalid_input(
            Stage::PreviewGenerator,
            format!("font path '{}' has no file name", font_path.display()),
        )
    };
    if font_path.as_os_str().is_empty() {
        return Err(invalid());
    }
    let file_name = font_path.file_name().ok_or_else(invalid)?;
    let family = font_path.file_stem().ok_or_else(invalid)?;
    Ok((
        file_name.to_string_lossy().into_owned(),
        family.to_string_lossy().into_owned(),
    ))
}

/// Build the preview document for the font at `font_path`
pub fn generate(font_path: &Path, glyphs: &[Glyph]) -> PipelineResult<String> {
    let (file_name, family) = font_file_name(font_path)?;
    let family = family.replace('\'', "\\'");
    let file_name = file_name.replace('\'', "\\'");

    let mut rules = String::new();
    let mut icons = String::new();
    for glyph in glyphs {
        let class = css_class(&glyph.name);
        let _ = writeln!(
            rules,
            "\t\t\t.icon-{class}::before {{ content: \"{}\"; }}",
            glyph.unicode_escape_hex
        );
        let _ = writeln!(
            icons,
            "\t\t<div class=\"icon icon-{class}\" title=\"{}\"></div>",
            escape(glyph.name.as_str())
        );
    }

    Ok(format!(
        r#"<!DOCTYPE html>
<html lang="en">
	<head>
		<meta charset="UTF-8">
		<meta name="viewport" content="width=device-width, initial-scale=1.0">
		<title>{title} Icon Preview</title>
		<style>
			@font-face {{
				font-family: '{family}';
				src: url('{file_name}') format('truetype');
			}}
			.icon {{
				font-family: '{family}';
				font-size: 100px;
				margin: 10px;
				display: inline-block;
			}}
{rules}		</style>
	</head>
	<body>
		<h1>Icon Examples</h1>
{icons}	</body>
</html>
"#,
        title = escape(family.as_str()),
    ))
}

/// Preview path for a binary font: same location, `.html` extension
pub fn preview_path(font_path: &Path) -> PipelineResult<PathBuf> {
    font_file_name(font_path)?;
    Ok(font_path.with_extension("html"))
}

/// Generate and write the preview, replacing any existing file
pub async fn write_preview(font_path: &Path, glyphs: &[Glyph]) -> PipelineResult<PathBuf> {
    let document = generate(font_path, glyphs)?;
    let path = preview_path(font_path)?;
    fs::write(&path, document)
        .await
        .map_err(|e| PipelineError::io(Stage::PreviewGenerator, &path, e))?;
    tracing::info!("Wrote preview {}", path.display());
    Ok(path)
}

/// Open the preview in the default viewer
///
/// Failure is logged and returned, but the written document is untouched.
pub fn open_preview(path: &Path) -> std::io::Result<()> {
    match open::that(path) {
        Ok(()) => {
            tracing::info!("Opened {} in the default viewer", path.display());
            Ok(())
        }
        Err(e) => {
            tracing::warn!("Could not open {}: {}", path.display(), e);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyphs::{assign, IconSource};

    fn glyphs(names: &[&str]) -> Vec<Glyph> {
        let sources: Vec<_> = names
            .iter()
            .map(|name| IconSource::from_path(format!("svg/{name}.svg")))
            .collect();
        assign(&sources, 0xE000).unwrap()
    }

    #[test]
    fn references_font_by_file_name_only() {
        let html = generate(Path::new("/abs/out/Icons/Icons.ttf"), &[]).unwrap();
        assert!(html.contains("src: url('Icons.ttf') format('truetype');"));
        assert!(html.contains("font-family: 'Icons';"));
        assert!(!html.contains("/abs/out"));
    }

    #[test]
    fn one_rule_and_element_per_glyph() {
        let html = generate(Path::new("Icons.ttf"), &glyphs(&["home", "arrow-left", "x", "y"])).unwrap();
        assert!(html.contains(".icon-home::before { content: \"\\e000\"; }"));
        assert!(html.contains(".icon-arrow-left::before { content: \"\\e001\"; }"));
        assert!(html.contains(".icon-y::before { content: \"\\e003\"; }"));
        assert!(html.contains("<div class=\"icon icon-arrow-left\" title=\"arrow-left\"></div>"));
        assert_eq!(html.matches("<div class=\"icon ").count(), 4);
    }

    #[test]
    fn markup_never_embeds_raw_codepoints() {
        let html = generate(Path::new("Icons.ttf"), &glyphs(&["home"])).unwrap();
        assert!(html.is_ascii());
    }

    #[test]
    fn empty_glyph_list_still_has_font_face() {
        let html = generate(Path::new("Icons.ttf"), &[]).unwrap();
        assert!(html.contains("@font-face"));
        assert!(!html.contains("<div"));
    }

    #[test]
    fn empty_font_path_is_invalid_input() {
        let err = generate(Path::new(""), &[]).unwrap_err();
        assert!(err.is_invalid_input());
        assert_eq!(err.stage(), Stage::PreviewGenerator);
    }

    #[tokio::test]
    async fn unusable_font_path_writes_no_preview() {
        let dir = tempfile::tempdir().unwrap();
        let inner = dir.path().join("inner");
        std::fs::create_dir(&inner).unwrap();

        let err = write_preview(Path::new(""), &glyphs(&["home"])).await.unwrap_err();
        assert!(err.is_invalid_input());
        let err = write_preview(&inner.join(".."), &glyphs(&["home"]))
            .await
            .unwrap_err();
        assert!(err.is_invalid_input());
        assert_eq!(err.stage(), Stage::PreviewGenerator);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
        assert_eq!(std::fs::read_dir(&inner).unwrap().count(), 0);
    }

    #[test]
    fn class_names_are_css_safe() {
        assert_eq!(css_class("Arrow Left"), "arrow-left");
        assert_eq!(css_class("a.b_c"), "a-b_c");
    }

    #[test]
    fn titles_are_escaped() {
        let html = generate(Path::new("Icons.ttf"), &glyphs(&["a<b"])).unwrap();
        assert!(html.contains("title=\"a&lt;b\""));
        assert!(html.contains("icon-a-b"));
    }

    #[tokio::test]
    async fn writes_next_to_font() {
        let dir = tempfile::tempdir().unwrap();
        let font_path = dir.path().join("Icons.ttf");
        let path = write_preview(&font_path, &glyphs(&["home"])).await.unwrap();
        assert_eq!(path, dir.path().join("Icons.html"));
        assert!(std::fs::read_to_string(path).unwrap().contains("icon-home"));
    }
}
