//! Resolving the effective configuration
//!
//! Values come from the command line first, then the settings file, then
//! built-in defaults. Required values that are still missing are asked
//! for interactively, or reported as invalid input.

use crate::core::cli::{parse_codepoint, BuildArgs, HeaderArgs};
use crate::core::config_file::ConfigFile;
use crate::core::errors::{PipelineError, Stage};
use crate::pipeline::PipelineConfig;
use anyhow::Result;
use std::path::PathBuf;

pub const DEFAULT_ICONS_DIR: &str = "svg";
pub const DEFAULT_FONTC_COMMAND: &str = "fontc";

/// Asks for a missing value; `Ok(None)` means nobody can answer
pub type Prompt<'a> = &'a mut dyn FnMut(&str, Option<&str>) -> Result<Option<String>>;

/// Everything `build` needs beyond the pipeline settings
#[derive(Debug, Clone, PartialEq)]
pub struct BuildPlan {
    pub pipeline: PipelineConfig,
    pub fontc_command: PathBuf,
    pub skip_invalid: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeaderPlan {
    pub font: PathBuf,
    pub name: String,
    pub codepoints: Option<PathBuf>,
}

fn missing(what: &str, flag: &str) -> anyhow::Error {
    PipelineError::invalid_input(
        Stage::Configuration,
        format!("{what} is required, pass {flag}"),
    )
    .into()
}

pub fn resolve_build(args: &BuildArgs, file: &ConfigFile, prompt: Prompt) -> Result<BuildPlan> {
    let name = match &args.name {
        Some(name) => name.trim().to_string(),
        None => prompt("Font name", None)?.ok_or_else(|| missing("font name", "--name"))?,
    };

    let icons_dir = args
        .icons
        .clone()
        .or_else(|| file.icons_dir.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_ICONS_DIR));
    let mut config = PipelineConfig::new(name, icons_dir);

    if let Some(root) = args.output_dir.clone().or_else(|| file.output_root.clone()) {
        config.output_root = root;
    }
    config.start_codepoint = match (args.start_codepoint, &file.start_codepoint) {
        (Some(codepoint), _) => codepoint,
        (None, Some(raw)) => parse_codepoint(raw).map_err(|e| {
            PipelineError::invalid_input(Stage::Configuration, format!("settings.json: {e}"))
        })?,
        (None, None) => config.start_codepoint,
    };
    if let Some(height) = file.font_height {
        config.font_height = height;
    }
    if let Some(descent) = file.descent {
        config.descent = descent;
    }
    if let Some(normalize) = file.normalize {
        config.normalize = normalize;
    }
    config.preview = !args.no_preview;
    config.open_preview = config.preview && !args.no_open && file.open_preview.unwrap_or(true);
    config.stable_codepoints = args.stable_codepoints || file.stable_codepoints.unwrap_or(false);

    config.validate()?;

    let fontc_command = args
        .fontc
        .clone()
        .or_else(|| file.fontc_command.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_FONTC_COMMAND));

    Ok(BuildPlan {
        pipeline: config,
        fontc_command,
        skip_invalid: args.skip_invalid,
    })
}

pub fn resolve_header(args: &HeaderArgs, prompt: Prompt) -> Result<HeaderPlan> {
    let font = match &args.font {
        Some(font) => font.clone(),
        None => prompt("Font file", None)?
            .map(PathBuf::from)
            .ok_or_else(|| missing("font file", "--font"))?,
    };
    if !font.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("ttf")) {
        tracing::warn!("{} does not have a .ttf extension", font.display());
    }

    let name = match &args.name {
        Some(name) => name.trim().to_string(),
        None => match font.file_stem() {
            Some(stem) => stem.to_string_lossy().into_owned(),
            None => prompt("Symbol name", None)?.ok_or_else(|| missing("symbol name", "--name"))?,
        },
    };

    Ok(HeaderPlan {
        font,
        name,
        codepoints: args.codepoints.clone(),
    })
}
