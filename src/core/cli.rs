//! Command line interface for iconpress
//!
//! Parses the `build`, `header` and `init-config` subcommands and checks
//! the arguments that can be checked without touching the filesystem.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// iconpress CLI arguments
///
/// Examples:
///   iconpress build --name Icons                  # ./svg -> ./Icons/Icons.{svg,ttf,h,html}
///   iconpress build --name Icons --icons assets   # Read icons from ./assets
///   iconpress build --start-codepoint F000        # Start numbering at U+F000
///   iconpress header --font Icons.ttf             # Only write Icons.h
///   iconpress init-config                         # Create ~/.config/iconpress
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "iconpress",
    version,
    about = "Build an icon font and an embeddable C++ header from a directory of SVG icons",
    long_about = "iconpress assigns private use codepoints to a directory of SVG icons, composes them into an SVG font, compiles that into a TrueType font with fontc, and writes a C++ header embedding the font bytes plus an HTML preview."
)]
pub struct CliArgs {
    #[clap(subcommand)]
    pub command: Command,

    /// Log at debug level unless RUST_LOG says otherwise
    #[clap(long, short = 'v', global = true, help = "Enable debug logging")]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the full pipeline from SVG icons to header and preview
    Build(BuildArgs),
    /// Embed an existing TrueType font in a header
    Header(HeaderArgs),
    /// Create the settings file and logs directory
    InitConfig,
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Font name, also used for the output directory and header symbol
    ///
    /// Prompted for when missing and stdin is a terminal.
    #[clap(long, short = 'n', help = "Font name")]
    pub name: Option<String>,

    #[clap(
        long,
        short = 'i',
        help = "Directory of SVG icons",
        long_help = "Directory containing the SVG icons. Only files directly inside it with a .svg extension are used. Defaults to ./svg"
    )]
    pub icons: Option<PathBuf>,

    #[clap(
        long = "output-dir",
        short = 'o',
        help = "Root directory for generated files",
        long_help = "Root directory for generated files. Artifacts are written to <output-dir>/<name>/. Defaults to the current directory"
    )]
    pub output_dir: Option<PathBuf>,

    #[clap(
        long = "start-codepoint",
        value_parser = parse_codepoint,
        help = "First codepoint to assign (E000, 0xE000 or decimal)"
    )]
    pub start_codepoint: Option<u32>,

    #[clap(long = "no-preview", help = "Do not write the HTML preview")]
    pub no_preview: bool,

    #[clap(long = "no-open", help = "Do not open the preview after building")]
    pub no_open: bool,

    /// Leave out icons that cannot be parsed instead of failing the build
    #[clap(long = "skip-invalid", help = "Skip icons that fail to parse")]
    pub skip_invalid: bool,

    #[clap(
        long = "stable-codepoints",
        help = "Keep codepoints from the previous build",
        long_help = "Read <name>.codepoints.json from the output directory, keep every recorded codepoint, number new icons after the highest one, and write the updated map back"
    )]
    pub stable_codepoints: bool,

    #[clap(long, help = "Path to the fontc executable")]
    pub fontc: Option<PathBuf>,
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct HeaderArgs {
    /// TrueType font to embed; the header is written beside it
    #[clap(long, short = 'f', help = "Font file to embed")]
    pub font: Option<PathBuf>,

    /// Symbol name for the byte array, defaults to the font's file stem
    #[clap(long, short = 'n', help = "Header symbol name")]
    pub name: Option<String>,

    #[clap(
        long,
        help = "Codepoint map to emit glyph constants from",
        long_help = "A <name>.codepoints.json file written by `build --stable-codepoints`. Without it the header holds only the font bytes"
    )]
    pub codepoints: Option<PathBuf>,
}

impl CliArgs {
    /// Validate the CLI arguments after parsing
    pub fn validate(&self) -> Result<(), String> {
        match &self.command {
            Command::Build(args) => {
                if let Some(name) = &args.name {
                    if name.trim().is_empty() {
                        return Err("Font name cannot be empty".to_string());
                    }
                }
                if let Some(icons) = &args.icons {
                    if icons.exists() && !icons.is_dir() {
                        return Err(format!(
                            "Icon path is not a directory: {}\nPass the directory containing the SVG files.",
                            icons.display()
                        ));
                    }
                }
            }
            Command::Header(_) | Command::InitConfig => {}
        }
        Ok(())
    }
}

/// Parse a codepoint given as `E000`, `0xE000`, `U+E000` or a decimal number
///
/// Bare digits are read as decimal; anything containing a hex letter or a
/// prefix is read as hex.
pub fn parse_codepoint(raw: &str) -> Result<u32, String> {
    let raw = raw.trim();
    let hex = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .or_else(|| raw.strip_prefix("U+"))
        .or_else(|| raw.strip_prefix("u+"));
    let parsed = match hex {
        Some(digits) => u32::from_str_radix(digits, 16),
        None if raw.chars().all(|c| c.is_ascii_digit()) => raw.parse(),
        None => u32::from_str_radix(raw, 16),
    };
    parsed.map_err(|_| format!("'{raw}' is not a codepoint"))
}
