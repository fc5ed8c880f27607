//! Error taxonomy for the icon font pipeline
//!
//! Every failure names the stage it happened in, so the message printed
//! at exit is enough to find the offending file or value.

use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A step of the pipeline, used to label errors and log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Configuration,
    CollectIcons,
    GlyphRegistry,
    CodepointMap,
    VectorCompositor,
    BinaryConverter,
    HeaderSerializer,
    PreviewGenerator,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Configuration => "configuration",
            Stage::CollectIcons => "icon collection",
            Stage::GlyphRegistry => "glyph registry",
            Stage::CodepointMap => "codepoint map",
            Stage::VectorCompositor => "vector font compositor",
            Stage::BinaryConverter => "binary font converter",
            Stage::HeaderSerializer => "header serializer",
            Stage::PreviewGenerator => "preview generator",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    /// A required parameter is missing or unusable. Raised before any I/O.
    #[error("{stage}: invalid input: {message}")]
    InvalidInput { stage: Stage, message: String },

    /// Reading or writing a file or directory failed.
    #[error("{stage}: I/O failure on {}: {source}", path.display())]
    Io {
        stage: Stage,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// One of the font converters rejected its input.
    #[error("{stage}: conversion failed{}: {message}", describe_path(path))]
    Conversion {
        stage: Stage,
        path: Option<PathBuf>,
        message: String,
    },
}

fn describe_path(path: &Option<PathBuf>) -> String {
    match path {
        Some(path) => format!(" for {}", path.display()),
        None => String::new(),
    }
}

impl PipelineError {
    pub fn invalid_input(stage: Stage, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            stage,
            message: message.into(),
        }
    }

    pub fn io(stage: Stage, path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            stage,
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn conversion(stage: Stage, path: Option<&Path>, message: impl Into<String>) -> Self {
        Self::Conversion {
            stage,
            path: path.map(Path::to_path_buf),
            message: message.into(),
        }
    }

    /// The stage that produced this error
    pub fn stage(&self) -> Stage {
        match self {
            Self::InvalidInput { stage, .. } => *stage,
            Self::Io { stage, .. } => *stage,
            Self::Conversion { stage, .. } => *stage,
        }
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput { .. })
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_stage_and_path() {
        let err = PipelineError::io(
            Stage::CollectIcons,
            "/missing/svg",
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such directory"),
        );
        let message = err.to_string();
        assert!(message.starts_with("icon collection: I/O failure on /missing/svg"));
        assert!(message.contains("no such directory"));

        let err = PipelineError::conversion(
            Stage::VectorCompositor,
            Some(Path::new("svg/broken.svg")),
            "unexpected end of stream",
        );
        assert_eq!(
            err.to_string(),
            "vector font compositor: conversion failed for svg/broken.svg: unexpected end of stream"
        );
        assert_eq!(err.stage(), Stage::VectorCompositor);
    }

    #[test]
    fn conversion_without_path_omits_it() {
        let err = PipelineError::conversion(Stage::BinaryConverter, None, "fontc exited with 2");
        assert_eq!(
            err.to_string(),
            "binary font converter: conversion failed: fontc exited with 2"
        );
        assert!(!err.is_invalid_input());
    }
}
