//! Font format stages
//!
//! The compositor merges icon outlines into one SVG font document and the
//! converter compiles that document into a TrueType binary. Both sit
//! behind traits so the pipeline can be driven with other backends.

pub mod compositor;
pub mod converter;
pub mod outline;

pub use compositor::{Composition, SvgFontCompositor, VectorCompositor};
pub use converter::{BinaryConverter, ConvertedFont, FontcConverter};

/// Font-level settings handed to the compositor
#[derive(Debug, Clone, PartialEq)]
pub struct FontMetadata {
    pub font_name: String,
    /// Scale every icon so its canvas height equals `font_height`
    pub normalize: bool,
    /// Units per em, also the ascent + descent span
    pub font_height: f64,
    /// Distance from the baseline to the bottom of the em box
    pub descent: f64,
}

impl FontMetadata {
    pub const DEFAULT_FONT_HEIGHT: f64 = 1000.0;
    pub const DEFAULT_DESCENT: f64 = 200.0;

    pub fn new(font_name: impl Into<String>) -> Self {
        Self {
            font_name: font_name.into(),
            normalize: true,
            font_height: Self::DEFAULT_FONT_HEIGHT,
            descent: Self::DEFAULT_DESCENT,
        }
    }

    pub fn ascent(&self) -> f64 {
        self.font_height - self.descent
    }
}
