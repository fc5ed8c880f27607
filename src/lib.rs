//! Iconpress
pub mod core;
pub mod font;
pub mod glyphs;
pub mod logging;
pub mod output;
pub mod pipeline;
