//! Icon collection and codepoint assignment
//!
//! Turns a directory of icon files into an ordered list of [`Glyph`]s,
//! each with a private use codepoint and the textual forms the header
//! and preview generators need.

pub mod codepoint_map;
pub mod registry;
pub mod sources;

pub use codepoint_map::CodepointMap;
pub use registry::{
    assign, assign_stable, ensure_unique_constants, is_private_use, sanitize_identifier, Glyph,
    DEFAULT_START_CODEPOINT,
};
pub use sources::{collect_icon_sources, IconSource};
