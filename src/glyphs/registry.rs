//! Codepoint assignment
//!
//! Glyph `i` in the input order receives `start + i`. Nothing is carried
//! between runs, so adding or removing an icon shifts every codepoint
//! after it. Callers that need durable codepoints use
//! [`assign_stable`] with a [`CodepointMap`].

use super::codepoint_map::CodepointMap;
use super::sources::IconSource;
use crate::core::errors::{PipelineError, PipelineResult, Stage};
use std::collections::HashMap;

/// First codepoint of the Basic Multilingual Plane private use area
pub const DEFAULT_START_CODEPOINT: u32 = 0xE000;

const PRIVATE_USE_RANGES: [std::ops::RangeInclusive<u32>; 3] =
    [0xE000..=0xF8FF, 0xF0000..=0xFFFFD, 0x100000..=0x10FFFD];

/// Whether `codepoint` lies inside one of the Unicode private use areas
pub fn is_private_use(codepoint: u32) -> bool {
    PRIVATE_USE_RANGES.iter().any(|range| range.contains(&codepoint))
}

/// One icon's registered identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Glyph {
    pub name: String,
    pub codepoint: u32,
    pub unicode_char: char,
    /// CSS escape form, e.g. `\e000`
    pub unicode_escape_hex: String,
    /// C hex literal form, e.g. `0xE000`
    pub unicode_c_hex: String,
    /// Where the outline is read from; the glyph never holds outline data
    pub source: IconSource,
}

impl Glyph {
    pub fn new(source: IconSource, codepoint: u32) -> PipelineResult<Self> {
        if source.base_name.is_empty() {
            return Err(PipelineError::invalid_input(
                Stage::GlyphRegistry,
                format!("icon {} has no usable base name", source.path.display()),
            ));
        }
        if !is_private_use(codepoint) {
            return Err(PipelineError::invalid_input(
                Stage::GlyphRegistry,
                format!(
                    "codepoint U+{codepoint:04X} for '{}' is outside the private use areas",
                    source.base_name
                ),
            ));
        }
        let unicode_char = char::from_u32(codepoint).ok_or_else(|| {
            PipelineError::invalid_input(
                Stage::GlyphRegistry,
                format!("U+{codepoint:04X} is not a unicode scalar value"),
            )
        })?;

        Ok(Self {
            name: source.base_name.clone(),
            codepoint,
            unicode_char,
            unicode_escape_hex: format!("\\{codepoint:04x}"),
            unicode_c_hex: format!("0x{codepoint:X}"),
            source,
        })
    }

    /// Name of the generated header constant, e.g. `ICON_ARROW_LEFT`
    ///
    /// The `ICON_` prefix already starts with a letter, so a leading digit
    /// in the name is kept as is: `3d-cube` gives `ICON_3D_CUBE`.
    pub fn constant_name(&self) -> String {
        format!("ICON_{}", identifier_body(&self.name))
    }

    /// The glyph's UTF-8 encoding
    pub fn utf8_bytes(&self) -> Vec<u8> {
        let mut buf = [0u8; 4];
        self.unicode_char.encode_utf8(&mut buf).as_bytes().to_vec()
    }
}

/// Upper-case ASCII letters and digits, `_` for everything else
fn identifier_body(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Map a raw name onto a standalone C identifier, upper-cased
///
/// ASCII letters and digits are kept, everything else becomes `_`. A
/// leading digit gets a `_` prefix.
pub fn sanitize_identifier(raw: &str) -> String {
    let mut ident = identifier_body(raw);
    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    ident
}

/// Assign `start, start + 1, ...` to `sources` in order
pub fn assign(sources: &[IconSource], start: u32) -> PipelineResult<Vec<Glyph>> {
    let mut glyphs = Vec::with_capacity(sources.len());
    for (index, source) in sources.iter().enumerate() {
        let codepoint = u32::try_from(index)
            .ok()
            .and_then(|offset| start.checked_add(offset))
            .ok_or_else(|| {
                PipelineError::invalid_input(Stage::GlyphRegistry, "codepoint range overflow")
            })?;
        glyphs.push(Glyph::new(source.clone(), codepoint)?);
    }
    ensure_unique_constants(&glyphs)?;
    Ok(glyphs)
}

/// Assign codepoints, reusing the ones recorded in `map`
///
/// Known names keep their codepoint. New names are numbered upward from
/// whichever is higher: `start` or one past the highest recorded value.
pub fn assign_stable(
    sources: &[IconSource],
    start: u32,
    map: &CodepointMap,
) -> PipelineResult<Vec<Glyph>> {
    let mut next = map
        .highest()
        .map(|highest| highest.saturating_add(1).max(start))
        .unwrap_or(start);

    let mut glyphs = Vec::with_capacity(sources.len());
    for source in sources {
        let codepoint = match map.get(&source.base_name) {
            Some(codepoint) => codepoint,
            None => {
                let codepoint = next;
                next = next.checked_add(1).ok_or_else(|| {
                    PipelineError::invalid_input(Stage::GlyphRegistry, "codepoint range overflow")
                })?;
                codepoint
            }
        };
        glyphs.push(Glyph::new(source.clone(), codepoint)?);
    }

    let mut seen: HashMap<u32, &str> = HashMap::new();
    for glyph in &glyphs {
        if let Some(other) = seen.insert(glyph.codepoint, &glyph.name) {
            return Err(PipelineError::invalid_input(
                Stage::GlyphRegistry,
                format!(
                    "'{}' and '{}' both map to U+{:04X}",
                    other, glyph.name, glyph.codepoint
                ),
            ));
        }
    }
    ensure_unique_constants(&glyphs)?;
    Ok(glyphs)
}

/// Reject glyph lists where two names produce the same header constant
pub fn ensure_unique_constants(glyphs: &[Glyph]) -> PipelineResult<()> {
    let mut seen: HashMap<String, &str> = HashMap::new();
    for glyph in glyphs {
        if let Some(other) = seen.insert(glyph.constant_name(), &glyph.name) {
            return Err(PipelineError::invalid_input(
                Stage::GlyphRegistry,
                format!(
                    "icons '{}' and '{}' both produce the constant {}",
                    other,
                    glyph.name,
                    glyph.constant_name()
                ),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sources(names: &[&str]) -> Vec<IconSource> {
        names
            .iter()
            .map(|name| IconSource::from_path(format!("svg/{name}.svg")))
            .collect()
    }

    #[test]
    fn assigns_consecutive_codepoints_in_input_order() {
        let glyphs = assign(&sources(&["home", "user", "gear"]), DEFAULT_START_CODEPOINT).unwrap();
        let codepoints: Vec<_> = glyphs.iter().map(|g| g.codepoint).collect();
        assert_eq!(codepoints, [0xE000, 0xE001, 0xE002]);
        assert_eq!(glyphs[1].name, "user");
    }

    #[test]
    fn assignment_is_deterministic() {
        let input = sources(&["a", "b", "c", "d"]);
        assert_eq!(assign(&input, 0xE010).unwrap(), assign(&input, 0xE010).unwrap());
    }

    #[test]
    fn empty_input_is_not_an_error() {
        assert!(assign(&[], DEFAULT_START_CODEPOINT).unwrap().is_empty());
    }

    #[test]
    fn derived_forms() {
        let glyphs = assign(&sources(&["a", "b", "c", "d"]), 0xE000).unwrap();
        let glyph = &glyphs[3];
        assert_eq!(glyph.codepoint, 0xE003);
        assert_eq!(glyph.unicode_char, '\u{E003}');
        assert_eq!(glyph.unicode_escape_hex, "\\e003");
        assert_eq!(glyph.unicode_c_hex, "0xE003");
        assert_eq!(glyph.utf8_bytes(), [0xee, 0x80, 0x83]);
    }

    #[test]
    fn constant_names_replace_every_hyphen() {
        let glyphs = assign(&sources(&["arrow-left", "chevron-double-up"]), 0xE000).unwrap();
        assert_eq!(glyphs[0].constant_name(), "ICON_ARROW_LEFT");
        assert_eq!(glyphs[1].constant_name(), "ICON_CHEVRON_DOUBLE_UP");
    }

    #[test]
    fn constant_names_keep_a_leading_digit() {
        let glyphs = assign(&sources(&["3d-cube", "0"]), 0xE000).unwrap();
        assert_eq!(glyphs[0].constant_name(), "ICON_3D_CUBE");
        assert_eq!(glyphs[1].constant_name(), "ICON_0");
    }

    #[test]
    fn sanitizer_produces_identifiers() {
        assert_eq!(sanitize_identifier("Icon Font"), "ICON_FONT");
        assert_eq!(sanitize_identifier("my.icons-v2"), "MY_ICONS_V2");
        assert_eq!(sanitize_identifier("3d-cube"), "_3D_CUBE");
        assert_eq!(sanitize_identifier("café"), "CAF_");
        assert_eq!(sanitize_identifier(""), "");
    }

    #[test]
    fn missing_base_name_is_invalid_input() {
        let input = vec![IconSource {
            path: "svg/.svg".into(),
            base_name: String::new(),
        }];
        let err = assign(&input, 0xE000).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn codepoints_must_stay_private_use() {
        let err = assign(&sources(&["a", "b"]), 0xF8FF).unwrap_err();
        assert!(err.is_invalid_input());
        assert!(assign(&sources(&["a"]), 0x41).is_err());
        assert!(assign(&sources(&["a"]), 0xF0000).is_ok());
    }

    #[test]
    fn colliding_constant_names_are_rejected() {
        let err = assign(&sources(&["arrow-left", "arrow_left"]), 0xE000).unwrap_err();
        assert!(err.to_string().contains("ICON_ARROW_LEFT"));
    }

    #[test]
    fn stable_assignment_keeps_known_codepoints() {
        let mut map = CodepointMap::default();
        map.insert("home", 0xE000);
        map.insert("user", 0xE001);

        // "gear" is new and sorts first; "home" and "user" must not move
        let glyphs = assign_stable(&sources(&["gear", "home", "user"]), 0xE000, &map).unwrap();
        let pairs: Vec<_> = glyphs.iter().map(|g| (g.name.as_str(), g.codepoint)).collect();
        assert_eq!(pairs, [("gear", 0xE002), ("home", 0xE000), ("user", 0xE001)]);
    }

    #[test]
    fn stable_assignment_with_empty_map_matches_fresh_assignment() {
        let input = sources(&["home", "user"]);
        assert_eq!(
            assign_stable(&input, 0xE000, &CodepointMap::default()).unwrap(),
            assign(&input, 0xE000).unwrap()
        );
    }

    #[test]
    fn stable_assignment_rejects_duplicate_recorded_codepoints() {
        let mut map = CodepointMap::default();
        map.insert("home", 0xE000);
        map.insert("user", 0xE000);
        assert!(assign_stable(&sources(&["home", "user"]), 0xE000, &map).is_err());
    }
}
