//! Persisted name to codepoint assignments
//!
//! Stored as `<name>.codepoints.json` next to the generated font so that
//! regenerating after adding an icon leaves existing codepoints alone.

use super::registry::{ensure_unique_constants, Glyph};
use super::sources::IconSource;
use crate::core::errors::{PipelineError, PipelineResult, Stage};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodepointMap {
    /// Icons present in the last build
    glyphs: BTreeMap<String, u32>,
    /// Icons that have since been removed; their codepoints stay reserved
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    retired: BTreeMap<String, u32>,
}

impl CodepointMap {
    pub fn from_glyphs(glyphs: &[Glyph]) -> Self {
        Self {
            glyphs: glyphs
                .iter()
                .map(|glyph| (glyph.name.clone(), glyph.codepoint))
                .collect(),
            retired: BTreeMap::new(),
        }
    }

    /// Recorded codepoint for `name`, including retired names
    pub fn get(&self, name: &str) -> Option<u32> {
        self.glyphs
            .get(name)
            .or_else(|| self.retired.get(name))
            .copied()
    }

    pub fn insert(&mut self, name: impl Into<String>, codepoint: u32) {
        let name = name.into();
        self.retired.remove(&name);
        self.glyphs.insert(name, codepoint);
    }

    pub fn is_retired(&self, name: &str) -> bool {
        self.retired.contains_key(name)
    }

    /// Make `glyphs` the current icon set
    ///
    /// Names missing from `glyphs` move to the retired table, which keeps
    /// their codepoints reserved but leaves them out of [`Self::to_glyphs`].
    pub fn merge(&mut self, glyphs: &[Glyph]) {
        let current = std::mem::take(&mut self.glyphs);
        for (name, codepoint) in current {
            if !glyphs.iter().any(|glyph| glyph.name == name) {
                self.retired.insert(name, codepoint);
            }
        }
        for glyph in glyphs {
            self.insert(glyph.name.clone(), glyph.codepoint);
        }
    }

    /// Highest codepoint ever recorded, retired names included
    pub fn highest(&self) -> Option<u32> {
        self.glyphs
            .values()
            .chain(self.retired.values())
            .copied()
            .max()
    }

    /// Number of current, non-retired entries
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Entries as `(name, codepoint)` ordered by codepoint
    pub fn entries_by_codepoint(&self) -> Vec<(&str, u32)> {
        let mut entries: Vec<_> = self
            .glyphs
            .iter()
            .map(|(name, codepoint)| (name.as_str(), *codepoint))
            .collect();
        entries.sort_by_key(|(_, codepoint)| *codepoint);
        entries
    }

    /// Rebuild the current glyphs, ordered by codepoint
    ///
    /// Used when only a header is generated from an existing font and the
    /// icon files are not at hand; each glyph's source path is just its name.
    /// Retired names are left out.
    pub fn to_glyphs(&self) -> PipelineResult<Vec<Glyph>> {
        let glyphs = self
            .entries_by_codepoint()
            .into_iter()
            .map(|(name, codepoint)| {
                let source = IconSource {
                    path: PathBuf::from(name),
                    base_name: name.to_string(),
                };
                Glyph::new(source, codepoint)
            })
            .collect::<PipelineResult<Vec<_>>>()?;
        ensure_unique_constants(&glyphs)?;
        Ok(glyphs)
    }

    /// Where the map for `font_name` lives inside `output_dir`
    pub fn path_for(output_dir: &Path, font_name: &str) -> PathBuf {
        output_dir.join(format!("{font_name}.codepoints.json"))
    }

    /// Load a map, returning an empty one when the file does not exist yet
    pub async fn load_or_default(path: &Path) -> PipelineResult<Self> {
        match fs::read_to_string(path).await {
            Ok(contents) => serde_json::from_str(&contents).map_err(|e| {
                PipelineError::invalid_input(
                    Stage::CodepointMap,
                    format!("{} is not a valid codepoint map: {e}", path.display()),
                )
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No codepoint map at {}, starting fresh", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(PipelineError::io(Stage::CodepointMap, path, e)),
        }
    }

    pub async fn save(&self, path: &Path) -> PipelineResult<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| {
            PipelineError::invalid_input(Stage::CodepointMap, format!("cannot encode map: {e}"))
        })?;
        fs::write(path, json)
            .await
            .map_err(|e| PipelineError::io(Stage::CodepointMap, path, e))
    }
}
