use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tilescape_common::BlockKind;

/// Per-channel decrement between successive shading variants.
pub const SHADE_STEP: u8 = 0x20;

/// Color used for block kinds missing from the palette.
const FALLBACK_COLOR: &str = "#ff00ff";

/// Errors from palette operations.
#[derive(Debug, thiserror::Error)]
pub enum PaletteError {
    #[error("invalid palette color {0:?}: expected #rrggbb")]
    InvalidPaletteColor(String),
    #[error("unknown block type {0:?}")]
    UnknownBlockType(String),
    #[error("palette JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// An 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Parse a strict `#rrggbb` string.
    pub fn parse(s: &str) -> Result<Self, PaletteError> {
        let invalid = || PaletteError::InvalidPaletteColor(s.to_string());
        let digits = s.strip_prefix('#').ok_or_else(invalid)?;
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| invalid());
        Ok(Self(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Every channel reduced by `amount`, clamped at zero.
    pub fn darken(self, amount: u8) -> Self {
        Self(
            self.0.saturating_sub(amount),
            self.1.saturating_sub(amount),
            self.2.saturating_sub(amount),
        )
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// The three shading variants of a palette color: top face, front face,
/// side face. The first is the input itself; each following one is darker.
pub fn color_variants(hex: &str) -> Result<[String; 3], PaletteError> {
    let base = Rgb::parse(hex)?;
    Ok([
        hex.to_string(),
        base.darken(SHADE_STEP).to_hex(),
        base.darken(SHADE_STEP.saturating_mul(2)).to_hex(),
    ])
}

/// A palette color with its precomputed shades.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteEntry {
    pub color: String,
    pub shades: [String; 3],
}

impl PaletteEntry {
    pub fn new(color: &str) -> Result<Self, PaletteError> {
        Ok(Self {
            color: color.to_string(),
            shades: color_variants(color)?,
        })
    }
}

/// Runtime-extensible mapping from block kind to color.
#[derive(Debug, Clone)]
pub struct Palette {
    entries: BTreeMap<BlockKind, PaletteEntry>,
    fallback: PaletteEntry,
}

impl Palette {
    /// An empty palette.
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            fallback: PaletteEntry {
                color: FALLBACK_COLOR.to_string(),
                shades: [
                    FALLBACK_COLOR.to_string(),
                    "#df00df".to_string(),
                    "#bf00bf".to_string(),
                ],
            },
        }
    }

    /// The palette covering every kind the terrain generator emits.
    pub fn with_defaults() -> Self {
        let mut palette = Self::new();
        for (name, color) in [
            ("bedrock", "#3a3a3a"),
            ("stone", "#808080"),
            ("dirt", "#8b5a2b"),
            ("grass", "#4caf50"),
            ("sand", "#e0c97f"),
            ("water", "#3f76e4"),
        ] {
            if let Ok(entry) = PaletteEntry::new(color) {
                palette.entries.insert(BlockKind::new(name), entry);
            }
        }
        palette
    }

    /// Merge a `name -> #rrggbb` delta into the palette.
    ///
    /// Every color is validated before anything is inserted, so a bad entry
    /// leaves the palette unchanged. Existing names are overwritten.
    pub fn add_new_block_type(
        &mut self,
        delta: &BTreeMap<String, String>,
    ) -> Result<Vec<BlockKind>, PaletteError> {
        let parsed = delta
            .iter()
            .map(|(name, color)| Ok((BlockKind::new(name), PaletteEntry::new(color)?)))
            .collect::<Result<Vec<_>, PaletteError>>()?;

        let mut added = Vec::with_capacity(parsed.len());
        for (kind, entry) in parsed {
            tracing::debug!(%kind, color = %entry.color, "palette entry added");
            self.entries.insert(kind.clone(), entry);
            added.push(kind);
        }
        Ok(added)
    }

    /// Merge a JSON object of `name -> #rrggbb`, as produced by an external
    /// block-definition provider.
    pub fn merge_json(&mut self, json: &str) -> Result<Vec<BlockKind>, PaletteError> {
        let delta: BTreeMap<String, String> = serde_json::from_str(json)?;
        self.add_new_block_type(&delta)
    }

    pub fn get(&self, kind: &BlockKind) -> Option<&PaletteEntry> {
        self.entries.get(kind)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&BlockKind::new(name))
    }

    /// Look up a kind by name, failing if the palette does not know it.
    pub fn resolve(&self, name: &str) -> Result<BlockKind, PaletteError> {
        let kind = BlockKind::new(name);
        if self.entries.contains_key(&kind) {
            Ok(kind)
        } else {
            Err(PaletteError::UnknownBlockType(name.to_string()))
        }
    }

    /// Shades for `kind`, or the fallback shades for unknown kinds.
    pub fn shades(&self, kind: &BlockKind) -> &[String; 3] {
        &self.entries.get(kind).unwrap_or(&self.fallback).shades
    }

    pub fn kinds(&self) -> impl Iterator<Item = &BlockKind> + '_ {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variants_of_pure_green() {
        let v = color_variants("#00ff00").unwrap();
        assert_eq!(v, ["#00ff00", "#00df00", "#00bf00"]);
    }

    #[test]
    fn variants_decrease_monotonically_and_clamp() {
        let v = color_variants("#30a010").unwrap();
        let rgb: Vec<Rgb> = v.iter().map(|s| Rgb::parse(s).unwrap()).collect();
        assert_eq!(rgb[0], Rgb(0x30, 0xa0, 0x10));
        for pair in rgb.windows(2) {
            assert!(pair[1].0 <= pair[0].0);
            assert!(pair[1].1 <= pair[0].1);
            assert!(pair[1].2 <= pair[0].2);
        }
        // 0x10 - 0x20 clamps at zero.
        assert_eq!(rgb[1].2, 0);
        assert_eq!(rgb[2], Rgb(0x00, 0x60, 0x00));
    }

    #[test]
    fn first_variant_is_the_input() {
        let v = color_variants("#ABCDEF").unwrap();
        assert_eq!(v[0], "#ABCDEF");
        assert_eq!(v[1], "#8badcf");
    }

    #[test]
    fn invalid_colors_rejected() {
        for bad in ["not-a-color", "#fff", "00ff00", "#00ff0g", "#00ff000", "", "#"] {
            assert!(
                matches!(color_variants(bad), Err(PaletteError::InvalidPaletteColor(_))),
                "{bad:?} accepted"
            );
        }
    }

    #[test]
    fn defaults_cover_generated_kinds() {
        let p = Palette::with_defaults();
        for kind in ["bedrock", "stone", "dirt", "grass", "sand", "water"] {
            assert!(p.contains(kind), "missing {kind}");
        }
        assert_eq!(p.get(&BlockKind::new("stone")).unwrap().color, "#808080");
    }

    #[test]
    fn add_new_block_type_extends_palette() {
        let mut p = Palette::new();
        let mut delta = BTreeMap::new();
        delta.insert("crystal".to_string(), "#aaddff".to_string());
        delta.insert("lava".to_string(), "#ff4500".to_string());
        let added = p.add_new_block_type(&delta).unwrap();
        assert_eq!(added.len(), 2);
        assert!(p.contains("crystal"));
        assert_eq!(p.shades(&BlockKind::new("lava"))[1], "#df2500");
    }

    #[test]
    fn bad_delta_leaves_palette_unchanged() {
        let mut p = Palette::new();
        let mut delta = BTreeMap::new();
        delta.insert("good".to_string(), "#123456".to_string());
        delta.insert("bad".to_string(), "blue".to_string());
        assert!(p.add_new_block_type(&delta).is_err());
        assert!(p.is_empty());
    }

    #[test]
    fn merge_json_object() {
        let mut p = Palette::new();
        p.merge_json(r##"{"moss": "#2e8b57"}"##).unwrap();
        assert!(p.contains("moss"));
        assert!(matches!(p.merge_json("[1, 2]"), Err(PaletteError::Json(_))));
    }

    #[test]
    fn unknown_kind_uses_fallback() {
        let p = Palette::new();
        assert_eq!(p.shades(&BlockKind::new("mystery"))[0], FALLBACK_COLOR);
        assert!(matches!(
            p.resolve("mystery"),
            Err(PaletteError::UnknownBlockType(_))
        ));
    }
}
