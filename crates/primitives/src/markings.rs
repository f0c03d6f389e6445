use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::chapter::WordCoord;

/// Highlight/underline color: either a legacy named token (`yellow`) or a hex
/// string (`#ffff00`). Serialized as the plain string either way.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(from = "String", into = "String")]
pub enum ColorValue {
    Named(String),
    Hex(String),
}

impl ColorValue {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Named(value) | Self::Hex(value) => value,
        }
    }
}

impl From<String> for ColorValue {
    fn from(value: String) -> Self {
        if value.starts_with('#') {
            Self::Hex(value)
        } else {
            Self::Named(value)
        }
    }
}

impl From<&str> for ColorValue {
    fn from(value: &str) -> Self {
        value.to_owned().into()
    }
}

impl From<ColorValue> for String {
    fn from(value: ColorValue) -> Self {
        match value {
            ColorValue::Named(value) | ColorValue::Hex(value) => value,
        }
    }
}

impl fmt::Display for ColorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Symbol markup value: either a legacy single glyph (`★`) or a composite
/// `icon|color|weight` token. Serialized as the plain string either way.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(from = "String", into = "String")]
pub enum SymbolValue {
    Glyph(String),
    Composite {
        icon: String,
        color: String,
        weight: String,
    },
}

impl From<String> for SymbolValue {
    fn from(value: String) -> Self {
        let mut parts = value.splitn(3, '|');

        match (parts.next(), parts.next(), parts.next()) {
            (Some(icon), Some(color), Some(weight)) => Self::Composite {
                icon: icon.to_owned(),
                color: color.to_owned(),
                weight: weight.to_owned(),
            },
            _ => Self::Glyph(value),
        }
    }
}

impl From<&str> for SymbolValue {
    fn from(value: &str) -> Self {
        value.to_owned().into()
    }
}

impl From<SymbolValue> for String {
    fn from(value: SymbolValue) -> Self {
        value.to_string()
    }
}

impl fmt::Display for SymbolValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Glyph(glyph) => f.pad(glyph),
            Self::Composite { icon, color, weight } => {
                write!(f, "{icon}|{color}|{weight}")
            }
        }
    }
}

impl FromStr for SymbolValue {
    type Err = core::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.into())
    }
}

/// The three independent markup types applicable to a word coordinate.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LayerKind {
    Highlight,
    Underline,
    Symbol,
}

impl LayerKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Highlight => "highlight",
            Self::Underline => "underline",
            Self::Symbol => "symbol",
        }
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorLayer {
    pub value: ColorValue,
    pub created_at: u64,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolLayer {
    pub value: SymbolValue,
    pub created_at: u64,
}

/// One value for any of the three layers, tagged by kind at the call site.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LayerValue {
    Highlight(ColorValue),
    Underline(ColorValue),
    Symbol(SymbolValue),
}

impl LayerValue {
    pub const fn kind(&self) -> LayerKind {
        match self {
            Self::Highlight(_) => LayerKind::Highlight,
            Self::Underline(_) => LayerKind::Underline,
            Self::Symbol(_) => LayerKind::Symbol,
        }
    }
}

/// The up-to-three optional layers present on one word coordinate.
///
/// A coordinate with no layers must not exist as a key in [`WordMarkings`];
/// mutation helpers prune it.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkingLayers {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight: Option<ColorLayer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub underline: Option<ColorLayer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<SymbolLayer>,
}

impl MarkingLayers {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.highlight.is_none() && self.underline.is_none() && self.symbol.is_none()
    }

    pub fn set(&mut self, value: LayerValue, created_at: u64) {
        match value {
            LayerValue::Highlight(value) => {
                self.highlight = Some(ColorLayer { value, created_at });
            }
            LayerValue::Underline(value) => {
                self.underline = Some(ColorLayer { value, created_at });
            }
            LayerValue::Symbol(value) => {
                self.symbol = Some(SymbolLayer { value, created_at });
            }
        }
    }

    pub fn clear(&mut self, kind: LayerKind) {
        match kind {
            LayerKind::Highlight => self.highlight = None,
            LayerKind::Underline => self.underline = None,
            LayerKind::Symbol => self.symbol = None,
        }
    }
}

/// A chapter's full annotation state: every marked word coordinate and its
/// layers.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct WordMarkings(pub BTreeMap<WordCoord, MarkingLayers>);

impl WordMarkings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, coord: &WordCoord) -> Option<&MarkingLayers> {
        self.0.get(coord)
    }

    /// Set one layer on a coordinate, creating the entry if needed.
    pub fn set_layer(&mut self, coord: WordCoord, value: LayerValue, created_at: u64) {
        self.0.entry(coord).or_default().set(value, created_at);
    }

    /// Remove one layer from a coordinate. Removing the last layer removes
    /// the coordinate entirely.
    pub fn clear_layer(&mut self, coord: &WordCoord, kind: LayerKind) {
        if let Some(layers) = self.0.get_mut(coord) {
            layers.clear(kind);

            if layers.is_empty() {
                let _ = self.0.remove(coord);
            }
        }
    }

    /// Drop every marking within one verse.
    pub fn clear_verse(&mut self, verse: u32) {
        self.0.retain(|coord, _| coord.verse != verse);
    }

    /// Drop every coordinate whose layer-set is empty. Deserialized maps may
    /// carry `{}` entries; the mutation helpers never produce them.
    pub fn prune(&mut self) {
        self.0.retain(|_, layers| !layers.is_empty());
    }

    /// Drop a symbol chapter-wide, pruning coordinates left with no layers.
    pub fn clear_symbol(&mut self, symbol: &SymbolValue) {
        self.0.retain(|_, layers| {
            if layers.symbol.as_ref().is_some_and(|s| s.value == *symbol) {
                layers.symbol = None;
            }

            !layers.is_empty()
        });
    }
}
