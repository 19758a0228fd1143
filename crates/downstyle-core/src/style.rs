//! Style configuration
//!
//! A [`StyleConfig`] maps each node kind to its base presentation. It is an
//! immutable value for the duration of a conversion. Every level is
//! `#[serde(default)]`, so a partially specified preset falls back to the
//! built-in light defaults key by key.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use schemars::{JsonSchema, Schema, SchemaGenerator, json_schema};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a color string cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorParseError {
    #[error("color must start with '#': {0}")]
    MissingHash(String),
    #[error("color must have 6 or 8 hex digits: {0}")]
    InvalidLength(String),
    #[error("invalid hex digit in color: {0}")]
    InvalidDigit(String),
}

/// Error returned for an unknown appearance name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown appearance: {0} (expected \"light\" or \"dark\")")]
pub struct AppearanceParseError(String);

/// RGBA color, 8 bits per channel
///
/// Serialized as `#RRGGBB`, or `#RRGGBBAA` when not fully opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0x00, 0x00, 0x00);
    pub const WHITE: Color = Color::rgb(0xFF, 0xFF, 0xFF);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xFF }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)?;
        if self.a != 0xFF {
            write!(f, "{:02X}", self.a)?;
        }
        Ok(())
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix('#')
            .ok_or_else(|| ColorParseError::MissingHash(s.to_string()))?;
        if !hex.is_ascii() || (hex.len() != 6 && hex.len() != 8) {
            return Err(ColorParseError::InvalidLength(s.to_string()));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| ColorParseError::InvalidDigit(s.to_string()))
        };
        let a = if hex.len() == 8 { channel(6)? } else { 0xFF };
        Ok(Color::rgba(channel(0)?, channel(2)?, channel(4)?, a))
    }
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl JsonSchema for Color {
    fn schema_name() -> Cow<'static, str> {
        "Color".into()
    }

    fn json_schema(_generator: &mut SchemaGenerator) -> Schema {
        json_schema!({
            "type": "string",
            "pattern": "^#([0-9a-fA-F]{6}|[0-9a-fA-F]{8})$",
            "description": "Hex color, #RRGGBB or #RRGGBBAA"
        })
    }
}

/// Font weight facet
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Weight {
    #[default]
    Regular,
    Bold,
}

/// Font slant facet
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Slant {
    #[default]
    Normal,
    Italic,
}

/// A font description; the rendering surface maps it to a concrete face
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Font {
    pub family: String,
    pub size: f32,
    pub weight: Weight,
    pub slant: Slant,
}

impl Font {
    pub fn new(family: impl Into<String>, size: f32) -> Self {
        Self {
            family: family.into(),
            size,
            weight: Weight::Regular,
            slant: Slant::Normal,
        }
    }

    pub fn bold(mut self) -> Self {
        self.weight = Weight::Bold;
        self
    }
}

impl Default for Font {
    fn default() -> Self {
        Font::new(BODY_FAMILY, BODY_SIZE)
    }
}

const BODY_FAMILY: &str = "Helvetica";
const CODE_FAMILY: &str = "Menlo";
const BODY_SIZE: f32 = 17.0;
const HEADING_SIZES: [f32; 6] = [28.0, 24.0, 20.0, 18.0, 17.0, 17.0];

/// Presentation of a text-bearing block (paragraph, heading, code block)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct BlockStyle {
    pub font: Font,
    pub foreground: Color,
    pub background: Option<Color>,
    /// Requested space above the block
    pub spacing_before: f32,
    /// Requested space below the block
    pub spacing_after: f32,
}

impl Default for BlockStyle {
    fn default() -> Self {
        Self {
            font: Font::default(),
            foreground: Color::BLACK,
            background: None,
            spacing_before: 0.0,
            spacing_after: 8.0,
        }
    }
}

impl BlockStyle {
    /// Built-in heading style for a level in `1..=6`
    pub fn default_heading(level: u8) -> Self {
        let index = usize::from(level.clamp(1, 6)) - 1;
        Self {
            font: Font::new(BODY_FAMILY, HEADING_SIZES[index]).bold(),
            spacing_before: 16.0,
            ..Self::default()
        }
    }

    fn default_code() -> Self {
        Self {
            font: Font::new(CODE_FAMILY, 15.0),
            background: Some(Color::rgb(0xF5, 0xF7, 0xFA)),
            spacing_before: 8.0,
            ..Self::default()
        }
    }
}

/// Block quote presentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct QuoteStyle {
    /// Text color inside the quote
    pub foreground: Color,
    /// Left indent added per level of quote depth
    pub indent: f32,
    pub stripe_color: Color,
    pub stripe_thickness: f32,
    pub spacing_before: f32,
    pub spacing_after: f32,
}

impl Default for QuoteStyle {
    fn default() -> Self {
        Self {
            foreground: Color::rgb(0x55, 0x55, 0x55),
            indent: 20.0,
            stripe_color: Color::rgb(0x55, 0x55, 0x55),
            stripe_thickness: 2.0,
            spacing_before: 8.0,
            spacing_after: 8.0,
        }
    }
}

/// List and list item presentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ListStyle {
    /// Left indent added per level of list item depth
    pub indent: f32,
    pub prefix_font: Font,
    pub prefix_color: Color,
    /// Label of unordered list items
    pub bullet: String,
    pub spacing_before: f32,
    pub spacing_after: f32,
    /// Space between sibling items
    pub item_spacing: f32,
}

impl Default for ListStyle {
    fn default() -> Self {
        Self {
            indent: 24.0,
            prefix_font: Font::new(CODE_FAMILY, BODY_SIZE),
            prefix_color: Color::rgb(0x99, 0x99, 0x99),
            bullet: "\u{2022}".to_string(),
            spacing_before: 4.0,
            spacing_after: 8.0,
            item_spacing: 4.0,
        }
    }
}

/// Link presentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct LinkStyle {
    pub foreground: Color,
    pub underline: bool,
}

impl Default for LinkStyle {
    fn default() -> Self {
        Self {
            foreground: Color::rgb(0x00, 0x7A, 0xFF),
            underline: true,
        }
    }
}

/// Thematic break presentation, handed to the surface with each rule placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RuleStyle {
    pub color: Color,
    pub thickness: f32,
    /// Horizontal inset on both sides of the line
    pub indent: f32,
    pub spacing_before: f32,
    pub spacing_after: f32,
}

impl Default for RuleStyle {
    fn default() -> Self {
        Self {
            color: Color::rgb(0xD3, 0xD3, 0xD3),
            thickness: 1.0,
            indent: 0.0,
            spacing_before: 8.0,
            spacing_after: 8.0,
        }
    }
}

/// Size hint for image placeholders
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ImageStyle {
    pub width: Option<f32>,
    pub height: Option<f32>,
}

/// Complete style configuration for one conversion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct StyleConfig {
    /// Paragraphs, and the fallback for any node kind without its own style
    pub body: BlockStyle,
    /// Headings by level; level N uses entry N-1
    pub headings: Vec<BlockStyle>,
    pub code: BlockStyle,
    pub quote: QuoteStyle,
    pub list: ListStyle,
    pub link: LinkStyle,
    pub thematic_break: RuleStyle,
    pub image: ImageStyle,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self::light()
    }
}

impl StyleConfig {
    /// Built-in light preset
    pub fn light() -> Self {
        Self {
            body: BlockStyle::default(),
            headings: (1..=6).map(BlockStyle::default_heading).collect(),
            code: BlockStyle::default_code(),
            quote: QuoteStyle::default(),
            list: ListStyle::default(),
            link: LinkStyle::default(),
            thematic_break: RuleStyle::default(),
            image: ImageStyle::default(),
        }
    }

    /// Built-in dark preset
    pub fn dark() -> Self {
        let on_dark = |style: BlockStyle| BlockStyle {
            foreground: Color::WHITE,
            ..style
        };
        Self {
            body: on_dark(BlockStyle::default()),
            headings: (1..=6)
                .map(|level| on_dark(BlockStyle::default_heading(level)))
                .collect(),
            code: BlockStyle {
                foreground: Color::rgb(0xE6, 0xE6, 0xE6),
                background: Some(Color::rgb(0x1E, 0x1E, 0x1E)),
                ..BlockStyle::default_code()
            },
            quote: QuoteStyle {
                foreground: Color::rgb(0xAA, 0xAA, 0xAA),
                stripe_color: Color::rgb(0x77, 0x77, 0x77),
                ..QuoteStyle::default()
            },
            list: ListStyle {
                prefix_color: Color::rgb(0x8E, 0x8E, 0x93),
                ..ListStyle::default()
            },
            link: LinkStyle {
                foreground: Color::rgb(0x0A, 0x84, 0xFF),
                ..LinkStyle::default()
            },
            thematic_break: RuleStyle {
                color: Color::rgb(0x55, 0x55, 0x55),
                ..RuleStyle::default()
            },
            image: ImageStyle::default(),
        }
    }

    /// Built-in preset for an appearance
    pub fn for_appearance(appearance: Appearance) -> Self {
        match appearance {
            Appearance::Light => Self::light(),
            Appearance::Dark => Self::dark(),
        }
    }

    /// Heading style for a level, falling back to the built-in default when
    /// the configuration has no entry for it
    pub fn heading(&self, level: u8) -> Cow<'_, BlockStyle> {
        let level = level.clamp(1, 6);
        match self.headings.get(usize::from(level) - 1) {
            Some(style) => Cow::Borrowed(style),
            None => Cow::Owned(BlockStyle::default_heading(level)),
        }
    }
}

/// Named built-in presets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Appearance {
    #[default]
    Light,
    Dark,
}

impl Appearance {
    pub fn as_str(self) -> &'static str {
        match self {
            Appearance::Light => "light",
            Appearance::Dark => "dark",
        }
    }
}

impl FromStr for Appearance {
    type Err = AppearanceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "light" => Ok(Appearance::Light),
            "dark" => Ok(Appearance::Dark),
            _ => Err(AppearanceParseError(s.to_string())),
        }
    }
}
