//! downstyle-core: Core library for converting mdast documents to styled text
//!
//! This crate provides:
//! - Style configuration with built-in light and dark presets
//! - Style resolution from a node kind and its ancestor context
//! - A tree walker feeding an attribute-run accumulator
//! - The styled text value (text buffer, runs, placements, decorations)
//! - The layout protocol a rendering surface uses to draw embedded objects
//!
//! ## Example
//!
//! ```rust
//! use downstyle_core::{RunRole, StyleConfig, convert_markdown};
//!
//! let styled = convert_markdown("# Title\n\nSome *text*.", &StyleConfig::light());
//! assert_eq!(styled.text, "Title\u{2029}Some text.");
//! assert_eq!(styled.content_text(), "TitleSome text.");
//! assert_eq!(styled.runs[1].role, RunRole::Separator);
//! ```

pub mod accumulator;
pub mod attributes;
pub mod context;
pub mod convert;
pub mod layout;
pub mod resolve;
pub mod style;
pub mod styled;

pub use accumulator::{Accumulator, coalesce};
pub use attributes::{Attributes, InlineDelta, LinkTarget, ParagraphAttributes};
pub use context::{Context, Frame, ListFrame};
pub use convert::{convert, convert_markdown, convert_with_appearance};
pub use layout::{ObjectCell, ObjectSurface, RecordingSurface, SurfaceCall, lay_out};
pub use resolve::{NodeKind, StyleResolver};
pub use style::{
    Appearance, AppearanceParseError, BlockStyle, Color, ColorParseError, Font, ImageStyle,
    LinkStyle, ListStyle, QuoteStyle, RuleStyle, Slant, StyleConfig, Weight,
};
pub use styled::{
    Decoration, ImagePlacement, ImageStatus, LINE_SEPARATOR, OBJECT_REPLACEMENT,
    PARAGRAPH_SEPARATOR, Placement, PlacementKind, Run, RunRole, SizeHint, StyledText,
    Unresolvable,
};
