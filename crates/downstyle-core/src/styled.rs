//! Conversion output
//!
//! A [`StyledText`] is a plain value: the text buffer, the attribute runs
//! partitioning it, and the placements and decorations a rendering surface
//! draws out-of-band. All offsets are UTF-8 byte offsets into `text`.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::attributes::{Attributes, LinkTarget};
use crate::style::{Color, RuleStyle};

/// Separates consecutive blocks
pub const PARAGRAPH_SEPARATOR: char = '\u{2029}';
/// Hard line break inside a block
pub const LINE_SEPARATOR: char = '\u{2028}';
/// Reserved cell for an embedded object
pub const OBJECT_REPLACEMENT: char = '\u{FFFC}';

/// What a run's text stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RunRole {
    /// Literal text of a node
    Content,
    /// Block separator
    Separator,
    /// List item label
    Prefix,
    /// Hard line break
    Break,
    /// Placeholder of an embedded object
    Object,
}

impl RunRole {
    /// Object placeholders keep one run each
    pub fn is_mergeable(self) -> bool {
        self != RunRole::Object
    }
}

/// A contiguous span of the buffer sharing one attribute set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub range: Range<usize>,
    pub role: RunRole,
    pub attributes: Attributes,
}

impl Run {
    /// Whether `next` may be folded into this run
    pub fn can_merge(&self, next: &Run) -> bool {
        self.range.end == next.range.start
            && self.role == next.role
            && self.role.is_mergeable()
            && self.attributes == next.attributes
    }
}

/// Size hint for an embedded object; `None` leaves the dimension to the surface
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SizeHint {
    pub width: Option<f32>,
    pub height: Option<f32>,
}

/// Why an image reference cannot be resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Unresolvable {
    Empty,
    Malformed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "camelCase")]
pub enum ImageStatus {
    Resolvable,
    /// The surface decides how to present it (e.g. a blank box)
    Unresolvable(Unresolvable),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImagePlacement {
    pub url: String,
    pub title: Option<String>,
    pub alt: String,
    pub status: ImageStatus,
}

impl ImagePlacement {
    pub fn is_resolvable(&self) -> bool {
        self.status == ImageStatus::Resolvable
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PlacementKind {
    ThematicBreak(RuleStyle),
    Image(ImagePlacement),
}

/// A non-text element drawn in the cell at `offset`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// Offset of the [`OBJECT_REPLACEMENT`] character reserved for it
    pub offset: usize,
    pub kind: PlacementKind,
    pub size: SizeHint,
}

/// Range-wide drawing behind or beside text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Decoration {
    /// Vertical stripe left of quoted text; `depth` is 1 for an outermost quote
    QuoteStripe {
        range: Range<usize>,
        depth: usize,
        color: Color,
        thickness: f32,
    },
    /// Background fill behind a code block
    BlockBackground { range: Range<usize>, color: Color },
}

impl Decoration {
    pub fn range(&self) -> &Range<usize> {
        match self {
            Decoration::QuoteStripe { range, .. } | Decoration::BlockBackground { range, .. } => {
                range
            }
        }
    }

    /// Quote nesting level; 0 for decorations outside the quote hierarchy
    pub fn depth(&self) -> usize {
        match self {
            Decoration::QuoteStripe { depth, .. } => *depth,
            Decoration::BlockBackground { .. } => 0,
        }
    }
}

/// Styled buffer plus out-of-band drawing metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyledText {
    pub text: String,
    pub runs: Vec<Run>,
    pub placements: Vec<Placement>,
    pub decorations: Vec<Decoration>,
}

impl StyledText {
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn run_text(&self, run: &Run) -> &str {
        &self.text[run.range.clone()]
    }

    /// Run covering `offset`
    pub fn run_at(&self, offset: usize) -> Option<&Run> {
        let index = self.runs.partition_point(|run| run.range.end <= offset);
        self.runs.get(index).filter(|run| run.range.contains(&offset))
    }

    /// Link destination under `offset`, for resolving taps to navigation
    pub fn link_at(&self, offset: usize) -> Option<&LinkTarget> {
        self.run_at(offset).and_then(|run| run.attributes.link.as_ref())
    }

    /// Concatenated text of the [`RunRole::Content`] runs
    pub fn content_text(&self) -> String {
        self.runs
            .iter()
            .filter(|run| run.role == RunRole::Content)
            .map(|run| self.run_text(run))
            .collect()
    }

    /// UTF-16 code unit offset of a byte offset, for hosts indexing that way.
    ///
    /// Offsets past the end or inside a character clamp down to the
    /// preceding character boundary.
    pub fn utf16_offset(&self, offset: usize) -> usize {
        let mut end = offset.min(self.text.len());
        while !self.text.is_char_boundary(end) {
            end -= 1;
        }
        self.text[..end].encode_utf16().count()
    }

    pub fn utf16_range(&self, range: &Range<usize>) -> Range<usize> {
        self.utf16_offset(range.start)..self.utf16_offset(range.end)
    }
}
