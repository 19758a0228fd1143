//! Embedded-object layout protocol
//!
//! A rendering surface lays the text out itself; [`lay_out`] then hands it
//! each decoration and each embedded object together with the single
//! placeholder cell reserved for it. The surface draws into that cell
//! without reflowing the surrounding runs.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::attributes::Attributes;
use crate::styled::{Decoration, Placement, RunRole, StyledText};

/// The placeholder cell reserved for one embedded object
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectCell<'a> {
    /// Byte offset of the placeholder character
    pub offset: usize,
    /// The same offset in UTF-16 code units
    pub utf16_offset: usize,
    /// Attributes of the placeholder run; the line it sits on uses this font
    pub attributes: &'a Attributes,
}

/// Drawing hooks a rendering surface implements
pub trait ObjectSurface {
    /// Draw an embedded object into its cell
    fn draw_object(&mut self, cell: ObjectCell<'_>, placement: &Placement);

    /// Draw a range-wide decoration; `utf16` is its range in UTF-16 code units
    fn draw_decoration(&mut self, decoration: &Decoration, utf16: Range<usize>) {
        let _ = (decoration, utf16);
    }
}

/// Drive `surface` over `styled`.
///
/// Decorations come first, outer before inner, so they sit behind text and
/// objects. Objects follow in placement order, one cell each. Returns the
/// number of objects drawn.
pub fn lay_out<S: ObjectSurface + ?Sized>(styled: &StyledText, surface: &mut S) -> usize {
    for decoration in &styled.decorations {
        surface.draw_decoration(decoration, styled.utf16_range(decoration.range()));
    }

    let mut drawn = 0;
    for placement in &styled.placements {
        let Some(run) = styled
            .run_at(placement.offset)
            .filter(|run| run.role == RunRole::Object)
        else {
            debug_assert!(false, "placement at {} has no object run", placement.offset);
            continue;
        };
        let cell = ObjectCell {
            offset: placement.offset,
            utf16_offset: styled.utf16_offset(placement.offset),
            attributes: &run.attributes,
        };
        surface.draw_object(cell, placement);
        drawn += 1;
    }
    drawn
}

/// One recorded surface call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "call", rename_all = "camelCase")]
pub enum SurfaceCall {
    Decoration {
        utf16: Range<usize>,
        decoration: Decoration,
    },
    Object {
        offset: usize,
        utf16_offset: usize,
        font_size: f32,
        placement: Placement,
    },
}

/// A surface that draws nothing and records every call, for debugging
/// layouts and for tests
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordingSurface {
    pub calls: Vec<SurfaceCall>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the calls [`lay_out`] makes for `styled`
    pub fn record(styled: &StyledText) -> Self {
        let mut surface = Self::new();
        lay_out(styled, &mut surface);
        surface
    }
}

impl ObjectSurface for RecordingSurface {
    fn draw_object(&mut self, cell: ObjectCell<'_>, placement: &Placement) {
        self.calls.push(SurfaceCall::Object {
            offset: cell.offset,
            utf16_offset: cell.utf16_offset,
            font_size: cell.attributes.font.size,
            placement: placement.clone(),
        });
    }

    fn draw_decoration(&mut self, decoration: &Decoration, utf16: Range<usize>) {
        self.calls.push(SurfaceCall::Decoration {
            utf16,
            decoration: decoration.clone(),
        });
    }
}
