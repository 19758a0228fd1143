//! Traversal context
//!
//! A single stack of frames mirroring the ancestors of the node being visited.
//! Quote depth, list numbering, the enclosing text block and the active
//! inline deltas are all derived from it, so popping a frame on exit is the
//! only bookkeeping needed to restore the parent's state.

use crate::attributes::InlineDelta;
use crate::resolve::NodeKind;

/// Numbering state of one list
#[derive(Debug, Clone, PartialEq)]
pub struct ListFrame {
    pub ordered: bool,
    pub start: u32,
    /// Items already labelled
    pub items: u32,
}

impl ListFrame {
    pub fn new(ordered: bool, start: Option<u32>) -> Self {
        Self {
            ordered,
            start: start.unwrap_or(1),
            items: 0,
        }
    }
}

/// One ancestor's contribution to the context
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// A block whose style applies to the text below it
    Block(NodeKind),
    Quote,
    List(ListFrame),
    Item,
    Inline(InlineDelta),
}

#[derive(Debug, Default)]
pub struct Context {
    frames: Vec<Frame>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    pub fn pop(&mut self) -> Option<Frame> {
        self.frames.pop()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn quote_depth(&self) -> usize {
        self.count(|f| matches!(f, Frame::Quote))
    }

    /// Number of enclosing list items, i.e. the list nesting level of the text
    pub fn item_depth(&self) -> usize {
        self.count(|f| matches!(f, Frame::Item))
    }

    /// Innermost enclosing text block, `Document` at the top level
    pub fn block(&self) -> NodeKind {
        self.frames
            .iter()
            .rev()
            .find_map(|f| match f {
                Frame::Block(kind) => Some(*kind),
                _ => None,
            })
            .unwrap_or(NodeKind::Document)
    }

    /// All active inline deltas composed outermost first
    pub fn inline_delta(&self) -> InlineDelta {
        self.frames
            .iter()
            .filter_map(|f| match f {
                Frame::Inline(delta) => Some(delta),
                _ => None,
            })
            .fold(InlineDelta::default(), |acc, delta| acc.then(delta))
    }

    /// Label for the next item of the innermost list.
    ///
    /// Ordered items count from the list's start value by direct sibling
    /// position; unordered items (and stray items outside any list) get
    /// `bullet`.
    pub fn next_item_label(&mut self, bullet: &str) -> String {
        let list = self.frames.iter_mut().rev().find_map(|f| match f {
            Frame::List(list) => Some(list),
            _ => None,
        });
        match list {
            Some(list) => {
                let position = list.items;
                list.items += 1;
                if list.ordered {
                    format!("{}.", u64::from(list.start) + u64::from(position))
                } else {
                    bullet.to_string()
                }
            }
            None => bullet.to_string(),
        }
    }

    fn count(&self, pred: impl Fn(&Frame) -> bool) -> usize {
        self.frames.iter().filter(|f| pred(f)).count()
    }
}
