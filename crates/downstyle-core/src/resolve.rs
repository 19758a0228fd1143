//! Style resolution
//!
//! `(node kind, context) -> Attributes`, pure and deterministic.

use downstyle_mdast::{Link, Node};

use crate::attributes::{Attributes, InlineDelta, LinkTarget, ParagraphAttributes};
use crate::context::Context;
use crate::style::{BlockStyle, StyleConfig};

/// Style-relevant kind of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Document,
    Heading(u8),
    Paragraph,
    Blockquote,
    List,
    ListItem,
    CodeBlock,
    ThematicBreak,
    Text,
    Emphasis,
    Strong,
    InlineCode,
    Break,
    Link,
    Image,
    Html,
    /// A node without a dedicated style
    Custom,
}

impl NodeKind {
    pub fn of(node: &Node) -> Self {
        match node {
            Node::Heading(h) => NodeKind::Heading(h.depth.clamp(1, 6)),
            Node::Paragraph(_) => NodeKind::Paragraph,
            Node::ThematicBreak => NodeKind::ThematicBreak,
            Node::Blockquote(_) => NodeKind::Blockquote,
            Node::List(_) => NodeKind::List,
            Node::ListItem(_) => NodeKind::ListItem,
            Node::Code(_) => NodeKind::CodeBlock,
            Node::Text(_) => NodeKind::Text,
            Node::Emphasis(_) => NodeKind::Emphasis,
            Node::Strong(_) => NodeKind::Strong,
            Node::InlineCode(_) => NodeKind::InlineCode,
            Node::Break => NodeKind::Break,
            Node::Link(_) => NodeKind::Link,
            Node::Image(_) => NodeKind::Image,
            Node::Html(_) => NodeKind::Html,
            Node::Custom(_) => NodeKind::Custom,
        }
    }

    fn is_inline(self) -> bool {
        matches!(
            self,
            NodeKind::Text
                | NodeKind::Emphasis
                | NodeKind::Strong
                | NodeKind::Break
                | NodeKind::Link
                | NodeKind::Image
                | NodeKind::Html
        )
    }
}

/// Resolves attributes from a [`StyleConfig`]
#[derive(Debug, Clone, Copy)]
pub struct StyleResolver<'a> {
    config: &'a StyleConfig,
}

impl<'a> StyleResolver<'a> {
    pub fn new(config: &'a StyleConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &'a StyleConfig {
        self.config
    }

    /// Attributes for a node of `kind` visited in `context`.
    ///
    /// Inline kinds start from the enclosing block and get every active
    /// inline delta plus their own. Code replaces the presentation facets
    /// entirely. Kinds without a style of their own resolve like a paragraph.
    pub fn resolve(&self, kind: NodeKind, context: &Context) -> Attributes {
        match kind {
            NodeKind::CodeBlock | NodeKind::InlineCode => self.code(context),
            kind if kind.is_inline() => {
                let mut attributes = self.block(context.block(), context);
                context.inline_delta().then(&self.delta(kind)).apply(&mut attributes);
                attributes
            }
            kind => self.block(kind, context),
        }
    }

    /// Attributes of a list item's label in `context` (inside the item)
    pub fn resolve_prefix(&self, context: &Context) -> Attributes {
        let list = &self.config.list;
        let mut attributes = self.block(NodeKind::ListItem, context);
        attributes.font = list.prefix_font.clone();
        attributes.foreground = list.prefix_color;
        attributes
    }

    /// Delta contributed by an inline kind itself
    pub fn delta(&self, kind: NodeKind) -> InlineDelta {
        match kind {
            NodeKind::Emphasis => InlineDelta::emphasis(),
            NodeKind::Strong => InlineDelta::strong(),
            NodeKind::Link => InlineDelta::link(&self.config.link, None),
            _ => InlineDelta::default(),
        }
    }

    /// Delta for a link node, carrying its destination
    pub fn link_delta(&self, link: &Link) -> InlineDelta {
        InlineDelta::link(
            &self.config.link,
            Some(LinkTarget {
                url: link.url.clone(),
                title: link.title.clone(),
            }),
        )
    }

    /// Requested `(before, after)` spacing of a block kind
    pub fn spacing(&self, kind: NodeKind) -> (f32, f32) {
        let config = self.config;
        match kind {
            NodeKind::Heading(level) => {
                let style = config.heading(level);
                (style.spacing_before, style.spacing_after)
            }
            NodeKind::CodeBlock => (config.code.spacing_before, config.code.spacing_after),
            NodeKind::Blockquote => (config.quote.spacing_before, config.quote.spacing_after),
            NodeKind::List => (config.list.spacing_before, config.list.spacing_after),
            NodeKind::ListItem => (config.list.item_spacing, config.list.item_spacing),
            NodeKind::ThematicBreak => (
                config.thematic_break.spacing_before,
                config.thematic_break.spacing_after,
            ),
            _ => (config.body.spacing_before, config.body.spacing_after),
        }
    }

    fn block_style(&self, kind: NodeKind) -> std::borrow::Cow<'a, BlockStyle> {
        match kind {
            NodeKind::Heading(level) => self.config.heading(level),
            NodeKind::CodeBlock => std::borrow::Cow::Borrowed(&self.config.code),
            _ => std::borrow::Cow::Borrowed(&self.config.body),
        }
    }

    fn block(&self, kind: NodeKind, context: &Context) -> Attributes {
        let mut attributes = Attributes::from_block(&self.block_style(kind));
        if kind == NodeKind::ThematicBreak {
            attributes.foreground = self.config.thematic_break.color;
        } else if context.quote_depth() > 0 {
            attributes.foreground = self.config.quote.foreground;
        }
        attributes.paragraph = self.indentation(context);
        attributes
    }

    fn code(&self, context: &Context) -> Attributes {
        let mut attributes = Attributes::from_block(&self.config.code);
        attributes.paragraph = self.indentation(context);
        // The link target is metadata rather than presentation; keep it so
        // code inside a link stays tappable
        attributes.link = context.inline_delta().link;
        attributes
    }

    fn indentation(&self, context: &Context) -> ParagraphAttributes {
        let quote = context.quote_depth() as f32 * self.config.quote.indent;
        let items = context.item_depth() as f32 * self.config.list.indent;
        let indent = quote + items;
        let first_line_indent = if context.item_depth() > 0 {
            indent - self.config.list.indent
        } else {
            indent
        };
        ParagraphAttributes {
            indent,
            first_line_indent,
            spacing: 0.0,
        }
    }
}
