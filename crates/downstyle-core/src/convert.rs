//! mdast to styled text conversion
//!
//! Walks the document tree in order, resolving attributes from the context
//! of ancestors and feeding text, separators and placeholders to the
//! [`Accumulator`].

use downstyle_mdast::{Code, Custom, Image, ListItem, Node, Root, parse_commonmark};
use url::Url;

use crate::accumulator::Accumulator;
use crate::attributes::Attributes;
use crate::context::{Context, Frame, ListFrame};
use crate::resolve::{NodeKind, StyleResolver};
use crate::style::{Appearance, StyleConfig};
use crate::styled::{
    Decoration, ImagePlacement, ImageStatus, LINE_SEPARATOR, PARAGRAPH_SEPARATOR, PlacementKind,
    RunRole, SizeHint, StyledText, Unresolvable,
};

/// Convert a document tree to styled text
pub fn convert(root: &Root, config: &StyleConfig) -> StyledText {
    Walker::new(config).convert_root(root)
}

/// Convert a document tree with a built-in preset
pub fn convert_with_appearance(root: &Root, appearance: Appearance) -> StyledText {
    convert(root, &StyleConfig::for_appearance(appearance))
}

/// Parse CommonMark source and convert it
pub fn convert_markdown(source: &str, config: &StyleConfig) -> StyledText {
    convert(&parse_commonmark(source), config)
}

/// Traversal state, local to one conversion
struct Walker<'a> {
    resolver: StyleResolver<'a>,
    context: Context,
    output: Accumulator,
    /// Block attributes of the most recently finished text block
    last_block: Option<Attributes>,
}

impl<'a> Walker<'a> {
    fn new(config: &'a StyleConfig) -> Self {
        Self {
            resolver: StyleResolver::new(config),
            context: Context::new(),
            output: Accumulator::new(),
            last_block: None,
        }
    }

    fn convert_root(mut self, root: &Root) -> StyledText {
        self.walk_document(root);
        debug_assert!(self.context.is_empty(), "context must be balanced");

        let styled = self.output.finish();
        tracing::debug!(
            bytes = styled.len(),
            runs = styled.runs.len(),
            placements = styled.placements.len(),
            decorations = styled.decorations.len(),
            "Converted document"
        );
        styled
    }

    fn walk_document(&mut self, root: &Root) {
        self.within(Frame::Block(NodeKind::Document), |w| {
            w.walk_children(&root.children);
        });
    }

    /// Run `f` with `frame` pushed, popping exactly that frame afterwards
    fn within(&mut self, frame: Frame, f: impl FnOnce(&mut Self)) {
        let depth = self.context.depth();
        self.context.push(frame);
        f(self);
        self.context.pop();
        debug_assert_eq!(self.context.depth(), depth, "unbalanced context frame");
    }

    fn walk_children(&mut self, children: &[Node]) {
        let mut previous: Option<&Node> = None;
        for child in children {
            // Consecutive inlines share a paragraph; any boundary that
            // involves a block gets exactly one separator
            if let Some(prev) = previous {
                if prev.is_block() || child.is_block() {
                    self.separate(prev, child);
                }
            }
            self.walk(child);
            previous = Some(child);
        }
    }

    fn walk(&mut self, node: &Node) {
        match node {
            Node::Heading(h) => {
                self.text_block(NodeKind::Heading(h.depth.clamp(1, 6)), |w| {
                    w.walk_children(&h.children);
                });
            }
            Node::Paragraph(p) => {
                self.text_block(NodeKind::Paragraph, |w| w.walk_children(&p.children));
            }
            Node::Blockquote(q) => {
                let start = self.output.len();
                self.within(Frame::Quote, |w| w.walk_children(&q.children));
                let quote = &self.resolver.config().quote;
                self.output.decorate(Decoration::QuoteStripe {
                    range: start..self.output.len(),
                    depth: self.context.quote_depth() + 1,
                    color: quote.stripe_color,
                    thickness: quote.stripe_thickness,
                });
            }
            Node::List(l) => {
                self.within(Frame::List(ListFrame::new(l.ordered, l.start)), |w| {
                    w.walk_children(&l.children);
                });
            }
            Node::ListItem(item) => self.list_item(item),
            Node::Code(code) => self.code_block(code),
            Node::ThematicBreak => self.thematic_break(),
            Node::Text(t) => self.content(&t.value, NodeKind::Text),
            Node::Emphasis(e) => {
                let delta = self.resolver.delta(NodeKind::Emphasis);
                self.within(Frame::Inline(delta), |w| w.walk_children(&e.children));
            }
            Node::Strong(s) => {
                let delta = self.resolver.delta(NodeKind::Strong);
                self.within(Frame::Inline(delta), |w| w.walk_children(&s.children));
            }
            Node::Link(l) => {
                let delta = self.resolver.link_delta(l);
                self.within(Frame::Inline(delta), |w| w.walk_children(&l.children));
            }
            Node::InlineCode(c) => self.content(&c.value, NodeKind::InlineCode),
            Node::Break => {
                let attributes = self.resolver.resolve(NodeKind::Break, &self.context);
                let mut buf = [0; 4];
                self.output.append(
                    LINE_SEPARATOR.encode_utf8(&mut buf),
                    attributes,
                    RunRole::Break,
                );
            }
            Node::Image(image) => self.image(image),
            Node::Html(h) if h.block => {
                self.text_block(NodeKind::Paragraph, |w| w.content(&h.value, NodeKind::Html));
            }
            Node::Html(h) => self.content(&h.value, NodeKind::Html),
            Node::Custom(custom) => self.custom(custom),
        }
    }

    /// A block whose inline content takes the block's style
    fn text_block(&mut self, kind: NodeKind, f: impl FnOnce(&mut Self)) {
        self.within(Frame::Block(kind), |w| {
            f(w);
            w.last_block = Some(w.resolver.resolve(kind, &w.context));
        });
    }

    fn content(&mut self, text: &str, kind: NodeKind) {
        let attributes = self.resolver.resolve(kind, &self.context);
        self.output.append(text, attributes, RunRole::Content);
    }

    /// Emit the separator between two sibling blocks.
    ///
    /// The separator carries the attributes of the block that just ended; a
    /// run of bare inlines counts as a paragraph. Its spacing is the larger
    /// of what the previous block wants below and what the next block wants
    /// above, so adjacent requests never add up.
    fn separate(&mut self, previous: &Node, next: &Node) {
        let (_, after) = self.resolver.spacing(block_kind(previous));
        let (before, _) = self.resolver.spacing(block_kind(next));
        let mut attributes = match &self.last_block {
            Some(last) if previous.is_block() => last.clone(),
            _ => self.resolver.resolve(NodeKind::Paragraph, &self.context),
        };
        attributes.paragraph.spacing = after.max(before);
        let mut buf = [0; 4];
        self.output.append(
            PARAGRAPH_SEPARATOR.encode_utf8(&mut buf),
            attributes,
            RunRole::Separator,
        );
    }

    fn list_item(&mut self, item: &ListItem) {
        let bullet = &self.resolver.config().list.bullet;
        let label = self.context.next_item_label(bullet);
        self.within(Frame::Item, |w| {
            let attributes = w.resolver.resolve_prefix(&w.context);
            w.output
                .append(&format!("{label}\t"), attributes, RunRole::Prefix);
            w.walk_children(&item.children);
        });
    }

    fn code_block(&mut self, code: &Code) {
        self.within(Frame::Block(NodeKind::CodeBlock), |w| {
            let attributes = w.resolver.resolve(NodeKind::CodeBlock, &w.context);
            let start = w.output.len();
            w.output
                .append(&code.value, attributes.clone(), RunRole::Content);
            if let Some(color) = attributes.background {
                w.output.decorate(Decoration::BlockBackground {
                    range: start..w.output.len(),
                    color,
                });
            }
            w.last_block = Some(attributes);
        });
    }

    /// Reserve the rule's cell.
    ///
    /// The cell carries block-level attributes only: body font, rule color
    /// and the surrounding indentation. No inline delta reaches it.
    fn thematic_break(&mut self) {
        let rule = self.resolver.config().thematic_break.clone();
        let attributes = self
            .resolver
            .resolve(NodeKind::ThematicBreak, &self.context);
        let size = SizeHint {
            width: None,
            height: Some(rule.thickness),
        };
        self.output
            .append_placeholder(attributes.clone(), PlacementKind::ThematicBreak(rule), size);
        self.last_block = Some(attributes);
    }

    fn image(&mut self, image: &Image) {
        let status = image_status(&image.url);
        if let ImageStatus::Unresolvable(reason) = status {
            tracing::debug!(url = %image.url, ?reason, "Unresolvable image reference");
        }
        let attributes = self.resolver.resolve(NodeKind::Image, &self.context);
        let hint = &self.resolver.config().image;
        let size = SizeHint {
            width: hint.width,
            height: hint.height,
        };
        let placement = ImagePlacement {
            url: image.url.clone(),
            title: image.title.clone(),
            alt: image.alt.clone(),
            status,
        };
        self.output
            .append_placeholder(attributes, PlacementKind::Image(placement), size);
    }

    fn custom(&mut self, custom: &Custom) {
        tracing::debug!(
            name = %custom.name,
            "Rendering unsupported node kind with paragraph defaults"
        );
        if custom.inline {
            if let Some(value) = &custom.value {
                self.content(value, NodeKind::Text);
            }
            self.walk_children(&custom.children);
        } else {
            self.text_block(NodeKind::Custom, |w| {
                if let Some(value) = &custom.value {
                    w.content(value, NodeKind::Text);
                }
                w.walk_children(&custom.children);
            });
        }
    }
}

/// Kind used for spacing decisions; inline runs count as a paragraph
fn block_kind(node: &Node) -> NodeKind {
    if node.is_block() {
        NodeKind::of(node)
    } else {
        NodeKind::Paragraph
    }
}

/// Classify an image reference without fetching it.
///
/// Absolute URLs and relative references resolve; empty references and
/// anything the URL parser rejects do not.
fn image_status(url: &str) -> ImageStatus {
    let url = url.trim();
    if url.is_empty() {
        return ImageStatus::Unresolvable(Unresolvable::Empty);
    }
    let parsed = match Url::parse(url) {
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Url::parse("file:///").and_then(|base| base.join(url))
        }
        other => other,
    };
    match parsed {
        Ok(_) => ImageStatus::Resolvable,
        Err(_) => ImageStatus::Unresolvable(Unresolvable::Malformed),
    }
}
