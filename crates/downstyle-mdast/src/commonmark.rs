//! CommonMark source to mdast
//!
//! Builds a [`Root`] from Markdown text using pulldown-cmark's event stream.
//! Every `Start` event opens a frame, every `End` closes the innermost one, so
//! the resulting tree mirrors the event nesting exactly.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag};

use crate::mdast::{
    Blockquote, Code, Custom, Emphasis, Heading, Html, Image, Link, List, ListItem, Node,
    Paragraph, Root, Strong, Text,
};

/// Parse CommonMark (plus strikethrough) into an mdast tree
pub fn parse_commonmark(source: &str) -> Root {
    let parser = Parser::new_ext(source, Options::ENABLE_STRIKETHROUGH);
    let mut builder = TreeBuilder::new();
    for event in parser {
        builder.process_event(event);
    }
    builder.finish()
}

/// Kind of the container currently being filled
#[derive(Debug)]
enum FrameKind {
    Root,
    Paragraph,
    Heading(u8),
    Blockquote,
    CodeBlock {
        lang: Option<String>,
        meta: Option<String>,
    },
    HtmlBlock,
    List {
        ordered: bool,
        start: Option<u32>,
    },
    Item,
    Emphasis,
    Strong,
    Link {
        url: String,
        title: Option<String>,
    },
    Image {
        url: String,
        title: Option<String>,
    },
    Custom {
        name: &'static str,
        inline: bool,
    },
}

#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    children: Vec<Node>,
}

/// Event-driven tree builder
struct TreeBuilder {
    stack: Vec<Frame>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            stack: vec![Frame {
                kind: FrameKind::Root,
                children: Vec::new(),
            }],
        }
    }

    fn process_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.open(tag),
            Event::End(_) => self.close(),
            Event::Text(text) => self.push_text(&text),
            Event::Code(code) => self.push(Node::inline_code(code.to_string())),
            Event::Html(html) => {
                if self.in_html_block() {
                    self.push_text(&html);
                } else {
                    self.push(Node::html(html.to_string()));
                }
            }
            Event::InlineHtml(html) => self.push(Node::html(html.to_string())),
            // Soft breaks render as spaces, like in HTML output
            Event::SoftBreak => self.push_text(" "),
            Event::HardBreak => self.push(Node::Break),
            Event::Rule => self.push(Node::ThematicBreak),
            Event::InlineMath(math) => self.push(custom_leaf("inlineMath", true, &math)),
            Event::DisplayMath(math) => self.push(custom_leaf("math", true, &math)),
            Event::FootnoteReference(label) => {
                self.push(custom_leaf("footnoteReference", true, &label));
            }
            Event::TaskListMarker(checked) => {
                let marker = if checked { "[x] " } else { "[ ] " };
                self.push(custom_leaf("taskListMarker", true, marker));
            }
        }
    }

    fn open(&mut self, tag: Tag<'_>) {
        let kind = match tag {
            Tag::Paragraph => FrameKind::Paragraph,
            Tag::Heading { level, .. } => FrameKind::Heading(level as u8),
            Tag::BlockQuote(_) => FrameKind::Blockquote,
            Tag::CodeBlock(kind) => {
                let (lang, meta) = match kind {
                    CodeBlockKind::Fenced(info) => split_info_string(&info),
                    CodeBlockKind::Indented => (None, None),
                };
                FrameKind::CodeBlock { lang, meta }
            }
            Tag::HtmlBlock => FrameKind::HtmlBlock,
            Tag::List(start) => FrameKind::List {
                ordered: start.is_some(),
                start: start.map(|n| u32::try_from(n).unwrap_or(u32::MAX)),
            },
            Tag::Item => FrameKind::Item,
            Tag::Emphasis => FrameKind::Emphasis,
            Tag::Strong => FrameKind::Strong,
            Tag::Link {
                dest_url, title, ..
            } => FrameKind::Link {
                url: dest_url.to_string(),
                title: non_empty(&title),
            },
            Tag::Image {
                dest_url, title, ..
            } => FrameKind::Image {
                url: dest_url.to_string(),
                title: non_empty(&title),
            },
            other => {
                let (name, inline) = custom_kind(&other);
                FrameKind::Custom { name, inline }
            }
        };
        self.stack.push(Frame {
            kind,
            children: Vec::new(),
        });
    }

    fn close(&mut self) {
        // The root frame is never closed by an event
        if self.stack.len() <= 1 {
            return;
        }
        let Some(frame) = self.stack.pop() else {
            return;
        };
        let node = match frame.kind {
            FrameKind::Root => return,
            FrameKind::Paragraph => Node::Paragraph(Paragraph {
                children: frame.children,
            }),
            FrameKind::Heading(depth) => Node::Heading(Heading {
                depth,
                children: frame.children,
            }),
            FrameKind::Blockquote => Node::Blockquote(Blockquote {
                children: frame.children,
            }),
            FrameKind::CodeBlock { lang, meta } => Node::Code(Code {
                lang,
                meta,
                value: plain_text(&frame.children),
            }),
            FrameKind::HtmlBlock => Node::Html(Html {
                value: plain_text(&frame.children),
                block: true,
            }),
            FrameKind::List { ordered, start } => {
                let spread = frame
                    .children
                    .iter()
                    .any(|c| matches!(c, Node::ListItem(li) if li.spread));
                Node::List(List {
                    ordered,
                    start,
                    spread,
                    children: frame.children,
                })
            }
            FrameKind::Item => {
                // Loose items carry paragraph tags; tight items have bare inlines
                let spread = frame
                    .children
                    .iter()
                    .any(|c| matches!(c, Node::Paragraph(_)));
                Node::ListItem(ListItem {
                    spread,
                    children: wrap_bare_inlines(frame.children),
                })
            }
            FrameKind::Emphasis => Node::Emphasis(Emphasis {
                children: frame.children,
            }),
            FrameKind::Strong => Node::Strong(Strong {
                children: frame.children,
            }),
            FrameKind::Link { url, title } => Node::Link(Link {
                url,
                title,
                children: frame.children,
            }),
            FrameKind::Image { url, title } => Node::Image(Image {
                url,
                title,
                alt: plain_text(&frame.children),
            }),
            FrameKind::Custom { name, inline } => Node::Custom(Custom {
                name: name.to_string(),
                inline,
                value: None,
                children: frame.children,
            }),
        };
        self.push(node);
    }

    fn push(&mut self, node: Node) {
        if let Some(frame) = self.stack.last_mut() {
            frame.children.push(node);
        }
    }

    /// Append text, merging with a directly preceding text node
    fn push_text(&mut self, text: &str) {
        let Some(frame) = self.stack.last_mut() else {
            return;
        };
        if let Some(Node::Text(last)) = frame.children.last_mut() {
            last.value.push_str(text);
        } else {
            frame.children.push(Node::text(text));
        }
    }

    fn in_html_block(&self) -> bool {
        matches!(
            self.stack.last(),
            Some(Frame {
                kind: FrameKind::HtmlBlock,
                ..
            })
        )
    }

    fn finish(mut self) -> Root {
        // Unbalanced streams cannot come out of pulldown-cmark, but close
        // whatever is left so no content is dropped.
        while self.stack.len() > 1 {
            self.close();
        }
        let children = self
            .stack
            .pop()
            .map(|frame| frame.children)
            .unwrap_or_default();
        Root::new(children)
    }
}

/// Split a fenced code block info string into language and meta
fn split_info_string(info: &str) -> (Option<String>, Option<String>) {
    let info = info.trim();
    if info.is_empty() {
        return (None, None);
    }
    match info.split_once(char::is_whitespace) {
        Some((lang, meta)) => (Some(lang.to_string()), non_empty(meta.trim())),
        None => (Some(info.to_string()), None),
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

fn custom_leaf(name: &str, inline: bool, value: &str) -> Node {
    Node::Custom(Custom {
        name: name.to_string(),
        inline,
        value: Some(value.to_string()),
        children: Vec::new(),
    })
}

/// mdast-style name and position of tags without a dedicated node kind
fn custom_kind(tag: &Tag<'_>) -> (&'static str, bool) {
    match tag {
        Tag::Strikethrough => ("delete", true),
        Tag::Table(_) => ("table", false),
        Tag::TableHead => ("tableHead", false),
        Tag::TableRow => ("tableRow", false),
        Tag::TableCell => ("tableCell", true),
        Tag::FootnoteDefinition(_) => ("footnoteDefinition", false),
        Tag::MetadataBlock(_) => ("metadata", false),
        _ => ("unknown", false),
    }
}

/// Group runs of inline children into paragraphs, leaving blocks untouched
fn wrap_bare_inlines(children: Vec<Node>) -> Vec<Node> {
    if children.iter().all(Node::is_block) {
        return children;
    }

    let mut result = Vec::new();
    let mut current_para: Vec<Node> = Vec::new();
    for child in children {
        if child.is_block() {
            flush_paragraph(&mut current_para, &mut result);
            result.push(child);
        } else {
            current_para.push(child);
        }
    }
    flush_paragraph(&mut current_para, &mut result);
    result
}

fn flush_paragraph(para: &mut Vec<Node>, result: &mut Vec<Node>) {
    if !para.is_empty() {
        result.push(Node::paragraph(std::mem::take(para)));
    }
}

/// Concatenate the literal text below a set of nodes
fn plain_text(nodes: &[Node]) -> String {
    let mut result = String::new();
    for node in nodes {
        match node {
            Node::Text(Text { value }) => result.push_str(value),
            Node::InlineCode(c) => result.push_str(&c.value),
            Node::Html(h) => result.push_str(&h.value),
            Node::Break => result.push('\n'),
            other => result.push_str(&plain_text(other.children())),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_heading_and_paragraph() {
        let root = parse_commonmark("# Title\n\nSome *text*.");
        assert_eq!(
            root,
            Root::new(vec![
                Node::heading(1, vec![Node::text("Title")]),
                Node::paragraph(vec![
                    Node::text("Some "),
                    Node::emphasis(vec![Node::text("text")]),
                    Node::text("."),
                ]),
            ])
        );
    }

    #[test]
    fn test_soft_break_becomes_space() {
        let root = parse_commonmark("one\ntwo");
        assert_eq!(
            root,
            Root::new(vec![Node::paragraph(vec![Node::text("one two")])])
        );
    }

    #[test]
    fn test_hard_break() {
        let root = parse_commonmark("one  \ntwo");
        assert_eq!(
            root,
            Root::new(vec![Node::paragraph(vec![
                Node::text("one"),
                Node::Break,
                Node::text("two"),
            ])])
        );
    }

    #[test]
    fn test_tight_list_items_get_paragraphs() {
        let root = parse_commonmark("3. a\n4. b\n");
        let Node::List(list) = &root.children[0] else {
            panic!("Expected List node");
        };
        assert!(list.ordered);
        assert_eq!(list.start, Some(3));
        assert!(!list.spread);
        assert_eq!(
            list.children[0],
            Node::list_item(vec![Node::paragraph(vec![Node::text("a")])])
        );
    }

    #[test]
    fn test_nested_list_stays_block() {
        let root = parse_commonmark("- a\n  - b\n");
        let Node::List(list) = &root.children[0] else {
            panic!("Expected List node");
        };
        let Node::ListItem(item) = &list.children[0] else {
            panic!("Expected ListItem node");
        };
        assert!(matches!(item.children[0], Node::Paragraph(_)));
        assert!(matches!(item.children[1], Node::List(_)));
    }

    #[test]
    fn test_fenced_code_info_string() {
        let root = parse_commonmark("```rust ignore\nfn main() {}\n```\n");
        assert_eq!(
            root.children[0],
            Node::Code(Code {
                lang: Some("rust".to_string()),
                meta: Some("ignore".to_string()),
                value: "fn main() {}\n".to_string(),
            })
        );
    }

    #[test]
    fn test_image_alt_collected() {
        let root = parse_commonmark("![a *b*](img.png \"T\")");
        assert_eq!(
            root.children[0],
            Node::paragraph(vec![Node::image_with_title("img.png", "a b", "T")])
        );
    }

    #[test]
    fn test_link_and_inline_code() {
        let root = parse_commonmark("[`x`](https://example.com)");
        assert_eq!(
            root.children[0],
            Node::paragraph(vec![Node::link(
                "https://example.com",
                vec![Node::inline_code("x")]
            )])
        );
    }

    #[test]
    fn test_rule_and_blockquote() {
        let root = parse_commonmark("> quoted\n\n---\n");
        assert_eq!(
            root,
            Root::new(vec![
                Node::blockquote(vec![Node::paragraph(vec![Node::text("quoted")])]),
                Node::ThematicBreak,
            ])
        );
    }

    #[test]
    fn test_strikethrough_is_custom() {
        let root = parse_commonmark("~~gone~~");
        assert_eq!(
            root.children[0],
            Node::paragraph(vec![Node::custom_inline(
                "delete",
                vec![Node::text("gone")]
            )])
        );
    }

    #[test]
    fn test_html_block_is_literal() {
        let root = parse_commonmark("<div>\nhi\n</div>\n");
        assert_eq!(root.children[0], Node::html_block("<div>\nhi\n</div>\n"));
    }

    #[test]
    fn test_html_blocks_and_inline_html() {
        let root = parse_commonmark("<div>\na\n</div>\n\n<div>\nb\n</div>\n\nx <b>y</b>\n");
        assert_eq!(root.children.len(), 3);
        assert!(root.children[0].is_block());
        assert!(root.children[1].is_block());
        let Node::Paragraph(p) = &root.children[2] else {
            panic!("Expected Paragraph node");
        };
        assert_eq!(p.children[1], Node::html("<b>"));
    }

    #[test]
    fn test_split_info_string() {
        assert_eq!(split_info_string(""), (None, None));
        assert_eq!(split_info_string("r"), (Some("r".to_string()), None));
        assert_eq!(
            split_info_string("r  {echo=FALSE}"),
            (Some("r".to_string()), Some("{echo=FALSE}".to_string()))
        );
    }
}
