//! mdast (Markdown Abstract Syntax Tree) types
//!
//! The closed set of node kinds the styling engine understands, shaped after
//! mdast. Anything outside that set travels as [`Node::Custom`].
//! Reference: https://github.com/syntax-tree/mdast

use serde::{Deserialize, Serialize};

/// Root node of an mdast document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Root {
    pub children: Vec<Node>,
}

/// An mdast node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Node {
    // Block nodes
    Heading(Heading),
    Paragraph(Paragraph),
    ThematicBreak,
    Blockquote(Blockquote),
    List(List),
    ListItem(ListItem),
    Code(Code),

    // Inline nodes
    Text(Text),
    Emphasis(Emphasis),
    Strong(Strong),
    InlineCode(InlineCode),
    Break,
    Link(Link),
    Image(Image),

    // Raw HTML, block or inline
    Html(Html),

    // Anything without a dedicated node kind
    Custom(Custom),
}

/// Heading node (# to ######)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heading {
    pub depth: u8,
    pub children: Vec<Node>,
}

/// Paragraph node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    pub children: Vec<Node>,
}

/// Blockquote node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blockquote {
    pub children: Vec<Node>,
}

/// List node (ordered or unordered)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct List {
    pub ordered: bool,
    pub start: Option<u32>,
    pub spread: bool,
    pub children: Vec<Node>,
}

/// List item node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    pub spread: bool,
    pub children: Vec<Node>,
}

/// Code block node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Code {
    pub lang: Option<String>,
    pub meta: Option<String>,
    pub value: String,
}

/// Text node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub value: String,
}

/// Emphasis node (*text* or _text_)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Emphasis {
    pub children: Vec<Node>,
}

/// Strong node (**text** or __text__)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strong {
    pub children: Vec<Node>,
}

/// Inline code node (`code`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InlineCode {
    pub value: String,
}

/// Link node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub url: String,
    pub title: Option<String>,
    pub children: Vec<Node>,
}

/// Image node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    pub title: Option<String>,
    pub alt: String,
}

/// Raw HTML node; `block` is set for HTML blocks, clear for inline HTML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Html {
    pub value: String,
    #[serde(default)]
    pub block: bool,
}

/// A node kind outside the supported taxonomy.
///
/// `name` identifies the original kind (e.g. `"delete"` for strikethrough),
/// `inline` tells whether it sits in inline or block position. A custom node
/// may carry literal text, children, or both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Custom {
    pub name: String,
    pub inline: bool,
    pub value: Option<String>,
    pub children: Vec<Node>,
}

impl Node {
    /// Whether this node occupies block position (separated from its siblings).
    pub fn is_block(&self) -> bool {
        match self {
            Node::Heading(_)
            | Node::Paragraph(_)
            | Node::ThematicBreak
            | Node::Blockquote(_)
            | Node::List(_)
            | Node::ListItem(_)
            | Node::Code(_) => true,
            Node::Custom(c) => !c.inline,
            Node::Html(h) => h.block,
            Node::Text(_)
            | Node::Emphasis(_)
            | Node::Strong(_)
            | Node::InlineCode(_)
            | Node::Break
            | Node::Link(_)
            | Node::Image(_) => false,
        }
    }

    /// Child nodes of a container; empty for leaves.
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Heading(n) => &n.children,
            Node::Paragraph(n) => &n.children,
            Node::Blockquote(n) => &n.children,
            Node::List(n) => &n.children,
            Node::ListItem(n) => &n.children,
            Node::Emphasis(n) => &n.children,
            Node::Strong(n) => &n.children,
            Node::Link(n) => &n.children,
            Node::Custom(n) => &n.children,
            Node::ThematicBreak
            | Node::Code(_)
            | Node::Text(_)
            | Node::InlineCode(_)
            | Node::Break
            | Node::Image(_)
            | Node::Html(_) => &[],
        }
    }
}

// Convenience constructors
impl Node {
    pub fn text(s: impl Into<String>) -> Self {
        Node::Text(Text { value: s.into() })
    }

    pub fn paragraph(children: Vec<Node>) -> Self {
        Node::Paragraph(Paragraph { children })
    }

    pub fn heading(depth: u8, children: Vec<Node>) -> Self {
        Node::Heading(Heading { depth, children })
    }

    pub fn code(lang: Option<String>, value: impl Into<String>) -> Self {
        Node::Code(Code {
            lang,
            meta: None,
            value: value.into(),
        })
    }

    pub fn inline_code(value: impl Into<String>) -> Self {
        Node::InlineCode(InlineCode {
            value: value.into(),
        })
    }

    pub fn emphasis(children: Vec<Node>) -> Self {
        Node::Emphasis(Emphasis { children })
    }

    pub fn strong(children: Vec<Node>) -> Self {
        Node::Strong(Strong { children })
    }

    pub fn link(url: impl Into<String>, children: Vec<Node>) -> Self {
        Node::Link(Link {
            url: url.into(),
            title: None,
            children,
        })
    }

    pub fn image(url: impl Into<String>, alt: impl Into<String>) -> Self {
        Node::Image(Image {
            url: url.into(),
            title: None,
            alt: alt.into(),
        })
    }

    pub fn image_with_title(
        url: impl Into<String>,
        alt: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Node::Image(Image {
            url: url.into(),
            title: Some(title.into()),
            alt: alt.into(),
        })
    }

    pub fn list(ordered: bool, children: Vec<Node>) -> Self {
        Node::List(List {
            ordered,
            start: if ordered { Some(1) } else { None },
            spread: false,
            children,
        })
    }

    pub fn ordered_list_from(start: u32, children: Vec<Node>) -> Self {
        Node::List(List {
            ordered: true,
            start: Some(start),
            spread: false,
            children,
        })
    }

    pub fn list_item(children: Vec<Node>) -> Self {
        Node::ListItem(ListItem {
            spread: false,
            children,
        })
    }

    pub fn html(value: impl Into<String>) -> Self {
        Node::Html(Html {
            value: value.into(),
            block: false,
        })
    }

    pub fn html_block(value: impl Into<String>) -> Self {
        Node::Html(Html {
            value: value.into(),
            block: true,
        })
    }

    pub fn blockquote(children: Vec<Node>) -> Self {
        Node::Blockquote(Blockquote { children })
    }

    pub fn custom_block(name: impl Into<String>, children: Vec<Node>) -> Self {
        Node::Custom(Custom {
            name: name.into(),
            inline: false,
            value: None,
            children,
        })
    }

    pub fn custom_inline(name: impl Into<String>, children: Vec<Node>) -> Self {
        Node::Custom(Custom {
            name: name.into(),
            inline: true,
            value: None,
            children,
        })
    }

    pub fn thematic_break() -> Self {
        Node::ThematicBreak
    }
}

impl Root {
    pub fn new(children: Vec<Node>) -> Self {
        Self { children }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_constructors() {
        let text = Node::text("hello");
        assert!(matches!(text, Node::Text(Text { value }) if value == "hello"));

        let heading = Node::heading(2, vec![Node::text("Title")]);
        assert!(matches!(heading, Node::Heading(Heading { depth: 2, .. })));

        let para = Node::paragraph(vec![Node::text("content")]);
        assert!(matches!(para, Node::Paragraph(_)));
    }

    #[test]
    fn test_list_constructors() {
        let unordered = Node::list(false, vec![Node::list_item(vec![Node::text("item")])]);
        if let Node::List(l) = unordered {
            assert!(!l.ordered);
            assert_eq!(l.start, None);
        } else {
            panic!("Expected List node");
        }

        let ordered = Node::ordered_list_from(5, vec![Node::list_item(vec![Node::text("item")])]);
        if let Node::List(l) = ordered {
            assert!(l.ordered);
            assert_eq!(l.start, Some(5));
        } else {
            panic!("Expected List node");
        }
    }

    #[test]
    fn test_block_classification() {
        assert!(Node::heading(1, vec![]).is_block());
        assert!(Node::thematic_break().is_block());
        assert!(Node::custom_block("table", vec![]).is_block());
        assert!(!Node::custom_inline("delete", vec![]).is_block());
        assert!(!Node::text("x").is_block());
        assert!(!Node::image("a.png", "a").is_block());
        assert!(!Node::html("<br>").is_block());
        assert!(Node::html_block("<div></div>").is_block());
    }

    #[test]
    fn test_children_of_leaves_are_empty() {
        assert!(Node::inline_code("x").children().is_empty());
        assert!(Node::code(None, "x").children().is_empty());
        let strong = Node::strong(vec![Node::text("a"), Node::text("b")]);
        assert_eq!(strong.children().len(), 2);
    }

    #[test]
    fn test_serde_tagging() {
        let root = Root::new(vec![
            Node::heading(1, vec![Node::text("Title")]),
            Node::paragraph(vec![
                Node::text("Hello "),
                Node::emphasis(vec![Node::text("world")]),
            ]),
            Node::thematic_break(),
        ]);

        let json = serde_json::to_value(&root).unwrap();
        assert_eq!(json["children"][0]["type"], "heading");
        assert_eq!(json["children"][1]["children"][1]["type"], "emphasis");
        assert_eq!(json["children"][2]["type"], "thematicBreak");

        let parsed: Root = serde_json::from_value(json).unwrap();
        assert_eq!(root, parsed);
    }
}
