//! downstyle-mdast: document tree types for downstyle
//!
//! This crate provides:
//! - mdast (Markdown Abstract Syntax Tree) types for the node kinds the
//!   styling engine renders
//! - A CommonMark adapter building that tree from Markdown source
//!
//! ## Example
//!
//! ```rust
//! use downstyle_mdast::{Node, Root, parse_commonmark};
//!
//! let doc = parse_commonmark("# Hello\n\nWorld");
//! assert_eq!(
//!     doc,
//!     Root::new(vec![
//!         Node::heading(1, vec![Node::text("Hello")]),
//!         Node::paragraph(vec![Node::text("World")]),
//!     ])
//! );
//! ```

pub mod commonmark;
pub mod mdast;

pub use commonmark::parse_commonmark;
pub use mdast::{
    Blockquote, Code, Custom, Emphasis, Heading, Html, Image, InlineCode, Link, List, ListItem,
    Node, Paragraph, Root, Strong, Text,
};
